//! Ordering and supersession of concurrent actions

mod common;

use std::time::Duration;

use anyhow::Result;
use common::*;
use futures::future::join_all;
use rust_decimal_macros::dec;
use txflow::common::Decimal;
use txflow::{Action, ErrorReason, FormState, Status, StateSubscription};
use txflow_fake_services::setup_tracing;

fn drain(subscription: &mut StateSubscription) -> Vec<FormState> {
    let mut snapshots = Vec::new();
    while let Some(snapshot) = subscription.try_recv() {
        snapshots.push(snapshot);
    }
    snapshots
}

async fn wait_for_amount(subscription: &mut StateSubscription, amount: Decimal) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(snapshot) = subscription.recv().await {
            if snapshot.amount_input == amount {
                return;
            }
        }
    })
    .await?;
    Ok(())
}

/// The route for 1.0 resolves after the user typed 2.0: it must never be published
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_superseded_route_is_discarded() -> Result<()> {
    setup_tracing();
    let fakes = fakes(dec!(0.001), dec!(5));
    fakes.routes.gate.hold(dec!(1));
    let form = swap_form(&fakes, dec!(5));
    let mut subscription = form.subscribe()?;

    let first = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::amount_input("1.0")).await }
    });
    fakes.routes.gate.wait_for_calls(1).await;
    assert_eq!(form.current_state().status, Status::Evaluating);

    let second = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::amount_input("2.0")).await }
    });

    let mut watcher = form.subscribe()?;
    wait_for_amount(&mut watcher, dec!(2)).await?;

    fakes.routes.gate.release(dec!(1));
    let first = first.await?;
    let second = second.await?;

    assert_eq!(second.status, Status::Ready);
    assert_eq!(second.amount_input, dec!(2));
    assert_eq!(second.amount_output, dec!(40));
    assert_eq!(second.route.as_ref().map(|route| route.in_amount), Some(dec!(2)));
    assert_eq!(first.amount_input, dec!(2));
    assert_eq!(form.current_state(), second);

    let snapshots = drain(&mut subscription);
    let trace: Vec<_> = snapshots
        .iter()
        .map(|state| (state.status.clone(), state.amount_input))
        .collect();
    assert_eq!(
        trace,
        vec![
            (Status::Ready, Decimal::ZERO),
            (Status::Evaluating, dec!(1)),
            (Status::Evaluating, dec!(2)),
            (Status::Ready, dec!(2)),
        ]
    );
    assert!(!snapshots.iter().any(|state| state
        .route
        .as_ref()
        .is_some_and(|route| route.in_amount == dec!(1))));

    assert_eq!(fakes.routes.gate.calls(), vec![dec!(1), dec!(2)]);
    Ok(())
}

/// A newer amount drops the pending quote instead of waiting for it
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pending_route_does_not_block_newer_input() -> Result<()> {
    setup_tracing();
    let fakes = fakes(dec!(0.001), dec!(5));
    fakes.routes.gate.hold(dec!(1));
    let form = swap_form(&fakes, dec!(5));

    let first = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::amount_input("1")).await }
    });
    fakes.routes.gate.wait_for_calls(1).await;

    // The route for 1 stays held for the whole test
    let second = tokio::time::timeout(
        Duration::from_secs(5),
        form.accept(Action::amount_input("2")),
    )
    .await?;

    assert_eq!(fakes.routes.gate.calls(), vec![dec!(1), dec!(2)]);
    assert_eq!(second.status, Status::Ready);
    assert_eq!(second.amount_output, dec!(40));

    let first = tokio::time::timeout(Duration::from_secs(5), first).await??;
    assert_eq!(first.amount_input, dec!(2));
    assert_eq!(form.current_state(), second);
    Ok(())
}

/// Whichever quote is slow, the last typed amount wins
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_last_input_wins_regardless_of_latency() -> Result<()> {
    setup_tracing();

    for slow in [dec!(1), dec!(2)] {
        let fakes = fakes(dec!(0.001), dec!(5));
        fakes.routes.gate.hold(slow);
        let form = swap_form(&fakes, dec!(5));

        let first = tokio::spawn({
            let form = form.clone();
            async move { form.accept(Action::amount_input("1")).await }
        });
        fakes.routes.gate.wait_for_calls(1).await;

        let second = tokio::spawn({
            let form = form.clone();
            async move { form.accept(Action::amount_input("2")).await }
        });

        let mut watcher = form.subscribe()?;
        wait_for_amount(&mut watcher, dec!(2)).await?;
        fakes.routes.gate.release(slow);

        first.await?;
        let last = second.await?;

        assert_eq!(last.amount_input, dec!(2), "slow quote for {slow}");
        assert_eq!(last.amount_output, dec!(40), "slow quote for {slow}");
        assert_eq!(form.current_state(), last);
    }
    Ok(())
}

/// Rapid input without any gate still settles on the last value
#[tokio::test]
async fn test_rapid_input() -> Result<()> {
    setup_tracing();
    let fakes = fakes(dec!(0.001), dec!(5));
    let form = swap_form(&fakes, dec!(5));

    // Accepted in order on first poll, each one supersedes the previous
    let keystrokes = ["0.", "0.1", "0.12", "0.125", "0.1255"];
    let results = join_all(
        keystrokes
            .iter()
            .map(|digits| form.accept(Action::amount_input(*digits))),
    )
    .await;

    let last = results.last().cloned().expect("one result per keystroke");
    assert_eq!(last.amount_input, dec!(0.1255));
    assert_eq!(last.amount_output, dec!(2.51));
    assert_eq!(last.status, Status::Ready);
    assert_eq!(form.current_state(), last);
    Ok(())
}

/// Environment refreshes queue behind the running chain instead of cancelling it
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_balance_update_does_not_cancel() -> Result<()> {
    setup_tracing();
    let fakes = fakes(dec!(0.001), dec!(5));
    fakes.routes.gate.hold(dec!(1));
    let form = swap_form(&fakes, dec!(5));

    let quote = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::amount_input("1")).await }
    });
    fakes.routes.gate.wait_for_calls(1).await;

    let update = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::UpdateBalances(balances(dec!(0.5)))).await }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!update.is_finished());

    fakes.routes.gate.release(dec!(1));
    let quoted = quote.await?;
    let updated = update.await?;

    assert_eq!(quoted.status, Status::Ready);
    assert_eq!(quoted.amount_output, dec!(20));

    assert_eq!(
        updated.error().map(|err| err.reason.clone()),
        Some(ErrorReason::InsufficientFunds { max: dec!(0.499) })
    );
    assert_eq!(updated.amount_output, dec!(20));
    assert_eq!(fakes.routes.requests().len(), 1);
    Ok(())
}

/// A balance update superseded while queued is still applied
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_superseded_balance_update_is_kept() -> Result<()> {
    setup_tracing();
    let fakes = fakes(dec!(0.001), dec!(5));
    fakes.routes.gate.hold(dec!(1));
    let form = swap_form(&fakes, dec!(5));

    let first = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::amount_input("1")).await }
    });
    fakes.routes.gate.wait_for_calls(1).await;

    let update = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::UpdateBalances(balances(dec!(8)))).await }
    });
    // Let the update queue behind the held chain
    tokio::time::sleep(Duration::from_millis(20)).await;

    let second = tokio::spawn({
        let form = form.clone();
        async move { form.accept(Action::amount_input("7")).await }
    });
    let mut watcher = form.subscribe()?;
    wait_for_amount(&mut watcher, dec!(7)).await?;

    fakes.routes.gate.release(dec!(1));
    first.await?;
    update.await?;
    let last = second.await?;

    assert_eq!(last.balance(), dec!(8));
    assert_eq!(last.status, Status::Ready);
    assert_eq!(last.max_amount_input, dec!(7.999));
    Ok(())
}
