#![allow(dead_code)]

use std::collections::HashMap;

use rust_decimal_macros::dec;
use txflow::common::{Balances, Decimal, TokenLimits};
use txflow::{Environment, FormSettings, FormStateMachine, InitContext, Token};
use txflow_fake_services::{FakePrices, FakeRoutes, FakeServices};

pub fn tokens() -> Vec<Token> {
    vec![
        Token::new("sol", "SOL", 9),
        Token::new("usdc", "USDC", 6),
    ]
}

pub fn balances(sol: Decimal) -> Balances {
    HashMap::from([("sol".into(), sol), ("usdc".into(), dec!(100))])
}

pub fn environment(sol_balance: Decimal, settings: FormSettings) -> Environment {
    Environment::new(settings)
        .with_tokens(tokens())
        .with_balances(balances(sol_balance))
        .with_prices(HashMap::from([
            ("sol".into(), dec!(20)),
            ("usdc".into(), dec!(1)),
        ]))
}

/// SOL/USDC at 20, prices SOL 20 USDC 1, network fee `fee` in the fee token
pub fn fakes(fee: Decimal, sol_balance: Decimal) -> FakeServices {
    FakeServices::new(fee, balances(sol_balance))
        .with_routes(FakeRoutes::default().with_rate("sol", "usdc", dec!(20)))
        .with_prices(
            FakePrices::default()
                .with_price("sol", dec!(20))
                .with_price("usdc", dec!(1)),
        )
}

pub fn swap_form(fakes: &FakeServices, sol_balance: Decimal) -> FormStateMachine {
    swap_form_with(fakes, sol_balance, FormSettings::default())
}

pub fn swap_form_with(
    fakes: &FakeServices,
    sol_balance: Decimal,
    settings: FormSettings,
) -> FormStateMachine {
    let context = InitContext::swap(environment(sol_balance, settings), "sol", "usdc");
    FormStateMachine::from_context(context, fakes.form_services()).unwrap()
}

pub fn transfer_form(fakes: &FakeServices, sol_balance: Decimal) -> FormStateMachine {
    let context = InitContext::transfer(environment(sol_balance, FormSettings::default()), "sol");
    FormStateMachine::from_context(context, fakes.form_services()).unwrap()
}

pub fn limited(min: Option<Decimal>, max: Option<Decimal>) -> FormSettings {
    FormSettings {
        limits: HashMap::from([("sol".into(), TokenLimits { min, max })]),
        ..Default::default()
    }
}
