//! Snapshot publish–subscribe.
//!
//! A [`Publisher`] fans immutable snapshots out to any number of [`Subscription`]s. Every new
//! subscription first receives the latest snapshot, then every snapshot published afterwards in
//! publication order.
//!
//! Subscribers that fall behind never block the producer: once a subscriber's buffer is full,
//! newer snapshots collapse into a single "lagged" slot that is delivered after the buffered
//! ones, so a slow observer may skip intermediate snapshots but always ends on the latest one
//! and never sees them out of order.

mod error;
mod publisher;
mod subscription;

pub use error::Error;
pub use publisher::Publisher;
pub use subscription::Subscription;

/// Default channel size for subscription buffering
pub const DEFAULT_CHANNEL_SIZE: usize = 64;
