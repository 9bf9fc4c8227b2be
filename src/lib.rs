//! Battlefields API client library
//!
//! A cached, fail-soft client for the Battlefields game statistics API. Every
//! endpoint result is cached per query for a configurable TTL, failures can be
//! remembered for the same window, and errors are reported to a
//! [`FailureSink`](sink::FailureSink) instead of being returned to the caller.

pub mod api;
pub mod cache;
pub mod cli;
pub mod data;
pub mod error;
pub mod pool;
pub mod sink;

pub use api::{BattlefieldsClient, ClientBuilder, ClientConfig, Table, Transport};
pub use error::BattlefieldsError;
pub use pool::RequestPool;
pub use sink::{FailureSink, TracingSink};
