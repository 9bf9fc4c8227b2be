//! Battlefields API client
//!
//! [`BattlefieldsClient`] exposes one method per upstream endpoint. Each call
//! goes through the endpoint's [`RetrievalCache`](crate::cache::RetrievalCache):
//! on a miss the filters are encoded, the request is sent through the
//! [`Transport`], the response envelope is unwrapped and the records are
//! deserialized. Failures are reported to the configured
//! [`FailureSink`](crate::sink::FailureSink) and surface as an empty result.

mod client;
pub mod config;
pub mod envelope;
pub mod query;
pub mod table;
pub mod transport;

pub use client::{BattlefieldsClient, ClientBuilder};
pub use config::ClientConfig;
pub use envelope::unwrap_envelope;
pub use query::encode_queries;
pub use table::Table;
pub use transport::{HttpTransport, Transport};
