//! Failure reporting for soft-failed requests
//!
//! Endpoint methods swallow their errors and return a default value. Each
//! swallowed error is passed exactly once to a [`FailureSink`].

use crate::error::BattlefieldsError;

/// Receives every error that the client converts into a default value
pub trait FailureSink: Send + Sync {
    /// Report a swallowed error
    fn report(&self, error: &BattlefieldsError);
}

impl<F> FailureSink for F
where
    F: Fn(&BattlefieldsError) + Send + Sync,
{
    fn report(&self, error: &BattlefieldsError) {
        self(error)
    }
}

/// Default sink that logs each failure through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn report(&self, error: &BattlefieldsError) {
        tracing::warn!(error = %error, "battlefields request failed");
    }
}
