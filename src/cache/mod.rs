//! In-memory caching of API responses
//!
//! Every endpoint owns a [`RetrievalCache`] typed to its own result. Entries
//! expire lazily after the configured TTL; nothing sweeps them in the
//! background. Failed fetches can optionally be remembered for one TTL window
//! so a failing upstream is not hit again on every call.

mod retrieval;

pub use retrieval::{CacheEpoch, CachePolicy, RetrievalCache};
