//! Endpoint facade over the retrieval caches

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::config::ClientConfig;
use super::envelope::unwrap_envelope;
use super::query::encode_queries;
use super::table::Table;
use super::transport::{HttpTransport, Transport};
use crate::cache::{CacheEpoch, CachePolicy, RetrievalCache};
use crate::data::{
    parse_server_status, Accessory, AccessoryType, Emote, Kill, KillInfo, LinkedDiscord, Match,
    MatchParticipant, OwnedAccessory, OwnedEmote, Player, Server, ServerInfo, Weapon, WeaponStats,
    Win,
};
use crate::error::BattlefieldsError;
use crate::pool::RequestPool;
use crate::sink::{FailureSink, TracingSink};

/// Cache key for the server list
const SERVER_LIST_FIELD: &str = "server_list";

/// Cache key for the server status list
const SERVER_STATUS_FIELD: &str = "server_status";

fn new_cache<V: Send + Sync>(
    policy: CachePolicy,
    epoch: &CacheEpoch,
    sink: &Arc<dyn FailureSink>,
) -> RetrievalCache<V> {
    RetrievalCache::new(policy, epoch.clone(), Arc::clone(sink))
}

/// Declares one cache and one typed method per table endpoint
macro_rules! table_endpoints {
    ($( $(#[$doc:meta])* $method:ident => $table:ident, $record:ty; )*) => {
        struct TableCaches {
            $( $method: RetrievalCache<Vec<$record>>, )*
        }

        impl TableCaches {
            fn new(policy: CachePolicy, epoch: &CacheEpoch, sink: &Arc<dyn FailureSink>) -> Self {
                Self {
                    $( $method: new_cache(policy, epoch, sink), )*
                }
            }

            fn clear(&self) {
                $( self.$method.clear(); )*
            }
        }

        impl BattlefieldsClient {
            $(
                $(#[$doc])*
                ///
                /// Each entry of `queries` is a `key=value` filter. Returns an
                /// empty list if the request fails.
                pub async fn $method<S: AsRef<str>>(&self, queries: &[S]) -> Arc<Vec<$record>> {
                    self.fetch_table(&self.inner.tables.$method, Table::$table, queries).await
                }
            )*
        }
    };
}

table_endpoints! {
    /// Kill counts per player
    kills => Kills, Kill;
    /// Win counts per player
    wins => Wins, Win;
    /// Known players
    players => Players, Player;
    /// Played matches
    matches => Matches, Match;
    /// Accessories owned by players
    owned_accessories => OwnedAccessories, OwnedAccessory;
    /// All accessories
    accessories => Accessories, Accessory;
    /// Accessory categories
    accessory_types => AccessoryTypes, AccessoryType;
    /// All weapons
    weapons => Weapons, Weapon;
    /// Per-player weapon statistics
    weapon_stats => WeaponStats, WeaponStats;
    /// Players taking part in matches
    match_participants => MatchParticipants, MatchParticipant;
    /// Individual kills within matches
    match_kills => MatchKills, KillInfo;
    /// Emotes owned by players
    owned_emotes => OwnedEmotes, OwnedEmote;
    /// All emotes
    emotes => Emotes, Emote;
    /// Players linked to Discord accounts
    linked_discord => LinkedDiscord, LinkedDiscord;
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn FailureSink>,
    pool: RequestPool,
    epoch: CacheEpoch,
    tables: TableCaches,
    custom: RetrievalCache<Vec<Value>>,
    server_list: RetrievalCache<Vec<String>>,
    server_status: RetrievalCache<Vec<Server>>,
    server_info: RetrievalCache<ServerInfo>,
}

/// Cached, fail-soft client for the Battlefields API
///
/// Cloning is cheap; clones share caches, transport and request pool.
#[derive(Clone)]
pub struct BattlefieldsClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for BattlefieldsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BattlefieldsClient")
            .field("config", &self.inner.config)
            .field("pool", &self.inner.pool)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`BattlefieldsClient`] from a config and optional collaborators
pub struct ClientBuilder {
    config: ClientConfig,
    pool: Option<RequestPool>,
    sink: Option<Arc<dyn FailureSink>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Starts from `config` with every collaborator defaulted
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            pool: None,
            sink: None,
            transport: None,
        }
    }

    /// Pool used to run requests; defaults to the current runtime
    pub fn pool(mut self, pool: RequestPool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Receiver for swallowed errors; defaults to [`TracingSink`]
    pub fn failure_sink(mut self, sink: impl FailureSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Transport used for requests; defaults to [`HttpTransport`]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the client
    ///
    /// # Errors
    /// * `BattlefieldsError::Network` if the default HTTP client cannot be created
    ///
    /// # Panics
    /// Panics if no pool was given and this is called outside a tokio runtime.
    pub fn build(self) -> Result<BattlefieldsClient, BattlefieldsError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(self.config.user_agent.clone())?),
        };
        let sink: Arc<dyn FailureSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(TracingSink),
        };
        let pool = self.pool.unwrap_or_else(RequestPool::current);
        let policy = self.config.cache_policy();
        let epoch = CacheEpoch::new();

        let inner = ClientInner {
            tables: TableCaches::new(policy, &epoch, &sink),
            custom: new_cache(policy, &epoch, &sink),
            server_list: new_cache(policy, &epoch, &sink),
            server_status: new_cache(policy, &epoch, &sink),
            server_info: new_cache(policy, &epoch, &sink),
            config: self.config,
            transport,
            sink,
            pool,
            epoch,
        };

        Ok(BattlefieldsClient {
            inner: Arc::new(inner),
        })
    }
}

impl BattlefieldsClient {
    /// Creates a client with the default transport, sink and current runtime
    pub fn new(config: ClientConfig) -> Result<Self, BattlefieldsError> {
        ClientBuilder::new(config).build()
    }

    /// Starts a [`ClientBuilder`] for custom collaborators
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// The configuration the client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The pool requests should be submitted to
    pub fn pool(&self) -> &RequestPool {
        &self.inner.pool
    }

    /// Raw `detail` records of any table
    ///
    /// Returns `None` if the request fails.
    pub async fn get<S: AsRef<str>>(&self, table: Table, queries: &[S]) -> Option<Arc<Vec<Value>>> {
        let query = match encode_queries(queries) {
            Ok(query) => query,
            Err(error) => {
                self.inner.sink.report(&error);
                return None;
            }
        };
        let field = format!("custom_{}-{}", table, query);
        let url = self.inner.config.table_url(table.as_str(), &query);

        self.inner
            .custom
            .try_retrieve(&field, || self.fetch_detail(&url))
            .await
    }

    /// Addresses of all public game servers
    pub async fn server_list(&self) -> Arc<Vec<String>> {
        self.inner
            .server_list
            .retrieve(SERVER_LIST_FIELD, || self.fetch_server_list(), Vec::new)
            .await
    }

    /// Status colour of every game server host
    pub async fn server_status(&self) -> Arc<Vec<Server>> {
        self.inner
            .server_status
            .retrieve(SERVER_STATUS_FIELD, || self.fetch_server_status(), Vec::new)
            .await
    }

    /// Live information about the server at `address`
    ///
    /// Returns `None` if the request fails.
    pub async fn server_info(&self, address: &str) -> Option<Arc<ServerInfo>> {
        let field = format!("server_info-{}", address);
        let url = self.inner.config.server_info_url_for(address);

        self.inner
            .server_info
            .try_retrieve(&field, || self.fetch_server_info(&url))
            .await
    }

    /// Forgets every cached result and failure marker
    ///
    /// Requests already in flight are unaffected and may store their result
    /// after the clear.
    pub fn clear_cache(&self) {
        self.inner.epoch.advance();
        self.inner.tables.clear();
        self.inner.custom.clear();
        self.inner.server_list.clear();
        self.inner.server_status.clear();
        self.inner.server_info.clear();
    }

    /// Stops the request pool and waits up to the configured shutdown wait
    ///
    /// Returns whether all in-flight requests finished in time.
    ///
    /// # Errors
    /// * `BattlefieldsError::Interrupted` if the pool is interrupted while waiting
    pub async fn shutdown(&self) -> Result<bool, BattlefieldsError> {
        self.inner.pool.shutdown(self.inner.config.shutdown_wait).await
    }

    async fn fetch_table<T, S>(
        &self,
        cache: &RetrievalCache<Vec<T>>,
        table: Table,
        queries: &[S],
    ) -> Arc<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
        S: AsRef<str>,
    {
        let query = match encode_queries(queries) {
            Ok(query) => query,
            Err(error) => {
                self.inner.sink.report(&error);
                return Arc::new(Vec::new());
            }
        };
        let field = format!("{}-{}", table, query);
        let url = self.inner.config.table_url(table.as_str(), &query);

        cache
            .retrieve(&field, || self.fetch_records(&url), Vec::new)
            .await
    }

    async fn fetch_detail(&self, url: &str) -> Result<Vec<Value>, BattlefieldsError> {
        let document = self.inner.transport.get_json(url).await?;
        unwrap_envelope(document)
    }

    async fn fetch_records<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>, BattlefieldsError> {
        let detail = self.fetch_detail(url).await?;
        Ok(serde_json::from_value(Value::Array(detail))?)
    }

    async fn fetch_server_list(&self) -> Result<Vec<String>, BattlefieldsError> {
        let document = self
            .inner
            .transport
            .get_json(&self.inner.config.server_list_url)
            .await?;
        Ok(serde_json::from_value(document)?)
    }

    async fn fetch_server_status(&self) -> Result<Vec<Server>, BattlefieldsError> {
        let detail = self.fetch_detail(&self.inner.config.server_status_url).await?;
        parse_server_status(detail)
    }

    async fn fetch_server_info(&self, url: &str) -> Result<ServerInfo, BattlefieldsError> {
        let document = self.inner.transport.get_json(url).await?;
        Ok(serde_json::from_value(document)?)
    }
}
