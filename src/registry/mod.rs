//! Named connections, one map per service type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::adapters::{
    Connector, DocumentStore, LiveConnector, MessageBroker, RelationalStore, SearchIndex,
};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::models::ServiceKind;

/// Connections of a single service type, keyed by caller-chosen label.
pub struct ConnectionMap<T: ?Sized> {
    kind: ServiceKind,
    connections: HashMap<String, Arc<T>>,
}

impl<T: ?Sized> ConnectionMap<T> {
    fn new(kind: ServiceKind) -> Self {
        Self {
            kind,
            connections: HashMap::new(),
        }
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.connections.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }

    /// Stores `conn` under `key`, handing back whatever was there before.
    fn insert(&mut self, key: &str, conn: Arc<T>) -> Option<Arc<T>> {
        self.connections.insert(key.to_string(), conn)
    }

    pub fn get(&self, key: &str) -> RegistryResult<Arc<T>> {
        self.connections
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                service: self.kind,
                key: key.to_string(),
            })
    }

    /// The sole connection, or an error when there are zero or several.
    pub fn only(&self) -> RegistryResult<Arc<T>> {
        let count = self.connections.len();
        if count != 1 {
            return Err(RegistryError::Ambiguous {
                service: self.kind,
                count,
            });
        }
        self.connections
            .values()
            .next()
            .cloned()
            .ok_or(RegistryError::Ambiguous {
                service: self.kind,
                count,
            })
    }
}

impl<T: ?Sized> fmt::Debug for ConnectionMap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("ConnectionMap")
            .field("kind", &self.kind)
            .field("keys", &keys)
            .finish()
    }
}

/// Holds named connections to every supported backend.
///
/// Mutation takes `&mut self`; share a registry between tasks by wrapping it
/// in a lock. Adapters are never closed by the registry, including ones
/// displaced by re-adding an existing key.
pub struct ConnectionRegistry {
    connector: Arc<dyn Connector>,
    mongo: ConnectionMap<dyn DocumentStore>,
    postgres: ConnectionMap<dyn RelationalStore>,
    pulsar: ConnectionMap<dyn MessageBroker>,
    solr: ConnectionMap<dyn SearchIndex>,
}

impl ConnectionRegistry {
    /// An empty registry that dials real backends.
    pub fn new() -> Self {
        Self::with_connector(Arc::new(LiveConnector))
    }

    /// An empty registry that dials through `connector`.
    pub fn with_connector(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            mongo: ConnectionMap::new(ServiceKind::Mongo),
            postgres: ConnectionMap::new(ServiceKind::Postgres),
            pulsar: ConnectionMap::new(ServiceKind::Pulsar),
            solr: ConnectionMap::new(ServiceKind::Solr),
        }
    }

    /// Dials every connection described by `config`.
    ///
    /// Stops at the first failure. Connections added before it stay in the
    /// registry.
    pub async fn connect_all(&mut self, config: &RegistryConfig) -> RegistryResult<()> {
        for (key, entry) in &config.mongo {
            self.add_mongo_connection(key, &entry.dsn, &entry.database)
                .await?;
        }
        for (key, entry) in &config.postgres {
            self.add_postgres_connection(key, &entry.dsn).await?;
        }
        for (key, entry) in &config.pulsar {
            self.add_pulsar_connection(key, &entry.dsn, entry.timeout())
                .await?;
        }
        for (key, entry) in &config.solr {
            self.add_solr_connection(key, &entry.dsn, &entry.core, entry.timeout())
                .await?;
        }
        Ok(())
    }

    /// Adds a connection to a mongo database identified by `key`.
    pub async fn add_mongo_connection(
        &mut self,
        key: &str,
        dsn: &str,
        database: &str,
    ) -> RegistryResult<()> {
        info!(key, database, "Adding MONGO connection");
        let conn = self
            .connector
            .connect_mongo(dsn, database)
            .await
            .map_err(|source| RegistryError::Connection {
                service: ServiceKind::Mongo,
                key: key.to_string(),
                source,
            })?;
        if self.mongo.insert(key, conn).is_some() {
            warn!(key, service = %ServiceKind::Mongo, "Replaced existing connection without closing it");
        }
        Ok(())
    }

    pub fn mongo_conn_by_key(&self, key: &str) -> RegistryResult<Arc<dyn DocumentStore>> {
        self.mongo.get(key)
    }

    /// Convenience accessor for the common one-database deployment.
    pub fn only_mongo_connection(&self) -> RegistryResult<Arc<dyn DocumentStore>> {
        self.mongo.only()
    }

    pub fn mongo_connections(&self) -> &ConnectionMap<dyn DocumentStore> {
        &self.mongo
    }

    /// Adds a connection to a postgres database identified by `key`.
    pub async fn add_postgres_connection(&mut self, key: &str, dsn: &str) -> RegistryResult<()> {
        info!(key, "Adding POSTGRES connection");
        let conn = self
            .connector
            .connect_postgres(dsn)
            .await
            .map_err(|source| RegistryError::Connection {
                service: ServiceKind::Postgres,
                key: key.to_string(),
                source,
            })?;
        if self.postgres.insert(key, conn).is_some() {
            warn!(key, service = %ServiceKind::Postgres, "Replaced existing connection without closing it");
        }
        Ok(())
    }

    pub fn postgres_conn_by_key(&self, key: &str) -> RegistryResult<Arc<dyn RelationalStore>> {
        self.postgres.get(key)
    }

    pub fn only_postgres_connection(&self) -> RegistryResult<Arc<dyn RelationalStore>> {
        self.postgres.only()
    }

    pub fn postgres_connections(&self) -> &ConnectionMap<dyn RelationalStore> {
        &self.postgres
    }

    /// Adds a connection to a Pulsar broker identified by `key`. `timeout`
    /// bounds both connecting and each broker operation.
    pub async fn add_pulsar_connection(
        &mut self,
        key: &str,
        dsn: &str,
        timeout: Duration,
    ) -> RegistryResult<()> {
        info!(key, timeout_ms = timeout.as_millis() as u64, "Adding PULSAR connection");
        let conn = self
            .connector
            .connect_pulsar(dsn, timeout)
            .await
            .map_err(|source| RegistryError::Connection {
                service: ServiceKind::Pulsar,
                key: key.to_string(),
                source,
            })?;
        if self.pulsar.insert(key, conn).is_some() {
            warn!(key, service = %ServiceKind::Pulsar, "Replaced existing connection without closing it");
        }
        Ok(())
    }

    pub fn pulsar_conn_by_key(&self, key: &str) -> RegistryResult<Arc<dyn MessageBroker>> {
        self.pulsar.get(key)
    }

    pub fn only_pulsar_connection(&self) -> RegistryResult<Arc<dyn MessageBroker>> {
        self.pulsar.only()
    }

    pub fn pulsar_connections(&self) -> &ConnectionMap<dyn MessageBroker> {
        &self.pulsar
    }

    /// Adds a connection to a core on a Solr server identified by `key`.
    pub async fn add_solr_connection(
        &mut self,
        key: &str,
        dsn: &str,
        core: &str,
        timeout: Duration,
    ) -> RegistryResult<()> {
        info!(key, core, timeout_ms = timeout.as_millis() as u64, "Adding SOLR connection");
        let conn = self
            .connector
            .connect_solr(dsn, core, timeout)
            .await
            .map_err(|source| RegistryError::Connection {
                service: ServiceKind::Solr,
                key: key.to_string(),
                source,
            })?;
        if self.solr.insert(key, conn).is_some() {
            warn!(key, service = %ServiceKind::Solr, "Replaced existing connection without closing it");
        }
        Ok(())
    }

    pub fn solr_conn_by_key(&self, key: &str) -> RegistryResult<Arc<dyn SearchIndex>> {
        self.solr.get(key)
    }

    pub fn only_solr_connection(&self) -> RegistryResult<Arc<dyn SearchIndex>> {
        self.solr.only()
    }

    pub fn solr_connections(&self) -> &ConnectionMap<dyn SearchIndex> {
        &self.solr
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("mongo", &self.mongo)
            .field("postgres", &self.postgres)
            .field("pulsar", &self.pulsar)
            .field("solr", &self.solr)
            .finish()
    }
}
