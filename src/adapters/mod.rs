//! Service connection adapters.
//!
//! Each backend is wrapped behind a narrow trait so the registry never sees
//! the underlying client library's types:
//! - [`DocumentStore`] - MongoDB
//! - [`RelationalStore`] - PostgreSQL
//! - [`MessageBroker`] - Apache Pulsar
//! - [`SearchIndex`] - Apache Solr
//!
//! Dialing goes through the [`Connector`] seam. [`LiveConnector`] reaches
//! real backends; tests plug in their own implementation.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConnectionResult;
use crate::models::ServiceKind;

pub mod mongo;
pub mod postgres;
pub mod pulsar;
pub mod solr;

pub use self::mongo::MongoConnection;
pub use self::postgres::PostgresConnection;
pub use self::pulsar::PulsarConnection;
pub use self::solr::SolrConnection;

/// Capabilities shared by every adapter.
#[async_trait]
pub trait ServiceConnection: Send + Sync {
    fn kind(&self) -> ServiceKind;

    /// Connection string the adapter was dialed with.
    fn dsn(&self) -> &str;

    /// Round-trip health probe against the backend.
    async fn check(&self) -> ConnectionResult<()>;
}

#[async_trait]
pub trait DocumentStore: ServiceConnection {
    /// Name of the database handle held by this connection.
    fn database_name(&self) -> &str;

    async fn close(&self);
}

#[async_trait]
pub trait RelationalStore: ServiceConnection {
    async fn close(&self);
}

#[async_trait]
pub trait MessageBroker: ServiceConnection {
    /// Sends `payload` to `topic` through a short-lived producer.
    async fn publish(&self, topic: &str, payload: &[u8]) -> ConnectionResult<()>;

    /// Encodes `payload` as a JSON string value and publishes the result.
    ///
    /// The input is quoted, not forwarded: `"hello"` goes out as the seven
    /// bytes `"hello"` including the quotes. Callers holding an already
    /// serialized document should use [`MessageBroker::publish`].
    async fn publish_json(&self, topic: &str, payload: &str) -> ConnectionResult<()> {
        let bytes = serde_json::to_vec(payload)?;
        self.publish(topic, &bytes).await
    }

    async fn close(&self);
}

#[async_trait]
pub trait SearchIndex: ServiceConnection {
    /// Core this connection is bound to.
    fn core(&self) -> &str;

    /// Unloads the core from the Solr server. This removes the core for every
    /// client of that server, not just this handle.
    async fn close(&self) -> ConnectionResult<()>;
}

/// Dials backends and hands back health-checked adapters.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect_mongo(
        &self,
        dsn: &str,
        database: &str,
    ) -> ConnectionResult<Arc<dyn DocumentStore>>;

    async fn connect_postgres(&self, dsn: &str) -> ConnectionResult<Arc<dyn RelationalStore>>;

    async fn connect_pulsar(
        &self,
        dsn: &str,
        timeout: Duration,
    ) -> ConnectionResult<Arc<dyn MessageBroker>>;

    async fn connect_solr(
        &self,
        dsn: &str,
        core: &str,
        timeout: Duration,
    ) -> ConnectionResult<Arc<dyn SearchIndex>>;
}

/// Connector backed by the real client libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveConnector;

#[async_trait]
impl Connector for LiveConnector {
    async fn connect_mongo(
        &self,
        dsn: &str,
        database: &str,
    ) -> ConnectionResult<Arc<dyn DocumentStore>> {
        Ok(Arc::new(MongoConnection::connect(dsn, database).await?))
    }

    async fn connect_postgres(&self, dsn: &str) -> ConnectionResult<Arc<dyn RelationalStore>> {
        Ok(Arc::new(PostgresConnection::connect(dsn).await?))
    }

    async fn connect_pulsar(
        &self,
        dsn: &str,
        timeout: Duration,
    ) -> ConnectionResult<Arc<dyn MessageBroker>> {
        Ok(Arc::new(PulsarConnection::connect(dsn, timeout).await?))
    }

    async fn connect_solr(
        &self,
        dsn: &str,
        core: &str,
        timeout: Duration,
    ) -> ConnectionResult<Arc<dyn SearchIndex>> {
        Ok(Arc::new(SolrConnection::connect(dsn, core, timeout).await?))
    }
}
