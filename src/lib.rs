//! Named connections to MongoDB, PostgreSQL, Pulsar and Solr.
//!
//! ```no_run
//! # async fn example() -> Result<(), datasource::RegistryError> {
//! use std::time::Duration;
//! use datasource::ConnectionRegistry;
//!
//! let mut conns = ConnectionRegistry::new();
//! conns.add_mongo_connection("mongo-1", "mongodb://localhost:27018", "db-1").await?;
//! conns.add_pulsar_connection("events", "pulsar://localhost:6651", Duration::from_secs(5)).await?;
//!
//! let broker = conns.only_pulsar_connection()?;
//! # let _ = broker;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod registry;

pub use adapters::{
    Connector, DocumentStore, LiveConnector, MessageBroker, RelationalStore, SearchIndex,
    ServiceConnection,
};
pub use config::{ConfigLoader, RegistryConfig};
pub use error::{ConnectionError, RegistryError};
pub use models::ServiceKind;
pub use registry::{ConnectionMap, ConnectionRegistry};
