//! Error types for datasource connections and the registry.

use thiserror::Error;

use crate::models::ServiceKind;

/// Boxed cause from an underlying client library.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised by a single service adapter.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("could not connect to {service}: {source}")]
    Dial {
        service: ServiceKind,
        #[source]
        source: BoxError,
    },

    #[error("{service} connection check failed: {source}")]
    CheckFailed {
        service: ServiceKind,
        #[source]
        source: BoxError,
    },

    #[error("could not create producer for topic '{topic}': {source}")]
    Producer {
        topic: String,
        #[source]
        source: BoxError,
    },

    #[error("could not publish message to topic '{topic}': {source}")]
    Send {
        topic: String,
        #[source]
        source: BoxError,
    },

    #[error("could not marshal json: {0}")]
    Marshal(#[from] serde_json::Error),

    #[error("could not unload solr core '{core}': {source}")]
    Unload {
        core: String,
        #[source]
        source: BoxError,
    },

    #[error("{service} connection is closed")]
    Closed { service: ServiceKind },
}

impl ConnectionError {
    pub fn dial(service: ServiceKind, source: impl Into<BoxError>) -> Self {
        Self::Dial {
            service,
            source: source.into(),
        }
    }

    pub fn check_failed(service: ServiceKind, source: impl Into<BoxError>) -> Self {
        Self::CheckFailed {
            service,
            source: source.into(),
        }
    }

    pub fn service(&self) -> Option<ServiceKind> {
        match self {
            Self::Dial { service, .. } | Self::CheckFailed { service, .. } => Some(*service),
            Self::Closed { service } => Some(*service),
            Self::Producer { .. } | Self::Send { .. } | Self::Marshal(_) => {
                Some(ServiceKind::Pulsar)
            }
            Self::Unload { .. } => Some(ServiceKind::Solr),
        }
    }
}

/// Failures raised by [`crate::ConnectionRegistry`] operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("could not add {service} connection '{key}': {source}")]
    Connection {
        service: ServiceKind,
        key: String,
        #[source]
        source: ConnectionError,
    },

    #[error("no {service} connection with key = {key}")]
    NotFound { service: ServiceKind, key: String },

    #[error("cannot return unique {service} connection as {count} exist")]
    Ambiguous { service: ServiceKind, count: usize },
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;
pub type RegistryResult<T> = Result<T, RegistryError>;
