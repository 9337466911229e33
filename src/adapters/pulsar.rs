use async_trait::async_trait;
use pulsar::{ConnectionRetryOptions, OperationRetryOptions, Pulsar, TokioExecutor};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::adapters::{MessageBroker, ServiceConnection};
use crate::error::{ConnectionError, ConnectionResult};
use crate::models::ServiceKind;

/// Namespace used for health-check producers. Non-persistent topics are not
/// written to bookkeeper, so the probe leaves no stored messages behind.
const CHECK_TOPIC_NAMESPACE: &str = "non-persistent://public/default";

/// Pulsar client connection.
///
/// The health check creates a producer on a fresh, randomly named topic.
/// With topic auto-creation enabled on the broker this registers a new
/// (non-persistent) topic per check.
pub struct PulsarConnection {
    dsn: String,
    client: RwLock<Option<Pulsar<TokioExecutor>>>,
}

impl PulsarConnection {
    /// Dials the broker with `timeout` applied to both the connection and
    /// every operation. Failed operations are not retried.
    pub async fn connect(dsn: &str, timeout: Duration) -> ConnectionResult<Self> {
        let connection_retry = ConnectionRetryOptions {
            connection_timeout: timeout,
            max_retries: 0,
            ..Default::default()
        };
        let operation_retry = OperationRetryOptions {
            operation_timeout: timeout,
            max_retries: Some(0),
            ..Default::default()
        };

        let client = Pulsar::builder(dsn, TokioExecutor)
            .with_connection_retry_options(connection_retry)
            .with_operation_retry_options(operation_retry)
            .build()
            .await
            .map_err(|e| ConnectionError::dial(ServiceKind::Pulsar, e))?;

        let conn = Self {
            dsn: dsn.to_string(),
            client: RwLock::new(Some(client)),
        };
        conn.check().await?;

        Ok(conn)
    }

    async fn client(&self) -> ConnectionResult<Pulsar<TokioExecutor>> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(ConnectionError::Closed {
                service: ServiceKind::Pulsar,
            })
    }
}

#[async_trait]
impl ServiceConnection for PulsarConnection {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Pulsar
    }

    fn dsn(&self) -> &str {
        &self.dsn
    }

    async fn check(&self) -> ConnectionResult<()> {
        let client = self.client().await?;
        let topic = format!("{}/{}", CHECK_TOPIC_NAMESPACE, Uuid::new_v4());

        let mut producer = client
            .producer()
            .with_topic(&topic)
            .build()
            .await
            .map_err(|e| ConnectionError::check_failed(ServiceKind::Pulsar, e))?;

        if let Err(e) = producer.close().await {
            debug!(topic = %topic, error = %e, "Failed to close health-check producer");
        }
        Ok(())
    }
}

#[async_trait]
impl MessageBroker for PulsarConnection {
    async fn publish(&self, topic: &str, payload: &[u8]) -> ConnectionResult<()> {
        let client = self.client().await?;

        let mut producer = client
            .producer()
            .with_topic(topic)
            .build()
            .await
            .map_err(|e| ConnectionError::Producer {
                topic: topic.to_string(),
                source: e.into(),
            })?;

        let send_error = |e: pulsar::Error| ConnectionError::Send {
            topic: topic.to_string(),
            source: e.into(),
        };
        producer
            .send_non_blocking(payload.to_vec())
            .await
            .map_err(send_error)?
            .await
            .map_err(send_error)?;

        if let Err(e) = producer.close().await {
            debug!(topic = %topic, error = %e, "Failed to close producer after publish");
        }
        Ok(())
    }

    async fn close(&self) {
        // Dropping the last client handle tears down its broker connections.
        self.client.write().await.take();
    }
}
