//! Solr adapter speaking the CoreAdmin HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::adapters::{SearchIndex, ServiceConnection};
use crate::error::{BoxError, ConnectionError, ConnectionResult};
use crate::models::ServiceKind;

const CORE_ADMIN_PATH: &str = "/solr/admin/cores";

#[derive(Debug, Deserialize)]
struct CoreAdminResponse {
    #[serde(default)]
    status: HashMap<String, Value>,
    #[serde(default, rename = "initFailures")]
    init_failures: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SolrErrorBody {
    error: SolrErrorDetail,
}

#[derive(Debug, Deserialize)]
struct SolrErrorDetail {
    msg: String,
}

/// Errors produced while talking to the CoreAdmin endpoint.
#[derive(Debug, thiserror::Error)]
pub enum CoreAdminError {
    #[error("core '{0}' not found")]
    CoreNotFound(String),

    #[error("core '{core}' failed to initialise: {reason}")]
    InitFailure { core: String, reason: String },

    #[error("solr returned {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
}

/// HTTP connection to a Solr server, bound to one core.
pub struct SolrConnection {
    dsn: String,
    core: String,
    client: Client,
}

impl SolrConnection {
    /// Builds the HTTP client with `timeout` and checks the core's status.
    pub async fn connect(dsn: &str, core: &str, timeout: Duration) -> ConnectionResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectionError::dial(ServiceKind::Solr, e))?;

        let conn = Self {
            dsn: dsn.trim_end_matches('/').to_string(),
            core: core.to_string(),
            client,
        };
        conn.check().await?;

        Ok(conn)
    }

    async fn core_admin(&self, action: &str) -> Result<CoreAdminResponse, BoxError> {
        let url = format!("{}{}", self.dsn, CORE_ADMIN_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[("action", action), ("core", self.core.as_str()), ("wt", "json")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<SolrErrorBody>(&body)
                .map(|e| e.error.msg)
                .unwrap_or(body);
            return Err(CoreAdminError::Status { status, message }.into());
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Solr answers STATUS for an unknown core with an empty object rather than an error.
fn core_status(core: &str, response: &CoreAdminResponse) -> Result<(), CoreAdminError> {
    if let Some(reason) = response.init_failures.get(core) {
        return Err(CoreAdminError::InitFailure {
            core: core.to_string(),
            reason: reason.as_str().map(str::to_string).unwrap_or_else(|| reason.to_string()),
        });
    }

    match response.status.get(core) {
        Some(Value::Object(fields)) if !fields.is_empty() => Ok(()),
        _ => Err(CoreAdminError::CoreNotFound(core.to_string())),
    }
}

#[async_trait]
impl ServiceConnection for SolrConnection {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Solr
    }

    fn dsn(&self) -> &str {
        &self.dsn
    }

    async fn check(&self) -> ConnectionResult<()> {
        let response = self
            .core_admin("STATUS")
            .await
            .map_err(|e| ConnectionError::check_failed(ServiceKind::Solr, e))?;
        core_status(&self.core, &response)
            .map_err(|e| ConnectionError::check_failed(ServiceKind::Solr, e))
    }
}

#[async_trait]
impl SearchIndex for SolrConnection {
    fn core(&self) -> &str {
        &self.core
    }

    async fn close(&self) -> ConnectionResult<()> {
        self.core_admin("UNLOAD")
            .await
            .map_err(|source| ConnectionError::Unload {
                core: self.core.clone(),
                source,
            })?;
        Ok(())
    }
}
