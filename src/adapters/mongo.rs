use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ReadPreference, SelectionCriteria};
use mongodb::{Client, Database};
use std::time::Duration;

use crate::adapters::{DocumentStore, ServiceConnection};
use crate::error::{ConnectionError, ConnectionResult};
use crate::models::ServiceKind;

const DIAL_TIMEOUT: Duration = Duration::from_secs(5);
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// MongoDB client plus a handle scoped to one database.
pub struct MongoConnection {
    dsn: String,
    client: Client,
    database: Database,
}

impl MongoConnection {
    /// Builds the client and pings the primary before handing it out.
    pub async fn connect(dsn: &str, database: &str) -> ConnectionResult<Self> {
        let mut options = tokio::time::timeout(DIAL_TIMEOUT, ClientOptions::parse(dsn))
            .await
            .map_err(|e| ConnectionError::dial(ServiceKind::Mongo, e))?
            .map_err(|e| ConnectionError::dial(ServiceKind::Mongo, e))?;
        options.connect_timeout = Some(DIAL_TIMEOUT);
        // Without this the driver waits 30s for a primary before the ping gives up.
        options.server_selection_timeout = Some(CHECK_TIMEOUT);

        let client =
            Client::with_options(options).map_err(|e| ConnectionError::dial(ServiceKind::Mongo, e))?;
        let conn = Self {
            dsn: dsn.to_string(),
            database: client.database(database),
            client,
        };
        conn.check().await?;

        Ok(conn)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

#[async_trait]
impl ServiceConnection for MongoConnection {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Mongo
    }

    fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Runs `ping` against the primary. Client construction alone never
    /// touches the network, so this is what proves the server is there.
    async fn check(&self) -> ConnectionResult<()> {
        let admin = self.client.database("admin");
        let ping = admin
            .run_command(doc! { "ping": 1 })
            .selection_criteria(SelectionCriteria::ReadPreference(ReadPreference::Primary));

        tokio::time::timeout(CHECK_TIMEOUT, ping)
            .await
            .map_err(|e| ConnectionError::check_failed(ServiceKind::Mongo, e))?
            .map_err(|e| ConnectionError::check_failed(ServiceKind::Mongo, e))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoConnection {
    fn database_name(&self) -> &str {
        self.database.name()
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}
