//! In-process connector for exercising the registry without live backends.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use datasource::error::{ConnectionError, ConnectionResult};
use datasource::{
    Connector, DocumentStore, MessageBroker, RelationalStore, SearchIndex, ServiceConnection,
    ServiceKind,
};

/// DSN the fake connector always refuses.
pub const UNREACHABLE_DSN: &str = "tcp://127.0.0.1:1";

pub struct FakeConnection {
    kind: ServiceKind,
    dsn: String,
    /// Database name for mongo, core name for solr.
    scope: String,
    pub closed: AtomicBool,
    pub published: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeConnection {
    fn new(kind: ServiceKind, dsn: &str, scope: &str) -> Self {
        Self {
            kind,
            dsn: dsn.to_string(),
            scope: scope.to_string(),
            closed: AtomicBool::new(false),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServiceConnection for FakeConnection {
    fn kind(&self) -> ServiceKind {
        self.kind
    }

    fn dsn(&self) -> &str {
        &self.dsn
    }

    async fn check(&self) -> ConnectionResult<()> {
        if self.is_closed() {
            return Err(ConnectionError::Closed { service: self.kind });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FakeConnection {
    fn database_name(&self) -> &str {
        &self.scope
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl RelationalStore for FakeConnection {
    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageBroker for FakeConnection {
    async fn publish(&self, topic: &str, payload: &[u8]) -> ConnectionResult<()> {
        if self.is_closed() {
            return Err(ConnectionError::Closed { service: self.kind });
        }
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_vec()));
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SearchIndex for FakeConnection {
    fn core(&self) -> &str {
        &self.scope
    }

    async fn close(&self) -> ConnectionResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector that succeeds for every DSN except the refused ones and keeps
/// every adapter it hands out.
#[derive(Default)]
pub struct FakeConnector {
    refused: Mutex<HashSet<String>>,
    failing_checks: Mutex<HashSet<String>>,
    pub dials: AtomicUsize,
    pub created: Mutex<Vec<Arc<FakeConnection>>>,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        let connector = Self::default();
        connector.refuse(UNREACHABLE_DSN);
        Arc::new(connector)
    }

    /// Dialing `dsn` fails as if the connection was refused.
    pub fn refuse(&self, dsn: &str) {
        self.refused.lock().unwrap().insert(dsn.to_string());
    }

    /// Dialing `dsn` succeeds but the health check fails.
    pub fn fail_check(&self, dsn: &str) {
        self.failing_checks.lock().unwrap().insert(dsn.to_string());
    }

    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    fn dial(&self, kind: ServiceKind, dsn: &str, scope: &str) -> ConnectionResult<Arc<FakeConnection>> {
        self.dials.fetch_add(1, Ordering::SeqCst);

        if self.refused.lock().unwrap().contains(dsn) {
            let refused = std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused: {dsn}"),
            );
            return Err(ConnectionError::dial(kind, refused));
        }
        if self.failing_checks.lock().unwrap().contains(dsn) {
            let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "ping timed out");
            return Err(ConnectionError::check_failed(kind, timeout));
        }

        let conn = Arc::new(FakeConnection::new(kind, dsn, scope));
        self.created.lock().unwrap().push(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect_mongo(
        &self,
        dsn: &str,
        database: &str,
    ) -> ConnectionResult<Arc<dyn DocumentStore>> {
        Ok(self.dial(ServiceKind::Mongo, dsn, database)?)
    }

    async fn connect_postgres(&self, dsn: &str) -> ConnectionResult<Arc<dyn RelationalStore>> {
        Ok(self.dial(ServiceKind::Postgres, dsn, "")?)
    }

    async fn connect_pulsar(
        &self,
        dsn: &str,
        _timeout: Duration,
    ) -> ConnectionResult<Arc<dyn MessageBroker>> {
        Ok(self.dial(ServiceKind::Pulsar, dsn, "")?)
    }

    async fn connect_solr(
        &self,
        dsn: &str,
        core: &str,
        _timeout: Duration,
    ) -> ConnectionResult<Arc<dyn SearchIndex>> {
        Ok(self.dial(ServiceKind::Solr, dsn, core)?)
    }
}
