use serde::{Deserialize, Serialize};
use std::fmt;

/// The four backend families a registry can hold connections for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Document database (MongoDB)
    #[serde(rename = "mongodb")]
    Mongo,
    /// Relational database (PostgreSQL)
    Postgres,
    /// Messaging broker (Apache Pulsar)
    Pulsar,
    /// Search engine (Apache Solr)
    Solr,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Mongo => "mongodb",
            ServiceKind::Postgres => "postgres",
            ServiceKind::Pulsar => "pulsar",
            ServiceKind::Solr => "solr",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_display() {
        assert_eq!(ServiceKind::Mongo.to_string(), "mongodb");
        assert_eq!(ServiceKind::Postgres.to_string(), "postgres");
        assert_eq!(ServiceKind::Pulsar.to_string(), "pulsar");
        assert_eq!(ServiceKind::Solr.to_string(), "solr");
    }

    #[test]
    fn test_service_kind_deserializes_lowercase() {
        let kind: ServiceKind = serde_json::from_str("\"solr\"").unwrap();
        assert_eq!(kind, ServiceKind::Solr);
    }

    #[test]
    fn test_service_kind_serializes_like_display() {
        for kind in [
            ServiceKind::Mongo,
            ServiceKind::Postgres,
            ServiceKind::Pulsar,
            ServiceKind::Solr,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
            assert_eq!(serde_json::from_str::<ServiceKind>(&json).unwrap(), kind);
        }
    }
}
