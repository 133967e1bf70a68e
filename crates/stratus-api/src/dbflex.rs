//! Managed database ("Flex") instance types
//!
//! PostgreSQL, MongoDB and SQL Server Flex share one instance shape. The
//! families disagree on status casing (`Ready` vs `READY`), so statuses are
//! parsed case-insensitively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Managed database product family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFamily {
    Postgres,
    MongoDb,
    SqlServer,
}

impl DatabaseFamily {
    /// Service name used for endpoint routing
    #[must_use]
    pub fn service_name(self) -> &'static str {
        match self {
            Self::Postgres => "postgresflex",
            Self::MongoDb => "mongodbflex",
            Self::SqlServer => "sqlserverflex",
        }
    }

    /// Human readable product name
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL Flex",
            Self::MongoDb => "MongoDB Flex",
            Self::SqlServer => "SQLServer Flex",
        }
    }
}

impl fmt::Display for DatabaseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unknown database family name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown database family: {0} (expected postgres, mongodb or sqlserver)")]
pub struct UnknownFamily(pub String);

impl FromStr for DatabaseFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "postgresflex" => Ok(Self::Postgres),
            "mongodb" | "mongo" | "mongodbflex" => Ok(Self::MongoDb),
            "sqlserver" | "sqlserverflex" => Ok(Self::SqlServer),
            _ => Err(UnknownFamily(s.to_string())),
        }
    }
}

/// Instance status across all Flex families
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DbInstanceStatus {
    Progressing,
    Ready,
    Active,
    Failed,
    Deleted,
    Unknown(String),
}

impl From<String> for DbInstanceStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PROGRESSING" | "PROCESSING" | "PENDING" => Self::Progressing,
            "READY" => Self::Ready,
            "ACTIVE" => Self::Active,
            "FAILED" | "FAILURE" => Self::Failed,
            "DELETED" => Self::Deleted,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<DbInstanceStatus> for String {
    fn from(status: DbInstanceStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for DbInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Progressing => f.write_str("PROGRESSING"),
            Self::Ready => f.write_str("READY"),
            Self::Active => f.write_str("ACTIVE"),
            Self::Failed => f.write_str("FAILED"),
            Self::Deleted => f.write_str("DELETED"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// Managed database instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DbInstance {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<DbInstanceStatus>,
    pub version: Option<String>,
    pub flavor_id: Option<String>,
    pub replicas: Option<i64>,
    pub error_message: Option<String>,
}

/// Envelope returned by `GET .../instances/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbInstanceResponse {
    pub item: Option<DbInstance>,
}
