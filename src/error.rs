//! Export failure taxonomy.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure is fatal; nothing is retried.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot open database {}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed while {context}")]
    Query {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ExportError {
    pub fn query(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Query { context: context.into(), source }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write { path: path.into(), source }
    }

    /// Short class name used in the one-line diagnostic.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection error",
            Self::Query { .. } => "query error",
            Self::Write { .. } | Self::Serialize { .. } => "write error",
            Self::Config(_) => "config error",
        }
    }
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
