//! Error taxonomy for the data source layer

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataSourceError {
    /// User-correctable, e.g. no wallet connected.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        retry_count: u32,
    },

    #[error("Contract is not loaded")]
    ContractNotLoaded,

    #[error("Contract descriptor error: {message}")]
    Descriptor {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid data source state: {0}")]
    InvalidState(String),

    #[error("Method not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("The offchain method '{0}' does not exist")]
    MethodNotFound(String),

    #[error("Data parsing error: {context}")]
    DataParsing {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// Failure observed by every caller coalesced onto one in-flight fetch.
    #[error(transparent)]
    Shared(Arc<DataSourceError>),
}

impl DataSourceError {
    pub fn network(message: impl Into<String>, source: anyhow::Error) -> Self {
        DataSourceError::Network {
            message: message.into(),
            source: Some(source),
            retry_count: 0,
        }
    }

    pub fn parsing(context: impl Into<String>, source: anyhow::Error) -> Self {
        DataSourceError::DataParsing {
            context: context.into(),
            source,
        }
    }

    /// Strips the `Shared` wrapper so callers can match on the underlying kind.
    pub fn root(&self) -> &DataSourceError {
        match self {
            DataSourceError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// True for failures a read path may replace with a default value.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.root(),
            DataSourceError::Network { .. } | DataSourceError::DataParsing { .. }
        )
    }
}

pub type DataSourceResult<T> = Result<T, DataSourceError>;
