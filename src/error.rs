//! Error types for the trip planner.

use thiserror::Error;

use crate::model::{Operation, ProviderStatus};

/// Every failure the planning pipeline can surface.
#[derive(Error, Debug)]
pub enum PlannerError {
    /// A map provider call answered with a non-OK status.
    #[error("{operation} request failed with status {status}")]
    Provider {
        operation: Operation,
        status: ProviderStatus,
    },
    /// The optimization oracle could not be reached.
    #[error("Optimization oracle request failed: {source}")]
    OracleTransport {
        #[source]
        source: reqwest::Error,
    },
    /// The optimization oracle answered with a non-success HTTP status.
    #[error("Optimization oracle returned HTTP {status}")]
    OracleStatus { status: u16 },
    /// The optimization oracle answered, but the answer cannot be used.
    #[error("Optimization oracle returned an unusable answer: {reason}")]
    OracleAnswer { reason: String },
    /// A shard plan was requested with parameters that cannot be split.
    #[error("Invalid shard configuration: {reason}")]
    InvalidShardConfig { reason: String },
    /// Shard results did not fit the plan they were issued from.
    #[error("Shard assembly error: {reason}")]
    Assembly { reason: String },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl PlannerError {
    pub fn provider(operation: Operation, status: ProviderStatus) -> Self {
        Self::Provider { operation, status }
    }

    pub fn invalid_shard(reason: impl Into<String>) -> Self {
        Self::InvalidShardConfig {
            reason: reason.into(),
        }
    }

    pub fn assembly(reason: impl Into<String>) -> Self {
        Self::Assembly {
            reason: reason.into(),
        }
    }

    pub fn oracle_answer(reason: impl Into<String>) -> Self {
        Self::OracleAnswer {
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True for non-OK answers from the map provider.
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }

    /// True for any failure talking to, or understanding, the oracle.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(
            self,
            Self::OracleTransport { .. } | Self::OracleStatus { .. } | Self::OracleAnswer { .. }
        )
    }
}

impl From<reqwest::Error> for PlannerError {
    fn from(source: reqwest::Error) -> Self {
        Self::OracleTransport { source }
    }
}

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;
