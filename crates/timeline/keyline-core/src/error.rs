//! Error types for the timeline tree.
//!
//! Errors are reserved for structural API misuse (unknown handles,
//! reparenting cycles) and config ingestion. Advancement itself never
//! errors: a node that cannot animate degrades to inert instead.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// Error type for timeline operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TimelineError {
    /// Node handle not present in the arena
    #[error("Timeline node not found: {id:?}")]
    NodeNotFound { id: NodeId },

    /// Reparenting would make a node its own ancestor
    #[error("Reparenting {child:?} under {parent:?} would create a cycle")]
    ParentCycle { child: NodeId, parent: NodeId },

    /// Config snapshot could not be ingested
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl TimelineError {
    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::NodeNotFound { .. } => "not_found",
            Self::ParentCycle { .. } => "structure",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for TimelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, TimelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_handle() {
        let err = TimelineError::NodeNotFound { id: NodeId(7) };
        assert!(err.to_string().contains("NodeId(7)"));
        assert_eq!(err.category(), "not_found");
    }

    #[test]
    fn serde_json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("not json");
        let err: TimelineError = parse.unwrap_err().into();
        assert_eq!(err.category(), "serialization");
    }
}
