//! Error types module - the runtime error kinds raised by lookups against the
//! graphic data registry and by A/V state transitions. Startup/configuration
//! failures propagate as `anyhow::Error` instead, since callers there only
//! need to print a chained cause and exit.

use std::fmt;

/// Runtime error kinds surfaced by the core engine's lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An id (sprite, animation, graphic set, bounding box) had no matching
    /// entry in the graphic data registry.
    NotFound(String),
    /// The resource manifest was structurally invalid (missing a required
    /// section, wrong type for a field, duplicate numeric id).
    Configuration(String),
    /// A runtime reference no longer resolves (e.g. an A/V entity's target
    /// entity was despawned).
    Inconsistent(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotFound(msg) => write!(f, "not found: {msg}"),
            EngineError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            EngineError::Inconsistent(msg) => write!(f, "inconsistent state: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_context() {
        let err = EngineError::NotFound("sprite 42".to_string());
        assert_eq!(err.to_string(), "not found: sprite 42");
    }

    #[test]
    fn variants_compare_by_value() {
        assert_eq!(
            EngineError::Configuration("a".to_string()),
            EngineError::Configuration("a".to_string())
        );
        assert_ne!(
            EngineError::Configuration("a".to_string()),
            EngineError::Inconsistent("a".to_string())
        );
    }
}
