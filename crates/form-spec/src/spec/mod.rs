pub mod condition;
pub mod input;

use thiserror::Error;

pub use condition::{ConditionSpec, Matcher, RuleSpec};
pub use input::{ButtonTarget, FieldName, InputKind, InputOptions, InputSpec, NestedInput};

/// Shape errors raised while reading an input spec from JSON.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("input spec must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("option '{key}' must be {expected}, found {found}")]
    InvalidType {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid rule under '{key}': {source}")]
    InvalidRule {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
