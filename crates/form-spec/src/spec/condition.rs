use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::visibility::{Condition, VisibilityRule};

/// Serializable matcher used by `showWhen` / `toggleWhen` entries in JSON specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    Equals(Value),
    OneOf(Vec<Value>),
    Present(bool),
}

impl Matcher {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Matcher::Equals(expected) => value == expected,
            Matcher::OneOf(candidates) => candidates.contains(value),
            Matcher::Present(present) => !value.is_null() == *present,
        }
    }
}

/// A rule entry as written in a spec: a literal boolean or a matcher object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionSpec {
    Literal(bool),
    Matcher(Matcher),
}

impl From<&ConditionSpec> for Condition {
    fn from(spec: &ConditionSpec) -> Self {
        match spec {
            ConditionSpec::Literal(value) => Condition::Literal(*value),
            ConditionSpec::Matcher(matcher) => {
                let matcher = matcher.clone();
                Condition::predicate(move |value| matcher.matches(value))
            }
        }
    }
}

/// Field name -> condition map as found under `showWhen` / `toggleWhen`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSpec(pub BTreeMap<String, ConditionSpec>);

impl RuleSpec {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds the runtime rule; `None` when the spec has no entries.
    pub fn to_rule(&self) -> Option<VisibilityRule> {
        self.0
            .iter()
            .fold(VisibilityRule::builder(), |builder, (field, condition)| {
                builder.when(field.clone(), Condition::from(condition))
            })
            .build()
    }
}

impl<K: Into<String>> FromIterator<(K, ConditionSpec)> for RuleSpec {
    fn from_iter<T: IntoIterator<Item = (K, ConditionSpec)>>(iter: T) -> Self {
        RuleSpec(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
