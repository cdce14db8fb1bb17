pub mod allow_list;
pub mod resolve;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use form_spec::{InputSpec, Model};
use serde_json::Value;

/// Reads a spec file holding one input spec object or an array of them.
pub fn load_specs(path: &Path) -> Result<Vec<InputSpec>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let items = match value {
        Value::Array(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            InputSpec::from_value(item)
                .with_context(|| format!("input #{index} in {}", path.display()))
        })
        .collect()
}

/// Model restricted to `allow`, or accepting every field when empty.
pub(crate) fn model_for(allow: &[String]) -> Model {
    if allow.is_empty() {
        Model::new()
    } else {
        Model::with_schema(allow.iter().cloned())
    }
}
