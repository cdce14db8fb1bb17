use displaydoc::Display;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::model::FieldAllowance;
use crate::options::ALL_OPTIONS;
use crate::spec::{FieldName, InputKind, InputSpec, NestedInput};

/// Non-fatal findings: logged, and rendering may continue.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Diagnostic {
    /// A label input must have a "label" parameter
    MissingLabel,
    /// A button input must have a "title" and/or an "icon" parameter
    ButtonMissingTitle,
    /// A button input must have a "click" and/or an "href" parameter
    ButtonMissingAction,
    /// Missing "name" or "input" parameters
    MissingNameOrInput,
    /// Invalid input parameters: {keys:?}
    UnknownKeys { keys: Vec<String> },
}

/// Fatal findings: the input must not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Not allowed to have both \"name\" and \"input\" defined as array.")]
    AmbiguousCardinality,
    #[error("field not allowed: {field}")]
    FieldNotAllowed { field: String },
}

/// Checks `spec` (and its nested inputs) and returns every diagnostic in
/// the order it was logged.
pub fn validate(
    spec: &InputSpec,
    model: Option<&dyn FieldAllowance>,
) -> Result<Vec<Diagnostic>, ValidationError> {
    let mut diagnostics = Vec::new();
    validate_into(spec, model, &mut diagnostics)?;
    Ok(diagnostics)
}

fn validate_into(
    spec: &InputSpec,
    model: Option<&dyn FieldAllowance>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), ValidationError> {
    match &spec.kind {
        InputKind::Label => {
            if is_blank(&spec.options.label) {
                report(diagnostics, spec, Diagnostic::MissingLabel);
            }
            return Ok(());
        }
        InputKind::Button(target) => {
            if is_blank(&target.title) && is_blank(&target.icon) {
                report(diagnostics, spec, Diagnostic::ButtonMissingTitle);
            }
            if is_blank(&target.click) && is_blank(&target.href) {
                report(diagnostics, spec, Diagnostic::ButtonMissingAction);
            }
            return Ok(());
        }
        _ => {}
    }

    let name = spec.options.name.as_ref().filter(|name| !name.is_blank());
    if name.is_none() && spec.input.is_none() {
        report(diagnostics, spec, Diagnostic::MissingNameOrInput);
    }

    if name.is_some_and(FieldName::is_many) && spec.input.as_ref().is_some_and(NestedInput::is_many) {
        return Err(ValidationError::AmbiguousCardinality);
    }

    let is_list = matches!(spec.kind, InputKind::List);
    if !is_list
        && let Some(name) = name
        && let Some(model) = model
        && let Some(field) = name.iter().find(|field| !model.allows(field))
    {
        return Err(ValidationError::FieldNotAllowed {
            field: field.to_string(),
        });
    }

    if !is_list && let Some(NestedInput::Many(items)) = &spec.input {
        for item in items {
            validate_into(item, model, diagnostics)?;
        }
    }

    if !spec.unknown.is_empty() {
        let keys: Vec<String> = spec.unknown.keys().cloned().collect();
        let spec_json = Value::from(spec);
        warn!(
            invalid = ?keys,
            allowed = ?ALL_OPTIONS.as_slice(),
            spec = %spec_json,
            "Invalid input parameters"
        );
        diagnostics.push(Diagnostic::UnknownKeys { keys });
    }

    Ok(())
}

fn report(diagnostics: &mut Vec<Diagnostic>, spec: &InputSpec, diagnostic: Diagnostic) {
    let spec_json = Value::from(spec);
    warn!(spec = %spec_json, "{diagnostic}");
    diagnostics.push(diagnostic);
}

/// Absent and empty strings both count as missing.
fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
