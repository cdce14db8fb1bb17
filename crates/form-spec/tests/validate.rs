use serde_json::{Value, json};

use form_spec::{Diagnostic, FieldAllowance, InputSpec, Model, ValidationError, validate};

fn spec(value: Value) -> InputSpec {
    InputSpec::from_value(value).expect("fixture should parse")
}

#[test]
fn well_formed_text_input_has_no_findings() {
    let diagnostics = validate(&spec(json!({ "type": "text", "name": "login" })), None)
        .expect("valid spec");
    assert!(diagnostics.is_empty());
}

#[test]
fn many_names_with_many_inputs_is_fatal() {
    let err = validate(
        &spec(json!({
            "name": ["a", "b"],
            "input": [{ "name": "a" }, { "name": "b" }]
        })),
        None,
    )
    .expect_err("ambiguous cardinality");

    assert_eq!(err, ValidationError::AmbiguousCardinality);
    assert_eq!(
        err.to_string(),
        "Not allowed to have both \"name\" and \"input\" defined as array."
    );
}

#[test]
fn field_outside_the_schema_is_fatal() {
    let model = Model::with_schema(["login", "email"]);
    let err = validate(&spec(json!({ "name": "secret" })), Some(&model))
        .expect_err("field not allowed");

    assert_eq!(
        err,
        ValidationError::FieldNotAllowed {
            field: "secret".into()
        }
    );
    assert_eq!(err.to_string(), "field not allowed: secret");
}

#[test]
fn every_name_of_a_multi_field_input_is_checked() {
    let allow = |field: &str| field != "b";
    let err = validate(&spec(json!({ "name": ["a", "b"] })), Some(&allow as &dyn FieldAllowance))
        .expect_err("second field rejected");
    assert_eq!(err, ValidationError::FieldNotAllowed { field: "b".into() });
}

#[test]
fn list_inputs_skip_the_allowance_check() {
    let allow = |_: &str| false;
    let diagnostics = validate(
        &spec(json!({ "type": "list", "name": "emails", "input": [{ "name": "nope" }] })),
        Some(&allow as &dyn FieldAllowance),
    )
    .expect("lists are not checked");
    assert!(diagnostics.is_empty());
}

#[test]
fn label_without_text_reports_once_and_stops() {
    let diagnostics = validate(
        &spec(json!({ "type": "label", "bogus": 1 })),
        None,
    )
    .expect("non-fatal");
    assert_eq!(diagnostics, vec![Diagnostic::MissingLabel]);
}

#[test]
fn label_with_text_is_fine_without_a_name() {
    let diagnostics =
        validate(&spec(json!({ "type": "label", "label": "Hello" })), None).expect("non-fatal");
    assert!(diagnostics.is_empty());
}

#[test]
fn bare_button_reports_title_and_action() {
    let diagnostics = validate(&spec(json!({ "type": "button" })), None).expect("non-fatal");
    assert_eq!(
        diagnostics,
        vec![Diagnostic::ButtonMissingTitle, Diagnostic::ButtonMissingAction]
    );

    let diagnostics = validate(
        &spec(json!({ "type": "button", "icon": "gear", "href": "/settings" })),
        None,
    )
    .expect("non-fatal");
    assert!(diagnostics.is_empty());
}

#[test]
fn empty_strings_count_as_missing() {
    let diagnostics = validate(
        &spec(json!({ "type": "button", "title": "", "icon": "", "click": "", "href": "" })),
        None,
    )
    .expect("non-fatal");
    assert_eq!(
        diagnostics,
        vec![Diagnostic::ButtonMissingTitle, Diagnostic::ButtonMissingAction]
    );

    let diagnostics = validate(
        &spec(json!({ "type": "button", "title": "", "icon": "gear", "click": "", "href": "/x" })),
        None,
    )
    .expect("non-fatal");
    assert!(diagnostics.is_empty());

    let diagnostics =
        validate(&spec(json!({ "type": "label", "label": "" })), None).expect("non-fatal");
    assert_eq!(diagnostics, vec![Diagnostic::MissingLabel]);
}

#[test]
fn missing_name_and_input_is_reported() {
    let diagnostics =
        validate(&spec(json!({ "type": "text", "name": "" })), None).expect("non-fatal");
    assert_eq!(diagnostics, vec![Diagnostic::MissingNameOrInput]);
    assert_eq!(
        diagnostics[0].to_string(),
        "Missing \"name\" or \"input\" parameters"
    );
}

#[test]
fn unknown_keys_are_listed() {
    let diagnostics = validate(
        &spec(json!({ "name": "a", "colour": "red", "size": 3, "wide": true })),
        None,
    )
    .expect("non-fatal");
    assert_eq!(
        diagnostics,
        vec![Diagnostic::UnknownKeys {
            keys: vec!["colour".into(), "size".into()]
        }]
    );
}

#[test]
fn nested_inputs_are_validated_before_the_parent_keys() {
    let model = Model::with_schema(["a"]);
    let diagnostics = validate(
        &spec(json!({
            "input": [{ "name": "a", "nested-oops": 1 }],
            "outer-oops": true
        })),
        Some(&model),
    )
    .expect("non-fatal");

    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::UnknownKeys {
                keys: vec!["nested-oops".into()]
            },
            Diagnostic::UnknownKeys {
                keys: vec!["outer-oops".into()]
            },
        ]
    );

    let err = validate(&spec(json!({ "input": [{ "name": "b" }] })), Some(&model))
        .expect_err("nested field rejected");
    assert_eq!(err, ValidationError::FieldNotAllowed { field: "b".into() });
}

#[test]
fn model_without_schema_allows_everything() {
    let model = Model::new();
    assert!(model.allows("anything"));
    let diagnostics = validate(&spec(json!({ "name": "anything" })), Some(&model)).expect("ok");
    assert!(diagnostics.is_empty());
}
