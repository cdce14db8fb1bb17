use std::collections::BTreeSet;
use std::rc::Rc;

use proptest::prelude::*;
use serde_json::{Value, json};

use form_spec::{
    Form, FormConfig, InputKind, InputOptions, InputSpec, Model, NestedInput, PhoneTextBoxFactory,
    SequentialIds, resolve,
};

fn spec(value: Value) -> InputSpec {
    InputSpec::from_value(value).expect("fixture should parse")
}

fn form(read_only: bool, read_mode: bool, defaults: Value) -> Form {
    let defaults: InputOptions = serde_json::from_value(defaults).expect("defaults should parse");
    Form::new(
        Model::new().shared(),
        FormConfig {
            read_only,
            read_mode,
            defaults,
        },
    )
}

#[test]
fn single_spec_layers_over_form_defaults() {
    let form = form(
        false,
        true,
        json!({ "placeholder": "fill me", "label": "Default", "wide": true }),
    );
    let resolved = form.resolve(&spec(json!({
        "type": "text",
        "name": "login",
        "label": "Login"
    })));

    assert_eq!(resolved.len(), 1);
    let input = &resolved[0];
    assert_eq!(input.id, "input1");
    assert_eq!(input.kind, InputKind::Text);
    assert_eq!(input.name(), Some("login"));
    assert_eq!(input.options.label.as_deref(), Some("Login"));
    assert_eq!(input.options.placeholder.as_deref(), Some("fill me"));
    assert_eq!(input.options.other.get("wide"), Some(&json!(true)));
    assert!(input.read);
    assert!(!input.read_only);
}

#[test]
fn sequence_input_yields_one_entry_per_item() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({
        "type": "text",
        "label": "Shared",
        "input": [
            { "name": "first" },
            { "name": "last", "label": "Last" }
        ]
    })));

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].name(), Some("first"));
    assert_eq!(resolved[0].options.label.as_deref(), Some("Shared"));
    assert_eq!(resolved[0].kind, InputKind::Text);
    assert_eq!(resolved[1].name(), Some("last"));
    assert_eq!(resolved[1].options.label.as_deref(), Some("Last"));
    assert_ne!(resolved[0].id, resolved[1].id);
    assert!(resolved.iter().all(|input| input.input.is_none()));
}

#[test]
fn read_only_form_forces_both_flags() {
    let form = form(true, false, json!({ "read": false }));
    let resolved = form.resolve(&spec(json!({
        "name": "a",
        "readOnly": false,
        "read": false
    })));

    assert!(resolved[0].read_only);
    assert!(resolved[0].read);
}

#[test]
fn explicit_id_wins_but_still_draws_from_the_generator() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({ "name": "a", "id": "custom" })));

    assert_eq!(resolved[0].id, "custom");
    assert_eq!(form.ids().issued(), 1);
    assert!(resolved[0].options.id.is_none());
}

#[test]
fn group_folds_nested_inputs_into_params() {
    let form = form(false, false, json!({})).with_factory(Rc::new(PhoneTextBoxFactory));
    let resolved = form.resolve(&spec(json!({
        "type": "group",
        "params": { "layout": "inline", "inputs": "ignored" },
        "input": [
            { "type": "text", "name": "a" },
            { "name": "b", "input": [{ "name": "x" }, { "name": "y" }] }
        ]
    })));

    assert_eq!(resolved.len(), 1);
    let group = &resolved[0];
    assert_eq!(group.kind, InputKind::Group);
    assert!(group.input.is_none());
    // a, x and y are drawn before the group itself
    assert_eq!(group.id, "input4");

    let params = group.params.as_ref().expect("composite params");
    assert!(params.create.is_some());
    assert_eq!(params.extra.get("layout"), Some(&json!("inline")));
    assert!(!params.extra.contains_key("inputs"));

    let names: Vec<_> = group.inputs().iter().map(|input| input.name()).collect();
    assert_eq!(names, vec![Some("a"), Some("x")]);
}

#[test]
fn list_with_single_nested_input_resolves_one_member() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({
        "type": "list",
        "name": "emails",
        "input": { "type": "text", "placeholder": "email" }
    })));

    assert_eq!(resolved.len(), 1);
    let members = resolved[0].inputs();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].options.placeholder.as_deref(), Some("email"));
    assert!(resolved[0].params.as_ref().is_some_and(|p| p.create.is_none()));
}

#[test]
fn single_object_input_on_plain_types_is_carried_through() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({
        "name": "a",
        "input": { "type": "date-picker" }
    })));

    assert_eq!(resolved.len(), 1);
    match &resolved[0].input {
        Some(NestedInput::One(custom)) => {
            assert_eq!(custom.kind, InputKind::Custom("date-picker".into()));
        }
        other => panic!("expected custom input, got {other:?}"),
    }
}

#[test]
fn parent_unknown_keys_flow_down_except_inputs() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({
        "title": "t",
        "inputs": [1],
        "input": [{ "name": "a" }]
    })));

    assert_eq!(resolved[0].unknown.get("title"), Some(&json!("t")));
    assert!(!resolved[0].unknown.contains_key("inputs"));
}

#[test]
fn resolved_json_uses_spec_keys() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({
        "type": "group",
        "input": [{ "type": "text", "name": "a", "showWhen": { "b": true } }]
    })));

    let value = resolved[0].to_value();
    assert_eq!(value["type"], "group");
    assert_eq!(value["readOnly"], false);
    assert_eq!(value["params"]["inputs"][0]["name"], "a");
    assert_eq!(value["params"]["inputs"][0]["showWhen"], json!({ "b": true }));
    assert_eq!(value["params"]["inputs"][0]["id"], "input1");
}

#[test]
fn resolved_button_keeps_its_target_fields() {
    let form = form(false, false, json!({}));
    let resolved = form.resolve(&spec(json!({
        "type": "button",
        "title": "Go",
        "icon": "arrow",
        "click": "save",
        "href": "/next"
    })));

    let value = resolved[0].to_value();
    assert_eq!(value["type"], "button");
    assert_eq!(value["title"], "Go");
    assert_eq!(value["icon"], "arrow");
    assert_eq!(value["click"], "save");
    assert_eq!(value["href"], "/next");
    assert!(resolved[0].unknown.is_empty());
}

#[test]
fn free_function_uses_the_given_generator() {
    let form = form(false, false, json!({}));
    let ids = SequentialIds::new();
    let first = resolve(&spec(json!({ "name": "a" })), &form, &ids, None);
    let second = resolve(&spec(json!({ "name": "b" })), &form, &ids, None);

    assert_eq!(first[0].id, "input1");
    assert_eq!(second[0].id, "input2");
    assert_eq!(form.ids().issued(), 0);
}

proptest! {
    #[test]
    fn cardinality_and_read_only_hold_for_any_sequence(
        count in 1usize..8,
        read_only in any::<bool>(),
        read_mode in any::<bool>(),
    ) {
        let form = form(read_only, read_mode, json!({}));
        let items: Vec<Value> = (0..count).map(|i| json!({ "name": format!("f{i}") })).collect();
        let resolved = form.resolve(&spec(json!({ "type": "text", "input": items })));

        prop_assert_eq!(resolved.len(), count);
        let ids: BTreeSet<_> = resolved.iter().map(|input| input.id.clone()).collect();
        prop_assert_eq!(ids.len(), count);
        for input in &resolved {
            prop_assert_eq!(input.read_only, read_only);
            prop_assert_eq!(input.read, read_only || read_mode);
        }
    }
}
