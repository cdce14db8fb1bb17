use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::is_known_option;
use crate::spec::SpecError;
use crate::spec::condition::RuleSpec;

/// Model field(s) an input binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldName {
    Single(String),
    Many(Vec<String>),
}

impl FieldName {
    pub fn is_many(&self) -> bool {
        matches!(self, FieldName::Many(_))
    }

    /// An empty single name counts as no name at all.
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldName::Single(name) if name.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let names: &[String] = match self {
            FieldName::Single(name) => std::slice::from_ref(name),
            FieldName::Many(names) => names,
        };
        names.iter().map(String::as_str)
    }

    pub fn as_single(&self) -> Option<&str> {
        match self {
            FieldName::Single(name) => Some(name),
            FieldName::Many(_) => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            FieldName::Single(name) => Value::String(name.clone()),
            FieldName::Many(names) => Value::from(names.clone()),
        }
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        FieldName::Single(name.to_string())
    }
}

impl From<String> for FieldName {
    fn from(name: String) -> Self {
        FieldName::Single(name)
    }
}

impl From<Vec<String>> for FieldName {
    fn from(names: Vec<String>) -> Self {
        FieldName::Many(names)
    }
}

/// Nested spec(s) under `input`.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedInput {
    One(Box<InputSpec>),
    Many(Vec<InputSpec>),
}

impl NestedInput {
    pub fn is_many(&self) -> bool {
        matches!(self, NestedInput::Many(_))
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputSpec> {
        let specs: &[InputSpec] = match self {
            NestedInput::One(spec) => std::slice::from_ref(spec.as_ref()),
            NestedInput::Many(specs) => specs,
        };
        specs.iter()
    }

    fn to_value(&self) -> Value {
        match self {
            NestedInput::One(spec) => Value::from(spec.as_ref()),
            NestedInput::Many(specs) => Value::Array(specs.iter().map(Value::from).collect()),
        }
    }
}

/// Button-only options; they sit outside the allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonTarget {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub click: Option<String>,
    pub href: Option<String>,
}

impl ButtonTarget {
    pub(crate) fn write_into(&self, map: &mut Map<String, Value>) {
        put(map, "title", self.title.clone().map(Value::String));
        put(map, "icon", self.icon.clone().map(Value::String));
        put(map, "click", self.click.clone().map(Value::String));
        put(map, "href", self.href.clone().map(Value::String));
    }
}

/// The `type` of an input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InputKind {
    #[default]
    Unspecified,
    Text,
    Password,
    Textarea,
    Select,
    Radio,
    Checkbox,
    List,
    Group,
    Button(ButtonTarget),
    Label,
    Custom(String),
}

impl InputKind {
    pub fn from_type(kind: Option<&str>) -> Self {
        match kind {
            None => InputKind::Unspecified,
            Some("text") => InputKind::Text,
            Some("password") => InputKind::Password,
            Some("textarea") => InputKind::Textarea,
            Some("select") => InputKind::Select,
            Some("radio") => InputKind::Radio,
            Some("checkbox") => InputKind::Checkbox,
            Some("list") => InputKind::List,
            Some("group") => InputKind::Group,
            Some("button") => InputKind::Button(ButtonTarget::default()),
            Some("label") => InputKind::Label,
            Some(other) => InputKind::Custom(other.to_string()),
        }
    }

    pub fn as_type(&self) -> Option<&str> {
        Some(match self {
            InputKind::Unspecified => return None,
            InputKind::Text => "text",
            InputKind::Password => "password",
            InputKind::Textarea => "textarea",
            InputKind::Select => "select",
            InputKind::Radio => "radio",
            InputKind::Checkbox => "checkbox",
            InputKind::List => "list",
            InputKind::Group => "group",
            InputKind::Button(_) => "button",
            InputKind::Label => "label",
            InputKind::Custom(kind) => kind.as_str(),
        })
    }

    /// `list` and `group` fold their nested inputs into `params.inputs`.
    pub fn is_composite(&self) -> bool {
        matches!(self, InputKind::List | InputKind::Group)
    }

    pub fn is_unspecified(&self) -> bool {
        matches!(self, InputKind::Unspecified)
    }
}

/// The mergeable option layer shared by specs, form defaults and resolved inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct InputOptions {
    pub id: Option<String>,
    pub input_id: Option<String>,
    pub name: Option<FieldName>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub read_only: Option<bool>,
    pub read: Option<bool>,
    pub disabled: Option<bool>,
    pub show_when: Option<RuleSpec>,
    pub toggle_when: Option<RuleSpec>,
    pub params: Option<Map<String, Value>>,
    /// Remaining options, keyed as written.
    pub other: Map<String, Value>,
}

impl InputOptions {
    /// Fills every option left unset here from `lower`.
    pub fn or(mut self, lower: &InputOptions) -> InputOptions {
        fill(&mut self.id, &lower.id);
        fill(&mut self.input_id, &lower.input_id);
        fill(&mut self.name, &lower.name);
        fill(&mut self.label, &lower.label);
        fill(&mut self.placeholder, &lower.placeholder);
        fill(&mut self.read_only, &lower.read_only);
        fill(&mut self.read, &lower.read);
        fill(&mut self.disabled, &lower.disabled);
        fill(&mut self.show_when, &lower.show_when);
        fill(&mut self.toggle_when, &lower.toggle_when);
        fill(&mut self.params, &lower.params);
        for (key, value) in &lower.other {
            self.other
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Pulls the typed keys out of `map`, leaving everything else behind.
    fn take_typed(map: &mut Map<String, Value>) -> Result<Self, SpecError> {
        Ok(Self {
            id: take_string(map, "id")?,
            input_id: take_string(map, "inputId")?,
            name: take_name(map)?,
            label: take_string(map, "label")?,
            placeholder: take_string(map, "placeholder")?,
            read_only: take_bool(map, "readOnly")?,
            read: take_bool(map, "read")?,
            disabled: take_bool(map, "disabled")?,
            show_when: take_rule(map, "showWhen")?,
            toggle_when: take_rule(map, "toggleWhen")?,
            params: take_object(map, "params")?,
            other: Map::new(),
        })
    }

    fn write_into(&self, map: &mut Map<String, Value>) {
        for (key, value) in &self.other {
            map.insert(key.clone(), value.clone());
        }
        put(map, "id", self.id.clone().map(Value::String));
        put(map, "inputId", self.input_id.clone().map(Value::String));
        put(map, "name", self.name.as_ref().map(FieldName::to_value));
        put(map, "label", self.label.clone().map(Value::String));
        put(map, "placeholder", self.placeholder.clone().map(Value::String));
        put(map, "readOnly", self.read_only.map(Value::Bool));
        put(map, "read", self.read.map(Value::Bool));
        put(map, "disabled", self.disabled.map(Value::Bool));
        put(map, "showWhen", self.show_when.as_ref().map(rule_value));
        put(map, "toggleWhen", self.toggle_when.as_ref().map(rule_value));
        put(map, "params", self.params.clone().map(Value::Object));
    }
}

impl TryFrom<Map<String, Value>> for InputOptions {
    type Error = SpecError;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut options = Self::take_typed(&mut map)?;
        options.other = map;
        Ok(options)
    }
}

impl From<InputOptions> for Map<String, Value> {
    fn from(options: InputOptions) -> Self {
        let mut map = Map::new();
        options.write_into(&mut map);
        map
    }
}

/// Declarative description of one form field or group of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct InputSpec {
    pub kind: InputKind,
    pub options: InputOptions,
    pub input: Option<NestedInput>,
    /// Keys outside the allow-list; only ever reported, never consumed.
    pub unknown: Map<String, Value>,
}

impl InputSpec {
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn named(mut self, name: impl Into<FieldName>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.options.label = Some(label.into());
        self
    }

    pub fn with_inputs(mut self, inputs: Vec<InputSpec>) -> Self {
        self.input = Some(NestedInput::Many(inputs));
        self
    }

    pub fn with_input(mut self, input: InputSpec) -> Self {
        self.input = Some(NestedInput::One(Box::new(input)));
        self
    }

    pub fn from_value(value: Value) -> Result<Self, SpecError> {
        Self::try_from(value)
    }

    fn from_map(mut map: Map<String, Value>) -> Result<Self, SpecError> {
        let mut kind = InputKind::from_type(take_string(&mut map, "type")?.as_deref());
        if let InputKind::Button(target) = &mut kind {
            target.title = take_string(&mut map, "title")?;
            target.icon = take_string(&mut map, "icon")?;
            target.click = take_string(&mut map, "click")?;
            target.href = take_string(&mut map, "href")?;
        }

        let input = match map.remove("input") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(NestedInput::Many(
                items
                    .into_iter()
                    .map(InputSpec::try_from)
                    .collect::<Result<_, _>>()?,
            )),
            Some(nested @ Value::Object(_)) => {
                Some(NestedInput::One(Box::new(InputSpec::try_from(nested)?)))
            }
            Some(other) => {
                return Err(SpecError::InvalidType {
                    key: "input",
                    expected: "an object or an array of objects",
                    found: json_type(&other),
                });
            }
        };

        let mut options = InputOptions::take_typed(&mut map)?;
        let mut unknown = Map::new();
        for (key, value) in map {
            if is_known_option(&key) {
                options.other.insert(key, value);
            } else {
                unknown.insert(key, value);
            }
        }

        Ok(Self {
            kind,
            options,
            input,
            unknown,
        })
    }
}

impl TryFrom<Value> for InputSpec {
    type Error = SpecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(SpecError::NotAnObject {
                found: json_type(&other),
            }),
        }
    }
}

impl From<&InputSpec> for Value {
    fn from(spec: &InputSpec) -> Self {
        let mut map = spec.unknown.clone();
        spec.options.write_into(&mut map);
        put(&mut map, "type", spec.kind.as_type().map(Value::from));
        if let InputKind::Button(target) = &spec.kind {
            target.write_into(&mut map);
        }
        put(&mut map, "input", spec.input.as_ref().map(NestedInput::to_value));
        Value::Object(map)
    }
}

impl From<InputSpec> for Value {
    fn from(spec: InputSpec) -> Self {
        Value::from(&spec)
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, lower: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(lower);
    }
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn rule_value(rule: &RuleSpec) -> Value {
    serde_json::to_value(rule).unwrap_or(Value::Null)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn take_string(map: &mut Map<String, Value>, key: &'static str) -> Result<Option<String>, SpecError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(SpecError::InvalidType {
            key,
            expected: "a string",
            found: json_type(&other),
        }),
    }
}

fn take_bool(map: &mut Map<String, Value>, key: &'static str) -> Result<Option<bool>, SpecError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(flag)),
        Some(other) => Err(SpecError::InvalidType {
            key,
            expected: "a boolean",
            found: json_type(&other),
        }),
    }
}

fn take_object(
    map: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<Map<String, Value>>, SpecError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(object)) => Ok(Some(object)),
        Some(other) => Err(SpecError::InvalidType {
            key,
            expected: "an object",
            found: json_type(&other),
        }),
    }
}

fn take_name(map: &mut Map<String, Value>) -> Result<Option<FieldName>, SpecError> {
    let invalid = |found: &Value| SpecError::InvalidType {
        key: "name",
        expected: "a string or an array of strings",
        found: json_type(found),
    };
    match map.remove("name") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) => Ok(Some(FieldName::Single(name))),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(name) => Ok(name),
                other => Err(invalid(&other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|names| Some(FieldName::Many(names))),
        Some(other) => Err(invalid(&other)),
    }
}

fn take_rule(map: &mut Map<String, Value>, key: &'static str) -> Result<Option<RuleSpec>, SpecError> {
    match map.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| SpecError::InvalidRule { key, source }),
    }
}
