use std::fmt;
use std::rc::Rc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::form::FormContext;
use crate::ids::{INPUT_ID_PREFIX, IdGenerator};
use crate::model::Model;
use crate::spec::{InputKind, InputOptions, InputSpec, NestedInput};
use crate::view::View;

/// Builds the view for each member of a `list` / `group` input.
pub trait CompositeFactory {
    fn create(&self, input: &ResolvedInput, model: &Rc<Model>) -> Rc<dyn View>;
}

/// `params` of a resolved input. Composite kinds carry their resolved
/// members in `inputs` and the member factory in `create`.
#[derive(Clone, Default)]
pub struct InputParams {
    pub inputs: Vec<ResolvedInput>,
    pub create: Option<Rc<dyn CompositeFactory>>,
    pub extra: Map<String, Value>,
}

impl InputParams {
    fn to_value(&self) -> Value {
        let mut map = self.extra.clone();
        if !self.inputs.is_empty() {
            map.insert(
                "inputs".into(),
                Value::Array(self.inputs.iter().map(ResolvedInput::to_value).collect()),
            );
        }
        Value::Object(map)
    }
}

impl fmt::Debug for InputParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputParams")
            .field("inputs", &self.inputs)
            .field("create", &self.create.as_ref().map(|_| ".."))
            .field("extra", &self.extra)
            .finish()
    }
}

/// An input spec after defaults, synthesized fields and read-only forcing.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub id: String,
    pub kind: InputKind,
    pub read_only: bool,
    pub read: bool,
    /// Merged options; `id`, `readOnly`, `read` and `params` live in their
    /// own fields instead.
    pub options: InputOptions,
    pub params: Option<InputParams>,
    /// Custom nested input carried through untouched.
    pub input: Option<NestedInput>,
    pub unknown: Map<String, Value>,
}

impl ResolvedInput {
    pub fn name(&self) -> Option<&str> {
        self.options.name.as_ref().and_then(|name| name.as_single())
    }

    pub fn inputs(&self) -> &[ResolvedInput] {
        self.params
            .as_ref()
            .map(|params| params.inputs.as_slice())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        let mut map: Map<String, Value> = self.options.clone().into();
        for (key, value) in &self.unknown {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("readOnly".into(), Value::Bool(self.read_only));
        map.insert("read".into(), Value::Bool(self.read));
        if let Some(kind) = self.kind.as_type() {
            map.insert("type".into(), Value::from(kind));
        }
        if let InputKind::Button(target) = &self.kind {
            target.write_into(&mut map);
        }
        if let Some(params) = &self.params {
            map.insert("params".into(), params.to_value());
        }
        if let Some(input) = &self.input {
            let nested: Value = match input {
                NestedInput::One(spec) => Value::from(spec.as_ref()),
                NestedInput::Many(specs) => Value::Array(specs.iter().map(Value::from).collect()),
            };
            map.insert("input".into(), nested);
        }
        Value::Object(map)
    }
}

impl Serialize for ResolvedInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Turns input specs into resolved inputs for one form.
pub struct Resolver<'a> {
    form: &'a dyn FormContext,
    ids: &'a dyn IdGenerator,
    factory: Option<Rc<dyn CompositeFactory>>,
}

impl<'a> Resolver<'a> {
    pub fn new(form: &'a dyn FormContext, ids: &'a dyn IdGenerator) -> Self {
        Self {
            form,
            ids,
            factory: None,
        }
    }

    pub fn with_factory(mut self, factory: Option<Rc<dyn CompositeFactory>>) -> Self {
        self.factory = factory;
        self
    }

    /// One resolved input per entry of a sequence `input`, otherwise one for
    /// the spec itself. Never fails; validation is a separate step.
    pub fn resolve(&self, spec: &InputSpec) -> Vec<ResolvedInput> {
        let mut spec = spec.clone();

        let composite = if spec.kind.is_composite() {
            let inputs = spec
                .input
                .take()
                .iter()
                .flat_map(NestedInput::iter)
                .filter_map(|nested| self.resolve(nested).into_iter().next())
                .collect();
            let mut extra = spec.options.params.take().unwrap_or_default();
            extra.remove("inputs");
            extra.remove("create");
            Some(InputParams {
                inputs,
                create: self.factory.clone(),
                extra,
            })
        } else {
            None
        };

        let (items, parent) = match spec.input.take() {
            Some(NestedInput::Many(items)) => (items, spec),
            single => {
                let parent = spec.clone();
                spec.input = single;
                (vec![spec], parent)
            }
        };

        items
            .iter()
            .map(|item| self.resolve_item(item, &parent, composite.as_ref()))
            .collect()
    }

    fn resolve_item(
        &self,
        item: &InputSpec,
        parent: &InputSpec,
        composite: Option<&InputParams>,
    ) -> ResolvedInput {
        let fresh_id = self.ids.next_id(INPUT_ID_PREFIX);
        let form_read_only = self.form.is_read_only();

        let mut options = item
            .options
            .clone()
            .or(&parent.options)
            .or(self.form.defaults());
        let kind = if item.kind.is_unspecified() {
            parent.kind.clone()
        } else {
            item.kind.clone()
        };

        let id = options.id.take().unwrap_or(fresh_id);
        let mut read_only = options
            .read_only
            .take()
            .unwrap_or(form_read_only);
        let mut read = options
            .read
            .take()
            .unwrap_or_else(|| self.form.has_read_mode());
        if form_read_only {
            read = true;
            read_only = true;
        }

        let own_params = options.params.take();
        let params = match composite {
            Some(params) => Some(params.clone()),
            None => own_params.map(|extra| InputParams {
                extra,
                ..InputParams::default()
            }),
        };

        let mut unknown = item.unknown.clone();
        for (key, value) in parent.unknown.iter().filter(|(key, _)| *key != "inputs") {
            unknown.entry(key.clone()).or_insert_with(|| value.clone());
        }

        trace!(%id, kind = ?kind.as_type(), read_only, read, "resolved input");
        ResolvedInput {
            id,
            kind,
            read_only,
            read,
            options,
            params,
            input: item.input.clone(),
            unknown,
        }
    }
}

/// Free-function form of [`Resolver::resolve`].
pub fn resolve(
    spec: &InputSpec,
    form: &dyn FormContext,
    ids: &dyn IdGenerator,
    factory: Option<Rc<dyn CompositeFactory>>,
) -> Vec<ResolvedInput> {
    Resolver::new(form, ids).with_factory(factory).resolve(spec)
}
