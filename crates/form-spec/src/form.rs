use std::rc::Rc;

use crate::config::FormConfig;
use crate::ids::SequentialIds;
use crate::model::Model;
use crate::resolve::{CompositeFactory, ResolvedInput, Resolver};
use crate::spec::{InputOptions, InputSpec};
use crate::validate::{Diagnostic, ValidationError, validate};

/// What the resolver needs to know about the owning form.
pub trait FormContext {
    fn model(&self) -> &Rc<Model>;
    fn defaults(&self) -> &InputOptions;
    fn is_read_only(&self) -> bool;
    fn has_read_mode(&self) -> bool;
}

/// A form: owns the shared model, its configuration and the id generator
/// for every input it resolves.
pub struct Form {
    model: Rc<Model>,
    config: FormConfig,
    ids: SequentialIds,
    factory: Option<Rc<dyn CompositeFactory>>,
}

impl Form {
    pub fn new(model: Rc<Model>, config: FormConfig) -> Self {
        Self {
            model,
            config,
            ids: SequentialIds::new(),
            factory: None,
        }
    }

    pub fn with_factory(mut self, factory: Rc<dyn CompositeFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn ids(&self) -> &SequentialIds {
        &self.ids
    }

    pub fn validate(&self, spec: &InputSpec) -> Result<Vec<Diagnostic>, ValidationError> {
        validate(spec, Some(self.model.as_ref()))
    }

    pub fn resolve(&self, spec: &InputSpec) -> Vec<ResolvedInput> {
        Resolver::new(self, &self.ids)
            .with_factory(self.factory.clone())
            .resolve(spec)
    }

    /// Validates against the model, then resolves. A fatal validation
    /// error means the input must not be rendered.
    pub fn prepare(&self, spec: &InputSpec) -> Result<Vec<ResolvedInput>, ValidationError> {
        self.validate(spec)?;
        Ok(self.resolve(spec))
    }
}

impl FormContext for Form {
    fn model(&self) -> &Rc<Model> {
        &self.model
    }

    fn defaults(&self) -> &InputOptions {
        &self.config.defaults
    }

    fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    fn has_read_mode(&self) -> bool {
        self.config.read_mode
    }
}
