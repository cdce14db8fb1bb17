use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};

use crate::model::{Model, Subscription};
use crate::resolve::{CompositeFactory, ResolvedInput};
use crate::schedule::{Scheduler, TaskHandle};
use crate::view::{SlideDirection, View};

pub const CALLING_CODE_FIELD: &str = "countryCallingCode";
pub const INPUT_GROUP_CLASS: &str = "o-form-input-group";

const FIELD_CLASSES: [&str; 3] = ["okta-form-input-field", "input-fix", "o-form-control"];

/// Text input with the model's country calling code shown inline.
pub struct PhoneTextBox {
    input: ResolvedInput,
    model: Rc<Model>,
    calling_code: Rc<RefCell<String>>,
    classes: RefCell<BTreeSet<String>>,
    parent_classes: Rc<RefCell<BTreeSet<String>>>,
    visible: Cell<bool>,
    renders: Cell<usize>,
    subscription: Subscription,
    deferred: RefCell<Option<(Rc<dyn Scheduler>, TaskHandle)>>,
}

impl PhoneTextBox {
    pub fn new(input: ResolvedInput, model: &Rc<Model>) -> Rc<Self> {
        let calling_code = Rc::new(RefCell::new(calling_code_of(model)));
        let label = Rc::clone(&calling_code);
        let subscription = model.on_change(CALLING_CODE_FIELD, move |model, _| {
            *label.borrow_mut() = calling_code_of(model);
        });
        Rc::new(Self {
            input,
            model: Rc::clone(model),
            calling_code,
            classes: RefCell::new(FIELD_CLASSES.iter().map(|class| class.to_string()).collect()),
            parent_classes: Rc::default(),
            visible: Cell::new(true),
            renders: Cell::new(0),
            subscription,
            deferred: RefCell::new(None),
        })
    }

    pub fn input(&self) -> &ResolvedInput {
        &self.input
    }

    pub fn calling_code(&self) -> String {
        self.calling_code.borrow().clone()
    }

    /// Values the input template is rendered with.
    pub fn template_context(&self) -> Value {
        let name = self.input.name();
        json!({
            "type": self.input.kind.as_type().unwrap_or("text"),
            "placeholder": self.input.options.placeholder,
            "name": name,
            "inputId": self.input.options.input_id.as_deref().unwrap_or(&self.input.id),
            "value": name.map(|name| self.model.get(name)).unwrap_or(Value::Null),
            "countryCallingCode": self.calling_code(),
        })
    }

    /// Swaps the field classes for an input group on the parent container.
    /// The parent is only updated on the next turn of the loop, and not at
    /// all if the box is dropped first.
    pub fn post_render(&self, scheduler: Rc<dyn Scheduler>) {
        {
            let mut classes = self.classes.borrow_mut();
            classes.remove("input-fix");
            classes.remove("o-form-control");
        }
        self.cancel_deferred();
        let parent = Rc::clone(&self.parent_classes);
        let handle = scheduler.schedule_once(
            Duration::ZERO,
            Box::new(move || {
                parent.borrow_mut().insert(INPUT_GROUP_CLASS.to_string());
            }),
        );
        *self.deferred.borrow_mut() = Some((scheduler, handle));
    }

    fn cancel_deferred(&self) {
        // cancelling a task that already ran is a no-op
        let deferred = self.deferred.borrow_mut().take();
        if let Some((scheduler, handle)) = deferred {
            scheduler.cancel(handle);
        }
    }

    pub fn classes(&self) -> BTreeSet<String> {
        self.classes.borrow().clone()
    }

    pub fn parent_classes(&self) -> BTreeSet<String> {
        self.parent_classes.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn render_count(&self) -> usize {
        self.renders.get()
    }
}

impl View for PhoneTextBox {
    fn model(&self) -> &Rc<Model> {
        &self.model
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn slide(&self, _direction: SlideDirection, _duration: Duration, done: Box<dyn FnOnce()>) {
        done();
    }

    fn render(&self) {
        self.renders.set(self.renders.get() + 1);
        *self.calling_code.borrow_mut() = calling_code_of(&self.model);
    }
}

impl Drop for PhoneTextBox {
    fn drop(&mut self) {
        self.cancel_deferred();
        self.model.unsubscribe(self.subscription);
    }
}

impl fmt::Debug for PhoneTextBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoneTextBox")
            .field("input", &self.input)
            .field("calling_code", &self.calling_code.borrow())
            .field("classes", &self.classes.borrow())
            .field("parent_classes", &self.parent_classes.borrow())
            .field("visible", &self.visible.get())
            .field("deferred", &self.deferred.borrow().as_ref().map(|(_, handle)| *handle))
            .finish_non_exhaustive()
    }
}

/// Builds a [`PhoneTextBox`] for each member of a composite input.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhoneTextBoxFactory;

impl CompositeFactory for PhoneTextBoxFactory {
    fn create(&self, input: &ResolvedInput, model: &Rc<Model>) -> Rc<dyn View> {
        PhoneTextBox::new(input.clone(), model)
    }
}

fn calling_code_of(model: &Model) -> String {
    match model.get(CALLING_CODE_FIELD) {
        Value::String(code) => code,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
