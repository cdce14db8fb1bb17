use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::trace;

/// Reserved field toggled when a read-mode form switches to editing.
pub const EDIT_MODE_FIELD: &str = "__edit__";
/// Reserved field set while a button is held down.
pub const PENDING_FIELD: &str = "__pending__";

/// Form-level events broadcast through the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormSignal {
    Cancel,
    Previous,
    Resize,
    SetSavingState,
    ClearSavingState,
}

impl FormSignal {
    pub const ALL: [FormSignal; 5] = [
        FormSignal::Cancel,
        FormSignal::Previous,
        FormSignal::Resize,
        FormSignal::SetSavingState,
        FormSignal::ClearSavingState,
    ];

    pub fn event_name(self) -> &'static str {
        match self {
            FormSignal::Cancel => "form:cancel",
            FormSignal::Previous => "form:previous",
            FormSignal::Resize => "form:resize",
            FormSignal::SetSavingState => "form:set-saving-state",
            FormSignal::ClearSavingState => "form:clear-saving-state",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|signal| signal.event_name() == name)
    }
}

impl fmt::Display for FormSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// `"change:a change:b"` for the given field names.
pub fn change_event_string<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| format!("change:{}", field.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A single attribute change as delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub field: String,
    pub previous: Value,
    pub current: Value,
}

/// Something that can tell whether a field may be bound to a form input.
pub trait FieldAllowance {
    fn allows(&self, field: &str) -> bool;
}

impl<F> FieldAllowance for F
where
    F: Fn(&str) -> bool,
{
    fn allows(&self, field: &str) -> bool {
        self(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subscription(u64);

type ChangeHandler = Rc<dyn Fn(&Model, &Change)>;
type SignalHandler = Rc<dyn Fn(&Model, FormSignal)>;

enum Handler {
    Change { field: String, handler: ChangeHandler },
    Signal { signal: FormSignal, handler: SignalHandler },
}

/// Observable key-value store shared by a form and its inputs.
///
/// Notifications are synchronous. Handlers run after every internal borrow
/// has been released, so a handler may read, write or subscribe freely.
#[derive(Default)]
pub struct Model {
    attributes: RefCell<Map<String, Value>>,
    schema: Option<BTreeSet<String>>,
    listeners: RefCell<BTreeMap<Subscription, Handler>>,
    next_subscription: Cell<u64>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model that only allows the listed fields.
    pub fn with_schema<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: Some(fields.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_attributes(self, attributes: Map<String, Value>) -> Self {
        *self.attributes.borrow_mut() = attributes;
        self
    }

    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn schema(&self) -> Option<&BTreeSet<String>> {
        self.schema.as_ref()
    }

    /// Current value of `field`; `Value::Null` when unset.
    pub fn get(&self, field: &str) -> Value {
        self.attributes
            .borrow()
            .get(field)
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn attributes(&self) -> Map<String, Value> {
        self.attributes.borrow().clone()
    }

    /// Stores `value` and notifies `field` listeners. Returns false, without
    /// notifying, when the value is unchanged.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) -> bool {
        let field = field.into();
        let current = value.into();
        let previous = {
            let mut attributes = self.attributes.borrow_mut();
            let previous = attributes.get(&field).cloned().unwrap_or(Value::Null);
            if previous == current {
                return false;
            }
            attributes.insert(field.clone(), current.clone());
            previous
        };
        self.dispatch_change(&Change {
            field,
            previous,
            current,
        });
        true
    }

    /// Stores every entry first, then notifies once per changed field.
    pub fn set_many(&self, values: Map<String, Value>) -> usize {
        let changes: Vec<Change> = {
            let mut attributes = self.attributes.borrow_mut();
            values
                .into_iter()
                .filter_map(|(field, current)| {
                    let previous = attributes.get(&field).cloned().unwrap_or(Value::Null);
                    if previous == current {
                        return None;
                    }
                    attributes.insert(field.clone(), current.clone());
                    Some(Change {
                        field,
                        previous,
                        current,
                    })
                })
                .collect()
        };
        for change in &changes {
            self.dispatch_change(change);
        }
        changes.len()
    }

    pub fn on_change<F>(&self, field: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&Model, &Change) + 'static,
    {
        self.subscribe(Handler::Change {
            field: field.into(),
            handler: Rc::new(handler),
        })
    }

    pub fn on_signal<F>(&self, signal: FormSignal, handler: F) -> Subscription
    where
        F: Fn(&Model, FormSignal) + 'static,
    {
        self.subscribe(Handler::Signal {
            signal,
            handler: Rc::new(handler),
        })
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.listeners.borrow_mut().remove(&subscription).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn trigger(&self, signal: FormSignal) {
        trace!(event = %signal, "model signal");
        let handlers: Vec<SignalHandler> = self
            .listeners
            .borrow()
            .values()
            .filter_map(|listener| match listener {
                Handler::Signal {
                    signal: wanted,
                    handler,
                } if *wanted == signal => Some(Rc::clone(handler)),
                _ => None,
            })
            .collect();
        for handler in handlers {
            handler(self, signal);
        }
    }

    fn subscribe(&self, handler: Handler) -> Subscription {
        let id = self.next_subscription.get() + 1;
        self.next_subscription.set(id);
        let subscription = Subscription(id);
        self.listeners.borrow_mut().insert(subscription, handler);
        subscription
    }

    fn dispatch_change(&self, change: &Change) {
        trace!(field = %change.field, "model change");
        let handlers: Vec<ChangeHandler> = self
            .listeners
            .borrow()
            .values()
            .filter_map(|listener| match listener {
                Handler::Change { field, handler } if *field == change.field => {
                    Some(Rc::clone(handler))
                }
                _ => None,
            })
            .collect();
        for handler in handlers {
            handler(self, change);
        }
    }
}

impl FieldAllowance for Model {
    fn allows(&self, field: &str) -> bool {
        self.schema
            .as_ref()
            .is_none_or(|schema| schema.contains(field))
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("attributes", &self.attributes.borrow())
            .field("schema", &self.schema)
            .field("listeners", &self.listener_count())
            .finish()
    }
}
