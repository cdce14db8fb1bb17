use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::model::{EDIT_MODE_FIELD, Model, Subscription, change_event_string};

pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// One rule entry: a constant or a test over the field's current value.
#[derive(Clone)]
pub enum Condition {
    Literal(bool),
    Predicate(Predicate),
}

impl Condition {
    pub fn predicate<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        Condition::Predicate(Rc::new(test))
    }

    pub fn always() -> Self {
        Condition::Literal(true)
    }

    pub fn test(&self, value: &Value) -> bool {
        match self {
            Condition::Literal(constant) => *constant,
            Condition::Predicate(test) => test(value),
        }
    }
}

impl From<bool> for Condition {
    fn from(constant: bool) -> Self {
        Condition::Literal(constant)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Literal(constant) => f.debug_tuple("Literal").field(constant).finish(),
            Condition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Immutable field -> condition map driving show-when / toggle-when.
///
/// Always contains [`EDIT_MODE_FIELD`]; built only through
/// [`VisibilityRuleBuilder`].
#[derive(Debug, Clone)]
pub struct VisibilityRule {
    conditions: BTreeMap<String, Condition>,
}

impl VisibilityRule {
    pub fn builder() -> VisibilityRuleBuilder {
        VisibilityRuleBuilder::default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// AND of every condition against the model's current values.
    pub fn evaluate(&self, model: &Model) -> bool {
        self.conditions
            .iter()
            .all(|(field, condition)| condition.test(&model.get(field)))
    }
}

#[derive(Debug, Default)]
pub struct VisibilityRuleBuilder {
    conditions: BTreeMap<String, Condition>,
}

impl VisibilityRuleBuilder {
    pub fn when(mut self, field: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.conditions.insert(field.into(), condition.into());
        self
    }

    pub fn when_value<F>(self, field: impl Into<String>, test: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.when(field, Condition::predicate(test))
    }

    /// `None` for an empty rule. Otherwise the edit-mode field is added as
    /// always-true unless the caller already set it.
    pub fn build(mut self) -> Option<VisibilityRule> {
        if self.conditions.is_empty() {
            return None;
        }
        self.conditions
            .entry(EDIT_MODE_FIELD.to_string())
            .or_insert_with(Condition::always);
        Some(VisibilityRule {
            conditions: self.conditions,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeOptions {
    pub animate: bool,
}

type ChangeCallback = Rc<dyn Fn(bool, ChangeOptions)>;

/// A rule attached to a model. Dropping it detaches every listener.
pub struct DoWhen {
    model: Rc<Model>,
    rule: Rc<VisibilityRule>,
    state: Rc<Cell<bool>>,
    on_change: ChangeCallback,
    subscriptions: Vec<Subscription>,
}

/// Watches every field of `rule` and calls `on_change` with
/// `animate: true` whenever the aggregate flips.
///
/// Returns `None` when there is no rule to apply.
pub fn apply_do_when<F>(model: &Rc<Model>, rule: Option<VisibilityRule>, on_change: F) -> Option<DoWhen>
where
    F: Fn(bool, ChangeOptions) + 'static,
{
    let rule = Rc::new(rule?);
    let on_change: ChangeCallback = Rc::new(on_change);
    let state = Rc::new(Cell::new(rule.evaluate(model)));
    let fields: Vec<String> = rule.fields().map(str::to_owned).collect();
    debug!(
        events = %change_event_string(&fields),
        initial = state.get(),
        "attaching conditional visibility"
    );

    let subscriptions = fields
        .iter()
        .map(|field| {
            let rule = Rc::clone(&rule);
            let state = Rc::clone(&state);
            let on_change = Rc::clone(&on_change);
            model.on_change(field.clone(), move |model, _| {
                let current = rule.evaluate(model);
                if state.replace(current) != current {
                    on_change(current, ChangeOptions { animate: true });
                }
            })
        })
        .collect();

    Some(DoWhen {
        model: Rc::clone(model),
        rule,
        state,
        on_change,
        subscriptions,
    })
}

impl DoWhen {
    pub fn current(&self) -> bool {
        self.state.get()
    }

    pub fn rule(&self) -> &VisibilityRule {
        &self.rule
    }

    /// Render hook: re-evaluates and always reports, without animation.
    pub fn render(&self) {
        let current = self.rule.evaluate(&self.model);
        self.state.set(current);
        (self.on_change)(current, ChangeOptions { animate: false });
    }
}

impl Drop for DoWhen {
    fn drop(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            self.model.unsubscribe(subscription);
        }
    }
}

impl fmt::Debug for DoWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoWhen")
            .field("rule", &self.rule)
            .field("current", &self.state.get())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}
