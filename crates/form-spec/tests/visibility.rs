use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Value, json};

use form_spec::{
    ChangeOptions, Condition, EDIT_MODE_FIELD, Form, FormConfig, FormSignal, InputSpec, Model,
    SlideDirection, View, VisibilityBindings, VisibilityRule, apply_do_when, apply_show_when,
    apply_toggle_when,
};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Visible(bool),
    Slide(SlideDirection),
    Render,
}

/// Records what the visibility behaviours ask of it. Slides complete only
/// when the test says so.
struct RecordingView {
    model: Rc<Model>,
    events: RefCell<Vec<Event>>,
    pending_slide: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl RecordingView {
    fn new(model: &Rc<Model>) -> Rc<Self> {
        Rc::new(Self {
            model: Rc::clone(model),
            events: RefCell::default(),
            pending_slide: RefCell::default(),
        })
    }

    fn take_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn finish_slide(&self) {
        let done = self.pending_slide.borrow_mut().take().expect("a slide in flight");
        done();
    }
}

impl View for RecordingView {
    fn model(&self) -> &Rc<Model> {
        &self.model
    }

    fn set_visible(&self, visible: bool) {
        self.events.borrow_mut().push(Event::Visible(visible));
    }

    fn slide(&self, direction: SlideDirection, duration: Duration, done: Box<dyn FnOnce()>) {
        assert_eq!(duration, Duration::from_millis(200));
        self.events.borrow_mut().push(Event::Slide(direction));
        *self.pending_slide.borrow_mut() = Some(done);
    }

    fn render(&self) {
        self.events.borrow_mut().push(Event::Render);
    }
}

fn resize_counter(model: &Model) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let counter = Rc::clone(&count);
    model.on_signal(FormSignal::Resize, move |_, _| counter.set(counter.get() + 1));
    count
}

fn status_rule() -> Option<VisibilityRule> {
    VisibilityRule::builder()
        .when_value("status", |value| value == &json!("active"))
        .build()
}

#[test]
fn empty_rule_attaches_nothing() {
    let model = Model::new().shared();
    assert!(VisibilityRule::builder().build().is_none());
    assert!(apply_do_when(&model, None, |_, _| {}).is_none());
    assert_eq!(model.listener_count(), 0);
}

#[test]
fn rules_always_include_edit_mode() {
    let rule = status_rule().expect("rule");
    assert_eq!(rule.len(), 2);
    assert!(matches!(
        rule.get(EDIT_MODE_FIELD),
        Some(Condition::Literal(true))
    ));

    let overridden = VisibilityRule::builder()
        .when(EDIT_MODE_FIELD, false)
        .build()
        .expect("rule");
    assert!(matches!(
        overridden.get(EDIT_MODE_FIELD),
        Some(Condition::Literal(false))
    ));
}

#[test]
fn literal_conditions_ignore_the_model() {
    let model = Model::new();
    model.set("a", false);
    let rule = VisibilityRule::builder()
        .when("a", true)
        .build()
        .expect("rule");
    assert!(rule.evaluate(&model));
}

#[test]
fn callback_fires_once_per_flip() {
    let model = Model::new().shared();
    model.set("status", "inactive");
    let calls: Rc<RefCell<Vec<(bool, ChangeOptions)>>> = Rc::default();
    let sink = Rc::clone(&calls);
    let binding = apply_do_when(&model, status_rule(), move |visible, options| {
        sink.borrow_mut().push((visible, options));
    })
    .expect("attached");

    assert!(!binding.current());
    assert!(calls.borrow().is_empty());

    model.set("status", "active");
    model.set("status", "active");
    model.set("unrelated", 1);
    assert_eq!(
        calls.borrow().as_slice(),
        &[(true, ChangeOptions { animate: true })]
    );

    model.set("status", "disabled");
    model.set("status", "locked");
    assert_eq!(calls.borrow().len(), 2);
    assert_eq!(calls.borrow()[1], (false, ChangeOptions { animate: true }));

    binding.render();
    assert_eq!(calls.borrow()[2], (false, ChangeOptions { animate: false }));
}

#[test]
fn dropping_the_binding_detaches_listeners() {
    let model = Model::new().shared();
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let binding = apply_do_when(&model, status_rule(), move |_, _| counter.set(counter.get() + 1));
    assert_eq!(model.listener_count(), 2);

    drop(binding);
    assert_eq!(model.listener_count(), 0);
    model.set("status", "active");
    assert_eq!(calls.get(), 0);
}

#[test]
fn show_when_slides_then_toggles_and_resizes() {
    let model = Model::new().shared();
    let resizes = resize_counter(&model);
    let view = RecordingView::new(&model);
    let binding = apply_show_when(&view, status_rule()).expect("attached");

    binding.render();
    assert_eq!(view.take_events(), vec![Event::Visible(false)]);
    assert_eq!(resizes.get(), 0);

    model.set("status", "active");
    assert_eq!(view.take_events(), vec![Event::Slide(SlideDirection::Down)]);
    assert_eq!(resizes.get(), 0);

    view.finish_slide();
    assert_eq!(view.take_events(), vec![Event::Visible(true)]);
    assert_eq!(resizes.get(), 1);

    model.set("status", "gone");
    view.finish_slide();
    assert_eq!(
        view.take_events(),
        vec![Event::Slide(SlideDirection::Up), Event::Visible(false)]
    );
    assert_eq!(resizes.get(), 2);
}

#[test]
fn toggle_when_toggles_immediately_and_rerenders() {
    let model = Model::new().shared();
    let resizes = resize_counter(&model);
    let view = RecordingView::new(&model);
    let binding = apply_toggle_when(&view, status_rule()).expect("attached");

    binding.render();
    assert_eq!(view.take_events(), vec![Event::Visible(false)]);
    assert_eq!(resizes.get(), 1);

    model.set("status", "active");
    assert_eq!(view.take_events(), vec![Event::Visible(true), Event::Render]);
    assert_eq!(resizes.get(), 2);
}

#[test]
fn edit_mode_can_be_watched_with_a_caller_predicate() {
    let model = Model::new().shared();
    model.set("status", "active");
    let view = RecordingView::new(&model);
    let rule = VisibilityRule::builder()
        .when_value("status", |value| value == &json!("active"))
        .when_value(EDIT_MODE_FIELD, |value| value != &json!(false))
        .build();
    let _binding = apply_toggle_when(&view, rule).expect("attached");

    model.set(EDIT_MODE_FIELD, false);
    assert_eq!(view.take_events(), vec![Event::Visible(false), Event::Render]);

    // the implicit entry is a constant, so the default rule ignores edit mode
    let _default = apply_toggle_when(&view, status_rule()).expect("attached");
    model.set(EDIT_MODE_FIELD, true);
    model.set(EDIT_MODE_FIELD, false);
    assert_eq!(
        view.take_events(),
        vec![
            Event::Visible(true),
            Event::Render,
            Event::Visible(false),
            Event::Render
        ]
    );
}

#[test]
fn bindings_follow_resolved_json_rules() {
    let model = Model::new().shared();
    let form = Form::new(Rc::clone(&model), FormConfig::default());
    let spec = InputSpec::from_value(json!({
        "name": "reason",
        "showWhen": { "status": { "one_of": ["locked", "suspended"] } },
        "toggleWhen": { "advanced": true }
    }))
    .expect("fixture should parse");
    let resolved = form.prepare(&spec).expect("valid");
    let view = RecordingView::new(&model);

    let bindings = VisibilityBindings::attach(&view, &resolved[0]);
    assert!(bindings.show_when.is_some());
    assert!(bindings.toggle_when.is_some());

    bindings.render();
    assert_eq!(
        view.take_events(),
        vec![Event::Visible(false), Event::Visible(true)]
    );

    model.set("status", Value::from("locked"));
    assert_eq!(view.take_events(), vec![Event::Slide(SlideDirection::Down)]);
}
