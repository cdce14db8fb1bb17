use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::debug;

use crate::model::{EDIT_MODE_FIELD, FormSignal, Model, PENDING_FIELD, Subscription};
use crate::schedule::{Scheduler, TaskHandle};

/// Label frames shown while a save is in flight.
pub const SAVE_BUTTON_PHASES: [&str; 10] = [
    "•         ",
    "•  •      ",
    "•  •  •   ",
    "•  •  •  •",
    "   •  •  •",
    "      •  •",
    "         •",
    "          ",
    "          ",
    "          ",
];

pub const SAVING_LABEL_DELAY: Duration = Duration::from_millis(1000);
pub const SAVING_LABEL_PERIOD: Duration = Duration::from_millis(200);

pub const CANCEL_TEXT: &str = "Cancel";
pub const PREVIOUS_TEXT: &str = "Previous";
pub const EDIT_TEXT: &str = "Edit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonType {
    Save,
    Cancel,
    Previous,
    Custom(String),
}

impl ButtonType {
    pub fn as_str(&self) -> &str {
        match self {
            ButtonType::Save => "save",
            ButtonType::Cancel => "cancel",
            ButtonType::Previous => "previous",
            ButtonType::Custom(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

pub type Action = Rc<dyn Fn(&Button)>;

#[derive(Clone, Default)]
pub struct ButtonOptions {
    pub kind: Option<ButtonType>,
    pub text: Option<String>,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub action: Option<Action>,
}

impl ButtonOptions {
    pub fn new(kind: ButtonType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Button) + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    /// Per-type defaults; anything the caller set wins.
    fn with_type_defaults(mut self) -> Self {
        match self.kind {
            Some(ButtonType::Save) => {
                self.class_name
                    .get_or_insert_with(|| "button-primary".to_string());
            }
            Some(ButtonType::Cancel) => {
                self.text.get_or_insert_with(|| CANCEL_TEXT.to_string());
                self.action
                    .get_or_insert_with(|| trigger_action(FormSignal::Cancel));
            }
            Some(ButtonType::Previous) => {
                self.text.get_or_insert_with(|| PREVIOUS_TEXT.to_string());
                self.action
                    .get_or_insert_with(|| trigger_action(FormSignal::Previous));
            }
            Some(ButtonType::Custom(_)) | None => {}
        }
        self
    }
}

impl fmt::Debug for ButtonOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonOptions")
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("id", &self.id)
            .field("class_name", &self.class_name)
            .field("action", &self.action.as_ref().map(|_| ".."))
            .finish()
    }
}

fn trigger_action(signal: FormSignal) -> Action {
    Rc::new(move |button: &Button| button.model().trigger(signal))
}

#[derive(Debug, Default)]
struct SavingTimers {
    delay: Option<TaskHandle>,
    tick: Option<TaskHandle>,
}

/// A form button. Enabled/disabled follows the model's saving-state
/// signals; save buttons also animate their label while disabled.
pub struct Button {
    options: ButtonOptions,
    model: Rc<Model>,
    scheduler: Rc<dyn Scheduler>,
    disabled: Cell<bool>,
    label: RefCell<String>,
    timers: RefCell<SavingTimers>,
    subscriptions: RefCell<Vec<Subscription>>,
}

pub fn create_button(
    options: ButtonOptions,
    model: &Rc<Model>,
    scheduler: Rc<dyn Scheduler>,
) -> Rc<Button> {
    let options = options.with_type_defaults();
    let button = Rc::new(Button {
        label: RefCell::new(options.text.clone().unwrap_or_default()),
        options,
        model: Rc::clone(model),
        scheduler,
        disabled: Cell::new(false),
        timers: RefCell::new(SavingTimers::default()),
        subscriptions: RefCell::new(Vec::new()),
    });

    let weak = Rc::downgrade(&button);
    let on_set = model.on_signal(FormSignal::SetSavingState, move |_, _| {
        if let Some(button) = weak.upgrade() {
            button.begin_saving();
        }
    });
    let weak = Rc::downgrade(&button);
    let on_clear = model.on_signal(FormSignal::ClearSavingState, move |_, _| {
        if let Some(button) = weak.upgrade() {
            button.end_saving();
        }
    });
    button.subscriptions.borrow_mut().extend([on_set, on_clear]);
    button
}

impl Button {
    pub fn model(&self) -> &Rc<Model> {
        &self.model
    }

    pub fn kind(&self) -> Option<&ButtonType> {
        self.options.kind.as_ref()
    }

    pub fn is_save(&self) -> bool {
        self.options.kind == Some(ButtonType::Save)
    }

    /// `submit` for save buttons, `button` otherwise.
    pub fn input_type(&self) -> &'static str {
        if self.is_save() { "submit" } else { "button" }
    }

    pub fn data_type(&self) -> Option<&str> {
        self.options.kind.as_ref().map(ButtonType::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.options.id.as_deref()
    }

    pub fn text(&self) -> &str {
        self.options.text.as_deref().unwrap_or_default()
    }

    /// What the button currently displays.
    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn class_names(&self) -> Vec<String> {
        let mut classes = vec!["button".to_string()];
        classes.extend(self.options.class_name.clone());
        if self.is_disabled() {
            classes.push("btn-disabled".to_string());
        }
        classes
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    pub fn disable(&self) {
        self.disabled.set(true);
    }

    pub fn enable(&self) {
        self.disabled.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.model.get(PENDING_FIELD).as_bool() == Some(true)
    }

    pub fn press_down(&self) {
        self.model.set(PENDING_FIELD, true);
    }

    pub fn press_up(&self) {
        self.model.set(PENDING_FIELD, false);
    }

    /// Runs the action unless disabled. Returns whether it ran.
    pub fn click(&self) -> bool {
        match &self.options.action {
            Some(action) if !self.is_disabled() => {
                action(self);
                true
            }
            _ => false,
        }
    }

    pub fn key_up(&self, key: Key) -> bool {
        key == Key::Enter && self.click()
    }

    /// Cancels pending timers and detaches from the model.
    pub fn teardown(&self) {
        self.cancel_timers();
        for subscription in self.subscriptions.borrow_mut().drain(..) {
            self.model.unsubscribe(subscription);
        }
    }

    fn begin_saving(self: &Rc<Self>) {
        self.disable();
        if !self.is_save() {
            return;
        }
        self.stop_animation();
        let weak = Rc::downgrade(self);
        let delay = self.scheduler.schedule_once(
            SAVING_LABEL_DELAY,
            Box::new(move || {
                if let Some(button) = weak.upgrade() {
                    button.start_phases();
                }
            }),
        );
        self.timers.borrow_mut().delay = Some(delay);
        debug!(?delay, "save button waiting to animate");
    }

    fn start_phases(self: &Rc<Self>) {
        self.timers.borrow_mut().delay = None;
        let weak = Rc::downgrade(self);
        let mut phase = 0usize;
        let tick = self.scheduler.schedule_repeating(
            SAVING_LABEL_PERIOD,
            Box::new(move || {
                if let Some(button) = weak.upgrade() {
                    let frame = SAVE_BUTTON_PHASES[phase % SAVE_BUTTON_PHASES.len()];
                    *button.label.borrow_mut() = frame.to_string();
                    phase += 1;
                }
            }),
        );
        self.timers.borrow_mut().tick = Some(tick);
    }

    fn end_saving(&self) {
        self.enable();
        if self.is_save() {
            self.stop_animation();
        }
    }

    /// Drops both timers and puts the button text back in place of any frame.
    fn stop_animation(&self) {
        self.cancel_timers();
        *self.label.borrow_mut() = self.text().to_string();
    }

    fn cancel_timers(&self) {
        let timers = std::mem::take(&mut *self.timers.borrow_mut());
        for handle in [timers.delay, timers.tick].into_iter().flatten() {
            self.scheduler.cancel(handle);
        }
    }
}

impl Drop for Button {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("options", &self.options)
            .field("label", &self.label.borrow())
            .field("disabled", &self.disabled.get())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFormAction {
    Edit,
    Cancel,
}

/// Link-style click carrying the host's prevent-default flag.
#[derive(Debug, Default)]
pub struct LinkClick {
    default_prevented: bool,
}

impl LinkClick {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Anchor shown on read-mode forms to enter edit mode or cancel.
#[derive(Debug)]
pub struct ReadFormButton {
    action: ReadFormAction,
    text: String,
    aria_label: String,
    model: Rc<Model>,
}

pub fn create_read_form_button(
    action: ReadFormAction,
    form_title: &str,
    model: &Rc<Model>,
) -> ReadFormButton {
    let (text, aria_label) = match action {
        ReadFormAction::Cancel => (CANCEL_TEXT.to_string(), CANCEL_TEXT.to_string()),
        ReadFormAction::Edit => (EDIT_TEXT.to_string(), format!("{EDIT_TEXT} {form_title}")),
    };
    ReadFormButton {
        action,
        text,
        aria_label,
        model: Rc::clone(model),
    }
}

impl ReadFormButton {
    pub fn href(&self) -> &'static str {
        "#"
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn aria_label(&self) -> &str {
        &self.aria_label
    }

    pub fn click(&self, event: &mut LinkClick) {
        event.prevent_default();
        match self.action {
            ReadFormAction::Cancel => self.model.trigger(FormSignal::Cancel),
            ReadFormAction::Edit => {
                self.model.set(EDIT_MODE_FIELD, true);
            }
        }
    }
}
