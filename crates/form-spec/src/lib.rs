#![allow(missing_docs)]

pub mod button;
pub mod config;
pub mod form;
pub mod ids;
pub mod model;
pub mod options;
pub mod phone;
pub mod resolve;
pub mod schedule;
pub mod spec;
pub mod validate;
pub mod view;
pub mod visibility;

pub use button::{
    Button, ButtonOptions, ButtonType, Key, LinkClick, ReadFormAction, ReadFormButton,
    SAVE_BUTTON_PHASES, create_button, create_read_form_button,
};
pub use config::{ConfigError, FormConfig};
pub use form::{Form, FormContext};
pub use ids::{IdGenerator, SequentialIds};
pub use model::{
    Change, EDIT_MODE_FIELD, FieldAllowance, FormSignal, Model, PENDING_FIELD, Subscription,
    change_event_string,
};
pub use options::{ALL_OPTIONS, OptionCategory};
pub use phone::{PhoneTextBox, PhoneTextBoxFactory};
pub use resolve::{CompositeFactory, InputParams, ResolvedInput, Resolver, resolve};
#[cfg(feature = "tokio")]
pub use schedule::TokioScheduler;
pub use schedule::{ManualScheduler, Scheduler, TaskHandle};
pub use spec::{
    ConditionSpec, FieldName, InputKind, InputOptions, InputSpec, Matcher, NestedInput, RuleSpec,
    SpecError,
};
pub use validate::{Diagnostic, ValidationError, validate};
pub use view::{SlideDirection, View, VisibilityBindings, apply_show_when, apply_toggle_when};
pub use visibility::{ChangeOptions, Condition, DoWhen, VisibilityRule, apply_do_when};
