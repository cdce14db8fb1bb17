//! Show-when / toggle-when wiring over a host view.

use std::rc::Rc;
use std::time::Duration;

use crate::model::{FormSignal, Model};
use crate::resolve::ResolvedInput;
use crate::spec::RuleSpec;
use crate::visibility::{DoWhen, VisibilityRule, apply_do_when};

pub const SLIDE_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    Up,
    Down,
}

/// The slice of a host view the visibility behaviours drive.
pub trait View {
    fn model(&self) -> &Rc<Model>;
    fn set_visible(&self, visible: bool);
    /// Runs the slide transition and calls `done` when it finishes.
    fn slide(&self, direction: SlideDirection, duration: Duration, done: Box<dyn FnOnce()>);
    fn render(&self);
}

/// Shows or hides `view` as `rule` flips. Animated changes slide first and
/// toggle on completion, then ask the form to resize.
pub fn apply_show_when<V>(view: &Rc<V>, rule: Option<VisibilityRule>) -> Option<DoWhen>
where
    V: View + ?Sized + 'static,
{
    let weak = Rc::downgrade(view);
    apply_do_when(view.model(), rule, move |visible, options| {
        let Some(view) = weak.upgrade() else {
            return;
        };
        if !options.animate {
            view.set_visible(visible);
            return;
        }
        let direction = if visible {
            SlideDirection::Down
        } else {
            SlideDirection::Up
        };
        let target = Rc::downgrade(&view);
        view.slide(
            direction,
            SLIDE_DURATION,
            Box::new(move || {
                if let Some(view) = target.upgrade() {
                    view.set_visible(visible);
                    view.model().trigger(FormSignal::Resize);
                }
            }),
        );
    })
}

/// Toggles `view` immediately and asks the form to resize. Animated changes
/// re-render the view instead of sliding it.
pub fn apply_toggle_when<V>(view: &Rc<V>, rule: Option<VisibilityRule>) -> Option<DoWhen>
where
    V: View + ?Sized + 'static,
{
    let weak = Rc::downgrade(view);
    apply_do_when(view.model(), rule, move |visible, options| {
        let Some(view) = weak.upgrade() else {
            return;
        };
        view.set_visible(visible);
        view.model().trigger(FormSignal::Resize);
        if options.animate {
            view.render();
        }
    })
}

/// Both behaviours of a resolved input, attached to its view.
#[derive(Debug, Default)]
pub struct VisibilityBindings {
    pub show_when: Option<DoWhen>,
    pub toggle_when: Option<DoWhen>,
}

impl VisibilityBindings {
    pub fn attach<V>(view: &Rc<V>, input: &ResolvedInput) -> Self
    where
        V: View + ?Sized + 'static,
    {
        let rule = |spec: Option<&RuleSpec>| spec.and_then(RuleSpec::to_rule);
        Self {
            show_when: apply_show_when(view, rule(input.options.show_when.as_ref())),
            toggle_when: apply_toggle_when(view, rule(input.options.toggle_when.as_ref())),
        }
    }

    /// Forwards the view's render hook to both rules.
    pub fn render(&self) {
        for binding in [&self.show_when, &self.toggle_when].into_iter().flatten() {
            binding.render();
        }
    }
}
