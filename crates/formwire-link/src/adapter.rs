#![forbid(unsafe_code)]

//! The function bundle a control contributes to a binding.
//!
//! A control is described entirely by five functions over its local value
//! type `L`:
//!
//! - `get` / `set` read and write the control's local state;
//! - `parse` turns local state into a model value, or fails;
//! - `format` renders a model value as local state;
//! - `trigger` (optional) registers a callback for user edits.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use formwire_model::ConversionError;
use formwire_reactive::{Observable, ObservableValue, Subscription};

use crate::text::{format_text, parse_text};

type Getter<L> = Box<dyn Fn() -> L>;
type Setter<L> = Box<dyn Fn(L)>;
type Parser<L, M> = Box<dyn Fn(L) -> Result<Option<M>, ConversionError>>;
type Formatter<L, M> = Box<dyn Fn(Option<&M>) -> L>;
type Trigger = Box<dyn Fn(Rc<dyn Fn()>) -> Subscription>;

/// Accessors and converters for one control with local value type `L`,
/// bound to a model holding `M`.
pub struct ControlAdapter<L, M> {
    getter: Getter<L>,
    setter: Setter<L>,
    parser: Parser<L, M>,
    formatter: Formatter<L, M>,
    trigger: Option<Trigger>,
}

impl<L: 'static, M: 'static> ControlAdapter<L, M> {
    pub fn new(
        getter: impl Fn() -> L + 'static,
        setter: impl Fn(L) + 'static,
        parser: impl Fn(L) -> Result<Option<M>, ConversionError> + 'static,
        formatter: impl Fn(Option<&M>) -> L + 'static,
    ) -> Self {
        Self {
            getter: Box::new(getter),
            setter: Box::new(setter),
            parser: Box::new(parser),
            formatter: Box::new(formatter),
            trigger: None,
        }
    }

    /// Attach the control's change trigger: a function that registers the
    /// given callback for user edits and returns its subscription.
    #[must_use]
    pub fn with_trigger(
        mut self,
        trigger: impl Fn(Rc<dyn Fn()>) -> Subscription + 'static,
    ) -> Self {
        self.trigger = Some(Box::new(trigger));
        self
    }

    pub(crate) fn read(&self) -> L {
        (self.getter)()
    }

    pub(crate) fn write(&self, value: L) {
        (self.setter)(value);
    }

    pub(crate) fn parse(&self, value: L) -> Result<Option<M>, ConversionError> {
        (self.parser)(value)
    }

    pub(crate) fn format(&self, value: Option<&M>) -> L {
        (self.formatter)(value)
    }

    /// Register `callback` with the trigger, if the control has one.
    pub(crate) fn on_edit(&self, callback: Rc<dyn Fn()>) -> Option<Subscription> {
        self.trigger.as_ref().map(|trigger| trigger(callback))
    }

    #[must_use]
    pub fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }
}

impl<L: Clone + PartialEq + 'static, M: 'static> ControlAdapter<L, M> {
    /// Use an observable cell as the control's local state. Every change of
    /// the cell counts as an edit.
    pub fn observable(
        cell: &Observable<L>,
        parser: impl Fn(L) -> Result<Option<M>, ConversionError> + 'static,
        formatter: impl Fn(Option<&M>) -> L + 'static,
    ) -> Self {
        let read = cell.clone();
        let write = cell.clone();
        let edits = cell.clone();
        Self::new(
            move || read.get(),
            move |value| {
                write.set(value);
            },
            parser,
            formatter,
        )
        .with_trigger(move |callback| {
            edits.add_change_listener(Rc::new(move |_: &L, _: &L| callback()))
        })
    }
}

impl<M> ControlAdapter<String, M>
where
    M: FromStr + fmt::Display + 'static,
    M::Err: fmt::Display,
{
    /// A text field over `cell`, using [`parse_text`] and [`format_text`].
    pub fn text(cell: &Observable<String>) -> Self {
        Self::observable(
            cell,
            |input: String| parse_text(&input),
            |value: Option<&M>| format_text(value),
        )
    }
}

impl<L, M> fmt::Debug for ControlAdapter<L, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlAdapter")
            .field("trigger", &self.trigger.is_some())
            .finish_non_exhaustive()
    }
}
