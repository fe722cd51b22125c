#![forbid(unsafe_code)]

//! Lifecycle-gated synchronization between one control and one model.
//!
//! # Design
//!
//! A [`Linker`] owns a [`ControlAdapter`], a [`Model`] handle and the
//! control's [`FieldState`]. Its subscriptions live in two scopes:
//!
//! | Scope  | Live while                 | Holds                                      |
//! |--------|----------------------------|--------------------------------------------|
//! | active | the host is showing        | the model's applicability listener         |
//! | gated  | active and model applicable| raw value, validity, edit trigger, focus   |
//!
//! Entering [`LinkState::Active`] builds the active scope. The applicability
//! listener then builds or tears down the gated scope. Leaving `Active` drops
//! both, so an inactive linker leaves zero listeners anywhere.
//!
//! Two re-entrancy flags break feedback loops: `updating_control` is raised
//! while the linker writes into the control (so the resulting edit trigger is
//! ignored), and `updating_model` while it commits into the model (so the
//! resulting raw-value change is not pushed back).
//!
//! # Invariants
//!
//! 1. Model to control: a raw-value change is formatted into the control
//!    unless the field is dirty or a commit is in flight.
//! 2. A false to true flip of "applicable and valid" re-pushes the model
//!    value and clears dirty, unless a commit is in flight. The invalid flag
//!    is refreshed on every flip.
//! 3. A user edit sets touched and dirty, then commits (when configured).
//! 4. Losing focus commits a dirty field, re-pushes the canonical value if
//!    the model ends up valid, and always clears dirty.
//! 5. While the model is inapplicable the control is hidden and unmanaged,
//!    invalid is `false`, and no gated listener exists.
//!
//! # Failure Modes
//!
//! - A failed conversion only flips the invalid flag; nothing propagates to
//!   the caller or into the dispatch loop.
//! - Listeners hold weak references; events arriving after the linker is
//!   dropped are ignored.

use std::borrow::Borrow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use formwire_model::Model;
use formwire_reactive::{ObservableValue, Subscription, SubscriptionScope, all_true};

use crate::adapter::ControlAdapter;
use crate::config::LinkConfig;
use crate::field::FieldState;
use crate::guard::Flag;
use crate::lifecycle::{Host, LifecycleEdge};

/// Whether a linker's subscriptions are live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Inactive,
    Active,
}

struct LinkerInner<L, M, E> {
    model: Model<M, E>,
    adapter: ControlAdapter<L, M>,
    field: FieldState,
    config: LinkConfig,
    state: Cell<LinkState>,
    active: RefCell<SubscriptionScope>,
    gated: RefCell<SubscriptionScope>,
    updating_control: Flag,
    updating_model: Flag,
}

/// A binding between one control and one model.
///
/// Dropping the linker releases every subscription it holds.
pub struct Linker<L, M, E = M>
where
    L: 'static,
    M: Clone + PartialEq + Borrow<E> + 'static,
    E: 'static,
{
    inner: Rc<LinkerInner<L, M, E>>,
    _lifecycle: Option<Subscription>,
}

impl<L, M, E> Linker<L, M, E>
where
    L: 'static,
    M: Clone + PartialEq + Borrow<E> + 'static,
    E: 'static,
{
    /// Bind with the default [`LinkConfig`].
    pub fn bind(
        model: &Model<M, E>,
        adapter: ControlAdapter<L, M>,
        field: &FieldState,
        host: Option<&Host>,
    ) -> Self {
        Self::bind_with_config(model, adapter, field, host, LinkConfig::default())
    }

    /// Bind `adapter` to `model`.
    ///
    /// The linker follows `host`'s show/hide edges. Without a host, or with
    /// a host that is already showing, it activates immediately.
    pub fn bind_with_config(
        model: &Model<M, E>,
        adapter: ControlAdapter<L, M>,
        field: &FieldState,
        host: Option<&Host>,
        config: LinkConfig,
    ) -> Self {
        let inner = Rc::new(LinkerInner {
            model: model.clone(),
            adapter,
            field: field.clone(),
            config,
            state: Cell::new(LinkState::Inactive),
            active: RefCell::new(SubscriptionScope::new()),
            gated: RefCell::new(SubscriptionScope::new()),
            updating_control: Flag::default(),
            updating_model: Flag::default(),
        });

        let lifecycle = host.map(|host| {
            let weak = Rc::downgrade(&inner);
            host.on_edge(move |edge| {
                if let Some(inner) = weak.upgrade() {
                    match edge {
                        LifecycleEdge::Showing => inner.activate(),
                        LifecycleEdge::Hidden => inner.deactivate(),
                    }
                }
            })
        });

        if host.is_none_or(Host::is_showing) {
            inner.activate();
        }

        Self {
            inner,
            _lifecycle: lifecycle,
        }
    }

    #[must_use]
    pub fn state(&self) -> LinkState {
        self.inner.state.get()
    }

    /// Whether the value, validity, trigger and focus listeners are attached.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.inner.gated.borrow().is_empty()
    }

    /// Explicit commit signal: push the control's current value into the
    /// model and clear dirty.
    ///
    /// Returns `true` if the model took a new value. Does nothing while the
    /// linker is inactive or the model inapplicable.
    pub fn commit(&self) -> bool {
        if self.state() != LinkState::Active || !self.is_live() {
            return false;
        }
        let committed = self.inner.commit();
        self.inner.field.dirty().set(false);
        committed
    }

    #[must_use]
    pub fn field(&self) -> &FieldState {
        &self.inner.field
    }

    #[must_use]
    pub fn model(&self) -> &Model<M, E> {
        &self.inner.model
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.inner.config
    }
}

impl<L, M, E> Drop for Linker<L, M, E>
where
    L: 'static,
    M: Clone + PartialEq + Borrow<E> + 'static,
    E: 'static,
{
    fn drop(&mut self) {
        self.inner.deactivate();
    }
}

impl<L, M, E> fmt::Debug for Linker<L, M, E>
where
    L: 'static,
    M: Clone + PartialEq + Borrow<E> + 'static,
    E: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Linker")
            .field("label", &self.inner.config.label)
            .field("state", &self.state())
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}

impl<L, M, E> LinkerInner<L, M, E>
where
    L: 'static,
    M: Clone + PartialEq + Borrow<E> + 'static,
    E: 'static,
{
    fn activate(self: &Rc<Self>) {
        if self.state.replace(LinkState::Active) == LinkState::Active {
            return;
        }
        tracing::debug!(message = "link.activate", label = self.config.label());

        let weak = Rc::downgrade(self);
        let applicability = self.model.applicable().add_change_listener(Rc::new(
            move |_: &bool, applicable: &bool| {
                if let Some(inner) = weak.upgrade() {
                    inner.gate(*applicable);
                }
            },
        ));
        self.active.borrow_mut().hold(applicability);
        self.gate(self.model.is_applicable());
    }

    fn deactivate(&self) {
        if self.state.replace(LinkState::Inactive) == LinkState::Inactive {
            return;
        }
        tracing::debug!(message = "link.deactivate", label = self.config.label());
        // Released outside the borrows: disposers may re-enter listener sets.
        let gated = std::mem::take(&mut *self.gated.borrow_mut());
        let active = std::mem::take(&mut *self.active.borrow_mut());
        drop(gated);
        drop(active);
    }

    fn gate(self: &Rc<Self>, applicable: bool) {
        tracing::debug!(message = "link.gate", label = self.config.label(), applicable);
        if applicable {
            if self.gated.borrow().is_empty() {
                let scope = self.gated_scope();
                *self.gated.borrow_mut() = scope;
            }
            self.field.visible().set(true);
            self.field.managed().set(true);
            if !self.field.is_dirty() {
                self.push();
            }
            self.refresh_invalid();
        } else {
            let gated = std::mem::take(&mut *self.gated.borrow_mut());
            drop(gated);
            self.field.visible().set(false);
            self.field.managed().set(false);
            self.field.invalid().set(false);
        }
    }

    fn gated_scope(self: &Rc<Self>) -> SubscriptionScope {
        let mut scope = SubscriptionScope::new();

        let weak = Rc::downgrade(self);
        scope.hold(self.model.raw_value().add_change_listener(Rc::new(
            move |_: &Option<M>, _: &Option<M>| {
                with_inner(&weak, |inner| inner.on_model_value());
            },
        )));

        let ready = all_true([self.model.applicable(), self.model.valid()]);
        let weak = Rc::downgrade(self);
        let ready_sub = ready.add_change_listener(Rc::new(move |was: &bool, now: &bool| {
            with_inner(&weak, |inner| inner.on_ready(*was, *now));
        }));
        // The derived value lives exactly as long as its listener.
        scope.hold(Subscription::new(move || {
            drop(ready_sub);
            drop(ready);
        }));

        let weak = Rc::downgrade(self);
        if let Some(trigger) = self.adapter.on_edit(Rc::new(move || {
            with_inner(&weak, |inner| inner.on_edit());
        })) {
            scope.hold(trigger);
        }

        let weak = Rc::downgrade(self);
        scope.hold(self.field.focused().add_change_listener(Rc::new(
            move |was: &bool, now: &bool| {
                if *was && !*now {
                    with_inner(&weak, |inner| inner.on_blur());
                }
            },
        )));

        scope
    }

    fn on_model_value(&self) {
        if self.updating_model.is_raised() || self.field.is_dirty() {
            return;
        }
        self.push();
    }

    fn on_ready(&self, was: bool, now: bool) {
        self.refresh_invalid();
        if !was && now && !self.updating_model.is_raised() {
            self.push();
            self.field.dirty().set(false);
        }
    }

    fn on_edit(&self) {
        if self.updating_control.is_raised() {
            return;
        }
        self.field.touched().set(true);
        self.field.dirty().set(true);
        if self.config.commit_on_trigger {
            self.commit();
        }
    }

    fn on_blur(&self) {
        if self.field.is_dirty() {
            self.commit();
        }
        if self.config.canonicalize_on_blur
            && self.model.is_applicable()
            && self.model.is_valid()
        {
            self.push();
        }
        self.field.dirty().set(false);
    }

    fn commit(&self) -> bool {
        let input = self.adapter.read();
        let committed = {
            let _guard = self.updating_model.hold();
            self.model
                .convert_from(input, |value| self.adapter.parse(value))
        };
        tracing::debug!(
            message = "link.commit",
            label = self.config.label(),
            committed,
            valid = self.model.is_valid()
        );
        self.refresh_invalid();
        committed
    }

    fn push(&self) {
        let value = self.adapter.format(self.model.raw().as_ref());
        tracing::trace!(message = "link.push", label = self.config.label());
        let _guard = self.updating_control.hold();
        self.adapter.write(value);
    }

    fn refresh_invalid(&self) {
        self.field
            .invalid()
            .set(self.model.is_applicable() && !self.model.is_valid());
    }
}

fn with_inner<T>(weak: &Weak<T>, f: impl FnOnce(&T)) {
    if let Some(inner) = weak.upgrade() {
        f(inner.as_ref());
    }
}
