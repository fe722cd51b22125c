#![forbid(unsafe_code)]

//! Reactive substrate for formwire.
//!
//! This crate provides the change-tracking primitives the model and linker
//! layers are built on:
//!
//! - [`Observable`]: A shared, version-tracked value wrapper with separate
//!   invalidation and change notification.
//! - [`Subscription`]: RAII guard that unsubscribes on drop, with an explicit
//!   idempotent [`unsubscribe`](Subscription::unsubscribe).
//! - [`Derived`]: A value computed from other observables that attaches to its
//!   sources only while it is itself observed.
//! - [`combine`]: Boolean aggregation, `map` and `compute` combinators that
//!   produce [`Derived`] values.
//! - [`SubscriptionScope`]: Collects the subscriptions of one logical owner.
//!
//! # Architecture
//!
//! Everything is single-threaded: `Rc<RefCell<..>>` for shared ownership and
//! synchronous dispatch in registration order. Dispatch works on a snapshot of
//! the listener list, so a listener added during a callback does not see the
//! in-flight event, while a listener removed during a callback is skipped.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Listeners are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Invalidation listeners run before change listeners for the same event.
//! 5. A [`Derived`] with zero observers holds zero listeners on its sources.

pub mod combine;
pub mod derived;
pub mod listener;
pub mod observable;
pub mod subscription;

pub use combine::{
    Tristate, all_false, all_true, any_false, any_true, compute, compute_all, compute2, compute3,
    map, map_all, map2, map3,
};
pub use derived::{Dependency, Derived};
pub use listener::{ListenerId, ListenerSet};
pub use observable::{DynObservable, Observable, ObservableValue};
pub use subscription::{Subscription, SubscriptionScope};
