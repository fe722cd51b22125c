#![forbid(unsafe_code)]

//! Disposable subscription handles and scoped groups of them.
//!
//! A [`Subscription`] is the only cancellation primitive of the reactive
//! layer. It runs its disposer exactly once: on the first explicit
//! [`unsubscribe`](Subscription::unsubscribe) or on drop, whichever comes
//! first.
//!
//! A [`SubscriptionScope`] collects the subscriptions of one logical owner
//! (a binding, a widget) so they can be released together.
//!
//! # Invariants
//!
//! 1. The disposer runs at most once.
//! 2. `unsubscribe()` is idempotent.
//! 3. A scope releases its subscriptions in registration order on `clear()`
//!    and on drop.

use std::fmt;

/// RAII guard for a registered listener.
///
/// Dropping the guard unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `dispose` when released.
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { dispose: None }
    }

    /// Release the subscription now. Calling this again does nothing.
    pub fn unsubscribe(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }

    /// Whether the disposer has not run yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Collects subscriptions for a logical scope.
///
/// When the scope is cleared or dropped, all held subscriptions are released.
#[derive(Default)]
pub struct SubscriptionScope {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Hold a subscription until the scope is cleared or dropped.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now; the scope stays reusable.
    pub fn clear(&mut self) {
        for mut sub in std::mem::take(&mut self.subscriptions) {
            sub.unsubscribe();
        }
    }
}

impl Extend<Subscription> for SubscriptionScope {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

impl Drop for SubscriptionScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for SubscriptionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionScope")
            .field("len", &self.subscriptions.len())
            .finish()
    }
}
