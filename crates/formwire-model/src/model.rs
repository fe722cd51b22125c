#![forbid(unsafe_code)]

//! The model state machine.
//!
//! # Design
//!
//! A [`Model<M, E>`] holds an `Option<M>` raw value and a [`Domain<E>`]. The
//! value type may differ from the domain element type (`M: Borrow<E>`), which
//! lets a model store a richer value than the domain reasons about.
//!
//! Four observables expose the model's state:
//!
//! | Observable           | Fires when                                   |
//! |----------------------|----------------------------------------------|
//! | [`raw_value`]        | the raw value changes, valid or not          |
//! | [`applicable`]       | the domain becomes empty or non-empty        |
//! | [`valid`]            | validity flips                               |
//! | [`domain_value`]     | a different domain is installed              |
//!
//! The accessors read a single snapshot that every write settles in full
//! before any observable is touched. The observables then follow in the order
//! domain, applicable, valid, raw.
//!
//! A separate published channel ([`on_change`]) reports only values that
//! are valid and applicable, deduplicated against the last published value.
//! Transient invalid writes never reach it.
//!
//! # Invariants
//!
//! 1. Applicability is recomputed before validity; listeners of `valid`
//!    always see the current `applicable` flag.
//! 2. Inside any listener, [`Model::raw`], [`Model::state`] and
//!    [`Model::get`] already describe the state after the write.
//! 3. An inapplicable model is valid, conversion failures included.
//! 4. While the "unconverted" flag is set an applicable model stays invalid,
//!    and the next successful conversion counts as a change.
//! 5. [`Model::get`] is `None` unless the state is [`ModelState::Valid`].
//!
//! # Failure Modes
//!
//! - A converter error is logged at debug level and turned into the invalid
//!   state; it is never returned to or raised in the caller.
//!
//! [`raw_value`]: Model::raw_value
//! [`applicable`]: Model::applicable
//! [`valid`]: Model::valid
//! [`domain_value`]: Model::domain_value
//! [`on_change`]: Model::on_change

use std::borrow::Borrow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use formwire_domain::Domain;
use formwire_reactive::{DynObservable, ListenerSet, Observable, Subscription};

use crate::error::{ModelError, Result};

/// Where a model stands relative to its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelState {
    /// The domain is non-empty and rejects the raw value.
    Invalid,
    /// The domain is non-empty and accepts the raw value.
    Valid,
    /// The domain is empty; the model is vacuously valid but not applicable.
    Inapplicable,
}

type PublishListener<M> = dyn Fn(&Option<M>, &Option<M>);

struct Snapshot<M, E> {
    raw: Option<M>,
    domain: Domain<E>,
    applicable: bool,
    valid: bool,
}

struct ModelInner<M, E> {
    current: RefCell<Snapshot<M, E>>,
    raw: Observable<Option<M>>,
    domain: Observable<Domain<E>>,
    applicable: Observable<bool>,
    valid: Observable<bool>,
    unconverted: Cell<bool>,
    published: RefCell<Option<M>>,
    listeners: Rc<ListenerSet<PublishListener<M>>>,
}

/// A validated value holder under a swappable domain.
///
/// Cloning creates another handle to the same model.
pub struct Model<M, E = M> {
    inner: Rc<ModelInner<M, E>>,
}

impl<M, E> Clone for Model<M, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M, E> Model<M, E>
where
    M: Clone + PartialEq + Borrow<E> + 'static,
    E: 'static,
{
    /// Create a model holding `value` under `domain`.
    ///
    /// No notification fires for the initial state.
    #[must_use]
    pub fn new(value: Option<M>, domain: Domain<E>) -> Self {
        let applicable = !domain.is_empty();
        let valid = !applicable || domain.contains(value.as_ref().map(Borrow::borrow));
        let published = if applicable && valid {
            value.clone()
        } else {
            None
        };
        Self {
            inner: Rc::new(ModelInner {
                current: RefCell::new(Snapshot {
                    raw: value.clone(),
                    domain: domain.clone(),
                    applicable,
                    valid,
                }),
                raw: Observable::new(value),
                domain: Observable::new(domain),
                applicable: Observable::new(applicable),
                valid: Observable::new(valid),
                unconverted: Cell::new(false),
                published: RefCell::new(published),
                listeners: Rc::new(ListenerSet::new()),
            }),
        }
    }

    /// The stored value, whatever the state.
    #[must_use]
    pub fn raw(&self) -> Option<M> {
        self.inner.current.borrow().raw.clone()
    }

    /// The value if the model is valid and applicable, otherwise `None`.
    #[must_use]
    pub fn get(&self) -> Option<M> {
        match self.state() {
            ModelState::Valid => self.raw(),
            ModelState::Invalid | ModelState::Inapplicable => None,
        }
    }

    /// Strict access.
    ///
    /// # Errors
    ///
    /// [`ModelError::Invalid`] when the model is invalid. An inapplicable
    /// model yields `Ok(None)`.
    pub fn try_get(&self) -> Result<Option<M>> {
        match self.state() {
            ModelState::Valid => Ok(self.raw()),
            ModelState::Inapplicable => Ok(None),
            ModelState::Invalid => Err(ModelError::Invalid),
        }
    }

    /// Strict access for models that must hold a value.
    ///
    /// # Errors
    ///
    /// [`ModelError::Invalid`], [`ModelError::Inapplicable`], or
    /// [`ModelError::NullValue`] when the model is valid but holds `None`.
    pub fn require(&self) -> Result<M> {
        match self.state() {
            ModelState::Invalid => Err(ModelError::Invalid),
            ModelState::Inapplicable => Err(ModelError::Inapplicable),
            ModelState::Valid => self.raw().ok_or(ModelError::NullValue),
        }
    }

    #[must_use]
    pub fn state(&self) -> ModelState {
        let current = self.inner.current.borrow();
        if !current.applicable {
            ModelState::Inapplicable
        } else if current.valid {
            ModelState::Valid
        } else {
            ModelState::Invalid
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.current.borrow().valid
    }

    #[must_use]
    pub fn is_applicable(&self) -> bool {
        self.inner.current.borrow().applicable
    }

    /// Whether the raw value is trustworthy, i.e. the last conversion did not
    /// fail.
    #[must_use]
    pub fn is_convertible(&self) -> bool {
        !self.inner.unconverted.get()
    }

    #[must_use]
    pub fn domain(&self) -> Domain<E> {
        self.inner.current.borrow().domain.clone()
    }

    /// Overwrite the raw value and revalidate it.
    pub fn set(&self, value: Option<M>) {
        self.inner.unconverted.set(false);
        self.inner.current.borrow_mut().raw = value;
        self.refresh();
    }

    /// Convert `input` and store the result if it differs from the raw
    /// value.
    ///
    /// Returns `true` only if a new value was committed. On a converter error
    /// the raw value is kept, the model becomes unconverted (and invalid, if
    /// applicable), and `false` is returned.
    pub fn convert_from<I, X>(
        &self,
        input: I,
        convert: impl FnOnce(I) -> std::result::Result<Option<M>, X>,
    ) -> bool
    where
        X: fmt::Display,
    {
        match convert(input) {
            Err(error) => {
                tracing::debug!(message = "model.convert_failed", %error);
                self.inner.unconverted.set(true);
                self.refresh();
                false
            }
            Ok(value) => {
                let differs = self.inner.current.borrow().raw != value;
                let changed = self.inner.unconverted.get() || differs;
                if changed {
                    self.set(value);
                }
                changed
            }
        }
    }

    /// Install a new domain and re-derive applicability and validity.
    ///
    /// An unconverted raw value is not revalidated; the model stays invalid
    /// until the next successful write.
    pub fn set_domain(&self, domain: Domain<E>) {
        tracing::debug!(
            message = "model.domain",
            empty = domain.is_empty(),
            allows_null = domain.allows_null()
        );
        self.inner.current.borrow_mut().domain = domain;
        self.refresh();
    }

    /// Register a listener for published values: `(previous, current)`.
    pub fn on_change(&self, listener: impl Fn(&Option<M>, &Option<M>) + 'static) -> Subscription {
        self.inner.listeners.subscribe(Rc::new(listener))
    }

    /// Every raw-value change, valid or not.
    #[must_use]
    pub fn raw_value(&self) -> DynObservable<Option<M>> {
        self.inner.raw.as_dyn()
    }

    #[must_use]
    pub fn valid(&self) -> DynObservable<bool> {
        self.inner.valid.as_dyn()
    }

    #[must_use]
    pub fn applicable(&self) -> DynObservable<bool> {
        self.inner.applicable.as_dyn()
    }

    #[must_use]
    pub fn domain_value(&self) -> DynObservable<Domain<E>> {
        self.inner.domain.as_dyn()
    }

    /// Number of published-value listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn refresh(&self) {
        let ready = {
            let mut current = self.inner.current.borrow_mut();
            let applicable = !current.domain.is_empty();
            let valid = if !applicable {
                true
            } else if self.inner.unconverted.get() {
                false
            } else {
                current
                    .domain
                    .contains(current.raw.as_ref().map(Borrow::borrow))
            };
            current.applicable = applicable;
            current.valid = valid;
            applicable && valid
        };
        self.sync();
        if ready {
            self.publish();
        }
    }

    /// Bring the observables in line with the snapshot. Each step re-reads
    /// the snapshot, since a listener may have written the model meanwhile.
    fn sync(&self) {
        let domain = self.domain();
        self.inner.domain.set(domain);
        let applicable = self.is_applicable();
        self.inner.applicable.set(applicable);
        let valid = self.is_valid();
        self.inner.valid.set(valid);
        let raw = self.raw();
        self.inner.raw.set(raw);
    }

    fn publish(&self) {
        if self.state() != ModelState::Valid {
            return;
        }
        let current = self.raw();
        let previous = {
            let mut last = self.inner.published.borrow_mut();
            if *last == current {
                return;
            }
            std::mem::replace(&mut *last, current.clone())
        };
        tracing::trace!(message = "model.publish", listeners = self.inner.listeners.len());
        self.inner
            .listeners
            .for_each(|listener| listener(&previous, &current));
    }
}

impl<M: fmt::Debug, E> fmt::Debug for Model<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.inner.current.borrow();
        f.debug_struct("Model")
            .field("raw", &current.raw)
            .field("applicable", &current.applicable)
            .field("valid", &current.valid)
            .field("unconverted", &self.inner.unconverted.get())
            .finish_non_exhaustive()
    }
}
