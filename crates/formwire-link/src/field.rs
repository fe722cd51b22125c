#![forbid(unsafe_code)]

//! Observable presentation state of one bound control.

use formwire_reactive::Observable;

/// The flags a construction layer renders for a bound control, plus the
/// `focused` input signal it feeds back.
///
/// Cloning yields another handle to the same flags.
#[derive(Debug, Clone)]
pub struct FieldState {
    invalid: Observable<bool>,
    touched: Observable<bool>,
    dirty: Observable<bool>,
    visible: Observable<bool>,
    managed: Observable<bool>,
    focused: Observable<bool>,
}

impl Default for FieldState {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldState {
    /// Visible, managed, unfocused, and otherwise clear.
    #[must_use]
    pub fn new() -> Self {
        Self {
            invalid: Observable::new(false),
            touched: Observable::new(false),
            dirty: Observable::new(false),
            visible: Observable::new(true),
            managed: Observable::new(true),
            focused: Observable::new(false),
        }
    }

    /// The model rejects the current value while applicable.
    #[must_use]
    pub fn invalid(&self) -> &Observable<bool> {
        &self.invalid
    }

    /// The control has received a user edit at some point. Never cleared by
    /// the linker.
    #[must_use]
    pub fn touched(&self) -> &Observable<bool> {
        &self.touched
    }

    /// The control holds an edit the model has not settled yet.
    #[must_use]
    pub fn dirty(&self) -> &Observable<bool> {
        &self.dirty
    }

    #[must_use]
    pub fn visible(&self) -> &Observable<bool> {
        &self.visible
    }

    /// Whether the control takes part in layout.
    #[must_use]
    pub fn managed(&self) -> &Observable<bool> {
        &self.managed
    }

    /// Written by the construction layer when keyboard focus moves.
    #[must_use]
    pub fn focused(&self) -> &Observable<bool> {
        &self.focused
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.invalid.get()
    }

    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.touched.get()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.visible.get() && self.managed.get()
    }
}
