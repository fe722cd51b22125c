#![forbid(unsafe_code)]

//! Per-binding configuration.

/// Tunables for one [`Linker`](crate::Linker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Name attached to every tracing event of the binding.
    /// Default: none.
    pub label: Option<String>,

    /// Commit on every change trigger. When `false`, the trigger only marks
    /// the field touched and dirty; the commit waits for focus loss or an
    /// explicit [`Linker::commit`](crate::Linker::commit).
    /// Default: true.
    pub commit_on_trigger: bool,

    /// After a successful focus-loss commit, write the model's canonical
    /// form back into the control (`"006"` becomes `"6"`).
    /// Default: true.
    pub canonicalize_on_blur: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            label: None,
            commit_on_trigger: true,
            canonicalize_on_blur: true,
        }
    }
}

impl LinkConfig {
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_commit_on_trigger(mut self, enabled: bool) -> Self {
        self.commit_on_trigger = enabled;
        self
    }

    #[must_use]
    pub fn with_canonicalize_on_blur(mut self, enabled: bool) -> Self {
        self.canonicalize_on_blur = enabled;
        self
    }

    pub(crate) fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }
}
