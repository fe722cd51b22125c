#![forbid(unsafe_code)]

//! Scoped re-entrancy flags.

use std::cell::Cell;

/// A boolean that is raised for the lifetime of a [`FlagGuard`].
#[derive(Debug, Default)]
pub(crate) struct Flag {
    raised: Cell<bool>,
}

impl Flag {
    pub(crate) fn is_raised(&self) -> bool {
        self.raised.get()
    }

    /// Raise the flag until the guard drops. Nested holds restore the outer
    /// state.
    pub(crate) fn hold(&self) -> FlagGuard<'_> {
        let previous = self.raised.replace(true);
        FlagGuard {
            flag: self,
            previous,
        }
    }
}

#[must_use = "the flag drops back as soon as the guard is dropped"]
pub(crate) struct FlagGuard<'a> {
    flag: &'a Flag,
    previous: bool,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.raised.set(self.previous);
    }
}
