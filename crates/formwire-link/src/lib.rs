#![forbid(unsafe_code)]

//! Synchronization between editable controls and models.
//!
//! A [`Linker`] keeps one control's local state and one
//! [`Model`](formwire_model::Model) in lock-step:
//!
//! - model writes flow into the control unless the user is mid-edit;
//! - user edits flow into the model through the control's parser;
//! - losing focus settles the edit and restores a canonical display;
//! - an inapplicable model hides the control and silences the binding.
//!
//! The control side is described by a [`ControlAdapter`], its rendered flags
//! live in a [`FieldState`], and a [`Host`] supplies the show/hide edges that
//! switch the linker between [`LinkState::Active`] and
//! [`LinkState::Inactive`].

pub mod adapter;
pub mod config;
pub mod field;
mod guard;
pub mod lifecycle;
pub mod linker;
pub mod text;

pub use adapter::ControlAdapter;
pub use config::LinkConfig;
pub use field::FieldState;
pub use lifecycle::{Host, LifecycleEdge};
pub use linker::{LinkState, Linker};
pub use text::{format_text, parse_text};
