#![forbid(unsafe_code)]

//! formwire public facade crate.
//!
//! Reactive cells, value domains, models, and control bindings under one
//! import. The `link` feature (on by default) brings in the linker.

pub use formwire_domain as domain;
#[cfg(feature = "link")]
pub use formwire_link as link;
pub use formwire_model as model;
pub use formwire_reactive as reactive;

pub mod prelude {
    pub use formwire_domain::{
        Continuous, Domain, DomainError, Enumeration, Snapping, Stepping, ViewTag,
    };
    #[cfg(feature = "link")]
    pub use formwire_link::{
        ControlAdapter, FieldState, Host, LinkConfig, LinkState, Linker, format_text, parse_text,
    };
    pub use formwire_model::{ConversionError, Model, ModelError, ModelState};
    pub use formwire_reactive::{
        Derived, Observable, ObservableValue, Subscription, SubscriptionScope, Tristate,
        all_true, any_true, compute, map,
    };
}
