//! End-to-end binding scenarios.
//!
//! Each test wires a real model, a control cell, a field state and (where
//! relevant) a host, then drives them the way a form would: focus, typing,
//! blur, domain swaps, and window show/hide.

use std::cell::RefCell;
use std::rc::Rc;

use formwire_domain::Domain;
use formwire_link::{ControlAdapter, FieldState, Host, LinkConfig, LinkState, Linker};
use formwire_model::{ConversionError, Model, ModelState};
use formwire_reactive::{Observable, ObservableValue};

fn grid() -> Domain<i32> {
    Domain::bounded(0, 10, 2).expect("valid grid")
}

type Published = Rc<RefCell<Vec<(Option<i32>, Option<i32>)>>>;

fn record(model: &Model<i32>) -> (Published, formwire_reactive::Subscription) {
    let seen: Published = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let sub = model.on_change(move |old, new| s.borrow_mut().push((*old, *new)));
    (seen, sub)
}

#[test]
fn typed_leading_zero_commits_then_canonicalizes_on_blur() {
    let model = Model::new(Some(2), grid());
    let (published, _sub) = record(&model);
    let text = Observable::new(String::new());
    let field = FieldState::new();
    let _linker = Linker::bind(&model, ControlAdapter::text(&text), &field, None);
    assert_eq!(text.get(), "2");

    field.focused().set(true);
    text.set("0".to_string());
    text.set("04".to_string());
    assert_eq!(model.get(), Some(4));
    assert_eq!(model.state(), ModelState::Valid);
    assert_eq!(text.get(), "04", "no push while dirty");

    field.focused().set(false);
    assert_eq!(text.get(), "4");
    assert!(!field.is_dirty());
    assert!(field.is_touched());
    assert_eq!(*published.borrow(), vec![(Some(2), Some(0)), (Some(0), Some(4))]);
}

#[test]
fn empty_domain_hides_and_silences_the_binding() {
    let model = Model::new(Some(4), grid());
    let text = Observable::new(String::new());
    let field = FieldState::new();
    let linker = Linker::bind(&model, ControlAdapter::text(&text), &field, None);
    assert!(field.is_shown());

    model.set_domain(Domain::empty());
    assert!(!field.visible().get());
    assert!(!field.managed().get());
    assert!(!field.is_invalid());
    assert!(!linker.is_live());
    assert_eq!(linker.state(), LinkState::Active);

    model.set(Some(8));
    assert_eq!(text.get(), "4", "model writes do not reach the control");

    text.set("6".to_string());
    assert_eq!(model.raw(), Some(8), "control edits do not reach the model");
    assert!(!field.is_touched());

    model.set_domain(grid());
    assert!(field.is_shown());
    assert!(linker.is_live());
    assert_eq!(text.get(), "8");

    field.focused().set(true);
    text.set("10".to_string());
    assert_eq!(model.get(), Some(10));
}

#[test]
fn reapplicable_domain_flags_invalid_value() {
    let model = Model::new(Some(3), Domain::range(0, 10).expect("valid range"));
    let text = Observable::new(String::new());
    let field = FieldState::new();
    let _linker = Linker::bind(&model, ControlAdapter::text(&text), &field, None);
    assert!(!field.is_invalid());

    model.set_domain(Domain::empty());
    assert!(!field.is_invalid());

    model.set_domain(grid());
    assert!(field.is_invalid());
    assert_eq!(text.get(), "3");
}

#[test]
fn inactive_linker_holds_no_listeners() {
    let host = Host::new();
    let model = Model::new(Some(4), grid());
    let text = Observable::new(String::new());
    let field = FieldState::new();
    let linker = Linker::bind(&model, ControlAdapter::text(&text), &field, Some(&host));

    let counts = || {
        (
            model.raw_value().listener_count(),
            model.valid().listener_count(),
            model.applicable().listener_count(),
            text.listener_count(),
            field.focused().listener_count(),
        )
    };

    assert_eq!(linker.state(), LinkState::Inactive);
    assert_eq!(counts(), (0, 0, 0, 0, 0));

    host.show();
    assert_eq!(linker.state(), LinkState::Active);
    // applicability: the gate listener plus the validity aggregate.
    assert_eq!(counts(), (1, 1, 2, 1, 1));

    host.hide();
    assert_eq!(counts(), (0, 0, 0, 0, 0));

    host.show();
    assert_eq!(counts(), (1, 1, 2, 1, 1));
    drop(linker);
    assert_eq!(counts(), (0, 0, 0, 0, 0));
    assert_eq!(host.listener_count(), 0);
}

#[test]
fn one_host_gates_many_linkers() {
    let host = Host::new();
    let width = Model::new(Some(2), grid());
    let depth = Model::new(Some(6), grid());
    let width_text = Observable::new(String::new());
    let depth_text = Observable::new(String::new());
    let width_field = FieldState::new();
    let depth_field = FieldState::new();
    let a = Linker::bind(&width, ControlAdapter::text(&width_text), &width_field, Some(&host));
    let b = Linker::bind(&depth, ControlAdapter::text(&depth_text), &depth_field, Some(&host));

    host.show();
    assert_eq!((a.state(), b.state()), (LinkState::Active, LinkState::Active));
    assert_eq!((width_text.get(), depth_text.get()), ("2".into(), "6".into()));

    host.hide();
    width.set(Some(8));
    depth.set(Some(0));
    assert_eq!((width_text.get(), depth_text.get()), ("2".into(), "6".into()));

    host.show();
    assert_eq!((width_text.get(), depth_text.get()), ("8".into(), "0".into()));
}

#[test]
fn slider_control_uses_the_continuous_view() {
    let domain = Domain::bounded(0, 100, 5).expect("valid grid");
    let model = Model::new(Some(50), domain.clone());
    let position = Observable::new(0.0_f64);
    let field = FieldState::new();

    let parse_view = domain.continuous();
    let format_view = domain.continuous();
    let adapter = ControlAdapter::observable(
        &position,
        move |fraction: f64| -> Result<Option<i32>, ConversionError> {
            Ok(parse_view.get(fraction))
        },
        move |value: Option<&i32>| format_view.fraction_of(value),
    );
    let _linker = Linker::bind(&model, adapter, &field, None);
    assert!((position.get() - 0.5).abs() < 1e-12);

    field.focused().set(true);
    position.set(0.33);
    assert_eq!(model.get(), Some(35));

    field.focused().set(false);
    assert!((position.get() - 0.35).abs() < 1e-12, "thumb snaps to the grid");
}

#[test]
fn commit_is_ignored_while_hidden() {
    let host = Host::new();
    let model = Model::new(Some(4), grid());
    let text = Observable::new("8".to_string());
    let field = FieldState::new();
    let linker = Linker::bind_with_config(
        &model,
        ControlAdapter::text(&text),
        &field,
        Some(&host),
        LinkConfig::default().with_label("depth"),
    );
    assert!(!linker.commit());
    assert_eq!(model.raw(), Some(4));
    assert_eq!(linker.config().label.as_deref(), Some("depth"));
}

#[test]
fn blank_input_maps_to_null() {
    let model = Model::new(Some(4), grid().nullable());
    let text = Observable::new(String::new());
    let field = FieldState::new();
    let _linker = Linker::bind(&model, ControlAdapter::text(&text), &field, None);

    field.focused().set(true);
    text.set("  ".to_string());
    assert_eq!(model.state(), ModelState::Valid);
    assert_eq!(model.raw(), None);

    field.focused().set(false);
    assert_eq!(text.get(), "");
}
