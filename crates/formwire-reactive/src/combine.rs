#![forbid(unsafe_code)]

//! Combinators that build [`Derived`] values over N sources.
//!
//! All combinators are lazy in the sense of [`Derived`]: they hold no listener
//! on any source until the result is observed.
//!
//! # Forms
//!
//! - **Boolean aggregation**: [`all_true`], [`all_false`], [`any_true`],
//!   [`any_false`]. Each is a linear scan comparing every source against an
//!   expected boolean by value equality. A source whose value is `None` is
//!   neither true nor false: it fails `all_*` and never satisfies `any_*`.
//! - **map**: [`map`], [`map2`], [`map3`], [`map_all`]. The function runs only
//!   if every source value is `Some`; otherwise the result is `None` and the
//!   function is not invoked.
//! - **compute**: [`compute`], [`compute2`], [`compute3`], [`compute_all`].
//!   The function always runs and receives the source values as they are,
//!   `None` included.

use std::rc::Rc;

use crate::derived::{Dependency, Derived};
use crate::observable::ObservableValue;

/// A value that may be read as a three-state boolean.
pub trait Tristate {
    /// `Some(b)` for a definite boolean, `None` for "no value".
    fn tristate(&self) -> Option<bool>;
}

impl Tristate for bool {
    fn tristate(&self) -> Option<bool> {
        Some(*self)
    }
}

impl Tristate for Option<bool> {
    fn tristate(&self) -> Option<bool> {
        *self
    }
}

#[derive(Clone, Copy)]
enum Quantifier {
    All,
    Any,
}

fn aggregate<B, S>(
    sources: impl IntoIterator<Item = S>,
    expected: bool,
    quantifier: Quantifier,
) -> Derived<bool>
where
    B: Tristate + 'static,
    S: ObservableValue<B> + Clone + 'static,
{
    let sources: Rc<[S]> = sources.into_iter().collect();
    let dependencies = sources.iter().map(Dependency::on::<B, S>).collect();
    Derived::new(dependencies, move || {
        let matches = |s: &S| s.get().tristate() == Some(expected);
        match quantifier {
            Quantifier::All => sources.iter().all(matches),
            Quantifier::Any => sources.iter().any(matches),
        }
    })
}

/// `true` iff every source is exactly `true` (vacuously `true` when empty).
pub fn all_true<B, S>(sources: impl IntoIterator<Item = S>) -> Derived<bool>
where
    B: Tristate + 'static,
    S: ObservableValue<B> + Clone + 'static,
{
    aggregate(sources, true, Quantifier::All)
}

/// `true` iff every source is exactly `false` (vacuously `true` when empty).
pub fn all_false<B, S>(sources: impl IntoIterator<Item = S>) -> Derived<bool>
where
    B: Tristate + 'static,
    S: ObservableValue<B> + Clone + 'static,
{
    aggregate(sources, false, Quantifier::All)
}

/// `true` iff at least one source is exactly `true`.
pub fn any_true<B, S>(sources: impl IntoIterator<Item = S>) -> Derived<bool>
where
    B: Tristate + 'static,
    S: ObservableValue<B> + Clone + 'static,
{
    aggregate(sources, true, Quantifier::Any)
}

/// `true` iff at least one source is exactly `false`.
pub fn any_false<B, S>(sources: impl IntoIterator<Item = S>) -> Derived<bool>
where
    B: Tristate + 'static,
    S: ObservableValue<B> + Clone + 'static,
{
    aggregate(sources, false, Quantifier::Any)
}

// ---------------------------------------------------------------------------
// map: skip on None
// ---------------------------------------------------------------------------

/// Map one optional source; `None` in, `None` out without calling `f`.
pub fn map<A, R, S>(source: &S, f: impl Fn(&A) -> R + 'static) -> Derived<Option<R>>
where
    A: 'static,
    R: Clone + PartialEq + 'static,
    S: ObservableValue<Option<A>> + Clone + 'static,
{
    let src = source.clone();
    Derived::new(vec![Dependency::on(source)], move || {
        src.get().as_ref().map(&f)
    })
}

/// Map two optional sources.
pub fn map2<A, B, R, SA, SB>(
    a: &SA,
    b: &SB,
    f: impl Fn(&A, &B) -> R + 'static,
) -> Derived<Option<R>>
where
    A: 'static,
    B: 'static,
    R: Clone + PartialEq + 'static,
    SA: ObservableValue<Option<A>> + Clone + 'static,
    SB: ObservableValue<Option<B>> + Clone + 'static,
{
    let (src_a, src_b) = (a.clone(), b.clone());
    Derived::new(vec![Dependency::on(a), Dependency::on(b)], move || {
        match (src_a.get(), src_b.get()) {
            (Some(va), Some(vb)) => Some(f(&va, &vb)),
            _ => None,
        }
    })
}

/// Map three optional sources.
pub fn map3<A, B, C, R, SA, SB, SC>(
    a: &SA,
    b: &SB,
    c: &SC,
    f: impl Fn(&A, &B, &C) -> R + 'static,
) -> Derived<Option<R>>
where
    A: 'static,
    B: 'static,
    C: 'static,
    R: Clone + PartialEq + 'static,
    SA: ObservableValue<Option<A>> + Clone + 'static,
    SB: ObservableValue<Option<B>> + Clone + 'static,
    SC: ObservableValue<Option<C>> + Clone + 'static,
{
    let (src_a, src_b, src_c) = (a.clone(), b.clone(), c.clone());
    Derived::new(
        vec![Dependency::on(a), Dependency::on(b), Dependency::on(c)],
        move || match (src_a.get(), src_b.get(), src_c.get()) {
            (Some(va), Some(vb), Some(vc)) => Some(f(&va, &vb, &vc)),
            _ => None,
        },
    )
}

/// Map N optional sources of one type.
pub fn map_all<A, R, S>(
    sources: impl IntoIterator<Item = S>,
    f: impl Fn(&[A]) -> R + 'static,
) -> Derived<Option<R>>
where
    A: 'static,
    R: Clone + PartialEq + 'static,
    S: ObservableValue<Option<A>> + Clone + 'static,
{
    let sources: Rc<[S]> = sources.into_iter().collect();
    let dependencies = sources.iter().map(Dependency::on::<Option<A>, S>).collect();
    Derived::new(dependencies, move || {
        let values: Option<Vec<A>> = sources.iter().map(|s| s.get()).collect();
        values.map(|values| f(&values))
    })
}

// ---------------------------------------------------------------------------
// compute: always invoke
// ---------------------------------------------------------------------------

/// Compute from one source.
pub fn compute<A, R, S>(source: &S, f: impl Fn(&A) -> R + 'static) -> Derived<R>
where
    A: 'static,
    R: Clone + PartialEq + 'static,
    S: ObservableValue<A> + Clone + 'static,
{
    let src = source.clone();
    Derived::new(vec![Dependency::on(source)], move || f(&src.get()))
}

/// Compute from two sources.
pub fn compute2<A, B, R, SA, SB>(
    a: &SA,
    b: &SB,
    f: impl Fn(&A, &B) -> R + 'static,
) -> Derived<R>
where
    A: 'static,
    B: 'static,
    R: Clone + PartialEq + 'static,
    SA: ObservableValue<A> + Clone + 'static,
    SB: ObservableValue<B> + Clone + 'static,
{
    let (src_a, src_b) = (a.clone(), b.clone());
    Derived::new(vec![Dependency::on(a), Dependency::on(b)], move || {
        f(&src_a.get(), &src_b.get())
    })
}

/// Compute from three sources.
pub fn compute3<A, B, C, R, SA, SB, SC>(
    a: &SA,
    b: &SB,
    c: &SC,
    f: impl Fn(&A, &B, &C) -> R + 'static,
) -> Derived<R>
where
    A: 'static,
    B: 'static,
    C: 'static,
    R: Clone + PartialEq + 'static,
    SA: ObservableValue<A> + Clone + 'static,
    SB: ObservableValue<B> + Clone + 'static,
    SC: ObservableValue<C> + Clone + 'static,
{
    let (src_a, src_b, src_c) = (a.clone(), b.clone(), c.clone());
    Derived::new(
        vec![Dependency::on(a), Dependency::on(b), Dependency::on(c)],
        move || f(&src_a.get(), &src_b.get(), &src_c.get()),
    )
}

/// Compute from N sources of one type.
pub fn compute_all<A, R, S>(
    sources: impl IntoIterator<Item = S>,
    f: impl Fn(&[A]) -> R + 'static,
) -> Derived<R>
where
    A: 'static,
    R: Clone + PartialEq + 'static,
    S: ObservableValue<A> + Clone + 'static,
{
    let sources: Rc<[S]> = sources.into_iter().collect();
    let dependencies = sources.iter().map(Dependency::on::<A, S>).collect();
    Derived::new(dependencies, move || {
        let values: Vec<A> = sources.iter().map(|s| s.get()).collect();
        f(&values)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::{DynObservable, Observable};
    use std::cell::{Cell, RefCell};

    #[test]
    fn all_true_over_mixed_flags() {
        let a = Observable::new(true);
        let b = Observable::new(true);
        let c = Observable::new(false);
        let all = all_true([a.clone(), b.clone(), c.clone()]);
        assert!(!all.get());

        c.set(true);
        assert!(all.get());
    }

    #[test]
    fn flipping_last_false_source_notifies_once_each() {
        let a = Observable::new(true);
        let b = Observable::new(true);
        let c = Observable::new(false);
        let all = all_true([a, b, c.clone()]);

        let invalidations = Rc::new(Cell::new(0u32));
        let changes = Rc::new(RefCell::new(Vec::new()));
        let i = Rc::clone(&invalidations);
        let _inval = all.add_invalidation_listener(Rc::new(move || i.set(i.get() + 1)));
        let ch = Rc::clone(&changes);
        let _change = all.add_change_listener(Rc::new(move |old: &bool, new: &bool| {
            ch.borrow_mut().push((*old, *new));
        }));

        c.set(true);
        assert_eq!(invalidations.get(), 1);
        assert_eq!(*changes.borrow(), vec![(false, true)]);
    }

    #[test]
    fn none_is_neither_true_nor_false() {
        let unknown: Observable<Option<bool>> = Observable::new(None);
        let yes = Observable::new(Some(true));
        let no = Observable::new(Some(false));

        assert!(!all_true([unknown.clone(), yes.clone()]).get());
        assert!(!all_false([unknown.clone(), no.clone()]).get());
        assert!(any_true([unknown.clone(), yes.clone()]).get());
        assert!(!any_true([unknown.clone()]).get());
        assert!(!any_false([unknown.clone()]).get());
        assert!(any_false([unknown, no]).get());
    }

    #[test]
    fn empty_aggregations() {
        let none: Vec<Observable<bool>> = Vec::new();
        assert!(all_true(none.clone()).get());
        assert!(all_false(none.clone()).get());
        assert!(!any_true(none.clone()).get());
        assert!(!any_false(none).get());
    }

    #[test]
    fn heterogeneous_sources_through_dyn() {
        let flag = Observable::new(true);
        let src = Observable::new(3);
        let positive = compute(&src, |v: &i32| *v > 0);
        let sources: Vec<DynObservable<bool>> = vec![flag.as_dyn(), positive.as_dyn()];
        let both = all_true(sources);
        assert!(both.get());

        src.set(-1);
        assert!(!both.get());
    }

    #[test]
    fn map_skips_function_on_none() {
        let calls = Rc::new(Cell::new(0u32));
        let a = Observable::new(Some(2));
        let b: Observable<Option<i32>> = Observable::new(None);
        let c = Rc::clone(&calls);
        let sum = map2(&a, &b, move |x: &i32, y: &i32| {
            c.set(c.get() + 1);
            x + y
        });

        assert_eq!(sum.get(), None);
        assert_eq!(calls.get(), 0);

        b.set(Some(5));
        assert_eq!(sum.get(), Some(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn map_single_and_triple() {
        let a = Observable::new(Some(3));
        let doubled = map(&a, |v: &i32| v * 2);
        assert_eq!(doubled.get(), Some(6));
        a.set(None);
        assert_eq!(doubled.get(), None);

        let x = Observable::new(Some(1));
        let y = Observable::new(Some(2));
        let z = Observable::new(Some(3));
        let joined = map3(&x, &y, &z, |a: &i32, b: &i32, c: &i32| format!("{a}{b}{c}"));
        assert_eq!(joined.get().as_deref(), Some("123"));
    }

    #[test]
    fn map_all_requires_every_value() {
        let sources: Vec<Observable<Option<i32>>> =
            vec![Observable::new(Some(1)), Observable::new(Some(2)), Observable::new(None)];
        let total = map_all(sources.clone(), |vals: &[i32]| vals.iter().sum::<i32>());
        assert_eq!(total.get(), None);

        sources[2].set(Some(4));
        assert_eq!(total.get(), Some(7));
    }

    #[test]
    fn compute_passes_none_through() {
        let a: Observable<Option<i32>> = Observable::new(None);
        let b = Observable::new(Some(4));
        let described = compute2(&a, &b, |x: &Option<i32>, y: &Option<i32>| {
            format!("{x:?}/{y:?}")
        });
        assert_eq!(described.get(), "None/Some(4)");
    }

    #[test]
    fn compute_all_and_compute3() {
        let sources = vec![Observable::new(1), Observable::new(2), Observable::new(3)];
        let product = compute_all(sources.clone(), |vals: &[i32]| vals.iter().product::<i32>());
        assert_eq!(product.get(), 6);

        let sum = compute3(&sources[0], &sources[1], &sources[2], |a: &i32, b: &i32, c: &i32| {
            a + b + c
        });
        sources[0].set(10);
        assert_eq!(sum.get(), 15);
        assert_eq!(product.get(), 60);
    }

    #[test]
    fn combinators_attach_one_listener_per_source_while_observed() {
        let sources = vec![Observable::new(true), Observable::new(false), Observable::new(true)];
        let any = any_false(sources.clone());

        for _ in 0..3 {
            let _ = any.get();
        }
        assert!(sources.iter().all(|s| s.listener_count() == 0));

        let sub = any.add_invalidation_listener(Rc::new(|| {}));
        assert!(sources.iter().all(|s| s.listener_count() == 1));

        drop(sub);
        assert!(sources.iter().all(|s| s.listener_count() == 0));
    }
}
