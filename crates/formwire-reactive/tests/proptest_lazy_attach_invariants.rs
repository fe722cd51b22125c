#![forbid(unsafe_code)]

//! Property-based invariant tests for lazily attached derived values.
//!
//! These tests verify invariants that must hold for **any** sequence of
//! observer attach/detach operations and source writes:
//!
//! 1. With zero observers, no source holds a listener and every read
//!    recomputes.
//! 2. With at least one observer, each source holds exactly one listener.
//! 3. Detaching the last observer removes every source listener.
//! 4. The derived value always equals a fresh evaluation over the sources.
//! 5. Boolean aggregation matches a naive scan with `None` never coerced.

use std::rc::Rc;

use formwire_reactive::{
    Observable, ObservableValue, Subscription, all_false, all_true, any_false, any_true,
    compute_all,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    /// Attach an invalidation observer.
    AttachInvalidation,
    /// Attach a change observer.
    AttachChange,
    /// Drop the observer at `index % live`.
    Detach(usize),
    /// Write `value` into source `index % sources`.
    Write(usize, i32),
    /// Read the derived value.
    Read,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AttachInvalidation),
        Just(Op::AttachChange),
        any::<usize>().prop_map(Op::Detach),
        (any::<usize>(), -50i32..50).prop_map(|(i, v)| Op::Write(i, v)),
        Just(Op::Read),
    ]
}

fn tristate() -> impl Strategy<Value = Option<bool>> {
    prop_oneof![Just(None), Just(Some(true)), Just(Some(false))]
}

// ═════════════════════════════════════════════════════════════════════════
// 1–4. Attachment follows the observer count
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn attachment_tracks_observers(
        initial in proptest::collection::vec(-50i32..50, 1..6),
        ops in proptest::collection::vec(op_strategy(), 0..60),
    ) {
        let sources: Vec<Observable<i32>> = initial.iter().copied().map(Observable::new).collect();
        let sum = compute_all(sources.clone(), |vals: &[i32]| vals.iter().sum::<i32>());
        let mut observers: Vec<Subscription> = Vec::new();

        for op in ops {
            match op {
                Op::AttachInvalidation => {
                    observers.push(sum.add_invalidation_listener(Rc::new(|| {})));
                }
                Op::AttachChange => {
                    observers.push(sum.add_change_listener(Rc::new(|_: &i32, _: &i32| {})));
                }
                Op::Detach(i) => {
                    if !observers.is_empty() {
                        let idx = i % observers.len();
                        drop(observers.remove(idx));
                    }
                }
                Op::Write(i, v) => {
                    sources[i % sources.len()].set(v);
                }
                Op::Read => {
                    let expected: i32 = sources.iter().map(Observable::get).sum();
                    prop_assert_eq!(sum.get(), expected);
                }
            }

            let expected_per_source = usize::from(!observers.is_empty());
            for source in &sources {
                prop_assert_eq!(source.listener_count(), expected_per_source);
            }
            prop_assert_eq!(sum.observer_count(), observers.len());
        }

        observers.clear();
        for source in &sources {
            prop_assert_eq!(source.listener_count(), 0);
        }

        let before = sum.version();
        let _ = sum.get();
        let _ = sum.get();
        prop_assert_eq!(sum.version(), before + 2, "unobserved reads must recompute");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Aggregation matches naive scan
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn aggregation_matches_naive_scan(values in proptest::collection::vec(tristate(), 0..8)) {
        let sources: Vec<Observable<Option<bool>>> =
            values.iter().copied().map(Observable::new).collect();

        prop_assert_eq!(all_true(sources.clone()).get(), values.iter().all(|v| *v == Some(true)));
        prop_assert_eq!(
            all_false(sources.clone()).get(),
            values.iter().all(|v| *v == Some(false))
        );
        prop_assert_eq!(any_true(sources.clone()).get(), values.iter().any(|v| *v == Some(true)));
        prop_assert_eq!(any_false(sources).get(), values.iter().any(|v| *v == Some(false)));
    }

    #[test]
    fn observed_aggregation_tracks_writes(
        initial in proptest::collection::vec(tristate(), 1..6),
        writes in proptest::collection::vec((any::<usize>(), tristate()), 0..20),
    ) {
        let sources: Vec<Observable<Option<bool>>> =
            initial.iter().copied().map(Observable::new).collect();
        let all = all_true(sources.clone());
        let _sub = all.add_change_listener(Rc::new(|_: &bool, _: &bool| {}));

        for (i, v) in writes {
            sources[i % sources.len()].set(v);
            let naive = sources.iter().all(|s| s.get() == Some(true));
            prop_assert_eq!(all.get(), naive);
        }
    }
}
