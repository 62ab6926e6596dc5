//! The predicate type.
//!
//! A [`Predicate`] inspects an [`Update`] and decides whether routing may
//! continue down a path. Predicates are expected to be pure; the router
//! evaluates them left to right and stops at the first `false`.

use std::fmt;
use std::ops::Not;
use std::sync::Arc;

use courier_core::Update;

/// A type-erased predicate function.
pub type PredicateFn = Arc<dyn Fn(&Update) -> bool + Send + Sync>;

/// A shareable boolean test over an update.
///
/// Cloning is cheap: the function lives behind an `Arc`.
#[derive(Clone)]
pub struct Predicate {
    check_fn: PredicateFn,
}

impl Predicate {
    /// Wraps a function as a predicate.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Update) -> bool + Send + Sync + 'static,
    {
        Self {
            check_fn: Arc::new(f),
        }
    }

    /// Evaluates the predicate against an update.
    pub fn check(&self, update: &Update) -> bool {
        (self.check_fn)(update)
    }

    /// Returns a predicate that holds when both `self` and `other` hold.
    ///
    /// `other` is not evaluated when `self` fails.
    pub fn and(self, other: Predicate) -> Self {
        Self::new(move |update| self.check(update) && other.check(update))
    }

    /// Returns a predicate that holds when either `self` or `other` holds.
    ///
    /// `other` is not evaluated when `self` passes.
    pub fn or(self, other: Predicate) -> Self {
        Self::new(move |update| self.check(update) || other.check(update))
    }
}

impl Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        Self::new(move |update| !self.check(update))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::UpdateKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn update() -> Update {
        Update::new(1, UpdateKind::Unknown)
    }

    #[test]
    fn test_combinators() {
        let yes = Predicate::new(|_| true);
        let no = Predicate::new(|_| false);

        assert!(yes.clone().and(yes.clone()).check(&update()));
        assert!(!yes.clone().and(no.clone()).check(&update()));
        assert!(no.clone().or(yes.clone()).check(&update()));
        assert!(!no.clone().or(no.clone()).check(&update()));
        assert!((!no).check(&update()));
        assert!(!(!yes).check(&update()));
    }

    #[test]
    fn test_and_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = {
            let calls = Arc::clone(&calls);
            Predicate::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                true
            })
        };

        let p = Predicate::new(|_| false).and(counted);
        assert!(!p.check(&update()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
