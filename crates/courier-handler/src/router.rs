//! Routing of updates to registrations.

use courier_core::Update;
use tracing::trace;

use crate::group::HandlerGroup;
use crate::handler::{Handler, Registrar};
use crate::predicate::Predicate;

/// A registration together with its fully flattened predicate list.
#[derive(Debug, Clone)]
pub struct FlatHandler<'a> {
    pub handler: &'a Handler,
    /// Ancestor group prefixes (outermost first), then the registration's own
    /// predicates.
    pub predicates: Vec<&'a Predicate>,
}

/// The registration forest, with first-match routing.
///
/// Top-level registrations live in an unguarded root group.
#[derive(Clone, Debug, Default)]
pub struct Router {
    root: HandlerGroup,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first registration, in depth-first registration order,
    /// whose predicates all hold for `update`.
    ///
    /// Unknown updates match nothing and evaluate no predicate.
    pub fn route(&self, update: &Update) -> Option<&Handler> {
        if update.is_unknown() {
            trace!(update_id = update.update_id, "Unknown update, nothing to route");
            return None;
        }
        self.root.find(update)
    }

    /// Every registration in routing order, with its flattened predicates.
    pub fn flatten(&self) -> Vec<FlatHandler<'_>> {
        let mut out = Vec::new();
        self.root.flatten_into(&[], &mut out);
        out.into_iter()
            .map(|(handler, predicates)| FlatHandler {
                handler,
                predicates,
            })
            .collect()
    }

    pub fn handler_count(&self) -> usize {
        self.root.handler_count()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The top-level group.
    pub fn root(&self) -> &HandlerGroup {
        &self.root
    }
}

impl Registrar for Router {
    fn register(&mut self, handler: Handler) -> &mut Self {
        self.root.register(handler);
        self
    }

    fn group(&mut self, predicates: impl IntoIterator<Item = Predicate>) -> &mut HandlerGroup {
        self.root.group(predicates)
    }
}
