//! Handler groups.
//!
//! A [`HandlerGroup`] carries a predicate prefix shared by all of its members.
//! Members are registrations or further groups, so a group tree behaves like
//! the flat list obtained by prepending every ancestor's prefix to each
//! registration's own predicates.
//!
//! ```rust,ignore
//! let admin = bh.group([predicates::chat_id(ADMIN_CHAT)]);
//! admin.name("admin");
//! admin.handle_message(ban, [predicates::command_equal("ban")]);
//! admin.handle_message(kick, [predicates::command_equal("kick")]);
//! ```

use courier_core::Update;
use tracing::trace;

use crate::handler::{Handler, Registrar};
use crate::predicate::Predicate;

/// A member of a group.
#[derive(Clone, Debug)]
pub enum Route {
    Handler(Handler),
    Group(HandlerGroup),
}

/// A predicate prefix together with the routes it guards.
#[derive(Clone, Debug, Default)]
pub struct HandlerGroup {
    predicates: Vec<Predicate>,
    members: Vec<Route>,
    name: Option<String>,
}

impl HandlerGroup {
    /// Creates an empty group guarded by `predicates`.
    pub fn new(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self {
            predicates: predicates.into_iter().collect(),
            members: Vec::new(),
            name: None,
        }
    }

    /// Sets a name for this group (shown in trace logs).
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn members(&self) -> &[Route] {
        &self.members
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of registrations in this group and all nested groups.
    pub fn handler_count(&self) -> usize {
        self.members
            .iter()
            .map(|route| match route {
                Route::Handler(_) => 1,
                Route::Group(group) => group.handler_count(),
            })
            .sum()
    }

    fn prefix_matches(&self, update: &Update) -> bool {
        self.predicates.iter().all(|p| p.check(update))
    }

    /// Finds the first registration in depth-first order whose predicates,
    /// including this group's prefix, all hold.
    ///
    /// The prefix is evaluated once; when it fails no member is visited.
    pub fn find(&self, update: &Update) -> Option<&Handler> {
        if !self.prefix_matches(update) {
            trace!(
                group = self.get_name().unwrap_or("<unnamed>"),
                update_id = update.update_id,
                "Group prefix failed, skipping members"
            );
            return None;
        }

        self.members.iter().find_map(|route| match route {
            Route::Handler(handler) => handler.matches(update).then_some(handler),
            Route::Group(group) => group.find(update),
        })
    }

    /// Appends every registration below this group to `out`, each with its
    /// full predicate chain: `prefix`, this group's prefix, nested prefixes,
    /// then the registration's own list.
    pub(crate) fn flatten_into<'a>(
        &'a self,
        prefix: &[&'a Predicate],
        out: &mut Vec<(&'a Handler, Vec<&'a Predicate>)>,
    ) {
        let mut chain: Vec<&Predicate> = prefix.to_vec();
        chain.extend(self.predicates.iter());

        for route in &self.members {
            match route {
                Route::Handler(handler) => {
                    let mut predicates = chain.clone();
                    predicates.extend(handler.predicates().iter());
                    out.push((handler, predicates));
                }
                Route::Group(group) => group.flatten_into(&chain, out),
            }
        }
    }
}

impl Route {
    /// The group behind this route. A handler route is replaced by an empty
    /// group first.
    fn group_mut_or_default(&mut self) -> &mut HandlerGroup {
        match self {
            Route::Group(group) => group,
            Route::Handler(_) => {
                *self = Route::Group(HandlerGroup::default());
                self.group_mut_or_default()
            }
        }
    }
}

impl Registrar for HandlerGroup {
    fn register(&mut self, handler: Handler) -> &mut Self {
        self.members.push(Route::Handler(handler));
        self
    }

    fn group(&mut self, predicates: impl IntoIterator<Item = Predicate>) -> &mut HandlerGroup {
        let index = self.members.len();
        self.members.push(Route::Group(HandlerGroup::new(predicates)));
        self.members[index].group_mut_or_default()
    }
}
