//! # Courier Handler
//!
//! Predicate-based routing of updates to typed handlers, with concurrent
//! invocation and graceful shutdown.
//!
//! This layer provides:
//! - [`Predicate`]s and a library of common ones in [`predicates`]
//! - Typed handler registration through the [`Registrar`] trait
//!   (`handle_message`, `handle_callback_query`, ...)
//! - [`HandlerGroup`]s that share predicate prefixes and nest arbitrarily
//! - A [`Router`] that picks the first matching handler in registration order
//! - [`BotHandler`], which owns the routes and an [`UpdateSource`], runs the
//!   dispatch loop, and drains in-flight handlers on stop
//!
//! ```rust,ignore
//! use courier_handler::{BotHandler, Registrar, predicates};
//!
//! let (tx, rx) = courier_handler::update_channel(100);
//! let mut bh = BotHandler::new(bot, rx);
//!
//! bh.handle_message(start, [predicates::command_equal("start")]);
//! bh.group([predicates::private_chat()], |private| {
//!     private.handle_message(echo, [predicates::any_message_with_text()]);
//! });
//!
//! let bh = Arc::new(bh);
//! tokio::spawn({
//!     let bh = Arc::clone(&bh);
//!     async move { bh.start().await }
//! });
//! // ...later...
//! bh.stop().await?;
//! ```

pub mod dispatcher;
pub mod error;
pub mod group;
pub mod handler;
pub mod predicate;
pub mod predicates;
pub mod router;
pub mod source;

#[cfg(test)]
mod testing;

pub use dispatcher::{BotHandler, LifecycleState};
pub use error::{HandlerError, HandlerResult};
pub use group::{HandlerGroup, Route};
pub use handler::{
    BoxFuture, Callback, CallbackQueryHandler, ChatJoinRequestHandler, ChatMemberUpdatedHandler,
    ChosenInlineResultHandler, Handler, InlineQueryHandler, MessageHandler, PollAnswerHandler,
    PollHandler, PreCheckoutQueryHandler, Registrar, ShippingQueryHandler, TypedCallback,
};
pub use predicate::Predicate;
pub use router::{FlatHandler, Router};
pub use source::{StreamSource, UpdateSource, update_channel};
