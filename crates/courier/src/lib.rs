//! # Courier
//!
//! A concurrent, predicate-routed update dispatcher for Telegram-style bot
//! backends.
//!
//! Updates arrive from an [`UpdateSource`](handler::UpdateSource). Each one is
//! routed to the first registration, in registration order, whose predicates
//! all hold, and its callback runs on its own task. Stopping waits for every
//! launched callback.
//!
//! ## Crates
//!
//! - [`core`]: the update model, payload types and the `Bot` client trait
//! - [`handler`]: predicates, groups, routing and the `BotHandler` lifecycle
//! - [`runtime`]: configuration, logging and signal handling
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! async fn start(bot: BoxedBot, message: Message) {
//!     let _ = bot
//!         .call_api("sendMessage", json!({ "chat_id": message.chat.id, "text": "Hi!" }))
//!         .await;
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CourierRuntime::new();
//!     let (tx, rx) = runtime.update_channel();
//!
//!     let mut bh = BotHandler::new(my_bot(), rx);
//!     bh.handle_message(start, [command_equal("start")]);
//!
//!     tokio::spawn(poll_updates(tx));
//!     runtime.run(&bh).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log format

pub use courier_core as core;
pub use courier_handler as handler;
pub use courier_runtime as runtime;

pub use courier_core::{Bot, BoxedBot, Update, UpdateKind, UpdateType};
pub use courier_handler::{BotHandler, HandlerGroup, LifecycleState, Predicate, Registrar};
pub use courier_runtime::{CourierConfig, CourierRuntime};

/// Everything needed to write and register handlers.
pub mod prelude {
    pub use courier_core::prelude::*;
    pub use courier_core::{ApiError, ApiResult, downcast_bot};
    pub use courier_handler::predicates::*;
    pub use courier_handler::{
        BotHandler, HandlerError, HandlerGroup, LifecycleState, Predicate, Registrar,
        UpdateSource, update_channel,
    };
    pub use courier_runtime::prelude::*;
    pub use courier_runtime::{CourierConfig, CourierRuntime};
}
