//! # Courier Core
//!
//! The data model shared by every Courier crate.
//!
//! ## Layers
//!
//! - **Update model**: [`Update`] is a closed sum type over every event kind the
//!   backend can deliver ([`UpdateKind`]), with [`UpdateType`] as its
//!   payload-free discriminant. Exactly one kind is populated per update; an
//!   update carrying none of the known kinds decodes as [`UpdateKind::Unknown`].
//! - **Payload types**: [`Message`], [`CallbackQuery`], [`InlineQuery`] and the
//!   rest of the event payloads, as they appear on the wire.
//! - **Client handle**: the [`Bot`] trait and its shared form [`BoxedBot`],
//!   handed unchanged to every handler so it can call back into the API.
//!
//! ```text
//! ┌───────────┐  Update   ┌────────────┐  (BoxedBot, Payload)  ┌──────────┐
//! │ Transport │──────────▶│ BotHandler │──────────────────────▶│ Callback │
//! └───────────┘           └────────────┘                       └──────────┘
//! ```
//!
//! The transport and the API binding catalogue live outside this workspace;
//! Courier only consumes decoded updates and forwards the client handle.

pub mod bot;
pub mod error;
pub mod types;
pub mod update;

pub use bot::{ApiError, ApiResult, Bot, BoxedBot, downcast_bot};
pub use error::{UpdateError, UpdateResult};
pub use types::{
    CallbackQuery, Chat, ChatJoinRequest, ChatMember, ChatMemberUpdated, ChosenInlineResult,
    InlineQuery, Message, MessageEntity, OrderInfo, Poll, PollAnswer, PollOption,
    PreCheckoutQuery, ShippingAddress, ShippingQuery, User,
};
pub use update::{Update, UpdateKind, UpdateType};

/// Prelude for common imports.
pub mod prelude {
    pub use super::bot::{Bot, BoxedBot};
    pub use super::types::*;
    pub use super::update::{Update, UpdateKind, UpdateType};
}
