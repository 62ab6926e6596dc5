//! The update model.
//!
//! An [`Update`] is one event received from the backend. On the wire it is an
//! object with an `update_id` and at most one populated event field:
//!
//! ```json
//! { "update_id": 42, "message": { "message_id": 7, "text": "/start" } }
//! ```
//!
//! In Rust the event field becomes a closed sum type, [`UpdateKind`], so
//! "exactly one kind is populated" holds by construction. An object with none
//! of the known fields decodes to [`UpdateKind::Unknown`], which no handler can
//! ever match. An object with two or more fields is rejected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::UpdateError;
use crate::types::{
    CallbackQuery, ChatJoinRequest, ChatMemberUpdated, ChosenInlineResult, InlineQuery, Message,
    Poll, PollAnswer, PreCheckoutQuery, ShippingQuery,
};

// ============================================================================
// UpdateType
// ============================================================================

/// Payload-free discriminant of [`UpdateKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateType {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
    /// No known event field was populated.
    Unknown,
}

impl UpdateType {
    /// Every routable update type, in wire-field declaration order.
    pub const ROUTABLE: [UpdateType; 14] = [
        Self::Message,
        Self::EditedMessage,
        Self::ChannelPost,
        Self::EditedChannelPost,
        Self::InlineQuery,
        Self::ChosenInlineResult,
        Self::CallbackQuery,
        Self::ShippingQuery,
        Self::PreCheckoutQuery,
        Self::Poll,
        Self::PollAnswer,
        Self::MyChatMember,
        Self::ChatMember,
        Self::ChatJoinRequest,
    ];

    /// Returns the JSON field name carrying this kind of event.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::EditedMessage => "edited_message",
            Self::ChannelPost => "channel_post",
            Self::EditedChannelPost => "edited_channel_post",
            Self::InlineQuery => "inline_query",
            Self::ChosenInlineResult => "chosen_inline_result",
            Self::CallbackQuery => "callback_query",
            Self::ShippingQuery => "shipping_query",
            Self::PreCheckoutQuery => "pre_checkout_query",
            Self::Poll => "poll",
            Self::PollAnswer => "poll_answer",
            Self::MyChatMember => "my_chat_member",
            Self::ChatMember => "chat_member",
            Self::ChatJoinRequest => "chat_join_request",
            Self::Unknown => "unknown",
        }
    }

    /// Returns `true` for the four kinds whose payload is a [`Message`].
    pub fn is_message_like(self) -> bool {
        matches!(
            self,
            Self::Message | Self::EditedMessage | Self::ChannelPost | Self::EditedChannelPost
        )
    }
}

impl fmt::Display for UpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// UpdateKind
// ============================================================================

/// The single event carried by an [`Update`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    CallbackQuery(CallbackQuery),
    ShippingQuery(ShippingQuery),
    PreCheckoutQuery(PreCheckoutQuery),
    Poll(Poll),
    PollAnswer(PollAnswer),
    MyChatMember(ChatMemberUpdated),
    ChatMember(ChatMemberUpdated),
    ChatJoinRequest(ChatJoinRequest),
    /// The backend sent an event kind this model does not know about.
    Unknown,
}

impl UpdateKind {
    /// Returns the discriminant of this kind.
    pub fn update_type(&self) -> UpdateType {
        match self {
            Self::Message(_) => UpdateType::Message,
            Self::EditedMessage(_) => UpdateType::EditedMessage,
            Self::ChannelPost(_) => UpdateType::ChannelPost,
            Self::EditedChannelPost(_) => UpdateType::EditedChannelPost,
            Self::InlineQuery(_) => UpdateType::InlineQuery,
            Self::ChosenInlineResult(_) => UpdateType::ChosenInlineResult,
            Self::CallbackQuery(_) => UpdateType::CallbackQuery,
            Self::ShippingQuery(_) => UpdateType::ShippingQuery,
            Self::PreCheckoutQuery(_) => UpdateType::PreCheckoutQuery,
            Self::Poll(_) => UpdateType::Poll,
            Self::PollAnswer(_) => UpdateType::PollAnswer,
            Self::MyChatMember(_) => UpdateType::MyChatMember,
            Self::ChatMember(_) => UpdateType::ChatMember,
            Self::ChatJoinRequest(_) => UpdateType::ChatJoinRequest,
            Self::Unknown => UpdateType::Unknown,
        }
    }
}

// ============================================================================
// Update
// ============================================================================

/// One event received from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUpdate", into = "RawUpdate")]
pub struct Update {
    /// Monotonic identifier assigned by the backend.
    pub update_id: i64,
    /// The populated event.
    pub kind: UpdateKind,
}

impl Update {
    /// Creates an update from its identifier and event.
    pub fn new(update_id: i64, kind: UpdateKind) -> Self {
        Self { update_id, kind }
    }

    /// Returns the discriminant of the populated event.
    pub fn update_type(&self) -> UpdateType {
        self.kind.update_type()
    }

    /// Returns `true` when no known event is populated.
    pub fn is_unknown(&self) -> bool {
        matches!(self.kind, UpdateKind::Unknown)
    }

    /// Returns the message for any of the four message-shaped kinds.
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m)
            | UpdateKind::EditedMessage(m)
            | UpdateKind::ChannelPost(m)
            | UpdateKind::EditedChannelPost(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the callback query, if that is the populated kind.
    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.kind {
            UpdateKind::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    /// Returns the inline query, if that is the populated kind.
    pub fn inline_query(&self) -> Option<&InlineQuery> {
        match &self.kind {
            UpdateKind::InlineQuery(q) => Some(q),
            _ => None,
        }
    }

    /// Decodes an update from its JSON wire form.
    ///
    /// Unlike going through `serde_json::from_str::<Update>`, this keeps the
    /// structured [`UpdateError::MultipleKinds`] instead of flattening it into
    /// a serde message.
    pub fn from_json(json: &str) -> Result<Self, UpdateError> {
        let raw: RawUpdate = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

// ============================================================================
// Wire form
// ============================================================================

/// Wire shape of an update: every event as an optional field.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawUpdate {
    update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    edited_channel_post: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_query: Option<InlineQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chosen_inline_result: Option<ChosenInlineResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    callback_query: Option<CallbackQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shipping_query: Option<ShippingQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pre_checkout_query: Option<PreCheckoutQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poll: Option<Poll>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    poll_answer: Option<PollAnswer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    my_chat_member: Option<ChatMemberUpdated>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_member: Option<ChatMemberUpdated>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_join_request: Option<ChatJoinRequest>,
}

impl TryFrom<RawUpdate> for Update {
    type Error = UpdateError;

    fn try_from(raw: RawUpdate) -> Result<Self, Self::Error> {
        let mut kinds = Vec::with_capacity(1);
        kinds.extend(raw.message.map(UpdateKind::Message));
        kinds.extend(raw.edited_message.map(UpdateKind::EditedMessage));
        kinds.extend(raw.channel_post.map(UpdateKind::ChannelPost));
        kinds.extend(raw.edited_channel_post.map(UpdateKind::EditedChannelPost));
        kinds.extend(raw.inline_query.map(UpdateKind::InlineQuery));
        kinds.extend(raw.chosen_inline_result.map(UpdateKind::ChosenInlineResult));
        kinds.extend(raw.callback_query.map(UpdateKind::CallbackQuery));
        kinds.extend(raw.shipping_query.map(UpdateKind::ShippingQuery));
        kinds.extend(raw.pre_checkout_query.map(UpdateKind::PreCheckoutQuery));
        kinds.extend(raw.poll.map(UpdateKind::Poll));
        kinds.extend(raw.poll_answer.map(UpdateKind::PollAnswer));
        kinds.extend(raw.my_chat_member.map(UpdateKind::MyChatMember));
        kinds.extend(raw.chat_member.map(UpdateKind::ChatMember));
        kinds.extend(raw.chat_join_request.map(UpdateKind::ChatJoinRequest));

        if let [first, second, ..] = kinds.as_slice() {
            return Err(UpdateError::MultipleKinds {
                update_id: raw.update_id,
                first: first.update_type().as_str(),
                second: second.update_type().as_str(),
            });
        }

        Ok(Update {
            update_id: raw.update_id,
            kind: kinds.pop().unwrap_or(UpdateKind::Unknown),
        })
    }
}

impl From<Update> for RawUpdate {
    fn from(update: Update) -> Self {
        let mut raw = RawUpdate {
            update_id: update.update_id,
            ..Default::default()
        };
        match update.kind {
            UpdateKind::Message(m) => raw.message = Some(m),
            UpdateKind::EditedMessage(m) => raw.edited_message = Some(m),
            UpdateKind::ChannelPost(m) => raw.channel_post = Some(m),
            UpdateKind::EditedChannelPost(m) => raw.edited_channel_post = Some(m),
            UpdateKind::InlineQuery(q) => raw.inline_query = Some(q),
            UpdateKind::ChosenInlineResult(r) => raw.chosen_inline_result = Some(r),
            UpdateKind::CallbackQuery(q) => raw.callback_query = Some(q),
            UpdateKind::ShippingQuery(q) => raw.shipping_query = Some(q),
            UpdateKind::PreCheckoutQuery(q) => raw.pre_checkout_query = Some(q),
            UpdateKind::Poll(p) => raw.poll = Some(p),
            UpdateKind::PollAnswer(a) => raw.poll_answer = Some(a),
            UpdateKind::MyChatMember(c) => raw.my_chat_member = Some(c),
            UpdateKind::ChatMember(c) => raw.chat_member = Some(c),
            UpdateKind::ChatJoinRequest(r) => raw.chat_join_request = Some(r),
            UpdateKind::Unknown => {}
        }
        raw
    }
}
