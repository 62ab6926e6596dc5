//! Shared fixtures for unit tests.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{
    ApiResult, Bot, BoxedBot, CallbackQuery, Chat, ChatJoinRequest, ChatMemberUpdated,
    ChosenInlineResult, InlineQuery, Message, Poll, PollAnswer, PreCheckoutQuery, ShippingQuery,
    Update, UpdateKind, UpdateType,
};
use serde_json::Value;

/// A client that answers every call with `null`.
pub struct NullBot;

#[async_trait]
impl Bot for NullBot {
    fn id(&self) -> &str {
        "null"
    }

    async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
        Ok(Value::Null)
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

pub fn null_bot() -> BoxedBot {
    Arc::new(NullBot)
}

/// A text message in the given chat.
pub fn text_message(update_id: i64, chat_id: i64, text: &str) -> Update {
    Update::new(
        update_id,
        UpdateKind::Message(Message {
            chat: Chat {
                id: chat_id,
                chat_type: "private".into(),
                ..Default::default()
            },
            text: Some(text.into()),
            ..Default::default()
        }),
    )
}

/// An update of kind `update_type` with a default payload.
pub fn update_of(update_id: i64, update_type: UpdateType) -> Update {
    let kind = match update_type {
        UpdateType::Message => UpdateKind::Message(Message::default()),
        UpdateType::EditedMessage => UpdateKind::EditedMessage(Message::default()),
        UpdateType::ChannelPost => UpdateKind::ChannelPost(Message::default()),
        UpdateType::EditedChannelPost => UpdateKind::EditedChannelPost(Message::default()),
        UpdateType::InlineQuery => UpdateKind::InlineQuery(InlineQuery::default()),
        UpdateType::ChosenInlineResult => {
            UpdateKind::ChosenInlineResult(ChosenInlineResult::default())
        }
        UpdateType::CallbackQuery => UpdateKind::CallbackQuery(CallbackQuery::default()),
        UpdateType::ShippingQuery => UpdateKind::ShippingQuery(ShippingQuery::default()),
        UpdateType::PreCheckoutQuery => UpdateKind::PreCheckoutQuery(PreCheckoutQuery::default()),
        UpdateType::Poll => UpdateKind::Poll(Poll::default()),
        UpdateType::PollAnswer => UpdateKind::PollAnswer(PollAnswer::default()),
        UpdateType::MyChatMember => UpdateKind::MyChatMember(ChatMemberUpdated::default()),
        UpdateType::ChatMember => UpdateKind::ChatMember(ChatMemberUpdated::default()),
        UpdateType::ChatJoinRequest => UpdateKind::ChatJoinRequest(ChatJoinRequest::default()),
        UpdateType::Unknown => UpdateKind::Unknown,
    };
    Update::new(update_id, kind)
}
