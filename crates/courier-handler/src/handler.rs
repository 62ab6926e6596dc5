//! Typed handler callbacks and the registration API.
//!
//! A handler is an async function taking the bot client and the payload of
//! one kind of update:
//!
//! ```rust,ignore
//! async fn on_start(bot: BoxedBot, message: Message) {
//!     // ...
//! }
//!
//! bh.handle_message(on_start, [predicates::command_equal("start")]);
//! ```
//!
//! Each `handle_*` method wraps the function in the matching [`Callback`]
//! variant, so the router never needs a runtime cast to hand the payload
//! over.

use std::future::Future;
use std::sync::Arc;

use courier_core::{
    BoxedBot, CallbackQuery, ChatJoinRequest, ChatMemberUpdated, ChosenInlineResult, InlineQuery,
    Message, Poll, PollAnswer, PreCheckoutQuery, ShippingQuery, Update, UpdateKind, UpdateType,
};

use crate::group::HandlerGroup;
use crate::predicate::Predicate;
use crate::predicates::update_type;

/// A boxed, sendable callback future.
pub type BoxFuture = futures::future::BoxFuture<'static, ()>;

/// A type-erased callback for payloads of type `P`.
pub type TypedCallback<P> = Arc<dyn Fn(BoxedBot, P) -> BoxFuture + Send + Sync>;

pub type MessageHandler = TypedCallback<Message>;
pub type InlineQueryHandler = TypedCallback<InlineQuery>;
pub type ChosenInlineResultHandler = TypedCallback<ChosenInlineResult>;
pub type CallbackQueryHandler = TypedCallback<CallbackQuery>;
pub type ShippingQueryHandler = TypedCallback<ShippingQuery>;
pub type PreCheckoutQueryHandler = TypedCallback<PreCheckoutQuery>;
pub type PollHandler = TypedCallback<Poll>;
pub type PollAnswerHandler = TypedCallback<PollAnswer>;
pub type ChatMemberUpdatedHandler = TypedCallback<ChatMemberUpdated>;
pub type ChatJoinRequestHandler = TypedCallback<ChatJoinRequest>;

fn typed<P, F, Fut>(f: F) -> TypedCallback<P>
where
    F: Fn(BoxedBot, P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |bot, payload| Box::pin(f(bot, payload)))
}

// ============================================================================
// Callback
// ============================================================================

/// A callback bound to exactly one kind of update.
#[derive(Clone)]
pub enum Callback {
    Message(MessageHandler),
    EditedMessage(MessageHandler),
    ChannelPost(MessageHandler),
    EditedChannelPost(MessageHandler),
    InlineQuery(InlineQueryHandler),
    ChosenInlineResult(ChosenInlineResultHandler),
    CallbackQuery(CallbackQueryHandler),
    ShippingQuery(ShippingQueryHandler),
    PreCheckoutQuery(PreCheckoutQueryHandler),
    Poll(PollHandler),
    PollAnswer(PollAnswerHandler),
    MyChatMember(ChatMemberUpdatedHandler),
    ChatMember(ChatMemberUpdatedHandler),
    ChatJoinRequest(ChatJoinRequestHandler),
}

impl Callback {
    /// The kind of update this callback accepts.
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
        }
    }

    /// Builds the callback future for `kind`.
    ///
    /// Returns `None` when the payload is not the kind this callback accepts.
    pub fn invoke(&self, bot: BoxedBot, kind: UpdateKind) -> Option<BoxFuture> {
        let fut = match (self, kind) {
            (Self::Message(f), UpdateKind::Message(m)) => f(bot, m),
            (Self::EditedMessage(f), UpdateKind::EditedMessage(m)) => f(bot, m),
            (Self::ChannelPost(f), UpdateKind::ChannelPost(m)) => f(bot, m),
            (Self::EditedChannelPost(f), UpdateKind::EditedChannelPost(m)) => f(bot, m),
            (Self::InlineQuery(f), UpdateKind::InlineQuery(q)) => f(bot, q),
            (Self::ChosenInlineResult(f), UpdateKind::ChosenInlineResult(r)) => f(bot, r),
            (Self::CallbackQuery(f), UpdateKind::CallbackQuery(q)) => f(bot, q),
            (Self::ShippingQuery(f), UpdateKind::ShippingQuery(q)) => f(bot, q),
            (Self::PreCheckoutQuery(f), UpdateKind::PreCheckoutQuery(q)) => f(bot, q),
            (Self::Poll(f), UpdateKind::Poll(p)) => f(bot, p),
            (Self::PollAnswer(f), UpdateKind::PollAnswer(a)) => f(bot, a),
            (Self::MyChatMember(f), UpdateKind::MyChatMember(u)) => f(bot, u),
            (Self::ChatMember(f), UpdateKind::ChatMember(u)) => f(bot, u),
            (Self::ChatJoinRequest(f), UpdateKind::ChatJoinRequest(r)) => f(bot, r),
            _ => return None,
        };
        Some(fut)
    }
}

// ============================================================================
// Handler
// ============================================================================

/// One registration: a typed callback plus the predicates guarding it.
///
/// The first predicate is always the implicit update-kind check added by
/// [`Handler::new`].
#[derive(Clone)]
pub struct Handler {
    callback: Callback,
    predicates: Vec<Predicate>,
}

impl Handler {
    /// Creates a registration, prepending the kind check for `callback`.
    pub fn new(callback: Callback, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut all = vec![update_type(callback.update_type())];
        all.extend(predicates);
        Self {
            callback,
            predicates: all,
        }
    }

    pub fn update_type(&self) -> UpdateType {
        self.callback.update_type()
    }

    /// The registration's own predicates, kind check first.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// Whether every own predicate holds, evaluated in order.
    pub fn matches(&self, update: &Update) -> bool {
        self.predicates.iter().all(|p| p.check(update))
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("update_type", &self.update_type())
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

// ============================================================================
// Registrar
// ============================================================================

/// Registration surface shared by [`BotHandler`](crate::BotHandler),
/// [`Router`](crate::Router) and [`HandlerGroup`].
///
/// Registration order is routing order: the first registration whose
/// predicates all hold receives the update.
pub trait Registrar {
    /// Appends a registration.
    fn register(&mut self, handler: Handler) -> &mut Self;

    /// Appends a nested group guarded by `predicates` and returns it.
    fn group(&mut self, predicates: impl IntoIterator<Item = Predicate>) -> &mut HandlerGroup;

    fn handle_message<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::Message(typed(f)), predicates))
    }

    fn handle_edited_message<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::EditedMessage(typed(f)), predicates))
    }

    fn handle_channel_post<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::ChannelPost(typed(f)), predicates))
    }

    fn handle_edited_channel_post<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(
            Callback::EditedChannelPost(typed(f)),
            predicates,
        ))
    }

    fn handle_inline_query<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, InlineQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::InlineQuery(typed(f)), predicates))
    }

    fn handle_chosen_inline_result<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, ChosenInlineResult) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(
            Callback::ChosenInlineResult(typed(f)),
            predicates,
        ))
    }

    fn handle_callback_query<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, CallbackQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::CallbackQuery(typed(f)), predicates))
    }

    fn handle_shipping_query<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, ShippingQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::ShippingQuery(typed(f)), predicates))
    }

    fn handle_pre_checkout_query<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, PreCheckoutQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(
            Callback::PreCheckoutQuery(typed(f)),
            predicates,
        ))
    }

    fn handle_poll<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, Poll) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::Poll(typed(f)), predicates))
    }

    fn handle_poll_answer<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, PollAnswer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::PollAnswer(typed(f)), predicates))
    }

    /// Registers for changes to the bot's own membership in a chat.
    fn handle_my_chat_member_updated<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, ChatMemberUpdated) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::MyChatMember(typed(f)), predicates))
    }

    /// Registers for membership changes of other chat members.
    fn handle_chat_member_updated<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, ChatMemberUpdated) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(Callback::ChatMember(typed(f)), predicates))
    }

    fn handle_chat_join_request<F, Fut>(
        &mut self,
        f: F,
        predicates: impl IntoIterator<Item = Predicate>,
    ) -> &mut Self
    where
        F: Fn(BoxedBot, ChatJoinRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.register(Handler::new(
            Callback::ChatJoinRequest(typed(f)),
            predicates,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::text_equal;
    use crate::testing::null_bot;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn message(text: &str) -> UpdateKind {
        UpdateKind::Message(Message {
            text: Some(text.into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_kind_predicate_comes_first() {
        let handler = Handler::new(Callback::Poll(typed(|_, _: Poll| async {})), []);
        assert_eq!(handler.predicates().len(), 1);
        assert_eq!(handler.update_type(), UpdateType::Poll);

        let handler = Handler::new(
            Callback::Message(typed(|_, _: Message| async {})),
            [text_equal("hi")],
        );
        assert_eq!(handler.predicates().len(), 2);

        let poll = Update::new(1, UpdateKind::Poll(Poll::default()));
        assert!(!handler.predicates()[0].check(&poll));
        assert!(!handler.matches(&poll));
        assert!(handler.matches(&Update::new(2, message("hi"))));
    }

    #[tokio::test]
    async fn test_invoke_passes_payload() {
        let seen = Arc::new(AtomicUsize::new(0));
        let callback = {
            let seen = Arc::clone(&seen);
            Callback::Message(typed(move |_, m: Message| {
                let seen = Arc::clone(&seen);
                async move {
                    if m.text() == "ping" {
                        seen.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }))
        };

        let fut = callback.invoke(null_bot(), message("ping"));
        fut.expect("message callback accepts messages").await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invoke_rejects_other_kinds() {
        let callback = Callback::EditedMessage(typed(|_, _: Message| async {}));
        assert!(callback.invoke(null_bot(), message("x")).is_none());
        assert!(callback.invoke(null_bot(), UpdateKind::Unknown).is_none());
    }
}
