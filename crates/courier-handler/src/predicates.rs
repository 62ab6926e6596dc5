//! Predicate builders for common routing decisions.
//!
//! Every function here returns a [`Predicate`] ready to pass to a `handle_*`
//! method or to [`Registrar::group`](crate::Registrar::group).
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_handler::predicates::{command_equal, not, any_command, any_message_with_text};
//!
//! bh.handle_message(help, [command_equal("help")]);
//! bh.handle_message(chat, [any_message_with_text(), not(any_command())]);
//! ```
//!
//! Text predicates look at [`Update::message`], so they apply to messages,
//! edited messages, channel posts and edited channel posts alike. Commands are
//! compared case-insensitively, the way the Bot API treats them.

use courier_core::{Update, UpdateType};

use crate::predicate::Predicate;

// ============================================================================
// Combinators
// ============================================================================

/// Always passes.
pub fn any() -> Predicate {
    Predicate::new(|_| true)
}

/// Never passes.
pub fn none() -> Predicate {
    Predicate::new(|_| false)
}

/// Passes when every predicate passes, checked in order with short-circuit.
///
/// An empty list passes.
pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    let predicates: Vec<Predicate> = predicates.into_iter().collect();
    Predicate::new(move |update| predicates.iter().all(|p| p.check(update)))
}

/// Passes when at least one predicate passes, checked in order with short-circuit.
///
/// An empty list fails.
pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    let predicates: Vec<Predicate> = predicates.into_iter().collect();
    Predicate::new(move |update| predicates.iter().any(|p| p.check(update)))
}

/// Inverts a predicate.
pub fn not(predicate: Predicate) -> Predicate {
    !predicate
}

// ============================================================================
// Update kind
// ============================================================================

/// Passes when the update carries the given kind of event.
///
/// Every registration gets one of these prepended automatically.
pub fn update_type(expected: UpdateType) -> Predicate {
    Predicate::new(move |update| update.update_type() == expected)
}

/// Passes for plain (non-edited, non-channel) messages.
pub fn any_message() -> Predicate {
    update_type(UpdateType::Message)
}

/// Passes for any message-shaped update that has text.
pub fn any_message_with_text() -> Predicate {
    Predicate::new(|update| update.message().is_some_and(|m| m.text.is_some()))
}

/// Passes for callback queries.
pub fn any_callback_query() -> Predicate {
    update_type(UpdateType::CallbackQuery)
}

/// Passes for callback queries whose originating message is still available.
pub fn any_callback_query_with_message() -> Predicate {
    Predicate::new(|update| update.callback_query().is_some_and(|q| q.message.is_some()))
}

/// Passes for inline queries.
pub fn any_inline_query() -> Predicate {
    update_type(UpdateType::InlineQuery)
}

// ============================================================================
// Chat
// ============================================================================

/// Passes for message-shaped updates from the given chat.
pub fn chat_id(id: i64) -> Predicate {
    Predicate::new(move |update| update.message().is_some_and(|m| m.chat.id == id))
}

/// Passes for message-shaped updates from a private chat.
pub fn private_chat() -> Predicate {
    Predicate::new(|update| {
        update
            .message()
            .is_some_and(|m| m.chat.chat_type == "private")
    })
}

// ============================================================================
// Message text
// ============================================================================

fn message_text(update: &Update) -> Option<&str> {
    update.message().and_then(|m| m.text.as_deref())
}

/// Passes when the message text equals `text`.
pub fn text_equal(text: impl Into<String>) -> Predicate {
    let text = text.into();
    Predicate::new(move |update| message_text(update) == Some(text.as_str()))
}

/// Passes when the message text equals `text`, ignoring case.
pub fn text_equal_fold(text: impl Into<String>) -> Predicate {
    let text = text.into().to_lowercase();
    Predicate::new(move |update| message_text(update).is_some_and(|t| t.to_lowercase() == text))
}

/// Passes when the message text starts with `prefix`.
pub fn text_prefix(prefix: impl Into<String>) -> Predicate {
    let prefix = prefix.into();
    Predicate::new(move |update| message_text(update).is_some_and(|t| t.starts_with(&prefix)))
}

/// Passes when the message text ends with `suffix`.
pub fn text_suffix(suffix: impl Into<String>) -> Predicate {
    let suffix = suffix.into();
    Predicate::new(move |update| message_text(update).is_some_and(|t| t.ends_with(&suffix)))
}

/// Passes when the message text contains `needle`.
pub fn text_contains(needle: impl Into<String>) -> Predicate {
    let needle = needle.into();
    Predicate::new(move |update| message_text(update).is_some_and(|t| t.contains(&needle)))
}

// ============================================================================
// Commands
// ============================================================================

/// A bot command parsed from message text, e.g. `/start@my_bot arg1 arg2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    /// Command name without the leading slash.
    pub name: &'a str,
    /// Bot username the command was addressed to, if any.
    pub mention: Option<&'a str>,
    /// Whitespace-separated arguments.
    pub args: Vec<&'a str>,
}

fn is_command_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parses a bot command from the start of `text`.
///
/// Returns `None` unless the text starts with `/` followed by at least one
/// word character, optionally followed by `@username`.
pub fn parse_command(text: &str) -> Option<Command<'_>> {
    let rest = text.strip_prefix('/')?;
    let (head, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

    let (name, mention) = match head.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (head, None),
    };

    if name.is_empty() || !name.chars().all(is_command_char) {
        return None;
    }
    if let Some(mention) = mention
        && (mention.is_empty() || !mention.chars().all(is_command_char))
    {
        return None;
    }

    Some(Command {
        name,
        mention,
        args: tail.split_whitespace().collect(),
    })
}

fn message_command(update: &Update) -> Option<Command<'_>> {
    message_text(update).and_then(parse_command)
}

/// Passes when the message text is any bot command.
pub fn any_command() -> Predicate {
    Predicate::new(|update| message_command(update).is_some())
}

/// Passes when the message text is the command `name` (case-insensitive).
pub fn command_equal(name: impl Into<String>) -> Predicate {
    let name = name.into();
    Predicate::new(move |update| {
        message_command(update).is_some_and(|c| c.name.eq_ignore_ascii_case(&name))
    })
}

/// Passes when the message text is the command `name` with exactly `argc` arguments.
pub fn command_equal_argc(name: impl Into<String>, argc: usize) -> Predicate {
    let name = name.into();
    Predicate::new(move |update| {
        message_command(update)
            .is_some_and(|c| c.name.eq_ignore_ascii_case(&name) && c.args.len() == argc)
    })
}

/// Passes when the message text is the command `name` with exactly the given arguments.
pub fn command_equal_argv<I, S>(name: impl Into<String>, argv: I) -> Predicate
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let name = name.into();
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    Predicate::new(move |update| {
        message_command(update)
            .is_some_and(|c| c.name.eq_ignore_ascii_case(&name) && c.args == argv)
    })
}

// ============================================================================
// Callback data
// ============================================================================

fn callback_data(update: &Update) -> Option<&str> {
    update.callback_query().and_then(|q| q.data.as_deref())
}

/// Passes when the callback query data equals `data`.
pub fn callback_data_equal(data: impl Into<String>) -> Predicate {
    let data = data.into();
    Predicate::new(move |update| callback_data(update) == Some(data.as_str()))
}

/// Passes when the callback query data starts with `prefix`.
pub fn callback_data_prefix(prefix: impl Into<String>) -> Predicate {
    let prefix = prefix.into();
    Predicate::new(move |update| callback_data(update).is_some_and(|d| d.starts_with(&prefix)))
}

/// Passes when the callback query data contains `needle`.
pub fn callback_data_contains(needle: impl Into<String>) -> Predicate {
    let needle = needle.into();
    Predicate::new(move |update| callback_data(update).is_some_and(|d| d.contains(&needle)))
}

// ============================================================================
// Inline queries
// ============================================================================

fn inline_query_text(update: &Update) -> Option<&str> {
    update.inline_query().map(|q| q.query.as_str())
}

/// Passes when the inline query text equals `query`.
pub fn inline_query_equal(query: impl Into<String>) -> Predicate {
    let query = query.into();
    Predicate::new(move |update| inline_query_text(update) == Some(query.as_str()))
}

/// Passes when the inline query text starts with `prefix`.
pub fn inline_query_prefix(prefix: impl Into<String>) -> Predicate {
    let prefix = prefix.into();
    Predicate::new(move |update| inline_query_text(update).is_some_and(|q| q.starts_with(&prefix)))
}

/// Passes when the inline query text contains `needle`.
pub fn inline_query_contains(needle: impl Into<String>) -> Predicate {
    let needle = needle.into();
    Predicate::new(move |update| inline_query_text(update).is_some_and(|q| q.contains(&needle)))
}
