//! Event payload types.
//!
//! These mirror the objects the Bot API delivers inside an update. Only the
//! fields routing and typical handlers rely on are modelled; unknown fields in
//! the JSON are ignored on decode.

use serde::{Deserialize, Serialize};

/// A user or bot account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: i64,
    /// Whether this account is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username, without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// A chat: private, group, supergroup or channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier.
    pub id: i64,
    /// Chat type ("private", "group", "supergroup", "channel").
    #[serde(rename = "type", default)]
    pub chat_type: String,
    /// Title, for groups and channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Username, for private chats and public groups/channels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A special span inside a message text (command, mention, link, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Entity type, e.g. "bot_command" or "mention".
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Offset in UTF-16 code units.
    pub offset: i64,
    /// Length in UTF-16 code units.
    pub length: i64,
}

/// A message, edited message, channel post or edited channel post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier unique inside the chat.
    pub message_id: i64,
    /// Sender, empty for channel posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// Unix time the message was sent.
    #[serde(default)]
    pub date: i64,
    /// Conversation the message belongs to.
    #[serde(default)]
    pub chat: Chat,
    /// Text, for text messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Special entities in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    /// Caption, for media messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Unix time the message was last edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<i64>,
}

impl Message {
    /// Returns the message text, or an empty string for non-text messages.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// An incoming inline query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineQuery {
    /// Unique identifier.
    pub id: String,
    /// Sender.
    #[serde(default)]
    pub from: User,
    /// Text of the query.
    #[serde(default)]
    pub query: String,
    /// Offset of the results to be returned.
    #[serde(default)]
    pub offset: String,
    /// Type of the chat the query was sent from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
}

/// An inline result chosen by a user and sent to their chat partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChosenInlineResult {
    /// Identifier of the chosen result.
    pub result_id: String,
    /// The user that chose the result.
    #[serde(default)]
    pub from: User,
    /// Identifier of the sent inline message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    /// The query that was used to obtain the result.
    #[serde(default)]
    pub query: String,
}

/// An incoming callback query from an inline keyboard button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Unique identifier.
    pub id: String,
    /// Sender.
    #[serde(default)]
    pub from: User,
    /// Message the button was attached to, if still available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<Message>>,
    /// Identifier of the inline message the button was attached to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    /// Global identifier of the chat the message was sent to.
    #[serde(default)]
    pub chat_instance: String,
    /// Data associated with the button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl CallbackQuery {
    /// Returns the button data, or an empty string when absent.
    pub fn data(&self) -> &str {
        self.data.as_deref().unwrap_or_default()
    }
}

/// A shipping address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Two-letter ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// State, if applicable.
    #[serde(default)]
    pub state: String,
    /// City.
    pub city: String,
    /// First line of the address.
    pub street_line1: String,
    /// Second line of the address.
    #[serde(default)]
    pub street_line2: String,
    /// Post code.
    pub post_code: String,
}

/// Order information supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderInfo {
    /// User name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Shipping address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

/// An incoming shipping query (flexible-price invoices only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuery {
    /// Unique identifier.
    pub id: String,
    /// Sender.
    #[serde(default)]
    pub from: User,
    /// Payload specified by the bot.
    #[serde(default)]
    pub invoice_payload: String,
    /// User-specified shipping address.
    #[serde(default)]
    pub shipping_address: ShippingAddress,
}

/// An incoming pre-checkout query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    /// Unique identifier.
    pub id: String,
    /// Sender.
    #[serde(default)]
    pub from: User,
    /// Three-letter ISO 4217 currency code.
    #[serde(default)]
    pub currency: String,
    /// Total price in the smallest units of the currency.
    #[serde(default)]
    pub total_amount: i64,
    /// Payload specified by the bot.
    #[serde(default)]
    pub invoice_payload: String,
    /// Identifier of the shipping option chosen by the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_option_id: Option<String>,
    /// Order information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_info: Option<OrderInfo>,
}

/// One answer option in a poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollOption {
    /// Option text.
    pub text: String,
    /// Number of users that voted for this option.
    #[serde(default)]
    pub voter_count: i64,
}

/// A poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    /// Unique identifier.
    pub id: String,
    /// Poll question.
    #[serde(default)]
    pub question: String,
    /// List of poll options.
    #[serde(default)]
    pub options: Vec<PollOption>,
    /// Total number of users that voted.
    #[serde(default)]
    pub total_voter_count: i64,
    /// Whether the poll is closed.
    #[serde(default)]
    pub is_closed: bool,
    /// Whether the poll is anonymous.
    #[serde(default)]
    pub is_anonymous: bool,
    /// Poll type ("regular" or "quiz").
    #[serde(rename = "type", default)]
    pub poll_type: String,
}

/// An answer of a user in a non-anonymous poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PollAnswer {
    /// Poll identifier.
    pub poll_id: String,
    /// The user that changed the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Zero-based indices of the chosen options; empty if the vote was retracted.
    #[serde(default)]
    pub option_ids: Vec<i64>,
}

/// Information about one member of a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    /// Member status ("creator", "administrator", "member", "restricted", "left", "kicked").
    #[serde(default)]
    pub status: String,
    /// Information about the user.
    #[serde(default)]
    pub user: User,
}

/// A change in the status of a chat member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    /// Chat the user belongs to.
    #[serde(default)]
    pub chat: Chat,
    /// Performer of the action that resulted in the change.
    #[serde(default)]
    pub from: User,
    /// Unix time the change was done.
    #[serde(default)]
    pub date: i64,
    /// Previous information about the member.
    #[serde(default)]
    pub old_chat_member: ChatMember,
    /// New information about the member.
    #[serde(default)]
    pub new_chat_member: ChatMember,
}

/// A request to join a chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatJoinRequest {
    /// Chat the request was sent to.
    #[serde(default)]
    pub chat: Chat,
    /// User that sent the request.
    #[serde(default)]
    pub from: User,
    /// Unix time the request was sent.
    #[serde(default)]
    pub date: i64,
    /// Bio of the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}
