use std::fmt;

/// Telegram chat id. Numeric ids and `@channel` names are both accepted, so
/// the value is kept opaque.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub String);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

/// The bot account the token belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_name: String,
}

/// One message to deliver. Built per send and consumed by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub reply_to: Option<MessageId>,
    pub disable_notification: bool,
}

/// Handle to a message the remote side accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: MessageId,
}
