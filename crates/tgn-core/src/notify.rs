//! Notifier port and the reply-chained delivery sequence.

use async_trait::async_trait;

use crate::{
    domain::{BotIdentity, ChatId, MessageId, OutgoingMessage, SentMessage},
    report::Report,
    Result,
};

/// Outbound messaging port.
///
/// The Telegram client implements this; tests use an in-memory double.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Identity resolved when the notifier connected.
    fn identity(&self) -> &BotIdentity;

    async fn send(&self, message: OutgoingMessage) -> Result<SentMessage>;
}

/// Ids assigned to the delivered messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub summary: MessageId,
    pub replies: Vec<MessageId>,
}

/// Send the summary, then each stream as a reply to it.
///
/// Stops at the first failed send; no stream is sent without a summary.
pub async fn deliver(notifier: &dyn Notifier, chat_id: &ChatId, report: &Report) -> Result<Delivery> {
    tracing::debug!(bot = %notifier.identity().user_name, "delivering report");

    let summary = notifier
        .send(OutgoingMessage {
            chat_id: chat_id.clone(),
            text: report.summary.clone(),
            reply_to: None,
            disable_notification: report.disable_notification,
        })
        .await?;
    tracing::debug!(message_id = summary.message_id.0, "summary sent");

    let mut replies = Vec::with_capacity(report.streams.len());
    for stream in &report.streams {
        let sent = notifier
            .send(OutgoingMessage {
                chat_id: chat_id.clone(),
                text: stream.text.clone(),
                reply_to: Some(summary.message_id),
                disable_notification: report.disable_notification,
            })
            .await?;
        tracing::debug!(stream = stream.name, message_id = sent.message_id.0, "stream sent");
        replies.push(sent.message_id);
    }

    tracing::debug!(replies = replies.len(), "delivery complete");

    Ok(Delivery {
        summary: summary.message_id,
        replies,
    })
}
