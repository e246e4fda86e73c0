//! Telegram adapter (Bot API over HTTPS).
//!
//! Implements the `tgn-core` notifier port with two Bot API methods:
//! `getMe` to resolve the bot identity and `sendMessage` to deliver text.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};

use tgn_core::{
    app::Connector,
    config::Config,
    domain::{BotIdentity, ChatId, MessageId, OutgoingMessage, SentMessage},
    errors::Error,
    markup::{MarkupDialect, DIALECT},
    notify::Notifier,
    Result,
};

/// Response wrapper shared by every Bot API method.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    ok: bool,
    description: Option<String>,
    error_code: Option<i64>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct User {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
}

#[derive(Clone, Debug)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
    dialect: MarkupDialect,
    identity: BotIdentity,
}

impl TelegramClient {
    /// Connect using a resolved configuration.
    pub async fn connect_with(cfg: &Config) -> Result<Self> {
        Self::connect_to(&cfg.api_base, cfg.token.clone(), cfg.http_timeout).await
    }

    /// Connect to `api_base` and resolve the bot identity with `getMe`.
    ///
    /// A failed round trip is an authentication failure; a rejected request or
    /// a bot without a user name is a protocol failure.
    pub async fn connect_to(
        api_base: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Transport(format!("http client build failed: {e}")))?;

        let mut client = Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
            dialect: DIALECT,
            identity: BotIdentity {
                user_name: String::new(),
            },
        };

        let me: User = client
            .request("getMe", &[])
            .await
            .map_err(|e| match e {
                Error::Transport(msg) => Error::Authentication(msg),
                other => other,
            })?;

        let user_name = me
            .username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Protocol("telegram: failed to find bot username".to_string()))?;

        client.identity = BotIdentity { user_name };
        Ok(client)
    }

    pub fn user_name(&self) -> &str {
        &self.identity.user_name
    }

    /// `sendMessage`. Returns the id Telegram assigned to the new message.
    pub async fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        disable_notification: bool,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId> {
        let mut params = vec![
            ("chat_id", chat_id.0.clone()),
            ("text", text.to_string()),
            ("parse_mode", self.dialect.parse_mode().to_string()),
        ];
        if disable_notification {
            params.push(("disable_notification", "true".to_string()));
        }
        if let Some(id) = reply_to {
            params.push(("reply_to_message_id", id.0.to_string()));
        }

        let msg: Message = self.request("sendMessage", &params).await?;
        Ok(MessageId(msg.message_id))
    }

    /// POST a form to `method` and unwrap the envelope into `T`.
    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);

        let resp = self
            .http
            .post(url)
            .form(params)
            .send()
            .await
            .map_err(|e| Self::map_err(method, e))?;

        let envelope: Envelope<T> = resp.json().await.map_err(|e| Self::map_err(method, e))?;

        if !envelope.ok {
            tracing::debug!(method, error_code = ?envelope.error_code, "telegram rejected request");
            let msg = match envelope.description.filter(|d| !d.is_empty()) {
                Some(desc) => format!("telegram: {desc}"),
                None => "telegram: request failed".to_string(),
            };
            return Err(Error::Protocol(msg));
        }

        envelope
            .result
            .ok_or_else(|| Error::Protocol(format!("telegram: {method} returned no result")))
    }

    // reqwest errors carry the request URL, which embeds the bot token.
    fn map_err(method: &str, e: reqwest::Error) -> Error {
        Error::Transport(format!("telegram {method}: {}", e.without_url()))
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    async fn send(&self, message: OutgoingMessage) -> Result<SentMessage> {
        let message_id = self
            .send_message(
                &message.chat_id,
                &message.text,
                message.disable_notification,
                message.reply_to,
            )
            .await?;
        Ok(SentMessage { message_id })
    }
}

/// Connects [`TelegramClient`]s for the application flow.
#[derive(Clone, Copy, Debug, Default)]
pub struct TelegramConnector;

#[async_trait]
impl Connector for TelegramConnector {
    async fn connect(&self, cfg: &Config) -> Result<Arc<dyn Notifier>> {
        let client = TelegramClient::connect_with(cfg).await?;
        Ok(Arc::new(client))
    }
}
