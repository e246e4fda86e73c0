use std::{env, time::Duration};

use crate::{domain::ChatId, errors::Error, Result};

pub const TOKEN_VAR: &str = "TELEGRAM_NOTIFY_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_NOTIFY_CHAT_ID";
pub const API_BASE_VAR: &str = "TELEGRAM_NOTIFY_API_BASE";
pub const TIMEOUT_VAR: &str = "TELEGRAM_NOTIFY_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery settings. Only resolved once a notification is actually needed.
#[derive(Clone, Debug)]
pub struct Config {
    pub token: String,
    pub chat_id: ChatId,
    pub api_base: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Read the process environment.
    ///
    /// Files in the working directory are never consulted: it belongs to the
    /// wrapped command and may not be trusted with the bot token.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup(TOKEN_VAR)
            .and_then(non_empty)
            .ok_or_else(|| Error::Config("telegram token not defined".to_string()))?;

        let chat_id = lookup(CHAT_ID_VAR)
            .and_then(non_empty)
            .map(|s| ChatId(s.trim().to_string()))
            .ok_or_else(|| Error::Config("telegram chat id not defined".to_string()))?;

        let api_base = lookup(API_BASE_VAR)
            .and_then(non_empty)
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let http_timeout = match lookup(TIMEOUT_VAR).and_then(non_empty) {
            None => DEFAULT_HTTP_TIMEOUT,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    Error::Config(format!("{TIMEOUT_VAR} must be a positive number: {raw}"))
                })?,
        };

        Ok(Self {
            token: token.trim().to_string(),
            chat_id,
            api_base,
            http_timeout,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
