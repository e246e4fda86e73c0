//! Core logic for `tgn`: run a command, capture its output, report the outcome.
//!
//! This crate is transport-agnostic. The Telegram Bot API client lives in
//! `tgn-telegram` and plugs in through the [`notify::Notifier`] port.

pub mod app;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod markup;
pub mod notify;
pub mod report;
pub mod runner;

pub use errors::{Error, Result};
