//! Notification texts for one finished command.

use std::time::Duration;

use crate::{markup::MarkupDialect, runner::CommandResult};

/// Marker placed in front of a stream excerpt that lost its head.
pub const TRUNCATION_MARKER: &str = "...";

/// Default `--limit`: bytes of each stream included in a notification.
pub const DEFAULT_STREAM_LIMIT: usize = 1024;

/// What kind of run is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    CommandError,
}

impl Outcome {
    fn headline(self) -> &'static str {
        match self {
            Outcome::Success => "Success",
            Outcome::Failure => "Failure",
            Outcome::CommandError => "Command error",
        }
    }
}

/// A captured stream rendered as a reply message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamMessage {
    pub name: &'static str,
    pub text: String,
}

/// The full set of texts for one run: a summary and its stream replies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub outcome: Outcome,
    pub summary: String,
    pub streams: Vec<StreamMessage>,
    /// Deliver silently. Only successful runs reported via `--success` are quiet.
    pub disable_notification: bool,
}

/// Inputs that shape the report besides the command result itself.
#[derive(Clone, Debug)]
pub struct ReportOptions<'a> {
    pub label: &'a str,
    pub argv: &'a [String],
    pub elapsed: Duration,
    pub stream_limit: usize,
    pub notify_on_success: bool,
}

/// Build the report for `result` in the given markup dialect.
pub fn build(dialect: MarkupDialect, opts: &ReportOptions<'_>, result: &CommandResult) -> Report {
    let outcome = match (&result.execution_error, result.exit_status) {
        (Some(_), _) => Outcome::CommandError,
        (None, 0) => Outcome::Success,
        (None, _) => Outcome::Failure,
    };

    let mut summary = String::new();
    if !opts.label.is_empty() {
        summary.push_str(&dialect.bold(&dialect.escape(&format!("{}:", opts.label))));
        summary.push(' ');
    }
    summary.push_str(&dialect.escape(outcome.headline()));
    summary.push_str("\n\n");
    summary.push_str(&field(dialect, "Command", &dialect.code(&format!("{:?}", opts.argv))));
    summary.push_str(&field(
        dialect,
        "Elapsed time",
        &dialect.escape(&format!("{:?}", opts.elapsed)),
    ));

    if let Some(err) = &result.execution_error {
        summary.push_str(&dialect.pre(&err.to_string()));
        return Report {
            outcome,
            summary,
            streams: Vec::new(),
            disable_notification: false,
        };
    }

    summary.push_str(&field(
        dialect,
        "Exit status",
        &dialect.escape(&result.exit_status.to_string()),
    ));

    let streams: Vec<StreamMessage> = [("stdout", &result.stdout), ("stderr", &result.stderr)]
        .into_iter()
        .filter(|(_, bytes)| !bytes.is_empty())
        .map(|(name, bytes)| StreamMessage {
            name,
            text: stream_text(dialect, name, bytes, opts.stream_limit),
        })
        .collect();

    if !streams.is_empty() {
        let names = streams.iter().map(|s| s.name).collect::<Vec<_>>().join(", ");
        summary.push_str(&field(dialect, "Streams", &dialect.escape(&names)));
    }

    Report {
        outcome,
        summary,
        streams,
        disable_notification: opts.notify_on_success && outcome == Outcome::Success,
    }
}

/// Keep at most the last `limit` bytes of `bytes`, marking the cut.
///
/// Invalid UTF-8 (including a character split by the cut) is replaced with
/// U+FFFD.
pub fn tail_excerpt(bytes: &[u8], limit: usize) -> String {
    if bytes.len() > limit {
        let tail = &bytes[bytes.len() - limit..];
        return format!("{TRUNCATION_MARKER}{}", String::from_utf8_lossy(tail));
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn stream_text(dialect: MarkupDialect, name: &str, bytes: &[u8], limit: usize) -> String {
    format!(
        "{}\n{}",
        dialect.bold(&dialect.escape(&format!("{name}:"))),
        dialect.pre(&tail_excerpt(bytes, limit))
    )
}

fn field(dialect: MarkupDialect, name: &str, value: &str) -> String {
    format!(
        "{} {value}\n",
        dialect.bold(&dialect.escape(&format!("{name}:")))
    )
}
