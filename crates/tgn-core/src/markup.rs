//! Telegram text formatting (parse modes and escaping of literal text).

/// Markup dialect used for every outgoing message.
///
/// Chosen at build time; the CLI does not expose it.
pub const DIALECT: MarkupDialect = MarkupDialect::Html;

/// Telegram rejects message texts longer than this (in UTF-16 units after
/// entity parsing). The client does not enforce it; `--limit` keeps stream
/// excerpts well below it.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    '\\',
];

/// A Telegram `parse_mode` and the escaping rules that go with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkupDialect {
    Html,
    MarkdownV2,
}

impl MarkupDialect {
    /// Value of the `parse_mode` request parameter.
    pub fn parse_mode(self) -> &'static str {
        match self {
            MarkupDialect::Html => "HTML",
            MarkupDialect::MarkdownV2 => "MarkdownV2",
        }
    }

    /// Escape arbitrary text so it renders literally.
    pub fn escape(self, text: &str) -> String {
        match self {
            MarkupDialect::Html => escape_html(text),
            MarkupDialect::MarkdownV2 => escape_markdown_v2(text),
        }
    }

    /// Escape text placed inside a code span or pre block.
    pub fn escape_code(self, text: &str) -> String {
        match self {
            MarkupDialect::Html => escape_html(text),
            MarkupDialect::MarkdownV2 => escape_markdown_v2_code(text),
        }
    }

    /// Bold span around already-escaped text.
    pub fn bold(self, escaped: &str) -> String {
        match self {
            MarkupDialect::Html => format!("<b>{escaped}</b>"),
            MarkupDialect::MarkdownV2 => format!("*{escaped}*"),
        }
    }

    /// Inline code span around raw text.
    pub fn code(self, raw: &str) -> String {
        let escaped = self.escape_code(raw);
        match self {
            MarkupDialect::Html => format!("<code>{escaped}</code>"),
            MarkupDialect::MarkdownV2 => format!("`{escaped}`"),
        }
    }

    /// Preformatted block around raw text.
    pub fn pre(self, raw: &str) -> String {
        let escaped = self.escape_code(raw);
        match self {
            MarkupDialect::Html => format!("<pre>{escaped}</pre>"),
            MarkupDialect::MarkdownV2 => format!("```\n{escaped}\n```"),
        }
    }
}

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Backslash-escape every MarkdownV2 control character.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// Inside `code`/`pre` entities only the backtick and backslash are special.
fn escape_markdown_v2_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '`' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
