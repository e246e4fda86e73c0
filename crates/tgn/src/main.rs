use clap::Parser;

use tgn_core::{
    app::{self, RunOptions},
    config::Config,
    report::DEFAULT_STREAM_LIMIT,
};
use tgn_telegram::TelegramConnector;

/// Run a command and report its outcome to a Telegram chat.
///
/// Reads TELEGRAM_NOTIFY_TOKEN and TELEGRAM_NOTIFY_CHAT_ID when a
/// notification has to be sent.
#[derive(Parser, Debug)]
#[command(name = "tgn", version, about)]
struct Cli {
    /// Notification origin identifier (e.g. machine hostname)
    #[arg(long, default_value = "")]
    id: String,

    /// Send a notification even if the command succeeds
    #[arg(long)]
    success: bool,

    /// Limit size of stream data (in bytes) to send in notifications
    #[arg(long, default_value_t = DEFAULT_STREAM_LIMIT)]
    limit: usize,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<String>,
}

impl From<Cli> for RunOptions {
    fn from(cli: Cli) -> Self {
        Self {
            argv: cli.command,
            label: cli.id,
            notify_on_success: cli.success,
            stream_limit: cli.limit,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = tgn_core::logging::init("tgn") {
        eprintln!("tgn: {e}");
    }

    let opts = RunOptions::from(Cli::parse());
    tracing::debug!(argv = ?opts.argv, "starting");

    let status = app::execute(&opts, Config::load, &TelegramConnector).await;
    std::process::exit(status);
}
