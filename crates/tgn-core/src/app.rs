//! One wrapper invocation: run, decide, notify, pick the exit status.

use std::{sync::Arc, time::Instant};

use async_trait::async_trait;

use crate::{
    config::Config,
    markup::DIALECT,
    notify::{deliver, Notifier},
    report::{self, ReportOptions, DEFAULT_STREAM_LIMIT},
    runner, Result,
};

/// Parsed command line.
#[derive(Clone, Debug)]
pub struct RunOptions {
    pub argv: Vec<String>,
    /// Origin label shown in front of the summary (e.g. hostname).
    pub label: String,
    pub notify_on_success: bool,
    pub stream_limit: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            argv: Vec::new(),
            label: String::new(),
            notify_on_success: false,
            stream_limit: DEFAULT_STREAM_LIMIT,
        }
    }
}

/// Opens a notifier for a resolved configuration.
///
/// Connecting includes the identity lookup, so a returned notifier is ready
/// to send.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, cfg: &Config) -> Result<Arc<dyn Notifier>>;
}

/// Run the wrapped command and report it. Returns the process exit status.
///
/// Configuration is resolved lazily: a run that needs no notification never
/// calls `load_config` or the connector.
pub async fn execute<F>(opts: &RunOptions, load_config: F, connector: &dyn Connector) -> i32
where
    F: FnOnce() -> Result<Config>,
{
    match try_execute(opts, load_config, connector).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!("error: {e}");
            e.exit_code()
        }
    }
}

async fn try_execute<F>(opts: &RunOptions, load_config: F, connector: &dyn Connector) -> Result<i32>
where
    F: FnOnce() -> Result<Config>,
{
    let started = Instant::now();
    let result = runner::run(&opts.argv).await?;
    let elapsed = started.elapsed();

    if result.succeeded() && !opts.notify_on_success {
        return Ok(result.exit_status);
    }

    let cfg = load_config()?;

    tracing::debug!(chat_id = %cfg.chat_id, "connecting");
    let notifier = connector.connect(&cfg).await?;
    tracing::info!("sending notification as {}", notifier.identity().user_name);

    let report = report::build(
        DIALECT,
        &ReportOptions {
            label: &opts.label,
            argv: &opts.argv,
            elapsed,
            stream_limit: opts.stream_limit,
            notify_on_success: opts.notify_on_success,
        },
        &result,
    );
    deliver(notifier.as_ref(), &cfg.chat_id, &report).await?;

    // The launch failure was reported; now it is this run's failure.
    if let Some(err) = result.execution_error {
        return Err(err);
    }

    Ok(result.exit_status)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::{
        domain::ChatId,
        errors::{Error, EXIT_USAGE, EXIT_WRAPPER_FAILURE},
        notify::testing::RecordingNotifier,
    };

    struct FakeConnector {
        notifier: Arc<RecordingNotifier>,
        connects: AtomicUsize,
    }

    impl FakeConnector {
        fn new(notifier: RecordingNotifier) -> Self {
            Self {
                notifier: Arc::new(notifier),
                connects: AtomicUsize::new(0),
            }
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn connect(&self, _cfg: &Config) -> Result<Arc<dyn Notifier>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(self.notifier.clone())
        }
    }

    fn config() -> Result<Config> {
        Ok(Config {
            token: "t".to_string(),
            chat_id: ChatId("42".to_string()),
            api_base: "http://unused".to_string(),
            http_timeout: std::time::Duration::from_secs(1),
        })
    }

    fn opts(argv: &[&str], on_success: bool) -> RunOptions {
        RunOptions {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            notify_on_success: on_success,
            ..RunOptions::default()
        }
    }

    #[tokio::test]
    async fn empty_command_is_a_usage_error() {
        let c = FakeConnector::new(RecordingNotifier::new());
        assert_eq!(execute(&opts(&[], true), config, &c).await, EXIT_USAGE);
        assert_eq!(c.connects(), 0);
    }

    #[tokio::test]
    async fn missing_program_is_reported_then_fails_the_wrapper() {
        let c = FakeConnector::new(RecordingNotifier::new());
        let status = execute(&opts(&["/nonexistent/tgn-app-test"], false), config, &c).await;
        assert_eq!(status, EXIT_WRAPPER_FAILURE);

        let sent = c.notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.contains("Command error"));
        assert!(!sent[0].disable_notification);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_without_flag_stays_offline() {
        let c = FakeConnector::new(RecordingNotifier::new());
        let status = execute(
            &opts(&["true"], false),
            || -> Result<Config> { panic!("config must not be read") },
            &c,
        )
        .await;
        assert_eq!(status, 0);
        assert_eq!(c.connects(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_sends_one_loud_summary() {
        let c = FakeConnector::new(RecordingNotifier::new());
        let status = execute(&opts(&["false"], false), config, &c).await;
        assert_eq!(status, 1);

        let sent = c.notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].text.starts_with("Failure"));
        assert!(sent[0].text.contains("<b>Exit status:</b> 1"));
        assert!(!sent[0].disable_notification);
        assert_eq!(sent[0].reply_to, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn success_flag_sends_quiet_summary_and_stdout_reply() {
        let c = FakeConnector::new(RecordingNotifier::new());
        let status = execute(&opts(&["echo", "hi"], true), config, &c).await;
        assert_eq!(status, 0);

        let sent = c.notifier.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].text.starts_with("Success"));
        assert!(sent.iter().all(|m| m.disable_notification));
        assert_eq!(sent[1].reply_to, Some(crate::domain::MessageId(101)));
        assert!(sent[1].text.contains("stdout"));
        assert!(sent[1].text.contains("hi"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn config_error_fails_before_connecting() {
        let c = FakeConnector::new(RecordingNotifier::new());
        let status = execute(
            &opts(&["false"], false),
            || Err(Error::Config("telegram token not defined".to_string())),
            &c,
        )
        .await;
        assert_eq!(status, EXIT_WRAPPER_FAILURE);
        assert_eq!(c.connects(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn summary_failure_overrides_command_status() {
        let c = FakeConnector::new(RecordingNotifier::failing_at(0));
        let status = execute(&opts(&["sh", "-c", "echo out; exit 3"], false), config, &c).await;
        assert_eq!(status, EXIT_WRAPPER_FAILURE);
        assert!(c.notifier.messages().is_empty());
    }
}
