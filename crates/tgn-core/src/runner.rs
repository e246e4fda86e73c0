//! Command runner: spawn the wrapped program and tee its output.
//!
//! stdout and stderr are piped, copied live to this process's own streams and
//! captured in memory for the notification.

use std::process::{ExitStatus, Stdio};

use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    process::Command,
};

use crate::{errors::Error, Result};

const PUMP_CHUNK_BYTES: usize = 8 * 1024;

/// Status reported when the platform gives neither an exit code nor a signal.
pub const UNKNOWN_EXIT_STATUS: i32 = 1;

/// Outcome of one wrapped command.
#[derive(Debug)]
pub struct CommandResult {
    pub exit_status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Set only when the program could not be started. Buffers are empty then.
    pub execution_error: Option<Error>,
}

impl CommandResult {
    fn launch_failed(err: Error) -> Self {
        Self {
            exit_status: 0,
            stdout: Vec::new(),
            stderr: Vec::new(),
            execution_error: Some(err),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.execution_error.is_none() && self.exit_status == 0
    }
}

/// Run `argv[0]` with the remaining elements as arguments and wait for it.
///
/// Fails only for an empty `argv`. A program that cannot be started is
/// reported through [`CommandResult::execution_error`].
pub async fn run(argv: &[String]) -> Result<CommandResult> {
    let Some((program, args)) = argv.split_first() else {
        return Err(Error::InvalidArgument("program not defined".to_string()));
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(program = %program, error = %e, "failed to start program");
            return Ok(CommandResult::launch_failed(Error::Launch(format!(
                "{program}: {e}"
            ))));
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Launch("child stdout was not captured".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Launch("child stderr was not captured".to_string()))?;

    // Drain both pipes concurrently so neither can fill up and stall the child.
    let out_pump = tokio::spawn(tee(stdout, tokio::io::stdout()));
    let err_pump = tokio::spawn(tee(stderr, tokio::io::stderr()));

    let status = child.wait().await?;
    let stdout = out_pump.await.map_err(std::io::Error::other)??;
    let stderr = err_pump.await.map_err(std::io::Error::other)??;

    let exit_status = derive_exit_status(status);
    tracing::debug!(
        exit_status,
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "program finished"
    );

    Ok(CommandResult {
        exit_status,
        stdout,
        stderr,
        execution_error: None,
    })
}

/// Map a process outcome to a shell-style status.
///
/// Normal exit gives the exit code. Death by signal N gives `128 + N`.
pub fn derive_exit_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT_STATUS
}

/// Copy `reader` to `console` chunk by chunk and return everything read.
///
/// Console write errors are logged once and ignored; capture continues.
async fn tee<R, W>(mut reader: R, mut console: W) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut buf = vec![0u8; PUMP_CHUNK_BYTES];
    let mut console_open = true;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let chunk = &buf[..n];
        captured.extend_from_slice(chunk);

        if console_open {
            let written: std::io::Result<()> = async {
                console.write_all(chunk).await?;
                console.flush().await
            }
            .await;
            if let Err(e) = written {
                tracing::debug!(error = %e, "console closed; still capturing");
                console_open = false;
            }
        }
    }

    Ok(captured)
}
