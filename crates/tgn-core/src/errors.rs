/// Process status used when the wrapper itself fails (launch, config, network).
pub const EXIT_WRAPPER_FAILURE: i32 = 125;

/// Process status used when the invocation is unusable (no command given).
pub const EXIT_USAGE: i32 = 2;

/// Core error type.
///
/// Adapter crates map their library errors into this type so the binary can
/// log one line and pick an exit status without knowing the transport.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to run program: {0}")]
    Launch(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("request failed: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) => EXIT_USAGE,
            _ => EXIT_WRAPPER_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
