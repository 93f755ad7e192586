use ledger::LedgerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("expense {expense}: {source}")]
    Expense {
        expense: String,
        #[source]
        source: LedgerError,
    },
    #[error("settlement {index}: {source}")]
    Settlement {
        index: usize,
        #[source]
        source: LedgerError,
    },
    #[error("invalid input: {0}")]
    Input(String),
}

impl AppError {
    /// Machine-readable code, forwarded from the ledger when there is one.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ledger(err)
            | Self::Expense { source: err, .. }
            | Self::Settlement { source: err, .. } => err.code(),
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Json(_) => "INVALID_LEDGER_FILE",
            Self::Input(_) => "INVALID_INPUT",
        }
    }
}
