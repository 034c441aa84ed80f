use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Rejected input at a construction or mutation boundary. Nothing is mutated
/// when one of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("account name must not be empty")]
    EmptyName,
    #[error("transaction title must not be empty")]
    EmptyTitle,
    #[error("account name `{0}` has surrounding whitespace")]
    UntrimmedName(String),
    #[error("transaction title `{0}` has surrounding whitespace")]
    UntrimmedTitle(String),
    #[error("starting balance must be zero or greater, got {0}")]
    NegativeStartingBalance(Decimal),
    #[error("currency code `{0}` must be exactly three letters")]
    InvalidCurrencyCode(String),
    #[error("transaction amount must not be zero")]
    ZeroAmount,
    #[error("transaction magnitude must be greater than zero, got {0}")]
    NonPositiveMagnitude(Decimal),
    #[error("owning account {0} does not exist")]
    UnknownAccount(Uuid),
    #[error("currency `{0}` is not one of the supported base currencies")]
    UnsupportedCurrency(String),
}

/// Referential integrity violations. Fatal to the attempted operation only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("transaction {transaction} references missing account {account}")]
    OrphanedTransaction { transaction: Uuid, account: Uuid },
    #[error("cascade delete of account {account} left {remaining} transaction(s) behind")]
    CascadeIncomplete { account: Uuid, remaining: usize },
}

/// Diagnostic raised when a conversion cannot produce a result. Callers
/// degrade to the unconverted amount.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionWarning {
    #[error("missing FX rate for currency `{0}`")]
    MissingRate(String),
    #[error("converting {amount} {from} to {to} is out of range")]
    Overflow {
        amount: Decimal,
        from: String,
        to: String,
    },
}

/// Commit failure reported by a persistence gateway.
#[derive(Debug, Error)]
pub enum PersistenceFailure {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("commit rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// Error type that captures ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Integrity violation: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("Persistence failed: {0}")]
    Persistence(#[from] PersistenceFailure),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Balance of account {0} is out of range")]
    BalanceOverflow(Uuid),
}

impl LedgerError {
    /// True when the failure came from the storage boundary and retrying the
    /// same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::Persistence(PersistenceFailure::Io(_) | PersistenceFailure::Rejected(_))
        )
    }
}

/// Errors raised while loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}
