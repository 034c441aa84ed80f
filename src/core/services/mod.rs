pub mod account_service;
pub mod summary_service;
pub mod transaction_service;

pub use account_service::AccountService;
pub use summary_service::{AccountBalance, SummaryService, WealthSummary};
pub use transaction_service::TransactionService;

pub type ServiceResult<T> = crate::errors::Result<T>;
