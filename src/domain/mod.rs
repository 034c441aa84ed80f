pub mod account;
pub mod common;
pub mod transaction;

pub use account::{Account, AccountChanges};
pub use common::{Displayable, Identifiable, NamedEntity};
pub use transaction::{AccountTransaction, TransactionChanges, TransactionSign};
