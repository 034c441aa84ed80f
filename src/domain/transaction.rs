//! Ledger transactions and the sign/magnitude helpers used by edit forms.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        account::Account,
        common::{trimmed_non_empty, Displayable, Identifiable, NamedEntity},
    },
    errors::ValidationError,
};

pub const DEFAULT_TRANSACTION_IMAGE: &str = "TransactionImage3";

/// A single signed movement of money owned by exactly one account.
///
/// The currency is never stored here; it is always read through the owning
/// account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountTransaction {
    id: Uuid,
    amount: Decimal,
    date: DateTime<Utc>,
    title: String,
    image_name: String,
    account_id: Uuid,
}

impl AccountTransaction {
    /// Creates a new, unpersisted transaction attached to `account`.
    pub fn new(
        amount: Decimal,
        date: DateTime<Utc>,
        title: &str,
        account: &Account,
    ) -> Result<Self, ValidationError> {
        Self::with_id(
            Uuid::new_v4(),
            amount,
            date,
            title,
            DEFAULT_TRANSACTION_IMAGE,
            account.id(),
        )
    }

    pub fn with_id(
        id: Uuid,
        amount: Decimal,
        date: DateTime<Utc>,
        title: &str,
        image_name: impl Into<String>,
        account_id: Uuid,
    ) -> Result<Self, ValidationError> {
        let title = trimmed_non_empty(title).ok_or(ValidationError::EmptyTitle)?;
        ensure_non_zero(amount)?;
        Ok(Self {
            id,
            amount,
            date,
            title,
            image_name: image_name.into(),
            account_id,
        })
    }

    pub fn with_image(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = image_name.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn sign(&self) -> TransactionSign {
        TransactionSign::of(self.amount)
    }

    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if trimmed.len() != self.title.len() {
            return Err(ValidationError::UntrimmedTitle(self.title.clone()));
        }
        ensure_non_zero(self.amount)
    }
}

impl Identifiable for AccountTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for AccountTransaction {
    fn name(&self) -> &str {
        &self.title
    }
}

impl Displayable for AccountTransaction {
    fn display_label(&self) -> String {
        format!("{} {} on {}", self.title, self.amount, self.date.date_naive())
    }
}

fn ensure_non_zero(amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_zero() {
        Err(ValidationError::ZeroAmount)
    } else {
        Ok(())
    }
}

/// Debit/credit toggle paired with an unsigned magnitude at input boundaries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransactionSign {
    Plus,
    #[default]
    Minus,
}

impl TransactionSign {
    pub fn of(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            TransactionSign::Minus
        } else {
            TransactionSign::Plus
        }
    }

    /// Combines a strictly positive magnitude with this sign.
    pub fn apply(self, magnitude: Decimal) -> Result<Decimal, ValidationError> {
        if magnitude <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveMagnitude(magnitude));
        }
        Ok(match self {
            TransactionSign::Plus => magnitude,
            TransactionSign::Minus => -magnitude,
        })
    }
}

impl fmt::Display for TransactionSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionSign::Plus => "+",
            TransactionSign::Minus => "−",
        };
        f.write_str(label)
    }
}

/// Partial update for an [`AccountTransaction`]. The amount is stored exactly
/// as given; build it with [`TransactionSign::apply`] when the caller holds a
/// sign and a magnitude separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionChanges {
    pub amount: Option<Decimal>,
    pub date: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub account_id: Option<Uuid>,
    pub image_name: Option<String>,
}

impl TransactionChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn image_name(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = Some(image_name.into());
        self
    }

    /// Builds the edited transaction without touching `transaction`.
    pub fn apply_to(
        &self,
        transaction: &AccountTransaction,
    ) -> Result<AccountTransaction, ValidationError> {
        AccountTransaction::with_id(
            transaction.id,
            self.amount.unwrap_or(transaction.amount),
            self.date.unwrap_or(transaction.date),
            self.title.as_deref().unwrap_or(&transaction.title),
            self.image_name
                .clone()
                .unwrap_or_else(|| transaction.image_name.clone()),
            self.account_id.unwrap_or(transaction.account_id),
        )
    }

    pub fn is_noop(&self, transaction: &AccountTransaction) -> bool {
        match self.apply_to(transaction) {
            Ok(updated) => &updated == transaction,
            Err(_) => false,
        }
    }
}
