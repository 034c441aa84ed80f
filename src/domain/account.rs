use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    currency::CurrencyCode,
    domain::{
        common::{trimmed_non_empty, Displayable, Identifiable, NamedEntity},
        transaction::AccountTransaction,
    },
    errors::ValidationError,
};

pub const DEFAULT_ACCOUNT_IMAGE: &str = "AccountImage1";

/// A financial account tracked within the ledger.
///
/// Fields are only reachable through validated constructors and [`AccountChanges`],
/// so a live `Account` always has a trimmed non-empty name, a three letter
/// currency code and a non-negative starting balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    id: Uuid,
    name: String,
    currency_code: CurrencyCode,
    starting_balance: Decimal,
    image_name: String,
}

impl Account {
    /// Creates a new, unpersisted account.
    pub fn new(
        name: &str,
        currency_code: &str,
        starting_balance: Decimal,
        image_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::with_id(Uuid::new_v4(), name, currency_code, starting_balance, image_name)
    }

    pub fn with_id(
        id: Uuid,
        name: &str,
        currency_code: &str,
        starting_balance: Decimal,
        image_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = trimmed_non_empty(name).ok_or(ValidationError::EmptyName)?;
        ensure_starting_balance(starting_balance)?;
        let currency_code = CurrencyCode::parse(currency_code)?;
        Ok(Self {
            id,
            name,
            currency_code,
            starting_balance,
            image_name: image_name.into(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn currency_code(&self) -> &CurrencyCode {
        &self.currency_code
    }

    pub fn starting_balance(&self) -> Decimal {
        self.starting_balance
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// Starting balance plus the amounts of every transaction this account owns,
    /// or `None` when the sum leaves the `Decimal` range.
    ///
    /// Transactions owned by other accounts are ignored, so the whole ledger can
    /// be passed in.
    pub fn current_balance<'a, I>(&self, transactions: I) -> Option<Decimal>
    where
        I: IntoIterator<Item = &'a AccountTransaction>,
    {
        transactions
            .into_iter()
            .filter(|txn| txn.account_id() == self.id)
            .try_fold(self.starting_balance, |balance, txn| {
                balance.checked_add(txn.amount())
            })
    }

    /// Re-checks the invariants, used when entities come back from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if trimmed.len() != self.name.len() {
            return Err(ValidationError::UntrimmedName(self.name.clone()));
        }
        ensure_starting_balance(self.starting_balance)?;
        CurrencyCode::parse(self.currency_code.as_str())?;
        Ok(())
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Account {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Account {
    fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.currency_code)
    }
}

fn ensure_starting_balance(balance: Decimal) -> Result<(), ValidationError> {
    if balance.is_sign_negative() && !balance.is_zero() {
        Err(ValidationError::NegativeStartingBalance(balance))
    } else {
        Ok(())
    }
}

/// Partial update for an [`Account`]. Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub currency_code: Option<String>,
    pub starting_balance: Option<Decimal>,
    pub image_name: Option<String>,
}

impl AccountChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }

    pub fn starting_balance(mut self, balance: Decimal) -> Self {
        self.starting_balance = Some(balance);
        self
    }

    pub fn image_name(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = Some(image_name.into());
        self
    }

    /// Builds the edited account without touching `account`. Fails with the
    /// same rules as [`Account::new`].
    pub fn apply_to(&self, account: &Account) -> Result<Account, ValidationError> {
        Account::with_id(
            account.id,
            self.name.as_deref().unwrap_or(&account.name),
            self.currency_code
                .as_deref()
                .unwrap_or(account.currency_code.as_str()),
            self.starting_balance.unwrap_or(account.starting_balance),
            self.image_name
                .clone()
                .unwrap_or_else(|| account.image_name.clone()),
        )
    }

    /// Whether applying these changes alters the currency or starting balance,
    /// which makes existing transactions read differently. Callers gate such
    /// edits behind a confirmation when the account already has transactions.
    pub fn rewrites_history(&self, account: &Account) -> bool {
        let currency_changed = self
            .currency_code
            .as_deref()
            .map(|code| !code.eq_ignore_ascii_case(account.currency_code.as_str()))
            .unwrap_or(false);
        let balance_changed = self
            .starting_balance
            .map(|balance| balance != account.starting_balance)
            .unwrap_or(false);
        currency_changed || balance_changed
    }

    pub fn is_noop(&self, account: &Account) -> bool {
        match self.apply_to(account) {
            Ok(updated) => &updated == account,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn checking() -> Account {
        Account::new("Checking", "GBP", dec!(100), DEFAULT_ACCOUNT_IMAGE).unwrap()
    }

    #[test]
    fn new_trims_name_and_uppercases_code() {
        let account = Account::new("  Savings \n", "eur", dec!(0), "img").unwrap();
        assert_eq!(account.name(), "Savings");
        assert_eq!(account.currency_code().as_str(), "EUR");
        assert_eq!(account.starting_balance(), dec!(0));
    }

    #[test]
    fn new_rejects_invalid_input() {
        assert_eq!(
            Account::new("   ", "GBP", dec!(1), "img"),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            Account::new("Cash", "GBP", dec!(-1), "img"),
            Err(ValidationError::NegativeStartingBalance(dec!(-1)))
        );
        assert_eq!(
            Account::new("Cash", "GB", dec!(1), "img"),
            Err(ValidationError::InvalidCurrencyCode("GB".into()))
        );
    }

    #[test]
    fn balance_without_transactions_is_starting_balance() {
        let account = checking();
        assert_eq!(account.current_balance(std::iter::empty()), Some(dec!(100)));
    }

    #[test]
    fn balance_ignores_foreign_transactions() {
        let account = checking();
        let other = Account::new("Other", "USD", dec!(0), "img").unwrap();
        let own = AccountTransaction::new(dec!(-40), Utc::now(), "Rent", &account).unwrap();
        let foreign = AccountTransaction::new(dec!(500), Utc::now(), "Pay", &other).unwrap();

        assert_eq!(account.current_balance([&own, &foreign]), Some(dec!(60)));
    }

    #[test]
    fn balance_out_of_range_is_none() {
        let account = Account::new("Vault", "GBP", Decimal::MAX, "img").unwrap();
        let deposit = AccountTransaction::new(dec!(1), Utc::now(), "Top up", &account).unwrap();
        let withdrawal = AccountTransaction::new(dec!(-1), Utc::now(), "Fee", &account).unwrap();

        assert_eq!(account.current_balance([&deposit]), None);
        assert_eq!(
            account.current_balance([&withdrawal]),
            Some(Decimal::MAX - dec!(1))
        );
    }

    #[test]
    fn validate_rejects_stored_untrimmed_name() {
        let json = r#"{
            "id": "16fd2706-8baf-433b-82eb-8c7fada847da",
            "name": "  X ",
            "currency_code": "GBP",
            "starting_balance": "1",
            "image_name": "img"
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(
            account.validate(),
            Err(ValidationError::UntrimmedName("  X ".into()))
        );
        assert_eq!(checking().validate(), Ok(()));
    }

    #[test]
    fn changes_apply_all_or_nothing() {
        let account = checking();
        let changes = AccountChanges::new().name("Main").starting_balance(dec!(-5));

        assert_eq!(
            changes.apply_to(&account),
            Err(ValidationError::NegativeStartingBalance(dec!(-5)))
        );
        assert_eq!(account.name(), "Checking");
    }

    #[test]
    fn rewrites_history_flags_currency_and_balance() {
        let account = checking();
        assert!(!AccountChanges::new().name("Renamed").rewrites_history(&account));
        assert!(!AccountChanges::new().currency_code("gbp").rewrites_history(&account));
        assert!(AccountChanges::new().currency_code("USD").rewrites_history(&account));
        assert!(AccountChanges::new()
            .starting_balance(dec!(50))
            .rewrites_history(&account));
    }

    #[test]
    fn noop_detection_normalises_input() {
        let account = checking();
        assert!(AccountChanges::new().name(" Checking ").is_noop(&account));
        assert!(!AccountChanges::new().name("Current").is_noop(&account));
    }
}
