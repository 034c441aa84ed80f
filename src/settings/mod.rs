//! Session-wide display preferences.

use std::fmt;

use crate::{config::Config, currency::Currency};

/// Handle returned by [`Settings::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Currency) + Send>;

/// Holds the preferred base currency for totals.
///
/// Writes are plain assignments visible to the next read. Subscribers are
/// called synchronously, in subscription order, whenever the value changes.
#[derive(Default)]
pub struct Settings {
    base_currency: Currency,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_currency(base_currency: Currency) -> Self {
        Self {
            base_currency,
            ..Self::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_base_currency(config.base_currency)
    }

    pub fn base_currency(&self) -> Currency {
        self.base_currency
    }

    pub fn set_base_currency(&mut self, currency: Currency) {
        if self.base_currency == currency {
            return;
        }
        tracing::info!(from = %self.base_currency, to = %currency, "base currency changed");
        self.base_currency = currency;
        for (_, listener) in self.listeners.iter_mut() {
            listener(currency);
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(Currency) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Copies the session value back into `config` for persistence.
    pub fn store_into(&self, config: &mut Config) {
        config.base_currency = self.base_currency;
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("base_currency", &self.base_currency)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
