use std::path::Path;

use crate::{
    config::{Config, ConfigManager},
    core::services::{SummaryService, WealthSummary},
    currency::FxTable,
    domain::AccountTransaction,
    errors::{ConfigError, LedgerError},
    filter::TransactionFilter,
    ledger::Ledger,
    settings::Settings,
    storage::{JsonGateway, MemoryGateway, PersistenceGateway},
};

/// Facade that coordinates ledger state, the display preferences of the
/// current session and the configuration they were loaded from.
pub struct LedgerManager<G: PersistenceGateway = JsonGateway> {
    pub ledger: Ledger<G>,
    pub settings: Settings,
    pub filter: TransactionFilter,
    fx: &'static FxTable,
    config: Config,
}

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LedgerManager<JsonGateway> {
    /// Loads the config at `config_manager` and opens the ledger file it names.
    pub fn open(config_manager: &ConfigManager) -> Result<Self, ManagerError> {
        let config = config_manager.load()?;
        let gateway = JsonGateway::open(config.resolve_ledger_file()).map_err(LedgerError::from)?;
        tracing::info!(path = %gateway.path().display(), "ledger opened");
        Ok(Self::with_gateway(gateway, config))
    }

    /// Opens a ledger stored under `dir`, using default preferences.
    pub fn open_in_dir(dir: &Path) -> Result<Self, ManagerError> {
        let config = Config {
            data_dir: Some(dir.to_path_buf()),
            ..Config::default()
        };
        let gateway = JsonGateway::in_dir(dir).map_err(LedgerError::from)?;
        Ok(Self::with_gateway(gateway, config))
    }
}

impl LedgerManager<MemoryGateway> {
    pub fn in_memory() -> Self {
        Self::with_gateway(MemoryGateway::new(), Config::default())
    }
}

impl<G: PersistenceGateway> LedgerManager<G> {
    pub fn with_gateway(gateway: G, config: Config) -> Self {
        Self {
            ledger: Ledger::new(gateway),
            settings: Settings::from_config(&config),
            filter: TransactionFilter::new(),
            fx: FxTable::standard(),
            config,
        }
    }

    pub fn fx(&self) -> &FxTable {
        self.fx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Total wealth in the session's current base currency.
    pub fn total_wealth(&self) -> WealthSummary {
        SummaryService::total_wealth(&self.ledger, self.fx, self.settings.base_currency())
    }

    /// Transactions passing the session filter, newest first.
    pub fn visible_transactions(&self) -> Vec<AccountTransaction> {
        self.ledger.filtered_transactions(&self.filter)
    }

    /// Newest transactions, capped by the configured limit.
    pub fn recent_transactions(&self) -> Vec<AccountTransaction> {
        SummaryService::recent_transactions(&self.ledger, self.config.recent_transaction_limit)
    }

    /// Writes the session's preferences back through `config_manager`.
    pub fn save_preferences(&mut self, config_manager: &ConfigManager) -> Result<(), ManagerError> {
        self.settings.store_into(&mut self.config);
        config_manager.save(&self.config)?;
        Ok(())
    }
}
