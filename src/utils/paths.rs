use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".lumin";
const CONFIG_FILE: &str = "config.json";
pub const LEDGER_FILE: &str = "ledger.json";
pub const HOME_ENV: &str = "LUMIN_HOME";

/// Returns the application data directory, defaulting to `~/.lumin`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Default location of the ledger snapshot.
pub fn ledger_file() -> PathBuf {
    app_data_dir().join(LEDGER_FILE)
}

/// Default location of the configuration file.
pub fn config_file() -> PathBuf {
    app_data_dir().join(CONFIG_FILE)
}
