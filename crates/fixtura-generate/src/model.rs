use std::sync::{OnceLock, RwLock};

use serde::{Deserialize, Serialize};

use crate::errors::FactoryError;
use crate::faker_rs::LocaleKey;

/// Seed and locale captured by a model at definition time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Seed for the model's random source. `None` draws a fresh one.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub locale: LocaleKey,
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_locale(mut self, locale: LocaleKey) -> Self {
        self.locale = locale;
        self
    }
}

fn default_slot() -> &'static RwLock<FactoryConfig> {
    static DEFAULT: OnceLock<RwLock<FactoryConfig>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(FactoryConfig::default()))
}

/// Installs the process-wide defaults read by models defined afterwards.
///
/// Models already defined keep the configuration they captured.
pub fn configure(config: FactoryConfig) -> Result<(), FactoryError> {
    let mut slot = default_slot()
        .write()
        .map_err(|_| FactoryError::Poisoned("factory config"))?;
    *slot = config;
    Ok(())
}

/// Current process-wide defaults.
pub fn default_config() -> Result<FactoryConfig, FactoryError> {
    default_slot()
        .read()
        .map(|slot| *slot)
        .map_err(|_| FactoryError::Poisoned("factory config"))
}

/// Summary of a batch build, emitted by the CLI alongside output files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub model: String,
    pub records: u64,
    pub seed: u64,
    pub locale: LocaleKey,
    pub duration_ms: u64,
}
