use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::utils::{app_data_dir, config_file_in};
use crate::currency::{LocaleConfig, Money};
use crate::domain::tax::{FlatFee, NoTax, RateTax, TaxPolicy, TaxSchedule};
use crate::errors::ConfigError;

const TMP_SUFFIX: &str = "tmp";

/// Tax rule as stored in the configuration file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaxConfig {
    #[default]
    None,
    Flat {
        cents: i64,
    },
    Rate {
        basis_points: u32,
    },
}

impl TaxConfig {
    /// Rejects negative flat fees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            TaxConfig::Flat { cents } if cents < 0 => Err(ConfigError::Invalid(format!(
                "flat tax must not be negative, got {cents} cents"
            ))),
            _ => Ok(()),
        }
    }

    pub fn policy(&self) -> Result<Box<dyn TaxPolicy>, ConfigError> {
        self.validate()?;
        Ok(match *self {
            TaxConfig::None => Box::new(NoTax),
            TaxConfig::Flat { cents } => Box::new(FlatFee(Money::from_cents(cents))),
            TaxConfig::Rate { basis_points } => Box::new(RateTax::new(basis_points)),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BankConfig {
    pub currency: String,
    pub locale: LocaleConfig,
    pub withdrawal_tax: TaxConfig,
    pub transfer_tax: TaxConfig,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            locale: LocaleConfig::default(),
            withdrawal_tax: TaxConfig::None,
            transfer_tax: TaxConfig::None,
        }
    }
}

impl BankConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.withdrawal_tax.validate()?;
        self.transfer_tax.validate()
    }

    pub fn tax_schedule(&self) -> Result<TaxSchedule, ConfigError> {
        Ok(TaxSchedule::new(
            self.withdrawal_tax.policy()?,
            self.transfer_tax.policy()?,
        ))
    }
}

/// Loads and saves [`BankConfig`] as a JSON file.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&base)?;
        Ok(Self::new(config_file_in(&base)))
    }

    /// Uses `$BANK_CORE_HOME`, falling back to `~/.bank_core`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn load(&self) -> Result<BankConfig, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: BankConfig =
                serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
            config.validate().inspect_err(|err| {
                tracing::warn!(path = %self.path.display(), %err, "configuration rejected");
            })?;
            tracing::debug!(path = %self.path.display(), "configuration loaded");
            Ok(config)
        } else {
            tracing::debug!(path = %self.path.display(), "no configuration file, using defaults");
            Ok(BankConfig::default())
        }
    }

    pub fn save(&self, config: &BankConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
