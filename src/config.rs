//! Run configuration: the carbon price, the scenario cut-off year, the
//! fiscal-space limit and the header aliases applied at ingestion.
use crate::error::{CoreError, Result};
use crate::store::columns;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CARBON_PRICE_PER_TON: f64 = 80.0;
pub const DEFAULT_SCENARIO_YEAR_THRESHOLD: i32 = 2025;
pub const DEFAULT_FISCAL_SPACE_DEBT_LIMIT: f64 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// Currency units per ton of CO2.
    pub carbon_price_per_ton: f64,
    /// First year affected by a scenario when the caller gives no threshold.
    pub scenario_year_threshold: i32,
    /// Debt ratio (% of GDP) at and above which a country has no fiscal space.
    pub fiscal_space_debt_limit: f64,
    /// Text encoding of the input CSV files.
    pub encoding: InputEncoding,
    /// Source header -> canonical column name. Applied after trimming.
    pub columns: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputEncoding {
    /// Single-byte Western European text, decoded as windows-1252 so the
    /// euro sign of spreadsheet exports survives.
    #[default]
    #[serde(alias = "cp1252", alias = "windows-1252")]
    Latin1,
    Utf8,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            carbon_price_per_ton: DEFAULT_CARBON_PRICE_PER_TON,
            scenario_year_threshold: DEFAULT_SCENARIO_YEAR_THRESHOLD,
            fiscal_space_debt_limit: DEFAULT_FISCAL_SPACE_DEBT_LIMIT,
            encoding: InputEncoding::default(),
            columns: default_column_aliases(),
        }
    }
}

/// Headers used by the original dashboard exports.
pub fn default_column_aliases() -> BTreeMap<String, String> {
    [
        ("Pays", columns::COUNTRY),
        ("Année", columns::YEAR),
        ("Emission_CO2(Mt)", columns::CO2_EMISSIONS),
        ("Subventions_vertes (en Milliards €)", columns::GREEN_SUBSIDIES),
        ("Recettes_fiscales_env (en Milliards €)", columns::ENV_TAX_REVENUE),
        ("Dette_publique( en % du PIB )", columns::DEBT_PCT_GDP),
        ("Investissements_Privés", columns::PRIVATE_INVESTMENT),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

impl CoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(s).map_err(|e| CoreError::Config(e.to_string()))?;
        // User aliases extend the defaults rather than replacing them.
        let mut aliases = default_column_aliases();
        aliases.append(&mut config.columns);
        config.columns = aliases;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading configuration");
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.carbon_price_per_ton.is_finite() || self.carbon_price_per_ton < 0.0 {
            return Err(CoreError::Config(format!(
                "carbon_price_per_ton must be a finite, non-negative number, got {}",
                self.carbon_price_per_ton
            )));
        }
        if !self.fiscal_space_debt_limit.is_finite() {
            return Err(CoreError::Config(format!(
                "fiscal_space_debt_limit must be finite, got {}",
                self.fiscal_space_debt_limit
            )));
        }
        if let Some((from, _)) = self.columns.iter().find(|(_, to)| to.trim().is_empty()) {
            return Err(CoreError::Config(format!("alias for '{}' maps to an empty name", from)));
        }
        Ok(())
    }

    /// Resolves a trimmed header through the alias table.
    pub fn canonical_column<'a>(&'a self, header: &'a str) -> &'a str {
        self.columns.get(header).map(String::as_str).unwrap_or(header)
    }
}
