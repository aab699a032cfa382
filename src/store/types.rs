use serde::{Deserialize, Serialize};

/// Canonical column names understood by the core.
pub mod columns {
    pub const COUNTRY: &str = "country";
    pub const YEAR: &str = "year";
    pub const CO2_EMISSIONS: &str = "co2_emissions";
    pub const GREEN_SUBSIDIES: &str = "green_subsidies";
    pub const ENV_TAX_REVENUE: &str = "env_tax_revenue";
    pub const DEBT_PCT_GDP: &str = "debt_pct_gdp";
    pub const PRIVATE_INVESTMENT: &str = "private_investment";
    pub const GFN: &str = "gfn";
    pub const FISCAL_SPACE: &str = "fiscal_space";

    /// The join key columns, in output order.
    pub const KEY: [&str; 2] = [COUNTRY, YEAR];
}

/// A single value of a name-addressed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Types a raw CSV field: blank is `Empty`, anything `f64` accepts is a
    /// `Number`, the rest stays `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if !v.is_nan() => Cell::Number(v),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of a cell, accepting `2024` and `2024.0` but not `2024.5`.
    pub fn as_year(&self) -> Option<i32> {
        match self {
            Cell::Number(v) if v.fract() == 0.0 && *v >= i32::MIN as f64 && *v <= i32::MAX as f64 => {
                Some(*v as i32)
            }
            _ => None,
        }
    }

    /// Text view of a cell. Numbers are rendered so that a numeric country
    /// code still joins against its textual twin.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(v) => Some(v.to_string()),
            Cell::Empty => None,
        }
    }
}

/// The (country, year) pair identifying a row across both datasets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinKey {
    pub country: String,
    pub year: i32,
}

impl JoinKey {
    pub fn new(country: impl Into<String>, year: i32) -> Self {
        Self { country: country.into(), year }
    }
}

impl std::fmt::Display for JoinKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.country, self.year)
    }
}

/// The policy inputs of one record; everything the scenarios may touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInputs {
    /// CO2 emissions, megatons.
    pub co2_emissions: f64,
    /// Green subsidies, billions.
    pub green_subsidies: f64,
    /// Environmental tax revenue, billions.
    pub env_tax_revenue: f64,
    /// Public debt, % of GDP.
    pub debt_pct_gdp: f64,
    /// Private green investment, billions. Only present when the private
    /// dataset supplies it.
    pub private_investment: Option<f64>,
}

/// Derived indicators. Only the metric calculator writes these.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Metrics {
    /// Green Financing Need, billions.
    pub gfn: f64,
    pub fiscal_space: bool,
}

/// One joined row. Serializes flat, the shape a charting layer expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    pub key: JoinKey,
    #[serde(flatten)]
    pub inputs: RecordInputs,
    #[serde(flatten)]
    metrics: Metrics,
}

impl Record {
    /// Builds a record with zeroed metrics; they are filled in by
    /// `MetricCalculator` before the record leaves the crate.
    pub(crate) fn new(key: JoinKey, inputs: RecordInputs) -> Self {
        Self { key, inputs, metrics: Metrics::default() }
    }

    pub fn country(&self) -> &str {
        &self.key.country
    }

    pub fn year(&self) -> i32 {
        self.key.year
    }

    pub fn gfn(&self) -> f64 {
        self.metrics.gfn
    }

    pub fn fiscal_space(&self) -> bool {
        self.metrics.fiscal_space
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub(crate) fn set_metrics(&mut self, metrics: Metrics) {
        self.metrics = metrics;
    }
}
