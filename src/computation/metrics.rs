//! Derives the Green Financing Need and the fiscal-space flag.
use crate::config::CoreConfig;
use crate::error::Result;
use crate::store::{Frame, Metrics, RecordInputs, Table};
use crate::validation::Validator;

/// GFN in billions: the monetised cost of emissions minus existing green
/// subsidies and environmental tax revenue.
///
/// `co2_emissions` is in megatons and `carbon_price_per_ton` in currency
/// units, so `Mt * price / 1000` lands in billions.
#[inline]
pub fn green_financing_need(
    co2_emissions: f64,
    carbon_price_per_ton: f64,
    green_subsidies: f64,
    env_tax_revenue: f64,
) -> f64 {
    co2_emissions * carbon_price_per_ton / 1000.0 - green_subsidies - env_tax_revenue
}

/// Computes derived metrics for whole tables. Stateless apart from its
/// configuration, so the same inputs always give the same outputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricCalculator {
    carbon_price_per_ton: f64,
    fiscal_space_debt_limit: f64,
}

impl Default for MetricCalculator {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl MetricCalculator {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            carbon_price_per_ton: config.carbon_price_per_ton,
            fiscal_space_debt_limit: config.fiscal_space_debt_limit,
        }
    }

    pub fn carbon_price_per_ton(&self) -> f64 {
        self.carbon_price_per_ton
    }

    pub fn fiscal_space_debt_limit(&self) -> f64 {
        self.fiscal_space_debt_limit
    }

    pub fn metrics_for(&self, inputs: &RecordInputs) -> Metrics {
        Metrics {
            gfn: green_financing_need(
                inputs.co2_emissions,
                self.carbon_price_per_ton,
                inputs.green_subsidies,
                inputs.env_tax_revenue,
            ),
            // Strict: a ratio exactly at the limit has no fiscal space.
            fiscal_space: inputs.debt_pct_gdp < self.fiscal_space_debt_limit,
        }
    }

    /// Types a joined frame and computes its metrics.
    ///
    /// # Errors
    /// `MissingColumn` naming the column and row key when a required input is
    /// absent. Nothing is returned on failure, not even the rows before it.
    pub fn from_frame(&self, frame: &Frame) -> Result<Table> {
        let mut table = Validator::new(frame).into_table()?;
        self.compute_in_place(&mut table);
        Ok(table)
    }

    /// Returns a recomputed copy; `table` itself is left as it was.
    pub fn compute(&self, table: &Table) -> Table {
        let mut out = table.clone();
        self.compute_in_place(&mut out);
        out
    }

    /// Overwrites the metrics of every record of `table`.
    pub fn compute_in_place(&self, table: &mut Table) {
        for record in table.records_mut() {
            let metrics = self.metrics_for(&record.inputs);
            record.set_metrics(metrics);
        }
        tracing::debug!(
            records = table.len(),
            carbon_price_per_ton = self.carbon_price_per_ton,
            "recomputed metrics"
        );
    }
}
