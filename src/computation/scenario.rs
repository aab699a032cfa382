//! Policy scenarios applied to rows at or after a threshold year.
use super::metrics::MetricCalculator;
use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::store::{columns, Record, Table};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FISCAL_REFORM_TAX_FACTOR: f64 = 1.10;
pub const DEBT_CRISIS_DEBT_DELTA: f64 = 5.0;
pub const PRIVATE_INCENTIVE_SUBSIDY_FACTOR: f64 = 0.80;
pub const PRIVATE_INCENTIVE_INVESTMENT_FACTOR: f64 = 1.30;

/// The closed set of policy scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Environmental tax revenue +10%.
    FiscalReform,
    /// Public debt +5 points of GDP.
    DebtCrisis,
    /// Green subsidies -20%, private investment +30%.
    PrivateIncentive,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::FiscalReform, Scenario::DebtCrisis, Scenario::PrivateIncentive];

    /// The selector accepted by `from_str`.
    pub fn name(&self) -> &'static str {
        match self {
            Scenario::FiscalReform => "fiscal_reform",
            Scenario::DebtCrisis => "debt_crisis",
            Scenario::PrivateIncentive => "private_incentive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::FiscalReform => "Fiscal reform (wealth tax, +1pt VAT)",
            Scenario::DebtCrisis => "Debt crisis (loss of confidence)",
            Scenario::PrivateIncentive => "State withdrawal & private incentive",
        }
    }

    /// The assumption the scenario encodes, for display next to its results.
    pub fn hypothesis(&self, threshold: i32) -> String {
        match self {
            Scenario::FiscalReform => {
                format!("environmental tax revenue +10% from {}", threshold)
            }
            Scenario::DebtCrisis => format!("public debt +5 points of GDP from {}", threshold),
            Scenario::PrivateIncentive => {
                format!("green subsidies -20%, private investment +30% from {}", threshold)
            }
        }
    }

    /// Applies the policy delta to one record's inputs.
    fn mutate(&self, record: &mut Record) {
        let inputs = &mut record.inputs;
        match self {
            Scenario::FiscalReform => inputs.env_tax_revenue *= FISCAL_REFORM_TAX_FACTOR,
            Scenario::DebtCrisis => inputs.debt_pct_gdp += DEBT_CRISIS_DEBT_DELTA,
            Scenario::PrivateIncentive => {
                inputs.green_subsidies *= PRIVATE_INCENTIVE_SUBSIDY_FACTOR;
                if let Some(investment) = inputs.private_investment.as_mut() {
                    *investment *= PRIVATE_INCENTIVE_INVESTMENT_FACTOR;
                }
            }
        }
    }

    /// Checks that every record the scenario will touch has the inputs it needs.
    fn check(&self, affected: &[&Record]) -> Result<()> {
        if let Scenario::PrivateIncentive = self {
            if let Some(record) = affected.iter().find(|r| r.inputs.private_investment.is_none()) {
                return Err(CoreError::MissingColumn {
                    column: columns::PRIVATE_INVESTMENT.to_string(),
                    key: record.key.clone(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s.trim())
            .ok_or_else(|| CoreError::UnknownScenario(s.to_string()))
    }
}

/// The result of one scenario run against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub threshold: i32,
    /// Number of rows whose inputs were changed.
    pub affected_rows: usize,
    pub table: Table,
}

/// Applies scenarios and keeps derived metrics in step with the new inputs.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioEngine {
    calculator: MetricCalculator,
    default_threshold: i32,
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new(&CoreConfig::default())
    }
}

impl ScenarioEngine {
    pub fn new(config: &CoreConfig) -> Self {
        Self { calculator: MetricCalculator::new(config), default_threshold: config.scenario_year_threshold }
    }

    pub fn default_threshold(&self) -> i32 {
        self.default_threshold
    }

    /// Runs `scenario` on a copy of `baseline`; `baseline` is not modified.
    pub fn apply(&self, baseline: &Table, scenario: Scenario, threshold: Option<i32>) -> Result<ScenarioOutcome> {
        let mut table = baseline.clone();
        let threshold = threshold.unwrap_or(self.default_threshold);
        let affected_rows = self.apply_in_place(&mut table, scenario, Some(threshold))?;
        Ok(ScenarioOutcome { scenario, threshold, affected_rows, table })
    }

    /// Parses `selector` before touching anything, then behaves like `apply`.
    pub fn apply_named(&self, baseline: &Table, selector: &str, threshold: Option<i32>) -> Result<ScenarioOutcome> {
        let scenario: Scenario = selector.parse()?;
        self.apply(baseline, scenario, threshold)
    }

    /// Mutates `table` itself and returns the number of rows changed.
    ///
    /// Effects compound: running the same scenario twice applies its delta
    /// twice. On error the table is left exactly as it was.
    pub fn apply_in_place(&self, table: &mut Table, scenario: Scenario, threshold: Option<i32>) -> Result<usize> {
        let threshold = threshold.unwrap_or(self.default_threshold);

        let affected: Vec<&Record> = table.iter().filter(|r| r.year() >= threshold).collect();
        scenario.check(&affected)?;

        let mut affected_rows = 0;
        for record in table.records_mut().iter_mut().filter(|r| r.year() >= threshold) {
            scenario.mutate(record);
            affected_rows += 1;
        }

        self.calculator.compute_in_place(table);
        tracing::info!(%scenario, threshold, affected_rows, "applied scenario");
        Ok(affected_rows)
    }

    /// Runs each scenario against its own copy of `baseline`, in parallel.
    /// Outcomes come back in the order the scenarios were given.
    pub fn compare(&self, baseline: &Table, scenarios: &[Scenario], threshold: Option<i32>) -> Result<Vec<ScenarioOutcome>> {
        scenarios
            .par_iter()
            .map(|&scenario| self.apply(baseline, scenario, threshold))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JoinKey, RecordInputs};
    use rstest::rstest;

    fn record(country: &str, year: i32, tax: f64, debt: f64, investment: Option<f64>) -> Record {
        Record::new(
            JoinKey::new(country, year),
            RecordInputs {
                co2_emissions: 100.0,
                green_subsidies: 2.0,
                env_tax_revenue: tax,
                debt_pct_gdp: debt,
                private_investment: investment,
            },
        )
    }

    fn baseline(records: Vec<Record>) -> Table {
        let mut table = Table::from_records(records);
        MetricCalculator::default().compute_in_place(&mut table);
        table
    }

    fn years_table() -> Table {
        baseline(
            [2023, 2024, 2025, 2026]
                .into_iter()
                .map(|y| record("France", y, 1.0, 86.5, Some(10.0)))
                .collect(),
        )
    }

    #[rstest]
    #[case("fiscal_reform", Scenario::FiscalReform)]
    #[case("debt_crisis", Scenario::DebtCrisis)]
    #[case(" private_incentive ", Scenario::PrivateIncentive)]
    fn test_parse_known_selectors(#[case] selector: &str, #[case] expected: Scenario) {
        assert_eq!(selector.parse::<Scenario>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_selector_fails_before_mutation() {
        let table = years_table();
        let err = ScenarioEngine::default().apply_named(&table, "austerity", None).unwrap_err();
        assert!(matches!(err, CoreError::UnknownScenario(ref s) if s == "austerity"));
    }

    #[test]
    fn test_year_filter_leaves_earlier_rows_bit_identical() {
        let table = years_table();
        let outcome = ScenarioEngine::default().apply(&table, Scenario::DebtCrisis, Some(2025)).unwrap();

        assert_eq!(outcome.affected_rows, 2);
        let before: Vec<u64> = table.iter().map(|r| r.inputs.debt_pct_gdp.to_bits()).collect();
        let after: Vec<u64> = outcome.table.iter().map(|r| r.inputs.debt_pct_gdp.to_bits()).collect();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1], before[1]);
        assert_eq!(outcome.table.records()[2].inputs.debt_pct_gdp, 91.5);
        assert_eq!(outcome.table.records()[3].inputs.debt_pct_gdp, 91.5);
    }

    #[test]
    fn test_metrics_follow_mutated_inputs() {
        let table = years_table();
        assert!(table.records()[3].fiscal_space());

        let outcome = ScenarioEngine::default().apply(&table, Scenario::DebtCrisis, Some(2025)).unwrap();

        // 86.5 + 5 crosses the 90% line: the derived flag must follow.
        assert!(outcome.table.records()[1].fiscal_space());
        assert!(!outcome.table.records()[2].fiscal_space());
        assert!(!outcome.table.records()[3].fiscal_space());
        // Baseline copy is untouched.
        assert!(table.records()[3].fiscal_space());
    }

    #[test]
    fn test_fiscal_reform_compounds() {
        let engine = ScenarioEngine::default();
        let table = baseline(vec![record("France", 2030, 10.0, 50.0, None)]);

        let once = engine.apply(&table, Scenario::FiscalReform, None).unwrap().table;
        let twice = engine.apply(&once, Scenario::FiscalReform, None).unwrap().table;

        assert!((once.records()[0].inputs.env_tax_revenue - 11.0).abs() < 1e-9);
        assert!((twice.records()[0].inputs.env_tax_revenue - 12.1).abs() < 1e-9);
        // gfn = 100 * 80 / 1000 - 2 - tax
        assert!((twice.records()[0].gfn() - (8.0 - 2.0 - 12.1)).abs() < 1e-9);
    }

    #[test]
    fn test_private_incentive_scales_subsidies_and_investment() {
        let table = baseline(vec![record("Spain", 2024, 1.0, 60.0, None), record("Spain", 2026, 1.0, 60.0, Some(10.0))]);

        let outcome = ScenarioEngine::default().apply(&table, Scenario::PrivateIncentive, Some(2025)).unwrap();

        let later = &outcome.table.records()[1];
        assert!((later.inputs.green_subsidies - 1.6).abs() < 1e-9);
        assert!((later.inputs.private_investment.unwrap() - 13.0).abs() < 1e-9);
        assert!((later.gfn() - (8.0 - 1.6 - 1.0)).abs() < 1e-9);
        // The 2024 row lacks private investment but is out of scope.
        assert_eq!(outcome.table.records()[0], table.records()[0]);
    }

    #[test]
    fn test_private_incentive_requires_investment_on_affected_rows() {
        let mut table = baseline(vec![record("Spain", 2025, 1.0, 60.0, Some(4.0)), record("Italy", 2026, 1.0, 60.0, None)]);
        let before = table.clone();

        let err = ScenarioEngine::default()
            .apply_in_place(&mut table, Scenario::PrivateIncentive, Some(2025))
            .unwrap_err();

        match err {
            CoreError::MissingColumn { column, key } => {
                assert_eq!(column, "private_investment");
                assert_eq!(key, JoinKey::new("Italy", 2026));
            }
            other => panic!("expected missing column, got {:?}", other),
        }
        assert_eq!(table, before, "failed application must not leave partial writes");
    }

    #[test]
    fn test_default_threshold_comes_from_config() {
        let config = CoreConfig { scenario_year_threshold: 2026, ..CoreConfig::default() };
        let outcome = ScenarioEngine::new(&config).apply(&years_table(), Scenario::DebtCrisis, None).unwrap();
        assert_eq!(outcome.threshold, 2026);
        assert_eq!(outcome.affected_rows, 1);
    }

    #[test]
    fn test_compare_keeps_request_order_and_isolates_runs() {
        let table = years_table();
        let order = [Scenario::PrivateIncentive, Scenario::FiscalReform, Scenario::DebtCrisis];

        let outcomes = ScenarioEngine::default().compare(&table, &order, Some(2025)).unwrap();

        let got: Vec<Scenario> = outcomes.iter().map(|o| o.scenario).collect();
        assert_eq!(got, order);
        // Each run starts from the same baseline: the fiscal reform run sees
        // untouched debt and subsidies.
        let reform = &outcomes[1].table.records()[3];
        assert_eq!(reform.inputs.debt_pct_gdp, 86.5);
        assert_eq!(reform.inputs.green_subsidies, 2.0);
    }
}
