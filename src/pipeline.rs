//! One full run: join, type, compute the baseline, optionally apply a
//! scenario, and summarise the table the caller asked for.
use crate::analysis::{summarize, CountrySummary};
use crate::computation::{MetricCalculator, Scenario, ScenarioEngine, ScenarioOutcome};
use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::join::join;
use crate::store::{Frame, Table};
use serde::{Deserialize, Serialize};

/// Which table a summary is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    #[default]
    Baseline,
    Scenario,
}

impl std::str::FromStr for Basis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "baseline" => Ok(Basis::Baseline),
            "scenario" => Ok(Basis::Scenario),
            other => Err(CoreError::Config(format!("unknown basis '{}', expected 'baseline' or 'scenario'", other))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRequest {
    pub scenario: Option<Scenario>,
    /// Overrides the configured scenario threshold for this run.
    pub year_threshold: Option<i32>,
    pub basis: Basis,
    /// Carry on with an empty table when the inputs share no key, instead of
    /// returning `EmptyResult`.
    pub allow_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub baseline: Table,
    pub scenario: Option<ScenarioOutcome>,
    pub basis: Basis,
    pub summary: Vec<CountrySummary>,
}

impl PipelineOutput {
    /// The table the summary was computed from.
    pub fn summarized_table(&self) -> &Table {
        match (&self.basis, &self.scenario) {
            (Basis::Scenario, Some(outcome)) => &outcome.table,
            _ => &self.baseline,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: CoreConfig,
}

impl Pipeline {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Runs the whole pipeline over two parsed input tables.
    ///
    /// The request is checked before any work is done. An empty join comes
    /// back as `CoreError::EmptyResult` unless `request.allow_empty` is set,
    /// in which case the run finishes with empty tables and an empty summary.
    pub fn run(&self, public: &Frame, private: &Frame, request: &RunRequest) -> Result<PipelineOutput> {
        self.config.validate()?;
        if request.basis == Basis::Scenario && request.scenario.is_none() {
            return Err(CoreError::Config("a scenario summary was requested but no scenario was given".into()));
        }

        let joined = match join(public, private) {
            Ok(joined) => joined,
            Err(CoreError::EmptyResult { public_rows, private_rows, joined }) if request.allow_empty => {
                tracing::warn!(public_rows, private_rows, "no shared keys, continuing with an empty table");
                joined
            }
            Err(e) => return Err(e),
        };
        let baseline = MetricCalculator::new(&self.config).from_frame(&joined)?;
        tracing::info!(records = baseline.len(), "computed baseline");

        let scenario = request
            .scenario
            .map(|scenario| ScenarioEngine::new(&self.config).apply(&baseline, scenario, request.year_threshold))
            .transpose()?;

        let summary = match (&request.basis, &scenario) {
            (Basis::Scenario, Some(outcome)) => summarize(&outcome.table),
            _ => summarize(&baseline),
        };

        Ok(PipelineOutput { baseline, scenario, basis: request.basis, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Cell;

    fn public() -> Frame {
        Frame::from_rows(
            ["country", "year", "co2_emissions", "green_subsidies", "env_tax_revenue", "debt_pct_gdp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                vec![Cell::Text("France".into()), Cell::Number(2024.0), Cell::Number(300.0), Cell::Number(5.0), Cell::Number(4.0), Cell::Number(110.0)],
                vec![Cell::Text("France".into()), Cell::Number(2025.0), Cell::Number(290.0), Cell::Number(5.0), Cell::Number(4.0), Cell::Number(112.0)],
                vec![Cell::Text("Spain".into()), Cell::Number(2025.0), Cell::Number(200.0), Cell::Number(1.0), Cell::Number(1.0), Cell::Number(86.0)],
            ],
        )
        .unwrap()
    }

    fn private() -> Frame {
        Frame::from_rows(
            ["country", "year", "private_investment"].iter().map(|s| s.to_string()).collect(),
            vec![
                vec![Cell::Text("France".into()), Cell::Number(2024.0), Cell::Number(12.0)],
                vec![Cell::Text("France".into()), Cell::Number(2025.0), Cell::Number(14.0)],
                vec![Cell::Text("Spain".into()), Cell::Number(2025.0), Cell::Number(6.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_baseline_only_run() {
        let out = Pipeline::default().run(&public(), &private(), &RunRequest::default()).unwrap();

        assert_eq!(out.baseline.len(), 3);
        assert!(out.scenario.is_none());
        // France: (15 + 14.2) / 2 = 14.6, Spain: 16 - 2 = 14.
        assert_eq!(out.summary[0].country, "France");
        assert!((out.summary[0].mean_gfn - 14.6).abs() < 1e-9);
        assert!((out.summary[1].mean_gfn - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_basis_selects_summarized_table() {
        let request = RunRequest {
            scenario: Some(Scenario::FiscalReform),
            year_threshold: Some(2025),
            basis: Basis::Baseline,
            ..RunRequest::default()
        };
        let on_baseline = Pipeline::default().run(&public(), &private(), &request).unwrap();
        let on_scenario = Pipeline::default()
            .run(&public(), &private(), &RunRequest { basis: Basis::Scenario, ..request.clone() })
            .unwrap();

        assert_eq!(on_baseline.baseline, on_scenario.baseline);
        assert_eq!(on_baseline.summary, summarize(&on_baseline.baseline));
        assert_eq!(on_scenario.summary, summarize(on_scenario.summarized_table()));
        assert_ne!(on_baseline.summary, on_scenario.summary);
    }

    #[test]
    fn test_scenario_basis_without_scenario_is_rejected() {
        let request = RunRequest { basis: Basis::Scenario, ..RunRequest::default() };
        assert!(matches!(Pipeline::default().run(&public(), &private(), &request), Err(CoreError::Config(_))));
    }

    fn german_private() -> Frame {
        Frame::from_rows(
            vec!["country".into(), "year".into(), "private_investment".into()],
            vec![vec![Cell::Text("Germany".into()), Cell::Number(2024.0), Cell::Number(9.0)]],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_join_is_reported_as_non_fatal() {
        let err = Pipeline::default().run(&public(), &german_private(), &RunRequest::default()).unwrap_err();
        assert!(!err.is_fatal());
        assert!(matches!(err, CoreError::EmptyResult { public_rows: 3, private_rows: 1, .. }));
    }

    #[test]
    fn test_allow_empty_proceeds_past_an_empty_join() {
        let request = RunRequest {
            scenario: Some(Scenario::PrivateIncentive),
            basis: Basis::Scenario,
            allow_empty: true,
            ..RunRequest::default()
        };
        let out = Pipeline::default().run(&public(), &german_private(), &request).unwrap();

        assert!(out.baseline.is_empty());
        assert!(out.summary.is_empty());
        let outcome = out.scenario.as_ref().unwrap();
        assert_eq!(outcome.affected_rows, 0);
        assert!(outcome.table.is_empty());
        assert!(out.summarized_table().is_empty());
    }

    #[test]
    fn test_allow_empty_does_not_hide_fatal_errors() {
        let private = Frame::from_rows(
            vec!["country".into(), "annee".into()],
            vec![vec![Cell::Text("Germany".into()), Cell::Number(2024.0)]],
        )
        .unwrap();
        let request = RunRequest { allow_empty: true, ..RunRequest::default() };

        let err = Pipeline::default().run(&public(), &private, &request).unwrap_err();
        assert!(matches!(err, CoreError::Schema { side: crate::error::Side::Private, .. }));
    }

    #[test]
    fn test_basis_parsing() {
        assert_eq!("scenario".parse::<Basis>().unwrap(), Basis::Scenario);
        assert!("both".parse::<Basis>().is_err());
    }
}
