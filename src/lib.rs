// Green finance core: joins public and private green-finance tables, derives
// the Green Financing Need and fiscal-space indicators, and evaluates policy
// scenarios against them.
//
// Pipeline: ingest -> join -> validation -> computation (baseline)
//           -> computation::scenario (optional) -> analysis::summary

pub mod analysis;
pub mod computation;
pub mod config;
pub mod display;
pub mod error;
pub mod ingest;
pub mod join;
pub mod pipeline;
pub mod store;
pub mod validation;

#[cfg(feature = "python")]
mod bindings;

pub use analysis::{countries, country_view, summarize, CountrySummary};
pub use computation::{green_financing_need, MetricCalculator, Scenario, ScenarioEngine, ScenarioOutcome};
pub use config::CoreConfig;
pub use error::{CoreError, Result, Side};
pub use pipeline::{Basis, Pipeline, PipelineOutput, RunRequest};
pub use store::{Frame, JoinKey, Record, RecordInputs, Table};
