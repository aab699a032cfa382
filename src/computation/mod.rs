//! Derived metrics and the scenarios that perturb their inputs.
pub mod metrics;
pub mod scenario;

pub use metrics::{green_financing_need, MetricCalculator};
pub use scenario::{Scenario, ScenarioEngine, ScenarioOutcome};
