//! Plain-text renderings for terminals and logs.
use crate::analysis::CountrySummary;
use crate::computation::{MetricCalculator, ScenarioOutcome};
use crate::store::Record;
use std::fmt::Write;

/// Explains how one record's metrics were derived, term by term.
pub fn format_trace(record: &Record, calculator: &MetricCalculator) -> String {
    let inputs = &record.inputs;
    let price = calculator.carbon_price_per_ton();
    let carbon_cost = inputs.co2_emissions * price / 1000.0;
    let mut out = String::new();

    let _ = writeln!(out, "AUDIT TRACE for {}:", record.key);
    let _ = writeln!(out, "--------------------------------------------------");
    let _ = writeln!(
        out,
        "[L1] gfn [{:.3}] = carbon_cost - green_subsidies - env_tax_revenue",
        record.gfn()
    );
    let _ = writeln!(
        out,
        "  [L2] carbon_cost [{:.3}] = co2_emissions [{:.3}] * carbon_price [{:.3}] / 1000",
        carbon_cost, inputs.co2_emissions, price
    );
    let _ = writeln!(out, "  [L2] green_subsidies -> Var([{:.3}])", inputs.green_subsidies);
    let _ = writeln!(out, "  [L2] env_tax_revenue -> Var([{:.3}])", inputs.env_tax_revenue);
    let _ = writeln!(
        out,
        "[L1] fiscal_space [{}] = debt_pct_gdp [{:.3}] < {:.3}",
        record.fiscal_space(),
        inputs.debt_pct_gdp,
        calculator.fiscal_space_debt_limit()
    );
    if let Some(investment) = inputs.private_investment {
        let _ = writeln!(out, "[L1] private_investment -> Var([{:.3}])", investment);
    }
    out
}

/// Renders the per-country summary as an aligned table.
pub fn format_summary(summary: &[CountrySummary]) -> String {
    let width = summary.iter().map(|s| s.country.chars().count()).max().unwrap_or(0).max("country".len());
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>12}  {:>5}", "country", "mean_gfn", "years", width = width);
    for row in summary {
        let _ = writeln!(out, "{:<width$}  {:>12.3}  {:>5}", row.country, row.mean_gfn, row.years, width = width);
    }
    out
}

/// One-paragraph description of a scenario run.
pub fn format_scenario(outcome: &ScenarioOutcome) -> String {
    format!(
        "Scenario: {} ({})\nHypothesis: {}\nRows affected: {}\n",
        outcome.scenario.label(),
        outcome.scenario,
        outcome.scenario.hypothesis(outcome.threshold),
        outcome.affected_rows
    )
}
