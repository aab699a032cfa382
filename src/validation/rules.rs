//! Domain rules applied to each record after typing.
use crate::error::{CoreError, Side};
use crate::store::{columns, Record};

/// A rule inspects one record and reports the first problem it finds.
pub(crate) type Rule = fn(row: usize, record: &Record) -> Option<CoreError>;

pub(crate) const RULES: &[Rule] = &[non_empty_country, non_negative_emissions, non_negative_debt, finite_inputs];

fn violation(row: usize, column: &str, message: String) -> CoreError {
    CoreError::InvalidCell { side: Side::Joined, row, column: column.to_string(), message }
}

pub(crate) fn non_empty_country(row: usize, record: &Record) -> Option<CoreError> {
    if record.country().trim().is_empty() {
        return Some(violation(row, columns::COUNTRY, "country must not be blank".into()));
    }
    None
}

pub(crate) fn non_negative_emissions(row: usize, record: &Record) -> Option<CoreError> {
    let co2 = record.inputs.co2_emissions;
    if co2 < 0.0 {
        return Some(violation(row, columns::CO2_EMISSIONS, format!("emissions cannot be negative, got {}", co2)));
    }
    None
}

pub(crate) fn non_negative_debt(row: usize, record: &Record) -> Option<CoreError> {
    let debt = record.inputs.debt_pct_gdp;
    if debt < 0.0 {
        return Some(violation(row, columns::DEBT_PCT_GDP, format!("debt ratio cannot be negative, got {}", debt)));
    }
    None
}

/// Infinite inputs would make every derived figure meaningless.
pub(crate) fn finite_inputs(row: usize, record: &Record) -> Option<CoreError> {
    let inputs = &record.inputs;
    let named = [
        (columns::CO2_EMISSIONS, Some(inputs.co2_emissions)),
        (columns::GREEN_SUBSIDIES, Some(inputs.green_subsidies)),
        (columns::ENV_TAX_REVENUE, Some(inputs.env_tax_revenue)),
        (columns::DEBT_PCT_GDP, Some(inputs.debt_pct_gdp)),
        (columns::PRIVATE_INVESTMENT, inputs.private_investment),
    ];
    named
        .into_iter()
        .find(|(_, v)| v.is_some_and(|v| !v.is_finite()))
        .map(|(column, v)| violation(row, column, format!("value must be finite, got {:?}", v)))
}
