//! Per-country aggregates and views over a computed table.
use crate::store::{Record, Table};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub country: String,
    pub mean_gfn: f64,
    /// Number of years averaged.
    pub years: usize,
}

/// Mean GFN per country, highest first.
///
/// Countries with equal means keep the order in which they first appear in
/// `table`. An empty table gives an empty summary.
pub fn summarize(table: &Table) -> Vec<CountrySummary> {
    // (country, sum, count) in first-appearance order.
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in table {
        let slot = *index.entry(record.country()).or_insert_with(|| {
            groups.push((record.country(), 0.0, 0));
            groups.len() - 1
        });
        groups[slot].1 += record.gfn();
        groups[slot].2 += 1;
    }

    let mut summary: Vec<CountrySummary> = groups
        .into_iter()
        .map(|(country, sum, count)| CountrySummary {
            country: country.to_string(),
            mean_gfn: sum / count as f64,
            years: count,
        })
        .collect();

    // `sort_by` is stable, which gives the first-appearance tie-break.
    summary.sort_by(|a, b| b.mean_gfn.total_cmp(&a.mean_gfn));
    summary
}

/// The rows of one country, ordered by year.
pub fn country_view<'a>(table: &'a Table, country: &str) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = table.iter().filter(|r| r.country() == country).collect();
    rows.sort_by_key(|r| r.year());
    rows
}

/// Distinct country names, sorted.
pub fn countries(table: &Table) -> Vec<String> {
    table
        .iter()
        .map(|r| r.country())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
