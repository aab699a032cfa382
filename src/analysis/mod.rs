//! Read-only analyses of a computed table.
pub mod summary;

pub use summary::{countries, country_view, summarize, CountrySummary};
