pub mod trace;

pub use trace::{format_scenario, format_summary, format_trace};
