//! Converts a joined frame into typed records, once, at Joiner output.
pub mod rules;
pub mod validator;

pub use validator::Validator;
