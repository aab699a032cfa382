//! Defines the error type shared by every stage of the pipeline.
use crate::store::{Frame, FrameError, JoinKey};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Which input of the join a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Public,
    Private,
    Joined,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Side::Public => "public",
            Side::Private => "private",
            Side::Joined => "joined",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Schema error in {side} table: {message}")]
    Schema { side: Side, message: String },

    #[error("Schema error in {side} table: {source}")]
    Frame {
        side: Side,
        #[source]
        source: FrameError,
    },

    /// The join matched nothing. `joined` is the empty, fully-columned result
    /// so a caller can carry on with it.
    #[error("Join produced no rows ({public_rows} public rows, {private_rows} private rows)")]
    EmptyResult { public_rows: usize, private_rows: usize, joined: Frame },

    #[error("Missing column '{column}' for row {key}")]
    MissingColumn { column: String, key: JoinKey },

    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    #[error("Duplicate key {key} in {side} table (rows {first_row} and {second_row})")]
    DuplicateKey { side: Side, key: JoinKey, first_row: usize, second_row: usize },

    #[error("Invalid value in {side} table, row {row}, column '{column}': {message}")]
    InvalidCell { side: Side, row: usize, column: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether the run must stop. An empty join is reported but the caller
    /// may still decide to carry on with an empty table.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CoreError::EmptyResult { .. })
    }
}
