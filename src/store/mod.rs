//! In-memory table types shared by every stage.
pub mod frame;
pub mod table;
pub mod types;

pub use frame::{Frame, FrameError};
pub use table::Table;
pub use types::{columns, Cell, JoinKey, Metrics, Record, RecordInputs};
