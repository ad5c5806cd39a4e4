//! Value types shared by the sequence, executor, and correlator.

pub mod outcome;
pub mod position;
pub mod window;

pub use outcome::{BatchItem, BatchResult, ErrorCode, ExecMode, FailureRecord, ItemError};
pub use position::{Key, Position};
pub use window::Window;
