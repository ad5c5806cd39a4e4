//! Extension traits for call sites that prefer method syntax.
//!
//! These wrap the free functions in `fbulk-core` so a sequence can drive
//! its own batch and answer its own correlation queries.

mod batch;
mod optional;

pub use batch::*;
pub use optional::*;
