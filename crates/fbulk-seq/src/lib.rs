//! Sparse, ordered, integer-keyed sequences.
//!
//! The sequence is the leaf of the workspace: the executor and the
//! correlator both walk it, and both rely on its traversal order being
//! deterministic for a given window.

pub mod sequence;
pub mod traversal;

pub use sequence::SparseOrderedSequence;
pub use traversal::{Positioned, Traversal};
