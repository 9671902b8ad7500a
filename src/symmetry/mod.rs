//! Automorphisms of the motif and symmetry breaking.

pub use analyzer::{analyze, compute_generators, Symmetry};
pub use permutation::Permutation;

mod analyzer;
mod partition;
mod permutation;
