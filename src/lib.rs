//! Motif search in labeled networks with symmetry breaking.

pub mod error;
pub mod executor;
pub mod front_end;
pub mod graph;
pub mod index;
pub mod planner;
pub mod symmetry;
pub mod task;
pub mod types;

pub(crate) mod tools;
