//! The labeled graph shared by motifs and networks.

pub use alphabet::{LinkAlphabet, LinkType};
pub use graph::{Graph, GraphBuilder};
pub use signature::{LinkDegree, Signature};

mod alphabet;
mod graph;
mod signature;
