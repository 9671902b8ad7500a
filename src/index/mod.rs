//! Indices over the network.

pub use candidate_index::CandidateIndex;

mod candidate_index;
