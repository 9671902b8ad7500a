//! The front end: link types, motif descriptions and network files.

pub use network::{read_network, read_networks};
pub use parser::{parse_link_types, parse_motif};

mod network;
mod parser;
