//! Error management.

use derive_more::Display;

#[derive(Debug, Display)]
pub enum Error {
    /// An edge references an unknown vertex or an unknown link type.
    #[display(fmt = "malformed graph: {}", _0)]
    MalformedGraph(String),
    /// The motif cannot be searched for, e.g. it has no vertices.
    #[display(fmt = "unsupported motif: {}", _0)]
    UnsupportedMotif(String),
    /// The interrupt hook stopped the search; the emitted results are truncated.
    #[display(fmt = "search interrupted after {} embeddings", embeddings)]
    SearchInterrupted { embeddings: usize },
    #[display(fmt = "invalid link type: {}", _0)]
    InvalidLinkType(String),
    #[display(fmt = "invalid motif description: {}", _0)]
    InvalidMotif(String),
    #[display(fmt = "invalid visiting order: {}", _0)]
    InvalidOrder(String),
    #[display(
        fmt = "motif `{}` and network `{}` use different link alphabets",
        motif,
        network
    )]
    AlphabetMismatch { motif: String, network: String },
    #[display(fmt = "{}", _0)]
    Io(std::io::Error),
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
