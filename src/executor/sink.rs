use crate::{error::Result, graph::Graph, types::VId};
use itertools::Itertools;
use std::io::Write;

/// An embedding: the network vertex assigned to every motif vertex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Embedding {
    images: Vec<VId>,
}

impl Embedding {
    pub fn new(images: Vec<VId>) -> Self {
        Self { images }
    }

    /// The network vertices, indexed by motif vertex.
    pub fn images(&self) -> &[VId] {
        &self.images
    }

    pub fn image(&self, motif_vertex: VId) -> VId {
        self.images[motif_vertex]
    }

    /// The `(motif vertex, network vertex)` pairs in motif order.
    pub fn pairs(&self) -> impl Iterator<Item = (VId, VId)> + '_ {
        self.images.iter().copied().enumerate()
    }

    /// The network vertex names, e.g. `p1;p2;p3`.
    pub fn describe(&self, network: &Graph) -> String {
        self.images
            .iter()
            .map(|&v| network.vertex_name(v))
            .join(";")
    }
}

/// Receives the embeddings found by the matcher.
pub trait EmbeddingSink {
    fn accept(&mut self, embedding: Embedding) -> Result<()>;
}

impl EmbeddingSink for Vec<Embedding> {
    fn accept(&mut self, embedding: Embedding) -> Result<()> {
        self.push(embedding);
        Ok(())
    }
}

/// Only counts the embeddings.
#[derive(Debug, Default)]
pub struct CountSink {
    count: usize,
}

impl CountSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl EmbeddingSink for CountSink {
    fn accept(&mut self, _: Embedding) -> Result<()> {
        self.count += 1;
        Ok(())
    }
}

/// Writes one embedding per line, with the vertex names of `network`.
pub struct WriterSink<'a, W: Write> {
    writer: W,
    network: &'a Graph,
    count: usize,
}

impl<'a, W: Write> WriterSink<'a, W> {
    pub fn new(writer: W, network: &'a Graph) -> Self {
        Self {
            writer,
            network,
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<'a, W: Write> EmbeddingSink for WriterSink<'a, W> {
    fn accept(&mut self, embedding: Embedding) -> Result<()> {
        writeln!(self.writer, "{}", embedding.describe(self.network))?;
        self.count += 1;
        Ok(())
    }
}
