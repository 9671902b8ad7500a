use crate::{
    error::{Error, Result},
    executor::{MatchOptions, Matcher, WriterSink},
    front_end::{parse_link_types, parse_motif, read_networks},
    graph::Graph,
    index::CandidateIndex,
    symmetry::{analyze, Symmetry},
    types::VId,
};
use itertools::Itertools;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

/// One run of the tool: reads the networks, searches the motif in each of
/// them and writes the embeddings to `output`.
#[derive(Debug, Clone)]
pub struct Task {
    folder: PathBuf,
    link_types: String,
    networks: Vec<String>,
    motif: String,
    output: PathBuf,
    order: Option<Vec<VId>>,
    parallel: bool,
    separate: bool,
    limit: Option<usize>,
}

impl Task {
    pub fn new(
        folder: impl Into<PathBuf>,
        link_types: &str,
        networks: Vec<String>,
        motif: &str,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            folder: folder.into(),
            link_types: String::from(link_types),
            networks,
            motif: String::from(motif),
            output: output.into(),
            order: None,
            parallel: false,
            separate: false,
            limit: None,
        }
    }

    pub fn order(mut self, order: Option<Vec<VId>>) -> Self {
        self.order = order;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Searches every network file on its own instead of merging them.
    pub fn separate(mut self, separate: bool) -> Self {
        self.separate = separate;
        self
    }

    /// Stops the search of a network after `limit` embeddings.
    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Returns the number of embeddings written.
    pub fn run(&self) -> Result<usize> {
        let start_time = Instant::now();
        let (alphabet, entries) = parse_link_types(&self.link_types)?;
        info!(
            "link types: [{}]",
            alphabet.iter().map(|(_, t)| t.name()).join(", ")
        );
        let networks = read_networks(
            &self.folder,
            &self.networks,
            &alphabet,
            &entries,
            self.separate,
        )?;
        let motif = parse_motif(&self.motif, &alphabet)?;
        let time_now = Instant::now();
        let symmetry = analyze(&motif)?;
        info!(
            "motif {}: {} vertices, {} links, {} generators, group order {}",
            motif.name(),
            motif.num_vertices(),
            motif.num_links(),
            symmetry.generators().len(),
            symmetry
                .group_order()
                .map_or_else(|| String::from("> 2^128"), |order| order.to_string())
        );
        for generator in symmetry.generators() {
            info!("generator: {}", generator);
        }
        info!("analysis_time: {}", time_now.elapsed().as_millis());
        let mut writer = BufWriter::new(File::create(&self.output)?);
        let mut total = 0;
        for network in &networks {
            if self.separate {
                writeln!(writer, "# {}", network.name())?;
            }
            let (count, w) = self.search(&motif, network, &symmetry, writer)?;
            writer = w;
            total += count;
        }
        writer.flush()?;
        info!(
            "{} embeddings written to {}",
            total,
            self.output.display()
        );
        info!("total_time: {}", start_time.elapsed().as_millis());
        Ok(total)
    }
}

// private methods
impl Task {
    fn search<W: Write + Send>(
        &self,
        motif: &Graph,
        network: &Graph,
        symmetry: &Symmetry,
        writer: W,
    ) -> Result<(usize, W)> {
        let time_now = Instant::now();
        let index = CandidateIndex::build(network);
        info!("index_time({}): {}", network.name(), time_now.elapsed().as_millis());
        let mut options = MatchOptions::new().parallel(self.parallel);
        if let Some(order) = &self.order {
            options = options.order(order.clone());
        }
        if let Some(limit) = self.limit {
            options = options.interrupt(move |progress| progress.embeddings >= limit);
        }
        let matcher = Matcher::new(motif, network, symmetry, &index, options)?;
        let mut sink = WriterSink::new(writer, network);
        let time_now = Instant::now();
        match matcher.find_all(&mut sink) {
            Ok(_) => (),
            Err(Error::SearchInterrupted { embeddings }) if self.limit.is_some() => warn!(
                "search in {} stopped after {} embeddings",
                network.name(),
                embeddings
            ),
            Err(e) => return Err(e),
        }
        info!("match_time({}): {}", network.name(), time_now.elapsed().as_millis());
        let count = sink.count();
        Ok((count, sink.finish()?))
    }
}
