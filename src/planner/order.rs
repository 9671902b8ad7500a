use crate::{
    error::{Error, Result},
    graph::Graph,
    index::CandidateIndex,
    types::VId,
};
use std::collections::BTreeMap;

/// The selection value of a motif vertex.
///
/// Higher value will be selected first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct VertexValue {
    neg_size: i64,
    num_connections: usize,
    neg_vid: i64,
}

impl VertexValue {
    fn vid(&self) -> VId {
        -self.neg_vid as VId
    }
}

/// The motif vertices not visited yet, with their selection values.
struct Candidates<'a> {
    motif: &'a Graph,
    index: &'a CandidateIndex,
    sizes: &'a [usize],
    visited: Vec<bool>,
    values: BTreeMap<VId, VertexValue>,
}

impl<'a> Candidates<'a> {
    fn new(motif: &'a Graph, index: &'a CandidateIndex, sizes: &'a [usize]) -> Self {
        let mut candidates = Self {
            motif,
            index,
            sizes,
            visited: vec![false; motif.num_vertices()],
            values: BTreeMap::new(),
        };
        for u in motif.all_vertices() {
            candidates.update(u);
        }
        candidates
    }

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Estimates the candidate set of `u` from the initial candidates and the
    /// links to visited vertices, rounded up.
    fn update(&mut self, u: VId) {
        let mut size = self.sizes[u] as f64;
        let mut num_connections = 0;
        for (link, n) in self.motif.links(u) {
            if self.visited[n] {
                num_connections += 1;
                size = size.min(self.index.estimate(link.reverse()));
            }
        }
        self.values.insert(
            u,
            VertexValue {
                neg_size: -(size.ceil() as i64),
                num_connections,
                neg_vid: -(u as i64),
            },
        );
    }

    fn elect(&mut self) -> Option<VId> {
        let root = self.values.values().max().map(|value| value.vid())?;
        self.values.remove(&root);
        self.visited[root] = true;
        let motif = self.motif;
        for (_, n) in motif.links(root) {
            if !self.visited[n] {
                self.update(n);
            }
        }
        Some(root)
    }
}

/// Returns the order in which the motif vertices are assigned.
///
/// Always picks the vertex with the smallest estimated candidate set next,
/// preferring vertices with more links to the vertices picked before, then
/// the lowest id. `sizes` holds the number of initial candidates per vertex.
pub fn visiting_order(motif: &Graph, index: &CandidateIndex, sizes: &[usize]) -> Vec<VId> {
    let mut order = Vec::with_capacity(motif.num_vertices());
    let mut candidates = Candidates::new(motif, index, sizes);
    while !candidates.is_empty() {
        if let Some(root) = candidates.elect() {
            order.push(root);
        }
    }
    order
}

/// Checks that `order` lists every motif vertex exactly once.
pub fn check_order(motif: &Graph, order: &[VId]) -> Result<()> {
    if order.len() != motif.num_vertices() {
        return Err(Error::InvalidOrder(format!(
            "{} vertices given, the motif has {}",
            order.len(),
            motif.num_vertices()
        )));
    }
    let mut seen = vec![false; motif.num_vertices()];
    for &v in order {
        if v >= seen.len() {
            return Err(Error::InvalidOrder(format!("unknown motif vertex {}", v)));
        }
        if seen[v] {
            return Err(Error::InvalidOrder(format!("motif vertex {} is repeated", v)));
        }
        seen[v] = true;
    }
    Ok(())
}
