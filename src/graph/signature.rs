use crate::{
    graph::Graph,
    types::{Link, VId},
};
use itertools::Itertools;

/// How a vertex uses one link: how many neighbors it reaches over the link and
/// the largest degree among those neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkDegree {
    pub link: Link,
    pub count: usize,
    pub max_neighbor_degree: usize,
}

/// The local signature of a vertex.
///
/// Isomorphic neighborhoods have the same signature. A motif vertex can only
/// be mapped on a network vertex whose signature dominates its own, so the
/// signature is used for pruning, never for identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    entries: Vec<LinkDegree>,
}

impl Signature {
    pub fn new(graph: &Graph, vid: VId) -> Self {
        let entries = graph
            .links(vid)
            .group_by(|&(link, _)| link)
            .into_iter()
            .map(|(link, group)| {
                let (count, max_neighbor_degree) = group.fold((0, 0), |(count, max), (_, n)| {
                    (count + 1, std::cmp::max(max, graph.degree(n)))
                });
                LinkDegree {
                    link,
                    count,
                    max_neighbor_degree,
                }
            })
            .collect();
        Self { entries }
    }

    /// The entries, sorted by link.
    pub fn entries(&self) -> &[LinkDegree] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn degree(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn get(&self, link: Link) -> Option<&LinkDegree> {
        self.entries
            .binary_search_by_key(&link, |e| e.link)
            .ok()
            .map(|pos| &self.entries[pos])
    }

    /// Checks whether every requirement of `self` is met by `other`.
    pub fn is_dominated_by(&self, other: &Signature) -> bool {
        self.entries.iter().all(|required| match other.get(required.link) {
            Some(offered) => {
                offered.count >= required.count
                    && offered.max_neighbor_degree >= required.max_neighbor_degree
            }
            None => false,
        })
    }
}
