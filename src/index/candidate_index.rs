use crate::{
    graph::{Graph, Signature},
    types::{Link, VId},
};
use log::info;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

/// Per-link vertex lists and per-vertex signatures of a network.
///
/// Built once and never changed afterwards, so it can be shared by parallel
/// searches.
pub struct CandidateIndex {
    num_vertices: usize,
    signatures: Vec<Signature>,
    by_link: BTreeMap<Link, Vec<VId>>,
    num_links: BTreeMap<Link, usize>,
}

impl CandidateIndex {
    pub fn build(network: &Graph) -> Self {
        let time_now = Instant::now();
        let signatures: Vec<Signature> = network
            .all_vertices()
            .into_par_iter()
            .map(|v| network.signature(v))
            .collect();
        let mut by_link: BTreeMap<Link, Vec<VId>> = BTreeMap::new();
        let mut num_links: BTreeMap<Link, usize> = BTreeMap::new();
        for (v, signature) in signatures.iter().enumerate() {
            for entry in signature.entries() {
                by_link.entry(entry.link).or_default().push(v);
                *num_links.entry(entry.link).or_default() += entry.count;
            }
        }
        info!(
            "index of {}: {} link kinds, {} ms",
            network.name(),
            by_link.len(),
            time_now.elapsed().as_millis()
        );
        Self {
            num_vertices: network.num_vertices(),
            signatures,
            by_link,
            num_links,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// The sorted network vertices with at least one incident `link`.
    pub fn vertices_with(&self, link: Link) -> &[VId] {
        self.by_link.get(&link).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The average number of neighbors reached over `link` by a vertex that
    /// has such a link, or `0.0` if no vertex has one.
    pub fn estimate(&self, link: Link) -> f64 {
        match (self.by_link.get(&link), self.num_links.get(&link)) {
            (Some(vs), Some(&count)) if !vs.is_empty() => count as f64 / vs.len() as f64,
            _ => 0.0,
        }
    }

    pub fn signature(&self, vid: VId) -> &Signature {
        &self.signatures[vid]
    }

    /// The sorted network vertices whose signature dominates the signature of
    /// `motif_vertex` in `motif`.
    ///
    /// Every vertex that a true embedding maps `motif_vertex` on is included;
    /// a motif vertex without links gets every network vertex.
    pub fn initial_candidates(&self, motif_vertex: VId, motif: &Graph) -> Vec<VId> {
        let required = motif.signature(motif_vertex);
        let rarest = required
            .entries()
            .iter()
            .min_by_key(|entry| self.vertices_with(entry.link).len());
        match rarest {
            None => (0..self.num_vertices).collect(),
            Some(entry) => self
                .vertices_with(entry.link)
                .iter()
                .copied()
                .filter(|&v| required.is_dominated_by(&self.signatures[v]))
                .collect(),
        }
    }
}

impl std::fmt::Debug for CandidateIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.by_link.iter().map(|(link, vs)| (link, vs.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::{LinkAlphabet, LinkType},
        types::Direction,
    };

    fn create_alphabet() -> LinkAlphabet {
        let mut alphabet = LinkAlphabet::new();
        alphabet.add(LinkType::new('A', false)).unwrap();
        alphabet.add(LinkType::new('B', true)).unwrap();
        alphabet
    }

    fn create_network() -> Graph {
        Graph::load(
            "network",
            &create_alphabet(),
            vec!["a", "b", "c", "d", "e"],
            vec![
                ("a", "b", 'A'),
                ("a", "c", 'A'),
                ("a", "d", 'A'),
                ("b", "c", 'B'),
                ("d", "c", 'B'),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build() {
        let index = CandidateIndex::build(&create_network());
        assert_eq!(index.num_vertices(), 5);
        assert_eq!(index.vertices_with(Link::new(0, Direction::Both)), &[0, 1, 2, 3]);
        assert_eq!(index.vertices_with(Link::new(1, Direction::Out)), &[1, 3]);
        assert_eq!(index.vertices_with(Link::new(1, Direction::In)), &[2]);
        assert_eq!(index.estimate(Link::new(1, Direction::In)), 2.0);
        assert_eq!(index.estimate(Link::new(0, Direction::Both)), 1.5);
        assert_eq!(index.estimate(Link::new(2, Direction::Both)), 0.0);
    }

    #[test]
    fn test_initial_candidates() {
        let network = create_network();
        let index = CandidateIndex::build(&network);
        let motif = Graph::load(
            "motif",
            &create_alphabet(),
            vec!["0", "1", "2"],
            vec![("0", "1", 'B'), ("2", "1", 'A')],
        )
        .unwrap();
        assert_eq!(index.initial_candidates(0, &motif), vec![1, 3]);
        assert_eq!(index.initial_candidates(1, &motif), vec![2]);
        assert_eq!(index.initial_candidates(2, &motif), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_isolated_vertex() {
        let network = create_network();
        let index = CandidateIndex::build(&network);
        let motif = Graph::load(
            "motif",
            &create_alphabet(),
            vec!["0"],
            Vec::<(&str, &str, char)>::new(),
        )
        .unwrap();
        assert_eq!(
            index.initial_candidates(0, &motif),
            network.all_vertices().collect::<Vec<_>>()
        );
    }
}
