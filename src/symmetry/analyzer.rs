use crate::{
    error::{Error, Result},
    graph::Graph,
    symmetry::{partition::PairPartition, Permutation},
    types::VId,
};
use itertools::Itertools;
use log::debug;

/// The automorphism group of a motif, kept as a set of generators, together
/// with the ordering constraints that select one embedding per equivalence
/// class.
#[derive(Debug, Clone)]
pub struct Symmetry {
    num_vertices: usize,
    generators: Vec<Permutation>,
    orbit_ids: Vec<usize>,
    orbits: Vec<Vec<VId>>,
    constraints: Vec<(VId, VId)>,
    group_order: Option<u128>,
}

impl Symmetry {
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// The generators, in the order they were found.
    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    /// Whether the motif has no automorphism but the identity.
    pub fn is_trivial(&self) -> bool {
        self.generators.is_empty()
    }

    /// The number of automorphisms of the motif, or `None` if it does not
    /// fit in a `u128`.
    pub fn group_order(&self) -> Option<u128> {
        self.group_order
    }

    /// The orbits of the group, each sorted, ordered by their lowest vertex.
    pub fn orbits(&self) -> &[Vec<VId>] {
        &self.orbits
    }

    pub fn orbit_of(&self, vid: VId) -> &[VId] {
        &self.orbits[self.orbit_ids[vid]]
    }

    /// The pairs `(a, b)` such that an accepted embedding `f` must satisfy
    /// `f(a) < f(b)`. The relation is transitively closed and sorted.
    pub fn constraints(&self) -> &[(VId, VId)] {
        &self.constraints
    }

    /// The constraints sorted by the step at which they can first be checked,
    /// i.e. by the position in `order` of whichever vertex is visited last.
    pub fn order_constraints_for(&self, order: &[VId]) -> Vec<(VId, VId)> {
        let mut position = vec![usize::MAX; self.num_vertices];
        for (pos, &v) in order.iter().enumerate() {
            position[v] = pos;
        }
        let mut constraints = self.constraints.clone();
        constraints.sort_by_key(|&(a, b)| {
            (
                std::cmp::max(position[a], position[b]),
                std::cmp::min(position[a], position[b]),
            )
        });
        constraints
    }

    /// Checks whether a complete assignment of network vertices to motif
    /// positions satisfies every ordering constraint.
    pub fn is_canonical(&self, assignment: &[VId]) -> bool {
        self.constraints
            .iter()
            .all(|&(a, b)| assignment[a] < assignment[b])
    }
}

/// Computes the automorphism group of `motif` and its symmetry-breaking
/// constraints.
///
/// The result only depends on the vertex numbering of `motif`. Fails with
/// [`Error::UnsupportedMotif`] if the motif has no vertices.
pub fn analyze(motif: &Graph) -> Result<Symmetry> {
    if motif.is_empty() {
        return Err(Error::UnsupportedMotif(format!(
            "motif `{}` has no vertices",
            motif.name()
        )));
    }
    let mut analyzer = Analyzer::new(motif);
    let opp = PairPartition::new(motif);
    analyzer.search(&opp, true);
    Ok(analyzer.finish())
}

/// Computes a generating set of the automorphism group of `motif`.
pub fn compute_generators(motif: &Graph) -> Result<Vec<Permutation>> {
    analyze(motif).map(|symmetry| symmetry.generators)
}

/// The backtracking search over ordered pair partitions.
///
/// The main branch only couples vertices with themselves; it finds the
/// generators of every stabilizer along the way, deepest first. Every other
/// branch stops at the first automorphism it finds.
struct Analyzer<'a> {
    motif: &'a Graph,
    parents: Vec<VId>,
    generators: Vec<Permutation>,
    constraints: Vec<(VId, VId)>,
    group_order: Option<u128>,
}

impl<'a> Analyzer<'a> {
    fn new(motif: &'a Graph) -> Self {
        Self {
            motif,
            parents: motif.all_vertices().collect(),
            generators: Vec::new(),
            constraints: Vec::new(),
            group_order: Some(1),
        }
    }

    fn search(&mut self, opp: &PairPartition, main: bool) -> bool {
        if let Some(perm) = opp.permutation() {
            if perm.is_identity() || !perm.is_automorphism(self.motif) {
                return false;
            }
            self.record(perm);
            return true;
        }
        let (cell, top) = match opp.split_vertex() {
            Some(split) => split,
            None => return false,
        };
        let mut candidates = opp.bottom(cell).to_vec();
        if let Some(pos) = candidates.iter().position(|&b| b == top) {
            candidates.remove(pos);
            candidates.insert(0, top);
        }
        for bottom in candidates {
            if main && bottom != top && self.find(bottom) == self.find(top) {
                continue;
            }
            let found = match opp.couple(self.motif, cell, top, bottom) {
                Some(child) => self.search(&child, main && bottom == top),
                None => false,
            };
            if found && !main {
                return true;
            }
        }
        if main {
            let orbit = self.orbit(top);
            self.group_order = self
                .group_order
                .and_then(|order| order.checked_mul(orbit.len() as u128));
            self.constraints
                .extend(orbit.into_iter().filter(|&w| w != top).map(|w| (top, w)));
        }
        false
    }

    fn finish(self) -> Symmetry {
        let n = self.motif.num_vertices();
        let mut orbit_ids = vec![usize::MAX; n];
        let mut orbits: Vec<Vec<VId>> = Vec::new();
        for v in 0..n {
            let root = find(&self.parents, v);
            if orbit_ids[root] == usize::MAX {
                orbit_ids[root] = orbits.len();
                orbits.push(Vec::new());
            }
            orbit_ids[v] = orbit_ids[root];
            orbits[orbit_ids[v]].push(v);
        }
        let constraints = transitive_closure(n, &self.constraints);
        debug!(
            "symmetry of {}: {} generators, orbits [{}], constraints [{}]",
            self.motif.name(),
            self.generators.len(),
            orbits.iter().map(|o| format!("{{{}}}", o.iter().join(", "))).join(", "),
            constraints
                .iter()
                .map(|(a, b)| format!("{} < {}", a, b))
                .join(", ")
        );
        Symmetry {
            num_vertices: n,
            generators: self.generators,
            orbit_ids,
            orbits,
            constraints,
            group_order: self.group_order,
        }
    }
}

// private methods
impl<'a> Analyzer<'a> {
    fn record(&mut self, perm: Permutation) {
        debug!("generator: {}", perm);
        for v in self.motif.all_vertices() {
            self.union(v, perm.apply(v));
        }
        self.generators.push(perm);
    }

    fn find(&mut self, v: VId) -> VId {
        let root = find(&self.parents, v);
        let mut v = v;
        while self.parents[v] != root {
            let next = self.parents[v];
            self.parents[v] = root;
            v = next;
        }
        root
    }

    fn union(&mut self, u: VId, v: VId) {
        let (ru, rv) = (self.find(u), self.find(v));
        if ru < rv {
            self.parents[rv] = ru;
        } else if rv < ru {
            self.parents[ru] = rv;
        }
    }

    fn orbit(&mut self, v: VId) -> Vec<VId> {
        let root = self.find(v);
        self.motif
            .all_vertices()
            .filter(|&w| self.find(w) == root)
            .collect()
    }
}

fn find(parents: &[VId], mut v: VId) -> VId {
    while parents[v] != v {
        v = parents[v];
    }
    v
}

fn transitive_closure(n: usize, pairs: &[(VId, VId)]) -> Vec<(VId, VId)> {
    let mut less = vec![vec![false; n]; n];
    for &(a, b) in pairs {
        less[a][b] = true;
    }
    for k in 0..n {
        for i in 0..n {
            if less[i][k] {
                for j in 0..n {
                    if less[k][j] {
                        less[i][j] = true;
                    }
                }
            }
        }
    }
    (0..n)
        .cartesian_product(0..n)
        .filter(|&(a, b)| less[a][b])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LinkAlphabet, LinkType};

    fn create_alphabet() -> LinkAlphabet {
        let mut alphabet = LinkAlphabet::new();
        alphabet.add(LinkType::new('A', false)).unwrap();
        alphabet.add(LinkType::new('B', true)).unwrap();
        alphabet
    }

    fn create_graph(n: usize, edges: &[(usize, usize, char)]) -> Graph {
        Graph::load(
            "motif",
            &create_alphabet(),
            (0..n).map(|v| v.to_string()),
            edges
                .iter()
                .map(|&(u, v, t)| (u.to_string(), v.to_string(), t)),
        )
        .unwrap()
    }

    #[test]
    fn test_empty() {
        match analyze(&create_graph(0, &[])) {
            Err(Error::UnsupportedMotif(_)) => (),
            _ => assert!(false),
        }
    }

    #[test]
    fn test_single_vertex() {
        let symmetry = analyze(&create_graph(1, &[])).unwrap();
        assert!(symmetry.is_trivial());
        assert_eq!(symmetry.group_order(), Some(1));
        assert!(symmetry.constraints().is_empty());
    }

    #[test]
    fn test_edge() {
        let symmetry = analyze(&create_graph(2, &[(0, 1, 'A')])).unwrap();
        assert_eq!(symmetry.group_order(), Some(2));
        assert_eq!(symmetry.constraints(), &[(0, 1)]);
        assert_eq!(symmetry.orbits(), &[vec![0, 1]]);
        let symmetry = analyze(&create_graph(2, &[(0, 1, 'B')])).unwrap();
        assert!(symmetry.is_trivial());
        assert_eq!(symmetry.orbits(), &[vec![0], vec![1]]);
    }

    #[test]
    fn test_star() {
        let g = create_graph(4, &[(0, 1, 'A'), (0, 2, 'A'), (0, 3, 'A')]);
        let symmetry = analyze(&g).unwrap();
        assert_eq!(symmetry.group_order(), Some(6));
        assert_eq!(symmetry.orbits(), &[vec![0], vec![1, 2, 3]]);
        assert_eq!(symmetry.orbit_of(2), &[1, 2, 3]);
        assert_eq!(symmetry.constraints(), &[(1, 2), (1, 3), (2, 3)]);
        assert!(symmetry.generators().iter().all(|p| p.is_automorphism(&g)));
        assert_eq!(compute_generators(&g).unwrap(), symmetry.generators());
    }

    #[test]
    fn test_square() {
        let g = create_graph(4, &[(0, 1, 'A'), (1, 2, 'A'), (2, 3, 'A'), (3, 0, 'A')]);
        let symmetry = analyze(&g).unwrap();
        assert_eq!(symmetry.group_order(), Some(8));
        assert_eq!(symmetry.orbits(), &[vec![0, 1, 2, 3]]);
        // 0 is the least vertex, and 1 comes before its mirror image 3.
        assert_eq!(symmetry.constraints(), &[(0, 1), (0, 2), (0, 3), (1, 3)]);
        assert!(symmetry.is_canonical(&[10, 11, 12, 13]));
        assert!(!symmetry.is_canonical(&[10, 13, 12, 11]));
    }

    #[test]
    fn test_directed_path() {
        // 0 -> 1 <- 2: the two sources can be swapped.
        let g = create_graph(3, &[(0, 1, 'B'), (2, 1, 'B')]);
        let symmetry = analyze(&g).unwrap();
        assert_eq!(symmetry.group_order(), Some(2));
        assert_eq!(symmetry.generators().len(), 1);
        assert_eq!(symmetry.generators()[0].images(), &[2, 1, 0]);
        assert_eq!(symmetry.constraints(), &[(0, 2)]);
        // 0 -> 1 -> 2 has no symmetry.
        let g = create_graph(3, &[(0, 1, 'B'), (1, 2, 'B')]);
        assert!(analyze(&g).unwrap().is_trivial());
    }

    #[test]
    fn test_large_star() {
        let edges: Vec<(usize, usize, char)> = (1..36).map(|v| (0, v, 'A')).collect();
        let g = create_graph(36, &edges);
        let symmetry = analyze(&g).unwrap();
        // 35! does not fit in a u128.
        assert_eq!(symmetry.group_order(), None);
        assert_eq!(symmetry.orbits().len(), 2);
        assert_eq!(symmetry.orbit_of(35).len(), 35);
        assert_eq!(symmetry.constraints().len(), 35 * 34 / 2);
        assert!(symmetry.constraints().iter().all(|&(a, b)| 0 < a && a < b));
    }

    #[test]
    fn test_order_constraints() {
        let g = create_graph(4, &[(0, 1, 'A'), (0, 2, 'A'), (0, 3, 'A')]);
        let symmetry = analyze(&g).unwrap();
        assert_eq!(
            symmetry.order_constraints_for(&[3, 0, 2, 1]),
            vec![(2, 3), (1, 3), (1, 2)]
        );
    }
}
