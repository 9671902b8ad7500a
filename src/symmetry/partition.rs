use crate::{
    graph::{Graph, Signature},
    symmetry::Permutation,
    types::{Link, VId},
};
use std::collections::BTreeMap;

/// The refinement key of a vertex: its current color and the sorted multiset
/// of `(link, neighbor color)` around it.
type Key = (usize, Vec<(Link, usize)>);

/// An ordered pair partition of the motif vertices.
///
/// The `top` and `bottom` partitions have the same number of cells and the
/// cells at the same position have the same size. Every automorphism that
/// agrees with the couplings made so far maps the i-th top cell onto the i-th
/// bottom cell. Cells are kept sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PairPartition {
    top: Vec<Vec<VId>>,
    bottom: Vec<Vec<VId>>,
}

impl PairPartition {
    /// Colors the vertices by signature and refines until equitable.
    pub fn new(graph: &Graph) -> Self {
        let mut cells: BTreeMap<Signature, Vec<VId>> = BTreeMap::new();
        for v in graph.all_vertices() {
            cells.entry(graph.signature(v)).or_default().push(v);
        }
        let cells: Vec<Vec<VId>> = cells.into_iter().map(|(_, vs)| vs).collect();
        let mut partition = Self {
            top: cells.clone(),
            bottom: cells,
        };
        // Both sides are equal, so the refinement cannot fail.
        partition.refine(graph);
        partition
    }

    pub fn num_cells(&self) -> usize {
        self.top.len()
    }

    pub fn top(&self, cell: usize) -> &[VId] {
        &self.top[cell]
    }

    pub fn bottom(&self, cell: usize) -> &[VId] {
        &self.bottom[cell]
    }

    pub fn is_discrete(&self) -> bool {
        self.top.iter().all(|cell| cell.len() == 1)
    }

    /// The permutation mapping every top vertex on the bottom vertex of the
    /// same cell, if the partition is discrete.
    pub fn permutation(&self) -> Option<Permutation> {
        if !self.is_discrete() {
            return None;
        }
        let mut images = vec![0; self.top.len()];
        for (top, bottom) in self.top.iter().zip(&self.bottom) {
            images[top[0]] = bottom[0];
        }
        Permutation::new(images)
    }

    /// The lowest vertex in a non-singleton top cell, with its cell.
    pub fn split_vertex(&self) -> Option<(usize, VId)> {
        self.top
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.len() > 1)
            .map(|(pos, cell)| (pos, cell[0]))
            .min_by_key(|&(_, v)| v)
    }

    /// Couples `top` with `bottom` (both taken from `cell`) and refines.
    ///
    /// Returns `None` if no automorphism can extend the coupling.
    pub fn couple(&self, graph: &Graph, cell: usize, top: VId, bottom: VId) -> Option<Self> {
        let mut next = self.clone();
        next.top[cell].retain(|&v| v != top);
        next.bottom[cell].retain(|&v| v != bottom);
        next.top.push(vec![top]);
        next.bottom.push(vec![bottom]);
        if next.refine(graph) {
            Some(next)
        } else {
            None
        }
    }
}

// private methods
impl PairPartition {
    /// Splits cells by neighborhood until the partition is equitable.
    ///
    /// Returns `false` as soon as the two sides stop corresponding.
    fn refine(&mut self, graph: &Graph) -> bool {
        loop {
            let num_cells = self.top.len();
            let top = split(graph, &self.top);
            let bottom = split(graph, &self.bottom);
            if top.len() != bottom.len()
                || top
                    .iter()
                    .zip(&bottom)
                    .any(|((tk, tv), (bk, bv))| tk != bk || tv.len() != bv.len())
            {
                return false;
            }
            self.top = top.into_iter().map(|(_, vs)| vs).collect();
            self.bottom = bottom.into_iter().map(|(_, vs)| vs).collect();
            if self.top.len() == num_cells {
                return true;
            }
        }
    }
}

fn split(graph: &Graph, cells: &[Vec<VId>]) -> BTreeMap<Key, Vec<VId>> {
    let mut colors = vec![0; graph.num_vertices()];
    for (color, cell) in cells.iter().enumerate() {
        for &v in cell {
            colors[v] = color;
        }
    }
    let mut split: BTreeMap<Key, Vec<VId>> = BTreeMap::new();
    for (color, cell) in cells.iter().enumerate() {
        for &v in cell {
            let mut around: Vec<(Link, usize)> =
                graph.links(v).map(|(link, n)| (link, colors[n])).collect();
            around.sort_unstable();
            split.entry((color, around)).or_default().push(v);
        }
    }
    split
}
