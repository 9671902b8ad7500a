//! Various types related to motif matching.

/// The vertex id type.
///
/// Vertex ids are dense slots `0..num_vertices` owned by a single graph.
pub type VId = usize;

/// The edge label type: an index into the link alphabet.
pub type ELabel = u16;

/// How a link is seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    /// The vertex is the source of a directed link.
    Out,
    /// The vertex is the target of a directed link.
    In,
    /// The link is undirected.
    Both,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
            Direction::Both => Direction::Both,
        }
    }
}

/// A typed link as seen from one endpoint.
///
/// A directed link `u -> v` of type `e` is stored as `Link { e, Out }` at `u` and
/// `Link { e, In }` at `v`; an undirected one as `Link { e, Both }` at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Link {
    pub elabel: ELabel,
    pub direction: Direction,
}

impl Link {
    pub fn new(elabel: ELabel, direction: Direction) -> Self {
        Self { elabel, direction }
    }

    /// The same link seen from the other endpoint.
    pub fn reverse(self) -> Self {
        Self {
            elabel: self.elabel,
            direction: self.direction.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse() {
        assert_eq!(Link::new(1, Direction::Out).reverse(), Link::new(1, Direction::In));
        assert_eq!(Link::new(1, Direction::In).reverse(), Link::new(1, Direction::Out));
        assert_eq!(Link::new(2, Direction::Both).reverse(), Link::new(2, Direction::Both));
    }
}
