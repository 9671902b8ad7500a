use crate::{graph::Graph, types::VId};
use itertools::Itertools;

/// A bijection on the motif vertices, stored as the image of every vertex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Permutation {
    images: Vec<VId>,
}

impl Permutation {
    pub fn identity(len: usize) -> Self {
        Self {
            images: (0..len).collect(),
        }
    }

    /// Creates a permutation from its images, or `None` if they are not a bijection.
    pub fn new(images: Vec<VId>) -> Option<Self> {
        let mut seen = vec![false; images.len()];
        for &v in &images {
            if v >= images.len() || seen[v] {
                return None;
            }
            seen[v] = true;
        }
        Some(Self { images })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[VId] {
        &self.images
    }

    pub fn apply(&self, vid: VId) -> VId {
        self.images[vid]
    }

    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(v, &w)| v == w)
    }

    /// Returns `self ∘ other`, i.e. `other` is applied first.
    pub fn compose(&self, other: &Permutation) -> Self {
        Self {
            images: other.images.iter().map(|&v| self.images[v]).collect(),
        }
    }

    pub fn inverse(&self) -> Self {
        let mut images = vec![0; self.images.len()];
        for (v, &w) in self.images.iter().enumerate() {
            images[w] = v;
        }
        Self { images }
    }

    /// The vertices moved by the permutation.
    pub fn support(&self) -> impl Iterator<Item = VId> + '_ {
        self.images
            .iter()
            .enumerate()
            .filter(|&(v, &w)| v != w)
            .map(|(v, _)| v)
    }

    /// Checks whether the permutation maps every link of `graph` onto a link
    /// of the same type and direction.
    pub fn is_automorphism(&self, graph: &Graph) -> bool {
        self.images.len() == graph.num_vertices()
            && graph.all_vertices().all(|v| {
                graph
                    .links(v)
                    .all(|(link, n)| graph.has_link(self.apply(v), link, self.apply(n)))
            })
    }
}

impl std::fmt::Display for Permutation {
    /// Writes the permutation in cycle notation, e.g. `(0 1)(2 3)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut visited = vec![false; self.images.len()];
        let mut any = false;
        for start in 0..self.images.len() {
            if visited[start] || self.images[start] == start {
                continue;
            }
            let mut cycle = vec![start];
            visited[start] = true;
            let mut v = self.images[start];
            while v != start {
                visited[v] = true;
                cycle.push(v);
                v = self.images[v];
            }
            write!(f, "({})", cycle.iter().join(" "))?;
            any = true;
        }
        if !any {
            write!(f, "()")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LinkAlphabet, LinkType};

    #[test]
    fn test_new() {
        assert!(Permutation::new(vec![1, 0, 2]).is_some());
        assert!(Permutation::new(vec![1, 1, 2]).is_none());
        assert!(Permutation::new(vec![0, 3, 1]).is_none());
        assert!(Permutation::identity(4).is_identity());
    }

    #[test]
    fn test_compose_inverse() {
        let p = Permutation::new(vec![1, 2, 0]).unwrap();
        let q = Permutation::new(vec![1, 0, 2]).unwrap();
        assert_eq!(p.compose(&q).images(), &[2, 1, 0]);
        assert_eq!(q.compose(&p).images(), &[0, 2, 1]);
        assert!(p.compose(&p.inverse()).is_identity());
        assert_eq!(p.support().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(q.support().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_display() {
        let p = Permutation::new(vec![1, 0, 3, 4, 2]).unwrap();
        assert_eq!(p.to_string(), "(0 1)(2 3 4)");
        assert_eq!(Permutation::identity(2).to_string(), "()");
    }

    #[test]
    fn test_is_automorphism() {
        let mut alphabet = LinkAlphabet::new();
        alphabet.add(LinkType::new('B', true)).unwrap();
        let path = Graph::load(
            "path",
            &alphabet,
            vec!["0", "1", "2"],
            vec![("0", "1", 'B'), ("2", "1", 'B')],
        )
        .unwrap();
        assert!(Permutation::new(vec![2, 1, 0]).unwrap().is_automorphism(&path));
        assert!(!Permutation::new(vec![1, 0, 2]).unwrap().is_automorphism(&path));
        assert!(!Permutation::identity(2).is_automorphism(&path));
    }
}
