use crate::{
    error::{Error, Result},
    graph::{LinkAlphabet, Signature},
    types::{Direction, ELabel, Link, VId},
};
use rayon::slice::ParallelSliceMut;
use std::collections::HashMap;
use std::ops::Range;

/// Incrementally collects the vertices and links of a [`Graph`].
///
/// Vertices get dense ids in insertion order.
pub struct GraphBuilder {
    name: String,
    alphabet: LinkAlphabet,
    names: Vec<String>,
    ids: HashMap<String, VId>,
    entries: Vec<(VId, Link, VId)>,
}

impl GraphBuilder {
    pub fn new(name: &str, alphabet: &LinkAlphabet) -> Self {
        Self {
            name: String::from(name),
            alphabet: alphabet.clone(),
            names: Vec::new(),
            ids: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Returns the id of the vertex called `name`, adding it if necessary.
    pub fn add_vertex(&mut self, name: &str) -> VId {
        if let Some(&vid) = self.ids.get(name) {
            return vid;
        }
        let vid = self.names.len();
        self.names.push(String::from(name));
        self.ids.insert(String::from(name), vid);
        vid
    }

    pub fn vertex(&self, name: &str) -> Option<VId> {
        self.ids.get(name).copied()
    }

    pub fn num_vertices(&self) -> usize {
        self.names.len()
    }

    pub fn alphabet(&self) -> &LinkAlphabet {
        &self.alphabet
    }

    /// Adds a link of type `token` from `src` to `dst`.
    ///
    /// The direction is taken from the alphabet; for undirected types the order
    /// of `src` and `dst` does not matter.
    pub fn add_link(&mut self, src: VId, dst: VId, token: char) -> Result<()> {
        let elabel = self.alphabet.elabel(token).ok_or_else(|| {
            Error::MalformedGraph(format!(
                "{}: unknown link type `{}` on edge ({}, {})",
                self.name, token, src, dst
            ))
        })?;
        for &v in &[src, dst] {
            if v >= self.names.len() {
                return Err(Error::MalformedGraph(format!(
                    "{}: edge ({}, {}) references unknown vertex {}",
                    self.name, src, dst, v
                )));
            }
        }
        self.push_link(src, dst, elabel);
        Ok(())
    }

    pub fn build(self) -> Graph {
        let GraphBuilder {
            name,
            alphabet,
            names,
            ids,
            mut entries,
        } = self;
        entries.par_sort_unstable();
        entries.dedup();
        let mut offsets = vec![0; names.len() + 1];
        for &(v, _, _) in &entries {
            offsets[v + 1] += 1;
        }
        for v in 0..names.len() {
            offsets[v + 1] += offsets[v];
        }
        let (link_keys, targets): (Vec<Link>, Vec<VId>) =
            entries.into_iter().map(|(_, l, n)| (l, n)).unzip();
        Graph {
            name,
            alphabet,
            names,
            ids,
            offsets,
            link_keys,
            targets,
        }
    }
}

// private methods
impl GraphBuilder {
    fn forward_link(&self, elabel: ELabel) -> Link {
        let directed = self.alphabet.get(elabel).map_or(false, |t| t.is_directed());
        Link::new(
            elabel,
            if directed {
                Direction::Out
            } else {
                Direction::Both
            },
        )
    }

    fn push_link(&mut self, src: VId, dst: VId, elabel: ELabel) {
        let link = self.forward_link(elabel);
        self.entries.push((src, link, dst));
        self.entries.push((dst, link.reverse(), src));
    }
}

/// A labeled graph, used for both the motif and the network.
///
/// The adjacency is stored in compressed rows: the incident links of every
/// vertex are sorted by `(link, neighbor)`, so the neighbors of a vertex over a
/// given link form one sorted slice. A graph never changes after it is built.
pub struct Graph {
    name: String,
    alphabet: LinkAlphabet,
    names: Vec<String>,
    ids: HashMap<String, VId>,
    offsets: Vec<usize>,
    link_keys: Vec<Link>,
    targets: Vec<VId>,
}

impl Graph {
    /// Loads a graph from its vertex names and its `(source, target, type)` edges.
    ///
    /// Fails with [`Error::MalformedGraph`] if a vertex is declared twice, an edge
    /// references an undeclared vertex, or a type token is not in `alphabet`.
    /// Repeated edges of the same type are merged.
    pub fn load<V, S, E, T>(
        name: &str,
        alphabet: &LinkAlphabet,
        vertices: V,
        edges: E,
    ) -> Result<Self>
    where
        V: IntoIterator<Item = S>,
        S: AsRef<str>,
        E: IntoIterator<Item = (T, T, char)>,
        T: AsRef<str>,
    {
        let mut builder = GraphBuilder::new(name, alphabet);
        for vertex in vertices {
            let vertex = vertex.as_ref();
            if builder.vertex(vertex).is_some() {
                return Err(Error::MalformedGraph(format!(
                    "{}: vertex `{}` is declared twice",
                    name, vertex
                )));
            }
            builder.add_vertex(vertex);
        }
        for (src, dst, token) in edges {
            let (src, dst) = (src.as_ref(), dst.as_ref());
            match (builder.vertex(src), builder.vertex(dst)) {
                (Some(u), Some(v)) => builder.add_link(u, v, token)?,
                (None, _) | (_, None) => {
                    return Err(Error::MalformedGraph(format!(
                        "{}: edge ({}, {}, {}) references an unknown vertex",
                        name, src, dst, token
                    )))
                }
            }
        }
        Ok(builder.build())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alphabet(&self) -> &LinkAlphabet {
        &self.alphabet
    }

    pub fn num_vertices(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The number of links, counting every undirected or directed edge once.
    pub fn num_links(&self) -> usize {
        self.link_keys.len() / 2
    }

    pub fn all_vertices(&self) -> Range<VId> {
        0..self.names.len()
    }

    pub fn vertex(&self, name: &str) -> Option<VId> {
        self.ids.get(name).copied()
    }

    pub fn vertex_name(&self, vid: VId) -> &str {
        &self.names[vid]
    }

    /// The number of incident `(link, neighbor)` pairs of `vid`.
    pub fn degree(&self, vid: VId) -> usize {
        self.offsets[vid + 1] - self.offsets[vid]
    }

    /// Iterates over the incident links of `vid`, sorted by link then neighbor.
    pub fn links(&self, vid: VId) -> impl Iterator<Item = (Link, VId)> + '_ {
        let range = self.offsets[vid]..self.offsets[vid + 1];
        self.link_keys[range.clone()]
            .iter()
            .copied()
            .zip(self.targets[range].iter().copied())
    }

    /// The sorted neighbors reached from `vid` over `link`.
    pub fn neighbors(&self, vid: VId, link: Link) -> &[VId] {
        let range = self.link_range(vid, link);
        &self.targets[range]
    }

    pub fn link_degree(&self, vid: VId, link: Link) -> usize {
        self.link_range(vid, link).len()
    }

    pub fn has_link(&self, u: VId, link: Link, v: VId) -> bool {
        self.neighbors(u, link).binary_search(&v).is_ok()
    }

    pub fn signature(&self, vid: VId) -> Signature {
        Signature::new(self, vid)
    }
}

// private methods
impl Graph {
    fn link_range(&self, vid: VId, link: Link) -> Range<usize> {
        let (start, end) = (self.offsets[vid], self.offsets[vid + 1]);
        let keys = &self.link_keys[start..end];
        let lo = keys.partition_point(|&l| l < link);
        let hi = lo + keys[lo..].partition_point(|&l| l == link);
        start + lo..start + hi
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph {{ name: {:?}, vertices: {}, links: {} }}",
            self.name,
            self.num_vertices(),
            self.num_links()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkType;

    fn create_alphabet() -> LinkAlphabet {
        let mut alphabet = LinkAlphabet::new();
        alphabet.add(LinkType::new('A', false)).unwrap();
        alphabet.add(LinkType::new('B', true)).unwrap();
        alphabet
    }

    fn create_triangle() -> Graph {
        Graph::load(
            "triangle",
            &create_alphabet(),
            vec!["x", "y", "z"],
            vec![("x", "y", 'A'), ("y", "z", 'A'), ("x", "z", 'B')],
        )
        .unwrap()
    }

    #[test]
    fn test_triangle() {
        let g = create_triangle();
        assert_eq!(g.num_vertices(), 3);
        assert_eq!(g.num_links(), 3);
        assert_eq!(g.all_vertices().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(g.vertex("z"), Some(2));
        assert_eq!(g.vertex_name(1), "y");
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(1), 2);
    }

    #[test]
    fn test_neighbors() {
        let g = create_triangle();
        let a = Link::new(0, Direction::Both);
        let b_out = Link::new(1, Direction::Out);
        let b_in = Link::new(1, Direction::In);
        assert_eq!(g.neighbors(1, a), &[0, 2]);
        assert_eq!(g.neighbors(0, b_out), &[2]);
        assert_eq!(g.neighbors(0, b_in), &[] as &[VId]);
        assert_eq!(g.neighbors(2, b_in), &[0]);
        assert!(g.has_link(0, b_out, 2));
        assert!(!g.has_link(2, b_out, 0));
        assert_eq!(g.link_degree(1, a), 2);
        assert_eq!(g.links(0).collect::<Vec<_>>(), vec![(a, 1), (b_out, 2)]);
    }

    #[test]
    fn test_duplicate_links() {
        let g = Graph::load(
            "dup",
            &create_alphabet(),
            vec!["x", "y"],
            vec![("x", "y", 'A'), ("y", "x", 'A'), ("x", "y", 'B'), ("x", "y", 'B')],
        )
        .unwrap();
        assert_eq!(g.num_links(), 2);
        assert_eq!(g.degree(0), 2);
    }

    #[test]
    fn test_malformed() {
        let alphabet = create_alphabet();
        match Graph::load("g", &alphabet, vec!["x"], vec![("x", "y", 'A')]) {
            Err(Error::MalformedGraph(msg)) => assert!(msg.contains("unknown vertex")),
            _ => assert!(false),
        }
        match Graph::load("g", &alphabet, vec!["x", "y"], vec![("x", "y", 'C')]) {
            Err(Error::MalformedGraph(msg)) => assert!(msg.contains("`C`")),
            _ => assert!(false),
        }
        match Graph::load("g", &alphabet, vec!["x", "x"], Vec::<(&str, &str, char)>::new()) {
            Err(Error::MalformedGraph(_)) => (),
            _ => assert!(false),
        }
    }

    #[test]
    fn test_builder() {
        let mut builder = GraphBuilder::new("net", &create_alphabet());
        let u = builder.add_vertex("u");
        let v = builder.add_vertex("v");
        assert_eq!(builder.add_vertex("u"), u);
        builder.add_link(u, v, 'B').unwrap();
        assert!(builder.add_link(u, 5, 'A').is_err());
        let g = builder.build();
        assert_eq!(g.num_links(), 1);
    }
}
