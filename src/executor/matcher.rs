use crate::{
    error::{Error, Result},
    executor::{Embedding, EmbeddingSink},
    graph::Graph,
    index::CandidateIndex,
    planner::{check_order, visiting_order},
    symmetry::Symmetry,
    tools::{bounded, intersect},
    types::{Link, VId},
};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// What the interrupt hook sees of a running search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Embeddings emitted so far by all branches. Right before an emission
    /// the hook is also asked with the number of embeddings emitted or
    /// about to be emitted by other branches.
    pub embeddings: usize,
    /// Motif vertices assigned in the current branch.
    pub depth: usize,
    /// Search steps taken by the current branch.
    pub steps: u64,
}

type Interrupt = Box<dyn Fn(&Progress) -> bool + Send + Sync>;

/// Caller-owned settings of a search.
#[derive(Default)]
pub struct MatchOptions {
    order: Option<Vec<VId>>,
    interrupt: Option<Interrupt>,
    parallel: bool,
}

impl MatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the visiting order of the motif vertices.
    pub fn order(mut self, order: Vec<VId>) -> Self {
        self.order = Some(order);
        self
    }

    /// Installs a hook called at every search step; the search stops with
    /// [`Error::SearchInterrupted`] as soon as it returns `true`.
    pub fn interrupt<F>(mut self, interrupt: F) -> Self
    where
        F: Fn(&Progress) -> bool + Send + Sync + 'static,
    {
        self.interrupt = Some(Box::new(interrupt));
        self
    }

    /// Searches the branches of the first motif vertex in parallel.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl std::fmt::Debug for MatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchOptions")
            .field("order", &self.order)
            .field("interrupt", &self.interrupt.is_some())
            .field("parallel", &self.parallel)
            .finish()
    }
}

/// One level of the search: the motif vertex it assigns and everything its
/// image is checked against.
#[derive(Debug)]
struct Step {
    vertex: VId,
    candidates: Vec<VId>,
    /// The image must be reached from the image at `position` over `link`.
    links: Vec<(usize, Link)>,
    self_links: Vec<Link>,
    /// Positions whose images must be smaller.
    lower: Vec<usize>,
    /// Positions whose images must be larger.
    upper: Vec<usize>,
}

/// Shared by every branch of one run.
struct Context {
    embeddings: AtomicUsize,
    /// Emission slots claimed so far, emitted or not.
    reserved: AtomicUsize,
    stopped: AtomicBool,
}

/// The partial assignment owned by one branch, indexed by position in the
/// visiting order.
struct State {
    assignment: Vec<VId>,
    steps: u64,
}

impl State {
    fn new(len: usize) -> Self {
        Self {
            assignment: Vec::with_capacity(len),
            steps: 0,
        }
    }
}

/// Enumerates the embeddings of a motif in a network, one per class of
/// embeddings related by a motif automorphism.
pub struct Matcher<'a> {
    network: &'a Graph,
    order: Vec<VId>,
    steps: Vec<Step>,
    options: MatchOptions,
}

impl<'a> Matcher<'a> {
    /// Prepares a search of `motif` in `network`.
    ///
    /// `symmetry` must be the symmetry of `motif` and `index` the index of
    /// `network`.
    pub fn new(
        motif: &Graph,
        network: &'a Graph,
        symmetry: &Symmetry,
        index: &CandidateIndex,
        options: MatchOptions,
    ) -> Result<Self> {
        if motif.alphabet() != network.alphabet() {
            return Err(Error::AlphabetMismatch {
                motif: String::from(motif.name()),
                network: String::from(network.name()),
            });
        }
        if motif.is_empty() {
            return Err(Error::UnsupportedMotif(format!(
                "motif `{}` has no vertices",
                motif.name()
            )));
        }
        if symmetry.num_vertices() != motif.num_vertices() {
            return Err(Error::UnsupportedMotif(format!(
                "the symmetry has {} vertices, motif `{}` has {}",
                symmetry.num_vertices(),
                motif.name(),
                motif.num_vertices()
            )));
        }
        let mut candidates: Vec<Vec<VId>> = motif
            .all_vertices()
            .map(|u| index.initial_candidates(u, motif))
            .collect();
        let order = match &options.order {
            Some(order) => {
                check_order(motif, order)?;
                order.clone()
            }
            None => {
                let sizes: Vec<usize> = candidates.iter().map(|c| c.len()).collect();
                visiting_order(motif, index, &sizes)
            }
        };
        debug!(
            "visiting order: [{}], initial candidates: [{}]",
            order.iter().join(", "),
            order.iter().map(|&u| candidates[u].len()).join(", ")
        );
        let mut position = vec![0; motif.num_vertices()];
        for (pos, &u) in order.iter().enumerate() {
            position[u] = pos;
        }
        let constraints = symmetry.order_constraints_for(&order);
        let mut steps = Vec::with_capacity(order.len());
        for (pos, &v) in order.iter().enumerate() {
            let links = motif
                .links(v)
                .filter(|&(_, u)| position[u] < pos)
                .map(|(link, u)| (position[u], link.reverse()))
                .collect();
            let self_links = motif
                .links(v)
                .filter(|&(_, u)| u == v)
                .map(|(link, _)| link)
                .collect();
            let lower = constraints
                .iter()
                .filter(|&&(a, b)| b == v && position[a] < pos)
                .map(|&(a, _)| position[a])
                .collect();
            let upper = constraints
                .iter()
                .filter(|&&(a, b)| a == v && position[b] < pos)
                .map(|&(_, b)| position[b])
                .collect();
            steps.push(Step {
                vertex: v,
                candidates: std::mem::take(&mut candidates[v]),
                links,
                self_links,
                lower,
                upper,
            });
        }
        Ok(Self {
            network,
            order,
            steps,
            options,
        })
    }

    pub fn order(&self) -> &[VId] {
        &self.order
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Runs the search sequentially and returns the number of embeddings.
    ///
    /// Embeddings are emitted in a deterministic order.
    pub fn run<S: EmbeddingSink>(&self, sink: &mut S) -> Result<usize> {
        let time_now = Instant::now();
        let context = Context::new();
        let mut state = State::new(self.steps.len());
        let mut emit = |embedding: Embedding| sink.accept(embedding);
        self.extend(&context, &mut state, &mut emit)?;
        let count = context.embeddings.load(Ordering::SeqCst);
        info!(
            "{} embeddings in {}: {} ms",
            count,
            self.network.name(),
            time_now.elapsed().as_millis()
        );
        Ok(count)
    }

    /// Runs one branch per candidate of the first motif vertex on the rayon
    /// pool and returns the number of embeddings.
    ///
    /// Every branch owns its assignment; the embeddings reach `sink` one at a
    /// time but in no particular order.
    pub fn par_run<S: EmbeddingSink + Send>(&self, sink: &mut S) -> Result<usize> {
        let time_now = Instant::now();
        let context = Context::new();
        let sink = Mutex::new(sink);
        let first = self.candidates(0, &[]);
        first.par_iter().try_for_each(|&n| {
            let mut state = State::new(self.steps.len());
            state.steps += 1;
            self.check_interrupt(&context, &state)?;
            state.assignment.push(n);
            let mut emit = |embedding: Embedding| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .accept(embedding)
            };
            self.extend(&context, &mut state, &mut emit)
        })?;
        let count = context.embeddings.load(Ordering::SeqCst);
        info!(
            "{} embeddings in {}: {} ms",
            count,
            self.network.name(),
            time_now.elapsed().as_millis()
        );
        Ok(count)
    }

    /// Runs [`par_run`](Self::par_run) or [`run`](Self::run), as the options say.
    pub fn find_all<S: EmbeddingSink + Send>(&self, sink: &mut S) -> Result<usize> {
        if self.options.parallel {
            self.par_run(sink)
        } else {
            self.run(sink)
        }
    }
}

// private methods
impl<'a> Matcher<'a> {
    fn extend<F>(&self, context: &Context, state: &mut State, emit: &mut F) -> Result<()>
    where
        F: FnMut(Embedding) -> Result<()>,
    {
        state.steps += 1;
        self.check_interrupt(context, state)?;
        let depth = state.assignment.len();
        if depth == self.steps.len() {
            self.reserve(context, state)?;
            emit(self.embedding(&state.assignment))?;
            context.embeddings.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }
        for n in self.candidates(depth, &state.assignment) {
            state.assignment.push(n);
            let result = self.extend(context, state, emit);
            state.assignment.pop();
            result?;
        }
        Ok(())
    }

    fn check_interrupt(&self, context: &Context, state: &State) -> Result<()> {
        let embeddings = context.embeddings.load(Ordering::SeqCst);
        let stop = context.stopped.load(Ordering::SeqCst) || self.interrupted(state, embeddings);
        self.stop_if(context, stop)
    }

    /// Claims the next emission slot. A claimed slot is only refused by the
    /// hook, so concurrent branches never emit more than it allows.
    fn reserve(&self, context: &Context, state: &State) -> Result<()> {
        let slot = context.reserved.fetch_add(1, Ordering::SeqCst);
        let stop = self.interrupted(state, slot);
        self.stop_if(context, stop)
    }

    fn interrupted(&self, state: &State, embeddings: usize) -> bool {
        self.options.interrupt.as_ref().map_or(false, |interrupt| {
            interrupt(&Progress {
                embeddings,
                depth: state.assignment.len(),
                steps: state.steps,
            })
        })
    }

    fn stop_if(&self, context: &Context, stop: bool) -> Result<()> {
        if stop {
            context.stopped.store(true, Ordering::SeqCst);
            Err(Error::SearchInterrupted {
                embeddings: context.embeddings.load(Ordering::SeqCst),
            })
        } else {
            Ok(())
        }
    }

    /// The sorted images allowed for the motif vertex at `depth`.
    fn candidates(&self, depth: usize, assignment: &[VId]) -> Vec<VId> {
        let step = &self.steps[depth];
        let lower = step.lower.iter().map(|&pos| assignment[pos]).max();
        let upper = step.upper.iter().map(|&pos| assignment[pos]).min();
        let mut lists: Vec<&[VId]> = Vec::with_capacity(step.links.len() + 1);
        lists.push(bounded(&step.candidates, lower, upper));
        for &(pos, link) in &step.links {
            lists.push(bounded(
                self.network.neighbors(assignment[pos], link),
                lower,
                upper,
            ));
        }
        let mut candidates = intersect(&mut lists);
        candidates.retain(|&n| {
            !assignment.contains(&n)
                && step
                    .self_links
                    .iter()
                    .all(|&link| self.network.has_link(n, link, n))
        });
        candidates
    }

    fn embedding(&self, assignment: &[VId]) -> Embedding {
        let mut images = vec![0; assignment.len()];
        for (step, &n) in self.steps.iter().zip(assignment) {
            images[step.vertex] = n;
        }
        Embedding::new(images)
    }
}

impl Context {
    fn new() -> Self {
        Self {
            embeddings: AtomicUsize::new(0),
            reserved: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        executor::CountSink,
        graph::{LinkAlphabet, LinkType},
        symmetry::analyze,
    };

    fn create_alphabet() -> LinkAlphabet {
        let mut alphabet = LinkAlphabet::new();
        alphabet.add(LinkType::new('A', false)).unwrap();
        alphabet.add(LinkType::new('B', true)).unwrap();
        alphabet
    }

    fn create_graph(name: &str, n: usize, edges: &[(usize, usize, char)]) -> Graph {
        Graph::load(
            name,
            &create_alphabet(),
            (0..n).map(|v| v.to_string()),
            edges
                .iter()
                .map(|&(u, v, t)| (u.to_string(), v.to_string(), t)),
        )
        .unwrap()
    }

    fn find(motif: &Graph, network: &Graph, options: MatchOptions) -> Result<Vec<Embedding>> {
        let symmetry = analyze(motif)?;
        let index = CandidateIndex::build(network);
        let matcher = Matcher::new(motif, network, &symmetry, &index, options)?;
        let mut embeddings = Vec::new();
        matcher.run(&mut embeddings)?;
        Ok(embeddings)
    }

    fn create_square_with_diagonal() -> Graph {
        create_graph(
            "network",
            4,
            &[(0, 1, 'A'), (1, 2, 'A'), (2, 3, 'A'), (3, 0, 'A'), (0, 2, 'A')],
        )
    }

    #[test]
    fn test_triangles() {
        let network = create_square_with_diagonal();
        let triangle = create_graph("triangle", 3, &[(0, 1, 'A'), (1, 2, 'A'), (2, 0, 'A')]);
        let embeddings = find(&triangle, &network, MatchOptions::new()).unwrap();
        let found: Vec<&[VId]> = embeddings.iter().map(|e| e.images()).collect();
        assert_eq!(found, vec![&[0, 1, 2][..], &[0, 2, 3][..]]);
    }

    #[test]
    fn test_directed() {
        // 0 -> 1 -> 2 -> 0 and 0 -> 2
        let network = create_graph(
            "network",
            3,
            &[(0, 1, 'B'), (1, 2, 'B'), (2, 0, 'B'), (0, 2, 'B')],
        );
        let motif = create_graph("motif", 2, &[(0, 1, 'B')]);
        let mut found: Vec<Vec<VId>> = find(&motif, &network, MatchOptions::new())
            .unwrap()
            .into_iter()
            .map(|e| e.images().to_vec())
            .collect();
        found.sort();
        assert_eq!(found, vec![vec![0, 1], vec![0, 2], vec![1, 2], vec![2, 0]]);
    }

    #[test]
    fn test_order_override() {
        let network = create_square_with_diagonal();
        let path = create_graph("path", 3, &[(0, 1, 'A'), (1, 2, 'A')]);
        let mut default = find(&path, &network, MatchOptions::new()).unwrap();
        let mut overridden =
            find(&path, &network, MatchOptions::new().order(vec![2, 1, 0])).unwrap();
        default.sort();
        overridden.sort();
        assert_eq!(default, overridden);
        // Every vertex of degree d is the middle of d * (d - 1) / 2 paths.
        assert_eq!(default.len(), 1 + 3 + 1 + 3);
        match find(&path, &network, MatchOptions::new().order(vec![0, 1])) {
            Err(Error::InvalidOrder(_)) => (),
            _ => assert!(false),
        }
    }

    #[test]
    fn test_self_loop() {
        let network = create_graph("network", 2, &[(0, 0, 'A'), (0, 1, 'A')]);
        let motif = create_graph("motif", 1, &[(0, 0, 'A')]);
        let embeddings = find(&motif, &network, MatchOptions::new()).unwrap();
        assert_eq!(embeddings, vec![Embedding::new(vec![0])]);
    }

    #[test]
    fn test_par_self_loop() {
        let network = create_graph("network", 2, &[(0, 0, 'A'), (0, 1, 'A')]);
        let motif = create_graph("motif", 1, &[(0, 0, 'A')]);
        let symmetry = analyze(&motif).unwrap();
        let index = CandidateIndex::build(&network);
        let options = MatchOptions::new().parallel(true);
        let matcher = Matcher::new(&motif, &network, &symmetry, &index, options).unwrap();
        let mut embeddings = Vec::new();
        assert_eq!(matcher.par_run(&mut embeddings).unwrap(), 1);
        assert_eq!(embeddings, vec![Embedding::new(vec![0])]);
    }

    #[test]
    fn test_interrupt() {
        let network = create_square_with_diagonal();
        let edge = create_graph("edge", 2, &[(0, 1, 'A')]);
        let options = MatchOptions::new().interrupt(|progress| progress.embeddings >= 2);
        let symmetry = analyze(&edge).unwrap();
        let index = CandidateIndex::build(&network);
        let matcher = Matcher::new(&edge, &network, &symmetry, &index, options).unwrap();
        let mut embeddings = Vec::new();
        match matcher.run(&mut embeddings) {
            Err(Error::SearchInterrupted { embeddings: 2 }) => (),
            _ => assert!(false),
        }
        assert_eq!(embeddings.len(), 2);
    }

    #[test]
    fn test_par_run() {
        let network = create_square_with_diagonal();
        let edge = create_graph("edge", 2, &[(0, 1, 'A')]);
        let symmetry = analyze(&edge).unwrap();
        let index = CandidateIndex::build(&network);
        let options = MatchOptions::new().parallel(true);
        let matcher = Matcher::new(&edge, &network, &symmetry, &index, options).unwrap();
        let mut sequential = Vec::new();
        matcher.run(&mut sequential).unwrap();
        let mut parallel = Vec::new();
        assert_eq!(matcher.par_run(&mut parallel).unwrap(), 5);
        parallel.sort();
        assert_eq!(sequential, parallel);
        let mut count = CountSink::new();
        assert_eq!(matcher.find_all(&mut count).unwrap(), 5);
        assert_eq!(count.count(), 5);
    }

    #[test]
    fn test_par_interrupt() {
        let network = create_square_with_diagonal();
        let edge = create_graph("edge", 2, &[(0, 1, 'A')]);
        let symmetry = analyze(&edge).unwrap();
        let index = CandidateIndex::build(&network);
        let options = MatchOptions::new()
            .parallel(true)
            .interrupt(|progress| progress.embeddings >= 2);
        let matcher = Matcher::new(&edge, &network, &symmetry, &index, options).unwrap();
        for _ in 0..20 {
            let mut embeddings = Vec::new();
            match matcher.par_run(&mut embeddings) {
                Err(Error::SearchInterrupted { .. }) => (),
                _ => assert!(false),
            }
            assert_eq!(embeddings.len(), 2);
        }
    }

    #[test]
    fn test_alphabet_mismatch() {
        let network = create_square_with_diagonal();
        let mut alphabet = LinkAlphabet::new();
        alphabet.add(LinkType::new('A', true)).unwrap();
        let motif = Graph::load("motif", &alphabet, vec!["0", "1"], vec![("0", "1", 'A')]).unwrap();
        match find(&motif, &network, MatchOptions::new()) {
            Err(Error::AlphabetMismatch { motif, network }) => {
                assert_eq!(motif, "motif");
                assert_eq!(network, "network");
            }
            _ => assert!(false),
        }
    }
}
