use itertools::Itertools;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a digraph vertex.
///
/// Corpus digraphs use integer labels; product digraphs use ordered pairs of
/// their factors' identifiers. The derived order places labels before pairs,
/// labels numerically and pairs lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Vertex {
    Label(usize),
    Pair(Box<Vertex>, Box<Vertex>),
}

impl Vertex {
    pub fn pair(left: Vertex, right: Vertex) -> Self {
        Vertex::Pair(Box::new(left), Box::new(right))
    }

    pub fn label(&self) -> Option<usize> {
        match self {
            Vertex::Label(label) => Some(*label),
            Vertex::Pair(..) => None,
        }
    }

    /// The factor components of a product vertex.
    pub fn components(&self) -> Option<(&Vertex, &Vertex)> {
        match self {
            Vertex::Label(_) => None,
            Vertex::Pair(left, right) => Some((left, right)),
        }
    }
}

impl From<usize> for Vertex {
    fn from(label: usize) -> Self {
        Vertex::Label(label)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vertex::Label(label) => write!(f, "{}", label),
            Vertex::Pair(left, right) => write!(f, "({}, {})", left, right),
        }
    }
}

/// A named directed graph without parallel arcs.
///
/// Vertices are stored in ascending [`Vertex`] order, so a vertex index is
/// also its rank among the identifiers. Self-loops are allowed and can be
/// counted with [`Digraph::self_loop_count`]. A digraph never changes after
/// construction.
#[derive(Debug, Clone)]
pub struct Digraph {
    name: String,
    graph: DiGraph<Vertex, ()>,
}

impl Digraph {
    /// The order-0 digraph.
    pub fn empty(name: impl Into<String>) -> Self {
        Digraph {
            name: name.into(),
            graph: DiGraph::new(),
        }
    }

    /// Builds a digraph from explicit vertices plus every arc endpoint.
    /// Repeated arcs collapse into one.
    pub fn new<V, A>(name: impl Into<String>, vertices: V, arcs: A) -> Self
    where
        V: IntoIterator<Item = Vertex>,
        A: IntoIterator<Item = (Vertex, Vertex)>,
    {
        let arcs: Vec<(Vertex, Vertex)> = arcs.into_iter().collect();
        let mut vertex_set: BTreeSet<Vertex> = vertices.into_iter().collect();
        for (u, v) in &arcs {
            vertex_set.insert(u.clone());
            vertex_set.insert(v.clone());
        }

        let labels: Vec<Vertex> = vertex_set.into_iter().collect();
        let mut graph = DiGraph::with_capacity(labels.len(), arcs.len());
        for label in &labels {
            graph.add_node(label.clone());
        }

        for (u, v) in &arcs {
            // Both endpoints were inserted above, so the searches cannot miss.
            if let (Ok(a), Ok(b)) = (labels.binary_search(u), labels.binary_search(v)) {
                graph.update_edge(NodeIndex::new(a), NodeIndex::new(b), ());
            }
        }

        Digraph {
            name: name.into(),
            graph,
        }
    }

    /// Builds an integer-labelled digraph whose vertices are the arc endpoints.
    pub fn from_arcs<A>(name: impl Into<String>, arcs: A) -> Self
    where
        A: IntoIterator<Item = (usize, usize)>,
    {
        Self::from_labels(name, std::iter::empty(), arcs)
    }

    /// Builds an integer-labelled digraph that may contain isolated vertices.
    pub fn from_labels<L, A>(name: impl Into<String>, labels: L, arcs: A) -> Self
    where
        L: IntoIterator<Item = usize>,
        A: IntoIterator<Item = (usize, usize)>,
    {
        Self::new(
            name,
            labels.into_iter().map(Vertex::Label),
            arcs.into_iter()
                .map(|(u, v)| (Vertex::Label(u), Vertex::Label(v))),
        )
    }

    /// Wraps a graph whose nodes were already added in ascending order.
    pub(crate) fn from_sorted_graph(name: impl Into<String>, graph: DiGraph<Vertex, ()>) -> Self {
        debug_assert!(graph
            .node_indices()
            .tuple_windows()
            .all(|(a, b)| graph[a] < graph[b]));
        Digraph {
            name: name.into(),
            graph,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of arcs.
    pub fn size(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn graph(&self) -> &DiGraph<Vertex, ()> {
        &self.graph
    }

    pub fn vertex(&self, index: usize) -> &Vertex {
        &self.graph[NodeIndex::new(index)]
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.graph.node_indices().map(move |n| &self.graph[n])
    }

    pub fn index_of(&self, vertex: &Vertex) -> Option<usize> {
        self.graph
            .raw_nodes()
            .binary_search_by(|node| node.weight.cmp(vertex))
            .ok()
    }

    pub fn has_arc(&self, u: usize, v: usize) -> bool {
        self.graph
            .find_edge(NodeIndex::new(u), NodeIndex::new(v))
            .is_some()
    }

    pub fn out_neighbors(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors(NodeIndex::new(u)).map(|n| n.index())
    }

    /// All arcs as index pairs, in ascending order.
    pub fn arcs(&self) -> Vec<(usize, usize)> {
        self.graph
            .raw_edges()
            .iter()
            .map(|e| (e.source().index(), e.target().index()))
            .sorted()
            .collect()
    }

    pub fn self_loop_count(&self) -> usize {
        self.graph
            .raw_edges()
            .iter()
            .filter(|e| e.source() == e.target())
            .count()
    }

    /// True when every unordered pair of distinct vertices carries exactly one
    /// arc and there are no loops. The order-0 digraph is not a tournament.
    pub fn is_tournament(&self) -> bool {
        if self.order() == 0 || self.self_loop_count() > 0 {
            return false;
        }
        (0..self.order())
            .tuple_combinations()
            .all(|(u, v)| self.has_arc(u, v) != self.has_arc(v, u))
    }

    /// Strongly connected components, largest first, each sorted by identifier.
    pub fn strong_components(&self, exclude_singletons: bool) -> Vec<Vec<Vertex>> {
        kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|component| !(exclude_singletons && component.len() == 1))
            .map(|component| {
                component
                    .into_iter()
                    .map(|n| self.graph[n].clone())
                    .sorted()
                    .collect::<Vec<_>>()
            })
            .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
            .collect()
    }
}

// Module declarations
pub mod codec;
pub mod cycles;
pub mod experiment;
pub mod king;
pub mod product;
pub mod summary;
pub mod utils;
