//! King analysis: eccentricities, closed-diwalk lengths (Dv) and simple-cycle
//! lengths (Cv) of the kings of a digraph.
//!
//! A king is a vertex that reaches every other vertex; its eccentricity is
//! the longest of its shortest directed paths. Analysis results live in a
//! side table owned by [`AnalyzedDigraph`], keyed by vertex index.

use crate::cycles::cycle_lengths_by_vertex;
use crate::utils::gcd_of;
use crate::{Digraph, Vertex};
use itertools::Itertools;
use petgraph::graph::NodeIndex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

/// A set of lengths with its greatest common divisor.
///
/// The gcd is 0 for the empty set and the element itself for a singleton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LengthSet {
    lengths: BTreeSet<usize>,
    gcd: usize,
}

impl LengthSet {
    pub fn new(lengths: BTreeSet<usize>) -> Self {
        let gcd = gcd_of(&lengths);
        LengthSet { lengths, gcd }
    }

    pub fn lengths(&self) -> &BTreeSet<usize> {
        &self.lengths
    }

    pub fn gcd(&self) -> usize {
        self.gcd
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

impl fmt::Display for LengthSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.lengths.iter().join(", "))
    }
}

/// Everything known about one king.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KingAnnotation {
    eccentricity: usize,
    closed_walks: Option<LengthSet>,
    cycles: Option<LengthSet>,
}

impl KingAnnotation {
    pub fn eccentricity(&self) -> usize {
        self.eccentricity
    }

    /// Dv, if it has been computed.
    pub fn closed_walks(&self) -> Option<&LengthSet> {
        self.closed_walks.as_ref()
    }

    /// Cv, if it has been computed.
    pub fn cycles(&self) -> Option<&LengthSet> {
        self.cycles.as_ref()
    }
}

/// Which of the expensive per-king invariants to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleInvariants {
    pub closed_walks: bool,
    pub cycles: bool,
}

impl CycleInvariants {
    pub const NONE: CycleInvariants = CycleInvariants {
        closed_walks: false,
        cycles: false,
    };
    pub const ALL: CycleInvariants = CycleInvariants {
        closed_walks: true,
        cycles: true,
    };
}

/// Length of the longest shortest path from `source`, or `None` when some
/// vertex cannot be reached.
pub fn eccentricity(digraph: &Digraph, source: usize) -> Option<usize> {
    let graph = digraph.graph();
    let mut distance: Vec<Option<usize>> = vec![None; digraph.order()];
    let mut queue = VecDeque::new();

    distance[source] = Some(0);
    queue.push_back(NodeIndex::new(source));
    let mut reached = 1;
    let mut farthest = 0;

    while let Some(current) = queue.pop_front() {
        let depth = distance[current.index()].unwrap_or(0);
        for neighbor in graph.neighbors(current) {
            if distance[neighbor.index()].is_none() {
                distance[neighbor.index()] = Some(depth + 1);
                farthest = farthest.max(depth + 1);
                reached += 1;
                queue.push_back(neighbor);
            }
        }
    }

    (reached == digraph.order()).then_some(farthest)
}

/// A digraph together with its king annotations.
#[derive(Debug, Clone)]
pub struct AnalyzedDigraph {
    digraph: Digraph,
    annotations: BTreeMap<usize, KingAnnotation>,
    kings: Vec<usize>,
    min_eccentricity: usize,
    max_eccentricity: usize,
    is_tournament: bool,
}

/// Finds the kings of `digraph` and their eccentricities.
pub fn analyze(digraph: Digraph) -> AnalyzedDigraph {
    AnalyzedDigraph::new(digraph)
}

impl AnalyzedDigraph {
    pub fn new(digraph: Digraph) -> Self {
        let annotations: BTreeMap<usize, KingAnnotation> = (0..digraph.order())
            .filter_map(|v| {
                eccentricity(&digraph, v).map(|ecc| {
                    (
                        v,
                        KingAnnotation {
                            eccentricity: ecc,
                            closed_walks: None,
                            cycles: None,
                        },
                    )
                })
            })
            .collect();

        // Index order is identifier order, so the keys are already sorted.
        let kings: Vec<usize> = annotations.keys().copied().collect();
        let (min_eccentricity, max_eccentricity) = annotations
            .values()
            .map(KingAnnotation::eccentricity)
            .minmax()
            .into_option()
            .unwrap_or((0, 0));
        let is_tournament = digraph.is_tournament();

        log::debug!(
            "analyzed {}: order {}, {} kings, k_val range {}..={}",
            digraph.name(),
            digraph.order(),
            kings.len(),
            min_eccentricity,
            max_eccentricity
        );

        AnalyzedDigraph {
            digraph,
            annotations,
            kings,
            min_eccentricity,
            max_eccentricity,
            is_tournament,
        }
    }

    /// Analyzes `digraph` and computes the requested cycle invariants.
    pub fn with_invariants(digraph: Digraph, wanted: CycleInvariants) -> Self {
        Self::new(digraph).compute_cycle_invariants(wanted.closed_walks, wanted.cycles)
    }

    pub fn digraph(&self) -> &Digraph {
        &self.digraph
    }

    pub fn name(&self) -> &str {
        self.digraph.name()
    }

    pub fn order(&self) -> usize {
        self.digraph.order()
    }

    /// King vertex indices, in identifier order.
    pub fn kings(&self) -> &[usize] {
        &self.kings
    }

    pub fn king_vertices(&self) -> Vec<&Vertex> {
        self.kings.iter().map(|&k| self.digraph.vertex(k)).collect()
    }

    pub fn king_count(&self) -> usize {
        self.kings.len()
    }

    pub fn is_king(&self, v: usize) -> bool {
        self.annotations.contains_key(&v)
    }

    pub fn annotation(&self, v: usize) -> Option<&KingAnnotation> {
        self.annotations.get(&v)
    }

    pub fn eccentricity(&self, v: usize) -> Option<usize> {
        self.annotation(v).map(KingAnnotation::eccentricity)
    }

    /// Smallest king eccentricity, 0 without kings.
    pub fn min_eccentricity(&self) -> usize {
        self.min_eccentricity
    }

    /// Largest king eccentricity, 0 without kings.
    pub fn max_eccentricity(&self) -> usize {
        self.max_eccentricity
    }

    pub fn is_tournament(&self) -> bool {
        self.is_tournament
    }

    /// A tournament with exactly one king.
    pub fn has_emperor(&self) -> bool {
        self.is_tournament && self.kings.len() == 1
    }

    /// Kings of a tournament under the strict rule (eccentricity at most 2).
    /// For other digraphs every king qualifies.
    pub fn tournament_kings(&self) -> Vec<usize> {
        self.kings
            .iter()
            .copied()
            .filter(|&k| !self.is_tournament || self.eccentricity(k).is_some_and(|e| e <= 2))
            .collect()
    }

    /// Kings whose eccentricity equals `value`, in identifier order.
    pub fn kings_with_eccentricity(&self, value: usize) -> Vec<usize> {
        self.kings
            .iter()
            .copied()
            .filter(|&k| self.eccentricity(k) == Some(value))
            .collect()
    }

    /// Computes Dv and/or Cv for every king. Does nothing when neither is
    /// wanted. Previously computed sets that are not recomputed are kept.
    pub fn compute_cycle_invariants(self, want_closed_walks: bool, want_cycles: bool) -> Self {
        if !want_closed_walks && !want_cycles {
            return self;
        }

        let mut cycle_sets = if want_cycles {
            let lengths = cycle_lengths_by_vertex(&self.digraph);
            self.kings
                .iter()
                .map(|&k| (k, LengthSet::new(lengths[k].clone())))
                .collect()
        } else {
            BTreeMap::new()
        };

        let mut walk_sets = if want_closed_walks {
            closed_walk_lengths(&self.digraph, &self.kings)
        } else {
            BTreeMap::new()
        };

        let annotations = self
            .annotations
            .into_iter()
            .map(|(k, annotation)| {
                let closed_walks = walk_sets.remove(&k).or(annotation.closed_walks);
                let cycles = cycle_sets.remove(&k).or(annotation.cycles);
                (
                    k,
                    KingAnnotation {
                        eccentricity: annotation.eccentricity,
                        closed_walks,
                        cycles,
                    },
                )
            })
            .collect();

        AnalyzedDigraph {
            annotations,
            ..self
        }
    }
}

/// Rows of a boolean matrix packed into 64-bit words.
#[derive(Debug, Clone)]
struct BitRows {
    words: usize,
    rows: Vec<Vec<u64>>,
}

impl BitRows {
    fn adjacency(digraph: &Digraph) -> Self {
        let n = digraph.order();
        let words = n.div_ceil(64).max(1);
        let mut rows = vec![vec![0u64; words]; n];
        for (u, v) in digraph.arcs() {
            rows[u][v / 64] |= 1u64 << (v % 64);
        }
        BitRows { words, rows }
    }

    fn contains(row: &[u64], v: usize) -> bool {
        row[v / 64] & (1u64 << (v % 64)) != 0
    }

    /// Row of `row * self`: every vertex one arc beyond a vertex of `row`.
    fn step(&self, row: &[u64]) -> Vec<u64> {
        let mut next = vec![0u64; self.words];
        for (w, &word) in row.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                let u = w * 64 + bits.trailing_zeros() as usize;
                bits &= bits - 1;
                for (dst, src) in next.iter_mut().zip(&self.rows[u]) {
                    *dst |= src;
                }
            }
        }
        next
    }
}

/// Per-king state while scanning walk lengths.
struct WalkScan {
    king: usize,
    /// Row `king` of the current adjacency-matrix power.
    reach: Vec<u64>,
    lengths: BTreeSet<usize>,
}

/// Dv for every king: the closed-walk lengths up to the arc count, keeping a
/// length only when it is not a multiple of one already kept. A king stops
/// being scanned once it holds two or more lengths with gcd 1.
fn closed_walk_lengths(digraph: &Digraph, kings: &[usize]) -> BTreeMap<usize, LengthSet> {
    let adjacency = BitRows::adjacency(digraph);
    let mut finished: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
    let mut active: Vec<WalkScan> = kings
        .iter()
        .map(|&king| WalkScan {
            king,
            reach: adjacency.rows[king].clone(),
            lengths: BTreeSet::new(),
        })
        .collect();

    for length in 1..=digraph.size() {
        if active.is_empty() {
            log::debug!("{}: Dv scan settled at length {}", digraph.name(), length - 1);
            break;
        }

        for scan in &mut active {
            if BitRows::contains(&scan.reach, scan.king)
                && !scan.lengths.iter().any(|&kept| length % kept == 0)
            {
                scan.lengths.insert(length);
            }
        }

        let (settled, pending): (Vec<WalkScan>, Vec<WalkScan>) = active
            .into_iter()
            .partition(|scan| scan.lengths.len() >= 2 && gcd_of(&scan.lengths) == 1);
        for scan in settled {
            finished.insert(scan.king, scan.lengths);
        }

        active = pending;
        if length < digraph.size() {
            for scan in &mut active {
                scan.reach = adjacency.step(&scan.reach);
            }
        }
    }

    for scan in active {
        finished.insert(scan.king, scan.lengths);
    }

    finished
        .into_iter()
        .map(|(king, lengths)| (king, LengthSet::new(lengths)))
        .collect()
}
