//! Tensor (direct) products of analyzed digraphs.

use crate::king::AnalyzedDigraph;
use crate::{Digraph, Vertex};
use petgraph::graph::{DiGraph, NodeIndex};

/// The tensor product: `(u1, u2) -> (v1, v2)` iff `u1 -> v1` and `u2 -> v2`.
///
/// Product vertices are the pairs of factor vertices in lexicographic order,
/// so pair `(i, j)` of factor indices has product index `i * right.order() + j`.
pub fn tensor_product(left: &Digraph, right: &Digraph, name: impl Into<String>) -> Digraph {
    let n2 = right.order();
    let mut graph = DiGraph::with_capacity(left.order() * n2, left.size() * right.size());
    for u in left.vertices() {
        for v in right.vertices() {
            graph.add_node(Vertex::pair(u.clone(), v.clone()));
        }
    }

    let right_arcs = right.arcs();
    for (u1, v1) in left.arcs() {
        for &(u2, v2) in &right_arcs {
            graph.add_edge(NodeIndex::new(u1 * n2 + u2), NodeIndex::new(v1 * n2 + v2), ());
        }
    }

    Digraph::from_sorted_graph(name, graph)
}

/// Which end of the eccentricity range to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    pub fn adjective(self) -> &'static str {
        match self {
            Extremum::Min => "minimal",
            Extremum::Max => "maximal",
        }
    }
}

/// A product king attaining an extremal eccentricity, with the factor vertex
/// indices it is composed of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtremalKing {
    pub vertex: usize,
    pub left: usize,
    pub right: usize,
    pub eccentricity: usize,
}

/// How the product's largest king eccentricity compares with `n1 * n2 - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundStatus {
    NoKings,
    Below { max_eccentricity: usize, bound: usize },
    AtBound { bound: usize },
    Above { max_eccentricity: usize, bound: usize },
}

/// The analyzed tensor product of two analyzed factors.
#[derive(Debug, Clone)]
pub struct ProductDigraph<'a> {
    left: &'a AnalyzedDigraph,
    right: &'a AnalyzedDigraph,
    product: AnalyzedDigraph,
}

impl<'a> ProductDigraph<'a> {
    pub fn build(left: &'a AnalyzedDigraph, right: &'a AnalyzedDigraph, name: impl Into<String>) -> Self {
        let product = AnalyzedDigraph::new(tensor_product(left.digraph(), right.digraph(), name));
        ProductDigraph {
            left,
            right,
            product,
        }
    }

    /// Builds the product named `{left}x{right}`.
    pub fn of(left: &'a AnalyzedDigraph, right: &'a AnalyzedDigraph) -> Self {
        let name = format!("{}x{}", left.name(), right.name());
        Self::build(left, right, name)
    }

    /// Computes Dv and/or Cv on the product itself.
    pub fn compute_cycle_invariants(self, want_closed_walks: bool, want_cycles: bool) -> Self {
        ProductDigraph {
            product: self
                .product
                .compute_cycle_invariants(want_closed_walks, want_cycles),
            ..self
        }
    }

    pub fn left(&self) -> &'a AnalyzedDigraph {
        self.left
    }

    pub fn right(&self) -> &'a AnalyzedDigraph {
        self.right
    }

    pub fn product(&self) -> &AnalyzedDigraph {
        &self.product
    }

    pub fn name(&self) -> &str {
        self.product.name()
    }

    pub fn king_count(&self) -> usize {
        self.product.king_count()
    }

    /// Factor vertex indices of product vertex `vertex`.
    pub fn components(&self, vertex: usize) -> (usize, usize) {
        let n2 = self.right.order();
        (vertex / n2, vertex % n2)
    }

    /// Product kings whose eccentricity is the product's min or max, in
    /// identifier order. Empty when the product has no kings.
    pub fn extremal_kings(&self, extremum: Extremum) -> Vec<ExtremalKing> {
        if self.product.kings().is_empty() {
            return Vec::new();
        }
        let target = match extremum {
            Extremum::Min => self.product.min_eccentricity(),
            Extremum::Max => self.product.max_eccentricity(),
        };
        self.product
            .kings_with_eccentricity(target)
            .into_iter()
            .map(|vertex| {
                let (left, right) = self.components(vertex);
                ExtremalKing {
                    vertex,
                    left,
                    right,
                    eccentricity: target,
                }
            })
            .collect()
    }

    /// `order(left) * order(right) - 1`.
    pub fn theoretical_bound(&self) -> usize {
        (self.left.order() * self.right.order()).saturating_sub(1)
    }

    pub fn bound_status(&self) -> BoundStatus {
        let bound = self.theoretical_bound();
        let max_eccentricity = self.product.max_eccentricity();
        if self.product.kings().is_empty() {
            BoundStatus::NoKings
        } else if max_eccentricity < bound {
            BoundStatus::Below {
                max_eccentricity,
                bound,
            }
        } else if max_eccentricity == bound {
            BoundStatus::AtBound { bound }
        } else {
            BoundStatus::Above {
                max_eccentricity,
                bound,
            }
        }
    }

    /// True iff `0 < max eccentricity < bound`. Use [`Self::bound_status`] or
    /// [`Self::king_count`] to tell "no kings" from "at the bound".
    pub fn below_theoretical_bound(&self) -> bool {
        matches!(
            self.bound_status(),
            BoundStatus::Below { max_eccentricity, .. } if max_eccentricity > 0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_bit_triangle;
    use crate::king::analyze;

    fn cycle(name: &str, n: usize) -> AnalyzedDigraph {
        analyze(Digraph::from_arcs(name, (1..=n).map(|i| (i, i % n + 1))))
    }

    fn complete_with_loops(name: &str, n: usize) -> AnalyzedDigraph {
        analyze(Digraph::from_arcs(name, (1..=n).flat_map(|u| (1..=n).map(move |v| (u, v)))))
    }

    #[test]
    fn test_tensor_product_arcs() {
        let c2 = Digraph::from_arcs("C2", [(1, 2), (2, 1)]);
        let p3 = Digraph::from_arcs("P2", [(1, 2)]);
        let product = tensor_product(&c2, &p3, "C2xP2");
        assert_eq!(product.order(), 4);
        assert_eq!(product.size(), 2);
        let one_one = Vertex::pair(Vertex::Label(1), Vertex::Label(1));
        let two_two = Vertex::pair(Vertex::Label(2), Vertex::Label(2));
        let u = product.index_of(&one_one).unwrap();
        let v = product.index_of(&two_two).unwrap();
        assert!(product.has_arc(u, v));
        assert!(!product.has_arc(v, u));
    }

    #[test]
    fn test_coprime_cycles_form_a_long_cycle() {
        let c3 = cycle("C3", 3);
        let c4 = cycle("C4", 4);
        let product = ProductDigraph::of(&c3, &c4);
        assert_eq!(product.name(), "C3xC4");
        assert_eq!(product.king_count(), 12);
        assert_eq!(product.product().max_eccentricity(), 11);
        assert_eq!(product.product().min_eccentricity(), 11);
        assert_eq!(product.bound_status(), BoundStatus::AtBound { bound: 11 });
        assert!(!product.below_theoretical_bound());

        let extremal = product.extremal_kings(Extremum::Max);
        assert_eq!(extremal.len(), 12);
        assert_eq!(extremal[5].left, 1);
        assert_eq!(extremal[5].right, 1);
        assert_eq!(
            product.product().digraph().vertex(extremal[5].vertex),
            &Vertex::pair(Vertex::Label(2), Vertex::Label(2))
        );
    }

    #[test]
    fn test_product_without_kings() {
        let c3 = cycle("C3", 3);
        let product = ProductDigraph::of(&c3, &c3);
        assert_eq!(product.king_count(), 0);
        assert!(product.extremal_kings(Extremum::Min).is_empty());
        assert!(product.extremal_kings(Extremum::Max).is_empty());
        assert_eq!(product.bound_status(), BoundStatus::NoKings);
        assert!(!product.below_theoretical_bound());
    }

    #[test]
    fn test_dense_product_is_below_bound() {
        let k2 = complete_with_loops("K2*", 2);
        let product = ProductDigraph::of(&k2, &k2);
        assert_eq!(product.king_count(), 4);
        assert_eq!(
            product.bound_status(),
            BoundStatus::Below {
                max_eccentricity: 1,
                bound: 3
            }
        );
        assert!(product.below_theoretical_bound());
    }

    #[test]
    fn test_emperor_products_have_no_kings() {
        let t = analyze(parse_bit_triangle("111", "T3_1").unwrap());
        assert!(t.has_emperor());
        let product = ProductDigraph::of(&t, &t);
        assert_eq!(product.king_count(), 0);
    }

    #[test]
    fn test_max_eccentricity_never_exceeds_bound() {
        let factors = [
            cycle("C2", 2),
            cycle("C3", 3),
            cycle("C4", 4),
            analyze(parse_bit_triangle("110111", "T4").unwrap()),
            analyze(parse_bit_triangle("1100110111", "T5").unwrap()),
        ];
        for left in &factors {
            for right in &factors {
                let product = ProductDigraph::of(left, right);
                if product.king_count() > 0 {
                    assert!(product.product().max_eccentricity() <= product.theoretical_bound());
                    assert!(!matches!(product.bound_status(), BoundStatus::Above { .. }));
                }
            }
        }
    }

    #[test]
    fn test_extremal_kings_of_strong_tournament_product() {
        let c3 = cycle("C3", 3);
        let t4 = analyze(parse_bit_triangle("110111", "T4").unwrap());
        let product = ProductDigraph::of(&c3, &t4);
        // T4 holds cycles of length 3 and 4, so the product is strongly connected
        assert_eq!(product.king_count(), 12);
        let min = product.extremal_kings(Extremum::Min);
        let max = product.extremal_kings(Extremum::Max);
        assert!(!min.is_empty() && !max.is_empty());
        assert!(min[0].eccentricity <= max[0].eccentricity);
        for king in min.iter().chain(&max) {
            assert!(product.left().is_king(king.left));
            assert!(product.right().is_king(king.right));
        }
    }
}
