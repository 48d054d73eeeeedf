//! Human-readable descriptions of analyzed digraphs and products.

use crate::king::{AnalyzedDigraph, KingAnnotation};
use crate::product::{BoundStatus, Extremum, ProductDigraph};
use crate::Vertex;
use itertools::Itertools;

fn vertex_list<'a>(vertices: impl IntoIterator<Item = &'a Vertex>) -> String {
    format!("[{}]", vertices.into_iter().join(", "))
}

/// Order, size, kings and strong components of a digraph, one item per line.
///
/// With `tournament_rules` set and a tournament at hand, kings are listed
/// under the strict rule and the `(n,k)-tournament` class is reported.
pub fn digraph_characteristics(analyzed: &AnalyzedDigraph, tournament_rules: bool) -> Vec<String> {
    let digraph = analyzed.digraph();
    let as_tournament = tournament_rules && analyzed.is_tournament();

    let mut lines = vec![
        format!(
            "{} name: {}",
            if as_tournament { "tournament" } else { "digraph" },
            digraph.name()
        ),
        format!("order: {}", digraph.order()),
        format!("vertices: {}", vertex_list(digraph.vertices())),
        format!("size: {}", digraph.size()),
    ];

    if digraph.self_loop_count() > 0 {
        lines.push(format!("self-loops: {}", digraph.self_loop_count()));
    }

    if as_tournament {
        lines.push(format!("({},{})-tournament", digraph.order(), analyzed.king_count()));
        let kings = analyzed.king_vertices();
        if let ([emperor], true) = (kings.as_slice(), analyzed.has_emperor()) {
            lines.push(format!("tournament emperor: {}", emperor));
        } else {
            let kings = analyzed.tournament_kings();
            lines.push(format!(
                "tournament kings: {}",
                vertex_list(kings.iter().map(|&k| digraph.vertex(k)))
            ));
        }
    } else {
        lines.push(format!("digraph kings: {}", vertex_list(analyzed.king_vertices())));
        lines.push(format!("min_k_val: {}", analyzed.min_eccentricity()));
        lines.push(format!("max_k_val: {}", analyzed.max_eccentricity()));
    }

    let components = digraph
        .strong_components(false)
        .iter()
        .map(|component| vertex_list(component))
        .join(", ");
    lines.push(format!("strong components: [{}]", components));

    lines
}

fn annotation_fields(annotation: &KingAnnotation) -> Vec<String> {
    let mut fields = vec![format!("k_val: {}", annotation.eccentricity())];
    if let Some(dv) = annotation.closed_walks() {
        fields.push(format!("Dv: {}", dv));
        fields.push(format!("GCD(Dv): {}", dv.gcd()));
    }
    if let Some(cv) = annotation.cycles() {
        fields.push(format!("Cv: {}", cv));
        fields.push(format!("GCD(Cv): {}", cv.gcd()));
    }
    fields
}

/// One line per king: vertex, eccentricity and any computed Dv / Cv.
pub fn king_characteristics(analyzed: &AnalyzedDigraph, tournament_rules: bool) -> Vec<String> {
    let kings = if tournament_rules {
        analyzed.tournament_kings()
    } else {
        analyzed.kings().to_vec()
    };

    kings
        .into_iter()
        .filter_map(|k| {
            let annotation = analyzed.annotation(k)?;
            let mut fields = vec![format!("vertex: {}", analyzed.digraph().vertex(k))];
            fields.extend(annotation_fields(annotation));
            Some(fields.join(", "))
        })
        .collect()
}

fn describe_component(factor: &AnalyzedDigraph, index: usize) -> String {
    let vertex = factor.digraph().vertex(index);
    match factor.annotation(index) {
        None => format!("vertex {} from {} is not a king.", vertex, factor.name()),
        Some(annotation) => {
            let mut text = format!(
                "vertex {} from {} has k_val {}",
                vertex,
                factor.name(),
                annotation.eccentricity()
            );
            if let Some(dv) = annotation.closed_walks() {
                text.push_str(&format!(
                    ", and is on closed diwalks of lengths (Dv = {}), with GCD(Dv) = {}",
                    dv,
                    dv.gcd()
                ));
            }
            text.push('.');
            text
        }
    }
}

/// Describes every extremal product king and the factor vertices behind it.
pub fn describe_extremal_kings(product: &ProductDigraph<'_>, extremum: Extremum) -> Vec<String> {
    let name = product.name();
    let kings = product.extremal_kings(extremum);
    if kings.is_empty() {
        return vec![format!(
            "{} has no kings, unable to retrieve {} k_val kings.",
            name,
            extremum.adjective()
        )];
    }

    let mut lines = Vec::new();
    for king in kings {
        let vertex = product.product().digraph().vertex(king.vertex);
        lines.push(format!(
            "vertex {} in {} has {} k_val {}, and is composed of vertex {} of {}, and vertex {} of {}:",
            vertex,
            name,
            extremum.adjective(),
            king.eccentricity,
            product.left().digraph().vertex(king.left),
            product.left().name(),
            product.right().digraph().vertex(king.right),
            product.right().name(),
        ));
        lines.push(format!("\t>> {}", describe_component(product.left(), king.left)));
        lines.push(format!("\t>> {}", describe_component(product.right(), king.right)));
    }
    lines
}

/// One-line verdict of the product's max eccentricity against `n1 * n2 - 1`.
pub fn describe_bound(product: &ProductDigraph<'_>) -> String {
    let name = product.name();
    match product.bound_status() {
        BoundStatus::NoKings => format!(
            "{} has no kings, is unqualified for checking against upper-bound.",
            name
        ),
        BoundStatus::Below {
            max_eccentricity,
            bound,
        } => format!(
            "Maximal k_val of {} is below theorized upper-bound, max_k_val is: {}; upper_bound_val is: {}.",
            name, max_eccentricity, bound
        ),
        BoundStatus::AtBound { bound } => format!(
            "Maximal k_val of {} is equal to theorized upper-bound, max_k_val is: {} = {}.",
            name, bound, bound
        ),
        BoundStatus::Above {
            max_eccentricity,
            bound,
        } => format!(
            "Maximal k_val of {} exceeds theorized upper-bound, max_k_val is: {}; upper_bound_val is: {}.",
            name, max_eccentricity, bound
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_bit_triangle;
    use crate::king::analyze;
    use crate::Digraph;

    #[test]
    fn test_tournament_characteristics() {
        let t = analyze(parse_bit_triangle("110111", "T4").unwrap());
        let lines = digraph_characteristics(&t, true);
        assert_eq!(lines[0], "tournament name: T4");
        assert_eq!(lines[1], "order: 4");
        assert_eq!(lines[2], "vertices: [1, 2, 3, 4]");
        assert_eq!(lines[3], "size: 6");
        assert_eq!(lines[4], "(4,4)-tournament");
        assert_eq!(lines[5], "tournament kings: [1, 2, 4]");
        assert_eq!(lines[6], "strong components: [[1, 2, 3, 4]]");
    }

    #[test]
    fn test_emperor_characteristics() {
        let t = analyze(parse_bit_triangle("111", "T3_1").unwrap());
        let lines = digraph_characteristics(&t, true);
        assert_eq!(lines[4], "(3,1)-tournament");
        assert_eq!(lines[5], "tournament emperor: 1");
    }

    #[test]
    fn test_digraph_characteristics_without_kings() {
        let d = analyze(Digraph::from_labels("C3+e", [4], [(1, 2), (2, 3), (3, 1)]));
        let lines = digraph_characteristics(&d, true);
        assert_eq!(lines[0], "digraph name: C3+e");
        assert!(lines.contains(&"digraph kings: []".to_string()));
        assert!(lines.contains(&"max_k_val: 0".to_string()));
        assert_eq!(lines.last().unwrap(), "strong components: [[1, 2, 3], [4]]");
    }

    #[test]
    fn test_king_characteristics_with_invariants() {
        let d = analyze(Digraph::from_arcs("C3", [(1, 2), (2, 3), (3, 1)])).compute_cycle_invariants(true, true);
        let lines = king_characteristics(&d, false);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "vertex: 1, k_val: 2, Dv: {3}, GCD(Dv): 3, Cv: {3}, GCD(Cv): 3");
    }

    #[test]
    fn test_extremal_king_description() {
        let c2 = analyze(Digraph::from_arcs("C2", [(1, 2), (2, 1)])).compute_cycle_invariants(true, false);
        let c3 = analyze(Digraph::from_arcs("C3", [(1, 2), (2, 3), (3, 1)])).compute_cycle_invariants(true, false);
        let product = ProductDigraph::of(&c2, &c3);
        let lines = describe_extremal_kings(&product, Extremum::Max);
        // C2 x C3 is a 6-cycle: six kings, three lines each
        assert_eq!(lines.len(), 18);
        assert_eq!(
            lines[0],
            "vertex (1, 1) in C2xC3 has maximal k_val 5, and is composed of vertex 1 of C2, and vertex 1 of C3:"
        );
        assert_eq!(
            lines[1],
            "\t>> vertex 1 from C2 has k_val 1, and is on closed diwalks of lengths (Dv = {2}), with GCD(Dv) = 2."
        );
        assert_eq!(
            describe_bound(&product),
            "Maximal k_val of C2xC3 is equal to theorized upper-bound, max_k_val is: 5 = 5."
        );
    }

    #[test]
    fn test_no_king_descriptions() {
        let c3 = analyze(Digraph::from_arcs("C3", [(1, 2), (2, 3), (3, 1)]));
        let product = ProductDigraph::of(&c3, &c3);
        assert_eq!(
            describe_extremal_kings(&product, Extremum::Min),
            vec!["C3xC3 has no kings, unable to retrieve minimal k_val kings.".to_string()]
        );
        assert!(describe_bound(&product).contains("has no kings"));
    }
}
