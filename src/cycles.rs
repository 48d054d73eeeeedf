//! Simple-cycle enumeration.
//!
//! Every simple cycle is reported exactly once, rooted at its smallest
//! vertex index. The search from a root only enters larger vertices of the
//! root's strong component, since no cycle through the root can leave it.
//! The number of simple cycles can grow exponentially with the order, so
//! callers should only enumerate cycles on small digraphs.

use crate::Digraph;
use itertools::Itertools;
use petgraph::algo::kosaraju_scc;
use std::collections::BTreeSet;

/// Strong-component id of every vertex index.
fn component_ids(digraph: &Digraph) -> Vec<usize> {
    let mut ids = vec![0; digraph.order()];
    for (id, component) in kosaraju_scc(digraph.graph()).into_iter().enumerate() {
        for node in component {
            ids[node.index()] = id;
        }
    }
    ids
}

/// Calls `visit` once per simple cycle with its vertex indices in traversal
/// order. A self-loop is the cycle `[v]`.
pub fn for_each_simple_cycle<F>(digraph: &Digraph, mut visit: F)
where
    F: FnMut(&[usize]),
{
    let n = digraph.order();
    let adjacency: Vec<Vec<usize>> = (0..n)
        .map(|u| digraph.out_neighbors(u).sorted().collect())
        .collect();
    let component = component_ids(digraph);
    let mut on_path = vec![false; n];

    for start in 0..n {
        let mut path = vec![start];
        let mut cursor = vec![0usize];
        on_path[start] = true;

        while let Some(&vertex) = path.last() {
            let depth = path.len() - 1;
            match adjacency[vertex].get(cursor[depth]) {
                Some(&next) => {
                    cursor[depth] += 1;
                    if next == start {
                        visit(&path);
                    } else if next > start
                        && !on_path[next]
                        && component[next] == component[start]
                    {
                        on_path[next] = true;
                        path.push(next);
                        cursor.push(0);
                    }
                }
                None => {
                    on_path[vertex] = false;
                    path.pop();
                    cursor.pop();
                }
            }
        }
    }
}

/// All simple cycles, each rooted at its smallest vertex index.
pub fn simple_cycles(digraph: &Digraph) -> Vec<Vec<usize>> {
    let mut cycles = Vec::new();
    for_each_simple_cycle(digraph, |cycle| cycles.push(cycle.to_vec()));
    cycles
}

/// For every vertex index, the set of lengths of simple cycles through it.
pub fn cycle_lengths_by_vertex(digraph: &Digraph) -> Vec<BTreeSet<usize>> {
    let mut lengths = vec![BTreeSet::new(); digraph.order()];
    for_each_simple_cycle(digraph, |cycle| {
        for &v in cycle {
            lengths[v].insert(cycle.len());
        }
    });
    lengths
}
