//! Measurements over realized knows graphs.
//!
//! The local clustering coefficient of a node is the fraction of its
//! neighbor pairs that are themselves connected:
//!
//! ```text
//! cc(v) = 2 · triangles(v) / (k(v) · (k(v) − 1))
//! ```
//!
//! Nodes with fewer than two neighbors have coefficient 0.

use petgraph::graph::{NodeIndex, UnGraph};

/// Per-node local clustering coefficients, in node-index order.
pub fn clustering_coefficient_list<N, E>(graph: &UnGraph<N, E>) -> Vec<f64> {
    let n = graph.node_count();
    let mut coefficients = vec![0.0; n];
    for node in 0..n {
        let neighbors: Vec<NodeIndex> = graph.neighbors(NodeIndex::new(node)).collect();
        let k = neighbors.len();
        if k < 2 {
            continue;
        }
        let mut links = 0usize;
        for (pos, &u) in neighbors.iter().enumerate() {
            for &v in &neighbors[pos + 1..] {
                if graph.find_edge(u, v).is_some() {
                    links += 1;
                }
            }
        }
        coefficients[node] = 2.0 * links as f64 / (k * (k - 1)) as f64;
    }
    coefficients
}

/// Mean local clustering coefficient over all nodes.
///
/// Returns 0.0 for an empty graph.
pub fn mean_clustering_coefficient<N, E>(graph: &UnGraph<N, E>) -> f64 {
    let coefficients = clustering_coefficient_list(graph);
    if coefficients.is_empty() {
        return 0.0;
    }
    coefficients.iter().sum::<f64>() / coefficients.len() as f64
}
