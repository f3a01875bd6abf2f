use crate::error::{SolverError, SolverResult};
use serde::Serialize;

/// Edge densities of a clustering over an undirected graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeDensities {
    /// Fraction of all possible edges that exist.
    pub overall: f64,
    /// Mean density inside each cluster (clusters of one item contribute 0).
    pub intra: f64,
    /// Mean density of the edges running between each pair of clusters.
    pub inter: f64,
}

/// `assignments[i]` is the cluster (0..k) of item `i`; `adjacency` is a
/// symmetric n×n 0/1 matrix.
pub fn edge_densities(
    assignments: &[usize],
    num_k: usize,
    adjacency: &[u8],
) -> SolverResult<EdgeDensities> {
    let n = assignments.len();
    if adjacency.len() != n * n {
        return Err(SolverError::Validation(format!(
            "Adjacency matrix has {} entries, expected {}x{}",
            adjacency.len(),
            n,
            n
        )));
    }
    if n < 2 || num_k == 0 {
        return Err(SolverError::Validation(
            "Edge densities need at least two items and one cluster".to_string(),
        ));
    }
    if let Some(&bad) = assignments.iter().find(|&&a| a >= num_k) {
        return Err(SolverError::Validation(format!(
            "Assignment {} is outside 0..{}",
            bad, num_k
        )));
    }

    let mut count_by_class = vec![0.0f64; num_k];
    for &a in assignments {
        count_by_class[a] += 1.0;
    }

    // Upper-triangular counts; intra edges are seen twice so each adds one half.
    let mut edges = vec![0.0f64; num_k * num_k];
    let mut total_edges = 0.0;
    for i in 0..n {
        let ci = assignments[i];
        for j in 0..n {
            if adjacency[i * n + j] != 1 {
                continue;
            }
            total_edges += 0.5;
            let cj = assignments[j];
            if ci == cj {
                edges[ci * num_k + cj] += 0.5;
            } else if cj > ci {
                edges[ci * num_k + cj] += 1.0;
            }
        }
    }

    let n_f = n as f64;
    let overall = total_edges / (0.5 * n_f * (n_f - 1.0));

    let mut intra = 0.0;
    let mut inter = 0.0;
    for i in 0..num_k {
        let n_i = count_by_class[i];
        if n_i > 1.0 {
            intra += edges[i * num_k + i] / (0.5 * n_i * (n_i - 1.0));
        }
        for j in (i + 1)..num_k {
            let n_j = count_by_class[j];
            let pairs = n_i * n_j;
            if pairs > 0.0 {
                inter += edges[i * num_k + j] / pairs;
            }
        }
    }

    intra /= num_k as f64;
    if num_k > 1 {
        inter /= 0.5 * (num_k * (num_k - 1)) as f64;
    }

    Ok(EdgeDensities {
        overall,
        intra,
        inter,
    })
}
