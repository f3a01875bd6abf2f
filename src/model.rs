use crate::error::{SolverError, SolverResult};

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Read-only description of a cardinality-constrained selection problem.
///
/// The cost of an active set `S` is
/// `0.5 * sum_{i,j in S} D(i,j) + sum_{i in S} B(i)`.
/// `D` must be symmetric with a zero diagonal; the incremental exchange
/// update used by the replicas is only exact under those conditions.
#[derive(Debug, Clone)]
pub struct Problem {
    num_vars: usize,
    num_k: usize,
    d_mat: Vec<f64>,
    b_vec: Vec<f64>,
    target_cost: Option<f64>,
    raw_distances: Option<Vec<f64>>,
}

impl Problem {
    pub fn new(
        num_vars: usize,
        num_k: usize,
        d_mat: Vec<f64>,
        b_vec: Vec<f64>,
        target_cost: Option<f64>,
    ) -> SolverResult<Self> {
        validate_dimensions(num_vars, num_k)?;

        if d_mat.len() != num_vars * num_vars {
            return Err(SolverError::Validation(format!(
                "Cost matrix has {} entries, expected {}x{}",
                d_mat.len(),
                num_vars,
                num_vars
            )));
        }
        if b_vec.len() != num_vars {
            return Err(SolverError::Validation(format!(
                "Bias vector has {} entries, expected {}",
                b_vec.len(),
                num_vars
            )));
        }
        if let Some(idx) = b_vec.iter().position(|v| !v.is_finite()) {
            return Err(SolverError::Validation(format!(
                "Bias entry {} is not finite",
                idx
            )));
        }
        check_symmetric(&d_mat, num_vars)?;

        for i in 0..num_vars {
            if d_mat[i * num_vars + i] != 0.0 {
                return Err(SolverError::Validation(format!(
                    "Cost matrix diagonal entry ({0},{0}) must be zero",
                    i
                )));
            }
        }

        Ok(Self {
            num_vars,
            num_k,
            d_mat,
            b_vec,
            target_cost,
            raw_distances: None,
        })
    }

    /// Builds the k-medoids formulation from a raw distance matrix:
    /// `B(i) = b_scale * sum_j dist(i,j)` and `D = -d_scale * dist`.
    pub fn k_medoids(
        distances: Vec<f64>,
        num_vars: usize,
        num_k: usize,
        d_scale: f64,
        b_scale: f64,
        target_cost: Option<f64>,
    ) -> SolverResult<Self> {
        if distances.len() != num_vars * num_vars {
            return Err(SolverError::Validation(format!(
                "Distance matrix has {} entries, expected {}x{}",
                distances.len(),
                num_vars,
                num_vars
            )));
        }

        let b_vec: Vec<f64> = distances
            .chunks(num_vars.max(1))
            .map(|row| row.iter().sum::<f64>() * b_scale)
            .collect();

        // -0.0 on the diagonal compares equal to zero
        let d_mat: Vec<f64> = distances.iter().map(|&d| -d * d_scale).collect();

        let mut problem = Self::new(num_vars, num_k, d_mat, b_vec, target_cost)?;
        problem.raw_distances = Some(distances);
        Ok(problem)
    }

    #[inline(always)]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[inline(always)]
    pub fn num_k(&self) -> usize {
        self.num_k
    }

    #[inline(always)]
    pub fn d(&self, i: usize, j: usize) -> f64 {
        self.d_mat[i * self.num_vars + j]
    }

    #[inline(always)]
    pub fn d_row(&self, i: usize) -> &[f64] {
        let n = self.num_vars;
        &self.d_mat[i * n..(i + 1) * n]
    }

    #[inline(always)]
    pub fn b(&self, i: usize) -> f64 {
        self.b_vec[i]
    }

    pub fn bias(&self) -> &[f64] {
        &self.b_vec
    }

    pub fn target_cost(&self) -> Option<f64> {
        self.target_cost
    }

    pub fn set_target_cost(&mut self, target: Option<f64>) {
        self.target_cost = target;
    }

    pub fn raw_distances(&self) -> Option<&[f64]> {
        self.raw_distances.as_deref()
    }

    /// Full O(k^2) evaluation of an active set.
    pub fn evaluate(&self, active: &[usize]) -> f64 {
        let mut pair = 0.0;
        let mut bias = 0.0;
        for &i in active {
            bias += self.b_vec[i];
            for &j in active {
                pair += self.d(i, j);
            }
        }
        0.5 * pair + bias
    }

    /// Maps every item to the position (0..k) of its nearest medoid.
    /// Uses the raw distances when available, otherwise `-D`.
    pub fn generate_assignments(&self, medoids: &[usize]) -> Vec<usize> {
        let n = self.num_vars;
        let dist = |i: usize, j: usize| match &self.raw_distances {
            Some(raw) => raw[i * n + j],
            None => -self.d(i, j),
        };

        (0..n)
            .map(|i| {
                let mut best = 0;
                let mut min_d = f64::INFINITY;
                for (pos, &m) in medoids.iter().enumerate() {
                    let d = dist(i, m);
                    if d < min_d {
                        min_d = d;
                        best = pos;
                    }
                }
                best
            })
            .collect()
    }
}

fn validate_dimensions(num_vars: usize, num_k: usize) -> SolverResult<()> {
    if num_k == 0 || num_k >= num_vars {
        return Err(SolverError::Validation(format!(
            "Cardinality k={} must satisfy 1 <= k < n={}",
            num_k, num_vars
        )));
    }
    Ok(())
}

fn check_symmetric(d_mat: &[f64], n: usize) -> SolverResult<()> {
    for i in 0..n {
        for j in i..n {
            let a = d_mat[i * n + j];
            let b = d_mat[j * n + i];
            if !a.is_finite() || !b.is_finite() {
                return Err(SolverError::Validation(format!(
                    "Cost matrix entry ({},{}) is not finite",
                    i, j
                )));
            }
            let scale = 1.0 + a.abs().max(b.abs());
            if (a - b).abs() > SYMMETRY_TOLERANCE * scale {
                return Err(SolverError::Validation(format!(
                    "Cost matrix is not symmetric at ({},{}): {} vs {}",
                    i, j, a, b
                )));
            }
        }
    }
    Ok(())
}
