pub mod anneal;

use crate::model::Problem;
use fastrand::Rng;
use std::time::Duration;

/// Bookkeeping from the most recent call to `execute_round`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundStats {
    pub duration: Duration,
    pub round_number: usize,
    pub cost: f64,
    pub cost_min: f64,
    pub trials: usize,
    pub accepted: usize,
}

impl RoundStats {
    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }
}

/// One Metropolis chain over size-k subsets with cached local fields.
#[repr(align(64))]
pub struct Replica<'p> {
    id: usize,
    problem: &'p Problem,
    rng: Rng,

    // Active set in scan order, plus a membership mask over all n items
    active: Vec<usize>,
    active_mask: Vec<bool>,

    cursor: usize,
    i_on: usize,
    i_off: usize,
    tried_on_slot: usize,

    h_vec: Vec<f64>,
    cost: f64,

    cost_min: f64,
    active_min: Vec<usize>,

    last_round: RoundStats,
}

impl<'p> Replica<'p> {
    pub fn new(id: usize, problem: &'p Problem, seed: Option<u64>) -> Self {
        let mut rng = if let Some(s) = seed {
            Rng::with_seed(s)
        } else {
            Rng::new()
        };

        let n = problem.num_vars();
        let k = problem.num_k();

        let mut active = Vec::with_capacity(k);
        let mut active_mask = vec![false; n];
        for _ in 0..k {
            let mut candidate = rng.usize(0..n);
            while active_mask[candidate] {
                candidate = rng.usize(0..n);
            }
            active_mask[candidate] = true;
            active.push(candidate);
        }

        let mut r = Replica {
            id,
            problem,
            rng,
            active,
            active_mask,
            cursor: 0,
            i_on: 0,
            i_off: 0,
            tried_on_slot: 0,
            h_vec: vec![0.0; n],
            cost: 0.0,
            cost_min: f64::MAX,
            active_min: Vec::with_capacity(k),
            last_round: RoundStats::default(),
        };

        r.reset_cursors();
        let (cost, h_vec) = r.recompute();
        r.cost = cost;
        r.h_vec = h_vec;
        r.set_min_state();
        r.last_round.cost = r.cost;
        r.last_round.cost_min = r.cost_min;

        r
    }

    /// Replaces the active set (e.g. a warm start) and rebuilds all cached state.
    /// Returns false, leaving the replica untouched, when `items` is not a
    /// valid set of k distinct indices.
    pub fn inject_state(&mut self, items: &[usize]) -> bool {
        let n = self.problem.num_vars();
        if items.len() != self.problem.num_k() {
            return false;
        }
        let mut mask = vec![false; n];
        for &i in items {
            if i >= n || mask[i] {
                return false;
            }
            mask[i] = true;
        }

        self.active = items.to_vec();
        self.active_mask = mask;
        self.reset_cursors();

        let (cost, h_vec) = self.recompute();
        self.cost = cost;
        self.h_vec = h_vec;
        if self.cost < self.cost_min {
            self.set_min_state();
        }
        true
    }

    /// From-scratch O(n·k) cost and local fields of the current active set.
    /// `H(i) = sum_{j in S} D(i,j) + B(i)`.
    pub fn recompute(&self) -> (f64, Vec<f64>) {
        let n = self.problem.num_vars();
        let mut h_vec = vec![0.0; n];
        for (i, h) in h_vec.iter_mut().enumerate() {
            let row = self.problem.d_row(i);
            for &j in &self.active {
                *h += row[j];
            }
        }

        let mut cost = 0.0;
        for &i in &self.active {
            cost += h_vec[i];
        }
        cost *= 0.5;

        for &i in &self.active {
            cost += self.problem.b(i);
        }
        for (i, h) in h_vec.iter_mut().enumerate() {
            *h += self.problem.b(i);
        }

        (cost, h_vec)
    }

    fn reset_cursors(&mut self) {
        let n = self.problem.num_vars();
        self.cursor = 0;
        self.i_on = self.active[0];
        self.tried_on_slot = 0;
        self.i_off = (self.i_on + 1) % n;
        while self.active_mask[self.i_off] {
            self.i_off = (self.i_off + 1) % n;
        }
    }

    pub(crate) fn set_min_state(&mut self) {
        self.cost_min = self.cost;
        self.active_min.clear();
        self.active_min.extend_from_slice(&self.active);
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn problem(&self) -> &'p Problem {
        self.problem
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn cost_min(&self) -> f64 {
        self.cost_min
    }

    pub fn cost_min_state(&self) -> &[usize] {
        &self.active_min
    }

    pub fn active(&self) -> &[usize] {
        &self.active
    }

    pub fn is_active(&self, i: usize) -> bool {
        self.active_mask[i]
    }

    pub fn local_fields(&self) -> &[f64] {
        &self.h_vec
    }

    /// Index currently considered for removal and candidate for insertion.
    pub fn scan_position(&self) -> (usize, usize) {
        (self.i_on, self.i_off)
    }

    pub fn last_round(&self) -> &RoundStats {
        &self.last_round
    }

    pub fn round_time(&self) -> f64 {
        self.last_round.duration.as_secs_f64()
    }

    /// True iff the active set holds exactly k distinct in-range indices
    /// that agree with the membership mask.
    pub fn state_is_valid(&self) -> bool {
        let n = self.problem.num_vars();
        if self.active.len() != self.problem.num_k() {
            return false;
        }
        let mut seen = vec![false; n];
        for &i in &self.active {
            if i >= n || seen[i] || !self.active_mask[i] {
                return false;
            }
            seen[i] = true;
        }
        self.active_mask.iter().filter(|&&m| m).count() == self.active.len()
    }
}
