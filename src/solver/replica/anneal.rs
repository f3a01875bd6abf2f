use super::{Replica, RoundStats};
use std::time::Instant;

impl<'p> Replica<'p> {
    /// Cost change of replacing active `i_on` with inactive `i_off`.
    /// Exact only for a symmetric cost matrix with a zero diagonal.
    #[inline(always)]
    pub fn delta(&self, i_on: usize, i_off: usize) -> f64 {
        self.h_vec[i_off] - self.h_vec[i_on] - self.problem.d(i_on, i_off)
    }

    /// Runs `iterations` exchange trials at `temperature` and records the
    /// round's wall-clock time. Returns true once the best cost reaches the
    /// problem's target cost.
    pub fn execute_round(&mut self, temperature: f64, iterations: usize) -> bool {
        let start = Instant::now();
        let accepted = self.run_trials(temperature, iterations);

        self.last_round = RoundStats {
            duration: start.elapsed(),
            round_number: self.last_round.round_number + 1,
            cost: self.cost,
            cost_min: self.cost_min,
            trials: iterations,
            accepted,
        };

        match self.problem.target_cost() {
            Some(target) => self.cost_min <= target,
            None => false,
        }
    }

    fn run_trials(&mut self, temperature: f64, iterations: usize) -> usize {
        let inactive_count = self.problem.num_vars() - self.problem.num_k();
        let t_neg = -temperature;
        let mut accepted = 0;

        for _ in 0..iterations {
            let delta = self.delta(self.i_on, self.i_off);

            // u in (0, 1] keeps ln(u) finite
            let u = 1.0 - self.rng.f64();
            if t_neg * u.ln() > delta {
                self.apply_exchange(delta);
                accepted += 1;
                self.advance_active();
            } else {
                self.tried_on_slot += 1;
                if self.tried_on_slot >= inactive_count {
                    self.advance_active();
                }
            }

            self.advance_inactive();
        }

        accepted
    }

    fn apply_exchange(&mut self, delta: f64) {
        let problem = self.problem;
        let (i_on, i_off) = (self.i_on, self.i_off);

        self.cost += delta;

        let row_off = problem.d_row(i_off);
        let row_on = problem.d_row(i_on);
        for ((h, &d_off), &d_on) in self.h_vec.iter_mut().zip(row_off).zip(row_on) {
            *h += d_off - d_on;
        }

        self.active_mask[i_off] = true;
        self.active_mask[i_on] = false;
        self.active[self.cursor] = i_off;

        if self.cost < self.cost_min {
            self.set_min_state();
        }
    }

    #[inline(always)]
    fn advance_active(&mut self) {
        self.cursor = (self.cursor + 1) % self.active.len();
        self.i_on = self.active[self.cursor];
        self.i_off = self.i_on;
        self.tried_on_slot = 0;
    }

    #[inline(always)]
    fn advance_inactive(&mut self) {
        let n = self.active_mask.len();
        self.i_off = (self.i_off + 1) % n;
        while self.active_mask[self.i_off] {
            self.i_off = (self.i_off + 1) % n;
        }
    }
}
