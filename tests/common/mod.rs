#![allow(dead_code)]

use medoid_pt::{EngineConfig, LadderMode, Problem};

/// Four items, k = 2. The best pair is {0, 1} with cost 1.3.
pub const SMALL_D: [f64; 16] = [
    0.0, 1.0, 2.0, 3.0, //
    1.0, 0.0, 4.0, 5.0, //
    2.0, 4.0, 0.0, 6.0, //
    3.0, 5.0, 6.0, 0.0,
];
pub const SMALL_B: [f64; 4] = [0.1, 0.2, 0.3, 0.4];
pub const SMALL_OPTIMUM: f64 = 1.3;

pub fn small_problem(target: Option<f64>) -> Problem {
    Problem::new(4, 2, SMALL_D.to_vec(), SMALL_B.to_vec(), target).unwrap()
}

/// Symmetric random cost matrix with a zero diagonal.
pub fn random_problem(n: usize, k: usize, seed: u64) -> Problem {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut d = vec![0.0; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let v = rng.f64() * 2.0 - 1.0;
            d[i * n + j] = v;
            d[j * n + i] = v;
        }
    }
    let b = (0..n).map(|_| rng.f64()).collect();
    Problem::new(n, k, d, b, None).unwrap()
}

/// Points on a line; pairwise distance is |x_i - x_j|.
pub fn line_distances(xs: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut d = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            d[i * n + j] = (xs[i] - xs[j]).abs();
        }
    }
    d
}

/// Small, seeded, quick-to-run engine settings.
pub fn quick_config(replicas: usize, cores: usize) -> EngineConfig {
    EngineConfig {
        round_limit: 200,
        replicas_per_controller: replicas,
        num_controllers: 1,
        cores_per_controller: cores,
        t_max: 5.0,
        t_min: 0.01,
        ladder_mode: LadderMode::ExponentialTemperature,
        time_limit: 30.0,
        stagnation_limit: 10_000,
        seed: Some(42),
    }
}

/// Exhaustive minimum over all k-subsets (small n only).
pub fn brute_force_min(problem: &Problem) -> f64 {
    let n = problem.num_vars();
    let k = problem.num_k();
    let mut best = f64::INFINITY;
    let mut subset = Vec::with_capacity(k);
    fn walk(p: &Problem, start: usize, n: usize, k: usize, subset: &mut Vec<usize>, best: &mut f64) {
        if subset.len() == k {
            *best = best.min(p.evaluate(subset));
            return;
        }
        for i in start..n {
            subset.push(i);
            walk(p, i + 1, n, k, subset, best);
            subset.pop();
        }
    }
    walk(problem, 0, n, k, &mut subset, &mut best);
    best
}
