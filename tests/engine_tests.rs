mod common;

use common::{brute_force_min, quick_config, random_problem, small_problem, SMALL_OPTIMUM};
use medoid_pt::solver::{Engine, ProgressCallback, RoundOutcome, RoundReport, SearchStatus};
use medoid_pt::{EngineConfig, LadderMode, SolverError};
use std::cell::RefCell;

#[test]
fn test_round_limit_reached() {
    let problem = random_problem(20, 4, 1);
    let config = EngineConfig {
        round_limit: 5,
        ..quick_config(4, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();

    assert!(!engine.solve());
    assert_eq!(engine.status(), SearchStatus::RoundLimitReached);
    assert_eq!(engine.current_round(), 5);
    assert!(engine.run_time() >= 0.0);
}

#[test]
fn test_generous_target_succeeds_on_lowest_replica() {
    let problem = small_problem(Some(1e9));
    let mut engine = Engine::new(&problem, quick_config(4, 2)).unwrap();

    assert!(engine.solve());
    assert_eq!(engine.status(), SearchStatus::SuccessFound(0));
    assert_eq!(engine.current_round(), 1);
}

#[test]
fn test_tight_target_is_found() {
    let problem = small_problem(Some(SMALL_OPTIMUM + 1e-9));
    let mut engine = Engine::new(&problem, quick_config(4, 2)).unwrap();

    assert!(engine.solve());
    let id = engine.status().replica().unwrap();
    assert!(engine.replicas()[id].cost_min() <= SMALL_OPTIMUM + 1e-9);
    assert!((engine.cost_min() - SMALL_OPTIMUM).abs() < 1e-9);
}

#[test]
fn test_stagnation_returns_best_replica() {
    let problem = small_problem(None);
    let config = EngineConfig {
        stagnation_limit: 20,
        round_limit: 10_000,
        ..quick_config(4, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();

    assert!(engine.solve());
    match engine.status() {
        SearchStatus::Stagnated(id) => {
            assert_eq!(id, engine.cost_min_id());
            assert_eq!(engine.replicas()[id].cost_min(), engine.cost_min());
        }
        other => panic!("expected stagnation, got {:?}", other),
    }
    assert_eq!(engine.stagnation_counter(), 20);
    assert!((engine.cost_min() - SMALL_OPTIMUM).abs() < 1e-9);
}

#[test]
fn test_time_limit_stops_after_first_round() {
    let problem = random_problem(20, 4, 2);
    let config = EngineConfig {
        time_limit: 1e-9,
        ..quick_config(4, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();

    assert!(!engine.solve());
    assert_eq!(engine.status(), SearchStatus::TimedOut);
    assert_eq!(engine.current_round(), 1);
}

#[test]
fn test_success_beats_other_stops() {
    let problem = small_problem(Some(1e9));
    let config = EngineConfig {
        time_limit: 1e-9,
        stagnation_limit: 1,
        round_limit: 1,
        ..quick_config(4, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();

    assert!(engine.solve());
    assert_eq!(engine.status(), SearchStatus::SuccessFound(0));
}

#[test]
fn test_execute_round_reports_success() {
    let problem = small_problem(Some(1e9));
    let mut engine = Engine::new(&problem, quick_config(2, 1)).unwrap();
    assert_eq!(engine.execute_round(), RoundOutcome::Success(0));
}

#[test]
fn test_matches_brute_force() {
    let problem = random_problem(12, 4, 77);
    let expected = brute_force_min(&problem);
    let config = EngineConfig {
        round_limit: 300,
        ..quick_config(8, 4)
    };
    let mut engine = Engine::new(&problem, config).unwrap();
    engine.solve();

    assert!((engine.cost_min() - expected).abs() < 1e-9);
    assert!((problem.evaluate(&engine.cost_min_state()) - expected).abs() < 1e-9);
}

#[test]
fn test_multiple_controllers_keep_own_permutations() {
    let problem = random_problem(16, 4, 3);
    let config = EngineConfig {
        num_controllers: 3,
        ladder_mode: LadderMode::LinearBeta,
        ..quick_config(5, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();

    assert_eq!(engine.controllers().len(), 3);
    assert_eq!(engine.replicas().len(), 15);
    assert_eq!(engine.placement().len(), 15);

    for round in 0..40 {
        assert_eq!(engine.execute_round(), RoundOutcome::Continue);

        for c in engine.controllers() {
            assert_eq!(c.num_replicas(), 5);
            assert!(c.permutations_consistent(), "round {}", round);
        }
        for (id, r) in engine.replicas().iter().enumerate() {
            assert_eq!(r.id(), id);
            assert!(r.state_is_valid(), "round {}, replica {}", round, id);
            assert!(r.cost_min() <= r.cost(), "round {}, replica {}", round, id);
        }
    }
}

#[test]
fn test_cold_slot_holds_lower_cost_after_exchange() {
    let problem = random_problem(40, 6, 12);
    let runs = 16;
    let mut ordered = 0;

    for seed in 0..runs {
        let config = EngineConfig {
            round_limit: 60,
            t_min: 0.01,
            t_max: 100.0,
            seed: Some(seed),
            ..quick_config(2, 1)
        };
        let mut engine = Engine::new(&problem, config).unwrap();
        engine.solve();
        assert_eq!(engine.status(), SearchStatus::RoundLimitReached);

        let c = &engine.controllers()[0];
        let costs = engine.replica_costs();
        if costs[c.replica_at(0)] <= costs[c.replica_at(1)] {
            ordered += 1;
        }
    }

    assert!(ordered * 5 >= runs * 4, "{} of {} runs", ordered, runs);
}

#[test]
fn test_warm_start_seeds_every_replica() {
    let problem = small_problem(None);
    let mut engine = Engine::new(&problem, quick_config(4, 2)).unwrap();

    engine.warm_start(&[1, 0]).unwrap();
    assert!((engine.cost_min() - SMALL_OPTIMUM).abs() < 1e-9);
    for (r, &cost) in engine.replicas().iter().zip(engine.replica_costs()) {
        assert_eq!(r.active(), &[1, 0]);
        assert_eq!(r.cost(), cost);
    }

    engine.solve();
    assert!((engine.cost_min() - SMALL_OPTIMUM).abs() < 1e-9);
}

#[test]
fn test_invalid_warm_start_is_rejected() {
    let problem = small_problem(None);
    let mut engine = Engine::new(&problem, quick_config(4, 2)).unwrap();
    let before: Vec<Vec<usize>> = engine.replicas().iter().map(|r| r.active().to_vec()).collect();

    for items in [&[0, 0][..], &[0][..], &[0, 4][..]] {
        assert!(matches!(
            engine.warm_start(items),
            Err(SolverError::Validation(_))
        ));
    }
    for (r, b) in engine.replicas().iter().zip(&before) {
        assert_eq!(r.active(), b.as_slice());
    }
}

#[test]
fn test_iterations_per_round_is_n_times_k() {
    let problem = random_problem(10, 3, 0);
    let engine = Engine::new(&problem, quick_config(2, 1)).unwrap();
    assert_eq!(engine.iterations_per_round(), 30);
    for c in engine.controllers() {
        assert_eq!(c.base_iterations(), 30);
    }
}

#[test]
fn test_cost_min_id_prefers_lowest_index_on_ties() {
    let problem = small_problem(None);
    let config = EngineConfig {
        round_limit: 50,
        ..quick_config(6, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();
    engine.solve();

    let best = engine.cost_min();
    let first = engine
        .replicas()
        .iter()
        .position(|r| r.cost_min() == best)
        .unwrap();
    assert_eq!(engine.cost_min_id(), first);
}

#[test]
fn test_seeded_runs_agree_on_initial_states() {
    let problem = random_problem(30, 5, 9);
    let a = Engine::new(&problem, quick_config(4, 2)).unwrap();
    let b = Engine::new(&problem, quick_config(4, 2)).unwrap();
    for (ra, rb) in a.replicas().iter().zip(b.replicas()) {
        assert_eq!(ra.active(), rb.active());
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let problem = random_problem(10, 3, 0);
    for config in [
        EngineConfig {
            replicas_per_controller: 0,
            ..quick_config(2, 1)
        },
        EngineConfig {
            cores_per_controller: 0,
            ..quick_config(2, 1)
        },
        EngineConfig {
            t_min: 20.0,
            ..quick_config(2, 1)
        },
        EngineConfig {
            time_limit: -1.0,
            ..quick_config(2, 1)
        },
    ] {
        assert!(Engine::new(&problem, config).is_err());
    }
}

struct Recorder {
    rounds: RefCell<Vec<RoundReport>>,
}

impl ProgressCallback for Recorder {
    fn on_round(&self, report: &RoundReport) {
        self.rounds.borrow_mut().push(*report);
    }
}

#[test]
fn test_progress_callback_sees_every_round() {
    let problem = random_problem(15, 3, 4);
    let config = EngineConfig {
        round_limit: 7,
        ..quick_config(4, 2)
    };
    let mut engine = Engine::new(&problem, config).unwrap();
    let recorder = Recorder {
        rounds: RefCell::new(Vec::new()),
    };
    engine.solve_with(&recorder);

    let rounds = recorder.rounds.borrow();
    assert_eq!(rounds.len(), 7);
    for (i, r) in rounds.iter().enumerate() {
        assert_eq!(r.round, i + 1);
    }
    for w in rounds.windows(2) {
        assert!(w[1].cost_min <= w[0].cost_min);
    }
}
