//! Scenario 6 of spec §8: the thread-parallel coordinator must produce the
//! same final `time_last`/`time_next` and transition-count totals as the
//! sequential coordinator, for any model and seed sequence.

#![cfg(feature = "parallel")]

mod support;

use support::devstone::{hi, new_probe};
use xdevs::sim::{Coordinator, ParallelCoordinator, Processor, RootCoordinator};

#[test]
fn thread_parallel_matches_sequential_for_hi() {
    for (width, depth) in [(1, 1), (3, 4), (5, 3)] {
        let seq_probe = new_probe();
        let seq_model = hi::create(width, depth, 0, 0, seq_probe.clone());
        let mut seq_root = RootCoordinator::new(Coordinator::new(seq_model, None, false, false));
        seq_root.initialize();
        seq_root.simulate_inf();
        seq_root.exit();

        let par_probe = new_probe();
        let par_model = hi::create(width, depth, 0, 0, par_probe.clone());
        let mut par_root = RootCoordinator::new(ParallelCoordinator::with_default_pool(par_model, None, false, false));
        par_root.initialize();
        par_root.simulate_inf();
        par_root.exit();

        assert_eq!(seq_root.time_last(), par_root.time_last(), "time_last @ w={width} d={depth}");
        assert_eq!(seq_root.time_next(), par_root.time_next(), "time_next @ w={width} d={depth}");

        let seq = seq_probe.lock().unwrap();
        let par = par_probe.lock().unwrap();
        assert_eq!(seq.n_internals, par.n_internals, "int_count totals @ w={width} d={depth}");
        assert_eq!(seq.n_externals, par.n_externals, "ext_count totals @ w={width} d={depth}");
        assert_eq!(seq.n_events, par.n_events, "n_events totals @ w={width} d={depth}");
    }
}
