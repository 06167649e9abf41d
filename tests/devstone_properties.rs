//! Structural and behavioral properties for the LI and HI DEVStone
//! families (spec §8), parameterized over `(width, depth)` the way the
//! teacher's `test_hi` sweeps them.

mod support;

use support::devstone::{hi, li, new_probe};
use xdevs::sim::{Coordinator, Processor, RootCoordinator};

fn expected_atomics(width: usize, depth: usize) -> usize {
    (width - 1) * (depth - 1) + 1
}

fn expected_eics(width: usize, depth: usize) -> usize {
    width * (depth - 1) + 1
}

fn expected_eocs(depth: usize) -> usize {
    depth
}

fn expected_ics_hi(width: usize, depth: usize) -> usize {
    if width > 2 {
        (width - 2) * (depth - 1)
    } else {
        0
    }
}

fn expected_internals_li(width: usize, depth: usize) -> usize {
    (width - 1) * (depth - 1) + 1
}

fn expected_internals_hi(width: usize, depth: usize) -> usize {
    (width - 1) * width / 2 * (depth - 1) + 1
}

#[test]
fn li_structural_and_behavioral_properties() {
    for width in (1..20).step_by(3) {
        for depth in (1..20).step_by(3) {
            let probe = new_probe();
            let model = li::create(width, depth, 0, 0, probe.clone());
            let mut root = RootCoordinator::new(Coordinator::new(model, None, false, false));
            root.initialize();
            root.simulate_inf();
            root.exit();

            let p = probe.lock().unwrap();
            assert_eq!(expected_atomics(width, depth), p.n_atomics, "atomics @ w={width} d={depth}");
            assert_eq!(expected_eics(width, depth), p.n_eics, "eics @ w={width} d={depth}");
            assert_eq!(0, p.n_ics, "LI must have no IC @ w={width} d={depth}");
            assert_eq!(expected_eocs(depth), p.n_eocs, "eocs @ w={width} d={depth}");
            assert_eq!(expected_internals_li(width, depth), p.n_internals);
            assert_eq!(expected_internals_li(width, depth), p.n_externals);
            assert_eq!(expected_internals_li(width, depth), p.n_events);
        }
    }
}

#[test]
fn hi_structural_and_behavioral_properties() {
    for width in (1..20).step_by(3) {
        for depth in (1..20).step_by(3) {
            let probe = new_probe();
            let model = hi::create(width, depth, 0, 0, probe.clone());
            let mut root = RootCoordinator::new(Coordinator::new(model, None, false, false));
            root.initialize();
            root.simulate_inf();
            root.exit();

            let p = probe.lock().unwrap();
            assert_eq!(expected_atomics(width, depth), p.n_atomics, "atomics @ w={width} d={depth}");
            assert_eq!(expected_eics(width, depth), p.n_eics, "eics @ w={width} d={depth}");
            assert_eq!(expected_ics_hi(width, depth), p.n_ics, "ics @ w={width} d={depth}");
            assert_eq!(expected_eocs(depth), p.n_eocs, "eocs @ w={width} d={depth}");
            assert_eq!(expected_internals_hi(width, depth), p.n_internals);
            assert_eq!(expected_internals_hi(width, depth), p.n_externals);
            assert_eq!(expected_internals_hi(width, depth), p.n_events);
        }
    }
}

#[test]
fn li_depth_3_width_4_matches_scenario_5() {
    let probe = new_probe();
    let model = li::create(4, 3, 0, 0, probe.clone());
    let mut root = RootCoordinator::new(Coordinator::new(model, None, false, false));
    root.initialize();
    root.simulate_inf();
    root.exit();

    let p = probe.lock().unwrap();
    assert_eq!(7, p.n_atomics);
    assert_eq!(9, p.n_eics);
    assert_eq!(3, p.n_eocs);
    assert_eq!(0, p.n_ics);
}
