//! The DEVStone benchmark model family, used here only as a test fixture
//! (spec §1 places "the benchmark model families used by tests" out of
//! scope for the kernel itself; see `iscar-ucm-xdevs.rs/src/devstone/{hi,ho}.rs`
//! and its `devstone/atomic.rs`, which this module generalizes to also
//! produce the LI family per spec §8's structural/behavioral formulas).

pub mod atomic;
pub mod hi;
pub mod li;
pub mod seeder;

use std::sync::{Arc, Mutex};

/// Counters accumulated across every atomic in a built DEVStone model, used
/// to check spec §8's structural and behavioral properties.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestProbe {
    pub n_atomics: usize,
    pub n_eics: usize,
    pub n_ics: usize,
    pub n_eocs: usize,
    pub n_internals: usize,
    pub n_externals: usize,
    pub n_events: usize,
}

pub type SharedProbe = Arc<Mutex<TestProbe>>;

pub fn new_probe() -> SharedProbe {
    Arc::new(Mutex::new(TestProbe::default()))
}
