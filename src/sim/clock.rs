use std::sync::{Arc, Mutex};

/// Shared mutable holder of the current virtual simulation time.
///
/// Exactly one instance per simulation; every processor in the tree holds a
/// clone of the same handle. An `Arc<Mutex<f64>>` newtype rather than a bare
/// `Rc<Cell<f64>>` so the same type works unmodified under the thread-parallel
/// strategy, whose workers only ever read the clock (see `sim::parallel`) —
/// one uncontended mutex lock on the sequential hot path in exchange for not
/// needing a second clock type.
#[derive(Debug, Clone)]
pub struct SimulationClock(Arc<Mutex<f64>>);

impl SimulationClock {
    /// Creates a new clock starting at the given time.
    pub fn new(time: f64) -> Self {
        Self(Arc::new(Mutex::new(time)))
    }

    /// Current virtual time.
    pub fn time(&self) -> f64 {
        *self.0.lock().expect("simulation clock mutex poisoned")
    }

    /// Sets the current virtual time. Only the root coordinator and `inject`
    /// call this.
    pub fn set_time(&self, time: f64) {
        *self.0.lock().expect("simulation clock mutex poisoned") = time;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(0.)
    }
}
