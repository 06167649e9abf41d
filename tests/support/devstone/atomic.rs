//! Leaf atomic of the DEVStone family, adapted from
//! `iscar-ucm-xdevs.rs/src/devstone/atomic.rs` to the crate's `Atomic` trait
//! (`initialize`/`exit` instead of `start`/`stop`, `sigma`/`set_sigma`
//! instead of a hand-rolled `ta`).

#[cfg(feature = "devstone_busy")]
use cpu_time::ThreadTime;
use std::time::Duration;
use xdevs::modeling::{Atomic, Component, InPort, OutPort};

use super::SharedProbe;

#[derive(Debug, Default)]
struct State {
    n_internals: usize,
    n_externals: usize,
    n_events: usize,
}

/// An atomic that, on every external input, counts the events it received
/// and schedules an immediate internal transition (emitting the running
/// event count on its output port), optionally padded with a fixed
/// int/ext-transition delay to emulate a "busy" benchmark workload.
pub struct DEVStoneAtomic {
    component: Component,
    input: InPort<usize>,
    output: OutPort<usize>,
    int_delay: Option<Duration>,
    ext_delay: Option<Duration>,
    state: State,
    sigma: f64,
    probe: SharedProbe,
}

impl DEVStoneAtomic {
    pub fn new(name: &str, int_delay: u64, ext_delay: u64, probe: SharedProbe) -> Self {
        let mut component = Component::new(name);
        let input = component.add_in_port("input");
        let output = component.add_out_port("output");
        Self {
            component,
            input,
            output,
            int_delay: (int_delay > 0).then(|| Duration::from_millis(int_delay)),
            ext_delay: (ext_delay > 0).then(|| Duration::from_millis(ext_delay)),
            state: State::default(),
            sigma: f64::INFINITY,
            probe,
        }
    }

    fn sleep(duration: &Option<Duration>) {
        if let Some(duration) = duration {
            #[cfg(feature = "devstone_busy")]
            {
                let now = ThreadTime::now();
                let mut x: u32 = 0;
                while now.elapsed() < *duration {
                    std::hint::black_box(&mut x);
                    x = x.wrapping_add(1);
                }
            }
            #[cfg(not(feature = "devstone_busy"))]
            std::thread::sleep(*duration);
        }
    }
}

impl Atomic for DEVStoneAtomic {
    fn get_component(&self) -> &Component {
        &self.component
    }

    fn get_component_mut(&mut self) -> &mut Component {
        &mut self.component
    }

    fn sigma(&self) -> f64 {
        self.sigma
    }

    fn set_sigma(&mut self, sigma: f64) {
        self.sigma = sigma;
    }

    fn int_count(&self) -> usize {
        self.state.n_internals
    }

    fn ext_count(&self) -> usize {
        self.state.n_externals
    }

    fn exit(&mut self) {
        let mut probe = self.probe.lock().expect("probe mutex poisoned");
        probe.n_internals += self.state.n_internals;
        probe.n_externals += self.state.n_externals;
        probe.n_events += self.state.n_events;
    }

    fn lambdaf(&self) {
        self.output.add_value(self.state.n_events);
    }

    fn deltint(&mut self) {
        self.state.n_internals += 1;
        self.sigma = f64::INFINITY;
        Self::sleep(&self.int_delay);
    }

    fn deltext(&mut self, _e: f64) {
        self.state.n_externals += 1;
        self.state.n_events += self.input.values().len();
        self.sigma = 0.;
        Self::sleep(&self.ext_delay);
    }
}
