use super::clock::SimulationClock;
use super::processor::Processor;
use crate::modeling::{Atomic, Component};
use log::debug;

/// Processor that wraps a single atomic model. Owns the model, the `time_last`/
/// `time_next` bookkeeping, and a handle to the shared clock.
#[derive(Debug)]
pub struct Simulator {
    model: Box<dyn Atomic>,
    clock: SimulationClock,
    time_last: f64,
    time_next: f64,
}

impl Simulator {
    pub fn new(model: Box<dyn Atomic>, clock: SimulationClock) -> Self {
        Self {
            model,
            clock,
            time_last: 0.,
            time_next: 0.,
        }
    }

    /// Read-only view of the wrapped atomic's port bundle, used by the owning
    /// coordinator to discover `serve`-flagged input ports during hierarchy
    /// construction.
    pub fn component(&self) -> &Component {
        self.model.get_component()
    }
}

impl Processor for Simulator {
    fn name(&self) -> &str {
        self.model.get_component().get_name()
    }

    fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    fn time_last(&self) -> f64 {
        self.time_last
    }

    fn time_next(&self) -> f64 {
        self.time_next
    }

    fn initialize(&mut self) {
        self.model.initialize();
        self.time_last = self.clock.time();
        self.time_next = self.time_last + self.model.ta();
    }

    fn lambdaf(&mut self) {
        if self.clock.time() == self.time_next {
            self.model.lambdaf();
        }
    }

    fn deltfcn(&mut self) {
        let t = self.clock.time();
        let in_empty = self.model.in_empty();
        debug!(
            "deltfcn {} (empty: {}, t: {})",
            self.name(),
            in_empty,
            t
        );

        if in_empty {
            if t != self.time_next {
                return;
            }
            self.model.deltint();
        } else {
            let e = t - self.time_last;
            self.model.set_sigma(self.model.sigma() - e);
            if t == self.time_next {
                self.model.deltcon(e);
            } else {
                self.model.deltext(e);
            }
        }

        self.time_last = t;
        self.time_next = t + self.model.ta();
        debug!(
            "deltfcn {}: time_last={}, time_next={}",
            self.name(),
            self.time_last,
            self.time_next
        );
    }

    fn clear(&mut self) {
        let component = self.model.get_component();
        component.clear_input();
        component.clear_output();
    }

    fn exit(&mut self) {
        self.model.exit();
    }
}
