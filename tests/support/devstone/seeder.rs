//! A one-shot atomic that fires a single value on its output port at
//! `t = 0` and never fires again, used to kick off a DEVStone run without
//! relying on external injection.

use xdevs::modeling::{Atomic, Component, OutPort};

pub struct DEVStoneSeeder {
    component: Component,
    output: OutPort<usize>,
    sigma: f64,
}

impl DEVStoneSeeder {
    pub fn new(name: &str) -> Self {
        let mut component = Component::new(name);
        let output = component.add_out_port("output");
        Self {
            component,
            output,
            sigma: 0.,
        }
    }
}

impl Atomic for DEVStoneSeeder {
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

    fn lambdaf(&self) {
        self.output.add_value(0);
    }

    fn deltint(&mut self) {
        self.sigma = f64::INFINITY;
    }

    fn deltext(&mut self, _e: f64) {}
}
