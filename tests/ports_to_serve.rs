//! Nested `ports_to_serve` propagation (DESIGN.md's "Nested ports_to_serve
//! propagation" decision): a served input port at nesting depth >= 2 must
//! still surface on the root coordinator's `ports_to_serve` map, keyed
//! `"parent.port"` per spec §3/§4.2.

use xdevs::modeling::{Atomic, Component, InPort};
use xdevs::sim::{Coordinator, Processor, RootCoordinator};

struct Sink {
    component: Component,
    input: InPort<i32>,
    sigma: f64,
}

impl Sink {
    fn new(name: &str) -> Self {
        let mut component = Component::new(name);
        let input: InPort<i32> = component.add_in_port("input");
        input.set_serve(true);
        Self {
            component,
            input,
            sigma: f64::INFINITY,
        }
    }
}

impl Atomic for Sink {
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
    fn lambdaf(&self) {}
    fn deltint(&mut self) {}
    fn deltext(&mut self, _e: f64) {
        let _ = self.input.values();
    }
}

#[test]
fn served_port_at_depth_two_reaches_root() {
    let mut leaf = xdevs::modeling::Coupled::new("leaf");
    leaf.add_atomic(Sink::new("sink"));

    let mut mid = xdevs::modeling::Coupled::new("mid");
    mid.add_coupled(leaf);

    let mut top = xdevs::modeling::Coupled::new("top");
    top.add_coupled(mid);

    let mut root = RootCoordinator::new(Coordinator::new(top, None, false, false));
    root.initialize();

    assert!(
        root.ports_to_serve().contains_key("sink.input"),
        "a served port two levels below the root must still be aggregated into \
         the root's ports_to_serve, not just the immediate child's"
    );
}

#[test]
fn served_port_at_depth_three_reaches_root() {
    let mut leaf = xdevs::modeling::Coupled::new("leaf");
    leaf.add_atomic(Sink::new("deep_sink"));

    let mut inner = xdevs::modeling::Coupled::new("inner");
    inner.add_coupled(leaf);

    let mut mid = xdevs::modeling::Coupled::new("mid");
    mid.add_coupled(inner);

    let mut top = xdevs::modeling::Coupled::new("top");
    top.add_coupled(mid);

    let mut root = RootCoordinator::new(Coordinator::new(top, None, false, false));
    root.initialize();

    assert!(
        root.ports_to_serve().contains_key("deep_sink.input"),
        "ports_to_serve must propagate through every nesting level, not just the first"
    );
}
