use super::clock::SimulationClock;
use super::error::SimError;
use super::processor::Processor;
use super::simulator::Simulator;
use crate::modeling::{AbstractPort, Component, ComponentNode, Coupled, InPort, Output, Port};
use log::{debug, error};
use std::collections::HashMap;
use std::fmt::Debug;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Processor that wraps a coupled model. Owns the child processor list (built
/// once, in [`Coordinator::initialize`]), the aggregated `ports_to_serve` map,
/// and a handle to the shared clock.
#[derive(Debug)]
pub struct Coordinator {
    model: Coupled,
    clock: SimulationClock,
    children: Vec<Box<dyn Processor>>,
    ports_to_serve: HashMap<String, Arc<dyn AbstractPort>>,
    time_last: f64,
    time_next: f64,
}

impl Coordinator {
    /// Creates a coordinator over `model`. `flatten`/`chain` are applied to
    /// the model immediately, before the processor tree is built.
    pub fn new(model: Coupled, clock: Option<SimulationClock>, flatten: bool, chain: bool) -> Self {
        let mut model = model;
        if flatten {
            model.flatten();
        }
        if chain {
            model.to_chain();
        }
        Self {
            model,
            clock: clock.unwrap_or_default(),
            children: Vec::new(),
            ports_to_serve: HashMap::new(),
            time_last: 0.,
            time_next: 0.,
        }
    }

    fn new_child(model: Coupled, clock: SimulationClock) -> Self {
        Self::new(model, Some(clock), false, false)
    }

    /// Read-only view of the wrapped coupled model's own port bundle.
    pub fn component(&self) -> &Component {
        self.model.get_component()
    }

    /// Ports flagged `serve = true` anywhere in the subtree, keyed by
    /// `"parent.portname"`.
    pub fn ports_to_serve(&self) -> &HashMap<String, Arc<dyn AbstractPort>> {
        &self.ports_to_serve
    }

    fn propagate_input(&self) {
        let (eic, _, _) = self.model.active_links();
        if let Some(eic) = eic {
            for coupling in eic {
                coupling.propagate();
            }
        }
    }

    fn propagate_output(&self) {
        let (_, ic_or_chain, eoc) = self.model.active_links();
        if let Some(links) = ic_or_chain {
            for coupling in links {
                coupling.propagate();
            }
        }
        if let Some(eoc) = eoc {
            for coupling in eoc {
                coupling.propagate();
            }
        }
    }

    fn recompute_time(&mut self) {
        let t_next = self
            .children
            .iter()
            .map(|c| c.time_next())
            .fold(f64::INFINITY, f64::min);
        self.time_last = self.clock.time();
        self.time_next = self.time_last
            + if self.children.is_empty() {
                0.
            } else {
                t_next - self.time_last
            };
    }

    /// `time <= time_next`, or `time` is NaN and `legacy_compat` is set (spec
    /// §9's preserved-on-purpose quirk).
    fn in_window(&self, time: f64, legacy_compat: bool) -> bool {
        time <= self.time_next || (legacy_compat && time.is_nan())
    }

    fn run_micro_cycle(&mut self, time: f64) {
        self.clock.set_time(time);
        self.lambdaf();
        self.deltfcn();
        self.clear();
        self.clock.set_time(self.time_next);
    }

    /// Direct, in-process injection: appends `values` to `port` at elapsed
    /// offset `e` from `time_last`, then runs one micro-cycle if the offset
    /// is within bounds. Returns `false` (with nothing mutated) if rejected.
    pub fn inject<T: 'static + Clone + Debug + Send + Sync>(&mut self, port: &InPort<T>, values: &[T], e: f64) -> bool {
        self.inject_with_options(port, values, e, true)
    }

    /// Same as [`Coordinator::inject`], with explicit control over the
    /// legacy NaN-acceptance quirk.
    pub fn inject_with_options<T: 'static + Clone + Debug + Send + Sync>(
        &mut self,
        port: &InPort<T>,
        values: &[T],
        e: f64,
        legacy_compat: bool,
    ) -> bool {
        let time = self.time_last + e;
        if !self.in_window(time, legacy_compat) {
            error!(
                "time {} - input rejected: elapsed time {} is not in bounds",
                self.time_last, e
            );
            return false;
        }
        debug!("injecting {} value(s) on {}", values.len(), port.name());
        let writer = Port::<Output, T>::new(port.0.clone());
        writer.add_values(values);
        self.run_micro_cycle(time);
        true
    }

    /// Remote injection entry point: resolves `port_name` through
    /// `ports_to_serve`, decodes `values` via the port's JSON deserializer,
    /// and runs a micro-cycle if accepted. See spec §4.3/§7 kind 3 for the
    /// unknown-port quirk this preserves under `legacy_compat`.
    #[cfg(feature = "server")]
    pub fn inject_named(
        &mut self,
        port_name: &str,
        values: Vec<serde_json::Value>,
        e: f64,
        legacy_compat: bool,
    ) -> Result<bool, SimError> {
        let port = match self.ports_to_serve.get(port_name) {
            Some(p) => p.clone(),
            None => {
                error!("port '{}' not found", port_name);
                return if legacy_compat {
                    Ok(true)
                } else {
                    Err(SimError::Structural(format!(
                        "unknown injection port '{}'",
                        port_name
                    )))
                };
            }
        };
        let time = self.time_last + e;
        if !self.in_window(time, legacy_compat) {
            error!(
                "time {} - input rejected: elapsed time {} is not in bounds",
                self.time_last, e
            );
            return Ok(false);
        }
        port.inject_json(values)?;
        self.run_micro_cycle(time);
        Ok(true)
    }
}

impl Processor for Coordinator {
    fn name(&self) -> &str {
        self.model.get_name()
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

    /// Walks `model.components` once, turning each atomic child into a
    /// [`Simulator`] and each coupled child into a nested [`Coordinator`],
    /// both sharing this coordinator's clock. Each child is initialized as
    /// soon as it is built, and its `ports_to_serve` merged immediately
    /// afterward. The Python original merges a nested coordinator's
    /// `ports_to_serve` into the parent's *before* recursing into that
    /// child's own `initialize()` (`sim.py`'s `_add_coordinator` runs before
    /// `_build_hierarchy`'s later `initialize()` pass), so in the original
    /// only the first nesting level's served ports ever reach the root — a
    /// latent bug, not one of the three Open Questions spec §9 flags for
    /// preservation. This crate fixes it outright (build, then initialize,
    /// then merge, so every depth's served ports propagate) rather than
    /// gating it behind `legacy_compat`; see DESIGN.md's Open Question
    /// decisions for the rationale and `tests/ports_to_serve.rs` for
    /// depth-≥2 coverage.
    fn initialize(&mut self) {
        let nodes = std::mem::take(&mut self.model.components);
        for node in nodes {
            match node {
                ComponentNode::Atomic(atomic) => {
                    let mut sim = Simulator::new(atomic, self.clock.clone());
                    sim.initialize();
                    for port in sim.component().in_ports() {
                        if port.serve() {
                            self.ports_to_serve
                                .insert(format!("{}.{}", port.parent(), port.name()), port.clone());
                        }
                    }
                    self.children.push(Box::new(sim));
                }
                ComponentNode::Coupled(coupled) => {
                    let mut coord = Coordinator::new_child(*coupled, self.clock.clone());
                    coord.initialize();
                    for (name, port) in coord.ports_to_serve.drain() {
                        self.ports_to_serve.insert(name, port);
                    }
                    self.children.push(Box::new(coord));
                }
            }
        }
        self.recompute_time();
    }

    fn lambdaf(&mut self) {
        for child in self.children.iter_mut() {
            child.lambdaf();
        }
        self.propagate_output();
    }

    fn deltfcn(&mut self) {
        self.propagate_input();
        for child in self.children.iter_mut() {
            child.deltfcn();
        }
        self.recompute_time();
    }

    fn clear(&mut self) {
        for child in self.children.iter_mut() {
            child.clear();
        }
        self.model.get_component().clear_input();
        self.model.get_component().clear_output();
    }

    fn exit(&mut self) {
        for child in self.children.iter_mut() {
            child.exit();
        }
    }
}

/// Drives the top-level processor of a simulation through time. Generic over
/// any [`Processor`] so it drives [`Coordinator`] and
/// [`super::parallel::ParallelCoordinator`] identically (mirrors the
/// teacher's own generic `RootCoordinator<T>`). Only the root of a tree
/// should be wrapped — the driver loops assume nothing else advances the
/// shared clock concurrently.
#[derive(Debug)]
pub struct RootCoordinator<T: Processor>(T);

impl<T: Processor> RootCoordinator<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Runs up to `num_iters` simulation cycles, stopping early if
    /// `clock.time` reaches infinity. Callers must have already called
    /// [`Processor::initialize`] on the wrapped processor.
    pub fn simulate(&mut self, num_iters: usize) {
        debug!("starting simulation...");
        self.0.clock().set_time(self.0.time_next());
        let mut iters = 0;
        while iters < num_iters && self.0.clock().time() < f64::INFINITY {
            self.0.lambdaf();
            self.0.deltfcn();
            self.0.clear();
            self.0.clock().set_time(self.0.time_next());
            iters += 1;
        }
    }

    /// Runs cycles until `clock.time` reaches `clock.time() + delta`.
    pub fn simulate_time(&mut self, delta: f64) {
        debug!("starting simulation...");
        self.0.clock().set_time(self.0.time_next());
        let t_end = self.0.clock().time() + delta;
        while self.0.clock().time() < t_end {
            self.0.lambdaf();
            self.0.deltfcn();
            self.0.clear();
            self.0.clock().set_time(self.0.time_next());
        }
    }

    /// Runs cycles until `clock.time` reaches infinity.
    pub fn simulate_inf(&mut self) {
        debug!("starting simulation...");
        self.0.clock().set_time(self.0.time_next());
        while self.0.clock().time() != f64::INFINITY {
            self.0.lambdaf();
            self.0.deltfcn();
            self.0.clear();
            self.0.clock().set_time(self.0.time_next());
        }
    }
}

impl<T: Processor> Deref for RootCoordinator<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Processor> DerefMut for RootCoordinator<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
