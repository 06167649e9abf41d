use super::clock::SimulationClock;
use super::processor::Processor;
use super::simulator::Simulator;
use crate::modeling::{AbstractPort, Component, ComponentNode, Coupled};
use log::debug;
use rayon::ThreadPool;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

const DEFAULT_WORKERS: usize = 8;

/// Thread-parallel coordinator (spec §4.4). Preserves exactly the cycle
/// semantics of [`super::coordinator::Coordinator`]; the only difference is
/// that sibling atomic `lambdaf`/`deltfcn` calls run on a shared bounded
/// thread pool instead of inline. Nested coupled models become nested
/// `ParallelCoordinator`s that share the root's pool rather than building
/// their own (the root is the only one that owns an `Arc<ThreadPool>` built
/// from scratch; children just clone the handle).
#[derive(Debug)]
pub struct ParallelCoordinator {
    model: Coupled,
    clock: SimulationClock,
    pool: Arc<ThreadPool>,
    coordinators: Vec<ParallelCoordinator>,
    simulators: Vec<Simulator>,
    ports_to_serve: HashMap<String, Arc<dyn AbstractPort>>,
    time_last: f64,
    time_next: f64,
}

impl ParallelCoordinator {
    /// Creates a root thread-parallel coordinator with a pool of `workers`
    /// threads (matching `perfdevs.sim.ParallelCoordinator`'s
    /// `ThreadPoolExecutor(max_workers=8)` default).
    pub fn new(model: Coupled, clock: Option<SimulationClock>, flatten: bool, chain: bool, workers: usize) -> Self {
        let pool = Arc::new(
            rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .expect("failed to build thread pool"),
        );
        Self::with_pool(model, clock.unwrap_or_default(), flatten, chain, pool)
    }

    /// Creates a root coordinator with the default pool size of 8 workers.
    pub fn with_default_pool(model: Coupled, clock: Option<SimulationClock>, flatten: bool, chain: bool) -> Self {
        Self::new(model, clock, flatten, chain, DEFAULT_WORKERS)
    }

    fn with_pool(model: Coupled, clock: SimulationClock, flatten: bool, chain: bool, pool: Arc<ThreadPool>) -> Self {
        let mut model = model;
        if flatten {
            model.flatten();
        }
        if chain {
            model.to_chain();
        }
        Self {
            model,
            clock,
            pool,
            coordinators: Vec::new(),
            simulators: Vec::new(),
            ports_to_serve: HashMap::new(),
            time_last: 0.,
            time_next: 0.,
        }
    }

    fn new_child(model: Coupled, clock: SimulationClock, pool: Arc<ThreadPool>) -> Self {
        Self::with_pool(model, clock, false, false, pool)
    }

    pub fn component(&self) -> &Component {
        self.model.get_component()
    }

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
            .coordinators
            .iter()
            .map(|c| c.time_next())
            .chain(self.simulators.iter().map(|s| s.time_next()))
            .fold(f64::INFINITY, f64::min);
        self.time_last = self.clock.time();
        let n_children = self.coordinators.len() + self.simulators.len();
        self.time_next = self.time_last + if n_children == 0 { 0. } else { t_next - self.time_last };
    }
}

impl Processor for ParallelCoordinator {
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
                    self.simulators.push(sim);
                }
                ComponentNode::Coupled(coupled) => {
                    let mut coord = ParallelCoordinator::new_child(*coupled, self.clock.clone(), self.pool.clone());
                    coord.initialize();
                    for (name, port) in coord.ports_to_serve.drain() {
                        self.ports_to_serve.insert(name, port);
                    }
                    self.coordinators.push(coord);
                }
            }
        }
        self.recompute_time();
    }

    fn lambdaf(&mut self) {
        for coord in self.coordinators.iter_mut() {
            coord.lambdaf();
        }
        debug!("submitting {} simulator(s) to the pool", self.simulators.len());
        let simulators = &mut self.simulators;
        self.pool.scope(|scope| {
            for sim in simulators.iter_mut() {
                scope.spawn(move |_| sim.lambdaf());
            }
        });
        self.propagate_output();
    }

    fn deltfcn(&mut self) {
        self.propagate_input();
        for coord in self.coordinators.iter_mut() {
            coord.deltfcn();
        }
        let simulators = &mut self.simulators;
        self.pool.scope(|scope| {
            for sim in simulators.iter_mut() {
                scope.spawn(move |_| sim.deltfcn());
            }
        });
        self.recompute_time();
    }

    fn clear(&mut self) {
        for coord in self.coordinators.iter_mut() {
            coord.clear();
        }
        for sim in self.simulators.iter_mut() {
            sim.clear();
        }
        self.model.get_component().clear_input();
        self.model.get_component().clear_output();
    }

    fn exit(&mut self) {
        for coord in self.coordinators.iter_mut() {
            coord.exit();
        }
        for sim in self.simulators.iter_mut() {
            sim.exit();
        }
    }
}
