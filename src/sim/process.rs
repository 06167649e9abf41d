//! Process-parallel execution strategy (spec §4.4). A [`ParallelProcessCoordinator`]
//! runs each leaf atomic in its own persistent child process, re-exec'ing the
//! crate's own binary in `--xdevs-worker` mode. Nested coupled models recurse
//! in-process on the calling thread, matching the Python original's `master`
//! flag: only leaf atomics are expensive enough to be worth isolating in a
//! process.
//!
//! Port identity is preserved by never serializing a [`crate::modeling::Component`]
//! or its port handles across the boundary — only JSON-encoded event values
//! move between parent and child (see [`AbstractPort::extract_json`]/
//! `inject_json`). An atomic whose ports carry a non-JSON concrete type simply
//! doesn't round-trip through this strategy; use `parallel` or the sequential
//! coordinator for those.

use super::clock::SimulationClock;
use super::error::SimError;
use super::processor::Processor;
use super::simulator::Simulator;
use crate::modeling::{AbstractPort, Atomic, Component, ComponentNode, Coupled};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;

/// Argument the worker process is re-exec'd with. The caller's `main` should
/// check for this before anything else and hand off to [`worker_main`].
pub const WORKER_FLAG: &str = "--xdevs-worker";

#[derive(Debug, Serialize, Deserialize)]
enum WorkerOp {
    Lambdaf,
    Deltfcn,
    Exit,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkerRequest {
    op: WorkerOp,
    time: f64,
    inputs: HashMap<String, Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WorkerResponse {
    time_last: f64,
    time_next: f64,
    outputs: HashMap<String, Vec<serde_json::Value>>,
}

fn write_frame<W: Write, T: Serialize>(w: &mut W, msg: &T) -> Result<(), SimError> {
    let bytes = bincode::serialize(msg).map_err(|e| SimError::Deserialize(e.to_string()))?;
    w.write_all(&(bytes.len() as u64).to_le_bytes())?;
    w.write_all(&bytes)?;
    w.flush()?;
    Ok(())
}

fn read_frame<R: Read, T: for<'de> Deserialize<'de>>(r: &mut R) -> Result<T, SimError> {
    let mut len_bytes = [0u8; 8];
    r.read_exact(&mut len_bytes)?;
    let len = u64::from_le_bytes(len_bytes) as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    bincode::deserialize(&buf).map_err(|e| SimError::Deserialize(e.to_string()))
}

/// Entry point for a re-exec'd worker process: builds its atomic via
/// `builder`, wraps it in an ordinary [`Simulator`] (so the three-way
/// transition rule and confluent tie-break stay identical to every other
/// strategy), then answers [`WorkerRequest`]s on stdin/stdout until it
/// receives [`WorkerOp::Exit`] or its stdin is closed. The worker owns its
/// own local clock, advanced from `request.time` on every call — it cannot
/// share the parent's, so it tracks time the same way a remote RPC client
/// would. Never returns on the normal exit path (the process terminates);
/// panics unwind and kill the worker exactly as an uncaught panic would in
/// any other strategy.
pub fn worker_main(builder: impl FnOnce() -> Box<dyn Atomic>) -> ! {
    let clock = SimulationClock::default();
    let mut sim = Simulator::new(builder(), clock.clone());
    sim.initialize();
    let mut stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    let handshake = WorkerResponse {
        time_last: sim.time_last(),
        time_next: sim.time_next(),
        outputs: HashMap::new(),
    };
    if write_frame(&mut stdout, &handshake).is_err() {
        std::process::exit(1);
    }

    loop {
        let request: WorkerRequest = match read_frame(&mut stdin) {
            Ok(r) => r,
            Err(_) => std::process::exit(0),
        };
        if matches!(request.op, WorkerOp::Exit) {
            sim.exit();
            std::process::exit(0);
        }
        for (port_name, values) in request.inputs {
            if let Some(port) = sim.component().in_ports().iter().find(|p| p.name() == port_name) {
                let _ = port.inject_json(values);
            }
        }
        clock.set_time(request.time);
        match request.op {
            WorkerOp::Lambdaf => sim.lambdaf(),
            WorkerOp::Deltfcn => sim.deltfcn(),
            WorkerOp::Exit => unreachable!(),
        }
        let mut outputs = HashMap::new();
        for port in sim.component().out_ports() {
            let values = port.extract_json();
            if !values.is_empty() {
                outputs.insert(port.name().to_string(), values);
            }
        }
        let response = WorkerResponse {
            time_last: sim.time_last(),
            time_next: sim.time_next(),
            outputs,
        };
        if write_frame(&mut stdout, &response).is_err() {
            std::process::exit(1);
        }
        sim.clear();
    }
}

/// A single persistent worker process and its stdin/stdout pipes. `in_ports`/
/// `out_ports` are the *original* port handles taken from the atomic before it
/// was moved into the child process — the same `Arc<dyn AbstractPort>`
/// instances already captured by any coupling that references this atomic, so
/// siblings address identical buffers whether a given atomic runs locally or
/// out-of-process.
struct Worker {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
    in_ports: Vec<Arc<dyn AbstractPort>>,
    out_ports: Vec<Arc<dyn AbstractPort>>,
    time_last: f64,
    time_next: f64,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker").finish_non_exhaustive()
    }
}

impl Worker {
    fn spawn(worker_tag: &str, component: &Component) -> std::io::Result<Self> {
        let exe = std::env::current_exe()?;
        let mut child = Command::new(exe)
            .arg(WORKER_FLAG)
            .arg(worker_tag)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let mut stdin = child.stdin.take().expect("piped stdin");
        let mut stdout = child.stdout.take().expect("piped stdout");
        let handshake: WorkerResponse = read_frame(&mut stdout).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::Other, format!("worker handshake failed: {e}"))
        })?;
        Ok(Self {
            child,
            stdin,
            stdout,
            in_ports: component.in_ports().to_vec(),
            out_ports: component.out_ports().to_vec(),
            time_last: handshake.time_last,
            time_next: handshake.time_next,
        })
    }

    fn request(&mut self, op: WorkerOp, time: f64) -> Result<(), SimError> {
        let mut inputs = HashMap::new();
        for port in &self.in_ports {
            let values = port.extract_json();
            if !values.is_empty() {
                inputs.insert(port.name().to_string(), values);
            }
        }
        write_frame(&mut self.stdin, &WorkerRequest { op, time, inputs })?;
        let response: WorkerResponse = read_frame(&mut self.stdout)?;
        self.time_last = response.time_last;
        self.time_next = response.time_next;
        for (port_name, values) in response.outputs {
            if let Some(port) = self.out_ports.iter().find(|p| p.name() == port_name) {
                port.inject_json(values)?;
            }
        }
        for port in &self.in_ports {
            port.clear();
        }
        Ok(())
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let _ = write_frame(
            &mut self.stdin,
            &WorkerRequest {
                op: WorkerOp::Exit,
                time: 0.,
                inputs: HashMap::new(),
            },
        );
        let _ = self.child.wait();
    }
}

/// Process-parallel coordinator. Like [`super::parallel::ParallelCoordinator`]
/// but every leaf atomic runs out-of-process; `builders` supplies, by
/// component name, the constructor each worker re-invokes to build its own
/// copy of that atomic (the worker is the same compiled binary, so it always
/// has these constructors available — only the *data*, never the
/// constructor itself, crosses the process boundary).
#[derive(Debug)]
pub struct ParallelProcessCoordinator {
    model: Coupled,
    clock: SimulationClock,
    coordinators: Vec<ParallelProcessCoordinator>,
    workers: Vec<Worker>,
    builders: HashMap<String, fn() -> Box<dyn Atomic>>,
    time_last: f64,
    time_next: f64,
}

impl ParallelProcessCoordinator {
    pub fn new(
        model: Coupled,
        clock: Option<SimulationClock>,
        flatten: bool,
        chain: bool,
        builders: HashMap<String, fn() -> Box<dyn Atomic>>,
    ) -> Self {
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
            coordinators: Vec::new(),
            workers: Vec::new(),
            builders,
            time_last: 0.,
            time_next: 0.,
        }
    }

    fn new_child(model: Coupled, clock: SimulationClock, builders: HashMap<String, fn() -> Box<dyn Atomic>>) -> Self {
        Self::new(model, Some(clock), false, false, builders)
    }

    pub fn component(&self) -> &Component {
        self.model.get_component()
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
            .chain(self.workers.iter().map(|w| w.time_next))
            .fold(f64::INFINITY, f64::min);
        self.time_last = self.clock.time();
        let n_children = self.coordinators.len() + self.workers.len();
        self.time_next = self.time_last + if n_children == 0 { 0. } else { t_next - self.time_last };
    }
}

impl Processor for ParallelProcessCoordinator {
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
                    let name = atomic.get_component().get_name().to_string();
                    if !self.builders.contains_key(&name) {
                        // A missing builder is topology discovered only once the
                        // simulation is being wired up, not an authoring-time
                        // mistake — but `Processor::initialize` has no fallible
                        // return, so this matches the identical check the
                        // re-exec'd worker makes on its own `tag` lookup
                        // (`src/main.rs`) rather than silently dropping the
                        // atomic from the tree and running an incomplete model.
                        panic!("no worker builder registered for atomic '{name}'");
                    }
                    // The original atomic is discarded here; only its port handles
                    // are kept (for coupling identity). The worker process builds
                    // its own, freshly-initialized copy via the registered builder.
                    match Worker::spawn(&name, atomic.get_component()) {
                        Ok(worker) => self.workers.push(worker),
                        Err(e) => error!("failed to spawn worker process for '{name}': {e}"),
                    }
                }
                ComponentNode::Coupled(coupled) => {
                    let mut coord =
                        ParallelProcessCoordinator::new_child(*coupled, self.clock.clone(), self.builders.clone());
                    coord.initialize();
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
        let time = self.clock.time();
        debug!("dispatching lambdaf to {} worker(s)", self.workers.len());
        for worker in self.workers.iter_mut() {
            if worker.time_next == time {
                let _ = worker.request(WorkerOp::Lambdaf, time);
            }
        }
        self.propagate_output();
    }

    fn deltfcn(&mut self) {
        self.propagate_input();
        for coord in self.coordinators.iter_mut() {
            coord.deltfcn();
        }
        let time = self.clock.time();
        for worker in self.workers.iter_mut() {
            let _ = worker.request(WorkerOp::Deltfcn, time);
        }
        self.recompute_time();
    }

    fn clear(&mut self) {
        for coord in self.coordinators.iter_mut() {
            coord.clear();
        }
        for worker in self.workers.iter() {
            worker.in_ports.iter().for_each(|p| p.clear());
            worker.out_ports.iter().for_each(|p| p.clear());
        }
        self.model.get_component().clear_input();
        self.model.get_component().clear_output();
    }

    fn exit(&mut self) {
        for coord in self.coordinators.iter_mut() {
            coord.exit();
        }
        self.workers.clear();
    }
}
