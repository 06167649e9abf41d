//! Simulation kernel: the processor hierarchy that drives a [`crate::modeling::Coupled`]
//! model through time. Sequential execution lives in [`coordinator`] and
//! [`simulator`]; [`parallel`] and [`process`] add alternative execution
//! strategies behind Cargo features without changing cycle semantics.

pub mod clock;
pub mod coordinator;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod processor;
#[cfg(feature = "process")]
pub mod process;
pub mod simulator;

pub use clock::SimulationClock;
pub use coordinator::{Coordinator, RootCoordinator};
pub use error::SimError;
#[cfg(feature = "parallel")]
pub use parallel::ParallelCoordinator;
pub use processor::Processor;
#[cfg(feature = "process")]
pub use process::{worker_main, ParallelProcessCoordinator, WORKER_FLAG};
pub use simulator::Simulator;
