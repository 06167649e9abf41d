//! A hierarchical DEVS simulation kernel.
//!
//! [`modeling`] provides the model primitives — ports, atomics, coupled
//! models, and the couplings that wire them together. [`sim`] turns a
//! [`modeling::Coupled`] root into a running simulation: the
//! processor/coordinator hierarchy advances a shared clock, fires
//! transition functions in the right order, and propagates events across
//! couplings, either sequentially or via one of the parallel execution
//! strategies gated behind the `parallel`/`process` features.
//! [`rpc`] (feature `server`) exposes a minimal endpoint for injecting
//! events into a running simulation from outside the process.

pub mod modeling;
pub mod sim;

#[cfg(feature = "server")]
pub mod rpc;
