use super::clock::SimulationClock;
use std::fmt::Debug;

/// Uniform interface shared by [`super::simulator::Simulator`] (wraps an atomic)
/// and [`super::coordinator::Coordinator`] (wraps a coupled model). The driver
/// loops in `Coordinator` only ever talk to child processors through this
/// trait, so sequential and parallel strategies can swap in alternative
/// `Coordinator` implementations without touching the dispatch rule.
pub trait Processor: Debug + Send {
    /// Name of the wrapped model.
    fn name(&self) -> &str;

    /// The clock shared by every processor in this tree.
    fn clock(&self) -> &SimulationClock;

    /// Time of this processor's last state transition.
    fn time_last(&self) -> f64;

    /// Time of this processor's next scheduled state transition.
    fn time_next(&self) -> f64;

    /// Builds (for coordinators) and initializes the processor, then sets
    /// `time_last`/`time_next` from the wrapped model's time advance.
    fn initialize(&mut self);

    /// Runs the output function if the clock has reached `time_next`.
    fn lambdaf(&mut self);

    /// Evaluates the three-way DEVS transition rule and updates
    /// `time_last`/`time_next` accordingly.
    fn deltfcn(&mut self);

    /// Empties every port buffer owned by this processor (and its subtree).
    fn clear(&mut self);

    /// Finalizes the processor at the end of a simulation run.
    fn exit(&mut self);
}
