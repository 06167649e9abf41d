use super::Component;

/// External contract for leaf DEVS models (spec §6).
///
/// Implementers own a [`Component`] (the port bundle) plus `sigma`, the
/// residual time until the next internal event; `ta()` is derived from it.
/// The kernel ([`crate::sim::simulator::Simulator`]) evaluates the DEVS
/// transition rule itself and invokes exactly one of
/// `deltint`/`deltext`/`deltcon` per cycle — atomic authors never need to
/// call these on each other.
pub trait Atomic: Send {
    /// Returns reference to inner component.
    fn get_component(&self) -> &Component;

    /// Returns mutable reference to inner component.
    fn get_component_mut(&mut self) -> &mut Component;

    /// Residual time until the next scheduled internal event. `ta()` is
    /// always `self.sigma()`; atomics mutate it from `deltint`/`deltext`.
    fn sigma(&self) -> f64;

    /// Overwrites the residual time until the next internal event. The
    /// kernel calls this to record elapsed time within the current phase
    /// before dispatching `deltext`/`deltcon` (spec'd DEVS transition rule:
    /// `sigma -= e` on every external/confluent transition).
    fn set_sigma(&mut self, sigma: f64);

    /// Count of `deltint` invocations so far, for instrumentation (spec §3).
    /// Atomics that care about this instrumentation track it themselves and
    /// override the default.
    fn int_count(&self) -> usize {
        0
    }

    /// Count of `deltext`/`deltcon` invocations so far, for instrumentation.
    fn ext_count(&self) -> usize {
        0
    }

    /// Time advance function of the atomic DEVS model. Derived from `sigma`.
    #[inline]
    fn ta(&self) -> f64 {
        self.sigma()
    }

    /// Method for performing any operation before simulating. By default, it does nothing.
    #[inline]
    fn initialize(&mut self) {}

    /// Method for performing any operation after simulating. By default, it does nothing.
    #[inline]
    fn exit(&mut self) {}

    /// Output function of the atomic DEVS model. This is the only method where
    /// implementers can safely manipulate their [`super::OutPort`] structs.
    fn lambdaf(&self);

    /// Internal transition function of the atomic DEVS model.
    fn deltint(&mut self);

    /// External transition function of the atomic DEVS model.
    /// `e` corresponds to the elapsed time since the last state transition of the model.
    /// This is the only method where implementers can safely manipulate their [`super::InPort`] structs.
    fn deltext(&mut self, e: f64);

    /// Confluent transition function of the atomic DEVS model, invoked when a
    /// due internal event coincides with arriving external input at the same
    /// instant. `e` is the elapsed time since the last state transition, same
    /// as would have been passed to `deltext`.
    /// By default, it first triggers [`Atomic::deltint`].
    /// Then, it triggers [`Atomic::deltext`] with the elapsed time set to 0.
    #[inline]
    #[allow(unused_variables)]
    fn deltcon(&mut self, e: f64) {
        self.deltint();
        self.deltext(0.);
    }

    /// True if every input port of the component is currently empty.
    #[inline]
    fn in_empty(&self) -> bool {
        self.get_component().is_input_empty()
    }
}
