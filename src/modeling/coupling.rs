use super::port::AbstractPort;
use std::sync::Arc;

/// A directed edge between two ports (spec §3). `propagate()` copies every
/// buffered value from `port_from` onto `port_to`, appending in source order.
#[derive(Clone)]
pub struct Coupling {
    pub(crate) port_from: Arc<dyn AbstractPort>,
    pub(crate) port_to: Arc<dyn AbstractPort>,
}

impl Coupling {
    pub(crate) fn new(port_from: Arc<dyn AbstractPort>, port_to: Arc<dyn AbstractPort>) -> Self {
        Self { port_from, port_to }
    }

    /// Appends every value currently buffered on the source port to the
    /// destination port.
    pub fn propagate(&self) {
        self.port_from.propagate(self.port_to.as_ref());
    }
}

impl std::fmt::Debug for Coupling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Coupling({}.{} -> {}.{})",
            self.port_from.parent(),
            self.port_from.name(),
            self.port_to.parent(),
            self.port_to.name()
        )
    }
}
