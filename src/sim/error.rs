use thiserror::Error;

/// Recoverable error kinds surfaced by the simulation kernel.
///
/// Injection out-of-bounds and unknown remote ports are *not* modeled as
/// errors that abort a cycle — `inject` reports them through its own `bool`/
/// `legacy_compat` contract (see [`crate::sim::coordinator::Coordinator::inject`]).
/// This type covers the handful of kinds that genuinely need to propagate to
/// a caller: malformed topology discovered while a simulation is already
/// running, and I/O-adjacent failures from the process-pool and RPC
/// boundaries.
#[derive(Debug, Error)]
pub enum SimError {
    /// A coupled model's child list contained something that is neither an
    /// atomic nor a coupled model, discovered only once the processor tree
    /// was being built from a running simulation (construction-time
    /// authoring mistakes like duplicate names panic instead; see DESIGN.md).
    #[error("structural error: {0}")]
    Structural(String),

    /// The environment-supplied deserializer failed to decode an injected
    /// value (`bincode`/`serde_json` error message, kept as text since the
    /// two features produce unrelated error types).
    #[error("deserialization failure: {0}")]
    Deserialize(String),

    /// Transport failure from the process pool or the RPC server.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
