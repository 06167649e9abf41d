use std::any::Any;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use crate::sim::error::SimError;

/// Directionality of a [`Port`], mirroring spec §3's `direction ∈ {IN, OUT}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// Marker type for input ports. Used as the `Dir` parameter of [`Port`].
#[derive(Debug, Clone, Copy)]
pub struct Input;
/// Marker type for output ports. Used as the `Dir` parameter of [`Port`].
#[derive(Debug, Clone, Copy)]
pub struct Output;

/// Type-erased view over a [`RawPort<T>`], letting [`super::coupled::Coupled`] store
/// heterogeneous ports in a single map and couplings propagate between them without
/// knowing `T` at the coupling-table level. `Send + Sync` so a whole model tree
/// (and therefore its ports) can be handed to the thread-parallel coordinator's
/// worker pool (see `sim::parallel`) without `unsafe`.
pub trait AbstractPort: Debug + Any + Send + Sync {
    /// Name of the port, unique within its owning component.
    fn name(&self) -> &str;

    /// Name of the component that owns this port, used to build the
    /// `"parent.port"` keys of [`super::coupled::Coupled::ports_to_serve`].
    fn parent(&self) -> String;

    fn set_parent(&self, parent: &str);

    fn direction(&self) -> Direction;

    fn set_direction(&self, direction: Direction);

    /// Whether the port is flagged eligible for remote injection.
    fn serve(&self) -> bool;

    fn set_serve(&self, serve: bool);

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    /// Empties the port's buffer. Called by the owning processor after every cycle.
    fn clear(&self);

    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    /// Appends every buffered value of `self` onto `to`, preserving order.
    /// A no-op if the two ports carry different concrete types.
    fn propagate(&self, to: &dyn AbstractPort);

    /// Two ports may be coupled only if they carry the same concrete value type.
    fn is_compatible(&self, other: &dyn AbstractPort) -> bool {
        self.as_any().type_id() == other.as_any().type_id()
    }

    /// Appends JSON-decoded values coming from a remote injection (spec §4.3's
    /// "opaque deserializer"). Only ports whose concrete type is
    /// [`serde_json::Value`] accept this; everything else is rejected, since the
    /// kernel has no way to know how to deserialize an arbitrary atomic's event
    /// type. Atomics that want to be remotely servable should declare their
    /// served port as `Port<Input, serde_json::Value>` and parse the value
    /// themselves in `deltext`/`deltcon`.
    #[cfg(any(feature = "server", feature = "process"))]
    fn inject_json(&self, values: Vec<serde_json::Value>) -> Result<(), SimError> {
        match self.as_any().downcast_ref::<RawPort<serde_json::Value>>() {
            Some(p) => {
                p.values.lock().expect("port mutex poisoned").extend(values);
                Ok(())
            }
            None => Err(SimError::Deserialize(format!(
                "port '{}' is not JSON-servable (declare it as Port<Input, serde_json::Value> to accept remote injections)",
                self.name(),
            ))),
        }
    }

    /// Snapshots the port's buffered values as JSON, for ports declared as
    /// `Port<_, serde_json::Value>`. Used by the process-parallel worker
    /// protocol to move event values across the process boundary without
    /// having to serialize the port handle (or the atomic) itself. Ports of
    /// any other concrete type return an empty vec: they simply don't
    /// round-trip across a process worker, which is a documented restriction
    /// of that strategy rather than a silent data loss in the common,
    /// single-process strategies.
    #[cfg(feature = "process")]
    fn extract_json(&self) -> Vec<serde_json::Value> {
        match self.as_any().downcast_ref::<RawPort<serde_json::Value>>() {
            Some(p) => p.values.lock().expect("port mutex poisoned").iter().cloned().collect(),
            None => Vec::new(),
        }
    }
}

/// Concrete, typed storage backing a [`Port`] handle. Shared (via `Arc`) between the
/// typed [`Port<Dir, T>`] wrapper handed to atomic authors and the type-erased
/// [`AbstractPort`] entries held by [`super::component::Component`] and couplings.
/// Backed by `Mutex` rather than `RefCell` so ports stay `Send + Sync`; the cost is
/// an uncontended lock per access, the same trade-off made for
/// [`crate::sim::clock::SimulationClock`].
#[derive(Debug)]
pub struct RawPort<T> {
    name: String,
    parent: Mutex<String>,
    direction: Mutex<Direction>,
    serve: Mutex<bool>,
    values: Mutex<VecDeque<T>>,
}

impl<T> RawPort<T> {
    fn new(name: &str, direction: Direction) -> Self {
        Self {
            name: name.to_string(),
            parent: Mutex::new(String::new()),
            direction: Mutex::new(direction),
            serve: Mutex::new(false),
            values: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T: 'static + Clone + Debug + Send + Sync> AbstractPort for RawPort<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> String {
        self.parent.lock().expect("port mutex poisoned").clone()
    }

    fn set_parent(&self, parent: &str) {
        *self.parent.lock().expect("port mutex poisoned") = parent.to_string();
    }

    fn direction(&self) -> Direction {
        *self.direction.lock().expect("port mutex poisoned")
    }

    fn set_direction(&self, direction: Direction) {
        *self.direction.lock().expect("port mutex poisoned") = direction;
    }

    fn serve(&self) -> bool {
        *self.serve.lock().expect("port mutex poisoned")
    }

    fn set_serve(&self, serve: bool) {
        *self.serve.lock().expect("port mutex poisoned") = serve;
    }

    fn is_empty(&self) -> bool {
        self.values.lock().expect("port mutex poisoned").is_empty()
    }

    fn len(&self) -> usize {
        self.values.lock().expect("port mutex poisoned").len()
    }

    fn clear(&self) {
        self.values.lock().expect("port mutex poisoned").clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn propagate(&self, to: &dyn AbstractPort) {
        if let Some(dest) = to.as_any().downcast_ref::<RawPort<T>>() {
            let values = self.values.lock().expect("port mutex poisoned");
            dest.values
                .lock()
                .expect("port mutex poisoned")
                .extend(values.iter().cloned());
        }
    }
}

/// Typed handle to a port, tagged with its direction via the `Dir` marker type
/// ([`Input`] or [`Output`]). Cheap to clone: it is just an `Arc` underneath.
#[derive(Debug)]
pub struct Port<Dir, T>(pub(crate) Arc<RawPort<T>>, std::marker::PhantomData<Dir>);

impl<Dir, T> Clone for Port<Dir, T> {
    fn clone(&self) -> Self {
        Self(self.0.clone(), std::marker::PhantomData)
    }
}

/// Input port handle, given to atomic authors to read buffered events.
pub type InPort<T> = Port<Input, T>;
/// Output port handle, given to atomic authors to emit events in `lambdaf`.
pub type OutPort<T> = Port<Output, T>;

impl<Dir, T: 'static + Clone + Debug + Send + Sync> Port<Dir, T> {
    pub(crate) fn new(raw: Arc<RawPort<T>>) -> Self {
        Self(raw, std::marker::PhantomData)
    }

    /// Name of the port.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// True if the port currently holds no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of values currently buffered on the port.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Marks this port as eligible for remote injection (spec §3's `serve` flag).
    /// Only meaningful for input ports; see [`AbstractPort::inject_json`] for the
    /// type restriction this implies for remotely-served ports.
    pub fn set_serve(&self, serve: bool) {
        self.0.set_serve(serve);
    }

    pub(crate) fn as_abstract(&self) -> Arc<dyn AbstractPort> {
        self.0.clone()
    }
}

impl<T: 'static + Clone + Debug + Send + Sync> Port<Input, T> {
    /// Returns a snapshot of every value currently buffered on this input port.
    pub fn values(&self) -> Vec<T> {
        self.0.values.lock().expect("port mutex poisoned").iter().cloned().collect()
    }
}

impl<T: 'static + Clone + Debug + Send + Sync> Port<Output, T> {
    /// Buffers a single value to be propagated at the next `lambdaf`/collection phase.
    pub fn add_value(&self, value: T) {
        self.0.values.lock().expect("port mutex poisoned").push_back(value);
    }

    /// Buffers every value of `values`, in order.
    pub fn add_values(&self, values: &[T]) {
        self.0
            .values
            .lock()
            .expect("port mutex poisoned")
            .extend(values.iter().cloned());
    }
}

pub(crate) fn new_raw<T: 'static + Clone + Debug + Send + Sync>(
    name: &str,
    direction: Direction,
) -> Arc<RawPort<T>> {
    Arc::new(RawPort::new(name, direction))
}
