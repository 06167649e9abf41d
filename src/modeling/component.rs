use super::port::{new_raw, AbstractPort, Direction, InPort, OutPort, Port};
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter, Result};
use std::sync::Arc;

/// Generic DEVS component: the named bundle of input/output ports shared by every
/// atomic and coupled model (spec §3's `Atomic`/`Coupled` both expose `name`,
/// `in_ports`, `out_ports`).
#[derive(Debug)]
pub struct Component {
    name: String,
    /// Keys are port names, values are indices into [`Component::input_ports`].
    input_map: HashMap<String, usize>,
    /// Keys are port names, values are indices into [`Component::output_ports`].
    output_map: HashMap<String, usize>,
    input_ports: Vec<Arc<dyn AbstractPort>>,
    output_ports: Vec<Arc<dyn AbstractPort>>,
}

impl Component {
    /// Creates a new, portless component with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_map: HashMap::new(),
            output_map: HashMap::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
        }
    }

    /// Name of the component.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Adds a new input port of type [`InPort<T>`] and returns a handle to it.
    /// Panics if an input port with the same name already exists.
    pub fn add_in_port<T: 'static + Clone + Debug + Send + Sync>(&mut self, name: &str) -> InPort<T> {
        if self.input_map.contains_key(name) {
            panic!(
                "component {} already contains input port with name {}",
                self.name, name
            );
        }
        let raw = new_raw::<T>(name, Direction::In);
        raw.set_parent(&self.name);
        self.input_map.insert(name.to_string(), self.input_ports.len());
        self.input_ports.push(raw.clone());
        Port::new(raw)
    }

    /// Adds a new output port of type [`OutPort<T>`] and returns a handle to it.
    /// Panics if an output port with the same name already exists.
    pub fn add_out_port<T: 'static + Clone + Debug + Send + Sync>(&mut self, name: &str) -> OutPort<T> {
        if self.output_map.contains_key(name) {
            panic!(
                "component {} already contains output port with name {}",
                self.name, name
            );
        }
        let raw = new_raw::<T>(name, Direction::Out);
        raw.set_parent(&self.name);
        self.output_map.insert(name.to_string(), self.output_ports.len());
        self.output_ports.push(raw.clone());
        Port::new(raw)
    }

    /// All input ports, in declaration order.
    pub fn in_ports(&self) -> &[Arc<dyn AbstractPort>] {
        &self.input_ports
    }

    /// All output ports, in declaration order.
    pub fn out_ports(&self) -> &[Arc<dyn AbstractPort>] {
        &self.output_ports
    }

    /// Returns true if every input port of the component is empty.
    pub fn is_input_empty(&self) -> bool {
        self.input_ports.iter().all(|p| p.is_empty())
    }

    /// Returns true if every output port of the component is empty.
    pub fn is_output_empty(&self) -> bool {
        self.output_ports.iter().all(|p| p.is_empty())
    }

    /// Returns a type-erased handle to an input port by name.
    /// Panics if the component has no such input port.
    pub fn get_in_port(&self, port_name: &str) -> Arc<dyn AbstractPort> {
        let i = *self.input_map.get(port_name).unwrap_or_else(|| {
            panic!(
                "component {} does not contain input port with name {}",
                self.name, port_name
            )
        });
        self.input_ports[i].clone()
    }

    /// Returns a type-erased handle to an output port by name.
    /// Panics if the component has no such output port.
    pub fn get_out_port(&self, port_name: &str) -> Arc<dyn AbstractPort> {
        let i = *self.output_map.get(port_name).unwrap_or_else(|| {
            panic!(
                "component {} does not contain output port with name {}",
                self.name, port_name
            )
        });
        self.output_ports[i].clone()
    }

    /// Clears every input port of the component.
    pub fn clear_input(&self) {
        self.input_ports.iter().for_each(|p| p.clear());
    }

    /// Clears every output port of the component.
    pub fn clear_output(&self) {
        self.output_ports.iter().for_each(|p| p.clear());
    }

    /// Flips every input port to [`Direction::Out`]. Used by [`super::coupled::Coupled::to_chain`]
    /// so that, in chain mode, the root model's declared inputs behave as injection
    /// targets that append straight to the producer end of the linearized pipeline
    /// (spec §3: "root-model input ports are treated as output ports for injection").
    pub(crate) fn flip_in_ports_to_out(&self) {
        for p in &self.input_ports {
            p.set_direction(Direction::Out);
        }
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.name)
    }
}
