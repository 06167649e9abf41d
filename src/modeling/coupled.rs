use super::atomic::Atomic;
use super::port::AbstractPort;
use super::Component;
use crate::modeling::coupling::Coupling;
use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter, Result};
use std::sync::Arc;

/// A child of a [`Coupled`] model: either a leaf [`Atomic`] or a nested [`Coupled`]
/// (spec §3: "ordered list of child components (each atomic or coupled)").
pub enum ComponentNode {
    Atomic(Box<dyn Atomic>),
    Coupled(Box<Coupled>),
}

impl ComponentNode {
    pub fn name(&self) -> &str {
        self.component().get_name()
    }

    pub fn component(&self) -> &Component {
        match self {
            ComponentNode::Atomic(a) => a.get_component(),
            ComponentNode::Coupled(c) => c.get_component(),
        }
    }
}

impl Debug for ComponentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentNode::Atomic(a) => write!(f, "Atomic({})", a.get_component().get_name()),
            ComponentNode::Coupled(c) => write!(f, "Coupled({})", c.get_component().get_name()),
        }
    }
}

/// Coupled DEVS model (spec §3/§6): a container that wires children together
/// through EIC/IC/EOC couplings.
#[derive(Debug)]
pub struct Coupled {
    component: Component,
    comps_map: HashSet<String>,
    pub(crate) components: Vec<ComponentNode>,
    /// External input couplings: parent input port -> child input port.
    pub(crate) eic: Vec<Coupling>,
    /// Internal couplings: child output port -> child input port.
    pub(crate) ic: Vec<Coupling>,
    /// External output couplings: child output port -> parent output port.
    pub(crate) eoc: Vec<Coupling>,
    /// Set by [`Coupled::to_chain`]; when true the coordinator never applies
    /// EIC/IC/EOC and instead uses [`Coupled::chain_links`] (spec §3/§4.2).
    pub chain: bool,
    chain_links: Vec<Coupling>,
}

impl Coupled {
    /// Creates a new, childless coupled model.
    pub fn new(name: &str) -> Self {
        Self {
            component: Component::new(name),
            comps_map: HashSet::new(),
            components: Vec::new(),
            eic: Vec::new(),
            ic: Vec::new(),
            eoc: Vec::new(),
            chain: false,
            chain_links: Vec::new(),
        }
    }

    pub fn get_component(&self) -> &Component {
        &self.component
    }

    pub fn get_name(&self) -> &str {
        self.component.get_name()
    }

    /// Adds a new input port and returns a handle to it.
    pub fn add_in_port<T: 'static + Clone + Debug + Send + Sync>(
        &mut self,
        name: &str,
    ) -> super::port::InPort<T> {
        self.component.add_in_port(name)
    }

    /// Adds a new output port and returns a handle to it.
    pub fn add_out_port<T: 'static + Clone + Debug + Send + Sync>(
        &mut self,
        name: &str,
    ) -> super::port::OutPort<T> {
        self.component.add_out_port(name)
    }

    /// Adds a child atomic model. Panics if a child with the same name exists.
    pub fn add_atomic<T: 'static + Atomic>(&mut self, atomic: T) {
        self.register_name(atomic.get_component().get_name());
        self.components.push(ComponentNode::Atomic(Box::new(atomic)));
    }

    /// Adds a child coupled model. Panics if a child with the same name exists.
    pub fn add_coupled(&mut self, coupled: Coupled) {
        self.register_name(coupled.get_name());
        self.components.push(ComponentNode::Coupled(Box::new(coupled)));
    }

    fn register_name(&mut self, name: &str) {
        if !self.comps_map.insert(name.to_string()) {
            panic!("coupled model already contains component with the name provided");
        }
    }

    fn find_component(&self, name: &str) -> &ComponentNode {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .unwrap_or_else(|| panic!("coupled model does not contain component with the name provided"))
    }

    fn add_coupling(list: &mut Vec<Coupling>, port_from: Arc<dyn AbstractPort>, port_to: Arc<dyn AbstractPort>) {
        if !port_from.is_compatible(port_to.as_ref()) {
            panic!("ports are incompatible");
        }
        if list
            .iter()
            .any(|c| Arc::ptr_eq(&c.port_from, &port_from) && Arc::ptr_eq(&c.port_to, &port_to))
        {
            panic!("duplicate coupling");
        }
        list.push(Coupling::new(port_from, port_to));
    }

    /// Adds a new EIC: `port_from` is one of this model's own input ports;
    /// `component_to`/`port_to` identify a child's input port.
    pub fn add_eic(&mut self, port_from: &str, component_to: &str, port_to: &str) {
        let from = self.component.get_in_port(port_from);
        let to = self.find_component(component_to).component().get_in_port(port_to);
        Self::add_coupling(&mut self.eic, from, to);
    }

    /// Adds a new IC: `component_from`/`port_from` identify a child's output
    /// port; `component_to`/`port_to` identify another child's input port.
    pub fn add_ic(&mut self, component_from: &str, port_from: &str, component_to: &str, port_to: &str) {
        let from = self.find_component(component_from).component().get_out_port(port_from);
        let to = self.find_component(component_to).component().get_in_port(port_to);
        Self::add_coupling(&mut self.ic, from, to);
    }

    /// Adds a new EOC: `component_from`/`port_from` identify a child's output
    /// port; `port_to` is one of this model's own output ports.
    pub fn add_eoc(&mut self, component_from: &str, port_from: &str, port_to: &str) {
        let from = self.find_component(component_from).component().get_out_port(port_from);
        let to = self.component.get_out_port(port_to);
        Self::add_coupling(&mut self.eoc, from, to);
    }

    pub fn n_eics(&self) -> usize {
        self.eic.len()
    }
    pub fn n_ics(&self) -> usize {
        self.ic.len()
    }
    pub fn n_eocs(&self) -> usize {
        self.eoc.len()
    }

    /// Couplings the coordinator should apply on a given cycle: `eic`/`ic`/`eoc`
    /// normally, or [`Coupled::chain_links`] in chain mode (spec §4.2).
    pub(crate) fn active_links(&self) -> (Option<&[Coupling]>, Option<&[Coupling]>, Option<&[Coupling]>) {
        if self.chain {
            (None, Some(&self.chain_links), None)
        } else {
            (Some(&self.eic), Some(&self.ic), Some(&self.eoc))
        }
    }

    /// Hoists all descendants into this model, rewiring couplings so that the
    /// resulting tree has this model's children be atomics only (spec §4.2).
    /// Descendant names are prefixed with their parent coupled's name
    /// (`"parent__child"`) to keep them unique after hoisting.
    pub fn flatten(&mut self) {
        for node in self.components.iter_mut() {
            if let ComponentNode::Coupled(c) = node {
                c.flatten();
            }
        }
        let children = std::mem::take(&mut self.components);
        self.comps_map.clear();
        for child in children {
            match child {
                ComponentNode::Atomic(a) => {
                    self.register_name(a.get_component().get_name());
                    self.components.push(ComponentNode::Atomic(a));
                }
                ComponentNode::Coupled(c) => self.inline_child(*c),
            }
        }
    }

    fn inline_child(&mut self, child: Coupled) {
        // Splice every self-level coupling that terminates on one of the
        // child's input ports through the child's own EIC.
        let mut spliced_eic = Vec::new();
        let mut spliced_ic_in = Vec::new();
        self.eic.retain(|c| {
            let matches: Vec<_> = child.eic.iter().filter(|e| Arc::ptr_eq(&e.port_from, &c.port_to)).collect();
            if !matches.is_empty() {
                for inner in matches {
                    spliced_eic.push(Coupling::new(c.port_from.clone(), inner.port_to.clone()));
                }
                false
            } else {
                true
            }
        });
        self.ic.retain(|c| {
            let matches: Vec<_> = child.eic.iter().filter(|e| Arc::ptr_eq(&e.port_from, &c.port_to)).collect();
            if matches.is_empty() {
                true
            } else {
                for inner in matches {
                    spliced_ic_in.push(Coupling::new(c.port_from.clone(), inner.port_to.clone()));
                }
                false
            }
        });

        // Splice every self-level coupling that originates on one of the
        // child's output ports through the child's own EOC.
        let mut spliced_out = Vec::new();
        self.ic.retain(|c| {
            let matches: Vec<_> = child.eoc.iter().filter(|e| Arc::ptr_eq(&e.port_to, &c.port_from)).collect();
            if matches.is_empty() {
                true
            } else {
                for inner in matches {
                    spliced_out.push((Coupling::new(inner.port_from.clone(), c.port_to.clone()), true));
                }
                false
            }
        });
        self.eoc.retain(|c| {
            let matches: Vec<_> = child.eoc.iter().filter(|e| Arc::ptr_eq(&e.port_to, &c.port_from)).collect();
            if matches.is_empty() {
                true
            } else {
                for inner in matches {
                    spliced_out.push((Coupling::new(inner.port_from.clone(), c.port_to.clone()), false));
                }
                false
            }
        });

        self.eic.extend(spliced_eic);
        self.ic.extend(spliced_ic_in);
        for (coupling, is_ic) in spliced_out {
            if is_ic {
                self.ic.push(coupling);
            } else {
                self.eoc.push(coupling);
            }
        }
        // The child's own internal IC (between its grandchildren) survives unchanged.
        self.ic.extend(child.ic);

        let prefix = child.component.get_name().to_string();
        for grandchild in child.components {
            match grandchild {
                ComponentNode::Atomic(a) => {
                    let name = format!("{prefix}__{}", a.get_component().get_name());
                    self.register_name(&name);
                    self.components.push(ComponentNode::Atomic(a));
                }
                ComponentNode::Coupled(c) => {
                    // Already flattened by the recursive call above.
                    self.register_name(&format!("{prefix}__{}", c.get_name()));
                    self.components.push(ComponentNode::Coupled(c));
                }
            }
        }
    }

    /// Linearizes the model into a pipeline of its current children, using
    /// the already-declared IC edges when present, and flips the root's
    /// input ports to OUT so that external injection appends straight to the
    /// producer end of the chain (spec §3/§4.2). In chain mode the
    /// coordinator applies [`Coupled::chain_links`] instead of EIC/IC/EOC.
    pub fn to_chain(&mut self) {
        self.chain_links = self
            .eic
            .drain(..)
            .chain(self.ic.drain(..))
            .chain(self.eoc.drain(..))
            .collect();
        self.chain = true;
        self.component.flip_in_ports_to_out();
    }
}

impl Display for Coupled {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.get_name())
    }
}
