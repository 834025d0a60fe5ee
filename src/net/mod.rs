//! The net container.
//!
//! A [`Net`] owns a uniquely named set of places and transitions plus one
//! global [`Scope`]. Names are unique across both kinds: a place and a
//! transition can never share a name. Whether a name exists is always derived
//! from the two typed maps; there is no third index that could drift.
//!
//! Attaching a node is check-then-commit. The net first validates the
//! namespace and the node's ownership, and only then locks the node's
//! structural fields to itself and stores it. For transitions the guard's
//! scope is chained to the net's globals as the last step, so a rejected
//! transition never sees the net's environment.
//!
//! # Example
//!
//! ```
//! use pnet::{Bindings, Expression, Net, Place, Transition, Symbol, Value};
//!
//! let mut net = Net::new("N");
//! net.add_place(Place::new("p").with_tokens([0, 1, 2]).unwrap()).unwrap();
//! net.add_transition(Transition::with_guard("t", Expression::new("x == k").unwrap()))
//!     .unwrap();
//! net.declare("k", "1").unwrap();
//!
//! let t = net.transition("t").unwrap();
//! let x = |v| Bindings::from([(Symbol::from("x"), Value::Int(v))]);
//! assert_eq!(t.check_guard(&x(1)), Ok(true));
//! assert_eq!(t.check_guard(&x(0)), Ok(false));
//!
//! assert!(net.add_place(Place::new("t")).is_err());
//! ```

mod graph;
#[cfg(test)]
pub mod test_helpers;

pub use graph::{GraphNode, NetGraph};

use crate::{
    ConstraintError, NetError, Symbol, Value,
    expression::Expression,
    lock::NetId,
    node::{Arc, Node, NodeKind, NodeRef, Place, Transition},
    scope::{Bindings, Scope},
};
use log::debug;
use std::{collections::BTreeMap, fmt};

/// A global declaration merged into a net's scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: Symbol,
    pub source: String,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.source)
    }
}

/// A Petri net: places, transitions and a shared global scope.
#[derive(Debug)]
pub struct Net {
    name: String,
    id: NetId,
    places: BTreeMap<Symbol, Place>,
    transitions: BTreeMap<Symbol, Transition>,
    declarations: Vec<Declaration>,
    globals: Scope,
}

impl Net {
    /// An empty net. The name need not be unique.
    pub fn new(name: &str) -> Self {
        let id = NetId::fresh();
        Net {
            name: name.to_string(),
            id,
            places: BTreeMap::new(),
            transitions: BTreeMap::new(),
            declarations: Vec::new(),
            globals: Scope::globals(id),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner token this net locks its nodes with.
    pub fn id(&self) -> NetId {
        self.id
    }

    /// The net-wide variable environment guards fall back to.
    pub fn globals(&self) -> &Scope {
        &self.globals
    }

    /// Declarations merged into the globals so far, in order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Add a place, taking ownership of its structural fields.
    ///
    /// Fails without changing the net if the name is used by a place or a
    /// transition, or if the place belongs to another net.
    pub fn add_place(&mut self, mut place: Place) -> Result<(), NetError> {
        let name = place.name().clone();
        if self.places.contains_key(&name) {
            return Err(ConstraintError::PlaceExists(name).into());
        }
        if self.transitions.contains_key(&name) {
            return Err(ConstraintError::TransitionNameTaken(name).into());
        }
        place.core_mut().lock_to(self.id)?;

        debug!("net '{}': added place '{}'", self.name, name);
        self.places.insert(name, place);
        Ok(())
    }

    /// Add a transition, taking ownership of its structural fields and
    /// chaining its guard's scope to the net's globals.
    ///
    /// Fails without changing the net or the guard's scope if the name is
    /// used by a place or a transition, or if the transition or its guard's
    /// scope belongs to another net.
    pub fn add_transition(&mut self, mut transition: Transition) -> Result<(), NetError> {
        let name = transition.name().clone();
        if self.transitions.contains_key(&name) {
            return Err(ConstraintError::TransitionExists(name).into());
        }
        if self.places.contains_key(&name) {
            return Err(ConstraintError::PlaceNameTaken(name).into());
        }
        let scope = transition.guard().scope().clone();
        scope.check_net(self.id)?;
        transition.core_mut().lock_to(self.id)?;
        scope.attach_to_net(self.id, &self.globals)?;

        debug!(
            "net '{}': added transition '{}' guarded by {}",
            self.name,
            name,
            transition.guard()
        );
        self.transitions.insert(name, transition);
        Ok(())
    }

    pub fn place(&self, name: &str) -> Result<&Place, ConstraintError> {
        let name = Symbol::from(name);
        self.places
            .get(&name)
            .ok_or_else(|| ConstraintError::not_found(Some(NodeKind::Place), &name))
    }

    /// Mutable access to a place. Its tokens can change; its structural
    /// fields stay locked to this net.
    pub fn place_mut(&mut self, name: &str) -> Result<&mut Place, ConstraintError> {
        let name = Symbol::from(name);
        self.places
            .get_mut(&name)
            .ok_or_else(|| ConstraintError::not_found(Some(NodeKind::Place), &name))
    }

    pub fn transition(&self, name: &str) -> Result<&Transition, ConstraintError> {
        let name = Symbol::from(name);
        self.transitions
            .get(&name)
            .ok_or_else(|| ConstraintError::not_found(Some(NodeKind::Transition), &name))
    }

    pub fn transition_mut(&mut self, name: &str) -> Result<&mut Transition, ConstraintError> {
        let name = Symbol::from(name);
        self.transitions
            .get_mut(&name)
            .ok_or_else(|| ConstraintError::not_found(Some(NodeKind::Transition), &name))
    }

    /// A node of either kind.
    pub fn node(&self, name: &str) -> Result<NodeRef<'_>, ConstraintError> {
        let name = Symbol::from(name);
        if let Some(p) = self.places.get(&name) {
            Ok(NodeRef::Place(p))
        } else if let Some(t) = self.transitions.get(&name) {
            Ok(NodeRef::Transition(t))
        } else {
            Err(ConstraintError::not_found(None, &name))
        }
    }

    pub fn has_place(&self, name: &str) -> bool {
        self.places.contains_key(&Symbol::from(name))
    }

    pub fn has_transition(&self, name: &str) -> bool {
        self.transitions.contains_key(&Symbol::from(name))
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.has_place(name) || self.has_transition(name)
    }

    /// Places in name order.
    pub fn places(&self) -> impl Iterator<Item = &Place> {
        self.places.values()
    }

    /// Transitions in name order.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.values()
    }

    /// All nodes, places first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.places
            .values()
            .map(NodeRef::Place)
            .chain(self.transitions.values().map(NodeRef::Transition))
    }

    pub fn node_count(&self) -> usize {
        self.places.len() + self.transitions.len()
    }

    /// Evaluate `source` in the global scope and bind the result to `name`.
    ///
    /// The expression may refer to earlier declarations. On failure neither
    /// the globals nor the declaration list change.
    pub fn declare(&mut self, name: &str, source: &str) -> Result<Value, NetError> {
        let expr = Expression::new(source)?;
        let value = expr.eval_in(&self.globals, &Bindings::new())?;
        self.globals.bind(name, value.clone());

        debug!("net '{}': declared {} = {}", self.name, name, value);
        self.declarations.push(Declaration {
            name: Symbol::from(name),
            source: expr.source().to_string(),
        });
        Ok(value)
    }

    /// Add an arc from `place` into `transition`.
    pub fn add_input(&mut self, place: &str, transition: &str, arc: Arc) -> Result<(), NetError> {
        let (p, t) = self.arc_endpoints(place, transition)?;
        if self.transitions[&t].incoming().contains_key(&p) {
            return Err(ConstraintError::ArcExists { from: p, to: t }.into());
        }
        let id = self.id;
        if let Some(node) = self.places.get_mut(&p) {
            node.core_mut().connect_outgoing(id, t.clone(), arc.clone())?;
        }
        if let Some(node) = self.transitions.get_mut(&t) {
            node.core_mut().connect_incoming(id, p.clone(), arc)?;
        }

        debug!("net '{}': arc {} -> {}", self.name, p, t);
        Ok(())
    }

    /// Add an arc from `transition` out to `place`.
    pub fn add_output(&mut self, place: &str, transition: &str, arc: Arc) -> Result<(), NetError> {
        let (p, t) = self.arc_endpoints(place, transition)?;
        if self.transitions[&t].outgoing().contains_key(&p) {
            return Err(ConstraintError::ArcExists { from: t, to: p }.into());
        }
        let id = self.id;
        if let Some(node) = self.transitions.get_mut(&t) {
            node.core_mut().connect_outgoing(id, p.clone(), arc.clone())?;
        }
        if let Some(node) = self.places.get_mut(&p) {
            node.core_mut().connect_incoming(id, t.clone(), arc)?;
        }

        debug!("net '{}': arc {} -> {}", self.name, t, p);
        Ok(())
    }

    fn arc_endpoints(&self, place: &str, transition: &str) -> Result<(Symbol, Symbol), ConstraintError> {
        let p = self.place(place)?.name().clone();
        let t = self.transition(transition)?.name().clone();
        Ok((p, t))
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Net({:?})", self.name)
    }
}
