//! Places and transitions.
//!
//! Both node kinds embed a [`NodeCore`] holding the structural fields that a
//! net takes ownership of when the node is attached: the name, the owning
//! net and the two adjacency maps. A node is built free-standing, with a
//! mutable name and no owner, and is then moved into a
//! [`Net`](crate::Net). From that point the net is the only party allowed to
//! write the structural fields; the node-specific payload (a place's tokens,
//! a transition's guard scope) stays usable through the net's accessors.
//!
//! # Adjacency
//!
//! `incoming` maps the name of each node with an arc *into* this node to the
//! arc's label; `outgoing` maps each node this node has an arc *to*. For a
//! transition, `incoming` holds its input places and `outgoing` its output
//! places, and symmetrically for places.

mod place;
mod transition;

pub use place::{AnyValue, Place, Predicate, TokenType, ValueKind};
pub use transition::Transition;

use crate::{
    Symbol, Value,
    lock::{Field, Locked, LockedError, NetId},
};
use std::{collections::BTreeMap, fmt};

/// Arc inscription between a place and a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arc {
    /// A constant token.
    Value(Value),
    /// A variable bound to the consumed or produced token.
    Variable(Symbol),
}

impl Arc {
    /// Names the arc introduces into a guard's evaluation context.
    pub fn vars(&self) -> Vec<Symbol> {
        match self {
            Arc::Value(_) => Vec::new(),
            Arc::Variable(name) => vec![name.clone()],
        }
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arc::Value(v) => write!(f, "{}", v),
            Arc::Variable(name) => write!(f, "{}", name),
        }
    }
}

/// Neighbour name to arc label.
pub type Adjacency = BTreeMap<Symbol, Arc>;

/// The two kinds of node in a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Place,
    Transition,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Place => write!(f, "place"),
            NodeKind::Transition => write!(f, "transition"),
        }
    }
}

/// Structural fields shared by places and transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeCore {
    name: Locked<Symbol>,
    net: Locked<Option<NetId>>,
    incoming: Locked<Adjacency>,
    outgoing: Locked<Adjacency>,
}

impl NodeCore {
    pub(crate) fn new(name: Symbol) -> Self {
        NodeCore {
            name: Locked::free(Field::Name, name),
            net: Locked::free(Field::Net, None),
            incoming: Locked::free(Field::Incoming, Adjacency::new()),
            outgoing: Locked::free(Field::Outgoing, Adjacency::new()),
        }
    }

    pub fn name(&self) -> &Symbol {
        self.name.get()
    }

    /// The owning net, or `None` while the node is unattached.
    pub fn net(&self) -> Option<NetId> {
        *self.net.get()
    }

    pub fn incoming(&self) -> &Adjacency {
        self.incoming.get()
    }

    pub fn outgoing(&self) -> &Adjacency {
        self.outgoing.get()
    }

    /// Change the name; fails once a net owns the node.
    pub fn rename(&mut self, name: impl Into<Symbol>) -> Result<(), LockedError> {
        self.name.set(name.into())
    }

    /// Check that `owner` may take the node, without changing anything.
    pub fn check_owner(&self, owner: NetId) -> Result<(), LockedError> {
        self.name.check(owner)?;
        self.net.check(owner)?;
        self.incoming.check(owner)?;
        self.outgoing.check(owner)
    }

    /// Lock every structural field to `owner`, resetting the adjacency maps.
    ///
    /// Locking by the net that already owns the node succeeds again.
    pub(crate) fn lock_to(&mut self, owner: NetId) -> Result<(), LockedError> {
        self.check_owner(owner)?;
        let name = self.name.get().clone();
        self.name.lock(owner, name)?;
        self.net.lock(owner, Some(owner))?;
        self.incoming.lock(owner, Adjacency::new())?;
        self.outgoing.lock(owner, Adjacency::new())
    }

    /// Lock the `net` field alone. Only the owning net can succeed once the
    /// node is attached.
    pub fn lock_net(&mut self, owner: NetId) -> Result<(), LockedError> {
        self.net.lock(owner, Some(owner))
    }

    pub(crate) fn connect_incoming(
        &mut self,
        owner: NetId,
        from: Symbol,
        arc: Arc,
    ) -> Result<(), LockedError> {
        let mut map = self.incoming.get().clone();
        map.insert(from, arc);
        self.incoming.lock(owner, map)
    }

    pub(crate) fn connect_outgoing(
        &mut self,
        owner: NetId,
        to: Symbol,
        arc: Arc,
    ) -> Result<(), LockedError> {
        let mut map = self.outgoing.get().clone();
        map.insert(to, arc);
        self.outgoing.lock(owner, map)
    }
}

/// Common read interface of places and transitions.
pub trait Node {
    fn core(&self) -> &NodeCore;

    fn kind(&self) -> NodeKind;

    fn name(&self) -> &Symbol {
        self.core().name()
    }

    fn net(&self) -> Option<NetId> {
        self.core().net()
    }

    fn incoming(&self) -> &Adjacency {
        self.core().incoming()
    }

    fn outgoing(&self) -> &Adjacency {
        self.core().outgoing()
    }

    fn is_attached(&self) -> bool {
        self.net().is_some()
    }
}

/// A borrowed node of either kind, as returned by [`Net::node`](crate::Net::node).
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Place(&'a Place),
    Transition(&'a Transition),
}

impl<'a> NodeRef<'a> {
    pub fn as_place(self) -> Option<&'a Place> {
        match self {
            NodeRef::Place(p) => Some(p),
            NodeRef::Transition(_) => None,
        }
    }

    pub fn as_transition(self) -> Option<&'a Transition> {
        match self {
            NodeRef::Place(_) => None,
            NodeRef::Transition(t) => Some(t),
        }
    }
}

impl Node for NodeRef<'_> {
    fn core(&self) -> &NodeCore {
        match self {
            NodeRef::Place(p) => p.core(),
            NodeRef::Transition(t) => t.core(),
        }
    }

    fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Place(_) => NodeKind::Place,
            NodeRef::Transition(_) => NodeKind::Transition,
        }
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Place(p) => write!(f, "{}", p),
            NodeRef::Transition(t) => write!(f, "{}", t),
        }
    }
}
