//! Chained variable environments.
//!
//! A [`Scope`] maps names to [`Value`]s and keeps an ordered list of parent
//! scopes that are consulted, nearest first, when a name is not bound locally.
//! Parents are held weakly: a scope never keeps its parents alive, so a guard
//! attached to a net's globals does not own the net's environment.
//!
//! The link to a net's globals is not an ordinary parent. It lives in a single
//! slot that only the net fills when it adopts a transition, and that slot is
//! write-once: a scope bound to one net can never be bound to another. A net's
//! globals can likewise never be attached as a plain parent, so the only way a
//! guard reaches a net's environment is through its own net slot. The slot is
//! consulted only for the scope a lookup starts from, after all its parents.

use crate::{
    Symbol, Value,
    lock::{Field, LockedError, NetId},
};
use log::trace;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    error::Error,
    fmt,
    rc::{Rc, Weak},
};

/// Variable assignment supplied at evaluation time, consulted before any
/// scope.
pub type Bindings = HashMap<Symbol, Value>;

/// A name could not be resolved through the bindings and the scope chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeResolutionError {
    pub name: Symbol,
}

impl fmt::Display for ScopeResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name '{}' is not defined", self.name)
    }
}

impl Error for ScopeResolutionError {}

#[derive(Debug, Default)]
struct ScopeData {
    vars: HashMap<Symbol, Value>,
    parents: Vec<Weak<RefCell<ScopeData>>>,
    /// Set when this scope is the global scope of a net.
    globals_of: Option<NetId>,
    /// Globals of the net that adopted this scope's transition.
    net: Option<(NetId, Weak<RefCell<ScopeData>>)>,
}

/// Shared handle to a variable environment.
///
/// Cloning a `Scope` clones the handle: both handles see the same bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    data: Rc<RefCell<ScopeData>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The global scope of the net `owner`.
    pub(crate) fn globals(owner: NetId) -> Self {
        let scope = Self::default();
        scope.data.borrow_mut().globals_of = Some(owner);
        scope
    }

    /// The net this scope is the global scope of, if any.
    pub fn globals_owner(&self) -> Option<NetId> {
        self.data.borrow().globals_of
    }

    /// The net whose globals this scope falls back to, if any.
    pub fn net(&self) -> Option<NetId> {
        self.data.borrow().net.as_ref().map(|(id, _)| *id)
    }

    /// Bind `name` in this scope, returning the previous local value.
    pub fn bind(&self, name: impl Into<Symbol>, value: Value) -> Option<Value> {
        self.data.borrow_mut().vars.insert(name.into(), value)
    }

    pub fn unbind(&self, name: &Symbol) -> Option<Value> {
        self.data.borrow_mut().vars.remove(name)
    }

    /// The local binding of `name`, ignoring parents.
    pub fn local(&self, name: &Symbol) -> Option<Value> {
        self.data.borrow().vars.get(name).cloned()
    }

    /// Locally bound names, sorted.
    pub fn names(&self) -> Vec<Symbol> {
        let mut names: Vec<_> = self.data.borrow().vars.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve `name` through this scope, then its parents, then the globals
    /// of its net.
    pub fn get(&self, name: &Symbol) -> Result<Value, ScopeResolutionError> {
        let mut visited = HashSet::new();
        let net = self
            .data
            .borrow()
            .net
            .as_ref()
            .and_then(|(_, globals)| globals.upgrade());
        Self::lookup(&self.data, name, &mut visited)
            .or_else(|| {
                net.and_then(|globals| Self::lookup(&globals, name, &mut visited))
            })
            .ok_or_else(|| ScopeResolutionError { name: name.clone() })
    }

    /// Resolve `name` through `bindings` first, then through the scope chain.
    pub fn resolve(
        &self,
        name: &Symbol,
        bindings: &Bindings,
    ) -> Result<Value, ScopeResolutionError> {
        match bindings.get(name) {
            Some(v) => Ok(v.clone()),
            None => self.get(name),
        }
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.get(name).is_ok()
    }

    /// Append `parent` to the list of scopes consulted on a miss.
    ///
    /// Attaching the same parent twice has no effect. A net's globals are
    /// refused: they are reachable only through the net slot.
    pub fn attach(&self, parent: &Scope) -> Result<(), LockedError> {
        if let Some(owner) = parent.globals_owner() {
            return Err(LockedError {
                field: Field::Scope,
                owner,
            });
        }
        if !self.is_attached_to(parent) {
            self.data
                .borrow_mut()
                .parents
                .push(Rc::downgrade(&parent.data));
        }
        Ok(())
    }

    /// Check that the net `owner` may bind this scope to its globals.
    pub(crate) fn check_net(&self, owner: NetId) -> Result<(), LockedError> {
        let data = self.data.borrow();
        let bound = data.globals_of.or(data.net.as_ref().map(|(id, _)| *id));
        match bound {
            Some(other) if other != owner => Err(LockedError {
                field: Field::Scope,
                owner: other,
            }),
            _ => Ok(()),
        }
    }

    /// Bind this scope to the globals of the net `owner`. Binding again to the
    /// same net has no effect.
    pub(crate) fn attach_to_net(&self, owner: NetId, globals: &Scope) -> Result<(), LockedError> {
        self.check_net(owner)?;
        let mut data = self.data.borrow_mut();
        if data.net.is_none() {
            data.net = Some((owner, Rc::downgrade(&globals.data)));
        }
        Ok(())
    }

    /// Remove `parent` from the chain. Returns whether it was attached.
    ///
    /// The net slot is never cleared.
    pub fn detach(&self, parent: &Scope) -> bool {
        let mut data = self.data.borrow_mut();
        let before = data.parents.len();
        data.parents
            .retain(|p| !std::ptr::eq(p.as_ptr(), Rc::as_ptr(&parent.data)));
        data.parents.len() != before
    }

    /// Whether `parent` is a direct parent of this scope, or the globals it is
    /// bound to.
    pub fn is_attached_to(&self, parent: &Scope) -> bool {
        let target = Rc::as_ptr(&parent.data);
        let data = self.data.borrow();
        data.parents.iter().any(|p| std::ptr::eq(p.as_ptr(), target))
            || data
                .net
                .as_ref()
                .is_some_and(|(_, globals)| std::ptr::eq(globals.as_ptr(), target))
    }

    /// Whether both handles refer to the same environment.
    pub fn same(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    fn lookup(
        data: &Rc<RefCell<ScopeData>>,
        name: &Symbol,
        visited: &mut HashSet<*const RefCell<ScopeData>>,
    ) -> Option<Value> {
        if !visited.insert(Rc::as_ptr(data)) {
            return None;
        }
        let data = data.borrow();
        if let Some(v) = data.vars.get(name) {
            trace!("resolved '{}' to {}", name, v);
            return Some(v.clone());
        }
        data.parents
            .iter()
            .filter_map(Weak::upgrade)
            .find_map(|parent| Self::lookup(&parent, name, visited))
    }
}
