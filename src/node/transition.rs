use super::{Node, NodeCore, NodeKind};
use crate::{
    Symbol,
    expression::{EvalError, Expression, Guard},
    lock::LockedError,
    scope::Bindings,
};
use std::fmt;

/// A node guarded by a boolean expression.
///
/// The guard's scope is chained to the owning net's globals when the
/// transition is attached, and never to any other net afterwards.
#[derive(Debug)]
pub struct Transition {
    core: NodeCore,
    guard: Box<dyn Guard>,
}

impl Transition {
    /// An unattached transition whose guard always holds.
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self::with_guard(name, Expression::default())
    }

    pub fn with_guard(name: impl Into<Symbol>, guard: impl Guard + 'static) -> Self {
        Transition {
            core: NodeCore::new(name.into()),
            guard: Box::new(guard),
        }
    }

    /// Change the name of an unattached transition.
    pub fn rename(&mut self, name: impl Into<Symbol>) -> Result<(), LockedError> {
        self.core.rename(name)
    }

    pub fn guard(&self) -> &dyn Guard {
        self.guard.as_ref()
    }

    /// Evaluate the guard under `bindings`, falling back to the guard's scope
    /// chain for names the bindings do not cover.
    pub fn check_guard(&self, bindings: &Bindings) -> Result<bool, EvalError> {
        self.guard.evaluate(bindings)
    }

    /// Names the guard needs but which are bound neither by an input arc nor
    /// anywhere in the guard's scope chain.
    pub fn unbound_vars(&self) -> Vec<Symbol> {
        let scope = self.guard.scope();
        self.guard
            .vars()
            .into_iter()
            .filter(|name| !self.incoming().values().any(|arc| arc.vars().contains(name)))
            .filter(|name| !scope.contains(name))
            .collect()
    }

    /// Structural fields, still guarded by their locks.
    pub fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
}

impl Node for Transition {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Transition
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transition(\"{}\", {})", self.name(), self.guard)
    }
}
