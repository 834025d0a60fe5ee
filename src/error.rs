//! Failures reported by net operations.
//!
//! Every failure is local and synchronous. None of them is worth retrying
//! as-is: the caller has to pick another name, declare the missing variable,
//! or stop trying to move a node between nets.

use crate::{
    Symbol, Value,
    expression::{EvalError, ExpressionError},
    lock::LockedError,
    node::NodeKind,
};
use std::{error::Error, fmt};

/// A namespace, lookup or token constraint of the net was violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// A place with this name is already in the net.
    PlaceExists(Symbol),
    /// A transition with this name is already in the net.
    TransitionExists(Symbol),
    /// Adding a transition whose name is taken by a place.
    PlaceNameTaken(Symbol),
    /// Adding a place whose name is taken by a transition.
    TransitionNameTaken(Symbol),
    PlaceNotFound(Symbol),
    TransitionNotFound(Symbol),
    NodeNotFound(Symbol),
    /// An arc in this direction already joins the two nodes.
    ArcExists {
        from: Symbol,
        to: Symbol,
    },
    /// The place's token type refuses the value.
    TokenType {
        place: Symbol,
        value: Value,
    },
    MissingTokens {
        place: Symbol,
        value: Value,
        requested: usize,
        available: usize,
    },
}

impl ConstraintError {
    /// The identifier the failure is about.
    pub fn name(&self) -> &Symbol {
        match self {
            ConstraintError::PlaceExists(name)
            | ConstraintError::TransitionExists(name)
            | ConstraintError::PlaceNameTaken(name)
            | ConstraintError::TransitionNameTaken(name)
            | ConstraintError::PlaceNotFound(name)
            | ConstraintError::TransitionNotFound(name)
            | ConstraintError::NodeNotFound(name) => name,
            ConstraintError::ArcExists { from, .. } => from,
            ConstraintError::TokenType { place, .. }
            | ConstraintError::MissingTokens { place, .. } => place,
        }
    }

    pub(crate) fn not_found(kind: Option<NodeKind>, name: &Symbol) -> Self {
        match kind {
            Some(NodeKind::Place) => ConstraintError::PlaceNotFound(name.clone()),
            Some(NodeKind::Transition) => ConstraintError::TransitionNotFound(name.clone()),
            None => ConstraintError::NodeNotFound(name.clone()),
        }
    }
}

impl fmt::Display for ConstraintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintError::PlaceExists(name) => write!(f, "place '{}' exists", name),
            ConstraintError::TransitionExists(name) => write!(f, "transition '{}' exists", name),
            ConstraintError::PlaceNameTaken(name) => write!(f, "a place '{}' exists", name),
            ConstraintError::TransitionNameTaken(name) => {
                write!(f, "a transition '{}' exists", name)
            }
            ConstraintError::PlaceNotFound(name) => write!(f, "place '{}' not found", name),
            ConstraintError::TransitionNotFound(name) => {
                write!(f, "transition '{}' not found", name)
            }
            ConstraintError::NodeNotFound(name) => write!(f, "node '{}' not found", name),
            ConstraintError::ArcExists { from, to } => {
                write!(f, "arc from '{}' to '{}' exists", from, to)
            }
            ConstraintError::TokenType { place, value } => {
                write!(f, "token {} not admitted by place '{}'", value, place)
            }
            ConstraintError::MissingTokens {
                place,
                value,
                requested,
                available,
            } => write!(
                f,
                "cannot remove {} of token {} from place '{}': only {} present",
                requested, value, place, available
            ),
        }
    }
}

impl Error for ConstraintError {}

/// Any failure of a [`Net`](crate::Net) operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    Constraint(ConstraintError),
    Locked(LockedError),
    Expression(ExpressionError),
    Eval(EvalError),
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Constraint(err) => write!(f, "{}", err),
            NetError::Locked(err) => write!(f, "{}", err),
            NetError::Expression(err) => write!(f, "{}", err),
            NetError::Eval(err) => write!(f, "{}", err),
        }
    }
}

impl Error for NetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            NetError::Constraint(err) => Some(err),
            NetError::Locked(err) => Some(err),
            NetError::Expression(err) => Some(err),
            NetError::Eval(err) => Some(err),
        }
    }
}

impl From<ConstraintError> for NetError {
    fn from(err: ConstraintError) -> Self {
        NetError::Constraint(err)
    }
}

impl From<LockedError> for NetError {
    fn from(err: LockedError) -> Self {
        NetError::Locked(err)
    }
}

impl From<ExpressionError> for NetError {
    fn from(err: ExpressionError) -> Self {
        NetError::Expression(err)
    }
}

impl From<EvalError> for NetError {
    fn from(err: EvalError) -> Self {
        NetError::Eval(err)
    }
}
