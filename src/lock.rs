//! Per-field ownership locks.
//!
//! A [`Locked`] field starts out free: anybody holding a mutable reference to
//! the node can change it. Once a net attaches the node it locks the field with
//! its [`NetId`], and from then on only that same net may write it again.
//! There is no unlock: attachment is permanent for the lifetime of the node.

use std::{
    error::Error,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_NET_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a net, used as the owner token of locked fields.
///
/// Net names are not required to be unique, so ownership is tracked by this
/// identifier instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetId(u64);

impl NetId {
    /// Allocate a fresh identifier, distinct from every one handed out before.
    pub fn fresh() -> Self {
        NetId(NEXT_NET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "net#{}", self.0)
    }
}

/// The structural fields of a node that get locked on attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Net,
    Incoming,
    Outgoing,
    /// The link from a guard's scope to its net's globals.
    Scope,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Name => "name",
            Field::Net => "net",
            Field::Incoming => "incoming",
            Field::Outgoing => "outgoing",
            Field::Scope => "scope",
        };
        write!(f, "{}", name)
    }
}

/// Attempted write to a field owned by somebody else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedError {
    /// The protected field.
    pub field: Field,
    /// The net currently owning the field.
    pub owner: NetId,
}

impl fmt::Display for LockedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' is locked by {}", self.field, self.owner)
    }
}

impl Error for LockedError {}

/// A value together with its optional exclusive writer.
#[derive(Debug, Clone, PartialEq)]
pub struct Locked<T> {
    field: Field,
    owner: Option<NetId>,
    value: T,
}

impl<T> Locked<T> {
    /// A free (unowned) field holding `value`.
    pub fn free(field: Field, value: T) -> Self {
        Self {
            field,
            owner: None,
            value,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn owner(&self) -> Option<NetId> {
        self.owner
    }

    pub fn is_locked(&self) -> bool {
        self.owner.is_some()
    }

    /// Check whether `owner` would be allowed to lock this field, without
    /// touching it.
    pub fn check(&self, owner: NetId) -> Result<(), LockedError> {
        match self.owner {
            Some(current) if current != owner => Err(LockedError {
                field: self.field,
                owner: current,
            }),
            _ => Ok(()),
        }
    }

    /// Set the field to `value` and record `owner` as its only writer.
    ///
    /// Fails if another owner already holds the field; re-locking by the same
    /// owner replaces the value.
    pub fn lock(&mut self, owner: NetId, value: T) -> Result<(), LockedError> {
        self.check(owner)?;
        self.owner = Some(owner);
        self.value = value;
        Ok(())
    }

    /// Write the field as an unowned party. Only succeeds while the field is
    /// free.
    pub fn set(&mut self, value: T) -> Result<(), LockedError> {
        match self.owner {
            Some(owner) => Err(LockedError {
                field: self.field,
                owner,
            }),
            None => {
                self.value = value;
                Ok(())
            }
        }
    }
}
