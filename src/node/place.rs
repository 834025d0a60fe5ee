use super::{Node, NodeCore, NodeKind};
use crate::{ConstraintError, MultiSet, Symbol, Value, lock::LockedError};
use std::fmt;

/// Admissibility check for the tokens a place may hold.
pub trait TokenType: fmt::Debug {
    fn accepts(&self, value: &Value) -> bool;
}

/// Accepts every value. The default type of a place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyValue;

impl TokenType for AnyValue {
    fn accepts(&self, _value: &Value) -> bool {
        true
    }
}

/// Accepts values of a single kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Bool,
    Str,
}

impl TokenType for ValueKind {
    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ValueKind::Int, Value::Int(_))
                | (ValueKind::Bool, Value::Bool(_))
                | (ValueKind::Str, Value::Str(_))
        )
    }
}

/// A named arbitrary check.
///
/// ```
/// use pnet::{Predicate, TokenType, Value};
///
/// let positive = Predicate::new("positive", |v| matches!(v, Value::Int(i) if *i > 0));
/// assert!(positive.accepts(&Value::Int(3)));
/// assert!(!positive.accepts(&Value::Int(0)));
/// ```
pub struct Predicate {
    name: String,
    check: Box<dyn Fn(&Value) -> bool>,
}

impl Predicate {
    pub fn new(name: &str, check: impl Fn(&Value) -> bool + 'static) -> Self {
        Predicate {
            name: name.to_string(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TokenType for Predicate {
    fn accepts(&self, value: &Value) -> bool {
        (self.check)(value)
    }
}

/// A node holding a multiset of tokens.
///
/// Every token in the place satisfies the place's [`TokenType`]; insertions
/// that would break this are rejected.
///
/// # Example
///
/// ```
/// use pnet::{MultiSet, Place, Value, ValueKind};
///
/// let p = Place::new("p")
///     .with_type(ValueKind::Int).unwrap()
///     .with_tokens([0, 1, 2]).unwrap();
/// assert_eq!(p.tokens(), &MultiSet::from([Value::Int(0), Value::Int(1), Value::Int(2)]));
///
/// assert!(Place::new("q").with_type(ValueKind::Bool).unwrap().with_tokens([1]).is_err());
/// ```
#[derive(Debug)]
pub struct Place {
    core: NodeCore,
    tokens: MultiSet<Value>,
    token_type: Box<dyn TokenType>,
}

impl Place {
    /// An empty, unattached place accepting any token.
    pub fn new(name: impl Into<Symbol>) -> Self {
        Place {
            core: NodeCore::new(name.into()),
            tokens: MultiSet::new(),
            token_type: Box::new(AnyValue),
        }
    }

    /// Replace the token type. Fails if a current token is not admissible.
    pub fn with_type(mut self, token_type: impl TokenType + 'static) -> Result<Self, ConstraintError> {
        if let Some(value) = self.tokens.iter().map(|(v, _)| v).find(|v| !token_type.accepts(v)) {
            return Err(self.rejected(value.clone()));
        }
        self.token_type = Box::new(token_type);
        Ok(self)
    }

    /// Add initial tokens.
    pub fn with_tokens<V: Into<Value>>(
        mut self,
        tokens: impl IntoIterator<Item = V>,
    ) -> Result<Self, ConstraintError> {
        self.add_many(tokens)?;
        Ok(self)
    }

    /// Change the name of an unattached place.
    pub fn rename(&mut self, name: impl Into<Symbol>) -> Result<(), LockedError> {
        self.core.rename(name)
    }

    pub fn tokens(&self) -> &MultiSet<Value> {
        &self.tokens
    }

    pub fn token_type(&self) -> &dyn TokenType {
        self.token_type.as_ref()
    }

    /// Whether `value` would be admitted by this place.
    pub fn accepts(&self, value: &Value) -> bool {
        self.token_type.accepts(value)
    }

    pub fn add(&mut self, value: impl Into<Value>) -> Result<(), ConstraintError> {
        let value = value.into();
        if !self.accepts(&value) {
            return Err(self.rejected(value));
        }
        self.tokens.add(value);
        Ok(())
    }

    /// Add several tokens. Either all are admitted or none is added.
    pub fn add_many<V: Into<Value>>(
        &mut self,
        tokens: impl IntoIterator<Item = V>,
    ) -> Result<(), ConstraintError> {
        let tokens: Vec<Value> = tokens.into_iter().map(Into::into).collect();
        if let Some(value) = tokens.iter().find(|v| !self.accepts(v)) {
            return Err(self.rejected(value.clone()));
        }
        tokens.into_iter().for_each(|v| self.tokens.add(v));
        Ok(())
    }

    /// Remove `times` copies of `value`.
    pub fn remove(&mut self, value: &Value, times: usize) -> Result<(), ConstraintError> {
        self.tokens
            .remove(value, times)
            .map_err(|err| ConstraintError::MissingTokens {
                place: self.name().clone(),
                value: value.clone(),
                requested: err.requested,
                available: err.available,
            })
    }

    /// Remove every token.
    pub fn empty(&mut self) {
        self.tokens = MultiSet::new();
    }

    /// Structural fields, still guarded by their locks.
    pub fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn rejected(&self, value: Value) -> ConstraintError {
        ConstraintError::TokenType {
            place: self.name().clone(),
            value,
        }
    }
}

impl Node for Place {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Place
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Place(\"{}\", {}, {:?})",
            self.name(),
            self.tokens,
            self.token_type
        )
    }
}
