//! Guard and declaration expressions.
//!
//! Expressions use a small Python-like syntax:
//!
//! - literals: integers, `"strings"`, `True`, `False`
//! - names, resolved through a [`Scope`] chain
//! - `not`, unary `-`, `* / %`, `+ -`, comparisons `== != < <= > >=`,
//!   `and`, `or` (in increasing binding distance)
//!
//! An [`Expression`] owns a local scope. When its transition is attached to a
//! net, that scope is chained to the net's globals, so the guard can read
//! names declared net-wide. Evaluating a name that is bound nowhere yields
//! [`EvalError::Unresolved`], which a caller can tell apart from a guard that
//! simply evaluates to `false`.
//!
//! # Example
//!
//! ```
//! use pnet::{Bindings, Expression, Guard, Symbol, Value};
//!
//! let guard = Expression::new("x == 1").unwrap();
//! let bindings = Bindings::from([(Symbol::from("x"), Value::Int(1))]);
//! assert_eq!(guard.evaluate(&bindings), Ok(true));
//! assert!(guard.evaluate(&Bindings::new()).is_err());
//! ```

pub mod ast;

lalrpop_util::lalrpop_mod! {parser, "/expression/parser.rs"}

use crate::{
    Symbol, Value,
    scope::{Bindings, Scope, ScopeResolutionError},
};
use ast::{BinOp, Expr, UnaryOp};
use itertools::Itertools;
use std::{cmp::Ordering, error::Error, fmt, str::FromStr};

type LalrpopError<'a> = lalrpop_util::ParseError<usize, parser::Token<'a>, &'static str>;

/// Syntax error in an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionError {
    pub input: String,
    pub message: String,
}

impl ExpressionError {
    fn new(source: &str, err: LalrpopError<'_>) -> Self {
        ExpressionError {
            input: source.to_string(),
            message: format!("{}", err),
        }
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid expression '{}': {}", self.input, self.message)
    }
}

impl Error for ExpressionError {}

/// Failure while evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A name is bound neither in the bindings nor anywhere in the scope chain.
    Unresolved(ScopeResolutionError),
    /// Operand kinds not supported by the operator.
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: Option<&'static str>,
    },
    DivisionByZero,
    Overflow,
    /// A guard produced something other than a boolean.
    NotBoolean(Value),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Unresolved(err) => write!(f, "{}", err),
            EvalError::TypeMismatch {
                op,
                left,
                right: Some(right),
            } => write!(f, "unsupported operand kinds for '{}': {} and {}", op, left, right),
            EvalError::TypeMismatch {
                op,
                left,
                right: None,
            } => write!(f, "unsupported operand kind for '{}': {}", op, left),
            EvalError::DivisionByZero => write!(f, "division by zero"),
            EvalError::Overflow => write!(f, "integer overflow"),
            EvalError::NotBoolean(v) => write!(f, "guard evaluated to non-boolean {}", v),
        }
    }
}

impl Error for EvalError {}

impl From<ScopeResolutionError> for EvalError {
    fn from(err: ScopeResolutionError) -> Self {
        EvalError::Unresolved(err)
    }
}

/// A boolean condition attached to a transition.
///
/// Implementors own a local [`Scope`]; the net attaches it to its globals
/// when the transition is added.
pub trait Guard: fmt::Debug + fmt::Display {
    /// The guard's own scope.
    fn scope(&self) -> &Scope;

    /// Evaluate the guard. Names are looked up in `bindings`, then in the
    /// guard's scope chain.
    fn evaluate(&self, bindings: &Bindings) -> Result<bool, EvalError>;

    /// Free names referenced by the guard.
    fn vars(&self) -> Vec<Symbol> {
        Vec::new()
    }
}

/// A parsed expression with its own local scope.
pub struct Expression {
    source: String,
    ast: Expr,
    scope: Scope,
}

impl Expression {
    /// Parse `source` into an expression with an empty, unattached scope.
    pub fn new(source: &str) -> Result<Self, ExpressionError> {
        let ast = parse(source)?;
        Ok(Expression {
            source: source.trim().to_string(),
            ast,
            scope: Scope::new(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Evaluate to a value, resolving names through `bindings` and then the
    /// expression's own scope chain.
    pub fn eval(&self, bindings: &Bindings) -> Result<Value, EvalError> {
        eval(&self.ast, &self.scope, bindings)
    }

    /// Evaluate against `scope` instead of the expression's own scope.
    pub fn eval_in(&self, scope: &Scope, bindings: &Bindings) -> Result<Value, EvalError> {
        eval(&self.ast, scope, bindings)
    }
}

impl Default for Expression {
    /// The guard that always holds.
    fn default() -> Self {
        Expression {
            source: "True".to_string(),
            ast: Expr::Literal(Value::Bool(true)),
            scope: Scope::new(),
        }
    }
}

impl FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::new(s)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expression({:?})", self.source)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Guard for Expression {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn evaluate(&self, bindings: &Bindings) -> Result<bool, EvalError> {
        let v = self.eval(bindings)?;
        v.as_bool().ok_or(EvalError::NotBoolean(v))
    }

    fn vars(&self) -> Vec<Symbol> {
        let mut names = Vec::new();
        self.ast.collect_names(&mut names);
        names.into_iter().sorted().dedup().collect()
    }
}

/// Parse `source` into an expression tree.
pub fn parse(source: &str) -> Result<Expr, ExpressionError> {
    parser::ExprParser::new()
        .parse(source)
        .map(|e| *e)
        .map_err(|e| ExpressionError::new(source, e))
}

fn eval(expr: &Expr, scope: &Scope, bindings: &Bindings) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(v) => Ok(v.clone()),
        Expr::Name(name) => Ok(scope.resolve(name, bindings)?),
        Expr::Unary(op, e) => {
            let v = eval(e, scope, bindings)?;
            match (op, &v) {
                (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, _) => Err(mismatch("-", &v, None)),
                (UnaryOp::Not, _) => Err(mismatch("not", &v, None)),
            }
        }
        Expr::Binary(op @ (BinOp::And | BinOp::Or), l, r) => {
            let lv = eval(l, scope, bindings)?;
            let lb = lv.as_bool().ok_or_else(|| mismatch(op.symbol(), &lv, None))?;
            match (op, lb) {
                (BinOp::And, false) => Ok(Value::Bool(false)),
                (BinOp::Or, true) => Ok(Value::Bool(true)),
                _ => {
                    let rv = eval(r, scope, bindings)?;
                    match rv {
                        Value::Bool(_) => Ok(rv),
                        _ => Err(mismatch(op.symbol(), &lv, Some(&rv))),
                    }
                }
            }
        }
        Expr::Binary(op, l, r) => {
            let lv = eval(l, scope, bindings)?;
            let rv = eval(r, scope, bindings)?;
            binary(*op, lv, rv)
        }
    }
}

fn binary(op: BinOp, lv: Value, rv: Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(lv == rv)),
        BinOp::Ne => Ok(Value::Bool(lv != rv)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            if std::mem::discriminant(&lv) != std::mem::discriminant(&rv) {
                return Err(mismatch(op.symbol(), &lv, Some(&rv)));
            }
            let ord = lv.cmp(&rv);
            Ok(Value::Bool(match op {
                BinOp::Lt => ord == Ordering::Less,
                BinOp::Le => ord != Ordering::Greater,
                BinOp::Gt => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            }))
        }
        _ => {
            let (a, b) = match (&lv, &rv) {
                (Value::Int(a), Value::Int(b)) => (*a, *b),
                _ => return Err(mismatch(op.symbol(), &lv, Some(&rv))),
            };
            let result = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Sub => a.checked_sub(b),
                BinOp::Mul => a.checked_mul(b),
                BinOp::Div | BinOp::Rem if b == 0 => return Err(EvalError::DivisionByZero),
                BinOp::Div => a.checked_div(b),
                BinOp::Rem => a.checked_rem(b),
                _ => unreachable!("logical and comparison operators are handled above"),
            };
            result.map(Value::Int).ok_or(EvalError::Overflow)
        }
    }
}

fn mismatch(op: &'static str, left: &Value, right: Option<&Value>) -> EvalError {
    EvalError::TypeMismatch {
        op,
        left: left.kind(),
        right: right.map(Value::kind),
    }
}
