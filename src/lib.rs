//! Structural core of coloured Petri nets.
//!
//! This crate builds and mutates Petri nets (bipartite graphs of places and
//! transitions joined by labelled arcs) while guaranteeing, at mutation time,
//! the structural invariants that simulation code built on top relies on:
//!
//! 1. **Unique names**: a name identifies at most one node in a net, whatever
//!    its kind.
//! 2. **Single ownership**: a node belongs to at most one net. Attaching it
//!    locks its name, owner and adjacency maps to that net for good.
//! 3. **Scoped guards**: a transition's guard resolves free names through
//!    evaluation-time bindings, then its own scope, then the net's globals,
//!    which are chained in automatically when the transition is attached.
//!
//! Enabling and firing semantics are deliberately left to collaborators; the
//! crate only maintains the structure and the scoping contract.
//!
//! # Usage Example
//!
//! ```
//! use pnet::{Arc, Bindings, Expression, Net, Node, Place, Symbol, Transition, Value};
//!
//! let mut net = Net::new("N");
//! net.add_place(Place::new("p").with_tokens([0, 1, 2]).unwrap()).unwrap();
//! net.add_transition(Transition::with_guard("t", Expression::new("x == 1").unwrap()))
//!     .unwrap();
//! net.add_input("p", "t", Arc::Variable(Symbol::from("x"))).unwrap();
//!
//! let t = net.transition("t").unwrap();
//! assert!(t.incoming().contains_key(&Symbol::from("p")));
//!
//! let x = |v| Bindings::from([(Symbol::from("x"), Value::Int(v))]);
//! assert_eq!(t.check_guard(&x(1)), Ok(true));
//! assert_eq!(t.check_guard(&x(0)), Ok(false));
//! assert!(t.check_guard(&Bindings::new()).is_err());
//! ```
//!
//! # Modules
//!
//! - **[`lock`]**: per-field ownership locks
//! - **[`node`]**: places, transitions, arcs
//! - **[`scope`]**: chained variable environments
//! - **[`expression`]**: guard expression parsing and evaluation
//! - **[`net`]**: the net container
//! - **[`eval`]**: the `eval` command of the `pnet` binary

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use string_cache::DefaultAtom;

pub mod error;
pub mod eval;
pub mod expression;
pub mod lock;
pub mod multiset;
pub mod net;
pub mod node;
pub mod scope;
pub mod value;

pub use error::{ConstraintError, NetError};
pub use eval::{EvalArgs, eval_main};
pub use expression::{EvalError, Expression, ExpressionError, Guard};
pub use lock::{Field, Locked, LockedError, NetId};
pub use multiset::MultiSet;
pub use net::{Declaration, Net};
pub use node::{AnyValue, Arc, Node, NodeKind, NodeRef, Place, Predicate, TokenType, Transition, ValueKind};
pub use scope::{Bindings, Scope, ScopeResolutionError};
pub use value::Value;

/// Interned node and variable name.
pub type Symbol = DefaultAtom;

/// Command-line interface of the `pnet` tool.
#[derive(Debug, Parser)]
#[clap(name = "pnet", about = "Petri net structure and guard tools")]
pub struct CLIArguments {
    /// Log level (off, error, warn, info, debug, trace); overrides RUST_LOG
    #[clap(long)]
    pub log_level: Option<String>,

    /// Log more: -v info, -vv debug, -vvv trace; overrides RUST_LOG
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Command,
}

impl CLIArguments {
    /// Level selected by repeating `-v`, or `None` when the flag is absent.
    pub fn verbosity(&self) -> Option<LevelFilter> {
        match self.verbose {
            0 => None,
            1 => Some(LevelFilter::Info),
            2 => Some(LevelFilter::Debug),
            _ => Some(LevelFilter::Trace),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a transition guard against global declarations and bindings.
    Eval(EvalArgs),
}
