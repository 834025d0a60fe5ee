//! The `eval` command: evaluate a guard inside a freshly built net.
//!
//! Global declarations are merged into the net first, from a declarations
//! file and then from `-D` flags, in order. The guard is attached to a
//! transition of that net and evaluated under the `-b` bindings. A guard
//! that evaluates to `false` is a successful run; a name bound nowhere is an
//! error.
//!
//! A declarations file holds one `name = expression` per line. Blank lines
//! and lines starting with `#` are ignored:
//!
//! ```text
//! # capacity of the buffer
//! limit = 3
//! double = limit * 2
//! ```

use std::{fs, path::Path, path::PathBuf};

use anyhow::*;
use clap::Parser;
use log::info;

use crate::{Bindings, Expression, Net, Symbol, Transition, Value};

/// Command-line arguments for the eval command.
#[derive(Parser, Debug)]
pub struct EvalArgs {
    /// Guard expression, e.g. "x == limit"
    pub guard: String,

    /// Global declaration `name=expression`; may be repeated
    #[clap(short = 'D', long = "declare", value_parser = parse_assignment)]
    pub declare: Vec<(String, String)>,

    /// File of global declarations, one `name = expression` per line
    #[clap(long)]
    pub declarations: Option<PathBuf>,

    /// Evaluation-time binding `name=expression`; may be repeated
    #[clap(short, long = "bind", value_parser = parse_assignment)]
    pub bind: Vec<(String, String)>,
}

/// Split `name=expression`, checking that the name is an identifier.
pub fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (name, expr) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=expression, got '{}'", s))?;
    let name = name.trim();
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(format!("invalid name '{}' in '{}'", name, s));
    }
    std::result::Result::Ok((name.to_string(), expr.trim().to_string()))
}

/// Read a declarations file into `(name, expression)` pairs.
pub fn read_declarations(file_name: &Path) -> Result<Vec<(String, String)>> {
    let file = fs::read_to_string(file_name)
        .with_context(|| format!("cannot read {}", file_name.display()))?;
    file.lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| {
            parse_assignment(line)
                .map_err(|e| anyhow!("{}:{}: {}", file_name.display(), n, e))
        })
        .collect()
}

/// Build the net, evaluate the guard and print `true` or `false`.
pub fn eval_main(args: EvalArgs) -> Result<()> {
    let result = evaluate(&args)?;
    println!("{}", result);
    Ok(())
}

/// Evaluate the guard described by `args`.
pub fn evaluate(args: &EvalArgs) -> Result<bool> {
    let mut net = Net::new("eval");

    let from_file = match &args.declarations {
        Some(path) => read_declarations(path)?,
        None => Vec::new(),
    };
    for (name, source) in from_file.iter().chain(args.declare.iter()) {
        net.declare(name, source)
            .with_context(|| format!("in declaration of '{}'", name))?;
    }

    let guard = Expression::new(&args.guard)?;
    net.add_transition(Transition::with_guard("guard", guard))?;

    let bindings = args
        .bind
        .iter()
        .map(|(name, source)| {
            let value: Value = Expression::new(source)?.eval(&Bindings::new())?;
            Ok((Symbol::from(name.as_str()), value))
        })
        .collect::<Result<Bindings>>()?;

    let result = net.transition("guard")?.check_guard(&bindings)?;
    info!("guard '{}' evaluated to {}", args.guard, result);
    Ok(result)
}
