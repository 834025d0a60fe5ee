use pnet::{
    Arc, Bindings, ConstraintError, EvalError, Expression, MultiSet, Net, NetError, Node,
    NodeKind, Place, Symbol, Transition, Value, ValueKind, node::Adjacency,
};
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn bind(name: &str, value: i64) -> Bindings {
    Bindings::from([(Symbol::from(name), Value::Int(value))])
}

/// Observable state of one node: its rendering (name plus tokens or guard)
/// and both adjacency maps.
#[derive(Debug, PartialEq)]
struct NodeState {
    name: String,
    rendered: String,
    incoming: Adjacency,
    outgoing: Adjacency,
}

fn node_state<N: Node + std::fmt::Display>(node: &N) -> NodeState {
    NodeState {
        name: node.name().to_string(),
        rendered: node.to_string(),
        incoming: node.incoming().clone(),
        outgoing: node.outgoing().clone(),
    }
}

/// Places and transitions with their payload and arcs, used to compare a net
/// before and after a rejected mutation.
fn snapshot(net: &Net) -> (Vec<NodeState>, Vec<NodeState>) {
    (
        net.places().map(node_state).collect(),
        net.transitions().map(node_state).collect(),
    )
}

#[cfg(test)]
mod namespace_tests {
    use super::*;

    /// Names are unique across both kinds whatever the order of additions
    #[test]
    fn test_mixed_additions_never_share_a_name() {
        let mut net = Net::new("N");
        let names = ["a", "b", "a", "c", "b", "d", "c", "a"];

        for (i, name) in names.iter().enumerate() {
            let before = snapshot(&net);
            let existed = net.has_node(name);
            let result = if i % 2 == 0 {
                net.add_place(Place::new(*name))
            } else {
                net.add_transition(Transition::new(*name))
            };

            if existed {
                assert!(
                    matches!(result, Err(NetError::Constraint(_))),
                    "adding '{}' twice should fail",
                    name
                );
                assert_eq!(before, snapshot(&net), "rejected add must not mutate");
            } else {
                assert!(result.is_ok());
            }
        }

        let (places, transitions) = snapshot(&net);
        assert_eq!(places.len() + transitions.len(), 4);
        assert!(
            places
                .iter()
                .all(|p| transitions.iter().all(|t| t.name != p.name))
        );
    }

    /// A rejected add leaves tokens, guards and arcs of existing nodes alone
    #[test]
    fn test_rejected_adds_keep_payload_and_arcs() {
        let mut net = Net::new("N");
        net.add_place(Place::new("p").with_tokens([1, 2, 2]).unwrap())
            .unwrap();
        net.add_transition(Transition::with_guard(
            "t",
            Expression::new("x > 1").unwrap(),
        ))
        .unwrap();
        net.add_input("p", "t", Arc::Variable(Symbol::from("x")))
            .unwrap();
        net.add_output("p", "t", Arc::Value(Value::Int(0)))
            .unwrap();
        let before = snapshot(&net);

        let rejected = [
            net.add_place(Place::new("p").with_tokens([9]).unwrap()),
            net.add_place(Place::new("t")),
            net.add_transition(Transition::with_guard(
                "t",
                Expression::new("False").unwrap(),
            )),
            net.add_transition(Transition::new("p")),
            net.add_input("p", "t", Arc::Value(Value::Int(5))),
            net.add_output("p", "t", Arc::Value(Value::Int(5))),
        ];
        assert!(rejected.iter().all(Result::is_err));
        assert_eq!(before, snapshot(&net), "rejected add must not mutate");

        // the snapshot sees payload changes that keep every name
        net.place_mut("p").unwrap().add(3).unwrap();
        assert_ne!(before, snapshot(&net));
    }

    /// Scenario: duplicate place keeps the original object
    #[test]
    fn test_duplicate_place_rejected() {
        let mut net = Net::new("N");
        net.add_place(Place::new("p").with_tokens([1]).unwrap())
            .unwrap();

        let err = net
            .add_place(Place::new("p").with_tokens([2, 3]).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("p"));
        assert_eq!(
            net.place("p").unwrap().tokens(),
            &MultiSet::from([Value::Int(1)])
        );
    }

    /// Scenario: a transition cannot take a place's name
    #[test]
    fn test_cross_kind_collision() {
        let mut net = Net::new("N");
        net.add_place(Place::new("p")).unwrap();
        let err = net.add_transition(Transition::new("p")).unwrap_err();
        assert_eq!(
            err,
            NetError::Constraint(ConstraintError::PlaceNameTaken(Symbol::from("p")))
        );
        assert!(!net.has_transition("p"));
    }

    /// has_place and place agree before and after adding
    #[test]
    fn test_existence_checks_flip_together() {
        let mut net = Net::new("N");
        assert!(!net.has_place("x"));
        assert_eq!(
            net.place("x").unwrap_err(),
            ConstraintError::PlaceNotFound(Symbol::from("x"))
        );
        assert_eq!(
            net.transition("x").unwrap_err().to_string(),
            "transition 'x' not found"
        );

        net.add_place(Place::new("x")).unwrap();
        assert!(net.has_place("x"));
        assert!(net.place("x").is_ok());
        assert_eq!(net.node("x").unwrap().kind(), NodeKind::Place);
    }
}

#[cfg(test)]
mod ownership_tests {
    use super::*;
    use pnet::{Field, LockedError};

    /// An attached guard keeps resolving through its own net only
    #[test]
    fn test_guard_scope_stays_with_its_net() {
        let mut n1 = Net::new("N");
        let mut n2 = Net::new("N");
        n2.declare("secret", "7").unwrap();
        n1.add_transition(Transition::with_guard(
            "t",
            Expression::new("secret == 7").unwrap(),
        ))
        .unwrap();

        let t = n1.transition("t").unwrap();
        let err = t.guard().scope().attach(n2.globals()).unwrap_err();
        assert_eq!(
            err,
            LockedError {
                field: Field::Scope,
                owner: n2.id()
            }
        );
        assert!(matches!(
            t.check_guard(&Bindings::new()),
            Err(EvalError::Unresolved(_))
        ));

        n1.declare("secret", "8").unwrap();
        assert_eq!(
            n1.transition("t").unwrap().check_guard(&Bindings::new()),
            Ok(false)
        );
    }

    #[test]
    fn test_attached_node_records_its_net() {
        let mut net = Net::new("N");
        let place = Place::new("p");
        assert!(!place.is_attached());

        net.add_place(place).unwrap();
        let p = net.place("p").unwrap();
        assert_eq!(p.net(), Some(net.id()));
        assert!(p.incoming().is_empty());
        assert!(p.outgoing().is_empty());
    }

    /// A second net cannot take over the owner field; the owning net can
    #[test]
    fn test_owner_lock_is_permanent() {
        let mut n1 = Net::new("N1");
        let n2 = Net::new("N2");
        let (id1, id2) = (n1.id(), n2.id());
        n1.add_place(Place::new("p")).unwrap();

        let core = n1.place_mut("p").unwrap().core_mut();
        let err = core.lock_net(id2).unwrap_err();
        assert_eq!(err.owner, id1);
        assert!(core.rename("q").is_err());
        assert!(core.lock_net(id1).is_ok());
        assert_eq!(n1.place("p").unwrap().net(), Some(id1));
    }

    #[test]
    fn test_nets_with_same_name_are_distinct_owners() {
        let (n1, n2) = (Net::new("N"), Net::new("N"));
        assert_ne!(n1.id(), n2.id());
    }

    #[test]
    fn test_attached_place_tokens_stay_typed() {
        let mut net = Net::new("N");
        net.add_place(Place::new("p").with_type(ValueKind::Int).unwrap())
            .unwrap();
        let p = net.place_mut("p").unwrap();
        p.add(3).unwrap();
        assert!(p.add(true).is_err());
        assert!(p.rename("q").is_err());
        assert_eq!(p.tokens().len(), 1);
    }
}

#[cfg(test)]
mod guard_tests {
    use super::*;

    /// Scenario: place tokens and guard evaluation after attachment
    #[test]
    fn test_place_tokens_and_guard() {
        let mut net = Net::new("N");
        net.add_place(Place::new("p").with_tokens([0, 1, 2]).unwrap())
            .unwrap();
        net.add_transition(Transition::with_guard(
            "t",
            Expression::new("x==1").unwrap(),
        ))
        .unwrap();

        assert_eq!(
            net.place("p").unwrap().tokens(),
            &MultiSet::from([Value::Int(0), Value::Int(1), Value::Int(2)])
        );

        let t = net.transition("t").unwrap();
        assert_eq!(t.check_guard(&bind("x", 1)), Ok(true));
        assert_eq!(t.check_guard(&bind("x", 0)), Ok(false));
        assert!(matches!(
            t.check_guard(&Bindings::new()),
            Err(EvalError::Unresolved(ref e)) if &*e.name == "x"
        ));
    }

    /// Names only declared globally resolve once the transition is attached
    #[test]
    fn test_global_declarations_reach_guards() {
        let mut net = Net::new("N");
        net.add_transition(Transition::with_guard(
            "t",
            Expression::new("y > 2").unwrap(),
        ))
        .unwrap();

        // injected by a collaborator straight into the globals
        net.globals().bind("y", Value::Int(5));
        assert_eq!(
            net.transition("t").unwrap().check_guard(&Bindings::new()),
            Ok(true)
        );

        // undeclared everywhere
        net.add_transition(Transition::with_guard(
            "u",
            Expression::new("z > 2").unwrap(),
        ))
        .unwrap();
        assert!(matches!(
            net.transition("u").unwrap().check_guard(&Bindings::new()),
            Err(EvalError::Unresolved(_))
        ));
    }

    /// Bindings, then the guard's own scope, then the net's globals
    #[test]
    fn test_lookup_order() {
        let mut net = Net::new("N");
        let guard = Expression::new("v").unwrap();
        net.add_transition(Transition::with_guard("t", guard))
            .unwrap();
        net.declare("v", "False").unwrap();

        let t = net.transition("t").unwrap();
        assert_eq!(t.check_guard(&Bindings::new()), Ok(false));

        t.guard().scope().bind("v", Value::Bool(true));
        assert_eq!(t.check_guard(&Bindings::new()), Ok(true));

        let bindings = Bindings::from([(Symbol::from("v"), Value::Bool(false))]);
        assert_eq!(t.check_guard(&bindings), Ok(false));
    }

    #[test]
    fn test_unbound_vars_account_for_arcs() {
        let mut net = Net::new("N");
        net.add_place(Place::new("p")).unwrap();
        net.add_transition(Transition::with_guard(
            "t",
            Expression::new("x + y > limit").unwrap(),
        ))
        .unwrap();
        net.add_input("p", "t", Arc::Variable(Symbol::from("x")))
            .unwrap();
        net.declare("limit", "10").unwrap();

        assert_eq!(
            net.transition("t").unwrap().unbound_vars(),
            vec![Symbol::from("y")]
        );
    }
}

// Helper function to run the pnet binary
fn run_pnet(args: &[&str]) -> std::process::Output {
    run_pnet_with_log(args, None)
}

fn run_pnet_with_log(args: &[&str], rust_log: Option<&str>) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pnet"));
    cmd.args(args).env_remove("RUST_LOG");
    if let Some(filter) = rust_log {
        cmd.env("RUST_LOG", filter);
    }
    cmd.output().expect("Failed to run pnet")
}

fn create_declarations_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("globals.decl");
    fs::write(&file_path, content).expect("Failed to write declarations file");
    (temp_dir, file_path)
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    const EVAL_LOG_LINE: &str = "guard 'True' evaluated to true";

    #[test]
    fn test_eval_is_quiet_by_default() {
        let output = run_pnet(&["eval", "True"]);
        assert!(output.status.success());
        assert!(!String::from_utf8_lossy(&output.stderr).contains(EVAL_LOG_LINE));
    }

    #[test]
    fn test_verbose_flag_shows_info_logs() {
        for flag in ["-v", "--verbose"] {
            let output = run_pnet(&[flag, "eval", "True"]);
            let stderr = String::from_utf8_lossy(&output.stderr);
            assert!(output.status.success(), "stderr: {}", stderr);
            assert!(stderr.contains(EVAL_LOG_LINE), "stderr: {}", stderr);
            assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");
        }
    }

    #[test]
    fn test_rust_log_selects_level_without_flags() {
        let output = run_pnet_with_log(&["eval", "True"], Some("info"));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(output.status.success(), "stderr: {}", stderr);
        assert!(stderr.contains(EVAL_LOG_LINE), "stderr: {}", stderr);

        // an explicit flag still wins
        let output = run_pnet_with_log(&["--log-level", "error", "eval", "True"], Some("info"));
        assert!(!String::from_utf8_lossy(&output.stderr).contains(EVAL_LOG_LINE));
    }

    #[test]
    fn test_invalid_log_level_is_reported() {
        let output = run_pnet(&["--log-level", "loud", "eval", "True"]);
        assert!(output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid log level: loud"), "stderr: {}", stderr);
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");
    }

    #[test]
    fn test_eval_prints_guard_result() {
        let output = run_pnet(&["eval", "x == limit", "-D", "limit=2", "-b", "x=2"]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");

        let output = run_pnet(&["eval", "x == limit", "-D", "limit=2", "-b", "x=1"]);
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "false");
    }

    #[test]
    fn test_eval_reads_declarations_file() {
        let (_dir, path) = create_declarations_file(
            "# buffer limits\nlow = 1\n\nhigh = low * 10\n",
        );
        let output = run_pnet(&[
            "eval",
            "x >= low and x < high",
            "--declarations",
            path.to_str().unwrap(),
            "-b",
            "x=5",
        ]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "true");
    }

    #[test]
    fn test_eval_fails_on_undeclared_name() {
        let output = run_pnet(&["eval", "x == limit", "-b", "x=2"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("limit"));
    }
}
