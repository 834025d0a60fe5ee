//! Fixture nets shared by the unit tests.

use super::Net;
use crate::{
    Symbol, Value,
    expression::Expression,
    node::{Arc, Place, Transition},
    scope::Bindings,
};

/// A net with a single transition `t` carrying `guard` and nothing declared.
pub fn guarded_net(guard: &str) -> Net {
    let mut net = Net::new("guarded");
    net.add_transition(Transition::with_guard(
        "t",
        Expression::new(guard).expect("fixture guard should parse"),
    ))
    .expect("fresh net accepts the transition");
    net
}

/// `produce -> buffer -> consume -> done`, with `consume` reading `x` from
/// `buffer` under the guard `x > limit` and `limit` declared globally.
pub fn producer_consumer_net() -> Net {
    let mut net = Net::new("producer-consumer");
    net.add_place(Place::new("buffer").with_tokens([1, 2, 3]).unwrap())
        .unwrap();
    net.add_place(Place::new("done")).unwrap();
    net.add_transition(Transition::new("produce")).unwrap();
    net.add_transition(Transition::with_guard(
        "consume",
        Expression::new("x > limit").unwrap(),
    ))
    .unwrap();
    net.declare("limit", "1").unwrap();

    net.add_output("buffer", "produce", Arc::Value(Value::Int(1)))
        .unwrap();
    net.add_input("buffer", "consume", Arc::Variable(Symbol::from("x")))
        .unwrap();
    net.add_output("done", "consume", Arc::Variable(Symbol::from("x")))
        .unwrap();
    net
}

/// Bindings assigning `x`.
pub fn bind_x(value: i64) -> Bindings {
    Bindings::from([(Symbol::from("x"), Value::Int(value))])
}
