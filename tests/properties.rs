//! Property-based tests for the machine state engine.
//!
//! Random sequences of operations are replayed against a fresh machine and
//! the resource invariants are checked after every step.

use std::sync::Arc;

use coffee_machine::machine::{Capacities, CoffeeMachine, CoffeeType, ContainerKind, StatusSnapshot};
use coffee_machine::storage::MemoryStore;
use proptest::prelude::*;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
enum Op {
    Brew(CoffeeType),
    Fill(ContainerKind, f64),
    Reset,
}

prop_compose! {
    fn arbitrary_recipe()(variant in 0..4usize) -> CoffeeType {
        CoffeeType::ALL[variant]
    }
}

prop_compose! {
    fn arbitrary_container()(water in any::<bool>()) -> ContainerKind {
        if water { ContainerKind::Water } else { ContainerKind::Coffee }
    }
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => arbitrary_recipe().prop_map(Op::Brew),
        4 => (arbitrary_container(), -50.0..800.0f64).prop_map(|(kind, amount)| Op::Fill(kind, amount)),
        1 => Just(Op::Reset),
    ]
}

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn new_machine() -> CoffeeMachine {
    CoffeeMachine::initialize(Capacities::default(), Arc::new(MemoryStore::new()))
        .await
        .unwrap()
}

/// Replay `ops`, recording the status after each one and whether it succeeded
fn replay(ops: &[Op]) -> Vec<(Op, bool, StatusSnapshot)> {
    runtime().block_on(async {
        let machine = new_machine().await;
        let mut trace = Vec::with_capacity(ops.len());

        for op in ops {
            let ok = match op {
                Op::Brew(coffee_type) => machine.brew(*coffee_type).await.is_ok(),
                Op::Fill(kind, amount) => machine.fill(*kind, *amount).await.is_ok(),
                Op::Reset => machine.reset().await.is_ok(),
            };
            trace.push((op.clone(), ok, machine.status().await));
        }

        trace
    })
}

proptest! {
    #[test]
    fn levels_stay_within_bounds(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        for (op, _, status) in replay(&ops) {
            prop_assert!(status.water.level >= 0.0, "after {:?}", op);
            prop_assert!(status.water.level <= status.water.capacity, "after {:?}", op);
            prop_assert!(status.coffee.level >= 0.0, "after {:?}", op);
            prop_assert!(status.coffee.level <= status.coffee.capacity, "after {:?}", op);
        }
    }

    #[test]
    fn counter_only_moves_on_brew_or_reset(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let mut previous = 0u64;
        for (op, ok, status) in replay(&ops) {
            match op {
                Op::Brew(_) if ok => prop_assert_eq!(status.total_coffees_made, previous + 1),
                Op::Reset => prop_assert_eq!(status.total_coffees_made, 0),
                _ => prop_assert_eq!(status.total_coffees_made, previous),
            }
            previous = status.total_coffees_made;
        }
    }

    #[test]
    fn failed_operations_change_nothing(ops in prop::collection::vec(arbitrary_op(), 1..60)) {
        let mut previous: Option<StatusSnapshot> = None;
        for (op, ok, status) in replay(&ops) {
            if let (false, Some(before)) = (ok, previous.as_ref()) {
                prop_assert_eq!(status.water.level, before.water.level, "after {:?}", op);
                prop_assert_eq!(status.coffee.level, before.coffee.level, "after {:?}", op);
                prop_assert_eq!(status.last_updated, before.last_updated, "after {:?}", op);
            }
            previous = Some(status);
        }
    }

    #[test]
    fn fills_add_up(amounts in prop::collection::vec(1.0..100.0f64, 1..15)) {
        let ops: Vec<Op> = amounts
            .iter()
            .map(|amount| Op::Fill(ContainerKind::Water, *amount))
            .collect();
        let trace = replay(&ops);

        let expected: f64 = amounts.iter().sum();
        let (_, ok, status) = trace.last().unwrap();
        prop_assert!(*ok);
        prop_assert!((status.water.level - expected).abs() < 1e-6);
    }

    #[test]
    fn two_fills_match_one(a in 1.0..1000.0f64, b in 1.0..1000.0f64) {
        let split = replay(&[
            Op::Fill(ContainerKind::Water, a),
            Op::Fill(ContainerKind::Water, b),
        ]);
        let joined = replay(&[Op::Fill(ContainerKind::Water, a + b)]);

        let (_, split_ok, split_status) = split.last().unwrap();
        let (_, joined_ok, joined_status) = joined.last().unwrap();
        prop_assert!(*split_ok && *joined_ok);
        prop_assert!((split_status.water.level - joined_status.water.level).abs() < 1e-9);
    }

    #[test]
    fn reset_is_idempotent(ops in prop::collection::vec(arbitrary_op(), 0..30)) {
        let mut ops = ops;
        ops.push(Op::Reset);
        ops.push(Op::Reset);
        let trace = replay(&ops);

        let (_, _, once) = &trace[trace.len() - 2];
        let (_, _, twice) = &trace[trace.len() - 1];
        prop_assert_eq!(once.water.level, 0.0);
        prop_assert_eq!(once.coffee.level, 0.0);
        prop_assert_eq!(once.total_coffees_made, 0);
        prop_assert_eq!(twice.water.level, once.water.level);
        prop_assert_eq!(twice.coffee.level, once.coffee.level);
        prop_assert_eq!(twice.total_coffees_made, once.total_coffees_made);
    }
}
