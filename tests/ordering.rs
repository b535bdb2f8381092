#![cfg(feature = "controller")]

mod common;

use std::sync::Arc;

use common::*;
use kitchensink_mock::prelude::*;
use proptest::prelude::*;

#[test]
fn setup_leaves_calls_unordered() {
    let calls = setup([
        call_a("a"),
        setup([call_b("b", "c"), call_b("b", "d")]),
        call_a("c"),
    ]);

    // Only the stubbed results of the repeated `call_b("b")` constrain the order.
    let successes: Vec<String> = permutations(&["a", "b1", "b2", "c"])
        .into_iter()
        .filter(|order| {
            let b1 = order.iter().position(|step| *step == "b1");
            let b2 = order.iter().position(|step| *step == "b2");
            b1 < b2
        })
        .map(|order| order.join("-"))
        .collect();
    assert_eq!(successes.len(), 12);

    let successes: Vec<&str> = successes.iter().map(String::as_str).collect();
    assert_only_successes(&calls, &steps_abc(), &successes);
}

#[test]
fn chain_admits_only_the_declared_order() {
    let calls = chain([
        call_a("a"),
        chain([call_b("b", "c"), call_b("b", "d")]),
        call_a("c"),
    ]);

    assert_only_successes(&calls, &steps_abc(), &["a-b1-b2-c"]);
}

const INTERLEAVED_PAIRS: [&str; 6] = [
    "a-b-c-d", "a-c-b-d", "a-c-d-b", "c-a-b-d", "c-a-d-b", "c-d-a-b",
];

#[test]
fn setup_of_chains_interleaves_them_freely() {
    let calls = setup([
        chain([call_a("a"), call_a("b")]),
        chain([call_b("c", "d"), call_b("d", "e")]),
    ]);

    assert_only_successes(&calls, &steps_abcd(), &INTERLEAVED_PAIRS);
}

#[test]
fn setup_inside_a_chain_detaches_the_sub_chain() {
    let calls = chain([
        call_a("a"),
        call_a("b"),
        setup([chain([call_b("c", "d"), call_b("d", "e")])]),
    ]);

    assert_only_successes(&calls, &steps_abcd(), &INTERLEAVED_PAIRS);
}

#[test]
fn parallel_branches_join_before_the_successor() {
    let calls = chain([
        call_a("a"),
        parallel([
            call_a("b"),
            chain([call_b("c", "d"), call_b("d", "e")]),
            parallel([call_a("e")]),
        ]),
        call_a("f"),
    ]);

    assert_only_successes(
        &calls,
        &steps_abcdef(),
        &[
            "a-b-c-d-e-f",
            "a-b-c-e-d-f",
            "a-b-e-c-d-f",
            "a-c-b-d-e-f",
            "a-c-d-b-e-f",
            "a-c-d-e-b-f",
            "a-c-b-e-d-f",
            "a-c-e-d-b-f",
            "a-c-e-b-d-f",
            "a-e-b-c-d-f",
            "a-e-c-b-d-f",
            "a-e-c-d-b-f",
        ],
    );
}

#[test]
fn sub_selects_ranges_of_realized_sequences() {
    let calls = chain([
        sub(0, 0, chain([call_a("a"), call_a("b")])),
        sub(0, -1, parallel([call_b("c", "d"), call_b("d", "e")])),
        sub(0, 0, call_a("e")),
        sub(2, 2, setup([call_a("f")])),
    ]);

    assert_orders(
        &calls,
        &steps_abcdef(),
        &[
            ("a-b-c-d-e-f", true),
            ("a-c-b-d-e-f", true),
            ("a-c-d-b-e-f", true),
            ("a-c-d-e-b-f", true),
            ("f-a-b-c-d-e", true),
            ("a-f-b-c-d-e", true),
            ("a-b-f-c-d-e", true),
            ("a-b-c-f-d-e", true),
            ("a-b-c-d-f-e", true),
            ("a-c-d-e-f-b", true),
            ("b-a-c-d-e-f", false),
            ("c-a-b-d-e-f", false),
            ("d-a-b-c-e-f", false),
            ("a-b-c-e-d-f", false),
            ("a-b-d-e-c-f", false),
        ],
    );
}

fn steps_abcde() -> std::collections::BTreeMap<&'static str, Step> {
    let mut steps = steps_abcd();
    steps.insert("e", |m: &MockIFace| m.call_a("e"));
    steps
}

fn before(order: &[&str], first: &str, second: &str) -> bool {
    let position = |name| order.iter().position(|step| *step == name);
    position(first) < position(second)
}

#[test]
fn sub_range_of_a_chain_keeps_its_sequence() {
    let calls = chain([
        call_a("a"),
        sub(1, -1, chain([call_a("b"), call_b("c", "d"), call_b("d", "e")])),
        call_a("e"),
    ]);

    assert_only_successes(&calls, &steps_abcde(), &["a-b-c-d-e", "b-a-c-d-e"]);
}

#[test]
fn sub_range_of_a_parallel_block_joins_before_the_successor() {
    let calls = chain([
        call_a("a"),
        sub(1, 2, parallel([call_a("b"), call_b("c", "d"), call_b("d", "e")])),
        call_a("e"),
    ]);

    let successes: Vec<String> = permutations(&["a", "b", "c", "d", "e"])
        .into_iter()
        .filter(|order| {
            before(order, "a", "c")
                && before(order, "a", "d")
                && before(order, "c", "e")
                && before(order, "d", "e")
        })
        .map(|order| order.join("-"))
        .collect();
    assert_eq!(successes.len(), 10);

    let successes: Vec<&str> = successes.iter().map(String::as_str).collect();
    assert_only_successes(&calls, &steps_abcde(), &successes);
}

#[test]
fn detach_modes_relax_the_chain() {
    let calls = chain([
        detach(DetachMode::None, call_a("a")),
        detach(DetachMode::Head, call_a("b")),
        detach(DetachMode::Tail, call_b("c", "d")),
        detach(DetachMode::Both, call_b("d", "e")),
    ]);

    assert_only_successes(
        &calls,
        &steps_abcd(),
        &[
            "a-b-c-d", "a-b-d-c", "a-d-b-c", "b-a-c-d", "b-a-d-c", "b-d-a-c", "d-a-b-c",
            "d-b-a-c",
        ],
    );
}

#[test]
fn detach_tail_lets_successors_overtake() {
    let calls = chain([
        call_a("a"),
        detach(DetachMode::Tail, call_a("b")),
        call_b("c", "d"),
    ]);
    let steps = steps(&[
        ("a", |m: &MockIFace| m.call_a("a")),
        ("b", |m: &MockIFace| m.call_a("b")),
        ("c", |m: &MockIFace| assert_eq!(m.call_b("c"), "d")),
    ]);

    assert_only_successes(&calls, &steps, &["a-b-c", "a-c-b"]);
}

#[test]
fn composition_errors_fail_setup() {
    // Rejected setups may leave declared calls behind; they are never exercised.
    let config = MocksConfig::default().with_verify_on_drop(false);
    let mocks: Mocks<Controller> = Mocks::with_config(Arc::new(PanicReporter), config);
    for calls in [
        setup([no_call()]),
        chain([no_call()]),
        parallel([no_call()]),
        sub(0, 0, no_call()),
        detach(DetachMode::Both, no_call()),
    ] {
        let err = mocks.expect(calls).err().expect("recorder is rejected");
        assert!(
            matches!(err, MockError::Composition { type_name } if type_name.ends_with("Recorder")),
            "{err}"
        );
    }

    assert_eq!(
        DetachMode::try_from(4),
        Err(MockError::UnsupportedDetachMode(4))
    );

    for mode in [DetachMode::Head, DetachMode::Tail, DetachMode::Both] {
        assert_eq!(
            mocks.expect(sub(0, 0, detach(mode, call_a("x")))).err(),
            Some(MockError::DetachNotAllowedInSub(mode))
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn chain_rejects_every_other_order(
        order in Just(vec!["a", "b", "c", "d", "e"]).prop_shuffle()
    ) {
        let calls = chain(["a", "b", "c", "d", "e"].map(call_a));
        let steps = steps(&[
            ("a", |m: &MockIFace| m.call_a("a")),
            ("b", |m: &MockIFace| m.call_a("b")),
            ("c", |m: &MockIFace| m.call_a("c")),
            ("d", |m: &MockIFace| m.call_a("d")),
            ("e", |m: &MockIFace| m.call_a("e")),
        ]);

        let declared = order == ["a", "b", "c", "d", "e"];
        prop_assert_eq!(run_order(&calls, &steps, &order), declared);
    }
}
