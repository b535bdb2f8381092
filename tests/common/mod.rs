#![allow(dead_code)]

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Once};

use kitchensink_mock::prelude::*;

static INIT_LOGGING: Once = Once::new();

/// Install a test-writer subscriber honoring `RUST_LOG`. Only the first call has an effect.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

const RECEIVER: &str = "MockIFace";

/// Hand-written mock of an interface with two methods.
pub struct MockIFace {
    ctrl: Controller,
}

impl MockIFace {
    pub fn new(ctrl: &Controller) -> Self {
        Self { ctrl: ctrl.clone() }
    }

    pub fn expect(&self) -> Recorder {
        self.ctrl.recorder(RECEIVER)
    }

    pub fn call_a(&self, input: &str) {
        self.ctrl
            .call::<_, ()>(RECEIVER, "call_a", (input.to_string(),))
    }

    pub fn call_b(&self, input: &str) -> String {
        self.ctrl.call(RECEIVER, "call_b", (input.to_string(),))
    }
}

/// Expect one `call_a(input)` signalling completion.
pub fn call_a(input: &str) -> SetupFunc<Controller> {
    let input = input.to_string();
    SetupFunc::new(move |mocks: &Mocks<Controller>| -> Result<Call, MockError> {
        let call = mocks
            .get(MockIFace::new)
            .expect()
            .expect_call("call_a", (input.clone(),))
            .times(mocks.times(1));
        Ok(call.run(mocks.done_hook(1)?))
    })
}

/// Expect one `call_b(input)` returning `output` and signalling completion.
pub fn call_b(input: &str, output: &str) -> SetupFunc<Controller> {
    let (input, output) = (input.to_string(), output.to_string());
    SetupFunc::new(move |mocks: &Mocks<Controller>| -> Result<Call, MockError> {
        let call = mocks
            .get(MockIFace::new)
            .expect()
            .expect_call("call_b", (input.clone(),))
            .returns(output.clone())
            .times(mocks.times(1));
        Ok(call.run(mocks.done_hook(1)?))
    })
}

/// Hand the recorder itself to a combinator, which is not an expectation.
pub fn no_call() -> SetupFunc<Controller> {
    SetupFunc::new(|mocks: &Mocks<Controller>| mocks.get(MockIFace::new).expect())
}

/// Named step driving the mock.
pub type Step = fn(&MockIFace);

pub fn steps(entries: &[(&'static str, Step)]) -> BTreeMap<&'static str, Step> {
    entries.iter().copied().collect()
}

/// Steps `a`, `b1` (`call_b("b")` yields `c`), `b2` (yields `d`), `c`.
pub fn steps_abc() -> BTreeMap<&'static str, Step> {
    steps(&[
        ("a", |m: &MockIFace| m.call_a("a")),
        ("b1", |m: &MockIFace| assert_eq!(m.call_b("b"), "c")),
        ("b2", |m: &MockIFace| assert_eq!(m.call_b("b"), "d")),
        ("c", |m: &MockIFace| m.call_a("c")),
    ])
}

/// Steps `a`, `b` on `call_a` and `c`, `d` on `call_b`.
pub fn steps_abcd() -> BTreeMap<&'static str, Step> {
    steps(&[
        ("a", |m: &MockIFace| m.call_a("a")),
        ("b", |m: &MockIFace| m.call_a("b")),
        ("c", |m: &MockIFace| assert_eq!(m.call_b("c"), "d")),
        ("d", |m: &MockIFace| assert_eq!(m.call_b("d"), "e")),
    ])
}

/// [`steps_abcd`] plus `e` and `f` on `call_a`.
pub fn steps_abcdef() -> BTreeMap<&'static str, Step> {
    let mut steps = steps_abcd();
    steps.insert("e", |m: &MockIFace| m.call_a("e"));
    steps.insert("f", |m: &MockIFace| m.call_a("f"));
    steps
}

/// Run `order` against a fresh handler set up with `calls`; true when no failure occurred.
pub fn run_order(
    calls: &SetupFunc<Controller>,
    steps: &BTreeMap<&'static str, Step>,
    order: &[&str],
) -> bool {
    init_test_logging();
    let reporter = Arc::new(RecordingReporter::new());
    let config = MocksConfig::default()
        .with_label(order.join("-"))
        .with_verify_on_drop(false);
    let mocks: Mocks<Controller> = Mocks::with_config(reporter.clone(), config);
    if let Err(err) = mocks.expect(calls.clone()) {
        panic!("setup should compose: {err}");
    }

    let iface = mocks.get(MockIFace::new);
    let completed = catch_unwind(AssertUnwindSafe(|| {
        for name in order {
            steps[*name](&iface);
        }
    }))
    .is_ok();
    mocks.finish();

    let success = completed && !reporter.failed();
    if success {
        mocks.wait();
    }
    success
}

/// All orderings of `names`.
pub fn permutations(names: &[&'static str]) -> Vec<Vec<&'static str>> {
    if names.len() <= 1 {
        return vec![names.to_vec()];
    }
    let mut all = Vec::new();
    for (index, head) in names.iter().enumerate() {
        let mut rest = names.to_vec();
        rest.remove(index);
        for mut tail in permutations(&rest) {
            tail.insert(0, *head);
            all.push(tail);
        }
    }
    all
}

/// Check every permutation of the steps: exactly those in `successes` must pass.
pub fn assert_only_successes(
    calls: &SetupFunc<Controller>,
    steps: &BTreeMap<&'static str, Step>,
    successes: &[&str],
) {
    let names: Vec<&'static str> = steps.keys().copied().collect();
    let expectations: Vec<(String, bool)> = permutations(&names)
        .into_iter()
        .map(|order| {
            let name = order.join("-");
            let expected = successes.contains(&name.as_str());
            (name, expected)
        })
        .collect();
    assert_orders(calls, steps, &expectations);
}

/// Check the listed orders against their expected outcome.
pub fn assert_orders<S: AsRef<str>>(
    calls: &SetupFunc<Controller>,
    steps: &BTreeMap<&'static str, Step>,
    expectations: &[(S, bool)],
) {
    let mismatches: Vec<String> = expectations
        .iter()
        .filter_map(|(name, expected)| {
            let order: Vec<&str> = name.as_ref().split('-').collect();
            let actual = run_order(calls, steps, &order);
            (actual != *expected).then(|| {
                format!("{}: expected success={expected}, got {actual}", name.as_ref())
            })
        })
        .collect();
    assert!(mismatches.is_empty(), "order mismatches:\n{}", mismatches.join("\n"));
}
