mod common;

use arbor_bt::{InterruptSelector, Parallel, Selector, Sequencer, State};
use common::{tick_n, with_children, Probe, Script};

use State::{Failure, Running, Success};

#[test]
fn sequencer_succeeds_on_the_tick_its_last_child_succeeds() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![
            Script::boxed(&probe, "a", &[Success]),
            Script::boxed(&probe, "b", &[Running, Running, Success]),
            Script::boxed(&probe, "c", &[Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.1, 3), [Running, Running, Success]);
    assert_eq!(probe.count("c:update"), 1);
}

#[test]
fn sequencer_resumes_at_running_child() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![
            Script::boxed(&probe, "a", &[Success]),
            Script::boxed(&probe, "b", &[Running, Running, Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    tick_n(&mut tree, 0.1, 3);
    assert_eq!(probe.count("a:update"), 1);
    assert_eq!(probe.count("b:update"), 3);
    assert_eq!(probe.count("b:start"), 1);
}

#[test]
fn sequencer_stops_at_first_failure() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![
            Script::boxed(&probe, "a", &[Failure]),
            Script::boxed(&probe, "b", &[Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tree.tick(0.1), Failure);
    assert_eq!(probe.count("b:update"), 0);
}

#[test]
fn sequencer_restarts_from_first_child_after_finishing() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![
            Script::boxed(&probe, "a", &[Success]),
            Script::boxed(&probe, "b", &[Running, Failure]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.1, 3), [Running, Failure, Failure]);
    // First activation: a once; second activation starts again at a.
    assert_eq!(probe.count("a:update"), 2);
    assert_eq!(probe.count("a:start"), 2);
}

#[test]
fn empty_sequencer_succeeds_and_empty_selector_fails() {
    let (sequencer, _) = with_children(Box::new(Sequencer::new()), Vec::new());
    let (selector, _) = with_children(Box::new(Selector::new()), Vec::new());

    assert_eq!(sequencer.instantiate().unwrap().tick(0.1), Success);
    assert_eq!(selector.instantiate().unwrap().tick(0.1), Failure);
}

#[test]
fn selector_resumes_at_running_child() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Selector::new()),
        vec![
            Script::boxed(&probe, "a", &[Failure, Success]),
            Script::boxed(&probe, "b", &[Running, Running, Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.1, 3), [Running, Running, Success]);
    // a would now succeed, but it is not re-checked while b runs.
    assert_eq!(probe.count("a:update"), 1);
}

#[test]
fn selector_stops_at_first_success() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Selector::new()),
        vec![
            Script::boxed(&probe, "a", &[Failure]),
            Script::boxed(&probe, "b", &[Success]),
            Script::boxed(&probe, "c", &[Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tree.tick(0.1), Success);
    assert_eq!(probe.count("c:update"), 0);
}

#[test]
fn selector_fails_when_every_child_fails() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Selector::new()),
        vec![
            Script::boxed(&probe, "a", &[Failure]),
            Script::boxed(&probe, "b", &[Failure]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tree.tick(0.1), Failure);
    assert_eq!(probe.count("a:update"), 1);
    assert_eq!(probe.count("b:update"), 1);
}

#[test]
fn parallel_waits_for_every_child() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Parallel::new()),
        vec![
            Script::boxed(&probe, "a", &[Running, Running, Success]),
            Script::boxed(&probe, "b", &[Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.1, 3), [Running, Running, Success]);
    // b finished on the first tick and is not re-run while a catches up.
    assert_eq!(probe.count("b:update"), 1);
    assert_eq!(probe.count("a:update"), 3);
}

#[test]
fn parallel_failure_aborts_running_siblings() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Parallel::new()),
        vec![
            Script::boxed(&probe, "a", &[Running]),
            Script::boxed(&probe, "b", &[Running, Failure]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.1, 2), [Running, Failure]);
    assert_eq!(probe.count("a:stop"), 1);
    assert!(tree.running_nodes().is_empty());
}

#[test]
fn interrupt_selector_aborts_lower_priority_child() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(InterruptSelector::new()),
        vec![
            Script::boxed(&probe, "high", &[Failure, Running]),
            Script::boxed(&probe, "low", &[Running]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tree.tick(0.1), Running);
    assert_eq!(probe.take(), ["high:start", "high:update", "high:stop", "low:start", "low:update"]);

    assert_eq!(tree.tick(0.1), Running);
    assert_eq!(probe.take(), ["high:start", "high:update", "low:stop"]);
}

#[test]
fn interrupt_selector_rechecks_from_first_child_every_tick() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(InterruptSelector::new()),
        vec![
            Script::boxed(&probe, "high", &[Failure]),
            Script::boxed(&probe, "low", &[Running, Running, Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.1, 3), [Running, Running, Success]);
    assert_eq!(probe.count("high:update"), 3);
    assert_eq!(probe.count("low:start"), 1);
}
