mod common;

use arbor_bt::State::{Running, Success};
use arbor_bt::{Sequencer, TRACE_NODE_ABORT};
use arbor_tools::SharedTraceLog;
use common::{single, with_children, Probe, Script};

#[test]
fn dropping_a_bound_instance_stops_running_nodes() {
    let probe = Probe::new();
    let (template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![
            Script::boxed(&probe, "done", &[Success]),
            Script::boxed(&probe, "busy", &[Running]),
            Script::boxed(&probe, "later", &[Success]),
        ],
    );
    let mut tree = template.instantiate().unwrap();
    tree.tick(0.1);
    probe.take();

    drop(tree);
    assert_eq!(probe.events(), ["busy:stop"]);
}

#[test]
fn dropping_a_template_stops_nothing() {
    let probe = Probe::new();
    let (template, _) = single(Script::boxed(&probe, "a", &[Running]));
    drop(template);
    assert!(probe.events().is_empty());
}

#[test]
fn abort_resets_running_nodes_to_idle() {
    let probe = Probe::new();
    let (template, action) = single(Script::boxed(&probe, "a", &[Running]));
    let mut tree = template.instantiate().unwrap();

    tree.tick(0.1);
    tree.abort();
    assert!(tree.running_nodes().is_empty());
    assert_eq!(tree.node(action).unwrap().state(), arbor_bt::State::Idle);
    assert_eq!(tree.state(), arbor_bt::State::Idle);

    tree.tick(0.1);
    assert_eq!(probe.count("a:start"), 2);
    assert_eq!(probe.count("a:stop"), 1);
}

#[test]
fn abort_is_a_no_op_when_nothing_runs() {
    let probe = Probe::new();
    let (template, _) = single(Script::boxed(&probe, "a", &[Success]));
    let mut tree = template.instantiate().unwrap();

    tree.tick(0.1);
    probe.take();
    tree.abort();
    assert!(probe.events().is_empty());
}

#[test]
fn abort_stops_children_before_parents() {
    let probe = Probe::new();
    let (template, sequencer) = with_children(
        Box::new(Sequencer::new()),
        vec![Script::boxed(&probe, "leaf", &[Running])],
    );
    let mut tree = template.instantiate().unwrap();
    let log = SharedTraceLog::new();
    tree.set_trace_sink(Some(Box::new(log.clone())));

    tree.tick(0.1);
    log.take();
    tree.abort();

    let aborted: Vec<u64> = log.snapshot().with_tag(TRACE_NODE_ABORT).map(|e| e.a).collect();
    let leaf = tree.children(sequencer)[0].index() as u64;
    assert_eq!(
        aborted,
        [leaf, sequencer.index() as u64, tree.root().index() as u64]
    );
}
