mod common;

use arbor_bt::State::{Failure, Running, Success};
use arbor_bt::{Behaviour, Sequencer, Wait};
use arbor_core::{BlackboardScope, NodeProperty, SharedBlackboard};
use common::{single, tick_n, with_children};

#[test]
fn wait_succeeds_on_first_tick_at_or_after_duration() {
    let (template, _) = single(Box::new(Wait::new(1.0)));
    let mut tree = template.instantiate().unwrap();

    assert_eq!(
        tick_n(&mut tree, 0.25, 5),
        [Running, Running, Running, Running, Success]
    );
}

#[test]
fn wait_does_not_count_the_tick_that_started_it() {
    let (template, _) = single(Box::new(Wait::new(1.0)));
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 1.0, 2), [Running, Success]);
}

#[test]
fn sequential_waits_take_the_sum_of_their_durations() {
    let (template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![Box::new(Wait::new(1.0)) as Box<dyn Behaviour>, Box::new(Wait::new(1.0))],
    );

    let mut tree = template.instantiate().unwrap();
    assert_eq!(tick_n(&mut tree, 1.0, 3), [Running, Running, Success]);

    // The second wait starts on the tick the first one finishes.
    let mut tree = template.instantiate().unwrap();
    let states = tick_n(&mut tree, 0.5, 5);
    assert_eq!(states, [Running, Running, Running, Running, Success]);
    assert_eq!(tree.clock().time_seconds, 2.5);
}

#[test]
fn wait_restarts_its_timer_on_reentry() {
    let (template, _) = single(Box::new(Wait::new(0.5)));
    let mut tree = template.instantiate().unwrap();

    assert_eq!(
        tick_n(&mut tree, 0.25, 6),
        [Running, Running, Success, Running, Running, Success]
    );
}

#[test]
fn wait_duration_can_come_from_local_key() {
    let (mut template, _) = single(Box::new(Wait::new(NodeProperty::key("Delay"))));
    template
        .insert_blackboard_key("Delay", 0.5f32, BlackboardScope::Local)
        .unwrap();
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.25, 3), [Running, Running, Success]);

    tree.blackboard_mut().set("Delay", 1.0f32).unwrap();
    assert_eq!(
        tick_n(&mut tree, 0.25, 5),
        [Running, Running, Running, Running, Success]
    );
}

#[test]
fn wait_duration_falls_back_to_shared_key() {
    let shared = SharedBlackboard::default();
    let (mut template, _) = single(Box::new(Wait::new(NodeProperty::key("Delay"))));
    template.set_shared_blackboard(Some(shared.clone())).unwrap();
    template
        .insert_blackboard_key("Delay", 0.25f32, BlackboardScope::Shared)
        .unwrap();
    let mut tree = template.instantiate().unwrap();

    assert_eq!(tick_n(&mut tree, 0.25, 2), [Running, Success]);
}

#[test]
fn wait_with_unresolvable_duration_fails() {
    let (template, _) = single(Box::new(Wait::new(NodeProperty::key("Missing"))));
    let mut tree = template.instantiate().unwrap();
    assert_eq!(tree.tick(0.25), Failure);

    let (mut template, _) = single(Box::new(Wait::new(NodeProperty::key("Delay"))));
    template
        .insert_blackboard_key("Delay", true, BlackboardScope::Local)
        .unwrap();
    let mut tree = template.instantiate().unwrap();
    assert_eq!(tree.tick(0.25), Failure);
}
