mod common;

use std::thread;

use arbor_bt::State::{Running, Success};
use arbor_bt::{
    tick_agents, Agent, AgentConfig, Behaviour, CompareProperty, Sequencer, SetProperty, Tree, Wait,
};
use arbor_core::{BlackboardScope, BlackboardValue, SharedBlackboard};
use common::{single, with_children};

#[test]
fn deterministic_config_spreads_agents_over_frames() {
    let config = AgentConfig::deterministic(7, 4);
    assert_eq!(config.tick_every, 4);
    assert_eq!(config.tick_offset, 3);
    assert!(config.restart_on_completion);

    let ticking: Vec<u64> = (0..12).filter(|&f| config.should_tick(f)).collect();
    assert_eq!(ticking, [1, 5, 9]);

    let zero = AgentConfig::deterministic(3, 0);
    assert_eq!(zero.tick_every, 1);
    assert!((0..5).all(|f| zero.should_tick(f)));
}

#[test]
fn skipped_frames_deliver_their_time_on_the_next_tick() {
    let (template, _) = single(Box::new(Wait::new(1.0)));
    let mut agent = Agent::from_template(0, &template)
        .unwrap()
        .with_config(AgentConfig::deterministic(0, 2));

    let states: Vec<_> = (0..5).map(|frame| agent.tick(frame, 0.25)).collect();
    assert_eq!(states, [Running, Running, Running, Running, Success]);
    assert_eq!(agent.tree().clock().tick, 3);
    assert_eq!(agent.tree().clock().time_seconds, 1.25);
}

#[test]
fn agent_without_restart_stops_after_completion() {
    let (template, _) = single(Box::new(Wait::new(0.5)));
    let config = AgentConfig {
        restart_on_completion: false,
        ..AgentConfig::default()
    };
    let mut agent = Agent::from_template(1, &template).unwrap().with_config(config);

    let states: Vec<_> = (0..4).map(|frame| agent.tick(frame, 0.25)).collect();
    assert_eq!(states, [Running, Running, Success, Success]);
    assert!(agent.is_finished());
    assert_eq!(agent.tree().clock().tick, 3);
}

#[test]
fn agent_binds_an_unbound_tree() {
    let (template, _) = single(Box::new(Wait::new(0.5)));
    let agent = Agent::new(5, template.clone()).unwrap();
    assert!(agent.tree().is_bound());
    assert!(!template.is_bound());
}

#[test]
fn tick_agents_runs_in_id_order() {
    let template = Tree::new("idle");
    let mut agents: Vec<Agent> = [3, 1, 2]
        .into_iter()
        .map(|id| Agent::from_template(id, &template).unwrap())
        .collect();

    tick_agents(0, 0.1, &mut agents);
    let ids: Vec<u64> = agents.iter().map(|a| a.id).collect();
    assert_eq!(ids, [1, 2, 3]);
    assert!(agents.iter().all(|a| a.tree().clock().tick == 1));
}

#[test]
fn agents_tick_in_parallel_sharing_one_blackboard() {
    let shared = SharedBlackboard::default();
    let (mut template, _) = with_children(
        Box::new(Sequencer::new()),
        vec![
            Box::new(Wait::new(0.25)) as Box<dyn Behaviour>,
            Box::new(SetProperty::new("Done", BlackboardValue::Bool(true))),
            Box::new(CompareProperty::new("TeamSeen", BlackboardValue::Bool(true))),
        ],
    );
    template.set_shared_blackboard(Some(shared.clone())).unwrap();
    template
        .insert_blackboard_key("TeamSeen", true, BlackboardScope::Shared)
        .unwrap();
    template
        .insert_blackboard_key("Done", false, BlackboardScope::Local)
        .unwrap();

    let mut agents: Vec<Agent> = (0..16)
        .map(|id| Agent::from_template(id, &template).unwrap())
        .collect();

    thread::scope(|scope| {
        for chunk in agents.chunks_mut(4) {
            scope.spawn(move || {
                for frame in 0..2 {
                    for agent in chunk.iter_mut() {
                        agent.tick(frame, 0.25);
                    }
                }
            });
        }
    });

    for agent in &agents {
        assert_eq!(agent.last_state(), Success);
        assert_eq!(agent.tree().blackboard().get::<bool>("Done"), Ok(true));
        assert!(agent.tree().shared_blackboard().unwrap().ptr_eq(&shared));
    }
    assert_eq!(template.blackboard().get::<bool>("Done"), Ok(false));
}
