use arbor::core::BlackboardValue;
use arbor::prelude::*;

#[test]
fn prelude_builds_and_ticks_a_tree() {
    let mut template = Tree::new("guard");
    template
        .create_blackboard_key("Alert", KeyType::Bool, BlackboardScope::Local)
        .unwrap();
    let root = template.root();
    let seq = template
        .attach(root, Box::new(arbor::bt::Sequencer::new()))
        .unwrap();
    template
        .attach(seq, Box::new(arbor::bt::SetProperty::new("Alert", BlackboardValue::Bool(true))))
        .unwrap();
    template
        .attach(seq, Box::new(arbor::bt::CompareProperty::new("Alert", BlackboardValue::Bool(true))))
        .unwrap();

    let mut agent = Agent::from_template(7, &template).unwrap();
    assert_eq!(agent.tick(0, 0.1), State::Success);
    assert!(agent.tree().blackboard().get::<bool>("Alert").unwrap());
    assert!(!template.blackboard().get::<bool>("Alert").unwrap());
}

#[cfg(feature = "serde")]
#[test]
fn prelude_exposes_assets() {
    let asset = TreeAsset::from_json(
        r#"{"name": "idle", "root": "00000000-0000-4000-8000-000000000001",
            "nodes": [{"guid": "00000000-0000-4000-8000-000000000001", "type": "Root",
                       "children": ["00000000-0000-4000-8000-000000000002"]},
                      {"guid": "00000000-0000-4000-8000-000000000002", "type": "Succeed"}]}"#,
    )
    .unwrap();
    let tree = asset
        .build(&NodeRegistry::with_builtins(), &TreeLibrary::new())
        .unwrap();
    assert_eq!(tree.len(), 2);
}
