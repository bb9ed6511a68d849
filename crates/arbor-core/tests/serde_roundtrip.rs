#![cfg(feature = "serde")]

use arbor_core::{Blackboard, BlackboardValue, NodeProperty, ObjectRef, Vec2};

#[test]
fn blackboard_json_roundtrip_keeps_order_and_types() {
    let mut bb = Blackboard::new();
    bb.insert("Health", 100).unwrap();
    bb.insert("Home", Vec2::new(1.0, -2.0)).unwrap();
    bb.insert("Target", Some(ObjectRef(42))).unwrap();

    let json = serde_json::to_string(&bb).expect("serialize");
    let roundtrip: Blackboard = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, bb);
}

#[test]
fn node_property_uses_snake_case_tags() {
    let key: NodeProperty<BlackboardValue> = serde_json::from_str(r#"{"key":"WaitTime"}"#).unwrap();
    assert_eq!(key, NodeProperty::key("WaitTime"));

    let literal: NodeProperty<BlackboardValue> =
        serde_json::from_str(r#"{"value":{"Float":1.5}}"#).unwrap();
    assert_eq!(literal, NodeProperty::Value(BlackboardValue::Float(1.5)));
}
