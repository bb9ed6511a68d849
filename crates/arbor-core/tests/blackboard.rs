use arbor_core::{
    Blackboard, BlackboardError, BlackboardValue, KeyType, ObjectRef, SharedBlackboard, Vec3,
};

#[test]
fn blackboard_create_set_get_remove_roundtrip() {
    let mut bb = Blackboard::new();
    assert!(!bb.contains("Health"));

    bb.create_key("Health", KeyType::Int).unwrap();
    bb.insert("Name", "grunt").unwrap();

    assert_eq!(bb.get::<i32>("Health"), Ok(0));
    bb.set("Health", 75).unwrap();
    assert_eq!(bb.get::<i32>("Health"), Ok(75));
    assert_eq!(bb.get::<String>("Name").as_deref(), Ok("grunt"));

    let removed = bb.remove("Health").unwrap();
    assert_eq!(removed.value, BlackboardValue::Int(75));
    assert_eq!(
        bb.get::<i32>("Health"),
        Err(BlackboardError::KeyNotFound {
            name: "Health".to_string()
        })
    );
}

#[test]
fn keys_keep_authoring_order() {
    let mut bb = Blackboard::new();
    for (name, ty) in [("c", KeyType::Bool), ("a", KeyType::Float), ("b", KeyType::Vector3)] {
        bb.create_key(name, ty).unwrap();
    }
    assert_eq!(bb.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    assert_eq!(bb.keys()[2].key_type(), KeyType::Vector3);
}

#[test]
fn every_key_type_starts_with_its_zero_value() {
    let mut bb = Blackboard::new();
    for ty in KeyType::ALL {
        bb.create_key(ty.name(), ty).unwrap();
        assert_eq!(bb.value(ty.name()).unwrap().key_type(), ty);
    }
    assert_eq!(bb.get::<Option<ObjectRef>>("object"), Ok(None));
    assert_eq!(bb.get::<Vec3>("vector3"), Ok(Vec3::default()));
}

#[test]
fn type_mismatch_is_reported_not_converted() {
    let mut bb = Blackboard::new();
    bb.insert("Speed", 2.5f32).unwrap();

    assert_eq!(
        bb.get::<i32>("Speed"),
        Err(BlackboardError::KeyTypeMismatch {
            name: "Speed".to_string(),
            stored: KeyType::Float,
            requested: KeyType::Int,
        })
    );
    assert!(matches!(
        bb.set("Speed", 3i32),
        Err(BlackboardError::KeyTypeMismatch { .. })
    ));
    assert_eq!(bb.get::<f32>("Speed"), Ok(2.5));
}

#[test]
fn set_never_creates_keys() {
    let mut bb = Blackboard::new();
    assert!(matches!(
        bb.set("Missing", true),
        Err(BlackboardError::KeyNotFound { .. })
    ));
    assert!(bb.is_empty());
}

#[test]
fn duplicate_and_empty_names_are_rejected() {
    let mut bb = Blackboard::new();
    bb.create_key("Target", KeyType::Object).unwrap();

    assert!(matches!(
        bb.create_key("Target", KeyType::Bool),
        Err(BlackboardError::DuplicateKey { .. })
    ));
    assert_eq!(bb.create_key("", KeyType::Bool), Err(BlackboardError::InvalidKeyName));
    assert_eq!(bb.len(), 1);
}

#[test]
fn cloned_blackboard_has_independent_storage() {
    let mut original = Blackboard::new();
    original.insert("Ammo", 10).unwrap();

    let mut copy = original.clone();
    copy.set("Ammo", 3).unwrap();

    assert_eq!(original.get::<i32>("Ammo"), Ok(10));
    assert_eq!(copy.get::<i32>("Ammo"), Ok(3));
}

#[test]
fn shared_handles_alias_one_blackboard() {
    let mut bb = Blackboard::new();
    bb.insert("Alarm", false).unwrap();

    let shared = SharedBlackboard::new(bb);
    let other = shared.clone();
    assert!(shared.ptr_eq(&other));
    assert_eq!(shared.handle_count(), 2);

    other.set("Alarm", true).unwrap();
    assert_eq!(shared.get::<bool>("Alarm"), Ok(true));

    let unrelated = SharedBlackboard::default();
    assert!(!shared.ptr_eq(&unrelated));
}
