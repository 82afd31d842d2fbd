use ai_blackboard::{Blackboard, BlackboardConfig, BlackboardError, Value, VarType, Variable};

#[test]
fn write_to_unknown_name_declares_untyped_slot() {
    let mut bb = Blackboard::new();
    let scope = bb.create_scope(None).unwrap();

    assert_eq!(
        bb.get(scope, "unused_name"),
        Err(BlackboardError::UndefinedVariable("unused_name".into()))
    );

    bb.set(scope, "unused_name", 5).unwrap();
    assert_eq!(bb.get(scope, "unused_name"), Ok(&Value::Int(5)));
    assert_eq!(
        bb.get_var(scope, "unused_name").unwrap().var_type(),
        VarType::Nil
    );

    // Untyped slots take any value afterwards.
    bb.set(scope, "unused_name", "five").unwrap();
    assert_eq!(bb.get(scope, "unused_name"), Ok(&Value::from("five")));
}

#[test]
fn lookups_and_writes_fall_through_to_parent() {
    let mut bb = Blackboard::new();
    let parent = bb.create_scope(None).unwrap();
    let child = bb.create_scope(Some(parent)).unwrap();
    bb.declare(parent, "alert", Variable::with_value(VarType::Bool, false))
        .unwrap();

    assert!(bb.has(child, "alert"));
    assert_eq!(bb.get(child, "alert"), Ok(&Value::Bool(false)));

    bb.set(child, "alert", true).unwrap();
    assert_eq!(bb.get(parent, "alert"), Ok(&Value::Bool(true)));
    assert!(bb.store(child).unwrap().slot("alert").is_none());

    // Names unknown to the whole chain land in the scope written to.
    bb.set(child, "local", 1).unwrap();
    assert!(bb.has(child, "local"));
    assert!(!bb.has(parent, "local"));
}

#[test]
fn typed_slot_rejects_incompatible_write() {
    let mut bb = Blackboard::new();
    let scope = bb.create_scope(None).unwrap();
    bb.declare(scope, "hp", Variable::with_value(VarType::Int, 10))
        .unwrap();

    assert_eq!(
        bb.set(scope, "hp", "lots"),
        Err(BlackboardError::TypeMismatch {
            name: "hp".into(),
            expected: VarType::Int,
            actual: VarType::String,
        })
    );
    assert_eq!(bb.get(scope, "hp"), Ok(&Value::Int(10)));
}

#[test]
fn linked_name_shares_the_target_slot() {
    let mut bb = Blackboard::new();
    let parent = bb.create_scope(None).unwrap();
    let child = bb.create_scope(Some(parent)).unwrap();
    bb.declare(parent, "b", Variable::with_value(VarType::Int, 0))
        .unwrap();
    bb.declare(child, "a", Variable::with_value(VarType::Int, 99))
        .unwrap();

    bb.link(child, "a", parent, "b").unwrap();
    assert!(bb.store(child).unwrap().slot("a").is_none());
    assert_eq!(bb.get(child, "a"), Ok(&Value::Int(0)));

    bb.set(child, "a", 7).unwrap();
    assert_eq!(bb.get(child, "a"), Ok(&Value::Int(7)));
    assert_eq!(bb.get(parent, "b"), Ok(&Value::Int(7)));

    bb.set(parent, "b", 8).unwrap();
    assert_eq!(bb.get(child, "a"), Ok(&Value::Int(8)));
}

#[test]
fn links_chain_through_several_scopes() {
    let mut bb = Blackboard::new();
    let root = bb.create_scope(None).unwrap();
    let mid = bb.create_scope(Some(root)).unwrap();
    let leaf = bb.create_scope(Some(mid)).unwrap();
    bb.declare(root, "z", Variable::with_value(VarType::Int, 1))
        .unwrap();
    bb.link(mid, "y", root, "z").unwrap();
    bb.link(leaf, "x", mid, "y").unwrap();

    bb.set(leaf, "x", 3).unwrap();
    assert_eq!(bb.get(root, "z"), Ok(&Value::Int(3)));
    assert_eq!(bb.get(mid, "y"), Ok(&Value::Int(3)));
}

#[test]
fn link_target_is_resolved_lazily() {
    let mut bb = Blackboard::new();
    let parent = bb.create_scope(None).unwrap();
    let child = bb.create_scope(Some(parent)).unwrap();

    bb.link(child, "a", parent, "later").unwrap();
    assert!(!bb.has(child, "a"));
    assert_eq!(
        bb.get(child, "a"),
        Err(BlackboardError::UndefinedVariable("a".into()))
    );

    // A write through the dangling name creates the target, keeping the link live.
    bb.set(child, "a", 1).unwrap();
    assert_eq!(bb.get(parent, "later"), Ok(&Value::Int(1)));
    assert!(bb.store(child).unwrap().slot("a").is_none());
    assert!(bb.has(child, "a"));
}

#[test]
fn cyclic_links_are_reported() {
    let mut bb = Blackboard::with_config(BlackboardConfig { max_link_depth: 8 });
    let s1 = bb.create_scope(None).unwrap();
    let s2 = bb.create_scope(None).unwrap();
    bb.link(s1, "a", s2, "b").unwrap();
    bb.link(s2, "b", s1, "a").unwrap();

    assert_eq!(
        bb.get(s1, "a"),
        Err(BlackboardError::LinkCycle("a".into()))
    );
    assert!(!bb.has(s1, "a"));
    assert_eq!(bb.set(s1, "a", 1), Err(BlackboardError::LinkCycle("a".into())));
}

#[test]
fn removed_scopes_are_dangling() {
    let mut bb = Blackboard::new();
    let parent = bb.create_scope(None).unwrap();
    let child = bb.create_scope(Some(parent)).unwrap();
    bb.declare(parent, "x", Variable::untyped(1)).unwrap();

    assert!(bb.remove_scope(parent).is_some());
    assert!(bb.remove_scope(parent).is_none());
    assert!(!bb.contains_scope(parent));
    assert_eq!(
        bb.get(child, "x"),
        Err(BlackboardError::DanglingScope(parent))
    );

    // Slot reuse does not revive the old handle.
    let reused = bb.create_scope(None).unwrap();
    assert_ne!(reused, parent);
    assert_eq!(
        bb.get(parent, "x"),
        Err(BlackboardError::DanglingScope(parent))
    );
    assert_eq!(
        bb.create_scope(Some(parent)),
        Err(BlackboardError::DanglingScope(parent))
    );
    assert_eq!(bb.scope_count(), 2);
}

#[test]
fn erase_unlink_and_names() {
    let mut bb = Blackboard::new();
    let parent = bb.create_scope(None).unwrap();
    let scope = bb.create_scope(Some(parent)).unwrap();
    bb.declare(scope, "b", Variable::untyped(1)).unwrap();
    bb.link(scope, "a", parent, "x").unwrap();

    assert_eq!(bb.names(scope).unwrap(), vec!["a", "b"]);

    let link = bb.unlink(scope, "a").unwrap().unwrap();
    assert_eq!(link.scope, parent);
    assert_eq!(link.name, "x");

    assert!(bb.erase(scope, "b").unwrap());
    assert!(!bb.erase(scope, "b").unwrap());
    assert!(bb.names(scope).unwrap().is_empty());
}

#[test]
fn scope_cursor_reads_and_writes() {
    let mut bb = Blackboard::new();
    let id = bb.create_scope(None).unwrap();

    let mut scope = bb.scope(id);
    scope.set("ammo", 12).unwrap();
    assert!(scope.has("ammo"));
    assert_eq!(scope.get("ammo"), Ok(&Value::Int(12)));
    assert_eq!(scope.id(), id);
}
