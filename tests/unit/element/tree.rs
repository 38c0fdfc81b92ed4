use super::*;

fn el(id: &str) -> Element {
    Element::text(id).with_id(id).unwrap()
}

fn group(id: &str) -> Element {
    Element::group().with_id(id).unwrap()
}

fn eid(s: &str) -> ElementId {
    ElementId::from(s)
}

fn order(tree: &ElementTree) -> Vec<(String, usize)> {
    tree.preorder()
        .map(|(e, d)| (e.id().to_string(), d))
        .collect()
}

#[test]
fn preorder_visits_groups_before_children() {
    let mut t = ElementTree::new();
    t.insert(None, el("a")).unwrap();
    t.insert(None, group("b")).unwrap();
    t.insert(Some(&eid("b")), el("c")).unwrap();
    t.insert(Some(&eid("b")), el("d")).unwrap();
    t.insert(None, el("e")).unwrap();

    assert_eq!(
        order(&t),
        vec![
            ("a".into(), 0),
            ("b".into(), 0),
            ("c".into(), 1),
            ("d".into(), 1),
            ("e".into(), 0),
        ]
    );
    assert_eq!(t.parent(&eid("c")).unwrap(), Some(&eid("b")));
    assert_eq!(t.parent(&eid("a")).unwrap(), None);
}

#[test]
fn insert_rejects_duplicates_and_non_group_parents() {
    let mut t = ElementTree::new();
    t.insert(None, el("a")).unwrap();
    let err = t.insert(None, el("a")).unwrap_err();
    assert_eq!(err.path(), Some("$.id"));

    assert!(t.insert(Some(&eid("a")), el("x")).is_err());
    assert!(matches!(
        t.insert(Some(&eid("missing")), el("y")),
        Err(StageError::NotFound(_))
    ));
    assert_eq!(t.len(), 1);
}

#[test]
fn set_children_rejects_elements_owned_elsewhere() {
    let mut t = ElementTree::new();
    t.insert(None, group("g1")).unwrap();
    t.insert(None, group("g2")).unwrap();
    t.insert(Some(&eid("g1")), el("x")).unwrap();

    let err = t.set_children(&eid("g2"), &[eid("x")]).unwrap_err();
    assert!(matches!(err, StageError::Ownership(_)));
    assert_eq!(t.children(&eid("g1")).unwrap(), vec![&eid("x")]);

    let err = t.set_children(&eid("g2"), &[eid("g1")]).unwrap_err();
    assert!(matches!(err, StageError::Ownership(_)));

    t.detach(&eid("x")).unwrap();
    t.set_children(&eid("g2"), &[eid("x")]).unwrap();
    assert_eq!(t.parent(&eid("x")).unwrap(), Some(&eid("g2")));
    assert!(t.children(&eid("g1")).unwrap().is_empty());
}

#[test]
fn set_children_rejects_cycles() {
    let mut t = ElementTree::new();
    t.insert(None, group("outer")).unwrap();
    t.insert(Some(&eid("outer")), group("inner")).unwrap();
    t.detach(&eid("outer")).unwrap();

    let err = t.set_children(&eid("inner"), &[eid("outer")]).unwrap_err();
    assert!(matches!(err, StageError::Ownership(_)));
    let err = t.set_children(&eid("inner"), &[eid("inner")]).unwrap_err();
    assert!(matches!(err, StageError::Ownership(_)));
    assert!(matches!(
        t.attach(Some(&eid("inner")), &eid("outer")),
        Err(StageError::Ownership(_))
    ));
}

#[test]
fn set_children_destroys_dropped_subtrees_and_reorders() {
    let mut t = ElementTree::new();
    t.insert(None, group("g")).unwrap();
    t.insert(Some(&eid("g")), el("a")).unwrap();
    t.insert(Some(&eid("g")), group("sub")).unwrap();
    t.insert(Some(&eid("sub")), el("deep")).unwrap();
    t.insert(Some(&eid("g")), el("b")).unwrap();

    t.set_children(&eid("g"), &[eid("b"), eid("a")]).unwrap();
    assert_eq!(t.children(&eid("g")).unwrap(), vec![&eid("b"), &eid("a")]);
    assert!(!t.contains(&eid("sub")));
    assert!(!t.contains(&eid("deep")));
    assert_eq!(t.len(), 3);
}

#[test]
fn detached_elements_are_held_but_not_walked() {
    let mut t = ElementTree::new();
    t.insert(None, el("a")).unwrap();
    t.insert(None, el("b")).unwrap();
    t.detach(&eid("a")).unwrap();

    assert!(t.contains(&eid("a")));
    assert!(!t.is_attached(&eid("a")).unwrap());
    assert_eq!(t.detached(), vec![&eid("a")]);
    assert_eq!(order(&t), vec![("b".into(), 0)]);

    assert!(matches!(
        t.attach(None, &eid("b")),
        Err(StageError::Ownership(_))
    ));
    t.attach(None, &eid("a")).unwrap();
    assert_eq!(order(&t), vec![("b".into(), 0), ("a".into(), 0)]);

    t.reorder(&eid("a"), 0).unwrap();
    assert_eq!(order(&t)[0].0, "a");
}

#[test]
fn remove_frees_ids_for_reuse() {
    let mut t = ElementTree::new();
    t.insert(None, group("g")).unwrap();
    t.insert(Some(&eid("g")), el("c")).unwrap();
    let removed = t.remove(&eid("g")).unwrap();
    assert!(removed.is_group());
    assert!(t.is_empty());

    t.insert(None, el("c")).unwrap();
    assert_eq!(order(&t), vec![("c".into(), 0)]);
}

#[test]
fn modify_is_atomic() {
    let mut t = ElementTree::new();
    t.insert(None, el("a")).unwrap();

    let err = t
        .modify(&eid("a"), |e| {
            e.set_x(10.0).unwrap();
            if let crate::element::model::ElementKind::Text(p) = e.kind_mut() {
                p.color = "nope".into();
            }
        })
        .unwrap_err();
    assert_eq!(err.path(), Some("$.color"));
    assert_eq!(t.get(&eid("a")).unwrap().geometry().x, 0.0);

    t.modify(&eid("a"), |e| e.set_x(10.0)).unwrap().unwrap();
    assert_eq!(t.get(&eid("a")).unwrap().geometry().x, 10.0);
}

#[test]
fn groups_with_children_stay_groups() {
    let mut t = ElementTree::new();
    t.insert(None, group("g")).unwrap();
    t.insert(Some(&eid("g")), el("c")).unwrap();
    let err = t
        .modify(&eid("g"), |e| {
            *e.kind_mut() = crate::element::model::ElementKind::Emoji(
                crate::element::model::EmojiProps { emoji: "x".into() },
            );
        })
        .unwrap_err();
    assert!(matches!(err, StageError::Validation { .. }));
}

#[test]
fn nesting_is_capped_at_max_depth() {
    let mut t = ElementTree::new();
    t.insert(None, group("g1")).unwrap();
    for i in 2..ElementTree::MAX_DEPTH {
        t.insert(Some(&eid(&format!("g{}", i - 1))), group(&format!("g{i}")))
            .unwrap();
    }
    let inner = eid(&format!("g{}", ElementTree::MAX_DEPTH - 1));
    t.insert(Some(&inner), group("deep")).unwrap();
    let before = t.len();
    let err = t.insert(Some(&eid("deep")), el("too-deep")).unwrap_err();
    assert!(matches!(err, StageError::Validation { .. }));
    assert_eq!(t.len(), before);

    t.insert(None, group("pair")).unwrap();
    t.insert(Some(&eid("pair")), el("pair-child")).unwrap();
    t.detach(&eid("pair")).unwrap();
    assert!(t.attach(Some(&inner), &eid("pair")).is_err());
    assert_eq!(t.detached(), vec![&eid("pair")]);
    assert!(
        t.set_children(&inner, &[eid("deep"), eid("pair")])
            .is_err()
    );
    assert_eq!(t.children(&inner).unwrap(), vec![&eid("deep")]);

    let roomier = eid(&format!("g{}", ElementTree::MAX_DEPTH - 2));
    t.attach(Some(&roomier), &eid("pair")).unwrap();
    assert_eq!(order(&t).last().unwrap().1, ElementTree::MAX_DEPTH - 1);
}
