//! Scene hierarchy scenarios and consistency properties.

use std::sync::{Mutex, Once};

use et_core::{
    AnyComponent, Component, ComponentMeta, CoreError, Entity, EntityId, Scene, Transform,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use proptest::prelude::*;

/// Logger that keeps every warning so tests can assert on them.
struct WarningLog;

static WARNING_LOG: WarningLog = WarningLog;
static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static INSTALL: Once = Once::new();

impl Log for WarningLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            WARNINGS.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

fn capture_warnings() {
    INSTALL.call_once(|| {
        log::set_logger(&WARNING_LOG).unwrap();
        log::set_max_level(LevelFilter::Warn);
    });
}

/// Warnings logged so far that contain every one of `needles`.
fn warnings_matching(needles: &[&str]) -> usize {
    WARNINGS
        .lock()
        .unwrap()
        .iter()
        .filter(|w| needles.iter().all(|n| w.contains(n)))
        .count()
}

#[derive(Debug, Clone)]
struct Marker {
    meta: ComponentMeta,
}

impl Marker {
    fn new() -> Self {
        Self {
            meta: ComponentMeta::new::<Self>(),
        }
    }
}

impl Component for Marker {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ComponentMeta {
        &mut self.meta
    }
}

#[test]
fn root_with_duplicate_marker_keeps_original() {
    capture_warnings();
    let mut root = Entity::new("Root");
    let tag = format!("({})", root.id());
    let original = root.add_component(Marker::new()).unwrap();
    assert_eq!(warnings_matching(&[&tag, "Marker"]), 0);

    assert!(root.add_component(Marker::new()).is_none());
    assert_eq!(warnings_matching(&[&tag, "Marker"]), 1);

    assert_eq!(root.component_count(), 1);
    assert_eq!(root.get_component::<Marker>().unwrap().meta().id(), original);
}

#[test]
fn exiting_b_removes_it_from_a_once() {
    let mut scene = Scene::new();
    let a = scene.spawn("A");
    let b = scene.spawn_child(a, "B").unwrap();
    assert_eq!(scene.get(a).unwrap().children(), &[b]);

    scene.exit(b).unwrap();
    assert!(scene.get(a).unwrap().children().is_empty());
    assert!(!scene.remove_child(a, b));
    assert!(scene.roots().contains(&b));
}

#[test]
fn clone_keeps_component_kinds_with_new_identities() {
    let mut scene = Scene::new();
    let e = scene.spawn("Original");
    {
        let entity = scene.get_mut(e).unwrap();
        entity.add_component(Marker::new());
        entity.add_component(Transform::new());
    }

    let copy = scene.clone_entity(e).unwrap();
    let original = scene.get(e).unwrap();
    let cloned = scene.get(copy).unwrap();
    assert_ne!(original.id(), cloned.id());
    assert_eq!(original.component_count(), cloned.component_count());

    let a: Vec<_> = original.components_of::<AnyComponent>().collect();
    let b: Vec<_> = cloned.components_of::<AnyComponent>().collect();
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.meta().key(), y.meta().key());
        assert_ne!(x.meta().id(), y.meta().id());
    }
}

#[test]
fn unknown_parent_is_reported() {
    let mut scene = Scene::new();
    let child = scene.spawn("child");
    let ghost = EntityId::next();
    assert_eq!(
        scene.add_child(ghost, child),
        Err(CoreError::EntityNotFound(ghost))
    );
}

/// Reparent operations over a pool of entities: `(child, Some(parent))` or
/// `(child, None)` to detach.
fn ops() -> impl Strategy<Value = Vec<(usize, Option<usize>)>> {
    prop::collection::vec((0usize..8, prop::option::of(0usize..8)), 0..40)
}

fn check_invariants(scene: &Scene, ids: &[EntityId]) -> Result<(), TestCaseError> {
    for &id in ids {
        let entity = scene.get(id).unwrap();

        // parent and child lists agree
        match entity.parent() {
            Some(parent) => {
                let siblings = scene.get(parent).unwrap().children();
                prop_assert_eq!(siblings.iter().filter(|c| **c == id).count(), 1);
                prop_assert!(!scene.roots().contains(&id));
            }
            None => prop_assert!(scene.roots().contains(&id)),
        }
        for child in entity.children() {
            prop_assert_eq!(scene.get(*child).unwrap().parent(), Some(id));
        }

        // counts match a fresh walk and no entity is its own ancestor
        prop_assert_eq!(entity.num_descendants(), scene.descendants(id).len());
        prop_assert!(!scene.is_descended_from(id, Some(id)));
    }
    Ok(())
}

proptest! {
    #[test]
    fn hierarchy_stays_consistent(ops in ops()) {
        let mut scene = Scene::new();
        let ids: Vec<EntityId> = (0..8).map(|i| scene.spawn(format!("e{i}"))).collect();

        for (child, parent) in ops {
            let child = ids[child];
            let parent = parent.map(|p| ids[p]);
            match scene.set_parent(child, parent) {
                Ok(()) => prop_assert_eq!(scene.get(child).unwrap().parent(), parent),
                Err(CoreError::HierarchyCycle { .. }) => {
                    let parent = parent.unwrap();
                    prop_assert!(parent == child || scene.is_descended_from(parent, Some(child)));
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            check_invariants(&scene, &ids)?;
        }
    }

    #[test]
    fn deep_clone_matches_subtree_size(depth in 1usize..6, fanout in 1usize..4) {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let mut frontier = vec![root];
        for level in 0..depth {
            let mut next = Vec::new();
            for parent in frontier {
                for i in 0..fanout {
                    next.push(scene.spawn_child(parent, format!("n{level}-{i}")).unwrap());
                }
            }
            frontier = next;
        }

        let before = scene.len();
        let copy = scene.clone_entity(root).unwrap();
        prop_assert_eq!(scene.len(), before * 2);
        prop_assert_eq!(
            scene.get(copy).unwrap().num_descendants(),
            scene.get(root).unwrap().num_descendants()
        );
        prop_assert_eq!(scene.despawn(copy).unwrap(), before);
        prop_assert_eq!(scene.len(), before);
    }
}
