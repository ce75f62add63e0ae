use std::collections::HashMap;

use log::warn;

use crate::component::{Component, ComponentKey, ComponentQuery};
use crate::id::{ComponentId, EntityId};

/// A named node in the scene tree that owns a set of components.
///
/// Holds at most one component per concrete kind. Components keep their
/// insertion order, which is the order every hook and every multi-result
/// lookup observes. Hierarchy links are maintained by the owning
/// [`Scene`](crate::Scene); an entity on its own is always a root.
///
/// `Entity` is deliberately not `Clone`: copies go through
/// [`Entity::duplicate`] or [`Scene::clone_entity`](crate::Scene::clone_entity),
/// both of which assign fresh identities.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    name: String,
    destroyed: bool,
    components: Vec<Box<dyn Component>>,
    by_key: HashMap<ComponentKey, usize>,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    num_descendants: usize,
}

impl Entity {
    /// Create an empty, unparented entity with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::next(),
            name: name.into(),
            destroyed: false,
            components: Vec::new(),
            by_key: HashMap::new(),
            parent: None,
            children: Vec::new(),
            num_descendants: 0,
        }
    }

    /// The entity's unique ID.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The entity's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Whether the entity carries the tombstone flag.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The parent entity, if any.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Direct children in attachment order.
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Number of entities below this one in the tree.
    pub fn num_descendants(&self) -> usize {
        self.num_descendants
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Attach a component. Returns its ID, or `None` if a component of the
    /// same kind is already attached, in which case the newcomer is dropped
    /// and the original is kept.
    pub fn add_component<C: Component>(&mut self, component: C) -> Option<ComponentId> {
        self.add_boxed_component(Box::new(component))
    }

    /// Attach an already boxed component. Same rules as
    /// [`add_component`](Self::add_component).
    pub fn add_boxed_component(&mut self, mut component: Box<dyn Component>) -> Option<ComponentId> {
        let key = component.meta().key();
        if self.by_key.contains_key(&key) {
            warn!(
                "{} already has a {key} component; ignoring the new one",
                self.describe()
            );
            return None;
        }
        component.meta_mut().set_entity(Some(self.id));
        let id = component.meta().id();
        self.by_key.insert(key, self.components.len());
        self.components.push(component);
        Some(id)
    }

    /// Look up a component by concrete kind or capability.
    ///
    /// The exact kind is tried first; otherwise the first component in
    /// insertion order that satisfies `Q` is returned.
    pub fn get_component<Q: ComponentQuery>(&self) -> Option<&Q::Target> {
        if let Some(&pos) = Q::exact_key().and_then(|key| self.by_key.get(&key)) {
            return Q::cast(self.components[pos].as_ref());
        }
        self.components.iter().find_map(|c| Q::cast(c.as_ref()))
    }

    /// Mutable form of [`get_component`](Self::get_component).
    pub fn get_component_mut<Q: ComponentQuery>(&mut self) -> Option<&mut Q::Target> {
        let pos = Q::exact_key()
            .and_then(|key| self.by_key.get(&key).copied())
            .or_else(|| {
                self.components
                    .iter()
                    .position(|c| Q::cast(c.as_ref()).is_some())
            })?;
        Q::cast_mut(self.components[pos].as_mut())
    }

    /// Every attached component satisfying `Q`, in insertion order.
    pub fn components_of<Q: ComponentQuery>(&self) -> impl Iterator<Item = &Q::Target> {
        self.components.iter().filter_map(|c| Q::cast(c.as_ref()))
    }

    /// Whether a component of kind `C` is attached.
    pub fn has_component<C: Component>(&self) -> bool {
        self.by_key.contains_key(&ComponentKey::of::<C>())
    }

    /// Detach and return the component of kind `C`, with its owner cleared.
    pub fn remove_component<C: Component>(&mut self) -> Option<C> {
        let pos = self.by_key.remove(&ComponentKey::of::<C>())?;
        let mut component = self.components.remove(pos);
        for index in self.by_key.values_mut() {
            if *index > pos {
                *index -= 1;
            }
        }
        component.meta_mut().set_entity(None);
        component.into_any().downcast::<C>().ok().map(|boxed| *boxed)
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// All attached components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    /// Display name of an attached component: `"<entity>-><Kind>"`.
    pub fn component_name(&self, key: ComponentKey) -> String {
        format!("{}->{key}", self.name)
    }

    /// Copy name and components into a new, unparented entity with fresh
    /// identities. Children are not copied; see
    /// [`Scene::clone_entity`](crate::Scene::clone_entity) for deep copies.
    pub fn duplicate(&self) -> Entity {
        let mut copy = Entity::new(self.name.clone());
        for component in &self.components {
            copy.add_boxed_component(component.clone_component());
        }
        copy
    }

    fn describe(&self) -> String {
        if self.name.is_empty() {
            format!("entity {}", self.id)
        } else {
            format!("entity '{}' ({})", self.name, self.id)
        }
    }

    // -----------------------------------------------------------------------
    // Hooks and links, driven by the scene
    // -----------------------------------------------------------------------

    pub(crate) fn init_components(&mut self) {
        for component in &mut self.components {
            component.on_init();
        }
    }

    pub(crate) fn exit_components(&mut self) {
        for component in &mut self.components {
            component.on_exit();
        }
    }

    pub(crate) fn notify_hierarchy_change(&mut self, previous_parent: Option<EntityId>) {
        for component in &mut self.components {
            component.on_hierarchy_change(previous_parent);
        }
    }

    pub(crate) fn notify_add_child(&mut self, child: EntityId) {
        for component in &mut self.components {
            component.on_add_child(child);
        }
    }

    pub(crate) fn notify_remove_child(&mut self, child: EntityId) {
        for component in &mut self.components {
            component.on_remove_child(child);
        }
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.destroyed = true;
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: EntityId) {
        self.children.push(child);
    }

    pub(crate) fn unlink_child(&mut self, child: EntityId) -> bool {
        match self.children.iter().position(|c| *c == child) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_descendants(&mut self, count: usize) {
        self.num_descendants += count;
    }

    pub(crate) fn sub_descendants(&mut self, count: usize) {
        self.num_descendants = self.num_descendants.saturating_sub(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{AnyComponent, ComponentMeta};

    trait Glow {
        fn lumens(&self) -> u32;
    }

    #[derive(Debug, Clone)]
    struct Lamp {
        meta: ComponentMeta,
        lumens: u32,
    }

    impl Lamp {
        fn new(lumens: u32) -> Self {
            Self {
                meta: ComponentMeta::new::<Self>(),
                lumens,
            }
        }
    }

    impl Component for Lamp {
        fn meta(&self) -> &ComponentMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut ComponentMeta {
            &mut self.meta
        }
    }

    impl Glow for Lamp {
        fn lumens(&self) -> u32 {
            self.lumens
        }
    }

    #[derive(Debug, Clone)]
    struct Torch {
        meta: ComponentMeta,
    }

    impl Torch {
        fn new() -> Self {
            Self {
                meta: ComponentMeta::new::<Self>(),
            }
        }
    }

    impl Component for Torch {
        fn meta(&self) -> &ComponentMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut ComponentMeta {
            &mut self.meta
        }
    }

    impl Glow for Torch {
        fn lumens(&self) -> u32 {
            7
        }
    }

    #[derive(Debug, Clone)]
    struct Marker {
        meta: ComponentMeta,
        tag: &'static str,
    }

    impl Marker {
        fn new(tag: &'static str) -> Self {
            Self {
                meta: ComponentMeta::new::<Self>(),
                tag,
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

    /// Anything that glows: lamps and torches.
    struct Glowing;

    impl ComponentQuery for Glowing {
        type Target = dyn Glow;

        fn cast<'a>(
            component: &'a (dyn Component + 'static),
        ) -> Option<&'a (dyn Glow + 'static)> {
            let any = component.as_any();
            if let Some(lamp) = any.downcast_ref::<Lamp>() {
                return Some(lamp);
            }
            if let Some(torch) = any.downcast_ref::<Torch>() {
                return Some(torch);
            }
            None
        }

        fn cast_mut<'a>(
            component: &'a mut (dyn Component + 'static),
        ) -> Option<&'a mut (dyn Glow + 'static)> {
            fn glow<G: Glow + 'static>(g: &mut G) -> &mut (dyn Glow + 'static) {
                g
            }

            let any = component.as_any_mut();
            if any.is::<Lamp>() {
                return any.downcast_mut::<Lamp>().map(glow);
            }
            any.downcast_mut::<Torch>().map(glow)
        }
    }

    #[test]
    fn add_then_get_returns_component() {
        let mut entity = Entity::new("Root");
        let id = entity.add_component(Marker::new("a")).unwrap();

        let marker = entity.get_component::<Marker>().unwrap();
        assert_eq!(marker.meta().id(), id);
        assert_eq!(marker.meta().entity(), Some(entity.id()));
    }

    #[test]
    fn duplicate_kind_is_ignored_and_original_kept() {
        let mut entity = Entity::new("Root");
        let first = entity.add_component(Marker::new("first")).unwrap();
        assert!(entity.add_component(Marker::new("second")).is_none());

        assert_eq!(entity.component_count(), 1);
        let marker = entity.get_component::<Marker>().unwrap();
        assert_eq!(marker.meta().id(), first);
        assert_eq!(marker.tag, "first");
    }

    #[test]
    fn missing_kind_returns_none() {
        let mut entity = Entity::new("e");
        entity.add_component(Marker::new("a"));
        assert!(entity.get_component::<Lamp>().is_none());
        assert!(!entity.has_component::<Lamp>());
        assert!(entity.has_component::<Marker>());
    }

    #[test]
    fn capability_query_scans_in_insertion_order() {
        let mut entity = Entity::new("e");
        entity.add_component(Marker::new("m"));
        entity.add_component(Torch::new());
        entity.add_component(Lamp::new(40));

        assert_eq!(entity.get_component::<Glowing>().map(|g| g.lumens()), Some(7));
        let all: Vec<u32> = entity.components_of::<Glowing>().map(|g| g.lumens()).collect();
        assert_eq!(all, vec![7, 40]);
        assert_eq!(entity.components_of::<AnyComponent>().count(), 3);
    }

    #[test]
    fn capability_query_mutable_access() {
        let mut entity = Entity::new("e");
        entity.add_component(Lamp::new(10));
        assert!(entity.get_component_mut::<Glowing>().is_some());
        entity.get_component_mut::<Lamp>().unwrap().lumens = 99;
        assert_eq!(entity.get_component::<Glowing>().unwrap().lumens(), 99);
    }

    #[test]
    fn remove_component_clears_owner_and_reindexes() {
        let mut entity = Entity::new("e");
        entity.add_component(Marker::new("m"));
        entity.add_component(Lamp::new(3));
        entity.add_component(Torch::new());

        let marker = entity.remove_component::<Marker>().unwrap();
        assert!(marker.meta().entity().is_none());
        assert_eq!(entity.component_count(), 2);
        assert_eq!(entity.get_component::<Lamp>().unwrap().lumens, 3);
        assert!(entity.get_component::<Torch>().is_some());
        assert!(entity.remove_component::<Marker>().is_none());

        // the kind can be attached again once removed
        assert!(entity.add_component(Marker::new("again")).is_some());
    }

    #[test]
    fn duplicate_assigns_new_identities() {
        let mut entity = Entity::new("Original");
        entity.add_component(Marker::new("m"));
        entity.add_component(Lamp::new(5));

        let copy = entity.duplicate();
        assert_ne!(copy.id(), entity.id());
        assert_eq!(copy.name(), "Original");
        assert!(!copy.is_destroyed());
        assert_eq!(copy.component_count(), 2);

        for (a, b) in entity.components().zip(copy.components()) {
            assert_eq!(a.meta().key(), b.meta().key());
            assert_ne!(a.meta().id(), b.meta().id());
            assert_eq!(b.meta().entity(), Some(copy.id()));
        }
    }

    #[test]
    fn component_name_joins_entity_and_kind() {
        let mut entity = Entity::new("Player");
        entity.add_component(Lamp::new(1));
        let key = entity.components().next().unwrap().meta().key();
        assert_eq!(entity.component_name(key), "Player->Lamp");
    }

    #[test]
    fn new_entity_is_an_empty_root() {
        let entity = Entity::new("");
        assert!(entity.parent().is_none());
        assert!(entity.children().is_empty());
        assert_eq!(entity.num_descendants(), 0);
        assert_eq!(entity.component_count(), 0);
        assert!(!entity.is_destroyed());
    }
}
