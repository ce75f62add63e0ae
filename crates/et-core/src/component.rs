use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::id::{ComponentId, EntityId};

/// Identifies a concrete component kind. Equality and hashing use the
/// Rust `TypeId`; the type name is kept for display only.
#[derive(Debug, Clone, Copy)]
pub struct ComponentKey {
    type_id: TypeId,
    type_name: &'static str,
}

impl ComponentKey {
    /// The key of component type `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Fully-qualified type name of the kind.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name with module paths stripped (`Transform`, not
    /// `et_core::components::Transform`).
    pub fn short_name(&self) -> String {
        short_type_name(self.type_name)
    }
}

impl PartialEq for ComponentKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentKey {}

impl Hash for ComponentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Strip module paths from every segment of a type name, keeping generic
/// structure: `a::Foo<b::Bar>` becomes `Foo<Bar>`.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment_start = 0;
    for (i, ch) in full.char_indices() {
        match ch {
            ':' => segment_start = i + 1,
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(&full[segment_start..i]);
                out.push(ch);
                segment_start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    out.push_str(&full[segment_start..]);
    out
}

/// Identity and ownership data every component carries.
///
/// Cloning a `ComponentMeta` yields a fresh [`ComponentId`] and no owning
/// entity, so `#[derive(Clone)]` on a component produces a correct,
/// unattached duplicate.
#[derive(Debug)]
pub struct ComponentMeta {
    key: ComponentKey,
    id: ComponentId,
    entity: Option<EntityId>,
}

impl ComponentMeta {
    /// Metadata for a new, unattached component of kind `T`.
    pub fn new<T: 'static>() -> Self {
        Self {
            key: ComponentKey::of::<T>(),
            id: ComponentId::next(),
            entity: None,
        }
    }

    /// The component's kind.
    pub fn key(&self) -> ComponentKey {
        self.key
    }

    /// The component's unique ID.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The entity this component is attached to, if any.
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// A handle to this component, if it is attached to an entity.
    pub fn handle(&self) -> Option<ComponentHandle> {
        self.entity.map(|entity| ComponentHandle {
            entity,
            component: self.id,
        })
    }

    pub(crate) fn set_entity(&mut self, entity: Option<EntityId>) {
        self.entity = entity;
    }
}

impl Clone for ComponentMeta {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            id: ComponentId::next(),
            entity: None,
        }
    }
}

/// Non-owning reference to a component attached somewhere in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    /// The owning entity.
    pub entity: EntityId,
    /// The component instance.
    pub component: ComponentId,
}

/// A unit of data or behaviour attached to exactly one entity.
///
/// Every hook defaults to a no-op. Implementors must also be `Clone`; the
/// blanket [`ComponentObject`] impl turns that into polymorphic cloning.
///
/// ```
/// use et_core::component::{Component, ComponentMeta, ComponentObject};
///
/// #[derive(Debug, Clone)]
/// struct Health {
///     meta: ComponentMeta,
///     hp: i32,
/// }
///
/// impl Component for Health {
///     fn meta(&self) -> &ComponentMeta {
///         &self.meta
///     }
///     fn meta_mut(&mut self) -> &mut ComponentMeta {
///         &mut self.meta
///     }
/// }
///
/// let health = Health { meta: ComponentMeta::new::<Health>(), hp: 10 };
/// let copy = health.clone_component();
/// assert_ne!(copy.meta().id(), health.meta().id());
/// ```
pub trait Component: ComponentObject + fmt::Debug + 'static {
    /// Identity and ownership data.
    fn meta(&self) -> &ComponentMeta;

    /// Mutable identity and ownership data.
    fn meta_mut(&mut self) -> &mut ComponentMeta;

    /// Called when the owning entity is initialized.
    fn on_init(&mut self) {}

    /// Called when the owning entity exits.
    fn on_exit(&mut self) {}

    /// Called after the owning entity was moved in the hierarchy.
    fn on_hierarchy_change(&mut self, _previous_parent: Option<EntityId>) {}

    /// Called after a child was attached to the owning entity.
    fn on_add_child(&mut self, _child: EntityId) {}

    /// Called before a child is detached from the owning entity.
    fn on_remove_child(&mut self, _child: EntityId) {}

    /// Human-readable description for inspection tools.
    fn inspect(&self) -> String {
        format!("{self:?}")
    }
}

/// Object-safe plumbing for components: cloning into a box and downcasting.
///
/// Implemented automatically for every `Component + Clone`.
pub trait ComponentObject {
    /// Clone into a new boxed component with a fresh identity and no owner.
    fn clone_component(&self) -> Box<dyn Component>;

    /// Upcast for downcasting to the concrete kind.
    fn as_any(&self) -> &dyn Any;

    /// Upcast for downcasting to the concrete kind.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Upcast an owned box for downcasting to the concrete kind.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Component + Clone> ComponentObject for T {
    fn clone_component(&self) -> Box<dyn Component> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// A lookup target for [`Entity::get_component`](crate::Entity::get_component).
///
/// Every concrete component type is a query for itself. Capability queries
/// name a target several kinds satisfy; they have no exact key and are
/// answered by the linear scan.
pub trait ComponentQuery: 'static {
    /// What a successful lookup yields.
    type Target: ?Sized + 'static;

    /// Key for the indexed fast path, if the query names one concrete kind.
    fn exact_key() -> Option<ComponentKey> {
        None
    }

    /// View `component` as the target, if it satisfies the query.
    fn cast<'a>(component: &'a (dyn Component + 'static)) -> Option<&'a Self::Target>;

    /// Mutable form of [`cast`](Self::cast).
    fn cast_mut<'a>(
        component: &'a mut (dyn Component + 'static),
    ) -> Option<&'a mut Self::Target>;
}

impl<T: Component> ComponentQuery for T {
    type Target = T;

    fn exact_key() -> Option<ComponentKey> {
        Some(ComponentKey::of::<T>())
    }

    fn cast<'a>(component: &'a (dyn Component + 'static)) -> Option<&'a T> {
        component.as_any().downcast_ref::<T>()
    }

    fn cast_mut<'a>(component: &'a mut (dyn Component + 'static)) -> Option<&'a mut T> {
        component.as_any_mut().downcast_mut::<T>()
    }
}

/// Capability query satisfied by every component.
#[derive(Debug, Clone, Copy)]
pub struct AnyComponent;

impl ComponentQuery for AnyComponent {
    type Target = dyn Component;

    fn cast<'a>(
        component: &'a (dyn Component + 'static),
    ) -> Option<&'a (dyn Component + 'static)> {
        Some(component)
    }

    fn cast_mut<'a>(
        component: &'a mut (dyn Component + 'static),
    ) -> Option<&'a mut (dyn Component + 'static)> {
        Some(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Probe {
        meta: ComponentMeta,
        value: u32,
    }

    impl Probe {
        fn new(value: u32) -> Self {
            Self {
                meta: ComponentMeta::new::<Self>(),
                value,
            }
        }
    }

    impl Component for Probe {
        fn meta(&self) -> &ComponentMeta {
            &self.meta
        }
        fn meta_mut(&mut self) -> &mut ComponentMeta {
            &mut self.meta
        }
    }

    #[test]
    fn component_ids_are_unique() {
        let a = Probe::new(1);
        let b = Probe::new(1);
        assert_ne!(a.meta().id(), b.meta().id());
    }

    #[test]
    fn key_matches_concrete_type() {
        let probe = Probe::new(0);
        assert_eq!(probe.meta().key(), ComponentKey::of::<Probe>());
        assert_ne!(probe.meta().key(), ComponentKey::of::<u32>());
        assert_eq!(probe.meta().key().short_name(), "Probe");
    }

    #[test]
    fn clone_component_gets_new_identity_and_no_owner() {
        let mut original = Probe::new(5);
        original.meta_mut().set_entity(Some(EntityId::next()));

        let copy = original.clone_component();
        assert_ne!(copy.meta().id(), original.meta().id());
        assert_eq!(copy.meta().key(), original.meta().key());
        assert!(copy.meta().entity().is_none());

        let copy = copy.as_any().downcast_ref::<Probe>().unwrap();
        assert_eq!(copy.value, 5);
    }

    #[test]
    fn handle_requires_an_owner() {
        let mut probe = Probe::new(0);
        assert!(probe.meta().handle().is_none());
        let owner = EntityId::next();
        probe.meta_mut().set_entity(Some(owner));
        let handle = probe.meta().handle().unwrap();
        assert_eq!(handle.entity, owner);
        assert_eq!(handle.component, probe.meta().id());
    }

    #[test]
    fn queries_cast_by_kind() {
        let probe = Probe::new(3);
        let as_dyn: &dyn Component = &probe;
        assert_eq!(Probe::cast(as_dyn).map(|p| p.value), Some(3));
        assert!(AnyComponent::cast(as_dyn).is_some());
        assert!(AnyComponent::exact_key().is_none());
    }

    #[test]
    fn short_type_name_strips_paths() {
        assert_eq!(short_type_name("a::b::Transform"), "Transform");
        assert_eq!(
            short_type_name("et_runtime::ComponentSystem<et_core::components::Transform>"),
            "ComponentSystem<Transform>"
        );
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn default_inspect_uses_debug() {
        let probe = Probe::new(42);
        assert!(probe.inspect().contains("42"));
    }
}
