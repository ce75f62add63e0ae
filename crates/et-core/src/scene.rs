use std::collections::HashMap;

use log::warn;

use crate::component::{Component, ComponentHandle};
use crate::entity::Entity;
use crate::error::{CoreError, CoreResult};
use crate::id::EntityId;

/// Arena that owns every entity and keeps parent/child links symmetric.
///
/// All hierarchy mutation goes through the scene so that a child's parent
/// link, the parent's child list and every ancestor's descendant count
/// change together. Cascading operations (init, exit, destroy, despawn,
/// clone) visit subtrees in pre-order.
#[derive(Debug, Default)]
pub struct Scene {
    entities: HashMap<EntityId, Entity>,
    roots: Vec<EntityId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities, tombstoned ones included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether `id` names an entity in this scene.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Top-level entities in insertion order.
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Get an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get a mutable entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// All entities, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    /// Create an empty root entity.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        self.insert(Entity::new(name))
    }

    /// Move a standalone entity into the scene as a root.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.roots.push(id);
        self.entities.insert(id, entity);
        id
    }

    /// Create an empty entity under `parent`.
    pub fn spawn_child(&mut self, parent: EntityId, name: impl Into<String>) -> CoreResult<EntityId> {
        if !self.contains(parent) {
            return Err(CoreError::EntityNotFound(parent));
        }
        let child = self.spawn(name);
        self.set_parent(child, Some(parent))?;
        Ok(child)
    }

    // -----------------------------------------------------------------------
    // Hierarchy
    // -----------------------------------------------------------------------

    /// Move `child` under `parent`, or make it a root when `parent` is
    /// `None`.
    ///
    /// Both sides are updated together. The old parent's components see
    /// `on_remove_child`, the new parent's see `on_add_child`, and the
    /// child's own components see `on_hierarchy_change` with the previous
    /// parent. Reparenting under the current parent does nothing.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> CoreResult<()> {
        let previous = self
            .entities
            .get(&child)
            .ok_or(CoreError::EntityNotFound(child))?
            .parent();
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(CoreError::EntityNotFound(parent));
            }
            if parent == child || self.is_descended_from(parent, Some(child)) {
                return Err(CoreError::HierarchyCycle { child, parent });
            }
        }
        if previous == parent {
            return Ok(());
        }

        self.detach(child);
        self.attach(child, parent);
        if let Some(entity) = self.entities.get_mut(&child) {
            entity.notify_hierarchy_change(previous);
        }
        Ok(())
    }

    /// Attach `child` under `parent`. Shorthand for
    /// [`set_parent`](Self::set_parent).
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> CoreResult<()> {
        self.set_parent(child, Some(parent))
    }

    /// Detach `child` from `parent`, making it a root. Returns `false` and
    /// logs a warning if `child` is not a direct child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> bool {
        let attached = self
            .entities
            .get(&child)
            .is_some_and(|entity| entity.parent() == Some(parent));
        if !attached {
            warn!("cannot remove {child} from {parent}: not a child of that entity");
            return false;
        }
        self.set_parent(child, None).is_ok()
    }

    /// Whether `ancestor` appears in the parent chain of `id`. False for
    /// `None` and for the entity itself.
    pub fn is_descended_from(&self, id: EntityId, ancestor: Option<EntityId>) -> bool {
        let Some(ancestor) = ancestor else {
            return false;
        };
        let mut current = self.entities.get(&id).and_then(Entity::parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.entities.get(&parent).and_then(Entity::parent);
        }
        false
    }

    /// Unlink `child` from its parent (or the root list) and subtract its
    /// subtree from every ancestor's descendant count.
    fn detach(&mut self, child: EntityId) {
        let Some(entity) = self.entities.get_mut(&child) else {
            return;
        };
        let size = entity.num_descendants() + 1;
        let parent = entity.parent();
        entity.set_parent_link(None);

        match parent {
            Some(parent) => {
                if let Some(p) = self.entities.get_mut(&parent) {
                    p.notify_remove_child(child);
                    p.unlink_child(child);
                }
                let mut current = Some(parent);
                while let Some(id) = current {
                    current = match self.entities.get_mut(&id) {
                        Some(ancestor) => {
                            ancestor.sub_descendants(size);
                            ancestor.parent()
                        }
                        None => None,
                    };
                }
            }
            None => self.roots.retain(|root| *root != child),
        }
    }

    /// Link a detached `child` under `parent` (or into the root list) and
    /// add its subtree to every ancestor's descendant count.
    fn attach(&mut self, child: EntityId, parent: Option<EntityId>) {
        let Some(entity) = self.entities.get_mut(&child) else {
            return;
        };
        let size = entity.num_descendants() + 1;
        entity.set_parent_link(parent);

        match parent {
            Some(parent) => {
                let mut current = Some(parent);
                while let Some(id) = current {
                    current = match self.entities.get_mut(&id) {
                        Some(ancestor) => {
                            ancestor.add_descendants(size);
                            ancestor.parent()
                        }
                        None => None,
                    };
                }
                if let Some(p) = self.entities.get_mut(&parent) {
                    p.push_child(child);
                    p.notify_add_child(child);
                }
            }
            None => self.roots.push(child),
        }
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// `id` and everything below it, in pre-order. Empty for unknown IDs.
    pub fn walk(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(entity) = self.entities.get(&current) {
                stack.extend(entity.children().iter().rev());
            }
        }
        out
    }

    /// Everything below `id`, in pre-order.
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut all = self.walk(id);
        if !all.is_empty() {
            all.remove(0);
        }
        all
    }

    /// First entity named `name`, searching roots in order, depth first.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.roots
            .iter()
            .flat_map(|root| self.walk(*root))
            .find(|id| self.entities.get(id).is_some_and(|e| e.name() == name))
    }

    /// Resolve a component handle to a component of kind `C`.
    pub fn component<C: Component>(&self, handle: ComponentHandle) -> Option<&C> {
        self.entities
            .get(&handle.entity)?
            .get_component::<C>()
            .filter(|c| c.meta().id() == handle.component)
    }

    /// Mutable form of [`component`](Self::component).
    pub fn component_mut<C: Component>(&mut self, handle: ComponentHandle) -> Option<&mut C> {
        self.entities
            .get_mut(&handle.entity)?
            .get_component_mut::<C>()
            .filter(|c| c.meta().id() == handle.component)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Run `on_init` on every component of `id` and its subtree.
    pub fn init(&mut self, id: EntityId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::EntityNotFound(id));
        }
        for current in self.walk(id) {
            if let Some(entity) = self.entities.get_mut(&current) {
                entity.init_components();
            }
        }
        Ok(())
    }

    /// Initialize every root subtree.
    pub fn init_all(&mut self) {
        for root in self.roots.clone() {
            for current in self.walk(root) {
                if let Some(entity) = self.entities.get_mut(&current) {
                    entity.init_components();
                }
            }
        }
    }

    /// Run `on_exit` on every component of `id` and its subtree, then
    /// detach `id` from its parent. The subtree stays intact.
    pub fn exit(&mut self, id: EntityId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::EntityNotFound(id));
        }
        for current in self.walk(id) {
            if let Some(entity) = self.entities.get_mut(&current) {
                entity.exit_components();
            }
        }
        let parent = self.entities.get(&id).and_then(Entity::parent);
        if let Some(parent) = parent {
            self.remove_child(parent, id);
        }
        Ok(())
    }

    /// Mark `id` and every descendant destroyed. Nothing is freed until
    /// [`despawn`](Self::despawn) or [`purge_destroyed`](Self::purge_destroyed).
    pub fn destroy(&mut self, id: EntityId) -> CoreResult<()> {
        if !self.contains(id) {
            return Err(CoreError::EntityNotFound(id));
        }
        for current in self.walk(id) {
            if let Some(entity) = self.entities.get_mut(&current) {
                entity.mark_destroyed();
            }
        }
        Ok(())
    }

    /// Remove `id` and its whole subtree from the scene, dropping every
    /// component. Returns the number of entities removed.
    pub fn despawn(&mut self, id: EntityId) -> CoreResult<usize> {
        if !self.contains(id) {
            return Err(CoreError::EntityNotFound(id));
        }
        self.detach(id);
        let subtree = self.walk(id);
        for current in &subtree {
            self.entities.remove(current);
        }
        Ok(subtree.len())
    }

    /// Despawn every tombstoned subtree. Returns the number of entities
    /// removed.
    pub fn purge_destroyed(&mut self) -> usize {
        let tops: Vec<EntityId> = self
            .entities
            .values()
            .filter(|e| {
                e.is_destroyed()
                    && !e
                        .parent()
                        .and_then(|p| self.entities.get(&p))
                        .is_some_and(Entity::is_destroyed)
            })
            .map(Entity::id)
            .collect();
        tops.into_iter()
            .filter_map(|id| self.despawn(id).ok())
            .sum()
    }

    /// Deep-copy `id`: name, components and the whole subtree, all with
    /// fresh identities. The copy is a live root.
    pub fn clone_entity(&mut self, id: EntityId) -> CoreResult<EntityId> {
        self.clone_subtree(id, None)
    }

    fn clone_subtree(&mut self, source: EntityId, parent: Option<EntityId>) -> CoreResult<EntityId> {
        let original = self
            .entities
            .get(&source)
            .ok_or(CoreError::EntityNotFound(source))?;
        let copy = original.duplicate();
        let children = original.children().to_vec();

        let copy_id = self.insert(copy);
        if parent.is_some() {
            self.set_parent(copy_id, parent)?;
        }
        for child in children {
            self.clone_subtree(child, Some(copy_id))?;
        }
        Ok(copy_id)
    }
}
