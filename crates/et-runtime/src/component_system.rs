use std::any::Any;
use std::marker::PhantomData;

use et_core::{Component, ComponentHandle, ComponentKey, Scene};
use log::{info, warn};

use crate::context::FrameContext;
use crate::error::RuntimeResult;
use crate::system::System;

/// A system tracking every live component of kind `T`.
///
/// Holds non-owning [`ComponentHandle`]s in the order they were added.
/// Handles are added and removed explicitly, or rebuilt from a scene with
/// [`sync_from_scene`](Self::sync_from_scene). Handles whose component has
/// gone away are pruned on every update.
#[derive(Debug)]
pub struct ComponentSystem<T: Component> {
    name: String,
    handles: Vec<ComponentHandle>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentSystem<T> {
    /// An empty system named `ComponentSystem<Kind>`.
    pub fn new() -> Self {
        Self {
            name: format!("ComponentSystem<{}>", ComponentKey::of::<T>()),
            handles: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Start tracking a component. Returns `false` if it is already tracked.
    pub fn add_component(&mut self, handle: ComponentHandle) -> bool {
        if self.handles.contains(&handle) {
            return false;
        }
        self.handles.push(handle);
        true
    }

    /// Stop tracking a component. Returns `false` and logs a warning if it
    /// was not tracked.
    pub fn remove_component(&mut self, handle: ComponentHandle) -> bool {
        match self.handles.iter().position(|h| *h == handle) {
            Some(pos) => {
                self.handles.remove(pos);
                true
            }
            None => {
                warn!(
                    "{}: component {} of entity {} is not tracked",
                    self.name, handle.component, handle.entity
                );
                false
            }
        }
    }

    /// Tracked components in the order they were added.
    pub fn components(&self) -> &[ComponentHandle] {
        &self.handles
    }

    /// Number of tracked components.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Replace the tracked set with every `T` attached to a live entity in
    /// `scene`, in depth-first order from the roots.
    pub fn sync_from_scene(&mut self, scene: &Scene) {
        self.handles = scene
            .roots()
            .iter()
            .flat_map(|root| scene.walk(*root))
            .filter_map(|id| scene.get(id))
            .filter(|entity| !entity.is_destroyed())
            .filter_map(|entity| entity.get_component::<T>())
            .filter_map(|component| component.meta().handle())
            .collect();
    }

    /// Drop handles whose component is no longer in `scene`.
    pub fn prune(&mut self, scene: &Scene) -> usize {
        let before = self.handles.len();
        self.handles
            .retain(|handle| scene.component::<T>(*handle).is_some());
        before - self.handles.len()
    }

    /// Visit every tracked component mutably. Returns how many were
    /// visited.
    pub fn for_each_mut(&self, scene: &mut Scene, mut f: impl FnMut(&mut T)) -> usize {
        let mut visited = 0;
        for handle in &self.handles {
            if let Some(component) = scene.component_mut::<T>(*handle) {
                f(component);
                visited += 1;
            }
        }
        visited
    }
}

impl<T: Component> Default for ComponentSystem<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> System for ComponentSystem<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        self.sync_from_scene(ctx.scene);
        info!(
            "Initializing system: {} ({} components)",
            self.name,
            self.handles.len()
        );
        Ok(())
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>, _dt: f64) -> RuntimeResult<()> {
        self.prune(ctx.scene);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
