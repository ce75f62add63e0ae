use std::any::Any;

use log::{debug, info};

use crate::context::FrameContext;
use crate::error::RuntimeResult;
use crate::system::System;

/// Ordered collection of systems, deduplicated by name and concrete type.
///
/// Registration order is the dispatch order of every phase.
#[derive(Debug, Default)]
pub struct SystemRegistry {
    systems: Vec<Box<dyn System>>,
}

impl SystemRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system. Returns `false` and leaves the registry unchanged
    /// if a system with the same name or the same concrete type is already
    /// registered.
    pub fn register<S: System + 'static>(&mut self, system: S) -> bool {
        self.register_boxed(Box::new(system))
    }

    /// Append an already boxed system. Same rules as
    /// [`register`](Self::register).
    pub fn register_boxed(&mut self, system: Box<dyn System>) -> bool {
        let type_id = system.as_any().type_id();
        let clash = self
            .systems
            .iter()
            .find(|s| s.name() == system.name() || s.as_any().type_id() == type_id);
        if let Some(existing) = clash {
            debug!(
                "Skipping system {}: {} is already registered",
                system.name(),
                existing.name()
            );
            return false;
        }
        info!("Registering system: {}", system.name());
        self.systems.push(system);
        true
    }

    /// Registered systems in dispatch order.
    pub fn systems(&self) -> &[Box<dyn System>] {
        &self.systems
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Whether no systems are registered.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// System names in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Whether a system with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.systems.iter().any(|s| s.name() == name)
    }

    /// Access a system by downcasting to a concrete type.
    pub fn get<S: System + 'static>(&self) -> Option<&S> {
        self.systems
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<S>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_mut<S: System + 'static>(&mut self) -> Option<&mut S> {
        self.systems
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<S>())
    }

    /// Move the system at `index` out, leaving a placeholder.
    pub(crate) fn take(&mut self, index: usize) -> Box<dyn System> {
        std::mem::replace(&mut self.systems[index], Box::new(Vacant))
    }

    /// Put a system taken with [`take`](Self::take) back.
    pub(crate) fn restore(&mut self, index: usize, system: Box<dyn System>) {
        self.systems[index] = system;
    }

    pub(crate) fn view(&mut self) -> Systems<'_> {
        Systems {
            slots: &mut self.systems,
        }
    }
}

/// The other systems, as seen from inside a phase.
///
/// The system currently running is not visible to itself.
#[derive(Debug)]
pub struct Systems<'a> {
    slots: &'a mut [Box<dyn System>],
}

impl Systems<'_> {
    /// Access a system by downcasting to a concrete type.
    pub fn get<S: System + 'static>(&self) -> Option<&S> {
        self.slots
            .iter()
            .find_map(|s| s.as_any().downcast_ref::<S>())
    }

    /// Access a system mutably by downcasting to a concrete type.
    pub fn get_mut<S: System + 'static>(&mut self) -> Option<&mut S> {
        self.slots
            .iter_mut()
            .find_map(|s| s.as_any_mut().downcast_mut::<S>())
    }

    /// Names of the visible systems in dispatch order.
    pub fn names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|s| !s.as_any().is::<Vacant>())
            .map(|s| s.name())
            .collect()
    }
}

/// Placeholder occupying a system's slot while it runs.
#[derive(Debug)]
struct Vacant;

impl System for Vacant {
    fn name(&self) -> &str {
        "vacant"
    }
    fn init(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }
    fn shutdown(&mut self, _ctx: &mut FrameContext<'_>) -> RuntimeResult<()> {
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
