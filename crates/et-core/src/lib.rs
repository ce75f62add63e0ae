//! Core types for the Eternum engine: entities, components and the scene
//! that owns them.
//!
//! An [`Entity`] holds at most one [`Component`] per concrete kind and is
//! linked into a tree by the [`Scene`], which keeps both sides of every
//! parent/child link in step. Components are looked up by concrete type or
//! through a capability query ([`ComponentQuery`]).
//!
//! ```
//! use et_core::{Scene, Transform};
//!
//! let mut scene = Scene::new();
//! let root = scene.spawn("Root");
//! let child = scene.spawn_child(root, "Child").unwrap();
//! scene.get_mut(child).unwrap().add_component(Transform::new());
//!
//! assert!(scene.is_descended_from(child, Some(root)));
//! assert!(scene.get(child).unwrap().get_component::<Transform>().is_some());
//! ```

/// Component trait, identity metadata and lookup queries.
pub mod component;
/// Built-in components.
pub mod components;
/// Entities and their component sets.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Entity and component identifiers.
pub mod id;
/// The arena that owns entities and their hierarchy.
pub mod scene;
/// Fixed-size numeric vectors.
pub mod vector;

/// Re-export component types.
pub use component::{
    AnyComponent, Component, ComponentHandle, ComponentKey, ComponentMeta, ComponentQuery,
};
/// Re-export built-in components.
pub use components::{RigidBody, Transform};
/// Re-export the entity type.
pub use entity::Entity;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export identifiers.
pub use id::{ComponentId, EntityId};
/// Re-export the scene.
pub use scene::Scene;
/// Re-export vector types.
pub use vector::{Scalar, Vec2d, Vec2f, Vec2i, Vec3d, Vec3f, Vec3i, Vec4d, Vec4f, Vec4i, Vector};
