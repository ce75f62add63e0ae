use crate::component::{Component, ComponentMeta};
use crate::vector::Vec3f;

/// Position, rotation (Euler angles, radians) and scale of an entity.
#[derive(Debug, Clone)]
pub struct Transform {
    meta: ComponentMeta,
    /// World-space position.
    pub position: Vec3f,
    /// Rotation around the x, y and z axes.
    pub rotation: Vec3f,
    /// Per-axis scale.
    pub scale: Vec3f,
}

impl Transform {
    /// Identity transform at the origin.
    pub fn new() -> Self {
        Self {
            meta: ComponentMeta::new::<Self>(),
            position: Vec3f::zero(),
            rotation: Vec3f::zero(),
            scale: Vec3f::splat(1.0),
        }
    }

    /// Identity transform at `position`.
    pub fn at(position: Vec3f) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Move by `offset`.
    pub fn translate(&mut self, offset: Vec3f) {
        self.position += offset;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Transform {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ComponentMeta {
        &mut self.meta
    }

    fn inspect(&self) -> String {
        format!(
            "Transform position={} rotation={} scale={}",
            self.position, self.rotation, self.scale
        )
    }
}

/// Linear velocity and mass.
#[derive(Debug, Clone)]
pub struct RigidBody {
    meta: ComponentMeta,
    /// Velocity in units per second.
    pub velocity: Vec3f,
    /// Mass; non-positive means immovable.
    pub mass: f32,
}

impl RigidBody {
    /// A body at rest with the given mass.
    pub fn new(mass: f32) -> Self {
        Self {
            meta: ComponentMeta::new::<Self>(),
            velocity: Vec3f::zero(),
            mass,
        }
    }

    /// Change velocity by `impulse / mass`. Immovable bodies ignore it.
    pub fn apply_impulse(&mut self, impulse: Vec3f) {
        if self.mass > 0.0 {
            self.velocity += impulse / self.mass;
        }
    }

    /// Displacement over `dt` seconds at the current velocity.
    pub fn displacement(&self, dt: f64) -> Vec3f {
        self.velocity * dt as f32
    }
}

impl Component for RigidBody {
    fn meta(&self) -> &ComponentMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ComponentMeta {
        &mut self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;

    #[test]
    fn transform_defaults_to_identity() {
        let t = Transform::new();
        assert_eq!(t.position, Vec3f::zero());
        assert_eq!(t.scale, Vec3f::new([1.0, 1.0, 1.0]));
    }

    #[test]
    fn translate_moves_position() {
        let mut t = Transform::at(Vec3f::new([1.0, 0.0, 0.0]));
        t.translate(Vec3f::new([0.0, 2.0, 0.0]));
        assert_eq!(t.position, Vec3f::new([1.0, 2.0, 0.0]));
    }

    #[test]
    fn impulse_respects_mass() {
        let mut body = RigidBody::new(2.0);
        body.apply_impulse(Vec3f::new([4.0, 0.0, 0.0]));
        assert_eq!(body.velocity, Vec3f::new([2.0, 0.0, 0.0]));

        let mut wall = RigidBody::new(0.0);
        wall.apply_impulse(Vec3f::new([4.0, 0.0, 0.0]));
        assert_eq!(wall.velocity, Vec3f::zero());
    }

    #[test]
    fn built_ins_attach_side_by_side() {
        let mut entity = Entity::new("ship");
        assert!(entity.add_component(Transform::new()).is_some());
        assert!(entity.add_component(RigidBody::new(1.0)).is_some());
        assert!(entity.add_component(Transform::new()).is_none());
        assert_eq!(entity.component_count(), 2);
        assert!(entity.get_component::<Transform>().unwrap().inspect().contains("Vector3"));
    }
}
