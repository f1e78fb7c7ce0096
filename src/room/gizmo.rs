//! Rotation gizmo limited to the Y axis, drawn as a ring around the attached object.

use glam::{Quat, Vec2};

use crate::{
    camera::Camera,
    scene_graph::{ObjectId, Scene},
};

/// Ring radius on screen, in pixels.
pub const RING_RADIUS: f32 = 80.0;
/// How far from the ring a press still grabs it.
const RING_TOLERANCE: f32 = 12.0;
/// Radians per pixel of horizontal pointer movement.
const ROTATE_SPEED: f32 = 0.01;

const RING_COLOR: [f32; 4] = [0.2, 0.9, 0.2, 1.0];
const RING_ACTIVE_COLOR: [f32; 4] = [1.0, 1.0, 0.2, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rotating {
    pointer_x: f32,
    rotation: Quat,
}

#[derive(Debug, Default)]
pub struct RotationGizmo {
    enabled: bool,
    attached: Option<ObjectId>,
    rotating: Option<Rotating>,
}

pub fn hits_ring(center: Vec2, cursor: Vec2) -> bool {
    (cursor.distance(center) - RING_RADIUS).abs() <= RING_TOLERANCE
}

impl RotationGizmo {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn attach(&mut self, object: ObjectId) {
        self.attached = Some(object);
    }

    /// Hides the gizmo until it is enabled again.
    pub fn detach(&mut self) {
        self.enabled = false;
        self.attached = None;
        self.rotating = None;
    }

    pub fn attached(&self) -> Option<ObjectId> {
        self.attached
    }

    /// Shown and attached to something.
    pub fn is_active(&self) -> bool {
        self.enabled && self.attached.is_some()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating.is_some()
    }

    /// Screen position of the ring center.
    pub fn center(&self, scene: &Scene, camera: &Camera, resolution: Vec2) -> Option<Vec2> {
        let object = self.attached?;
        let position = scene.get_object_transform(object)?.translation();
        Some(camera.project_to_screen(position, resolution))
    }

    /// Starts rotating when the press lands on the ring.
    pub fn press(&mut self, scene: &Scene, center: Vec2, cursor: Vec2) -> bool {
        if !self.is_active() || !hits_ring(center, cursor) {
            return false;
        }

        let Some(transform) = self.attached.and_then(|id| scene.get_object_transform(id)) else {
            return false;
        };

        self.rotating = Some(Rotating {
            pointer_x: cursor.x,
            rotation: transform.rotation(),
        });
        true
    }

    pub fn drag(&mut self, scene: &mut Scene, cursor: Vec2) {
        let (Some(rotating), Some(object)) = (self.rotating, self.attached) else {
            return;
        };

        let angle = (cursor.x - rotating.pointer_x) * ROTATE_SPEED;
        scene.set_object_rotation(object, Quat::from_rotation_y(angle) * rotating.rotation);
    }

    pub fn release(&mut self) {
        self.rotating = None;
    }

    pub fn draw(&self, ui: &imgui::Ui, center: Vec2) {
        if !self.is_active() {
            return;
        }

        let color = if self.is_rotating() {
            RING_ACTIVE_COLOR
        } else {
            RING_COLOR
        };

        ui.get_background_draw_list()
            .add_circle(center.to_array(), RING_RADIUS, color)
            .num_segments(64)
            .thickness(3.0)
            .build();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::Vec3;

    use super::*;
    use crate::{
        model::{Material, Model},
        scene_graph::{ModelKind, Transform},
    };

    fn scene_with_chair() -> (Scene, ObjectId) {
        let mut scene = Scene::new();
        let chair = scene.spawn_model(
            "chair",
            Model::cuboid("chair", Vec3::ONE, 1.0, Material::default()),
            ModelKind::Mesh,
            Transform::default(),
        );
        (scene, chair)
    }

    #[test]
    fn ring_hit_band() {
        let center = Vec2::new(100.0, 100.0);

        assert!(hits_ring(center, center + Vec2::new(RING_RADIUS, 0.0)));
        assert!(hits_ring(center, center + Vec2::new(0.0, RING_RADIUS + 10.0)));
        assert!(!hits_ring(center, center));
        assert!(!hits_ring(center, center + Vec2::new(RING_RADIUS * 2.0, 0.0)));
    }

    #[test]
    fn rotates_around_y_only() {
        let (mut scene, chair) = scene_with_chair();
        let mut gizmo = RotationGizmo::default();
        gizmo.attach(chair);
        gizmo.enable();

        let center = Vec2::new(400.0, 300.0);
        let start = center + Vec2::new(RING_RADIUS, 0.0);
        assert!(gizmo.press(&scene, center, start));

        gizmo.drag(&mut scene, start + Vec2::new(FRAC_PI_2 / ROTATE_SPEED, 40.0));

        let rotation = scene.get_object_transform(chair).unwrap().rotation();
        assert!(rotation.angle_between(Quat::from_rotation_y(FRAC_PI_2)) < 1e-4);
    }

    #[test]
    fn disabled_gizmo_ignores_presses() {
        let (scene, chair) = scene_with_chair();
        let mut gizmo = RotationGizmo::default();
        gizmo.attach(chair);

        let center = Vec2::ZERO;
        assert!(!gizmo.press(&scene, center, Vec2::new(RING_RADIUS, 0.0)));
        assert!(!gizmo.is_rotating());
    }

    #[test]
    fn detach_hides_gizmo() {
        let (_scene, chair) = scene_with_chair();
        let mut gizmo = RotationGizmo::default();
        gizmo.attach(chair);
        gizmo.enable();
        assert!(gizmo.is_active());

        gizmo.detach();

        assert!(!gizmo.is_active());
        assert_eq!(gizmo.attached(), None);
    }
}
