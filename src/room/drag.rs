//! Picking and dragging furniture along a horizontal plane.

use glam::Vec3;

use crate::{
    math::{Plane, Ray},
    scene_graph::{ObjectId, Scene},
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Grab {
    object: ObjectId,
    plane: Plane,
    /// Object position minus the grab point, kept while dragging.
    shift: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Grabbed(ObjectId),
    /// Nothing draggable under the cursor.
    Missed,
    /// Already dragging something.
    Ignored,
}

#[derive(Debug, Default)]
pub struct DragController {
    grab: Option<Grab>,
    selected: Option<ObjectId>,
}

/// Nearest draggable object hit by `ray`, with the hit point.
pub fn pick(scene: &Scene, ray: &Ray) -> Option<(ObjectId, Vec3)> {
    scene
        .iter_objects()
        .filter(|(_, object)| object.draggable && object.visible)
        .filter_map(|(id, _)| {
            let bounds = scene.world_bounds(id)?;
            ray.distance_to_aabb(&bounds).map(|t| (id, t))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, t)| (id, ray.at(t)))
}

impl DragController {
    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    pub fn dragged(&self) -> Option<ObjectId> {
        self.grab.map(|grab| grab.object)
    }

    /// The last object that was grabbed. Stays set after release.
    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    pub fn press(&mut self, scene: &Scene, ray: &Ray) -> Press {
        if self.grab.is_some() {
            return Press::Ignored;
        }

        let Some((object, hit)) = pick(scene, ray) else {
            return Press::Missed;
        };
        let Some(transform) = scene.get_object_transform(object) else {
            return Press::Missed;
        };

        self.grab = Some(Grab {
            object,
            plane: Plane::horizontal_through(hit),
            shift: transform.translation() - hit,
        });
        self.selected = Some(object);

        Press::Grabbed(object)
    }

    /// Moves the grabbed object under the cursor. Returns the object and its new position.
    pub fn drag(&mut self, scene: &mut Scene, ray: &Ray) -> Option<(ObjectId, Vec3)> {
        let grab = self.grab?;
        let position = ray.intersect_plane(&grab.plane)? + grab.shift;

        scene.set_object_translation(grab.object, position);

        Some((grab.object, position))
    }

    pub fn release(&mut self) {
        self.grab = None;
    }
}
