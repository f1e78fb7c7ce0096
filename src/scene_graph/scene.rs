use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::math::Aabb;
use crate::model::Model;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{ModelKind, SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

#[derive(Default)]
pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    pub fn iter_objects(&self) -> impl Iterator<Item = (ObjectId, &Object3D)> {
        self.objects.iter()
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    pub fn get_model(&self, id: SceneModelId) -> Option<&SceneModel> {
        self.models.get(id)
    }

    pub fn get_model_mut(&mut self, id: SceneModelId) -> Option<&mut SceneModel> {
        self.models.get_mut(id)
    }

    /// Adds `model` and a root object that draws it.
    pub fn spawn_model(
        &mut self,
        name: impl Into<String>,
        model: Model,
        kind: ModelKind,
        transform: Transform,
    ) -> ObjectId {
        let model_id = self.add_model(SceneModel::new(model, kind));

        let mut object = Object3D::new(name, transform);
        object.model_id = Some(model_id);
        self.add_object(object)
    }

    /// Deep-copies an object and its descendants. Models are shared with the original.
    pub fn clone_object(&mut self, object_id: ObjectId) -> Option<ObjectId> {
        let parent_id = self.get_object(object_id)?.parent_id;
        let clone_id = self.clone_subtree(object_id)?;

        if let Some(parent_id) = parent_id {
            self.set_object_parent(clone_id, Some(parent_id));
        }

        Some(clone_id)
    }

    fn clone_subtree(&mut self, object_id: ObjectId) -> Option<ObjectId> {
        let original = self.get_object(object_id)?;
        let child_ids = original.child_ids.clone();

        let mut copy = original.clone();
        copy.parent_id = None;
        copy.child_ids.clear();
        copy.transform.invalidate_local();

        let copy_id = self.add_object(copy);

        for child_id in child_ids {
            if let Some(child_copy) = self.clone_subtree(child_id) {
                self.set_object_parent(child_copy, Some(copy_id));
            }
        }

        Some(copy_id)
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        let root_objects = self
            .iter_objects()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    /// Recursively updates an object's world transform and its children
    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.get_object(object_id) {
            let dirty = parent_changed || object.transform.is_world_dirty();
            if dirty {
                let local_matrix = *object.transform.get_local_matrix();
                object
                    .transform
                    .set_world_matrix(parent_world_matrix * local_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, dirty);
            }
        }
    }

    /// World matrix computed from the local transforms, independent of `late_update`.
    pub fn world_matrix(&self, object_id: ObjectId) -> Option<Mat4> {
        let object = self.get_object(object_id)?;
        let local = *object.transform.get_local_matrix();

        Some(match object.parent_id {
            Some(parent_id) => self.world_matrix(parent_id)? * local,
            None => local,
        })
    }

    /// World-space bounding box of an object's model.
    pub fn world_bounds(&self, object_id: ObjectId) -> Option<Aabb> {
        let object = self.get_object(object_id)?;
        let bounds = self.models.get(object.model_id?)?.bounds?;

        Some(bounds.transform(&self.world_matrix(object_id)?))
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|child| child.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Quat) {
        if let Some(object) = self.get_object_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.get_object(object_id).map(|object| &object.transform)
    }

    pub fn early_update(&mut self) {
        // TODO: fork or replace id-arena to support parallel iteration
        for (_, object) in self.objects.iter() {
            object.transform.reset_flags();
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}
