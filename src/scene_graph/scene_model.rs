use id_arena::Id;

use crate::{
    math::Aabb,
    model::{Model, Vertex},
    rendering::render_model::RenderModelId,
};

pub type SceneModelId = Id<SceneModel>;

/// Selects the pipeline a model is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Earth,
    Atmosphere,
    Mesh,
}

pub struct SceneModel {
    pub name: String,
    pub model: Model,
    pub kind: ModelKind,
    pub bounds: Option<Aabb>,
    pub render_model: Option<RenderModelId>,
    /// Vertex data changed but the layout did not, so the GPU buffers can be rewritten.
    pub vertices_dirty: bool,
    /// The model was replaced and its GPU copy has to be created again.
    pub needs_rebuild: bool,
}

impl SceneModel {
    pub fn new(model: Model, kind: ModelKind) -> Self {
        Self {
            name: model.name.clone(),
            bounds: model.bounding_box(),
            model,
            kind,
            render_model: None,
            vertices_dirty: false,
            needs_rebuild: false,
        }
    }

    pub fn replace_model(&mut self, model: Model) {
        self.bounds = model.bounding_box();
        self.name = model.name.clone();
        self.model = model;
        self.needs_rebuild = true;
    }

    /// Replaces the vertices of one primitive, keeping its indices and material.
    pub fn update_vertices(&mut self, primitive: usize, vertices: Vec<Vertex>) {
        let Some(target) = self.model.primitives.get_mut(primitive) else {
            log::warn!("{} has no primitive {}", self.name, primitive);
            return;
        };

        if target.vertices.len() != vertices.len() {
            self.needs_rebuild = true;
        }

        target.vertices = vertices;
        self.bounds = self.model.bounding_box();
        self.vertices_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::model::Material;

    fn cube() -> SceneModel {
        SceneModel::new(
            Model::cuboid("cube", Vec3::ONE, 1.0, Material::default()),
            ModelKind::Mesh,
        )
    }

    #[test]
    fn same_sized_vertex_update_only_marks_vertices() {
        let mut scene_model = cube();
        let mut vertices = scene_model.model.primitives[0].vertices.clone();
        for vertex in &mut vertices {
            vertex.position *= 2.0;
        }

        scene_model.update_vertices(0, vertices);

        assert!(scene_model.vertices_dirty);
        assert!(!scene_model.needs_rebuild);
        let bounds = scene_model.bounds.unwrap();
        assert!((bounds.size() - Vec3::splat(2.0)).length() < 1e-5);
    }

    #[test]
    fn resized_vertex_update_needs_rebuild() {
        let mut scene_model = cube();
        let mut vertices = scene_model.model.primitives[0].vertices.clone();
        vertices.pop();

        scene_model.update_vertices(0, vertices);

        assert!(scene_model.needs_rebuild);
    }

    #[test]
    fn replacing_model_needs_rebuild() {
        let mut scene_model = cube();
        scene_model.replace_model(Model::new("empty"));

        assert!(scene_model.needs_rebuild);
        assert_eq!(scene_model.name, "empty");
        assert!(scene_model.bounds.is_none());
    }
}
