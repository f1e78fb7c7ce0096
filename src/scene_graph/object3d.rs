use id_arena::Id;

use crate::scene_graph::scene_model::SceneModelId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

#[derive(Debug, Clone)]
pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub model_id: Option<SceneModelId>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
    pub visible: bool,
    /// Whether the pointer can pick this object up and move it.
    pub draggable: bool,
}

impl Object3D {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            ..Default::default()
        }
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            model_id: None,
            parent_id: None,
            child_ids: Vec::new(),
            visible: true,
            draggable: false,
        }
    }
}
