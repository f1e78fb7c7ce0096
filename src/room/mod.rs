//! Furniture placement scene: drag, rotate and clone objects in a textured room.

pub mod catalog;
pub mod drag;
pub mod environment;
pub mod gizmo;
pub mod orbit;

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::Arc,
};

use glam::{Vec2, Vec3};
use imgui::Condition;
use rand::Rng;

use crate::{
    asset_loader::AssetLoader,
    camera::Camera,
    color::Color,
    config::RoomOptions,
    input::{InputEvent, Key, MouseButton},
    model::{ImageData, Material, Model},
    obj,
    rendering::{common::Background, lighting::{Lighting, PointLight}},
    scene_graph::{ModelKind, ObjectId, Scene, SceneModelId, Transform},
};

use self::{
    catalog::CATALOG,
    drag::{DragController, Press},
    environment::{Environment, FloorTexture},
    gizmo::RotationGizmo,
    orbit::OrbitController,
};

const CAMERA_EYE: Vec3 = Vec3::new(20.0, 30.0, 50.0);

const FLOOR_SIZE: Vec3 = Vec3::new(59.0, 2.0, 60.0);
const FLOOR_POSITION: Vec3 = Vec3::new(1.1, -1.0, 3.0);
const FLOOR_TEXTURE_REPEAT: f32 = 4.0;

const LIGHT_CUBE_SPREAD: f32 = 4.0;
const CLONE_OFFSET: Vec3 = Vec3::new(10.0, 0.0, 0.0);

const HELP_TEXT: &str = "Drag with the mouse to move furniture or orbit the camera\n\
R to rotate the selected object\n\
C to clone the selected object\n\
Space to switch between night and day";

fn floor_model(texture: Option<Arc<ImageData>>) -> Model {
    Model::cuboid(
        "Floor",
        FLOOR_SIZE,
        FLOOR_TEXTURE_REPEAT,
        Material {
            name: "Floor".to_string(),
            texture,
            unlit: true,
            ..Default::default()
        },
    )
}

pub struct RoomEditor {
    asset_dir: PathBuf,
    camera: Camera,
    orbit: OrbitController,
    scene: Scene,
    drag: DragController,
    gizmo: RotationGizmo,
    environment: Environment,
    background: Background,

    models: AssetLoader<Model>,
    floor_textures: AssetLoader<ImageData>,
    loaded_floors: HashMap<FloorTexture, Arc<ImageData>>,
    requested_floors: HashSet<FloorTexture>,
    floor_model: Option<SceneModelId>,
    light_cube: Option<ObjectId>,

    cursor: Vec2,
    resolution: Vec2,
    show_help: bool,
}

impl RoomEditor {
    pub fn new(options: RoomOptions) -> anyhow::Result<Self> {
        let mut camera = Camera::perspective(60.0, 1.0, 1000.0);
        let orbit = OrbitController::looking_at(CAMERA_EYE, Vec3::ZERO);
        orbit.apply(&mut camera);

        let environment = Environment::default();
        let background = environment.background(&options.asset_dir);

        let mut room = Self {
            asset_dir: options.asset_dir,
            camera,
            orbit,
            scene: Scene::new(),
            drag: DragController::default(),
            gizmo: RotationGizmo::default(),
            environment,
            background,
            models: AssetLoader::new(),
            floor_textures: AssetLoader::new(),
            loaded_floors: HashMap::new(),
            requested_floors: HashSet::new(),
            floor_model: None,
            light_cube: None,
            cursor: Vec2::ZERO,
            resolution: Vec2::ONE,
            show_help: true,
        };

        room.spawn_light_cube();
        room.rebuild_floor();
        room.load_furniture();

        Ok(room)
    }

    fn spawn_light_cube(&mut self) {
        let mut rng = rand::thread_rng();
        let color = Color::from_hex(rng.gen_range(0..=0xffffff));
        let position = Vec3::new(
            rng.gen_range(-LIGHT_CUBE_SPREAD..LIGHT_CUBE_SPREAD),
            0.0,
            rng.gen_range(-LIGHT_CUBE_SPREAD..LIGHT_CUBE_SPREAD),
        );

        let cube = self.scene.spawn_model(
            "Light cube",
            Model::cuboid(
                "Light cube",
                Vec3::ONE,
                1.0,
                Material {
                    name: "Light cube".to_string(),
                    base_color: color,
                    unlit: true,
                    ..Default::default()
                },
            ),
            ModelKind::Mesh,
            Transform::from_translation(position),
        );

        if let Some(object) = self.scene.get_object_mut(cube) {
            object.draggable = true;
        }

        self.environment.cube_light = Some(PointLight {
            position,
            color: Color::WHITE,
            intensity: 1.0,
            range: 100.0,
        });
        self.light_cube = Some(cube);
    }

    fn load_furniture(&mut self) {
        for asset in &CATALOG {
            let obj_path = asset.obj_path(&self.asset_dir);
            let mtl_path = asset.mtl_path(&self.asset_dir);
            let texture_path = asset.texture_path(&self.asset_dir);
            let name = asset.name;

            self.models.load(name, move || {
                let texture = texture_path
                    .map(ImageData::load)
                    .transpose()?
                    .map(Arc::new);
                obj::load_model(name, &obj_path, Some(mtl_path.as_path()), texture)
            });
        }
    }

    fn insert_loaded_models(&mut self) {
        for (name, model) in self.models.drain() {
            let Some(asset) = catalog::find(&name) else {
                log::warn!("{} is not in the catalog", name);
                continue;
            };

            let object = self
                .scene
                .spawn_model(name, model, ModelKind::Mesh, asset.transform());
            if let Some(object) = self.scene.get_object_mut(object) {
                object.draggable = asset.draggable;
            }

            if let Some(light) = asset.point_light() {
                self.environment.fixed_lights.push(light);
            }
        }
    }

    pub fn floor(&self) -> FloorTexture {
        self.environment.floor
    }

    pub fn set_floor(&mut self, floor: FloorTexture) {
        if floor == self.environment.floor {
            return;
        }

        self.environment.floor = floor;
        self.rebuild_floor();
    }

    /// Replaces the floor mesh with one using the current texture, loading it if needed.
    fn rebuild_floor(&mut self) {
        let floor = self.environment.floor;
        let texture = self.loaded_floors.get(&floor).cloned();

        if texture.is_none() && self.requested_floors.insert(floor) {
            let path = floor.path(&self.asset_dir);
            self.floor_textures
                .load(floor.name(), move || ImageData::load(&path));
        }

        let model = floor_model(texture);

        match self.floor_model.and_then(|id| self.scene.get_model_mut(id)) {
            Some(scene_model) => scene_model.replace_model(model),
            None => {
                let object = self.scene.spawn_model(
                    "Floor",
                    model,
                    ModelKind::Mesh,
                    Transform::from_translation(FLOOR_POSITION),
                );
                self.floor_model = self.scene.get_object(object).and_then(|object| object.model_id);
            }
        }
    }

    fn insert_loaded_floors(&mut self) {
        let mut current_loaded = false;

        for (name, image) in self.floor_textures.drain() {
            let Some(floor) = FloorTexture::ALL
                .into_iter()
                .find(|floor| floor.name() == name)
            else {
                continue;
            };

            self.loaded_floors.insert(floor, Arc::new(image));
            current_loaded |= floor == self.environment.floor;
        }

        if current_loaded {
            self.rebuild_floor();
        }
    }

    fn cursor_ray(&self) -> crate::math::Ray {
        self.camera.ray_from_screen(self.cursor, self.resolution)
    }

    /// Copies the selected object 10 units along X. The copy can be dragged.
    pub fn clone_selected(&mut self) -> Option<ObjectId> {
        let Some(selected) = self.drag.selected() else {
            log::info!("Nothing selected to clone");
            return None;
        };

        let translation = self.scene.get_object_transform(selected)?.translation();
        let clone = self.scene.clone_object(selected)?;

        self.scene
            .set_object_translation(clone, translation + CLONE_OFFSET);
        if let Some(object) = self.scene.get_object_mut(clone) {
            object.draggable = true;
        }

        log::info!("Cloned object {:?}", clone);
        Some(clone)
    }

    fn handle_press(&mut self) {
        if let Some(center) = self.gizmo.center(&self.scene, &self.camera, self.resolution) {
            if self.gizmo.press(&self.scene, center, self.cursor) {
                return;
            }
        }

        let ray = self.cursor_ray();
        match self.drag.press(&self.scene, &ray) {
            Press::Grabbed(object) => self.gizmo.attach(object),
            Press::Missed => self.gizmo.detach(),
            Press::Ignored => {}
        }
    }

    fn handle_pointer_move(&mut self) {
        if self.gizmo.is_rotating() {
            self.gizmo.drag(&mut self.scene, self.cursor);
            return;
        }

        let ray = self.cursor_ray();
        if let Some((object, position)) = self.drag.drag(&mut self.scene, &ray) {
            if Some(object) == self.light_cube {
                self.environment.move_cube_light(position);
            }
        }
    }

    fn handle_key(&mut self, key: Key) {
        match key {
            Key::Character('r') => match self.drag.selected() {
                Some(selected) => {
                    self.gizmo.attach(selected);
                    self.gizmo.enable();
                }
                None => log::info!("Select an object before rotating"),
            },
            Key::Character('c') => {
                self.clone_selected();
            }
            Key::Space => {
                self.environment.toggle_time_of_day();
                self.background = self.environment.background(&self.asset_dir);
            }
            _ => {}
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved(position) => {
                self.cursor = position;
                self.handle_pointer_move();
            }
            InputEvent::PointerDown {
                position,
                button: MouseButton::Left,
            } => {
                self.cursor = position;
                self.handle_press();
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeft => {
                self.drag.release();
                self.gizmo.release();
            }
            InputEvent::KeyDown(key) => self.handle_key(key),
            _ => {}
        }

        self.orbit.enabled = !self.drag.is_dragging() && !self.gizmo.is_active();
        self.orbit.handle_input(event);
    }

    /// Picks up finished loads and moves the camera.
    pub fn tick(&mut self) {
        self.insert_loaded_models();
        self.insert_loaded_floors();
        self.orbit.apply(&mut self.camera);
    }

    pub fn update(&mut self, ui: &imgui::Ui, resolution: Vec2) {
        self.resolution = resolution;
        self.tick();
        self.draw_ui(ui);
    }

    fn draw_ui(&mut self, ui: &imgui::Ui) {
        let mut floor_index = self.environment.floor.index();
        let floor_names = FloorTexture::ALL.map(FloorTexture::name);
        let loading = self.models.pending();
        let selected_name = self
            .drag
            .selected()
            .and_then(|id| self.scene.get_object(id))
            .map(|object| object.name.clone());

        let mut floor_changed = false;
        ui.window("Room")
            .position([10.0, 10.0], Condition::FirstUseEver)
            .always_auto_resize(true)
            .build(|| {
                floor_changed = ui.combo_simple_string("Floor", &mut floor_index, &floor_names);
                ui.text(format!("Time of day: {:?}", self.environment.time_of_day));
                ui.text(format!(
                    "Selected: {}",
                    selected_name.as_deref().unwrap_or("nothing")
                ));
                if loading > 0 {
                    ui.text(format!("Loading {} models", loading));
                }
                if ui.button("Help") {
                    self.show_help = true;
                }
            });

        if floor_changed {
            if let Some(&floor) = FloorTexture::ALL.get(floor_index) {
                self.set_floor(floor);
            }
        }

        if self.show_help {
            let mut open = true;
            ui.window("Controls")
                .opened(&mut open)
                .position([10.0, 160.0], Condition::FirstUseEver)
                .always_auto_resize(true)
                .build(|| ui.text(HELP_TEXT));
            self.show_help = open;
        }

        if let Some(center) = self.gizmo.center(&self.scene, &self.camera, self.resolution) {
            self.gizmo.draw(ui, center);
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn lighting(&self) -> Lighting {
        self.environment.lighting()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::environment::TimeOfDay;

    const RESOLUTION: Vec2 = Vec2::new(800.0, 600.0);

    fn test_room() -> RoomEditor {
        let mut room = RoomEditor::new(RoomOptions {
            asset_dir: PathBuf::from("missing-test-assets"),
        })
        .unwrap();
        room.resolution = RESOLUTION;
        room
    }

    fn light_cube_position(room: &RoomEditor) -> Vec3 {
        room.scene
            .get_object_transform(room.light_cube.unwrap())
            .unwrap()
            .translation()
    }

    fn press_on(room: &mut RoomEditor, world: Vec3) {
        let position = room.camera.project_to_screen(world, RESOLUTION);
        room.handle_input(&InputEvent::PointerDown {
            position,
            button: MouseButton::Left,
        });
    }

    #[test]
    fn light_cube_starts_near_the_middle() {
        let room = test_room();
        let position = light_cube_position(&room);

        assert!(position.x >= -4.0 && position.x < 4.0);
        assert!(position.z >= -4.0 && position.z < 4.0);
        assert_eq!(position.y, 0.0);
        assert_eq!(room.lighting().point_lights[0].position, position);
    }

    #[test]
    fn dragging_light_cube_moves_its_light() {
        let mut room = test_room();
        let start = light_cube_position(&room);

        press_on(&mut room, start);
        assert!(room.drag.is_dragging());
        assert!(!room.orbit.enabled);

        let target = room
            .camera
            .project_to_screen(start + Vec3::new(2.0, 0.0, 1.0), RESOLUTION);
        room.handle_input(&InputEvent::PointerMoved(target));

        let moved = light_cube_position(&room);
        assert_ne!(moved, start);
        assert_eq!(room.lighting().point_lights[0].position, moved);

        room.handle_input(&InputEvent::PointerUp {
            position: target,
            button: MouseButton::Left,
        });
        assert!(!room.drag.is_dragging());
        assert!(room.orbit.enabled);
    }

    #[test]
    fn clone_offsets_selected_object() {
        let mut room = test_room();
        assert!(room.clone_selected().is_none());

        let start = light_cube_position(&room);
        press_on(&mut room, start);
        room.handle_input(&InputEvent::PointerUp {
            position: Vec2::ZERO,
            button: MouseButton::Left,
        });

        room.handle_input(&InputEvent::KeyDown(Key::Character('c')));

        let clone = room
            .scene
            .iter_objects()
            .filter(|(_, object)| object.name == "Light cube")
            .map(|(id, _)| id)
            .find(|&id| Some(id) != room.light_cube)
            .unwrap();
        let transform = room.scene.get_object_transform(clone).unwrap();
        assert_eq!(transform.translation(), start + CLONE_OFFSET);
        assert!(room.scene.get_object(clone).unwrap().draggable);
    }

    #[test]
    fn space_toggles_day_and_night() {
        let mut room = test_room();
        assert_eq!(room.environment.time_of_day, TimeOfDay::Night);

        room.handle_input(&InputEvent::KeyDown(Key::Space));

        assert_eq!(room.environment.time_of_day, TimeOfDay::Noon);
        assert_eq!(
            room.background().cube_map,
            Some(PathBuf::from("missing-test-assets/bg/noon"))
        );
        assert!(room.lighting().directional.is_none());
    }

    #[test]
    fn rotate_key_needs_selection_and_disables_orbit() {
        let mut room = test_room();

        room.handle_input(&InputEvent::KeyDown(Key::Character('r')));
        assert!(!room.gizmo.is_active());
        assert!(room.orbit.enabled);

        let start = light_cube_position(&room);
        press_on(&mut room, start);
        room.handle_input(&InputEvent::PointerUp {
            position: Vec2::ZERO,
            button: MouseButton::Left,
        });
        room.handle_input(&InputEvent::KeyDown(Key::Character('r')));

        assert!(room.gizmo.is_active());
        assert!(!room.orbit.enabled);
    }

    #[test]
    fn press_on_nothing_detaches_gizmo() {
        let mut room = test_room();
        let start = light_cube_position(&room);
        press_on(&mut room, start);
        room.handle_input(&InputEvent::PointerUp {
            position: Vec2::ZERO,
            button: MouseButton::Left,
        });
        room.handle_input(&InputEvent::KeyDown(Key::Character('r')));

        // Off to the side, well above the floor
        press_on(&mut room, Vec3::new(-60.0, 40.0, 0.0));

        assert!(!room.gizmo.is_active());
        assert!(room.orbit.enabled);
    }

    #[test]
    fn changing_floor_rebuilds_floor_model() {
        let mut room = test_room();
        let floor_model = room.floor_model.unwrap();
        room.scene.get_model_mut(floor_model).unwrap().needs_rebuild = false;

        room.set_floor(FloorTexture::Brick1);

        assert_eq!(room.floor(), FloorTexture::Brick1);
        assert!(room.requested_floors.contains(&FloorTexture::Brick1));
        assert!(room.scene.get_model(floor_model).unwrap().needs_rebuild);
    }
}
