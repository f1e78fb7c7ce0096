//! Interactive earth with data point overlays.

pub mod controller;
pub mod dataset;
pub mod morph;
pub mod point_cloud;
pub mod projection;
pub mod spot;

use std::{f32::consts::PI, sync::Arc};

use glam::{Quat, Vec2, Vec3};
use imgui::Condition;

use crate::{
    asset_loader::AssetLoader,
    camera::Camera,
    color::Color,
    config::GlobeOptions,
    input::InputEvent,
    model::{ImageData, Material, Model},
    rendering::{common::Background, lighting::Lighting},
    scene_graph::{ModelKind, Scene, SceneModelId, Transform},
};

use self::{
    controller::GlobeController,
    dataset::Dataset,
    morph::{blend_positions, MorphState},
    point_cloud::{AddDataOptions, PointCloud, PointCloudBuilder},
    projection::GLOBE_RADIUS,
    spot::{offset_from_center, Spot, MARKER_SIZE},
};

const EARTH_TEXTURE: &str = "world.jpg";
const ATMOSPHERE_SCALE: f32 = 1.1;
const SPHERE_SEGMENTS: (u32, u32) = (40, 30);

const PRESET_LOCATION: (f32, f32) = (28.12, 112.59);
const PRESET_TARGET: Vec2 = Vec2::new(6.5, 0.53);
const PRESET_DISTANCE: f32 = 900.0;
const MOVE_TO_CENTER_NUDGE: f32 = 0.1;

fn earth_model(texture: Option<Arc<ImageData>>) -> Model {
    let (width_segments, height_segments) = SPHERE_SEGMENTS;
    Model::sphere(
        "Earth",
        GLOBE_RADIUS,
        width_segments,
        height_segments,
        Material {
            name: "Earth".to_string(),
            texture,
            ..Default::default()
        },
    )
}

struct Points {
    cloud: PointCloud,
    model_id: SceneModelId,
}

pub struct Globe {
    camera: Camera,
    controller: GlobeController,
    scene: Scene,
    background: Background,

    builder: PointCloudBuilder,
    points: Option<Points>,
    morph: MorphState,

    spot: Option<Spot>,
    earth_model: Option<SceneModelId>,
    textures: AssetLoader<ImageData>,
}

impl Globe {
    pub fn new(options: GlobeOptions) -> anyhow::Result<Self> {
        let mut scene = Scene::new();

        let earth = scene.spawn_model(
            "Earth",
            earth_model(None),
            ModelKind::Earth,
            Transform::new(Vec3::ZERO, Quat::from_rotation_y(PI), Vec3::ONE),
        );
        let earth_model_id = scene.get_object(earth).and_then(|object| object.model_id);

        scene.spawn_model(
            "Atmosphere",
            earth_model(None),
            ModelKind::Atmosphere,
            Transform::new(Vec3::ZERO, Quat::IDENTITY, Vec3::splat(ATMOSPHERE_SCALE)),
        );

        let mut textures = AssetLoader::new();
        let texture_path = options.img_dir.join(EARTH_TEXTURE);
        textures.load(texture_path.display().to_string(), move || {
            ImageData::load(&texture_path)
        });

        let mut globe = Self {
            camera: Camera::perspective(30.0, 1.0, 10000.0),
            controller: GlobeController::new(options.spin),
            scene,
            background: Background::cube_map(&options.background_dir),
            builder: PointCloudBuilder::new(options.color_fn),
            points: None,
            morph: MorphState::default(),
            spot: None,
            earth_model: earth_model_id,
            textures,
        };

        if let Some(path) = &options.data {
            let dataset = Dataset::load(path)?;
            dataset.add_to(&mut globe.builder, options.format)?;
            globe.create_points();
        }

        if let Some(preset) = options.preset {
            globe.update_earth(preset, globe.controller.rotation_speed, globe.controller.zoom_speed);
        }

        globe.controller.apply(&mut globe.camera);

        Ok(globe)
    }

    pub fn add_data(&mut self, data: &[f32], options: &AddDataOptions) -> anyhow::Result<()> {
        self.builder.add_data(data, options)
    }

    /// Turns everything added so far into the point mesh. Does nothing without data.
    pub fn create_points(&mut self) {
        let Some(cloud) = self.builder.create_points() else {
            return;
        };

        self.morph.set_time(&cloud.frames, self.morph.time());
        let positions = blend_positions(&cloud.base, &cloud.frames, self.morph.weights());
        let model = cloud.to_model(&positions);

        let existing = self
            .points
            .as_ref()
            .and_then(|points| self.scene.get_model_mut(points.model_id));

        let model_id = match existing {
            Some(scene_model) => {
                scene_model.replace_model(model);
                self.points.as_ref().map(|points| points.model_id)
            }
            None => {
                let object = self
                    .scene
                    .spawn_model("Points", model, ModelKind::Mesh, Transform::default());
                self.scene.get_object(object).and_then(|object| object.model_id)
            }
        };

        self.points = model_id.map(|model_id| Points { cloud, model_id });
    }

    pub fn time(&self) -> f32 {
        self.morph.time()
    }

    /// Moves the morph animation to `t`, clamped to [0, 1].
    pub fn set_time(&mut self, t: f32) {
        let Some(points) = &self.points else {
            self.morph.set_time(&[], t);
            return;
        };

        self.morph.set_time(&points.cloud.frames, t);

        if !points.cloud.is_animated() {
            return;
        }

        let positions = blend_positions(
            &points.cloud.base,
            &points.cloud.frames,
            self.morph.weights(),
        );

        if let Some(scene_model) = self.scene.get_model_mut(points.model_id) {
            scene_model.update_vertices(0, points.cloud.vertices(&positions));
        }
    }

    pub fn update_earth(&mut self, preset: u32, rotation_speed: f32, zoom_speed: f32) {
        self.controller.rotation_speed = rotation_speed;
        self.controller.zoom_speed = zoom_speed;

        if preset == 1 {
            self.controller.target = PRESET_TARGET;
            self.controller.distance_target = PRESET_DISTANCE;
            let (lat, lng) = PRESET_LOCATION;
            self.spot = Some(Spot::new(lat, lng));
        }
    }

    pub fn move_to_center(&mut self, element_position: Vec2, resolution: Vec2) {
        let offset = offset_from_center(element_position, resolution);
        log::info!("Spot is {:.0},{:.0} px from the center", offset.x, offset.y);

        self.controller.rotation += Vec2::splat(MOVE_TO_CENTER_NUDGE);
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        self.controller.handle_input(event);
    }

    /// Advances the camera by one frame and picks up the earth texture once it has loaded.
    pub fn tick(&mut self) {
        for (_name, image) in self.textures.drain() {
            if let Some(scene_model) = self
                .earth_model
                .and_then(|id| self.scene.get_model_mut(id))
            {
                scene_model.replace_model(earth_model(Some(Arc::new(image))));
            }
        }

        self.controller.tick();
        self.controller.apply(&mut self.camera);

        if let Some(spot) = &mut self.spot {
            spot.update_visibility(self.controller.distance);
        }
    }

    pub fn update(&mut self, ui: &imgui::Ui, resolution: Vec2) {
        self.tick();
        self.draw_panel(ui);
        self.draw_overlay(ui, resolution);
    }

    fn draw_panel(&mut self, ui: &imgui::Ui) {
        let animated = self
            .points
            .as_ref()
            .is_some_and(|points| points.cloud.is_animated());

        let mut time = self.time();
        let mut time_changed = false;
        let mut preset = None;

        ui.window("Globe")
            .position([10.0, 10.0], Condition::FirstUseEver)
            .always_auto_resize(true)
            .build(|| {
                if animated {
                    time_changed = ui.slider("Time", 0.0, 1.0, &mut time);
                }

                ui.checkbox("Spin", &mut self.controller.spin);
                ui.slider("Rotation speed", 0.0, 5.0, &mut self.controller.rotation_speed);
                ui.slider("Zoom speed", 0.0, 20.0, &mut self.controller.zoom_speed);

                if ui.button("Preset 1") {
                    preset = Some(1);
                }
                ui.same_line();
                if ui.button("Preset 2") {
                    preset = Some(2);
                }

                ui.text(format!("Distance {:.0}", self.controller.distance));
            });

        if time_changed {
            self.set_time(time);
        }

        if let Some(preset) = preset {
            self.update_earth(
                preset,
                self.controller.rotation_speed,
                self.controller.zoom_speed,
            );
        }
    }

    fn draw_overlay(&mut self, ui: &imgui::Ui, resolution: Vec2) {
        let Some(spot) = self.spot.as_ref().filter(|spot| spot.is_visible()) else {
            return;
        };

        let layout = spot.layout(&self.camera, resolution);
        let (lat, lng) = (spot.lat, spot.lng);
        let mut clicked = false;

        {
            let _padding = ui.push_style_var(imgui::StyleVar::WindowPadding([0.0, 0.0]));

            ui.window("##spot")
                .position(layout.marker_top_left.to_array(), Condition::Always)
                .size([MARKER_SIZE, MARKER_SIZE], Condition::Always)
                .no_decoration()
                .movable(false)
                .bg_alpha(0.0)
                .build(|| {
                    clicked = ui.button_with_size("o", [MARKER_SIZE, MARKER_SIZE]);
                });
        }

        ui.window("##spot_info")
            .position(
                [layout.info_left, layout.info_bottom_y(resolution)],
                Condition::Always,
            )
            .position_pivot([0.0, 1.0])
            .no_decoration()
            .always_auto_resize(true)
            .build(|| {
                ui.text(format!("{:.2}, {:.2}", lat, lng));
            });

        if clicked {
            self.move_to_center(layout.marker_top_left, resolution);
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controller(&self) -> &GlobeController {
        &self.controller
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn spot(&self) -> Option<&Spot> {
        self.spot.as_ref()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// The earth and atmosphere shade themselves and points are unlit.
    pub fn lighting(&self) -> Lighting {
        Lighting {
            ambient: Color::WHITE,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::globe::{
        controller::{MAX_DISTANCE, MIN_DISTANCE},
        point_cloud::MIN_MORPH_FRAMES,
        projection::lat_lng_to_position,
    };

    fn test_globe() -> Globe {
        Globe::new(GlobeOptions {
            img_dir: PathBuf::from("missing-test-images"),
            ..Default::default()
        })
        .unwrap()
    }

    fn animated(name: &str) -> AddDataOptions {
        AddDataOptions {
            animated: true,
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn points_model(globe: &Globe) -> &Model {
        let id = globe.points.as_ref().unwrap().model_id;
        &globe.scene.get_model(id).unwrap().model
    }

    #[test]
    fn create_points_without_data_does_nothing() {
        let mut globe = test_globe();
        let models_before = globe.scene.models.len();

        globe.create_points();

        assert!(globe.points.is_none());
        assert_eq!(globe.scene.models.len(), models_before);
    }

    #[test]
    fn single_point_spawns_one_box() {
        let mut globe = test_globe();
        globe
            .add_data(&[10.0, 20.0, 0.5], &AddDataOptions::default())
            .unwrap();
        globe.create_points();

        let model = points_model(&globe);
        assert_eq!(model.primitives[0].vertices.len(), 8);

        // The outer face of the box sits 100 units out from the surface
        let surface = lat_lng_to_position(10.0, 20.0, GLOBE_RADIUS);
        let farthest = model.primitives[0]
            .vertices
            .iter()
            .map(|vertex| vertex.position.length())
            .fold(0.0, f32::max);
        assert!(farthest > surface.length() + 99.0);
    }

    #[test]
    fn animated_points_are_padded_and_blend_with_time() {
        let mut globe = test_globe();
        globe.add_data(&[0.0, 0.0, 0.1], &animated("1990")).unwrap();
        globe.add_data(&[0.0, 0.0, 0.3], &animated("2000")).unwrap();
        globe.create_points();

        let points = globe.points.as_ref().unwrap();
        assert_eq!(points.cloud.frames.len(), MIN_MORPH_FRAMES);
        let at_start = points_model(&globe).primitives[0].vertices.clone();

        globe.set_time(1.0);

        assert_eq!(globe.time(), 1.0);
        let scene_model = globe
            .scene
            .get_model(globe.points.as_ref().unwrap().model_id)
            .unwrap();
        assert!(scene_model.vertices_dirty);
        assert_ne!(scene_model.model.primitives[0].vertices, at_start);
    }

    #[test]
    fn time_is_clamped() {
        let mut globe = test_globe();
        globe.set_time(4.0);
        assert_eq!(globe.time(), 1.0);
        globe.set_time(-1.0);
        assert_eq!(globe.time(), 0.0);
    }

    #[test]
    fn preset_one_flies_to_location() {
        let mut globe = test_globe();
        globe.update_earth(1, 2.0, 3.0);

        assert_eq!(globe.controller.rotation_speed, 2.0);
        assert_eq!(globe.controller.zoom_speed, 3.0);
        assert_eq!(globe.controller.target, PRESET_TARGET);
        assert_eq!(globe.controller.distance_target, PRESET_DISTANCE);
        let spot = globe.spot().unwrap();
        assert_eq!((spot.lat, spot.lng), PRESET_LOCATION);
        assert!(!spot.is_visible());
    }

    #[test]
    fn other_presets_only_change_speeds() {
        let mut globe = test_globe();
        let target = globe.controller.target;
        globe.update_earth(2, 1.5, 7.0);

        assert_eq!(globe.controller.rotation_speed, 1.5);
        assert_eq!(globe.controller.zoom_speed, 7.0);
        assert_eq!(globe.controller.target, target);
        assert!(globe.spot().is_none());
    }

    #[test]
    fn spot_appears_after_zooming_in() {
        let mut globe = test_globe();
        globe.update_earth(1, 0.5, 5.0);

        globe.tick();
        assert!(globe.controller.distance > MAX_DISTANCE);
        assert!(!globe.spot().unwrap().is_visible());

        for _ in 0..200 {
            globe.tick();
        }

        assert!(globe.controller.distance >= MIN_DISTANCE);
        assert!(globe.spot().unwrap().is_visible());
    }

    #[test]
    fn move_to_center_nudges_rotation() {
        let mut globe = test_globe();
        let before = globe.controller.rotation;

        globe.move_to_center(Vec2::new(10.0, 10.0), Vec2::new(800.0, 600.0));

        assert_eq!(globe.controller.rotation, before + Vec2::splat(0.1));
    }

    #[test]
    fn camera_follows_controller() {
        let mut globe = test_globe();
        globe.tick();

        assert_eq!(globe.camera().eye, globe.controller().eye());
        assert_eq!(globe.camera().target, Vec3::ZERO);
    }
}
