use glam::Vec2;

use crate::{
    camera::Camera,
    config::DemoOptions,
    globe::Globe,
    input::InputEvent,
    rendering::{common::Background, lighting::Lighting},
    room::RoomEditor,
    scene_graph::Scene,
};

/// The scene picked on the command line.
pub enum DemoState {
    Globe(Box<Globe>),
    Room(Box<RoomEditor>),
}

impl DemoState {
    pub fn new(options: DemoOptions) -> anyhow::Result<Self> {
        Ok(match options {
            DemoOptions::Globe(options) => DemoState::Globe(Box::new(Globe::new(options)?)),
            DemoOptions::Room(options) => DemoState::Room(Box::new(RoomEditor::new(options)?)),
        })
    }

    pub fn camera(&self) -> &Camera {
        match self {
            DemoState::Globe(globe) => globe.camera(),
            DemoState::Room(room) => room.camera(),
        }
    }

    pub fn scene(&self) -> &Scene {
        match self {
            DemoState::Globe(globe) => globe.scene(),
            DemoState::Room(room) => room.scene(),
        }
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        match self {
            DemoState::Globe(globe) => globe.scene_mut(),
            DemoState::Room(room) => room.scene_mut(),
        }
    }

    pub fn lighting(&self) -> Lighting {
        match self {
            DemoState::Globe(globe) => globe.lighting(),
            DemoState::Room(room) => room.lighting(),
        }
    }

    pub fn background(&self) -> &Background {
        match self {
            DemoState::Globe(globe) => globe.background(),
            DemoState::Room(room) => room.background(),
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match self {
            DemoState::Globe(globe) => globe.handle_input(event),
            DemoState::Room(room) => room.handle_input(event),
        }
    }

    pub fn update(&mut self, ui: &imgui::Ui, resolution: Vec2) {
        match self {
            DemoState::Globe(globe) => globe.update(ui, resolution),
            DemoState::Room(room) => room.update(ui, resolution),
        }
    }
}
