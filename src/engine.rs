use glam::Vec2;

use crate::demo::DemoState;

pub fn update(state: &mut DemoState, ui: &imgui::Ui, resolution: Vec2) {
    state.scene_mut().early_update();
    state.update(ui, resolution);
    state.scene_mut().late_update();
}
