//! A location marker on the globe and the placement of its screen overlay.

use glam::{Vec2, Vec3};

use crate::{
    camera::Camera,
    globe::projection::{lat_lng_to_position, GLOBE_RADIUS},
};

/// Side of the square marker overlay, in pixels.
pub const MARKER_SIZE: f32 = 30.0;
/// How far the info window sits to the left of the marker.
pub const INFO_WINDOW_SHIFT: f32 = 183.0;
/// Gap between the info window's bottom edge and the marker.
pub const INFO_WINDOW_GAP: f32 = 10.0;
/// The marker appears once the camera gets closer than this.
pub const SHOW_DISTANCE: f32 = 950.0;

/// Where the overlay elements go for the current frame, in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub marker_top_left: Vec2,
    pub info_left: f32,
    /// Distance of the info window's bottom edge from the bottom of the window.
    pub info_bottom: f32,
}

impl OverlayLayout {
    /// Y coordinate (from the top) of the info window's bottom edge.
    pub fn info_bottom_y(&self, resolution: Vec2) -> f32 {
        resolution.y - self.info_bottom
    }
}

#[derive(Debug, Clone)]
pub struct Spot {
    pub lat: f32,
    pub lng: f32,
    pub position: Vec3,
    visible: bool,
}

impl Spot {
    pub fn new(lat: f32, lng: f32) -> Self {
        Self {
            lat,
            lng,
            position: lat_lng_to_position(lat, lng, GLOBE_RADIUS),
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Once shown the marker stays visible.
    pub fn update_visibility(&mut self, camera_distance: f32) {
        if camera_distance < SHOW_DISTANCE {
            self.visible = true;
        }
    }

    pub fn layout(&self, camera: &Camera, resolution: Vec2) -> OverlayLayout {
        overlay_layout(camera.project_to_screen(self.position, resolution), resolution)
    }
}

pub fn overlay_layout(screen: Vec2, resolution: Vec2) -> OverlayLayout {
    let half = MARKER_SIZE / 2.0;

    OverlayLayout {
        marker_top_left: screen - Vec2::splat(half),
        info_left: screen.x - half - INFO_WINDOW_SHIFT,
        info_bottom: resolution.y - screen.y + INFO_WINDOW_GAP,
    }
}

/// Offset of an overlay element from the middle of the window.
pub fn offset_from_center(element_position: Vec2, resolution: Vec2) -> Vec2 {
    element_position - resolution / 2.0
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalSize;

    use super::*;
    use crate::rendering::common::logical_resolution;

    #[test]
    fn layout_around_marker() {
        let layout = overlay_layout(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));

        assert_eq!(layout.marker_top_left, Vec2::new(385.0, 285.0));
        assert_eq!(layout.info_left, 400.0 - 15.0 - 183.0);
        assert_eq!(layout.info_bottom, 310.0);
        assert_eq!(layout.info_bottom_y(Vec2::new(800.0, 600.0)), 290.0);
    }

    #[test]
    fn visibility_is_sticky() {
        let mut spot = Spot::new(28.12, 112.59);
        spot.update_visibility(1200.0);
        assert!(!spot.is_visible());

        spot.update_visibility(900.0);
        assert!(spot.is_visible());

        spot.update_visibility(1500.0);
        assert!(spot.is_visible());
    }

    #[test]
    fn spot_projects_to_window_center_when_facing_camera() {
        let spot = Spot::new(0.0, 0.0);
        let mut camera = Camera::perspective(30.0, 1.0, 10000.0);
        camera.eye = spot.position * 5.0;
        camera.target = Vec3::ZERO;

        let resolution = Vec2::new(800.0, 600.0);
        let layout = spot.layout(&camera, resolution);
        assert!((layout.marker_top_left - Vec2::new(385.0, 285.0)).length() < 1e-2);
    }

    #[test]
    fn layout_on_scaled_display_uses_logical_points() {
        let spot = Spot::new(0.0, 0.0);
        let mut camera = Camera::perspective(30.0, 1.0, 10000.0);
        camera.eye = spot.position * 5.0;
        camera.target = Vec3::ZERO;

        // 1600x1200 framebuffer at scale 2 is an 800x600 window for imgui
        let resolution = logical_resolution(PhysicalSize::new(1600, 1200), 2.0);
        let layout = spot.layout(&camera, resolution);

        assert!((layout.marker_top_left - Vec2::new(385.0, 285.0)).length() < 1e-2);
        assert!((layout.info_bottom_y(resolution) - 290.0).abs() < 1e-2);
    }

    #[test]
    fn center_offset() {
        let offset = offset_from_center(Vec2::new(100.0, 500.0), Vec2::new(800.0, 600.0));
        assert_eq!(offset, Vec2::new(-300.0, 200.0));
    }
}
