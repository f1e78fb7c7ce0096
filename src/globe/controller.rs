//! Orbit camera around the globe: eased drag rotation, clamped zoom and idle spin.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Vec2, Vec3};

use crate::{
    camera::Camera,
    input::{InputEvent, Key},
};

pub const MIN_DISTANCE: f32 = 350.0;
pub const MAX_DISTANCE: f32 = 1500.0;
/// Camera starts far out and flies in to the clamped distance.
pub const INITIAL_DISTANCE: f32 = 100_000.0;

pub const DEFAULT_ROTATION_SPEED: f32 = 0.5;
pub const DEFAULT_ZOOM_SPEED: f32 = 5.0;

const DRAG_SENSITIVITY: f32 = 0.005;
const WHEEL_SENSITIVITY: f32 = 0.3;
const KEY_ZOOM_STEP: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        pointer_on_down: Vec2,
        target_on_down: Vec2,
    },
}

#[derive(Debug, Clone)]
pub struct GlobeController {
    pub rotation: Vec2,
    pub target: Vec2,
    pub distance: f32,
    pub distance_target: f32,
    pub rotation_speed: f32,
    pub zoom_speed: f32,
    /// Added to the zoom target every frame.
    pub zoom_velocity: f32,
    pub spin: bool,
    over_window: bool,
    drag: DragState,
}

impl Default for GlobeController {
    fn default() -> Self {
        Self {
            rotation: Vec2::ZERO,
            target: Vec2::new(PI * 1.014, PI / 6.0 * 0.077),
            distance: INITIAL_DISTANCE,
            distance_target: INITIAL_DISTANCE.clamp(MIN_DISTANCE, MAX_DISTANCE),
            rotation_speed: DEFAULT_ROTATION_SPEED,
            zoom_speed: DEFAULT_ZOOM_SPEED,
            zoom_velocity: 0.0,
            spin: false,
            over_window: false,
            drag: DragState::Idle,
        }
    }
}

impl GlobeController {
    /// A spinning controller never eases its distance, so it starts at the far zoom limit
    /// instead of flying in.
    pub fn new(spin: bool) -> Self {
        let mut controller = Self {
            spin,
            ..Default::default()
        };
        if spin {
            controller.distance = MAX_DISTANCE;
            controller.distance_target = MAX_DISTANCE;
        }
        controller
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance_target = (self.distance_target - delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerEntered => self.over_window = true,
            InputEvent::PointerLeft => {
                self.over_window = false;
                self.drag = DragState::Idle;
            }
            InputEvent::PointerDown { position, .. } => {
                self.over_window = true;
                self.drag = DragState::Dragging {
                    pointer_on_down: Vec2::new(-position.x, position.y),
                    target_on_down: self.target,
                };
            }
            InputEvent::PointerUp { .. } => self.drag = DragState::Idle,
            InputEvent::PointerMoved(position) => {
                self.over_window = true;
                if let DragState::Dragging {
                    pointer_on_down,
                    target_on_down,
                } = self.drag
                {
                    let pointer = Vec2::new(-position.x, position.y);
                    let zoom_damp = self.distance / 1000.0;

                    self.target =
                        target_on_down + (pointer - pointer_on_down) * DRAG_SENSITIVITY * zoom_damp;
                    self.target.y = self.target.y.clamp(-FRAC_PI_2, FRAC_PI_2);
                }
            }
            InputEvent::Wheel { delta_y } => {
                if self.over_window {
                    self.zoom(delta_y * WHEEL_SENSITIVITY);
                }
            }
            InputEvent::KeyDown(Key::ArrowUp) => self.zoom(KEY_ZOOM_STEP),
            InputEvent::KeyDown(Key::ArrowDown) => self.zoom(-KEY_ZOOM_STEP),
            InputEvent::KeyDown(_) => {}
        }
    }

    /// Advances the easing by one frame.
    pub fn tick(&mut self) {
        if self.spin {
            self.rotation.x += self.rotation_speed * 0.01;
            return;
        }

        self.zoom(self.zoom_velocity);

        self.rotation += (self.target - self.rotation) * self.rotation_speed * 0.01;
        self.distance += (self.distance_target - self.distance) * self.zoom_speed * 0.03;
    }

    pub fn eye(&self) -> Vec3 {
        let Vec2 { x, y } = self.rotation;
        self.distance * Vec3::new(x.sin() * y.cos(), y.sin(), x.cos() * y.cos())
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.eye = self.eye();
        camera.target = Vec3::ZERO;
        camera.up = Vec3::Y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;

    fn press(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerDown {
            position: Vec2::new(x, y),
            button: MouseButton::Left,
        }
    }

    #[test]
    fn zoom_target_is_clamped() {
        let mut controller = GlobeController::default();
        controller.zoom(0.0);
        assert_eq!(controller.distance_target, MAX_DISTANCE);

        for _ in 0..50 {
            controller.zoom(100.0);
            assert!(controller.distance_target >= MIN_DISTANCE);
        }
        assert_eq!(controller.distance_target, MIN_DISTANCE);

        for _ in 0..50 {
            controller.zoom(-100.0);
            assert!(controller.distance_target <= MAX_DISTANCE);
        }
        assert_eq!(controller.distance_target, MAX_DISTANCE);
    }

    #[test]
    fn default_target_is_within_zoom_range() {
        let controller = GlobeController::default();

        assert!((MIN_DISTANCE..=MAX_DISTANCE).contains(&controller.distance_target));
        assert_eq!(controller.distance, INITIAL_DISTANCE);
    }

    #[test]
    fn first_tick_flies_in_towards_target() {
        let mut controller = GlobeController::default();
        controller.tick();

        assert_eq!(controller.distance_target, MAX_DISTANCE);
        assert!(controller.distance < INITIAL_DISTANCE);
        assert!(controller.distance > MAX_DISTANCE);
    }

    #[test]
    fn easing_converges() {
        let mut controller = GlobeController::default();
        for _ in 0..5000 {
            controller.tick();
        }

        assert!((controller.distance - MAX_DISTANCE).abs() < 1e-2);
        assert!((controller.rotation - controller.target).length() < 1e-3);
    }

    #[test]
    fn drag_moves_target_relative_to_press() {
        let mut controller = GlobeController::default();
        controller.distance = 1000.0;
        let start = controller.target;

        controller.handle_input(&press(100.0, 100.0));
        controller.handle_input(&InputEvent::PointerMoved(Vec2::new(80.0, 120.0)));

        // Horizontal pointer axis is inverted
        let expected = start + Vec2::new(20.0, 20.0) * 0.005;
        assert!((controller.target - expected).length() < 1e-5);

        controller.handle_input(&InputEvent::PointerUp {
            position: Vec2::new(80.0, 120.0),
            button: MouseButton::Left,
        });
        controller.handle_input(&InputEvent::PointerMoved(Vec2::new(0.0, 0.0)));
        assert!((controller.target - expected).length() < 1e-5);
    }

    #[test]
    fn drag_clamps_latitude() {
        let mut controller = GlobeController::default();
        controller.distance = 1000.0;

        controller.handle_input(&press(0.0, 0.0));
        controller.handle_input(&InputEvent::PointerMoved(Vec2::new(0.0, 10_000.0)));
        assert_eq!(controller.target.y, FRAC_PI_2);

        controller.handle_input(&InputEvent::PointerMoved(Vec2::new(0.0, -10_000.0)));
        assert_eq!(controller.target.y, -FRAC_PI_2);
    }

    #[test]
    fn leaving_the_window_ends_drag_and_ignores_wheel() {
        let mut controller = GlobeController::default();
        controller.zoom(0.0);
        controller.handle_input(&press(0.0, 0.0));
        assert!(controller.is_dragging());

        controller.handle_input(&InputEvent::PointerLeft);
        assert!(!controller.is_dragging());

        let before = controller.distance_target;
        controller.handle_input(&InputEvent::Wheel { delta_y: 120.0 });
        assert_eq!(controller.distance_target, before);

        controller.handle_input(&InputEvent::PointerEntered);
        controller.handle_input(&InputEvent::Wheel { delta_y: 120.0 });
        assert_eq!(controller.distance_target, MAX_DISTANCE - 36.0);
    }

    #[test]
    fn arrow_keys_zoom() {
        let mut controller = GlobeController::default();
        controller.zoom(0.0);

        controller.handle_input(&InputEvent::KeyDown(Key::ArrowUp));
        assert_eq!(controller.distance_target, MAX_DISTANCE - 100.0);

        controller.handle_input(&InputEvent::KeyDown(Key::ArrowDown));
        assert_eq!(controller.distance_target, MAX_DISTANCE);
    }

    #[test]
    fn spin_only_advances_longitude() {
        let mut controller = GlobeController::new(true);
        let distance = controller.distance;
        controller.tick();

        assert!((controller.rotation.x - 0.005).abs() < 1e-6);
        assert_eq!(controller.rotation.y, 0.0);
        assert_eq!(controller.distance, distance);
    }

    #[test]
    fn eye_orbits_at_distance() {
        let mut controller = GlobeController::default();
        controller.distance = 1000.0;
        controller.rotation = Vec2::ZERO;
        assert!((controller.eye() - Vec3::new(0.0, 0.0, 1000.0)).length() < 1e-3);

        controller.rotation = Vec2::new(0.7, -0.4);
        assert!((controller.eye().length() - 1000.0).abs() < 1e-2);
    }
}
