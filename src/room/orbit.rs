//! Orbit camera: drag to turn around the target, wheel to move closer or further.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use crate::{camera::Camera, input::InputEvent};

const ROTATE_SPEED: f32 = 0.005;
/// Radius multiplier per wheel notch.
const DOLLY_STEP: f32 = 0.95;
const PIXELS_PER_NOTCH: f32 = 120.0;
const MIN_RADIUS: f32 = 5.0;
const MAX_RADIUS: f32 = 500.0;
const MAX_ELEVATION: f32 = FRAC_PI_2 - 0.01;

#[derive(Debug, Clone)]
pub struct OrbitController {
    pub target: Vec3,
    pub radius: f32,
    /// Angle around the Y axis, measured from +Z.
    pub azimuth: f32,
    /// Angle above the XZ plane.
    pub elevation: f32,
    pub enabled: bool,
    last_pointer: Option<Vec2>,
}

impl OrbitController {
    /// Orbit that reproduces a camera looking from `eye` at `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length().clamp(MIN_RADIUS, MAX_RADIUS);

        Self {
            target,
            radius,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / offset.length().max(f32::EPSILON))
                .asin()
                .clamp(-MAX_ELEVATION, MAX_ELEVATION),
            enabled: true,
            last_pointer: None,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();

        self.target + self.radius * Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az)
    }

    pub fn apply(&self, camera: &mut Camera) {
        camera.eye = self.eye();
        camera.target = self.target;
        camera.up = Vec3::Y;
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { position, .. } if self.enabled => {
                self.last_pointer = Some(position);
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeft => self.last_pointer = None,
            InputEvent::PointerMoved(position) => {
                let Some(last) = self.last_pointer else {
                    return;
                };
                if !self.enabled {
                    self.last_pointer = None;
                    return;
                }

                let delta = position - last;
                self.azimuth -= delta.x * ROTATE_SPEED;
                self.elevation =
                    (self.elevation + delta.y * ROTATE_SPEED).clamp(-MAX_ELEVATION, MAX_ELEVATION);
                self.last_pointer = Some(position);
            }
            InputEvent::Wheel { delta_y } if self.enabled => {
                let notches = delta_y / PIXELS_PER_NOTCH;
                self.radius = (self.radius * DOLLY_STEP.powf(notches)).clamp(MIN_RADIUS, MAX_RADIUS);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;

    fn approx_vec(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn looking_at_round_trips_eye() {
        let eye = Vec3::new(20.0, 30.0, 50.0);
        let orbit = OrbitController::looking_at(eye, Vec3::ZERO);

        assert!(approx_vec(orbit.eye(), eye));
    }

    #[test]
    fn drag_turns_around_target() {
        let mut orbit = OrbitController::looking_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        let azimuth = orbit.azimuth;

        orbit.handle_input(&InputEvent::PointerDown {
            position: Vec2::new(100.0, 100.0),
            button: MouseButton::Left,
        });
        orbit.handle_input(&InputEvent::PointerMoved(Vec2::new(200.0, 100.0)));

        assert!((orbit.azimuth - (azimuth - 0.5)).abs() < 1e-5);
        assert!((orbit.eye().length() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn disabled_orbit_ignores_drag_and_wheel() {
        let mut orbit = OrbitController::looking_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);
        orbit.enabled = false;
        let eye = orbit.eye();

        orbit.handle_input(&InputEvent::PointerDown {
            position: Vec2::ZERO,
            button: MouseButton::Left,
        });
        orbit.handle_input(&InputEvent::PointerMoved(Vec2::new(300.0, 300.0)));
        orbit.handle_input(&InputEvent::Wheel { delta_y: 1200.0 });

        assert!(approx_vec(orbit.eye(), eye));
    }

    #[test]
    fn wheel_dolly_is_clamped() {
        let mut orbit = OrbitController::looking_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);

        orbit.handle_input(&InputEvent::Wheel { delta_y: 120.0 });
        assert!((orbit.radius - 47.5).abs() < 1e-3);

        orbit.handle_input(&InputEvent::Wheel { delta_y: 120.0 * 500.0 });
        assert_eq!(orbit.radius, MIN_RADIUS);
    }

    #[test]
    fn elevation_stops_short_of_the_pole() {
        let mut orbit = OrbitController::looking_at(Vec3::new(0.0, 0.0, 50.0), Vec3::ZERO);

        orbit.handle_input(&InputEvent::PointerDown {
            position: Vec2::ZERO,
            button: MouseButton::Left,
        });
        orbit.handle_input(&InputEvent::PointerMoved(Vec2::new(0.0, 10_000.0)));

        assert_eq!(orbit.elevation, MAX_ELEVATION);
    }
}
