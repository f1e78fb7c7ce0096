//! Placement of data points on the globe.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

use crate::color::Color;

pub const GLOBE_RADIUS: f32 = 200.0;
/// Points never collapse entirely along their local Z.
pub const MIN_POINT_SCALE: f32 = 0.1;

/// Footprint of a point box in the plane tangent to the sphere.
const POINT_WIDTH: f32 = 0.75;

/// Maps latitude/longitude in degrees onto the sphere of the given radius.
pub fn lat_lng_to_position(lat: f32, lng: f32, radius: f32) -> Vec3 {
    let phi = (90.0 - lat) * PI / 180.0;
    let theta = (180.0 - lng) * PI / 180.0;

    radius * Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
}

/// Rotation that aims local +Z from `position` towards `target`.
pub fn look_at_rotation(position: Vec3, target: Vec3) -> Mat4 {
    let z = (target - position).normalize_or(Vec3::NEG_Z);

    let mut x = Vec3::Y.cross(z);
    if x.length_squared() < 1e-12 {
        // Looking straight up or down, so Y is unusable as the up vector
        x = Vec3::Y.cross(z + Vec3::new(0.0, 0.0, 1e-4));
        if x.length_squared() < 1e-12 {
            x = Vec3::X;
        }
    }
    let x = x.normalize();
    let y = z.cross(x);

    Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), glam::Vec4::W)
}

/// World matrix of a single point box: sits on the surface, faces the center, and is
/// stretched along its local Z by `size`.
pub fn point_transform(lat: f32, lng: f32, size: f32) -> Mat4 {
    let position = lat_lng_to_position(lat, lng, GLOBE_RADIUS);
    let rotation = look_at_rotation(position, Vec3::ZERO);

    Mat4::from_translation(position)
        * rotation
        * Mat4::from_scale(Vec3::new(1.0, 1.0, size.max(MIN_POINT_SCALE)))
}

/// Corners of the unit point box, already shifted so it spans local Z in [-1, 0].
pub fn box_corners() -> [Vec3; 8] {
    let half = POINT_WIDTH / 2.0;
    std::array::from_fn(|i| {
        Vec3::new(
            if i & 1 != 0 { half } else { -half },
            if i & 2 != 0 { half } else { -half },
            if i & 4 != 0 { 0.0 } else { -1.0 },
        )
    })
}

/// Counter-clockwise triangles of the point box, indexing into [`box_corners`].
pub const BOX_INDICES: [u32; 36] = [
    1, 3, 7, 1, 7, 5, // +x
    0, 4, 6, 0, 6, 2, // -x
    2, 6, 7, 2, 7, 3, // +y
    0, 1, 5, 0, 5, 4, // -y
    4, 5, 7, 4, 7, 6, // +z
    0, 2, 3, 0, 3, 1, // -z
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub lat: f32,
    pub lng: f32,
    pub size: f32,
    pub color: Color,
}

impl ProjectedPoint {
    pub fn transform(&self) -> Mat4 {
        point_transform(self.lat, self.lng, self.size)
    }

    /// The eight box corners in world space.
    pub fn corners(&self) -> [Vec3; 8] {
        let transform = self.transform();
        box_corners().map(|corner| transform.transform_point3(corner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn north_pole() {
        assert!(approx(lat_lng_to_position(90.0, 0.0, GLOBE_RADIUS), Vec3::new(0.0, 200.0, 0.0)));
        assert!(approx(lat_lng_to_position(90.0, 75.0, GLOBE_RADIUS), Vec3::new(0.0, 200.0, 0.0)));
    }

    #[test]
    fn equator_at_prime_meridian() {
        assert!(approx(lat_lng_to_position(0.0, 0.0, GLOBE_RADIUS), Vec3::new(-200.0, 0.0, 0.0)));
        assert!(approx(lat_lng_to_position(0.0, 90.0, GLOBE_RADIUS), Vec3::new(0.0, 0.0, 200.0)));
    }

    #[test]
    fn positions_lie_on_the_sphere() {
        for (lat, lng) in [(10.0, 20.0), (-45.0, 170.0), (89.0, -120.0)] {
            let length = lat_lng_to_position(lat, lng, GLOBE_RADIUS).length();
            assert!((length - GLOBE_RADIUS).abs() < 1e-3);
        }
    }

    #[test]
    fn box_extends_outwards() {
        let point = ProjectedPoint {
            lat: 10.0,
            lng: 20.0,
            size: 100.0,
            color: Color::WHITE,
        };
        let surface = lat_lng_to_position(10.0, 20.0, GLOBE_RADIUS);
        let outward = surface.normalize();

        let heights: Vec<f32> = point
            .corners()
            .iter()
            .map(|corner| (*corner - surface).dot(outward))
            .collect();

        for (i, height) in heights.iter().enumerate() {
            let expected = if i & 4 != 0 { 0.0 } else { 100.0 };
            assert!((height - expected).abs() < 1e-2, "corner {i}: {height}");
        }
    }

    #[test]
    fn zero_size_is_floored() {
        let point = ProjectedPoint {
            lat: -30.0,
            lng: 60.0,
            size: 0.0,
            color: Color::WHITE,
        };
        let corners = point.corners();
        let depth = (corners[0] - corners[4]).length();
        assert!((depth - MIN_POINT_SCALE).abs() < 1e-3);
    }

    #[test]
    fn pole_points_are_well_formed() {
        let transform = point_transform(90.0, 0.0, 1.0);
        assert!(transform.is_finite());
        assert!((transform.determinant() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn box_triangles_face_outwards() {
        let corners = box_corners();
        let center = Vec3::new(0.0, 0.0, -0.5);

        for triangle in BOX_INDICES.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| corners[triangle[i] as usize]);
            let normal = (b - a).cross(c - a);
            let face_center = (a + b + c) / 3.0;
            assert!(normal.dot(face_center - center) > 0.0, "{triangle:?}");
        }
    }
}
