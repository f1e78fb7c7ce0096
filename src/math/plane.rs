use glam::Vec3;

/// Points `p` on the plane satisfy `normal.dot(p) + distance == 0`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    pub fn from_normal_and_coplanar_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: -point.dot(normal),
        }
    }

    pub fn horizontal_through(point: Vec3) -> Self {
        Self::from_normal_and_coplanar_point(Vec3::Y, point)
    }

    pub fn signed_distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coplanar_point_has_zero_distance() {
        let point = Vec3::new(3.0, -2.0, 7.5);
        let plane = Plane::from_normal_and_coplanar_point(Vec3::new(0.0, 2.0, 0.0), point);

        assert_eq!(plane.normal, Vec3::Y);
        assert!(plane.signed_distance_to_point(point).abs() < 1e-6);
        assert!((plane.signed_distance_to_point(Vec3::new(0.0, 1.0, 0.0)) - 3.0).abs() < 1e-6);
    }
}
