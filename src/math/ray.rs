use glam::Vec3;

use crate::math::{Aabb, Plane};

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the plane, if the plane is in front of the origin.
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f32> {
        let denominator = plane.normal.dot(self.direction);

        if denominator.abs() < PARALLEL_EPSILON {
            // Parallel: only a ray lying in the plane touches it
            return (plane.signed_distance_to_point(self.origin).abs() < PARALLEL_EPSILON)
                .then_some(0.0);
        }

        let t = -(self.origin.dot(plane.normal) + plane.distance) / denominator;
        (t >= 0.0).then_some(t)
    }

    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }

    /// Slab test. Returns the entry distance, or 0 when the origin is inside the box.
    pub fn distance_to_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let origin = self.origin[axis];
            let direction = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);

            if direction.abs() < PARALLEL_EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let inverse = 1.0 / direction;
            let mut t0 = (min - origin) * inverse;
            let mut t1 = (max - origin) * inverse;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);

            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }

        Some(t_min.max(0.0))
    }
}
