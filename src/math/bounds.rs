use glam::{Mat4, Vec3};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(point1: Vec3, point2: Vec3) -> Aabb {
        let min = point1.min(point2);
        let max = point1.max(point2);
        Aabb { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Aabb> {
        points.into_iter().fold(None, |aabb: Option<Aabb>, point| {
            Some(match aabb {
                Some(aabb) => Aabb {
                    min: aabb.min.min(point),
                    max: aabb.max.max(point),
                },
                None => Aabb::new(point, point),
            })
        })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Box enclosing this box after the transform. Loose for rotations.
    pub fn transform(&self, matrix: &Mat4) -> Aabb {
        let corners = self
            .corners()
            .map(|corner| matrix.transform_point3(corner));

        // Eight corners, never empty
        Aabb::from_points(corners).unwrap_or(*self)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use glam::Quat;

    use super::*;

    #[test]
    fn from_points_spans_all() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-3.0, 4.0, 1.0),
            Vec3::new(0.0, 0.0, -5.0),
        ])
        .unwrap();

        assert_eq!(aabb.min, Vec3::new(-3.0, -2.0, -5.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 1.0));
        assert_eq!(Aabb::from_points(std::iter::empty()), None);
    }

    #[test]
    fn transform_scales_and_translates() {
        let aabb = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::new(2.0, 1.0, 0.5),
            Quat::IDENTITY,
            Vec3::new(10.0, 0.0, 0.0),
        );

        let transformed = aabb.transform(&matrix);
        assert!((transformed.min - Vec3::new(8.0, -1.0, -0.5)).length() < 1e-5);
        assert!((transformed.max - Vec3::new(12.0, 1.0, 0.5)).length() < 1e-5);
        assert!(transformed.contains_point(Vec3::new(11.0, 0.0, 0.0)));
        assert!(!transformed.contains_point(Vec3::ZERO));
    }
}
