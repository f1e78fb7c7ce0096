pub mod bounds;
pub mod plane;
pub mod ray;

pub use bounds::Aabb;
pub use plane::Plane;
pub use ray::Ray;
