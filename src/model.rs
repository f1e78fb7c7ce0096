use std::{f32::consts::PI, sync::Arc};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::{color::Color, math::Aabb};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub color: Vec3,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position,
            normal,
            tex_coords,
            color: Vec3::ONE,
        }
    }
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to load image {}: {}", path.display(), e))?
            .into_rgba8();

        Ok(Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub base_color: Color,
    pub texture: Option<Arc<ImageData>>,
    /// Skip lighting and output the base color as is.
    pub unlit: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::from("Default"),
            base_color: Color::WHITE,
            texture: None,
            unlit: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl ModelPrimitive {
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|vertex| vertex.position))
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitives: Vec::new(),
        }
    }

    pub fn with_primitive(
        mut self,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        self.add_primitive(vertices, indices, material);
        self
    }

    pub fn add_primitive(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>, material: Material) {
        let index = self.primitives.len();
        self.primitives.push(ModelPrimitive {
            index,
            vertices,
            indices,
            material,
        });
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        self.primitives
            .iter()
            .filter_map(ModelPrimitive::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// UV sphere centered at the origin, poles on the Y axis.
    pub fn sphere(
        name: impl Into<String>,
        radius: f32,
        width_segments: u32,
        height_segments: u32,
        material: Material,
    ) -> Self {
        let mut vertices = Vec::new();
        let mut grid = Vec::new();

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let mut row = Vec::new();

            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;

                let position = Vec3::new(
                    -radius * (u * 2.0 * PI).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * 2.0 * PI).sin() * (v * PI).sin(),
                );

                row.push(vertices.len() as u32);
                vertices.push(Vertex::new(
                    position,
                    position.normalize_or_zero(),
                    Vec2::new(u, v),
                ));
            }

            grid.push(row);
        }

        let mut indices = Vec::new();

        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];

                // The pole rows collapse to a single point, skip their degenerate halves
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Model::new(name).with_primitive(vertices, indices, material)
    }

    /// Axis-aligned box centered at the origin. `uv_repeat` tiles the texture on every face.
    pub fn cuboid(name: impl Into<String>, size: Vec3, uv_repeat: f32, material: Material) -> Self {
        let half = size * 0.5;
        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        // (normal, u axis, v axis); u x v == normal keeps the faces counter-clockwise
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        for (normal, u_axis, v_axis) in faces {
            let first = vertices.len() as u32;

            for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                let offset = normal + u_axis * (u * 2.0 - 1.0) + v_axis * (v * 2.0 - 1.0);
                vertices.push(Vertex::new(
                    offset * half,
                    normal,
                    Vec2::new(u, 1.0 - v) * uv_repeat,
                ));
            }

            indices.extend_from_slice(&[first, first + 1, first + 2, first, first + 2, first + 3]);
        }

        Model::new(name).with_primitive(vertices, indices, material)
    }
}
