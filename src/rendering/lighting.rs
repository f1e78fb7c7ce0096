use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::color::Color;

/// Point lights beyond this count are ignored by the shaders.
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Points from the scene towards the light.
    pub direction: Vec3,
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Distance at which the light has faded out completely.
    pub range: f32,
}

/// The lights a demo wants for the current frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lighting {
    pub ambient: Color,
    pub directional: Option<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, Default)]
pub struct GpuPointLight {
    /// xyz = position, w = range
    position: Vec4,
    /// rgb = color, w = intensity
    color: Vec4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable, Default)]
pub struct LightingUniform {
    ambient: Vec4,
    directional_direction: Vec4,
    directional_color: Vec4,
    point_lights: [GpuPointLight; MAX_POINT_LIGHTS],
    point_light_count: u32,
    _padding: [u32; 3],
}

impl LightingUniform {
    pub fn new(lighting: &Lighting) -> Self {
        let mut uniform = Self {
            ambient: lighting.ambient.to_vec4(1.0),
            ..Default::default()
        };

        if let Some(directional) = lighting.directional {
            uniform.directional_direction = directional.direction.normalize_or_zero().extend(0.0);
            uniform.directional_color = directional.color.to_vec4(directional.intensity);
        }

        if lighting.point_lights.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "{} point lights requested, only {} are used",
                lighting.point_lights.len(),
                MAX_POINT_LIGHTS
            );
        }

        for (gpu_light, light) in uniform.point_lights.iter_mut().zip(&lighting.point_lights) {
            *gpu_light = GpuPointLight {
                position: light.position.extend(light.range),
                color: light.color.to_vec4(light.intensity),
            };
        }
        uniform.point_light_count = lighting.point_lights.len().min(MAX_POINT_LIGHTS) as u32;

        uniform
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Lighting Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 32);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 192);
    }

    #[test]
    fn packs_lights() {
        let light = PointLight {
            position: Vec3::new(1.0, 2.0, 3.0),
            color: Color::new(1.0, 1.0, 0.0),
            intensity: 1.0,
            range: 10.0,
        };
        let lighting = Lighting {
            ambient: Color::WHITE,
            directional: Some(DirectionalLight {
                direction: Vec3::new(0.0, 2.0, 0.0),
                color: Color::WHITE,
                intensity: 0.5,
            }),
            point_lights: vec![light; 6],
        };

        let uniform = LightingUniform::new(&lighting);
        assert_eq!(uniform.point_light_count, MAX_POINT_LIGHTS as u32);
        assert_eq!(uniform.point_lights[3].position, Vec4::new(1.0, 2.0, 3.0, 10.0));
        assert_eq!(uniform.directional_direction, Vec4::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(uniform.directional_color, Vec4::new(1.0, 1.0, 1.0, 0.5));
    }

    #[test]
    fn no_lights_is_dark() {
        let uniform = LightingUniform::new(&Lighting::default());
        assert_eq!(uniform.ambient, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(uniform.directional_color, Vec4::ZERO);
        assert_eq!(uniform.point_light_count, 0);
    }
}
