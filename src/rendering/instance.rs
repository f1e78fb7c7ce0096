use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use id_arena::Arena;
use wgpu::BufferUsages;

use crate::{rendering::render_model::RenderModel, scene_graph::Scene};

/// Per-instance vertex data: the object's world matrix and the matrix for its normals.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Instance {
    model: Mat4,
    normal: Mat4,
}

impl Instance {
    pub fn new(model: Mat4) -> Self {
        Self {
            model,
            normal: model.inverse().transpose(),
        }
    }
}

// Two matrices, one column per location
const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
    5 => Float32x4, 6 => Float32x4, 7 => Float32x4, 8 => Float32x4,
    9 => Float32x4, 10 => Float32x4, 11 => Float32x4, 12 => Float32x4
];

pub const INSTANCE_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: size_of::<Instance>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &INSTANCE_ATTRIBUTES,
};

pub struct Instances {
    instances: Vec<Instance>,
}

impl Instances {
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
        }
    }

    pub fn add(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn write_to_buffer(&self, queue: &wgpu::Queue, instance_buffer: &InstanceBuffer) {
        let count = self.len();
        queue.write_buffer(
            instance_buffer.buffer(),
            0,
            bytemuck::cast_slice(&self.instances[..count]),
        );
    }

    pub fn should_render(&self) -> bool {
        !self.instances.is_empty()
    }

    /// Number of instances that fit in the buffer.
    pub fn len(&self) -> usize {
        self.instances.len().min(InstanceBuffer::MAX_INSTANCES as usize)
    }
}

pub struct InstanceBuffer(wgpu::Buffer);

impl InstanceBuffer {
    pub const MAX_INSTANCES: u64 = 128;

    pub fn new(device: &wgpu::Device, name: &str) -> Self {
        let label = format!("Instance buffer ({})", name);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&label),
            size: size_of::<Instance>() as u64 * Self::MAX_INSTANCES,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self(buffer)
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer().slice(..));
    }
}

/// Collects the world matrices of every visible object into its model's instance list.
pub fn gather_instances(scene: &Scene, render_models: &mut Arena<RenderModel>) {
    for (_, render_model) in render_models.iter_mut() {
        render_model.instances.clear();
    }

    for (_, object) in scene.iter_objects() {
        if !object.visible {
            continue;
        }

        let Some(render_model_id) = object
            .model_id
            .and_then(|id| scene.get_model(id))
            .and_then(|model| model.render_model)
        else {
            continue;
        };

        if let Some(render_model) = render_models.get_mut(render_model_id) {
            let world_matrix = *object.transform.get_world_matrix();
            render_model.instances.add(Instance::new(world_matrix));
        }
    }

    for (_, render_model) in render_models.iter() {
        if render_model.instances.instances.len() > InstanceBuffer::MAX_INSTANCES as usize {
            log::warn!(
                "{} has more than {} instances, the rest are skipped",
                render_model.name,
                InstanceBuffer::MAX_INSTANCES
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_attributes_cover_both_matrices() {
        assert_eq!(size_of::<Instance>(), 128);
        let locations: Vec<u32> = INSTANCE_ATTRIBUTES.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, (5..13).collect::<Vec<_>>());
        assert_eq!(INSTANCE_ATTRIBUTES[4].offset, 64);
        assert_eq!(INSTANCE_ATTRIBUTES[7].offset, 112);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let instance = Instance::new(Mat4::from_scale(glam::Vec3::new(2.0, 1.0, 1.0)));
        assert_eq!(instance.normal.x_axis.x, 0.5);
    }
}
