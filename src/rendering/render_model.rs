use std::mem::offset_of;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;
use id_arena::Id;
use wgpu::util::DeviceExt;

use crate::{
    model::{Material, Model, ModelPrimitive, Vertex},
    rendering::{
        instance::{InstanceBuffer, Instances},
        render_common::RenderCommon,
        texture::Texture,
    },
    scene_graph::ModelKind,
};

pub type RenderModelId = Id<RenderModel>;

const MATERIAL_FLAG_UNLIT: u32 = 1 << 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct MaterialUniform {
    base_color: Vec4,
    flags: u32,
    _padding: [u32; 3],
}

impl MaterialUniform {
    pub fn new(material: &Material) -> Self {
        Self {
            base_color: material.base_color.to_vec4(1.0),
            flags: if material.unlit { MATERIAL_FLAG_UNLIT } else { 0 },
            _padding: [0; 3],
        }
    }
}

pub struct RenderPrimitive {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_vertices: usize,
    pub num_indices: u32,
    pub material_bind_group: wgpu::BindGroup,
    _material_buffer: wgpu::Buffer,
    _texture: Option<Texture>,
}

impl RenderPrimitive {
    fn from_primitive(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        common: &RenderCommon,
        model: &Model,
        primitive: &ModelPrimitive,
    ) -> Self {
        let vertex_buffer_name = format!(
            "Vertex buffer ({}, primitive {})",
            model.name, primitive.index
        );
        let index_buffer_name = format!(
            "Index buffer ({}, primitive {})",
            model.name, primitive.index
        );

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&vertex_buffer_name),
            contents: bytemuck::cast_slice(&primitive.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&index_buffer_name),
            contents: bytemuck::cast_slice(&primitive.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Material ({})", primitive.material.name)),
            contents: bytemuck::cast_slice(&[MaterialUniform::new(&primitive.material)]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let texture = primitive.material.texture.as_ref().map(|image| {
            Texture::from_image(
                device,
                queue,
                image,
                &format!("Texture ({}, {})", model.name, primitive.material.name),
            )
        });

        let texture_view = texture
            .as_ref()
            .map_or(common.white_texture.view(), Texture::view);

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("Material bind group ({})", primitive.material.name)),
            layout: &common.material_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&common.sampler),
                },
            ],
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_vertices: primitive.vertices.len(),
            num_indices: primitive.indices.len() as u32,
            material_bind_group,
            _material_buffer: material_buffer,
            _texture: texture,
        }
    }
}

pub struct RenderModel {
    pub name: String,
    pub kind: ModelKind,
    pub primitives: Vec<RenderPrimitive>,
    pub instances: Instances,
    pub instance_buffer: InstanceBuffer,
}

impl RenderModel {
    pub fn from_model(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        common: &RenderCommon,
        model: &Model,
        kind: ModelKind,
    ) -> Self {
        let primitives = model
            .primitives
            .iter()
            .map(|primitive| RenderPrimitive::from_primitive(device, queue, common, model, primitive))
            .collect();

        RenderModel {
            name: model.name.clone(),
            kind,
            primitives,
            instances: Instances::new(),
            instance_buffer: InstanceBuffer::new(device, &model.name),
        }
    }

    /// Rewrites vertex data in place. Returns false if the layout changed and the
    /// model needs to be rebuilt instead.
    pub fn update_vertices(&self, queue: &wgpu::Queue, model: &Model) -> bool {
        let same_layout = self.primitives.len() == model.primitives.len()
            && self
                .primitives
                .iter()
                .zip(&model.primitives)
                .all(|(gpu, cpu)| {
                    gpu.num_vertices == cpu.vertices.len()
                        && gpu.num_indices as usize == cpu.indices.len()
                });

        if !same_layout {
            return false;
        }

        for (gpu, cpu) in self.primitives.iter().zip(&model.primitives) {
            queue.write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&cpu.vertices));
        }

        true
    }
}

pub fn render_model_instances(
    render_pass: &mut wgpu::RenderPass,
    queue: &wgpu::Queue,
    render_model: &RenderModel,
) {
    render_model
        .instances
        .write_to_buffer(queue, &render_model.instance_buffer);
    render_model.instance_buffer.bind(render_pass);

    let instance_count = render_model.instances.len() as u32;

    for primitive in &render_model.primitives {
        if primitive.num_indices == 0 {
            continue;
        }

        render_pass.set_bind_group(1, &primitive.material_bind_group, &[]);
        render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        render_pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..primitive.num_indices, 0, 0..instance_count);
    }
}

pub const RENDER_MODEL_VBL: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &[
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, position) as wgpu::BufferAddress,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, normal) as wgpu::BufferAddress,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, tex_coords) as wgpu::BufferAddress,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
        wgpu::VertexAttribute {
            offset: offset_of!(Vertex, color) as wgpu::BufferAddress,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x3,
        },
    ],
};

pub fn model_primitive_state(cull_mode: Option<wgpu::Face>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn material_uniform_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);

        let uniform = MaterialUniform::new(&Material {
            base_color: Color::new(1.0, 0.5, 0.0),
            unlit: true,
            ..Default::default()
        });
        assert_eq!(uniform.flags, MATERIAL_FLAG_UNLIT);
        assert_eq!(uniform.base_color, Vec4::new(1.0, 0.5, 0.0, 1.0));
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(RENDER_MODEL_VBL.array_stride, 44);
        assert_eq!(RENDER_MODEL_VBL.attributes[3].offset, 32);
    }
}
