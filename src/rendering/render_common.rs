use std::sync::RwLock;

use wgpu::SurfaceConfiguration;

use crate::{
    camera::CameraUniform,
    rendering::{
        common::Resolution,
        config::RenderConfig,
        lighting::{Lighting, LightingUniform},
        texture::Texture,
    },
};

/// GPU state shared by all passes.
pub struct RenderCommon {
    pub output_surface_config: RwLock<SurfaceConfiguration>,
    pub camera_uniform_buffer: wgpu::Buffer,
    pub lighting_uniform_buffer: wgpu::Buffer,

    /// Camera (0) and lighting (1) uniforms.
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub frame_bind_group: wgpu::BindGroup,
    /// Material uniform (0), color texture (1) and sampler (2).
    pub material_bind_group_layout: wgpu::BindGroupLayout,
    /// Cube texture (0) and sampler (1).
    pub cube_bind_group_layout: wgpu::BindGroupLayout,

    pub sampler: wgpu::Sampler,
    pub white_texture: Texture,
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: Resolution,
        config: &RenderConfig,
    ) -> Self {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: config.present_mode(),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);

        let camera_uniform_buffer = CameraUniform::default().create_buffer(device);
        let lighting_uniform_buffer =
            LightingUniform::new(&Lighting::default()).create_buffer(device);

        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame bind group layout"),
                entries: &[uniform_entry(0), uniform_entry(1)],
            });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame bind group"),
            layout: &frame_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let material_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material bind group layout"),
                entries: &[
                    uniform_entry(0),
                    texture_entry(1, wgpu::TextureViewDimension::D2),
                    sampler_entry(2),
                ],
            });

        let cube_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Cube map bind group layout"),
                entries: &[
                    texture_entry(0, wgpu::TextureViewDimension::Cube),
                    sampler_entry(1),
                ],
            });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Repeating sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white_texture = Texture::white(device, queue);

        Self {
            output_surface_config: RwLock::new(output_surface_config),
            camera_uniform_buffer,
            lighting_uniform_buffer,
            frame_bind_group_layout,
            frame_bind_group,
            material_bind_group_layout,
            cube_bind_group_layout,
            sampler,
            white_texture,
        }
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.output_surface_config
            .read()
            .map(|config| config.format)
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
    }
}
