use std::sync::Arc;

use wgpu::{
    DepthBiasState, Device, MultisampleState, PipelineCompilationOptions, RenderPass,
    ShaderSource, StencilState,
};

use crate::{
    rendering::{
        instance::INSTANCE_VBL,
        render_common::RenderCommon,
        render_model::{model_primitive_state, RENDER_MODEL_VBL},
        shader_loader::{PipelineCache, PipelineCacheBuilder, ShaderDefinition},
        texture::DepthTexture,
    },
    scene_graph::ModelKind,
};

pub(crate) trait Pass {
    type TextureViews;

    fn create(
        device: &wgpu::Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// Records the pass. `draw_models` is called once per model kind the pass draws, with
    /// the matching pipeline already bound.
    fn render<F>(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        draw_models: F,
    ) where
        F: FnMut(&mut RenderPass, ModelKind);
}

pub struct ModelTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
}

/// Fixed-function state of a pipeline that draws scene models.
#[derive(Clone, Copy)]
pub(crate) struct ModelPipelineState {
    pub cull_mode: Option<wgpu::Face>,
    pub blend: wgpu::BlendState,
    pub depth_write_enabled: bool,
}

pub(crate) fn create_model_pipeline(
    device: &Device,
    common: &RenderCommon,
    shader_def: &ShaderDefinition,
    source: &str,
    state: ModelPipelineState,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(shader_def.name),
        source: ShaderSource::Wgsl(source.into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{} pipeline layout", shader_def.name)),
        bind_group_layouts: &[
            &common.frame_bind_group_layout,
            &common.material_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{} pipeline", shader_def.name)),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[RENDER_MODEL_VBL, INSTANCE_VBL],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: common.surface_format(),
                blend: Some(state.blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: model_primitive_state(state.cull_mode),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthTexture::DEPTH_FORMAT,
            depth_write_enabled: state.depth_write_enabled,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

pub(crate) fn begin_model_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    label: &str,
    texture_views: &ModelTextureViews,
    clear_depth: bool,
) -> RenderPass<'a> {
    let depth_load = if clear_depth {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &texture_views.color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &texture_views.depth,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}
