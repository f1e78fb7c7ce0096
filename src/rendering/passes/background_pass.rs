use std::sync::Arc;

use wgpu::{
    Device, MultisampleState, PipelineCompilationOptions, RenderPass, RenderPassDescriptor,
    ShaderSource,
};

use crate::{
    rendering::{
        passes::pass::Pass,
        render_common::RenderCommon,
        shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
    },
    scene_graph::ModelKind,
};

pub struct BackgroundPass {
    pipeline_id: PipelineId,
    common: Arc<RenderCommon>,
}

const BACKGROUND_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Background",
    path: "background.wgsl",
};

pub struct BackgroundPassTextureViews {
    pub color: wgpu::TextureView,
    /// Cube map to draw, or `None` to only clear.
    pub cube_map: Option<wgpu::BindGroup>,
    pub clear_color: wgpu::Color,
}

impl Pass for BackgroundPass {
    type TextureViews = BackgroundPassTextureViews;

    fn create(
        device: &Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<BackgroundPass> {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[&common.frame_bind_group_layout, &common.cube_bind_group_layout],
            push_constant_ranges: &[],
        });

        let format = common.surface_format();

        let pipeline_id = cache_builder.add_shader(
            BACKGROUND_SHADER,
            Box::new(
                move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                        label: Some(shader_def.name),
                        source: ShaderSource::Wgsl(source.into()),
                    });

                    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("Background Pass Pipeline"),
                        layout: Some(&layout),
                        vertex: wgpu::VertexState {
                            module: &shader,
                            entry_point: Some("vs_main"),
                            buffers: &[],
                            compilation_options: PipelineCompilationOptions::default(),
                        },
                        fragment: Some(wgpu::FragmentState {
                            module: &shader,
                            entry_point: Some("fs_main"),
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: Some(wgpu::BlendState::REPLACE),
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                            compilation_options: PipelineCompilationOptions::default(),
                        }),
                        primitive: wgpu::PrimitiveState {
                            topology: wgpu::PrimitiveTopology::TriangleList,
                            strip_index_format: None,
                            front_face: wgpu::FrontFace::Ccw,
                            cull_mode: None,
                            polygon_mode: wgpu::PolygonMode::Fill,
                            unclipped_depth: false,
                            conservative: false,
                        },
                        depth_stencil: None,
                        multisample: MultisampleState::default(),
                        multiview: None,
                        cache: None,
                    });

                    Ok(pipeline)
                },
            ),
        );

        Ok(Self {
            pipeline_id,
            common,
        })
    }

    fn render<F>(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        _draw_models: F,
    ) where
        F: FnMut(&mut RenderPass, ModelKind),
    {
        let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Background Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(texture_views.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let (Some(cube_map), Some(pipeline)) =
            (&texture_views.cube_map, pipeline_cache.get(self.pipeline_id))
        else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.common.frame_bind_group, &[]);
        render_pass.set_bind_group(1, cube_map, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
