use std::sync::Arc;

use wgpu::{BlendComponent, BlendFactor, BlendOperation, Device, RenderPass};

use crate::{
    rendering::{
        passes::pass::{begin_model_pass, create_model_pipeline, ModelPipelineState, ModelTextureViews, Pass},
        render_common::RenderCommon,
        shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
    },
    scene_graph::ModelKind,
};

const EARTH_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Earth",
    path: "earth.wgsl",
};

const ATMOSPHERE_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Atmosphere",
    path: "atmosphere.wgsl",
};

const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: BlendComponent {
        src_factor: BlendFactor::SrcAlpha,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
    alpha: BlendComponent {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::One,
        operation: BlendOperation::Add,
    },
};

/// Textured earth followed by the additive atmosphere shell. Runs after the mesh pass and
/// keeps its depth.
pub struct GlobePass {
    earth_pipeline_id: PipelineId,
    atmosphere_pipeline_id: PipelineId,
    common: Arc<RenderCommon>,
}

impl Pass for GlobePass {
    type TextureViews = ModelTextureViews;

    fn create(
        _device: &Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let earth_common = common.clone();
        let earth_pipeline_id = cache_builder.add_shader(
            EARTH_SHADER,
            Box::new(move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                Ok(create_model_pipeline(
                    device,
                    &earth_common,
                    shader_def,
                    source,
                    ModelPipelineState {
                        cull_mode: Some(wgpu::Face::Back),
                        blend: wgpu::BlendState::REPLACE,
                        depth_write_enabled: true,
                    },
                ))
            }),
        );

        let atmosphere_common = common.clone();
        let atmosphere_pipeline_id = cache_builder.add_shader(
            ATMOSPHERE_SHADER,
            Box::new(move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                Ok(create_model_pipeline(
                    device,
                    &atmosphere_common,
                    shader_def,
                    source,
                    ModelPipelineState {
                        // Only the far side of the shell is drawn
                        cull_mode: Some(wgpu::Face::Front),
                        blend: ADDITIVE_BLEND,
                        depth_write_enabled: false,
                    },
                ))
            }),
        );

        Ok(Self {
            earth_pipeline_id,
            atmosphere_pipeline_id,
            common,
        })
    }

    fn render<F>(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        pipeline_cache: &PipelineCache,
        mut draw_models: F,
    ) where
        F: FnMut(&mut RenderPass, ModelKind),
    {
        let mut render_pass = begin_model_pass(encoder, "Globe Pass", texture_views, false);
        render_pass.set_bind_group(0, &self.common.frame_bind_group, &[]);

        for (pipeline_id, kind) in [
            (self.earth_pipeline_id, ModelKind::Earth),
            (self.atmosphere_pipeline_id, ModelKind::Atmosphere),
        ] {
            if let Some(pipeline) = pipeline_cache.get(pipeline_id) {
                render_pass.set_pipeline(pipeline);
                draw_models(&mut render_pass, kind);
            }
        }
    }
}
