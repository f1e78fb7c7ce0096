use std::sync::Arc;

use wgpu::{Device, RenderPass};

use crate::{
    rendering::{
        passes::pass::{begin_model_pass, create_model_pipeline, ModelPipelineState, ModelTextureViews, Pass},
        render_common::RenderCommon,
        shader_loader::{PipelineCache, PipelineCacheBuilder, PipelineId, ShaderDefinition},
    },
    scene_graph::ModelKind,
};

const MESH_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Mesh",
    path: "mesh.wgsl",
};

/// Opaque meshes: furniture, floors, data points. Clears the depth buffer.
pub struct MeshPass {
    pipeline_id: PipelineId,
    common: Arc<RenderCommon>,
}

impl Pass for MeshPass {
    type TextureViews = ModelTextureViews;

    fn create(
        _device: &Device,
        common: Arc<RenderCommon>,
        cache_builder: &mut PipelineCacheBuilder,
    ) -> anyhow::Result<Self> {
        let pipeline_common = common.clone();
        let pipeline_id = cache_builder.add_shader(
            MESH_SHADER,
            Box::new(move |device: &Device, shader_def: &ShaderDefinition, source: &str| {
                Ok(create_model_pipeline(
                    device,
                    &pipeline_common,
                    shader_def,
                    source,
                    ModelPipelineState {
                        // Floors and imported models are viewed from both sides
                        cull_mode: None,
                        blend: wgpu::BlendState::REPLACE,
                        depth_write_enabled: true,
                    },
                ))
            }),
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
        mut draw_models: F,
    ) where
        F: FnMut(&mut RenderPass, ModelKind),
    {
        let mut render_pass = begin_model_pass(encoder, "Mesh Pass", texture_views, true);

        let Some(pipeline) = pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.common.frame_bind_group, &[]);
        draw_models(&mut render_pass, ModelKind::Mesh);
    }
}
