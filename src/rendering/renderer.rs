use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::window::Window;

use crate::{
    camera::CameraUniform,
    demo::DemoState,
    rendering::{
        common::Resolution,
        config::RenderConfig,
        imgui_renderer::ImguiRenderer,
        instance::gather_instances,
        lighting::LightingUniform,
        passes::{
            background_pass::{BackgroundPass, BackgroundPassTextureViews},
            globe_pass::GlobePass,
            mesh_pass::MeshPass,
            pass::{ModelTextureViews, Pass},
        },
        render_common::RenderCommon,
        render_model::{render_model_instances, RenderModel},
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::{CubeTexture, DepthTexture},
    },
    scene_graph::{ModelKind, Scene},
};

struct LoadedCubeMap {
    _texture: CubeTexture,
    bind_group: wgpu::BindGroup,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: Resolution,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    config: RenderConfig,
    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,
    // None marks a directory that failed to load, so it is not retried every frame
    cube_maps: HashMap<PathBuf, Option<LoadedCubeMap>>,
    camera_uniform: CameraUniform,

    shader_loader: ShaderLoader,
    imgui_renderer: ImguiRenderer,

    background_pass: BackgroundPass,
    mesh_pass: MeshPass,
    globe_pass: GlobePass,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        config: RenderConfig,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        log::info!("Using adapter {}", adapter.get_info().name);

        let common = RenderCommon::new(&device, &queue, &adapter, &surface, size, &config);
        let common = Arc::new(common);

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");

        let mut cache_builder = PipelineCacheBuilder::new();

        let background_pass = BackgroundPass::create(&device, common.clone(), &mut cache_builder)?;
        let mesh_pass = MeshPass::create(&device, common.clone(), &mut cache_builder)?;
        let globe_pass = GlobePass::create(&device, common.clone(), &mut cache_builder)?;

        let shader_loader = ShaderLoader::new(device.clone(), cache_builder)?;

        let imgui_renderer =
            ImguiRenderer::new(&device, &queue, common.surface_format(), imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            config,
            common,
            depth_texture,
            render_models: Arena::new(),
            cube_maps: HashMap::new(),
            camera_uniform: CameraUniform::default(),
            shader_loader,
            imgui_renderer,
            background_pass,
            mesh_pass,
            globe_pass,
        })
    }

    /// Uploads scene models that have no GPU copy yet and refreshes the ones that changed.
    pub fn sync_models(&mut self, scene: &mut Scene) {
        for (_id, scene_model) in scene.models.iter_mut() {
            let existing = scene_model
                .render_model
                .and_then(|id| self.render_models.get_mut(id));

            match existing {
                Some(render_model) if scene_model.needs_rebuild => {
                    *render_model = RenderModel::from_model(
                        &self.device,
                        &self.queue,
                        &self.common,
                        &scene_model.model,
                        scene_model.kind,
                    );
                    log::debug!("Rebuilt model {}", scene_model.name);
                }
                Some(render_model) if scene_model.vertices_dirty => {
                    if !render_model.update_vertices(&self.queue, &scene_model.model) {
                        *render_model = RenderModel::from_model(
                            &self.device,
                            &self.queue,
                            &self.common,
                            &scene_model.model,
                            scene_model.kind,
                        );
                    }
                }
                Some(_) => {}
                None => {
                    let render_model = RenderModel::from_model(
                        &self.device,
                        &self.queue,
                        &self.common,
                        &scene_model.model,
                        scene_model.kind,
                    );
                    scene_model.render_model = Some(self.render_models.alloc(render_model));
                    log::info!(
                        "Loaded model {} with {} primitives",
                        scene_model.name,
                        scene_model.model.primitives.len()
                    );
                }
            }

            scene_model.needs_rebuild = false;
            scene_model.vertices_dirty = false;
        }
    }

    fn cube_map(&mut self, dir: &Path) -> Option<wgpu::BindGroup> {
        if !self.cube_maps.contains_key(dir) {
            let loaded = match CubeTexture::load(&self.device, &self.queue, dir) {
                Ok(texture) => {
                    let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Cube map bind group"),
                        layout: &self.common.cube_bind_group_layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(texture.view()),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::Sampler(&self.common.sampler),
                            },
                        ],
                    });
                    log::info!("Loaded cube map {}", dir.display());

                    Some(LoadedCubeMap {
                        _texture: texture,
                        bind_group,
                    })
                }
                Err(e) => {
                    log::warn!("Using clear color instead of cube map: {:?}", e);
                    None
                }
            };

            self.cube_maps.insert(dir.to_path_buf(), loaded);
        }

        self.cube_maps
            .get(dir)
            .and_then(|loaded| loaded.as_ref())
            .map(|loaded| loaded.bind_group.clone())
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let Ok(mut config) = self.common.output_surface_config.write() else {
            log::error!("Surface config lock poisoned");
            return;
        };

        self.size = new_size;
        config.width = new_size.width;
        config.height = new_size.height;
        self.depth_texture.resize(&self.device, new_size);
        self.surface.configure(&self.device, &config);
    }

    pub fn render(
        &mut self,
        demo_state: &mut DemoState,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        self.sync_models(demo_state.scene_mut());

        self.camera_uniform.update(self.size, demo_state.camera());
        self.camera_uniform
            .update_buffer(&self.queue, &self.common.camera_uniform_buffer);
        LightingUniform::new(&demo_state.lighting())
            .update_buffer(&self.queue, &self.common.lighting_uniform_buffer);

        gather_instances(demo_state.scene(), &mut self.render_models);

        let background = demo_state.background();
        let cube_map = match &background.cube_map {
            Some(dir) if self.config.draw_background => self.cube_map(dir),
            _ => None,
        };

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(e) => {
                // End the imgui frame so the next one can begin
                imgui_context.render();
                return Err(e);
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let pipeline_cache = &self.shader_loader.cache;
        let render_models = &self.render_models;
        let queue = &self.queue;

        self.background_pass.render(
            &BackgroundPassTextureViews {
                color: view.clone(),
                cube_map,
                clear_color: background.wgpu_clear_color(),
            },
            &mut encoder,
            pipeline_cache,
            |_, _| {},
        );

        let model_views = ModelTextureViews {
            color: view.clone(),
            depth: self.depth_texture.view().clone(),
        };

        self.mesh_pass
            .render(&model_views, &mut encoder, pipeline_cache, |pass, kind| {
                draw_models(render_models, queue, pass, kind)
            });
        self.globe_pass
            .render(&model_views, &mut encoder, pipeline_cache, |pass, kind| {
                draw_models(render_models, queue, pass, kind)
            });

        if let Err(e) = self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{:?}", e);
        }

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }
}

fn draw_models(
    render_models: &Arena<RenderModel>,
    queue: &wgpu::Queue,
    render_pass: &mut wgpu::RenderPass,
    kind: ModelKind,
) {
    for (_id, render_model) in render_models.iter() {
        if render_model.kind != kind || !render_model.instances.should_render() {
            continue;
        }

        render_model_instances(render_pass, queue, render_model);
    }
}
