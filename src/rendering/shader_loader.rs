//! Composes WGSL through naga_oil and rebuilds pipelines when files under
//! `assets/shaders` change.

use std::{
    path::{Path, PathBuf},
    sync::{
        mpsc::{self, Receiver, Sender},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{anyhow, Context};
use naga::{
    back::wgsl::WriterFlags,
    valid::{Capabilities, ValidationFlags, Validator},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
};
use notify_debouncer_mini::{
    new_debouncer_opt,
    notify::{RecommendedWatcher, RecursiveMode},
    DebounceEventResult, DebouncedEventKind, Debouncer,
};
use wgpu::{PollType, RenderPipeline};

const SHADER_FOLDER: &str = "assets/shaders";
/// Every `.wgsl` here is registered as an importable module, e.g. `dataglobe::frame`.
const SHARED_SHADER_FOLDER: &str = "assets/shaders/shared";
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

type PipelineFactory = Box<
    dyn Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<RenderPipeline>
        + Send
        + Sync,
>;

#[derive(Debug, Clone)]
pub struct ShaderDefinition {
    pub name: &'static str,
    /// Relative to `assets/shaders`.
    pub path: &'static str,
}

struct Shader {
    def: ShaderDefinition,
    factory: PipelineFactory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineId(usize);

/// Collects the shaders of every pass before the loader compiles them.
#[derive(Default)]
pub struct PipelineCacheBuilder {
    shaders: Vec<Shader>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_shader(&mut self, def: ShaderDefinition, factory: PipelineFactory) -> PipelineId {
        self.shaders.push(Shader { def, factory });
        PipelineId(self.shaders.len() - 1)
    }
}

pub struct PipelineCache {
    pipelines: Vec<Option<RenderPipeline>>,
}

impl PipelineCache {
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id.0).and_then(Option::as_ref)
    }
}

struct ShaderCompiler {
    device: wgpu::Device,
    composer: Mutex<Composer>,
}

impl ShaderCompiler {
    fn new(device: wgpu::Device) -> anyhow::Result<Self> {
        Ok(Self {
            device,
            composer: Mutex::new(shared_module_composer()?),
        })
    }

    fn compile(&self, shader: &Shader) -> anyhow::Result<RenderPipeline> {
        let path = Path::new(SHADER_FOLDER).join(shader.def.path);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read shader {}", path.display()))?;
        let wgsl = self.compose(&path, &source)?;

        // Invalid pipelines only show up through the error scope
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = (shader.factory)(&self.device, &shader.def, &wgsl);
        self.device
            .poll(PollType::Wait)
            .context("Failed to wait for pipeline creation")?;

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(anyhow!("Pipeline {} is invalid: {}", shader.def.name, error));
        }

        pipeline
    }

    /// Resolves imports and writes the result back out as a single WGSL source.
    fn compose(&self, path: &Path, source: &str) -> anyhow::Result<String> {
        let file_path = path.to_string_lossy();

        let module = self
            .composer
            .lock()
            .map_err(|_| anyhow!("Shader composer lock poisoned"))?
            .make_naga_module(NagaModuleDescriptor {
                file_path: &file_path,
                source,
                ..Default::default()
            })
            .with_context(|| format!("Failed to compose {}", file_path))?;

        // wgpu validates again when it creates the shader module
        let info = Validator::new(ValidationFlags::empty(), Capabilities::all())
            .validate(&module)
            .context("Failed to analyse composed module")?;

        naga::back::wgsl::write_string(&module, &info, WriterFlags::empty())
            .context("Failed to write composed module as WGSL")
    }
}

fn shared_module_composer() -> anyhow::Result<Composer> {
    let mut paths = std::fs::read_dir(SHARED_SHADER_FOLDER)
        .with_context(|| format!("Failed to list {}", SHARED_SHADER_FOLDER))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<PathBuf>, _>>()
        .context("Failed to list shared shader modules")?;
    paths.retain(|path| path.extension().is_some_and(|ext| ext == "wgsl"));
    paths.sort();

    let mut composer = Composer::default();

    for path in paths {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_path = path.to_string_lossy();

        composer
            .add_composable_module(ComposableModuleDescriptor {
                source: &source,
                file_path: &file_path,
                language: ShaderLanguage::Wgsl,
                ..Default::default()
            })
            .with_context(|| format!("Failed to register shared module {}", file_path))?;

        log::debug!("Registered shared shader module {}", file_path);
    }

    Ok(composer)
}

/// Shaders whose source file is `changed`.
fn shaders_using_file<'a>(
    shaders: &'a [Shader],
    changed: &'a Path,
) -> impl Iterator<Item = (PipelineId, &'a Shader)> + 'a {
    shaders
        .iter()
        .enumerate()
        .filter(move |(_, shader)| changed.ends_with(shader.def.path))
        .map(|(index, shader)| (PipelineId(index), shader))
}

fn watch_shaders(
    compiler: Arc<ShaderCompiler>,
    shaders: Arc<Vec<Shader>>,
    reloaded: Sender<(PipelineId, RenderPipeline)>,
) -> anyhow::Result<Debouncer<RecommendedWatcher>> {
    let mut debouncer = new_debouncer_opt(
        notify_debouncer_mini::Config::default().with_timeout(RELOAD_DEBOUNCE),
        move |result: DebounceEventResult| {
            let events = match result {
                Ok(events) => events,
                Err(e) => {
                    log::error!("Shader watcher failed: {}", e);
                    return;
                }
            };

            for event in events
                .iter()
                .filter(|event| event.kind == DebouncedEventKind::Any)
            {
                for (id, shader) in shaders_using_file(&shaders, &event.path) {
                    match compiler.compile(shader) {
                        // Nobody is listening once the renderer has shut down
                        Ok(pipeline) => _ = reloaded.send((id, pipeline)),
                        Err(e) => log::error!("Keeping old {} pipeline: {:?}", shader.def.name, e),
                    }
                }
            }
        },
    )
    .context("Failed to create shader watcher")?;

    let folder = Path::new(SHADER_FOLDER)
        .canonicalize()
        .with_context(|| format!("Shader folder {} not found", SHADER_FOLDER))?;

    debouncer
        .watcher()
        .watch(&folder, RecursiveMode::Recursive)
        .context("Failed to watch shader folder")?;

    Ok(debouncer)
}

/// Owns the compiled pipelines and swaps in the ones the watcher rebuilds.
pub(crate) struct ShaderLoader {
    pub cache: PipelineCache,
    shaders: Arc<Vec<Shader>>,
    reloaded: Receiver<(PipelineId, RenderPipeline)>,
    _watcher: Debouncer<RecommendedWatcher>,
}

impl ShaderLoader {
    pub fn new(device: wgpu::Device, builder: PipelineCacheBuilder) -> anyhow::Result<Self> {
        let compiler = Arc::new(ShaderCompiler::new(device)?);
        let shaders = Arc::new(builder.shaders);

        let pipelines = shaders
            .iter()
            .map(|shader| {
                compiler
                    .compile(shader)
                    .map(Some)
                    .with_context(|| format!("Failed to build pipeline {}", shader.def.name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        let (sender, reloaded) = mpsc::channel();
        let watcher = watch_shaders(compiler, shaders.clone(), sender)?;

        Ok(Self {
            cache: PipelineCache { pipelines },
            shaders,
            reloaded,
            _watcher: watcher,
        })
    }

    /// Picks up pipelines rebuilt since the last frame.
    pub fn load_pending_shaders(&mut self) {
        for (id, pipeline) in self.reloaded.try_iter() {
            let Some(slot) = self.cache.pipelines.get_mut(id.0) else {
                continue;
            };
            *slot = Some(pipeline);

            if let Some(shader) = self.shaders.get(id.0) {
                log::info!("Reloaded shader {}", shader.def.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncompiled(name: &'static str, path: &'static str) -> (ShaderDefinition, PipelineFactory) {
        let factory: PipelineFactory = Box::new(
            |_device: &wgpu::Device, _def: &ShaderDefinition, _source: &str| {
                Err(anyhow!("not compiled"))
            },
        );
        (ShaderDefinition { name, path }, factory)
    }

    fn builder() -> (PipelineCacheBuilder, PipelineId, PipelineId) {
        let mut builder = PipelineCacheBuilder::new();
        let (def, factory) = uncompiled("Earth", "earth.wgsl");
        let earth = builder.add_shader(def, factory);
        let (def, factory) = uncompiled("Atmosphere", "atmosphere.wgsl");
        let atmosphere = builder.add_shader(def, factory);
        (builder, earth, atmosphere)
    }

    #[test]
    fn ids_follow_registration_order() {
        let (_, earth, atmosphere) = builder();

        assert_eq!(earth, PipelineId(0));
        assert_eq!(atmosphere, PipelineId(1));
    }

    #[test]
    fn changed_file_maps_to_its_shader() {
        let (builder, _, atmosphere) = builder();
        let changed = Path::new("/home/user/dataglobe/assets/shaders/atmosphere.wgsl");

        let matches: Vec<_> = shaders_using_file(&builder.shaders, changed)
            .map(|(id, shader)| (id, shader.def.name))
            .collect();

        assert_eq!(matches, vec![(atmosphere, "Atmosphere")]);
    }

    #[test]
    fn shared_module_change_matches_no_pipeline() {
        let (builder, _, _) = builder();
        let changed = Path::new("assets/shaders/shared/frame.wgsl");

        assert_eq!(shaders_using_file(&builder.shaders, changed).count(), 0);
    }

    #[test]
    fn empty_cache_has_no_pipelines() {
        let cache = PipelineCache {
            pipelines: vec![None],
        };

        assert!(cache.get(PipelineId(0)).is_none());
        assert!(cache.get(PipelineId(5)).is_none());
    }
}
