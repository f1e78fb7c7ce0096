use std::{sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    event::{Event, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::Cli,
    demo::DemoState,
    engine,
    input::{self, InputEvent},
    rendering::{common::logical_resolution, config::RenderConfig, renderer::Renderer},
};

const WINDOW_TITLE: &str = "dataglobe";

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    render_config: RenderConfig,
    demo_state: DemoState,
    cursor: Vec2,
    imgui: Option<ImguiState>,
    last_frame: Instant,
}

impl App {
    fn new(demo_state: DemoState, render_config: RenderConfig) -> Self {
        Self {
            renderer: None,
            render_config,
            demo_state,
            cursor: Vec2::ZERO,
            imgui: None,
            last_frame: Instant::now(),
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);
        let window = event_loop
            .create_window(window_attributes)
            .context("Failed to create window")?;

        let mut imgui = Self::setup_imgui(&window);
        let renderer = pollster::block_on(Renderer::new(
            Arc::new(window),
            self.render_config,
            &mut imgui.context,
        ))?;

        self.imgui = Some(imgui);
        self.renderer = Some(renderer);

        Ok(())
    }

    /// Whether imgui is using the event and the demo should not see it.
    fn captured_by_ui(io: &imgui::Io, event: &InputEvent) -> bool {
        match event {
            // Always let releases through so drags can end
            InputEvent::PointerUp { .. } | InputEvent::PointerLeft => false,
            InputEvent::KeyDown(_) => io.want_capture_keyboard,
            event => event.is_pointer() && io.want_capture_mouse,
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return;
        };

        let now = Instant::now();
        imgui
            .context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        renderer.window.request_redraw();

        if let Err(e) = imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
        {
            log::error!("Failed to prepare imgui frame: {:?}", e);
            event_loop.exit();
            return;
        }

        let resolution = logical_resolution(renderer.size, renderer.window.scale_factor());

        let ui = imgui.context.new_frame();
        engine::update(&mut self.demo_state, ui, resolution);
        imgui.platform.prepare_render(ui, &renderer.window);

        match renderer.render(&mut self.demo_state, &mut imgui.context) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(renderer.size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory");
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
            }
            Err(other) => {
                log::error!("Unexpected error: {:?}", other);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(e) = self.create_renderer(event_loop) {
            log::error!("{:?}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let scale_factor = self
            .renderer
            .as_ref()
            .map_or(1.0, |renderer| renderer.window.scale_factor());

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(*new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                return;
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = input::logical_position(*position, scale_factor);
            }
            _ => (),
        }

        let (Some(renderer), Some(imgui)) = (self.renderer.as_ref(), self.imgui.as_mut()) else {
            return;
        };

        if let Some(input_event) = input::translate(&event, self.cursor, scale_factor) {
            if !Self::captured_by_ui(imgui.context.io(), &input_event) {
                self.demo_state.handle_input(&input_event);
            }
        }

        imgui.platform.handle_event::<()>(
            imgui.context.io_mut(),
            &renderer.window,
            &Event::WindowEvent { window_id, event },
        );
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let demo_state = DemoState::new(cli.demo_options()).context("Failed to create demo")?;

    let mut app = App::new(demo_state, cli.render_config());
    event_loop.run_app(&mut app)?;

    Ok(())
}
