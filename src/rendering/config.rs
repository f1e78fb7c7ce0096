#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub vsync: bool,
    /// When off, cube maps are skipped and only the clear color is drawn.
    pub draw_background: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            draw_background: true,
        }
    }
}

impl RenderConfig {
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}
