use std::path::PathBuf;

use glam::Vec2;
use winit::dpi::PhysicalSize;

use crate::color::Color;

pub type Resolution = PhysicalSize<u32>;

/// Window size in logical points. Demos lay out overlays and cast rays in this space
/// so it matches imgui and the cursor.
pub fn logical_resolution(resolution: Resolution, scale_factor: f64) -> Vec2 {
    let size = resolution.to_logical::<f32>(scale_factor);
    Vec2::new(size.width, size.height)
}

/// What the background pass draws behind the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    /// Directory holding the six cube map faces.
    pub cube_map: Option<PathBuf>,
    /// Used when there is no cube map or it failed to load.
    pub clear_color: Color,
}

impl Background {
    pub fn cube_map(dir: impl Into<PathBuf>) -> Self {
        Self {
            cube_map: Some(dir.into()),
            clear_color: Color::BLACK,
        }
    }

    pub fn clear(color: Color) -> Self {
        Self {
            cube_map: None,
            clear_color: color,
        }
    }

    pub fn wgpu_clear_color(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.clear_color.r as f64,
            g: self.clear_color.g as f64,
            b: self.clear_color.b as f64,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_resolution_divides_by_scale() {
        let size = PhysicalSize::new(1600, 1200);

        assert_eq!(logical_resolution(size, 2.0), Vec2::new(800.0, 600.0));
        assert_eq!(logical_resolution(size, 1.0), Vec2::new(1600.0, 1200.0));
    }
}
