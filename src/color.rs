use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Maps a scalar (magnitude or legend value) to a point color.
pub type ColorFn = Box<dyn Fn(f32) -> Color + Send + Sync>;

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// HSL to RGB, with the hue wrapping around and saturation/lightness clamped to [0, 1].
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(1.0);
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return Self::new(l, l, l);
        }

        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;

        Self::new(
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        )
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn to_vec4(self, w: f32) -> Vec4 {
        self.to_vec3().extend(w)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

/// Blue for small values through green and yellow towards red for large ones.
pub fn magnitude_color(value: f32) -> Color {
    Color::from_hsl(0.6 - value * 0.5, 1.0, 0.5)
}

pub fn default_color_fn() -> ColorFn {
    Box::new(magnitude_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_color_eq(actual: Color, expected: Color) {
        let diff = (actual.to_vec3() - expected.to_vec3()).abs().max_element();
        assert!(diff < 1e-5, "{actual:?} != {expected:?}");
    }

    #[test]
    fn hsl_primaries() {
        assert_color_eq(Color::from_hsl(0.0, 1.0, 0.5), Color::new(1.0, 0.0, 0.0));
        assert_color_eq(Color::from_hsl(1.0 / 3.0, 1.0, 0.5), Color::new(0.0, 1.0, 0.0));
        assert_color_eq(Color::from_hsl(2.0 / 3.0, 1.0, 0.5), Color::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn hsl_without_saturation_is_grey() {
        assert_color_eq(Color::from_hsl(0.42, 0.0, 0.25), Color::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn hue_wraps_around() {
        assert_color_eq(Color::from_hsl(1.25, 1.0, 0.5), Color::from_hsl(0.25, 1.0, 0.5));
        assert_color_eq(Color::from_hsl(-0.75, 1.0, 0.5), Color::from_hsl(0.25, 1.0, 0.5));
    }

    #[test]
    fn magnitude_scale_endpoints() {
        assert_color_eq(magnitude_color(0.0), Color::new(0.0, 0.4, 1.0));
        // 0.6 - 0.5 = 0.1 is an orange-ish red
        assert_color_eq(magnitude_color(1.0), Color::new(1.0, 0.6, 0.0));
    }

    #[test]
    fn hex_channels() {
        assert_color_eq(Color::from_hex(0xffff00), Color::new(1.0, 1.0, 0.0));
        assert_color_eq(Color::from_hex(0x000080), Color::new(0.0, 0.0, 128.0 / 255.0));
    }
}
