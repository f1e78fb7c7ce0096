use std::path::Path;

use anyhow::{bail, Context};

use crate::{model::ImageData, rendering::common::Resolution};

/// Faces of a cube map in wgpu layer order.
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

pub struct Texture {
    _texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl Texture {
    pub fn from_wgpu_texture(texture: wgpu::Texture) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            _texture: texture,
            view,
        }
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &ImageData,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                // TODO: Generate mipmaps
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::wgt::TextureDataOrder::default(),
            &image.pixels,
        );

        Self::from_wgpu_texture(texture)
    }

    /// 1x1 white texture for materials without a map.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let image = ImageData {
            width: 1,
            height: 1,
            pixels: vec![255; 4],
        };
        Self::from_image(device, queue, &image, "White Texture")
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

pub struct CubeTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl CubeTexture {
    /// Loads `px.jpg` .. `nz.jpg` from `dir`.
    pub fn load(device: &wgpu::Device, queue: &wgpu::Queue, dir: &Path) -> anyhow::Result<Self> {
        let faces = CUBE_FACES
            .iter()
            .map(|face| ImageData::load(dir.join(format!("{face}.jpg"))))
            .collect::<anyhow::Result<Vec<_>>>()
            .with_context(|| format!("Failed to load cube map {}", dir.display()))?;

        let (width, height) = (faces[0].width, faces[0].height);
        if faces.iter().any(|face| face.width != width || face.height != height) {
            bail!("Cube map faces in {} differ in size", dir.display());
        }

        let label = format!("Cube map ({})", dir.display());
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in faces.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &face.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            array_layer_count: Some(6),
            ..Default::default()
        });

        Ok(Self {
            _texture: texture,
            view,
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

pub struct DepthTexture {
    texture: Texture,
    label: String,
}

impl DepthTexture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, size: Resolution, label: impl Into<String>) -> Self {
        let label: String = label.into();
        let texture = Self::create_wgpu_texture(device, size, &label);

        DepthTexture {
            texture: Texture::from_wgpu_texture(texture),
            label,
        }
    }

    fn create_wgpu_texture(device: &wgpu::Device, size: Resolution, label: &str) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };

        let descriptor = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        device.create_texture(&descriptor)
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: Resolution) {
        self.texture = Texture::from_wgpu_texture(Self::create_wgpu_texture(device, size, &self.label));
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }
}
