//! Texture decode and upload.

use image::DynamicImage;
use std::path::Path;

/// Errors from decoding an image file into texel data.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        source: image::ImageError,
    },

    #[error("unsupported channel count {channels} (expected 1, 3, or 4)")]
    UnsupportedChannels { channels: u8 },
}

/// Convert a decoded image to RGBA texel data, accepting only 1-, 3-,
/// and 4-channel sources. Gray is replicated, RGB padded with opaque
/// alpha; GPU upload is always `Rgba8UnormSrgb`.
pub fn to_rgba_texels(image: &DynamicImage) -> Result<image::RgbaImage, TextureError> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
            Ok(image.to_rgba8())
        }
        other => Err(TextureError::UnsupportedChannels {
            channels: other.color().channel_count(),
        }),
    }
}

/// A sampled 2D texture with a ready-to-bind bind group.
///
/// Each celestial body owns its own `Texture`; two bodies loading the
/// same path still get independent GPU objects.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

impl Texture {
    /// Load a texture from an image file, flipped vertically so the UV
    /// origin matches the mesh convention. Any failure logs a diagnostic
    /// and substitutes a 1x1 white fallback; loading never aborts setup.
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        path: impl AsRef<Path>,
    ) -> Self {
        let path = path.as_ref();
        match Self::try_load(device, queue, layout, path) {
            Ok(texture) => texture,
            Err(e) => {
                log::error!("texture load failed: {}", e);
                Self::white_pixel(device, queue, layout)
            }
        }
    }

    fn try_load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| TextureError::Decode {
            path: path.display().to_string(),
            source,
        })?;
        let rgba = to_rgba_texels(&image.flipv())?;
        let (width, height) = rgba.dimensions();
        log::info!("loaded texture {:?} ({}x{})", path, width, height);
        Ok(Self::from_rgba(
            device,
            queue,
            layout,
            &rgba,
            width,
            height,
            &path.display().to_string(),
        ))
    }

    /// A 1x1 opaque white texture, used as the fallback for failed loads.
    pub fn white_pixel(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self::from_rgba(device, queue, layout, &[255, 255, 255, 255], 1, 1, "White Pixel")
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        texels: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            sampler,
            bind_group,
        }
    }
}

/// Depth attachment for the scene pass.
pub struct DepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

    #[test]
    fn gray_and_rgb_expand_to_rgba() {
        let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, image::Luma([128])));
        let rgba = to_rgba_texels(&gray).unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [128, 128, 128, 255]);

        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, image::Rgb([10, 20, 30])));
        let rgba = to_rgba_texels(&rgb).unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn rgba_passes_through() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 4])));
        let rgba = to_rgba_texels(&img).unwrap();
        assert_eq!(rgba.get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn two_channel_images_are_rejected() {
        let img = DynamicImage::ImageLumaA8(image::GrayAlphaImage::from_pixel(
            1,
            1,
            image::LumaA([7, 9]),
        ));
        match to_rgba_texels(&img) {
            Err(TextureError::UnsupportedChannels { channels }) => assert_eq!(channels, 2),
            other => panic!("expected UnsupportedChannels, got {:?}", other.map(|_| ())),
        }
    }
}
