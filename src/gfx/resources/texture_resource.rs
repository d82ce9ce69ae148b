//! Texture resource management for wgpu
//!
//! Creates GPU textures, views and samplers for the depth buffer, 2D
//! material textures and six-face environment cubemaps. Images are decoded
//! with the `image` crate and converted to RGBA8 regardless of channel count.

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::AssetError;

/// Cubemap face file stems in layer order (+X, -X, +Y, -Y, +Z, -Z)
pub const CUBEMAP_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

/// GPU texture resource containing texture, view, and sampler
#[derive(Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Number of mip levels for a full chain down to 1x1
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Decodes an image file into RGBA8
pub fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the six cubemap faces from `dir`, substituting missing ones
///
/// Faces that fail to load are logged and replaced by a solid image the
/// size of the first face that did load, filled with `fallback_color`.
///
/// # Errors
/// [`AssetError::Cubemap`] when no face loads at all
pub fn load_cubemap_faces(
    dir: &Path,
    extension: &str,
    fallback_color: [u8; 4],
) -> Result<[RgbaImage; 6], AssetError> {
    let loaded: Vec<Option<RgbaImage>> = CUBEMAP_FACES
        .iter()
        .map(|face| {
            let path: PathBuf = dir.join(format!("{face}{extension}"));
            load_rgba(&path)
                .map_err(|err| log::error!("cubemap face failed: {err}"))
                .ok()
        })
        .collect();

    let Some(reference) = loaded.iter().flatten().next() else {
        return Err(AssetError::Cubemap {
            dir: dir.to_path_buf(),
        });
    };
    let (width, height) = reference.dimensions();

    let faces: Vec<RgbaImage> = loaded
        .iter()
        .map(|face| match face {
            Some(img) if img.dimensions() == (width, height) => img.clone(),
            Some(img) => image::imageops::resize(
                img,
                width,
                height,
                image::imageops::FilterType::Triangle,
            ),
            None => RgbaImage::from_pixel(width, height, image::Rgba(fallback_color)),
        })
        .collect();

    faces.try_into().map_err(|_| AssetError::Cubemap {
        dir: dir.to_path_buf(),
    })
}

impl TextureResource {
    /// Standard depth buffer format used throughout the renderer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `config` - Surface configuration to match dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    fn clamp_sampler(device: &wgpu::Device, label: &str, mipmapped: bool) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: if mipmapped {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            ..Default::default()
        })
    }

    /// Creates a mipmapped 2D texture from an RGBA image
    ///
    /// Mip levels are generated on the CPU with a triangle filter.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        let mip_levels = mip_level_count(width, height);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut level_image = image.clone();
        for level in 0..mip_levels {
            if level > 0 {
                let (w, h) = level_image.dimensions();
                level_image = image::imageops::resize(
                    &level_image,
                    (w / 2).max(1),
                    (h / 2).max(1),
                    image::imageops::FilterType::Triangle,
                );
            }
            Self::write_layer(queue, &texture, &level_image, level, 0);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Self::clamp_sampler(device, label, true);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Loads a 2D texture from an image file
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, AssetError> {
        let image = load_rgba(path)?;
        let label = path.display().to_string();
        log::info!("loaded texture '{}' ({}x{})", label, image.width(), image.height());
        Ok(Self::from_image(device, queue, &image, &label))
    }

    /// 1x1 texture of a single color
    pub fn solid_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        label: &str,
    ) -> Self {
        Self::from_image(device, queue, &RgbaImage::from_pixel(1, 1, image::Rgba(color)), label)
    }

    /// Creates a cubemap from six equally sized faces
    pub fn cubemap_from_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[RgbaImage; 6],
        label: &str,
    ) -> Self {
        let (width, height) = faces[0].dimensions();

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, face) in faces.iter().enumerate() {
            Self::write_layer(queue, &texture, face, 0, layer as u32);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(&format!("{} View", label)),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = Self::clamp_sampler(device, label, false);

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Loads `right`, `left`, `top`, `bottom`, `front`, `back` + `extension`
    pub fn cubemap_from_dir(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        dir: &Path,
        extension: &str,
        fallback_color: [u8; 4],
    ) -> Result<Self, AssetError> {
        let faces = load_cubemap_faces(dir, extension, fallback_color)?;
        log::info!(
            "created cubemap from '{}' ({}x{} per face)",
            dir.display(),
            faces[0].width(),
            faces[0].height()
        );
        Ok(Self::cubemap_from_faces(device, queue, &faces, &dir.display().to_string()))
    }

    /// 1x1 cubemap of a single color
    pub fn solid_cubemap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color: [u8; 4],
        label: &str,
    ) -> Self {
        let face = RgbaImage::from_pixel(1, 1, image::Rgba(color));
        let faces = [
            face.clone(),
            face.clone(),
            face.clone(),
            face.clone(),
            face.clone(),
            face,
        ];
        Self::cubemap_from_faces(device, queue, &faces, label)
    }

    fn write_layer(
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
        image: &RgbaImage,
        mip_level: u32,
        layer: u32,
    ) {
        let (width, height) = image.dimensions();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer,
                },
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_level_count() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 64), 9);
        assert_eq!(mip_level_count(300, 10), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn test_cubemap_from_missing_dir_fails() {
        let result = load_cubemap_faces(Path::new("no/such/sky"), ".bmp", [0, 0, 0, 255]);
        assert!(matches!(result, Err(AssetError::Cubemap { .. })));
    }

    #[test]
    fn test_cubemap_fills_missing_faces() {
        let dir = std::env::temp_dir().join(format!("oceansim-sky-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        RgbaImage::from_pixel(4, 4, image::Rgba([10, 20, 30, 255]))
            .save(dir.join("top.png"))
            .expect("write face");

        let faces = load_cubemap_faces(&dir, ".png", [1, 2, 3, 255]).expect("one face loads");
        assert_eq!(faces[2].get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(faces[0].dimensions(), (4, 4));
        assert_eq!(faces[5].get_pixel(3, 3).0, [1, 2, 3, 255]);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
