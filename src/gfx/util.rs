//! Small helpers used across the renderer.

use crate::assets::TextureCPU;

/// Clamp `width`/`height` to `max_dim` while preserving aspect ratio.
pub fn scale_to_max((w0, h0): (u32, u32), max_dim: u32) -> (u32, u32) {
    let (mut w, mut h) = (w0.max(1), h0.max(1));
    if w > max_dim || h > max_dim {
        let scale = (w as f32 / max_dim as f32).max(h as f32 / max_dim as f32);
        w = ((w as f32 / scale).floor() as u32).clamp(1, max_dim);
        h = ((h as f32 / scale).floor() as u32).clamp(1, max_dim);
    }
    (w, h)
}

/// Create a depth texture view sized to the current surface.
pub fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth-texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Create the shadow map: a depth texture both rendered to and sampled.
pub fn create_shadow_map(device: &wgpu::Device, size: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("shadow-map"),
        size: wgpu::Extent3d {
            width: size.max(1),
            height: size.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Upload RGBA8 CPU pixels as a 2D texture.
pub fn create_color_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    tex: &TextureCPU,
    label: &str,
) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: tex.width,
        height: tex.height,
        depth_or_array_layers: 1,
    };
    let format = if tex.srgb {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let obj = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &obj,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &tex.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * tex.width),
            rows_per_image: Some(tex.height),
        },
        size,
    );
    obj.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Upload six RGBA8 faces (+X, -X, +Y, -Y, +Z, -Z) as a cube texture.
///
/// All faces must share the first face's dimensions; a mismatched face is
/// replaced by the first (logged), so a broken skybox degrades rather than
/// aborts.
pub fn create_cube_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    faces: &[TextureCPU; 6],
) -> wgpu::TextureView {
    let (w, h) = (faces[0].width, faces[0].height);
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("skybox-cube"),
        size: wgpu::Extent3d {
            width: w,
            height: h,
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
        let pixels: std::borrow::Cow<'_, [u8]> =
            if face.width == w && face.height == h {
                std::borrow::Cow::Borrowed(&face.pixels)
            } else {
                log::warn!(
                    "skybox face {layer} is {}x{}, expected {w}x{h}; substituting face 0",
                    face.width,
                    face.height
                );
                std::borrow::Cow::Borrowed(&faces[0].pixels)
            };
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &tex,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }
    tex.create_view(&wgpu::TextureViewDescriptor {
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_to_max_preserves_small_sizes_exactly() {
        assert_eq!(scale_to_max((800, 600), 2048), (800, 600));
        assert_eq!(scale_to_max((2048, 2048), 2048), (2048, 2048));
    }

    #[test]
    fn scale_to_max_clamps_keeping_aspect() {
        let (w, h) = scale_to_max((4096, 2048), 2048);
        assert!(w <= 2048 && h <= 2048);
        let aspect = w as f32 / h as f32;
        assert!((aspect - 2.0).abs() < 0.01, "aspect drifted: {aspect}");
    }

    #[test]
    fn scale_to_max_never_returns_zero() {
        assert_eq!(scale_to_max((0, 0), 2048), (1, 1));
    }
}
