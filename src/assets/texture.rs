//! Texture decoding to RGBA8 CPU pixels.

use anyhow::{Context, Result};
use std::path::Path;

use crate::assets::TextureCPU;

/// Decode an image file into RGBA8 pixels.
pub fn load_texture(path: &Path, srgb: bool) -> Result<TextureCPU> {
    let img = image::open(path)
        .with_context(|| format!("decode texture: {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(TextureCPU {
        pixels: img.into_raw(),
        width,
        height,
        srgb,
    })
}

/// A 1x1 white texture used when a real one is unavailable.
pub fn white_fallback() -> TextureCPU {
    TextureCPU {
        pixels: vec![255, 255, 255, 255],
        width: 1,
        height: 1,
        srgb: true,
    }
}

/// Decode a texture, substituting a 1x1 white fallback on failure so startup
/// still succeeds with the visual element simply untextured.
pub fn load_texture_or_fallback(path: &Path, srgb: bool) -> TextureCPU {
    match load_texture(path, srgb) {
        Ok(tex) => tex,
        Err(e) => {
            log::warn!("{e:#}; using 1x1 fallback");
            white_fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_single_white_pixel() {
        let tex = white_fallback();
        assert_eq!((tex.width, tex.height), (1, 1));
        assert_eq!(tex.pixels, vec![255, 255, 255, 255]);
    }

    #[test]
    fn missing_texture_falls_back() {
        let tex = load_texture_or_fallback(Path::new("assets/img/definitely_missing.jpg"), true);
        assert_eq!((tex.width, tex.height), (1, 1));
    }
}
