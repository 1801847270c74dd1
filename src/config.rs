//! Scene configuration loaded from data/scene.json.
//!
//! Defaults carry the scene's fixed parameters (camera pose, fog, light and
//! shadow volume, object placements). A JSON file under `data/` can override
//! any of them; a missing file just means defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraCfg {
    pub fov_deg: f32,
    pub znear: f32,
    pub zfar: f32,
    pub eye: [f32; 3],
}

impl Default for CameraCfg {
    fn default() -> Self {
        Self {
            fov_deg: 45.0,
            znear: 0.1,
            zfar: 500.0,
            eye: [10.0, 20.0, 100.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FogCfg {
    pub color: [f32; 3],
    pub density: f32,
}

impl Default for FogCfg {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            density: 0.01,
        }
    }
}

/// Directional light plus the fixed orthographic volume its shadow map covers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightCfg {
    pub position: [f32; 3],
    pub intensity: f32,
    pub ambient: f32,
    pub shadow_map_size: u32,
    pub shadow_left: f32,
    pub shadow_right: f32,
    pub shadow_top: f32,
    pub shadow_bottom: f32,
    pub shadow_near: f32,
    pub shadow_far: f32,
}

impl Default for LightCfg {
    fn default() -> Self {
        Self {
            position: [-10.0, 10.0, 20.0],
            intensity: 1.0,
            ambient: 0.25,
            shadow_map_size: 1048,
            shadow_left: -80.0,
            shadow_right: 80.0,
            shadow_top: 35.0,
            shadow_bottom: -35.0,
            shadow_near: 0.5,
            shadow_far: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroundCfg {
    pub extent: f32,
    pub texture: String,
    pub uv_repeat: f32,
    pub position: [f32; 3],
}

impl Default for GroundCfg {
    fn default() -> Self {
        Self {
            extent: 40.0,
            texture: "assets/img/asphalt2.jpg".into(),
            uv_repeat: 2.0,
            position: [0.0, 0.0, -20.0],
        }
    }
}

/// Placement of one externally authored model.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementCfg {
    pub path: String,
    pub scale: f32,
    pub position: [f32; 3],
    #[serde(default)]
    pub receive_shadow: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SphereCfg {
    pub texture: String,
    pub position: [f32; 3],
}

impl Default for SphereCfg {
    fn default() -> Self {
        Self {
            texture: "assets/img/knitting.jpg".into(),
            position: [8.0, 1.0, -3.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SoundCfg {
    pub path: String,
    pub volume: f32,
}

impl Default for SoundCfg {
    fn default() -> Self {
        Self {
            path: "assets/sounds/Loyalty_Freak_Music_-_04_-_Hello_Regan_.mp3".into(),
            volume: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraCfg,
    pub fog: FogCfg,
    pub light: LightCfg,
    pub ground: GroundCfg,
    pub house: PlacementCfg,
    pub alien: PlacementCfg,
    pub cat: PlacementCfg,
    pub skeleton: PlacementCfg,
    pub sphere: SphereCfg,
    pub sound: SoundCfg,
    pub skybox: [String; 6],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraCfg::default(),
            fog: FogCfg::default(),
            light: LightCfg::default(),
            ground: GroundCfg::default(),
            house: PlacementCfg {
                path: "assets/models/house/scene.gltf".into(),
                scale: 2.5,
                position: [4.0, 0.0, 6.0],
                receive_shadow: true,
            },
            alien: PlacementCfg {
                path: "assets/models/alien/scene.gltf".into(),
                scale: 1.2,
                position: [-5.0, 2.0, -6.0],
                receive_shadow: false,
            },
            cat: PlacementCfg {
                path: "assets/models/cat/scene.gltf".into(),
                scale: 0.02,
                position: [6.0, 2.0, -6.0],
                receive_shadow: false,
            },
            skeleton: PlacementCfg {
                path: "assets/models/sceleton/scene.gltf".into(),
                scale: 1.2,
                position: [0.0, 1.0, -5.0],
                receive_shadow: true,
            },
            sphere: SphereCfg::default(),
            sound: SoundCfg::default(),
            skybox: [
                "assets/img/cube2/grouse_ft.jpg".into(),
                "assets/img/cube2/grouse_bk.jpg".into(),
                "assets/img/cube2/grouse_up.jpg".into(),
                "assets/img/cube2/grouse_dn.jpg".into(),
                "assets/img/cube2/grouse_rt.jpg".into(),
                "assets/img/cube2/grouse_lf.jpg".into(),
            ],
        }
    }
}

fn data_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Parse a config from JSON text.
pub fn parse(txt: &str) -> Result<SceneConfig> {
    serde_json::from_str(txt).context("parse scene config JSON")
}

/// Load `data/scene.json` if present, defaults otherwise.
pub fn load_or_default() -> SceneConfig {
    let path = data_root().join("scene.json");
    if !path.is_file() {
        log::info!("no {} — using built-in scene config", path.display());
        return SceneConfig::default();
    }
    match std::fs::read_to_string(&path)
        .with_context(|| format!("read {}", path.display()))
        .and_then(|txt| parse(&txt))
    {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("scene config ignored ({e:#}); using defaults");
            SceneConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_constants() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.camera.fov_deg, 45.0);
        assert_eq!(cfg.camera.eye, [10.0, 20.0, 100.0]);
        assert_eq!(cfg.light.shadow_map_size, 1048);
        assert_eq!(cfg.ground.position, [0.0, 0.0, -20.0]);
        assert_eq!(cfg.cat.scale, 0.02);
        assert_eq!(cfg.skybox.len(), 6);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = parse(r#"{ "fog": { "density": 0.05 } }"#).expect("parse");
        assert_eq!(cfg.fog.density, 0.05);
        assert_eq!(cfg.fog.color, [1.0, 1.0, 1.0]);
        assert_eq!(cfg.camera.fov_deg, 45.0);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(parse("{ nope").is_err());
    }
}
