//! Asset system (CPU-side): glTF meshes, skinned meshes, textures.
//!
//! Loaders here produce CPU-side data the renderer uploads to GPU buffers.
//! All asset paths are fixed relative paths under the crate root; assets are
//! external resources, never embedded.

mod gltf;
pub mod load;
mod skinning;
mod texture;

pub use gltf::load_gltf_mesh;
pub use skinning::load_gltf_skinned;
pub use texture::{load_texture, load_texture_or_fallback, white_fallback};

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::gfx::Vertex;

/// Resolve a path relative to the crate root.
pub fn asset_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(rel)
}

/// CPU-side mesh ready to be uploaded to GPU.
pub struct CpuMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

#[derive(Clone)]
pub struct VertexSkinCPU {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
    pub joints: [u16; 4],
    pub weights: [f32; 4],
    pub uv: [f32; 2],
}

#[derive(Clone)]
pub struct TrackVec3 {
    pub times: Vec<f32>,
    pub values: Vec<Vec3>,
}

#[derive(Clone)]
pub struct TrackQuat {
    pub times: Vec<f32>,
    pub values: Vec<Quat>,
}

/// One animation clip as per-node keyframe tracks.
#[derive(Clone)]
pub struct AnimClip {
    pub name: String,
    pub duration: f32,
    pub t_tracks: HashMap<usize, TrackVec3>,
    pub r_tracks: HashMap<usize, TrackQuat>,
    pub s_tracks: HashMap<usize, TrackVec3>,
}

/// RGBA8 pixels decoded on the CPU.
pub struct TextureCPU {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub srgb: bool,
}

pub struct SkinnedMeshCPU {
    pub vertices: Vec<VertexSkinCPU>,
    pub indices: Vec<u16>,
    pub joints_nodes: Vec<usize>,
    pub inverse_bind: Vec<Mat4>,
    pub parent: Vec<Option<usize>>, // node parent map
    pub base_t: Vec<Vec3>,
    pub base_r: Vec<Quat>,
    pub base_s: Vec<Vec3>,
    /// Clips in document order; the scene plays the first one.
    pub animations: Vec<AnimClip>,
    pub base_color_texture: Option<TextureCPU>,
}
