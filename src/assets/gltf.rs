//! Static glTF loading: all primitives of a file merged into one CPU mesh.
//!
//! Design notes
//! - We flatten all mesh primitives in the file into a single mesh by appending
//!   vertices and re-indexing; this keeps render wiring straightforward.
//! - Indices are converted to `u16`. If any index exceeds `u16::MAX`, loading
//!   fails with a clear error (the demo assets are expected to be small).
//! - Missing normals fall back to a constant up normal; missing texture
//!   coordinates fall back to zero (these models render untextured anyway).

use anyhow::{anyhow, bail, Context, Result};
use gltf::mesh::util::ReadIndices;
use std::path::Path;

use crate::assets::CpuMesh;
use crate::gfx::Vertex;

/// Load a `.gltf` file from disk and merge all primitives into a single mesh.
pub fn load_gltf_mesh(path: &Path) -> Result<CpuMesh> {
    let (doc, buffers, _images) = gltf::import(path)
        .with_context(|| format!("failed to import glTF: {}", path.display()))?;

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    for mesh in doc.meshes() {
        for prim in mesh.primitives() {
            let reader = prim.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
            let pos = match reader.read_positions() {
                Some(it) => it.collect::<Vec<[f32; 3]>>(),
                None => continue,
            };
            let nrm: Vec<[f32; 3]> = match reader.read_normals() {
                Some(it) => it.collect(),
                None => vec![[0.0, 1.0, 0.0]; pos.len()],
            };
            let uv: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(tc) => tc.into_f32().collect(),
                None => vec![[0.0, 0.0]; pos.len()],
            };

            let start = vertices.len() as u32;
            for i in 0..pos.len() {
                vertices.push(Vertex {
                    pos: pos[i],
                    nrm: nrm[i],
                    uv: uv[i],
                });
            }

            let indices_read: Vec<u32> = match reader.read_indices() {
                Some(ReadIndices::U16(it)) => it.map(|v| v as u32).collect(),
                Some(ReadIndices::U32(it)) => it.collect(),
                Some(ReadIndices::U8(it)) => it.map(|v| v as u32).collect(),
                None => {
                    // glTF primitive mode defaults to triangles; synthesize a list.
                    let added = pos.len();
                    if added % 3 != 0 {
                        bail!("primitive without indices has non-multiple-of-3 vertex count");
                    }
                    (0..added as u32).collect()
                }
            };
            for v in indices_read {
                let vv = start + v;
                indices.push(
                    u16::try_from(vv).map_err(|_| anyhow!("rebased index {} exceeds u16", vv))?,
                );
            }
        }
    }

    if vertices.is_empty() || indices.is_empty() {
        bail!("no geometry found in {}", path.display());
    }
    Ok(CpuMesh { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        let err = load_gltf_mesh(Path::new("assets/models/nope/scene.gltf"));
        assert!(err.is_err());
    }
}
