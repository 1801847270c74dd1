//! Skinned mesh and animation clip loading from glTF.

use anyhow::{bail, Context, Result};
use glam::{Mat4, Quat, Vec3};
use gltf::mesh::util::ReadIndices;
use std::collections::HashMap;
use std::path::Path;

use crate::assets::{AnimClip, SkinnedMeshCPU, TextureCPU, TrackQuat, TrackVec3, VertexSkinCPU};

pub fn load_gltf_skinned(path: &Path) -> Result<SkinnedMeshCPU> {
    let (doc, buffers, images) = gltf::import(path)
        .with_context(|| format!("import skinned glTF: {}", path.display()))?;

    // Parent map and base TRS
    let node_count = doc.nodes().len();
    let mut parent = vec![None; node_count];
    for n in doc.nodes() {
        for c in n.children() {
            parent[c.index()] = Some(n.index());
        }
    }
    let mut base_t = vec![Vec3::ZERO; node_count];
    let mut base_r = vec![Quat::IDENTITY; node_count];
    let mut base_s = vec![Vec3::ONE; node_count];
    for n in doc.nodes() {
        let (t, r, s) = decompose_node(&n);
        base_t[n.index()] = t;
        base_r[n.index()] = r;
        base_s[n.index()] = s;
    }

    // First mesh primitive with joints/weights, and its skin via the node
    let mut skin_opt: Option<gltf::Skin> = None;
    let mut verts: Vec<VertexSkinCPU> = Vec::new();
    let mut indices: Vec<u16> = Vec::new();

    'outer: for node in doc.nodes() {
        let Some(skin) = node.skin() else { continue };
        let Some(mesh) = node.mesh() else { continue };
        skin_opt = Some(skin);
        for prim in mesh.primitives() {
            let reader = prim.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
            let (Some(pos_it), Some(joints_it), Some(weights_it)) = (
                reader.read_positions(),
                reader.read_joints(0),
                reader.read_weights(0),
            ) else {
                continue;
            };
            let pos: Vec<[f32; 3]> = pos_it.collect();
            let nrm: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|it| it.collect())
                .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; pos.len()]);
            let uv_set = prim
                .material()
                .pbr_metallic_roughness()
                .base_color_texture()
                .map(|ti| ti.tex_coord())
                .unwrap_or(0);
            let uv: Vec<[f32; 2]> = match reader.read_tex_coords(uv_set) {
                Some(tc) => tc.into_f32().collect(),
                None => vec![[0.0, 0.0]; pos.len()],
            };
            let joints: Vec<[u16; 4]> = match joints_it {
                gltf::mesh::util::ReadJoints::U16(it) => it.collect(),
                gltf::mesh::util::ReadJoints::U8(it) => it
                    .map(|v| [v[0] as u16, v[1] as u16, v[2] as u16, v[3] as u16])
                    .collect(),
            };
            let weights: Vec<[f32; 4]> = match weights_it {
                gltf::mesh::util::ReadWeights::F32(it) => it.collect(),
                gltf::mesh::util::ReadWeights::U16(it) => it
                    .map(|v| v.map(|w| w as f32 / 65535.0))
                    .collect(),
                gltf::mesh::util::ReadWeights::U8(it) => {
                    it.map(|v| v.map(|w| w as f32 / 255.0)).collect()
                }
            };
            for i in 0..pos.len() {
                verts.push(VertexSkinCPU {
                    pos: pos[i],
                    nrm: nrm[i],
                    joints: joints[i],
                    weights: weights[i],
                    uv: uv[i],
                });
            }
            let idx_u32: Vec<u32> = match reader.read_indices() {
                Some(ReadIndices::U16(it)) => it.map(|v| v as u32).collect(),
                Some(ReadIndices::U32(it)) => it.collect(),
                Some(ReadIndices::U8(it)) => it.map(|v| v as u32).collect(),
                None => (0..pos.len() as u32).collect(),
            };
            for i in idx_u32 {
                if i > u16::MAX as u32 {
                    bail!("skinned indices exceed u16 in {}", path.display());
                }
                indices.push(i as u16);
            }
            break 'outer;
        }
    }

    if verts.is_empty() {
        bail!("no skinned primitive found in {}", path.display());
    }

    let skin = skin_opt.or_else(|| doc.skins().next());
    let (joints_nodes, inverse_bind) = match skin {
        Some(skin) => {
            let joints_nodes: Vec<usize> = skin.joints().map(|j| j.index()).collect();
            let rdr = skin.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
            let inverse_bind = match rdr.read_inverse_bind_matrices() {
                Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
                None => vec![Mat4::IDENTITY; joints_nodes.len()],
            };
            (joints_nodes, inverse_bind)
        }
        None => (vec![0usize], vec![Mat4::IDENTITY]),
    };

    // Animations: every clip, in document order
    let mut animations: Vec<AnimClip> = Vec::new();
    for anim in doc.animations() {
        let name = anim.name().unwrap_or("").to_string();
        let mut t_tracks: HashMap<usize, TrackVec3> = HashMap::new();
        let mut r_tracks: HashMap<usize, TrackQuat> = HashMap::new();
        let mut s_tracks: HashMap<usize, TrackVec3> = HashMap::new();
        let mut max_t = 0.0f32;
        for ch in anim.channels() {
            let target = ch.target();
            let node_idx = target.node().index();
            let rdr = ch.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
            let Some(inputs) = rdr.read_inputs() else {
                continue;
            };
            let times: Vec<f32> = inputs.collect();
            if let Some(&last) = times.last() {
                if last > max_t {
                    max_t = last;
                }
            }
            let Some(outs) = rdr.read_outputs() else {
                continue;
            };
            match outs {
                gltf::animation::util::ReadOutputs::Translations(it) => {
                    t_tracks.insert(
                        node_idx,
                        TrackVec3 {
                            times,
                            values: it.map(Vec3::from).collect(),
                        },
                    );
                }
                gltf::animation::util::ReadOutputs::Rotations(it) => {
                    r_tracks.insert(
                        node_idx,
                        TrackQuat {
                            times,
                            values: it
                                .into_f32()
                                .map(|v| Quat::from_xyzw(v[0], v[1], v[2], v[3]).normalize())
                                .collect(),
                        },
                    );
                }
                gltf::animation::util::ReadOutputs::Scales(it) => {
                    s_tracks.insert(
                        node_idx,
                        TrackVec3 {
                            times,
                            values: it.map(Vec3::from).collect(),
                        },
                    );
                }
                _ => {}
            }
        }
        animations.push(AnimClip {
            name,
            duration: max_t,
            t_tracks,
            r_tracks,
            s_tracks,
        });
    }

    // Base color texture (optional)
    let mut base_color_texture = None;
    let texinfo = doc
        .meshes()
        .next()
        .and_then(|m| m.primitives().next())
        .and_then(|p| p.material().pbr_metallic_roughness().base_color_texture());
    if let Some(texinfo) = texinfo {
        let img_idx = texinfo.texture().source().index();
        if let Some(img) = images.get(img_idx) {
            match rgba8_pixels(img.format, &img.pixels) {
                Some(pixels) => {
                    base_color_texture = Some(TextureCPU {
                        pixels,
                        width: img.width,
                        height: img.height,
                        srgb: true,
                    });
                }
                None => {
                    log::warn!(
                        "unsupported base color format {:?} in {}; rendering untextured",
                        img.format,
                        path.display()
                    );
                }
            }
        }
    }

    Ok(SkinnedMeshCPU {
        vertices: verts,
        indices,
        joints_nodes,
        inverse_bind,
        parent,
        base_t,
        base_r,
        base_s,
        animations,
        base_color_texture,
    })
}

/// Expand decoded glTF pixels to tightly packed RGBA8.
///
/// Returns `None` for formats with no lossless byte-wise expansion (16- and
/// 32-bit channels); callers treat that as "no texture" rather than uploading
/// a buffer whose stride does not match what the GPU copy expects.
fn rgba8_pixels(format: gltf::image::Format, pixels: &[u8]) -> Option<Vec<u8>> {
    use gltf::image::Format;
    match format {
        Format::R8G8B8A8 => Some(pixels.to_vec()),
        Format::R8G8B8 => Some(
            pixels
                .chunks_exact(3)
                .flat_map(|c| [c[0], c[1], c[2], 255])
                .collect(),
        ),
        // two channels decode from gray+alpha images
        Format::R8G8 => Some(
            pixels
                .chunks_exact(2)
                .flat_map(|c| [c[0], c[0], c[0], c[1]])
                .collect(),
        ),
        Format::R8 => Some(pixels.iter().flat_map(|&r| [r, r, r, 255]).collect()),
        _ => None,
    }
}

fn decompose_node(n: &gltf::Node) -> (Vec3, Quat, Vec3) {
    use gltf::scene::Transform;
    match n.transform() {
        Transform::Matrix { matrix } => {
            let m = Mat4::from_cols_array_2d(&matrix);
            let (s, r, t) = m.to_scale_rotation_translation();
            (t, r, s)
        }
        Transform::Decomposed {
            translation,
            rotation,
            scale,
        } => (
            Vec3::from(translation),
            Quat::from_array(rotation).normalize(),
            Vec3::from(scale),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_gltf_skinned(Path::new("assets/models/nope/scene.gltf")).is_err());
    }

    #[test]
    fn narrow_formats_expand_to_rgba8() {
        use gltf::image::Format;
        assert_eq!(
            rgba8_pixels(Format::R8G8B8, &[1, 2, 3, 4, 5, 6]),
            Some(vec![1, 2, 3, 255, 4, 5, 6, 255])
        );
        assert_eq!(
            rgba8_pixels(Format::R8G8, &[7, 128]),
            Some(vec![7, 7, 7, 128])
        );
        assert_eq!(rgba8_pixels(Format::R8, &[9]), Some(vec![9, 9, 9, 255]));
        let four = rgba8_pixels(Format::R8G8B8A8, &[1, 2, 3, 4]);
        assert_eq!(four, Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn wide_formats_are_rejected_not_mis_sized() {
        use gltf::image::Format;
        assert_eq!(rgba8_pixels(Format::R16, &[0, 1]), None);
        assert_eq!(rgba8_pixels(Format::R16G16B16A16, &[0; 8]), None);
        assert_eq!(rgba8_pixels(Format::R32G32B32A32FLOAT, &[0; 16]), None);
    }
}
