//! Procedural meshes (ground plane, sphere) and GPU upload.

use wgpu::util::DeviceExt;

use crate::assets::CpuMesh;
use crate::gfx::types::Vertex;

/// A mesh uploaded to GPU buffers.
pub struct GpuMesh {
    pub vbuf: wgpu::Buffer,
    pub ibuf: wgpu::Buffer,
    pub index_count: u32,
}

pub fn upload(device: &wgpu::Device, mesh: &CpuMesh, label: &str) -> GpuMesh {
    let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}-vb")),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ibuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label}-ib")),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });
    GpuMesh {
        vbuf,
        ibuf,
        index_count: mesh.indices.len() as u32,
    }
}

/// Horizontal square plane spanning `[-extent, extent]` on X/Z, facing +Y.
///
/// UVs run `[0, uv_repeat]` across the plane so the material tiles.
pub fn plane(extent: f32, uv_repeat: f32) -> CpuMesh {
    let e = extent;
    let r = uv_repeat;
    let vertices = vec![
        Vertex { pos: [-e, 0.0, -e], nrm: [0.0, 1.0, 0.0], uv: [0.0, 0.0] },
        Vertex { pos: [e, 0.0, -e], nrm: [0.0, 1.0, 0.0], uv: [r, 0.0] },
        Vertex { pos: [e, 0.0, e], nrm: [0.0, 1.0, 0.0], uv: [r, r] },
        Vertex { pos: [-e, 0.0, e], nrm: [0.0, 1.0, 0.0], uv: [0.0, r] },
    ];
    let indices = vec![0, 2, 1, 0, 3, 2];
    CpuMesh { vertices, indices }
}

/// Unit-ish UV sphere (latitude/longitude bands).
pub fn sphere(radius: f32, sectors: u32, stacks: u32) -> CpuMesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);
    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = std::f32::consts::PI * v; // 0 at the north pole
        let (sp, cp) = phi.sin_cos();
        for j in 0..=sectors {
            let u = j as f32 / sectors as f32;
            let theta = std::f32::consts::TAU * u;
            let (st, ct) = theta.sin_cos();
            let n = [sp * ct, cp, sp * st];
            vertices.push(Vertex {
                pos: [n[0] * radius, n[1] * radius, n[2] * radius],
                nrm: n,
                uv: [u, v],
            });
        }
    }
    let mut indices = Vec::with_capacity((stacks * sectors * 6) as usize);
    let ring = sectors + 1;
    for i in 0..stacks {
        for j in 0..sectors {
            let a = (i * ring + j) as u16;
            let b = a + ring as u16;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    CpuMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_spans_extent_and_tiles_uv() {
        let m = plane(40.0, 2.0);
        assert_eq!(m.vertices.len(), 4);
        assert_eq!(m.indices.len(), 6);
        let max_x = m.vertices.iter().map(|v| v.pos[0]).fold(f32::MIN, f32::max);
        assert_eq!(max_x, 40.0);
        let max_u = m.vertices.iter().map(|v| v.uv[0]).fold(f32::MIN, f32::max);
        assert_eq!(max_u, 2.0);
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let m = sphere(1.5, 24, 16);
        for v in &m.vertices {
            let len = (v.pos[0] * v.pos[0] + v.pos[1] * v.pos[1] + v.pos[2] * v.pos[2]).sqrt();
            assert!((len - 1.5).abs() < 1e-4, "vertex off the sphere: {len}");
        }
    }

    #[test]
    fn sphere_indices_are_in_range() {
        let m = sphere(1.0, 24, 16);
        let n = m.vertices.len() as u16;
        assert!(m.indices.iter().all(|&i| i < n));
        assert_eq!(m.indices.len() % 3, 0);
    }

    #[test]
    fn sphere_normals_are_unit_and_outward() {
        let m = sphere(2.0, 12, 8);
        for v in &m.vertices {
            let n = glam::Vec3::from_array(v.nrm);
            assert!((n.length() - 1.0).abs() < 1e-4);
            let p = glam::Vec3::from_array(v.pos);
            assert!(n.dot(p) > 0.0 || p.length() < 1e-6);
        }
    }
}
