//! Vertex types and the built-in meshes: triangle, cube, box and sphere.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::PI;

/// Position-only vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

/// Position + texture coordinate, used by the cube samples
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Position + normal + texture coordinate, used by the lit samples
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[cfg(feature = "webgpu")]
impl PositionVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(feature = "webgpu")]
impl TexturedVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(feature = "webgpu")]
impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed mesh with 16-bit indices
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

pub fn triangle() -> [PositionVertex; 3] {
    [
        PositionVertex {
            position: [0.0, 0.5, 0.0],
        },
        PositionVertex {
            position: [-0.5, -0.5, 0.0],
        },
        PositionVertex {
            position: [0.5, -0.5, 0.0],
        },
    ]
}

// (normal, u axis, v axis) with u x v == normal, so corners wind CCW from outside
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

const QUAD_CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

fn face_vertices(half: f32) -> impl Iterator<Item = MeshVertex> {
    CUBE_FACES.into_iter().flat_map(move |(n, u, v)| {
        QUAD_CORNERS.into_iter().map(move |(s, t)| MeshVertex {
            position: ((n + u * s + v * t) * half).to_array(),
            normal: n.to_array(),
            uv: [(s + 1.0) * 0.5, 1.0 - (t + 1.0) * 0.5],
        })
    })
}

/// Unit-extent cube (corners at +-1) as 36 non-indexed vertices
pub fn cube() -> Vec<TexturedVertex> {
    let corners: Vec<MeshVertex> = face_vertices(1.0).collect();
    corners
        .chunks(4)
        .flat_map(|quad| {
            QUAD_INDICES.iter().map(move |&i| TexturedVertex {
                position: quad[i as usize].position,
                uv: quad[i as usize].uv,
            })
        })
        .collect()
}

/// Cube with per-face normals (corners at +-0.5)
pub fn box_mesh() -> Mesh {
    let vertices: Vec<MeshVertex> = face_vertices(0.5).collect();
    let indices = (0..CUBE_FACES.len() as u16)
        .flat_map(|face| QUAD_INDICES.iter().map(move |i| face * 4 + i))
        .collect();
    Mesh { vertices, indices }
}

/// Segments per axis that keep every sphere vertex addressable by a `u16` index
pub const SPHERE_MAX_SEGMENTS: u16 = 255;

/// UV sphere, segment counts clamped to `3..=255` around and `2..=255` top to bottom
pub fn sphere(radius: f32, width_segments: u16, height_segments: u16) -> Mesh {
    let w = width_segments.clamp(3, SPHERE_MAX_SEGMENTS) as u32;
    let h = height_segments.clamp(2, SPHERE_MAX_SEGMENTS) as u32;
    let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let theta = v * PI;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let phi = u * 2.0 * PI;
            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(MeshVertex {
                position: (normal * radius).to_array(),
                normal: normal.to_array(),
                uv: [u, 1.0 - v],
            });
        }
    }

    // (255 + 1)^2 vertices, so every index below fits in u16
    let row = w + 1;
    let mut indices: Vec<u16> = Vec::with_capacity((w * h * 6) as usize);
    for iy in 0..h {
        for ix in 0..w {
            let a = (iy * row + ix + 1) as u16;
            let b = (iy * row + ix) as u16;
            let c = ((iy + 1) * row + ix) as u16;
            let d = ((iy + 1) * row + ix + 1) as u16;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh { vertices, indices }
}

/// RGBA8 checkerboard used by the textured cube
pub fn checkerboard(size: u32, cells: u32) -> Vec<u8> {
    let cell = (size / cells.max(1)).max(1);
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if ((x / cell) + (y / cell)) % 2 == 0 {
                [235, 235, 235, 255]
            } else {
                [40, 90, 160, 255]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winding(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Vec3 {
        let (a, b, c) = (Vec3::from(a), Vec3::from(b), Vec3::from(c));
        (b - a).cross(c - a)
    }

    #[test]
    fn cube_has_36_outward_facing_vertices() {
        let cube = cube();
        assert_eq!(cube.len(), 36);
        for tri in cube.chunks(3) {
            let n = winding(tri[0].position, tri[1].position, tri[2].position);
            let center = (Vec3::from(tri[0].position) + Vec3::from(tri[1].position) + Vec3::from(tri[2].position)) / 3.0;
            assert!(n.dot(center) > 0.0, "triangle faces inward");
        }
    }

    #[test]
    fn box_indices_stay_in_range() {
        let mesh = box_mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            assert!((p.abs().max_element() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = sphere(2.0, 16, 12);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        assert_eq!(mesh.indices.len() % 3, 0);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let mesh = sphere(1.0, 16, 16);
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize].position);
            let n = winding(a, b, c);
            let center = Vec3::from(a) + Vec3::from(b) + Vec3::from(c);
            assert!(n.dot(center) >= 0.0);
        }
    }

    #[test]
    fn largest_sphere_indices_fit_u16() {
        let mesh = sphere(1.0, 255, 255);
        assert_eq!(mesh.vertices.len(), 256 * 256);
        let max = mesh.indices.iter().copied().max().unwrap();
        assert_eq!(max as usize, mesh.vertices.len() - 1);
    }

    #[test]
    fn sphere_segments_are_clamped() {
        let mesh = sphere(1.0, u16::MAX, 1000);
        assert_eq!(mesh.vertices.len(), 256 * 256);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));

        let mesh = sphere(1.0, 0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let pixels = checkerboard(4, 2);
        assert_eq!(pixels.len(), 4 * 4 * 4);
        assert_ne!(pixels[0..4], pixels[2 * 4..3 * 4]);
        assert_eq!(pixels[0..4], pixels[(2 * 4 + 2) * 4..(2 * 4 + 3) * 4]);
    }
}
