use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::core::block::BlockFace;

/// Unit cube corners.
const VOXEL_VERTS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Corners of each face, in [`BlockFace::ALL`] order.
const FACE_CORNERS: [[usize; 4]; 6] = [
    [0, 3, 1, 2], // Back
    [5, 6, 4, 7], // Front
    [3, 7, 2, 6], // Top
    [1, 5, 0, 4], // Bottom
    [4, 7, 0, 3], // Left
    [1, 2, 5, 6], // Right
];

fn face_index(face: BlockFace) -> usize {
    match face {
        BlockFace::Back => 0,
        BlockFace::Front => 1,
        BlockFace::Top => 2,
        BlockFace::Bottom => 3,
        BlockFace::Left => 4,
        BlockFace::Right => 5,
    }
}

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

/// Surface mesh of one chunk, as parallel attribute lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub normals: Vec<[f32; 3]>,
}

impl ChunkMesh {
    /// Append one quad for `face` of the voxel at `pos`.
    pub fn push_face(&mut self, pos: Vec3, face: BlockFace, uvs: [[f32; 2]; 4], light: f32) {
        let base_idx = self.vertices.len() as u32;
        let normal = face.normal();
        let color = [0.0, 0.0, 0.0, light];

        for (corner, uv) in FACE_CORNERS[face_index(face)].iter().zip(uvs) {
            let [x, y, z] = VOXEL_VERTS[*corner];
            self.vertices.push([pos.x + x, pos.y + y, pos.z + z]);
            self.normals.push(normal);
            self.uvs.push(uv);
            self.colors.push(color);
        }

        self.triangles.extend_from_slice(&[
            base_idx,
            base_idx + 1,
            base_idx + 2,
            base_idx + 2,
            base_idx + 1,
            base_idx + 3,
        ]);
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn interleaved(&self) -> Vec<Vertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .zip(&self.colors)
            .map(|(((position, normal), uv), color)| Vertex {
                position: *position,
                normal: *normal,
                uv: *uv,
                color: *color,
            })
            .collect()
    }
}
