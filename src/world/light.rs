//! Chunk lighting
//!
//! Light enters from the sky, is dimmed by every non-air block it passes
//! through on the way down, then spreads sideways with a fixed falloff per
//! step. Values only ever rise during a flood, so repeated passes converge.

use std::collections::VecDeque;

use glam::IVec3;

use crate::constants::*;
use crate::core::block::{BlockFace, BlockRegistry};
use crate::core::chunk::{Chunk, ChunkCoord, ChunkDims, VoxelSource};

/// Tolerance when comparing seam light against the neighbour's value.
const SEAM_EPSILON: f32 = 1e-4;

/// The four horizontal faces a chunk shares with its neighbours.
const SEAM_FACES: [BlockFace; 4] = [
    BlockFace::Back,
    BlockFace::Front,
    BlockFace::Left,
    BlockFace::Right,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightPropagator {
    pub falloff: f32,
    pub cross_chunk: bool,
}

impl Default for LightPropagator {
    fn default() -> Self {
        LightPropagator {
            falloff: LIGHT_FALLOFF,
            cross_chunk: true,
        }
    }
}

impl LightPropagator {
    pub fn new(falloff: f32, cross_chunk: bool) -> Self {
        LightPropagator {
            falloff,
            cross_chunk,
        }
    }

    /// Top-down scan of every column.
    ///
    /// Overwrites the light of every voxel and returns the local positions
    /// bright enough to spread further.
    pub fn sky_pass(&self, chunk: &mut Chunk, registry: &BlockRegistry) -> VecDeque<IVec3> {
        let dims = chunk.dims();
        let mut lit = VecDeque::new();

        for x in 0..dims.width {
            for z in 0..dims.width {
                let mut light_ray = FULL_LIGHT;
                for y in (0..dims.height).rev() {
                    let local = IVec3::new(x, y, z);
                    let Some(voxel) = chunk.voxel_mut(local) else {
                        continue;
                    };
                    if voxel.id != AIR {
                        light_ray = light_ray.min(registry.transparency(voxel.id));
                    }
                    voxel.light = light_ray;
                    if light_ray > self.falloff {
                        lit.push_back(local);
                    }
                }
            }
        }

        lit
    }

    /// Breadth-first spread inside the chunk.
    pub fn flood(&self, chunk: &mut Chunk, mut queue: VecDeque<IVec3>) {
        while let Some(local) = queue.pop_front() {
            let Some(source) = chunk.voxel(local) else {
                continue;
            };
            let spread = source.light - self.falloff;

            for face in BlockFace::ALL {
                let adjacent = local + IVec3::from(face.offset());
                if let Some(neighbor) = chunk.voxel_mut(adjacent) {
                    if neighbor.light < spread {
                        neighbor.light = spread;
                        if spread > self.falloff {
                            queue.push_back(adjacent);
                        }
                    }
                }
            }
        }
    }

    /// Raise boundary voxels from the light already present across each seam.
    ///
    /// Returns the raised voxels, ready for [`LightPropagator::flood`].
    pub fn seed_from_seams<S: VoxelSource + ?Sized>(
        &self,
        chunk: &mut Chunk,
        source: &S,
    ) -> VecDeque<IVec3> {
        let origin = chunk.origin();
        let mut raised = VecDeque::new();

        for (local, outside) in seam_pairs(chunk.dims()) {
            let incoming = source.voxel_state(origin + outside).light - self.falloff;
            if let Some(voxel) = chunk.voxel_mut(local) {
                if voxel.light < incoming {
                    voxel.light = incoming;
                    if incoming > self.falloff {
                        raised.push_back(local);
                    }
                }
            }
        }

        raised
    }

    /// Neighbours whose boundary is darker than this chunk would make it.
    pub fn stale_neighbors<S: VoxelSource + ?Sized>(
        &self,
        chunk: &Chunk,
        source: &S,
    ) -> Vec<ChunkCoord> {
        let origin = chunk.origin();
        let width = chunk.dims().width;
        let mut stale = Vec::new();

        for (local, outside) in seam_pairs(chunk.dims()) {
            let Some(voxel) = chunk.voxel(local) else {
                continue;
            };
            let reach = voxel.light - self.falloff;
            if reach <= self.falloff {
                continue;
            }
            if source.voxel_state(origin + outside).light < reach - SEAM_EPSILON {
                let coord = ChunkCoord::from_voxel(origin + outside, width);
                if !stale.contains(&coord) {
                    stale.push(coord);
                }
            }
        }

        stale
    }

    /// Full relight of one chunk.
    ///
    /// With cross-chunk light enabled the seams are seeded from `source` and
    /// the neighbours left darker than this chunk are returned.
    pub fn light_chunk<S: VoxelSource + ?Sized>(
        &self,
        chunk: &mut Chunk,
        registry: &BlockRegistry,
        source: &S,
    ) -> Vec<ChunkCoord> {
        chunk.compute_light(self, registry);
        if !self.cross_chunk {
            return Vec::new();
        }

        let seeded = self.seed_from_seams(chunk, source);
        if !seeded.is_empty() {
            self.flood(chunk, seeded);
        }
        self.stale_neighbors(chunk, source)
    }
}

/// (boundary voxel, voxel just across the seam) in chunk-local coordinates.
fn seam_pairs(dims: ChunkDims) -> impl Iterator<Item = (IVec3, IVec3)> {
    let last = dims.width - 1;

    SEAM_FACES.into_iter().flat_map(move |face| {
        let offset = IVec3::from(face.offset());
        (0..dims.height).flat_map(move |y| {
            (0..dims.width).map(move |i| {
                let local = match face {
                    BlockFace::Back => IVec3::new(i, y, 0),
                    BlockFace::Front => IVec3::new(i, y, last),
                    BlockFace::Left => IVec3::new(0, y, i),
                    _ => IVec3::new(last, y, i),
                };
                (local, local + offset)
            })
        })
    })
}
