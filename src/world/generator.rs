//! Deterministic voxel column generator
//!
//! Maps a world position to a block id from the seed and the biome table
//! alone, so any voxel can be recomputed at any time without touching chunk
//! storage. Biome weights blend terrain heights between neighbouring biomes;
//! the strongest biome picks the surface blocks and lodes.

use glam::IVec3;

use crate::constants::*;
use crate::core::biome::Biome;
use crate::core::block::BlockId;
use crate::settings::WorldConfig;
use crate::world::noise::TerrainNoise;

/// Per-column values shared by every voxel in the column.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ColumnSample {
    pub terrain_height: i32,
    /// Index of the strongest biome, `None` when the table is empty.
    pub dominant: Option<usize>,
}

#[derive(Clone)]
pub struct VoxelGenerator {
    noise: TerrainNoise,
    biomes: Vec<Biome>,
    world_size_in_voxels: i32,
    chunk_height: i32,
    solid_ground_height: i32,
    pub seed: u32,
}

impl VoxelGenerator {
    pub fn new(config: &WorldConfig) -> Self {
        VoxelGenerator {
            noise: TerrainNoise::new(config.seed, config.chunk_width),
            biomes: config.biomes.clone(),
            world_size_in_voxels: config.world_size_in_voxels(),
            chunk_height: config.chunk_height,
            solid_ground_height: config.solid_ground_height,
            seed: config.seed,
        }
    }

    pub fn biomes(&self) -> &[Biome] {
        &self.biomes
    }

    pub fn in_world(&self, pos: IVec3) -> bool {
        pos.x >= 0
            && pos.x < self.world_size_in_voxels
            && pos.y >= 0
            && pos.y < self.chunk_height
            && pos.z >= 0
            && pos.z < self.world_size_in_voxels
    }

    /// Block id at a world position.
    pub fn voxel_at(&self, pos: IVec3) -> BlockId {
        if !self.in_world(pos) {
            return AIR;
        }
        let column = self.column(pos.x, pos.z);
        self.voxel_in_column(pos, &column)
    }

    /// Blend biome weights for column (x, z).
    pub fn column(&self, x: i32, z: i32) -> ColumnSample {
        let mut sum_of_heights = 0.0;
        let mut count = 0;
        let mut strongest_weight = 0.0;
        let mut strongest_index = 0;

        for (i, biome) in self.biomes.iter().enumerate() {
            let weight = self.noise.sample_2d(x, z, biome.offset, biome.scale);
            if weight > strongest_weight {
                strongest_weight = weight;
                strongest_index = i;
            }

            let height = biome.terrain_height
                * self.noise.sample_2d(x, z, 0.0, biome.terrain_scale)
                * weight;
            if height > 0.0 {
                sum_of_heights += height;
                count += 1;
            }
        }

        // No contributing biome leaves flat ground.
        let average = if count > 0 {
            sum_of_heights / count as f32
        } else {
            0.0
        };

        ColumnSample {
            terrain_height: average.floor() as i32 + self.solid_ground_height,
            dominant: (!self.biomes.is_empty()).then_some(strongest_index),
        }
    }

    pub fn terrain_height(&self, x: i32, z: i32) -> i32 {
        self.column(x, z).terrain_height
    }

    pub fn dominant_biome(&self, x: i32, z: i32) -> Option<&Biome> {
        self.column(x, z).dominant.map(|i| &self.biomes[i])
    }

    /// Block id at `pos` given the precomputed column it belongs to.
    pub fn voxel_in_column(&self, pos: IVec3, column: &ColumnSample) -> BlockId {
        if !self.in_world(pos) {
            return AIR;
        }
        let y = pos.y;
        if y == 0 {
            return BEDROCK;
        }

        let Some(biome) = column.dominant.map(|i| &self.biomes[i]) else {
            return if y > column.terrain_height { AIR } else { STONE };
        };

        let terrain_height = column.terrain_height;
        let mut voxel = if y == terrain_height {
            biome.surface_block
        } else if y < terrain_height && y > terrain_height - SUBSURFACE_DEPTH {
            biome.subsurface_block
        } else if y > terrain_height {
            return AIR;
        } else {
            STONE
        };

        if voxel == biome.surface_block || voxel == biome.subsurface_block || voxel == STONE {
            for lode in biome.lodes.iter().filter(|l| l.contains_height(y)) {
                if self
                    .noise
                    .sample_3d(pos, lode.noise_offset, lode.scale, lode.threshold)
                {
                    voxel = lode.block_id;
                }
            }
        }

        voxel
    }
}
