//! World configuration
//!
//! Every option is a load-time constant for a given world, except the view
//! distance and threading mode which the streamer can change while running.
//! Configs are stored as RON so biome and block tables stay hand-editable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::core::biome::Biome;
use crate::core::block::{BlockRegistry, BlockType};
use crate::core::chunk::ChunkDims;
use crate::error::ConfigError;

/// Shape of the streamed region around the observer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewShape {
    #[default]
    Square,
    Circle,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u32,
    pub world_size_in_chunks: i32,
    pub chunk_width: i32,
    pub chunk_height: i32,
    pub view_distance: i32,
    pub view_shape: ViewShape,
    pub enable_threading: bool,
    pub light_falloff: f32,
    /// Let light flood across chunk seams.
    pub cross_chunk_light: bool,
    pub solid_ground_height: i32,
    pub texture_atlas_size: u32,
    /// Sleep of the mesh worker when it finds nothing to do.
    pub worker_idle_ms: u64,
    pub biomes: Vec<Biome>,
    pub blocks: Vec<BlockType>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            world_size_in_chunks: WORLD_SIZE_IN_CHUNKS,
            chunk_width: CHUNK_WIDTH,
            chunk_height: CHUNK_HEIGHT,
            view_distance: VIEW_DISTANCE,
            view_shape: ViewShape::Square,
            enable_threading: true,
            light_falloff: LIGHT_FALLOFF,
            cross_chunk_light: true,
            solid_ground_height: SOLID_GROUND_HEIGHT,
            texture_atlas_size: TEXTURE_ATLAS_SIZE,
            worker_idle_ms: WORKER_IDLE_MS,
            biomes: Biome::defaults(),
            blocks: BlockRegistry::default_blocks(),
        }
    }
}

impl WorldConfig {
    pub fn chunk_dims(&self) -> ChunkDims {
        ChunkDims::new(self.chunk_width, self.chunk_height)
    }

    pub fn world_size_in_voxels(&self) -> i32 {
        self.world_size_in_chunks * self.chunk_width
    }

    pub fn registry(&self) -> BlockRegistry {
        BlockRegistry::new(self.blocks.clone())
    }

    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.world_size_in_chunks <= 0 {
            return invalid(format!(
                "world_size_in_chunks must be positive, got {}",
                self.world_size_in_chunks
            ));
        }
        if self.chunk_width <= 0 || self.chunk_height <= 0 {
            return invalid(format!(
                "chunk dimensions must be positive, got {}x{}",
                self.chunk_width, self.chunk_height
            ));
        }
        if self.view_distance <= 0 {
            return invalid(format!(
                "view_distance must be positive, got {}",
                self.view_distance
            ));
        }
        if !(self.light_falloff > 0.0 && self.light_falloff <= 1.0) {
            return invalid(format!(
                "light_falloff must be in (0, 1], got {}",
                self.light_falloff
            ));
        }
        if self.texture_atlas_size == 0 {
            return invalid("texture_atlas_size must be positive".to_string());
        }
        if self.biomes.is_empty() {
            return invalid("at least one biome is required".to_string());
        }

        let Some(air) = self.blocks.first() else {
            return invalid("block table is empty".to_string());
        };
        if air.id != AIR || air.solid || air.transparency < 1.0 {
            return invalid("block 0 must be non-solid, fully transparent air".to_string());
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.id as usize != index {
                return invalid(format!(
                    "block '{}' has id {} but sits at index {}",
                    block.name, block.id, index
                ));
            }
            if !(0.0..=1.0).contains(&block.transparency) {
                return invalid(format!(
                    "block '{}' transparency {} outside [0, 1]",
                    block.name, block.transparency
                ));
            }
        }

        let known = |id: u8| (id as usize) < self.blocks.len();
        for id in [STONE, BEDROCK] {
            if !known(id) {
                return invalid(format!("block table is missing required id {}", id));
            }
        }
        for biome in &self.biomes {
            if !known(biome.surface_block) || !known(biome.subsurface_block) {
                return invalid(format!("biome '{}' references unknown blocks", biome.name));
            }
            for lode in &biome.lodes {
                if !known(lode.block_id) {
                    return invalid(format!(
                        "lode '{}' in biome '{}' references unknown block {}",
                        lode.name, biome.name, lode.block_id
                    ));
                }
                if lode.min_height >= lode.max_height {
                    return invalid(format!(
                        "lode '{}' in biome '{}' has an empty height band",
                        lode.name, biome.name
                    ));
                }
            }
        }

        Ok(())
    }
}
