use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::core::block::BlockId;

/// Noise-gated rule that replaces voxels inside a height band.
///
/// Lodes place ore clusters, dirt/gravel pockets and, with an air block id,
/// carve caves.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Lode {
    pub name: String,
    pub block_id: BlockId,
    /// Inclusive lower bound of the band.
    pub min_height: i32,
    /// Exclusive upper bound of the band.
    pub max_height: i32,
    pub scale: f32,
    pub threshold: f32,
    pub noise_offset: f32,
}

impl Lode {
    pub fn new(
        name: &str,
        block_id: BlockId,
        min_height: i32,
        max_height: i32,
        scale: f32,
        threshold: f32,
        noise_offset: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            block_id,
            min_height,
            max_height,
            scale,
            threshold,
            noise_offset,
        }
    }

    pub fn contains_height(&self, y: i32) -> bool {
        y >= self.min_height && y < self.max_height
    }
}

/// Parameter set selected per column by noise weight.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Biome {
    pub name: String,
    /// Offset of the biome-weight noise.
    pub offset: f32,
    /// Scale of the biome-weight noise.
    pub scale: f32,
    /// Height above solid ground the terrain can reach.
    pub terrain_height: f32,
    pub terrain_scale: f32,
    pub surface_block: BlockId,
    pub subsurface_block: BlockId,
    /// Evaluated in order; later matches win.
    #[serde(default)]
    pub lodes: Vec<Lode>,
}

impl Biome {
    pub fn defaults() -> Vec<Biome> {
        vec![
            Biome {
                name: "Grasslands".to_string(),
                offset: 1234.0,
                scale: 0.25,
                terrain_height: 22.0,
                terrain_scale: 0.25,
                surface_block: 1,
                subsurface_block: 2,
                lodes: vec![
                    Lode::new("Dirt", 2, 1, 255, 0.1, 0.5, 0.0),
                    Lode::new("Sand", 3, 30, 60, 0.2, 0.6, 500.0),
                    Lode::new("Coal", 7, 5, 40, 0.6, 0.62, 100.0),
                    Lode::new("Iron", 8, 5, 25, 0.7, 0.64, 300.0),
                    Lode::new("Caves", AIR, 5, 42, 0.1, 0.55, 43.0),
                ],
            },
            Biome {
                name: "Desert".to_string(),
                offset: 6545.0,
                scale: 0.2,
                terrain_height: 10.0,
                terrain_scale: 0.1,
                surface_block: 3,
                subsurface_block: 3,
                lodes: vec![
                    Lode::new("Gravel", 4, 1, 40, 0.2, 0.6, 900.0),
                    Lode::new("Coal", 7, 5, 30, 0.6, 0.63, 100.0),
                ],
            },
            Biome {
                name: "Highlands".to_string(),
                offset: 42.0,
                scale: 0.3,
                terrain_height: 60.0,
                terrain_scale: 0.4,
                surface_block: 1,
                subsurface_block: 13,
                lodes: vec![
                    Lode::new("Iron", 8, 5, 50, 0.7, 0.62, 300.0),
                    Lode::new("Caves", AIR, 10, 70, 0.08, 0.56, 1043.0),
                ],
            },
        ]
    }
}
