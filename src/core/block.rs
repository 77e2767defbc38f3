use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Identifier of a block type inside a [`BlockRegistry`].
pub type BlockId = u8;

/// The six faces of a voxel, in mesh emission order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BlockFace {
    Back,
    Front,
    Top,
    Bottom,
    Left,
    Right,
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Back,
        BlockFace::Front,
        BlockFace::Top,
        BlockFace::Bottom,
        BlockFace::Left,
        BlockFace::Right,
    ];

    /// Offset to the voxel this face looks into.
    pub fn offset(&self) -> [i32; 3] {
        match self {
            BlockFace::Back => [0, 0, -1],
            BlockFace::Front => [0, 0, 1],
            BlockFace::Top => [0, 1, 0],
            BlockFace::Bottom => [0, -1, 0],
            BlockFace::Left => [-1, 0, 0],
            BlockFace::Right => [1, 0, 0],
        }
    }

    pub fn normal(&self) -> [f32; 3] {
        let [x, y, z] = self.offset();
        [x as f32, y as f32, z as f32]
    }
}

/// Per-face texture indices into the atlas.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct FaceTextures {
    pub back: u16,
    pub front: u16,
    pub top: u16,
    pub bottom: u16,
    pub left: u16,
    pub right: u16,
}

impl FaceTextures {
    pub const fn uniform(id: u16) -> Self {
        Self {
            back: id,
            front: id,
            top: id,
            bottom: id,
            left: id,
            right: id,
        }
    }

    pub const fn column(side: u16, top: u16, bottom: u16) -> Self {
        Self {
            back: side,
            front: side,
            top,
            bottom,
            left: side,
            right: side,
        }
    }
}

/// Physical properties of a block type.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub solid: bool,
    /// 0 is fully opaque, 1 lets all light through.
    pub transparency: f32,
    /// Faces of solid neighbours stay visible through this block.
    pub render_neighbor_faces: bool,
    pub textures: FaceTextures,
}

impl BlockType {
    pub fn new(
        id: BlockId,
        name: &str,
        solid: bool,
        transparency: f32,
        render_neighbor_faces: bool,
        textures: FaceTextures,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            solid,
            transparency,
            render_neighbor_faces,
            textures,
        }
    }

    pub fn air() -> Self {
        Self::new(AIR, "Air", false, 1.0, true, FaceTextures::default())
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn is_opaque(&self) -> bool {
        self.transparency <= 0.0
    }

    pub fn renders_neighbor_faces(&self) -> bool {
        self.render_neighbor_faces
    }

    pub fn texture_id(&self, face: BlockFace) -> u16 {
        match face {
            BlockFace::Back => self.textures.back,
            BlockFace::Front => self.textures.front,
            BlockFace::Top => self.textures.top,
            BlockFace::Bottom => self.textures.bottom,
            BlockFace::Left => self.textures.left,
            BlockFace::Right => self.textures.right,
        }
    }

    /// Whether a face of a solid block is visible against this block.
    pub fn exposes_faces(&self) -> bool {
        !self.is_solid() || self.renders_neighbor_faces()
    }
}

/// Table of every block type in the world, indexed by id.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<BlockType>,
    air: BlockType,
}

impl BlockRegistry {
    pub fn new(blocks: Vec<BlockType>) -> Self {
        Self {
            blocks,
            air: BlockType::air(),
        }
    }

    /// Unknown ids resolve to air.
    pub fn get(&self, id: BlockId) -> &BlockType {
        self.blocks.get(id as usize).unwrap_or(&self.air)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        (id as usize) < self.blocks.len()
    }

    pub fn is_solid(&self, id: BlockId) -> bool {
        self.get(id).is_solid()
    }

    pub fn transparency(&self, id: BlockId) -> f32 {
        self.get(id).transparency
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[BlockType] {
        &self.blocks
    }

    pub fn default_blocks() -> Vec<BlockType> {
        vec![
            BlockType::air(),
            BlockType::new(1, "Grass", true, 0.0, false, FaceTextures::column(2, 7, 1)),
            BlockType::new(2, "Dirt", true, 0.0, false, FaceTextures::uniform(1)),
            BlockType::new(3, "Sand", true, 0.0, false, FaceTextures::uniform(10)),
            BlockType::new(4, "Gravel", true, 0.0, false, FaceTextures::uniform(11)),
            BlockType::new(STONE, "Stone", true, 0.0, false, FaceTextures::uniform(0)),
            BlockType::new(BEDROCK, "Bedrock", true, 0.0, false, FaceTextures::uniform(9)),
            BlockType::new(7, "Coal Ore", true, 0.0, false, FaceTextures::uniform(12)),
            BlockType::new(8, "Iron Ore", true, 0.0, false, FaceTextures::uniform(13)),
            BlockType::new(9, "Glass", true, 1.0, true, FaceTextures::uniform(3)),
            BlockType::new(10, "Leaves", true, 0.6, true, FaceTextures::uniform(14)),
            BlockType::new(11, "Log", true, 0.0, false, FaceTextures::column(5, 6, 6)),
            BlockType::new(12, "Planks", true, 0.0, false, FaceTextures::uniform(4)),
            BlockType::new(13, "Cobblestone", true, 0.0, false, FaceTextures::uniform(8)),
        ]
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new(Self::default_blocks())
    }
}
