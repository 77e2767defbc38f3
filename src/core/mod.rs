//! Core data structures for the world
//! Contains blocks, biomes, chunks, and voxels.

pub mod biome;
pub mod block;
pub mod chunk;

// Re-export commonly used types
pub use biome::{Biome, Lode};
pub use block::{BlockFace, BlockId, BlockRegistry, BlockType, FaceTextures};
pub use chunk::{Chunk, ChunkCoord, ChunkDims, Voxel, VoxelSource};
