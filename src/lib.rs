// Core module with fundamental types
pub mod core;

// Render module with mesh and renderer interface
pub mod render;

// World module with generation, lighting and streaming
pub mod world;

// Other modules
pub mod constants;
pub mod error;
pub mod settings;

// Re-exports
pub use constants::*;
pub use self::core::{
    Biome, BlockFace, BlockId, BlockRegistry, BlockType, Chunk, ChunkCoord, ChunkDims, Lode, Voxel,
    VoxelSource,
};
pub use error::{ConfigError, WorldError};
pub use render::{ChunkMesh, ChunkRenderer, StatsRenderer, TextureAtlas, Vertex};
pub use settings::{ViewShape, WorldConfig};
pub use world::{LightPropagator, VoxelGenerator, World};
