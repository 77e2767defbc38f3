//! World generation and management modules
//! Contains terrain generation, lighting, chunk meshing, and streaming.

pub mod generator;
pub mod light;
pub mod loader;
pub mod noise;
pub mod streamer;

// Re-export commonly used types
pub use generator::{ColumnSample, VoxelGenerator};
pub use light::LightPropagator;
pub use loader::{MeshResult, MeshWorker, UpdateQueues, WorldShared};
pub use noise::TerrainNoise;
pub use streamer::World;
