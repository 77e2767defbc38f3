//! Rendering-related modules
//! Contains mesh buffers, the texture atlas layout, and the renderer interface.

pub mod atlas;
pub mod mesh;
pub mod renderer;

// Re-export commonly used types
pub use atlas::TextureAtlas;
pub use mesh::{ChunkMesh, Vertex};
pub use renderer::{ChunkRenderer, StatsRenderer};
