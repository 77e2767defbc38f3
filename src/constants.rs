// World constants
pub const WORLD_SIZE_IN_CHUNKS: i32 = 50;
pub const CHUNK_WIDTH: i32 = 16;
pub const CHUNK_HEIGHT: i32 = 120;
pub const VIEW_DISTANCE: i32 = 5;
pub const DEFAULT_SEED: u32 = 42;

// Terrain constants
/// Everything below this height is solid ground regardless of biome.
pub const SOLID_GROUND_HEIGHT: i32 = 20;
/// Depth of the subsurface band under the surface block.
pub const SUBSURFACE_DEPTH: i32 = 4;
/// Spawn sits this far below the top of the world.
pub const SPAWN_CLEARANCE: i32 = 50;

// Block ids the generator relies on
pub const AIR: u8 = 0;
pub const STONE: u8 = 5;
pub const BEDROCK: u8 = 6;

// Lighting constants
pub const LIGHT_FALLOFF: f32 = 0.08;
pub const FULL_LIGHT: f32 = 1.0;

// Texture atlas
pub const TEXTURE_ATLAS_SIZE: u32 = 4;

// Scheduling constants
pub const WORKER_IDLE_MS: u64 = 2;
