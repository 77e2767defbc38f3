//! Integration tests for chunk streaming, edits and background meshing

use std::collections::HashMap;
use std::time::{Duration, Instant};

use blockworld::{
    AIR, ChunkCoord, ChunkMesh, ChunkRenderer, StatsRenderer, TextureAtlas, ViewShape, World,
    WorldConfig,
};
use glam::Vec3;

// ============================================================================
// Helpers
// ============================================================================

fn small_config() -> WorldConfig {
    WorldConfig {
        world_size_in_chunks: 10,
        chunk_width: 4,
        chunk_height: 64,
        view_distance: 2,
        enable_threading: false,
        solid_ground_height: 6,
        ..WorldConfig::default()
    }
}

/// Observer standing in the middle of chunk `coord`.
fn observer_in(coord: ChunkCoord, config: &WorldConfig) -> Vec3 {
    let w = config.chunk_width as f32;
    Vec3::new(coord.x as f32 * w + w / 2.0, 30.0, coord.z as f32 * w + w / 2.0)
}

fn expected_square(center: ChunkCoord, d: i32, world_size: i32) -> Vec<ChunkCoord> {
    let mut coords = Vec::new();
    for x in center.x - d..center.x + d {
        for z in center.z - d..center.z + d {
            if x >= 0 && z >= 0 && x < world_size && z < world_size {
                coords.push(ChunkCoord::new(x, z));
            }
        }
    }
    coords.sort_by_key(|c| (c.x, c.z));
    coords
}

/// Populate every queued chunk without meshing anything.
fn create_all(world: &mut World) {
    while world.create_next_chunk().is_some() {}
}

fn editable_count(world: &World) -> usize {
    world
        .active_chunks()
        .into_iter()
        .filter(|c| world.shared().is_editable(*c))
        .count()
}

#[derive(Default)]
struct RecordingRenderer {
    meshes: HashMap<ChunkCoord, ChunkMesh>,
    visible: HashMap<ChunkCoord, bool>,
}

impl ChunkRenderer for RecordingRenderer {
    fn set_mesh(&mut self, coord: ChunkCoord, mesh: &ChunkMesh, _atlas: &TextureAtlas) {
        self.meshes.insert(coord, mesh.clone());
    }

    fn set_active(&mut self, coord: ChunkCoord, active: bool) {
        self.visible.insert(coord, active);
    }
}

// ============================================================================
// Start-up
// ============================================================================

#[test]
fn test_default_world_starts_with_hundred_chunks() {
    let config = WorldConfig {
        enable_threading: false,
        ..WorldConfig::default()
    };
    let mut world = World::new(config).unwrap();
    let spawn = world.generate_world().unwrap();

    assert_eq!(spawn, Vec3::new(400.0, 70.0, 400.0));
    assert_eq!(world.allocated_chunks(), 100);
    assert_eq!(world.pending_creation().len(), 100);
    assert!(world.remesh_queue().is_empty());
    assert_eq!(editable_count(&world), 0);
    assert_eq!(
        world.active_chunks(),
        expected_square(ChunkCoord::new(25, 25), 5, 50)
    );
    assert_eq!(world.observer_chunk(), Some(ChunkCoord::new(25, 25)));
}

#[test]
fn test_start_region_is_populated_one_chunk_per_tick() {
    let mut world = World::new(small_config()).unwrap();
    let spawn = world.generate_world().unwrap();
    let pending = world.pending_creation();
    assert_eq!(pending.len(), 16);
    let mut renderer = StatsRenderer::default();

    for tick in 1..=3 {
        world.update(spawn, &mut renderer);
        assert_eq!(world.pending_creation(), pending[tick..].to_vec());
        assert_eq!(editable_count(&world), tick);
    }
    assert!(world.shared().is_editable(pending[0]));
    assert!(!world.shared().is_editable(pending[3]));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = WorldConfig {
        view_distance: 0,
        ..small_config()
    };
    assert!(World::new(config).is_err());
}

// ============================================================================
// Edits
// ============================================================================

#[test]
fn test_boundary_edit_queues_both_chunks_once() {
    let config = WorldConfig {
        world_size_in_chunks: 4,
        chunk_width: 16,
        ..small_config()
    };
    let mut world = World::new(config).unwrap();
    world.generate_world().unwrap();
    create_all(&mut world);

    let pos = Vec3::new(16.0, 10.0, 0.0);
    assert!(world.edit_voxel(pos, AIR));
    assert_eq!(world.voxel_id(pos), AIR);

    let queue = world.remesh_queue();
    assert_eq!(&queue[..2], &[ChunkCoord::new(1, 0), ChunkCoord::new(0, 0)]);
    for coord in [ChunkCoord::new(1, 0), ChunkCoord::new(0, 0)] {
        assert_eq!(queue.iter().filter(|c| **c == coord).count(), 1);
    }
}

#[test]
fn test_interior_edit_queues_only_its_chunk() {
    let config = WorldConfig {
        world_size_in_chunks: 4,
        chunk_width: 16,
        ..small_config()
    };
    let mut world = World::new(config).unwrap();
    world.generate_world().unwrap();
    create_all(&mut world);
    while world.update_chunks() {}

    let pos = Vec3::new(20.5, 40.0, 8.5);
    assert!(world.request_place(pos, 13));
    assert_eq!(world.voxel_id(pos), 13);
    assert!(world.check_for_voxel(pos));
    assert_eq!(world.remesh_queue(), vec![ChunkCoord::new(1, 0)]);

    assert!(world.request_break(pos));
    assert!(!world.check_for_voxel(pos));
}

#[test]
fn test_edit_outside_loaded_chunks_is_ignored() {
    let mut world = World::new(small_config()).unwrap();
    world.generate_world().unwrap();

    // Queued but not yet populated.
    assert!(!world.edit_voxel(Vec3::new(20.0, 3.0, 20.0), AIR));
    create_all(&mut world);

    assert!(!world.edit_voxel(Vec3::new(1.0, 10.0, 1.0), AIR));
    assert!(!world.edit_voxel(Vec3::new(-3.0, 10.0, 20.0), AIR));
    assert!(!world.edit_voxel(Vec3::new(20.0, 64.0, 20.0), AIR));
}

// ============================================================================
// Streaming
// ============================================================================

#[test]
fn test_active_set_follows_observer() {
    let config = small_config();
    let mut world = World::new(config.clone()).unwrap();
    world.generate_world().unwrap();
    let allocated_at_start = world.allocated_chunks();
    let mut renderer = StatsRenderer::default();

    for center in [
        ChunkCoord::new(5, 5),
        ChunkCoord::new(6, 5),
        ChunkCoord::new(9, 9),
        ChunkCoord::new(0, 0),
        ChunkCoord::new(0, 9),
    ] {
        world.update(observer_in(center, &config), &mut renderer);
        assert_eq!(world.observer_chunk(), Some(center));
        assert_eq!(world.active_chunks(), expected_square(center, 2, 10));
    }

    // Chunks left behind are hidden, never dropped.
    assert!(world.allocated_chunks() > allocated_at_start);
    assert!(!world.is_chunk_active(ChunkCoord::new(5, 5)));
    let left_behind = world.shared().chunk(ChunkCoord::new(5, 5)).unwrap();
    assert!(!left_behind.read().is_active());
    let current = world.shared().chunk(ChunkCoord::new(0, 9)).unwrap();
    assert!(current.read().is_active());
    assert!(renderer.deactivations > 0);
}

#[test]
fn test_new_chunks_are_created_one_per_tick() {
    let config = small_config();
    let mut world = World::new(config.clone()).unwrap();
    let spawn = world.generate_world().unwrap();
    create_all(&mut world);
    let mut renderer = StatsRenderer::default();

    let moved = spawn + Vec3::new(config.chunk_width as f32 * 2.0, 0.0, 0.0);
    world.check_view_distance(moved);
    let pending = world.pending_creation();
    assert_eq!(pending.len(), 8);

    world.update(moved, &mut renderer);
    assert_eq!(world.pending_creation(), pending[1..].to_vec());
    assert!(world.remesh_queue().contains(&pending[0]));
}

#[test]
fn test_circle_view_drops_corners() {
    let config = WorldConfig {
        view_distance: 3,
        view_shape: ViewShape::Circle,
        ..small_config()
    };
    let mut world = World::new(config).unwrap();
    world.generate_world().unwrap();

    let active = world.active_chunks();
    assert_eq!(active.len(), 32);
    for corner in [(2, 2), (2, 7), (7, 2), (7, 7)] {
        assert!(!world.is_chunk_active(ChunkCoord::new(corner.0, corner.1)));
    }
    assert!(world.is_chunk_active(ChunkCoord::new(3, 2)));

    world.set_view_shape(ViewShape::Square);
    assert_eq!(world.active_chunks().len(), 36);
}

#[test]
fn test_view_distance_changes_at_runtime() {
    let mut world = World::new(small_config()).unwrap();
    world.generate_world().unwrap();
    create_all(&mut world);
    assert_eq!(world.active_chunks().len(), 16);

    world.set_view_distance(1);
    assert_eq!(
        world.active_chunks(),
        expected_square(ChunkCoord::new(5, 5), 1, 10)
    );
    assert!(world.pending_creation().is_empty());

    world.set_view_distance(3);
    assert_eq!(world.active_chunks().len(), 36);
    assert_eq!(world.pending_creation().len(), 36 - 16);
}

// ============================================================================
// Meshing
// ============================================================================

#[test]
fn test_single_threaded_meshes_every_chunk() {
    let mut world = World::new(small_config()).unwrap();
    let spawn = world.generate_world().unwrap();
    let mut renderer = RecordingRenderer::default();

    let mut ticks = 0;
    while (!world.pending_creation().is_empty() || !world.remesh_queue().is_empty())
        && ticks < 10_000
    {
        world.update(spawn, &mut renderer);
        ticks += 1;
    }

    assert!(world.pending_creation().is_empty());
    assert!(world.remesh_queue().is_empty());
    assert_eq!(renderer.meshes.len(), 16);
    assert_eq!(renderer.visible.len(), 16);
    assert!(renderer.visible.values().all(|v| *v));
    for mesh in renderer.meshes.values() {
        assert_eq!(mesh.vertices.len(), mesh.quad_count() * 4);
        assert_eq!(mesh.triangles.len(), mesh.quad_count() * 6);
        assert_eq!(mesh.colors.len(), mesh.vertices.len());
    }
}

#[test]
fn test_worker_meshes_and_shuts_down() {
    let config = WorldConfig {
        enable_threading: true,
        worker_idle_ms: 1,
        ..small_config()
    };
    let mut world = World::new(config).unwrap();
    let spawn = world.generate_world().unwrap();
    assert!(world.is_threaded());

    let mut renderer = RecordingRenderer::default();
    let deadline = Instant::now() + Duration::from_secs(60);
    while renderer.meshes.len() < 16 && Instant::now() < deadline {
        world.update(spawn, &mut renderer);
        std::thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(renderer.meshes.len(), 16);

    world.set_threading(false).unwrap();
    assert!(!world.is_threaded());

    // Main-thread meshing takes over.
    let pos = spawn.with_y(20.0);
    assert!(world.request_break(pos));
    let coord = world.chunk_from_world_position(pos).unwrap();
    renderer.meshes.clear();
    world.update(spawn, &mut renderer);
    assert!(renderer.meshes.contains_key(&coord));

    world.set_threading(true).unwrap();
    assert!(world.is_threaded());
    world.shutdown();
    assert!(!world.is_threaded());
}
