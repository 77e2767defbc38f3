//! Chunk streaming around a moving observer
//!
//! The world keeps a fixed grid of chunk slots. Slots are filled lazily as
//! the observer approaches and are never emptied again: chunks that fall out
//! of view are only hidden. New chunks are populated one per tick so a long
//! walk never stalls a frame.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, unbounded};
use glam::{IVec3, Vec3};
use rustc_hash::FxHashSet;

use crate::constants::*;
use crate::core::block::BlockId;
use crate::core::chunk::{ChunkCoord, Voxel, VoxelSource};
use crate::error::WorldError;
use crate::render::renderer::ChunkRenderer;
use crate::settings::{ViewShape, WorldConfig};
use crate::world::loader::{MeshResult, MeshWorker, WorldShared};

pub struct World {
    config: WorldConfig,
    shared: Arc<WorldShared>,
    mesh_rx: Receiver<MeshResult>,
    worker: Option<MeshWorker>,
    chunks_to_create: VecDeque<ChunkCoord>,
    /// Visibility changes not yet passed to the renderer.
    visibility_changes: Vec<(ChunkCoord, bool)>,
    observer_chunk: Option<ChunkCoord>,
    spawn_position: Vec3,
    started: bool,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let (mesh_tx, mesh_rx) = unbounded();
        let shared = Arc::new(WorldShared::new(&config, mesh_tx));

        let center = (config.world_size_in_voxels() / 2) as f32;
        let spawn_position = Vec3::new(
            center,
            (config.chunk_height - SPAWN_CLEARANCE) as f32,
            center,
        );

        Ok(World {
            config,
            shared,
            mesh_rx,
            worker: None,
            chunks_to_create: VecDeque::new(),
            visibility_changes: Vec::new(),
            observer_chunk: None,
            spawn_position,
            started: false,
        })
    }

    /// Queue the region around the world centre for creation and return the
    /// spawn point.
    ///
    /// Chunks are populated later, one per `update`. Starts the mesh worker
    /// when threading is enabled. Calling this again is a no-op.
    pub fn generate_world(&mut self) -> Result<Vec3, WorldError> {
        if self.started {
            tracing::warn!("World already generated");
            return Ok(self.spawn_position);
        }

        let center = self.config.world_size_in_chunks / 2;
        let region = self.region(ChunkCoord::new(center, center));
        tracing::info!(
            "Generating world: seed {}, {} starting chunks",
            self.config.seed,
            region.len()
        );

        for coord in region {
            if self.shared.allocate(coord).is_some() {
                self.chunks_to_create.push_back(coord);
            }
        }

        self.check_view_distance(self.spawn_position);
        self.started = true;
        if self.config.enable_threading {
            self.start_worker()?;
        }

        tracing::info!("World ready, spawn at {}", self.spawn_position);
        Ok(self.spawn_position)
    }

    /// One scheduling tick.
    pub fn update(&mut self, observer: Vec3, renderer: &mut dyn ChunkRenderer) {
        let coord = ChunkCoord::from_world(observer, self.config.chunk_width);
        if self.observer_chunk != Some(coord) {
            self.check_view_distance(observer);
        }

        self.create_next_chunk();
        if self.worker.is_none() {
            self.update_chunks();
        }
        self.flush_render(renderer);
    }

    /// Rebuild the active region around the observer's chunk.
    pub fn check_view_distance(&mut self, observer: Vec3) {
        let coord = ChunkCoord::from_world(observer, self.config.chunk_width);
        self.rebuild_region(coord);
    }

    fn rebuild_region(&mut self, center: ChunkCoord) {
        self.observer_chunk = Some(center);
        let region = self.region(center);

        for coord in &region {
            if !self.shared.is_allocated(*coord) && self.shared.allocate(*coord).is_some() {
                self.chunks_to_create.push_back(*coord);
            }
        }

        let (activated, deactivated) = {
            let mut queues = self.shared.queues();
            let in_view: FxHashSet<ChunkCoord> = region.iter().copied().collect();
            let activated: Vec<ChunkCoord> = region
                .iter()
                .filter(|c| !queues.active.contains(*c))
                .copied()
                .collect();
            let deactivated: Vec<ChunkCoord> = queues
                .active
                .iter()
                .filter(|c| !in_view.contains(*c))
                .copied()
                .collect();
            queues.active = in_view;
            (activated, deactivated)
        };

        tracing::debug!(
            "View rebuilt around {:?}: +{} -{} chunks, {} pending creation",
            center,
            activated.len(),
            deactivated.len(),
            self.chunks_to_create.len()
        );

        for (coords, active) in [(activated, true), (deactivated, false)] {
            for coord in coords {
                let changed = self.shared.chunk(coord).is_some_and(|lock| {
                    let mut chunk = lock.write();
                    let changed = chunk.is_active() != active;
                    chunk.set_active(active);
                    changed
                });
                if changed {
                    self.visibility_changes.push((coord, active));
                }
            }
        }
    }

    /// In-world chunk coordinates the observer at `center` should see.
    fn region(&self, center: ChunkCoord) -> Vec<ChunkCoord> {
        let d = self.config.view_distance;
        let radius_sq = (d as f32) * (d as f32);
        let size = self.config.world_size_in_chunks;
        // Clamped to the grid so a huge view distance stays bounded.
        let min_x = center.x.saturating_sub(d).max(0);
        let max_x = center.x.saturating_add(d).min(size);
        let min_z = center.z.saturating_sub(d).max(0);
        let max_z = center.z.saturating_add(d).min(size);
        let mut region = Vec::new();

        for x in min_x..max_x {
            for z in min_z..max_z {
                let coord = ChunkCoord::new(x, z);
                if !self.shared.is_chunk_in_world(coord) {
                    continue;
                }
                if self.config.view_shape == ViewShape::Circle {
                    let dx = (x - center.x) as f32 + 0.5;
                    let dz = (z - center.z) as f32 + 0.5;
                    if dx * dx + dz * dz > radius_sq {
                        continue;
                    }
                }
                region.push(coord);
            }
        }

        region
    }

    /// Populate the oldest pending chunk and queue it for meshing.
    pub fn create_next_chunk(&mut self) -> Option<ChunkCoord> {
        let coord = self.chunks_to_create.pop_front()?;
        let lock = self.shared.chunk(coord)?;
        lock.write().populate(&self.shared.generator);
        self.shared.enqueue_back(coord);
        tracing::debug!("Created chunk {:?}", coord);
        Some(coord)
    }

    /// Drain one remesh entry on the calling thread.
    pub fn update_chunks(&self) -> bool {
        self.shared.process_next_remesh()
    }

    /// Hand buffered visibility changes and finished meshes to the renderer.
    pub fn flush_render(&mut self, renderer: &mut dyn ChunkRenderer) {
        for (coord, active) in self.visibility_changes.drain(..) {
            renderer.set_active(coord, active);
        }
        let mut uploaded = 0;
        for (coord, mesh) in self.mesh_rx.try_iter() {
            renderer.set_mesh(coord, &mesh, &self.shared.atlas);
            uploaded += 1;
        }
        if uploaded > 0 {
            tracing::debug!("Uploaded {} chunk meshes", uploaded);
        }
    }

    pub fn voxel_state(&self, pos: Vec3) -> Voxel {
        self.shared.voxel_state(pos.floor().as_ivec3())
    }

    pub fn voxel_id(&self, pos: Vec3) -> BlockId {
        self.voxel_state(pos).id
    }

    /// Whether a solid block occupies `pos`.
    pub fn check_for_voxel(&self, pos: Vec3) -> bool {
        self.shared.registry.is_solid(self.voxel_id(pos))
    }

    pub fn chunk_from_world_position(&self, pos: Vec3) -> Option<ChunkCoord> {
        let coord = ChunkCoord::from_world(pos, self.config.chunk_width);
        self.shared.is_chunk_in_world(coord).then_some(coord)
    }

    /// Replace the voxel at `pos` and queue every affected chunk for remeshing.
    ///
    /// Returns `false` if the edit was ignored.
    pub fn edit_voxel(&mut self, pos: Vec3, id: BlockId) -> bool {
        let voxel_pos: IVec3 = pos.floor().as_ivec3();
        if !self.shared.registry.contains(id) {
            tracing::warn!("Ignored edit at {}: unknown block id {}", voxel_pos, id);
            return false;
        }
        let coord = ChunkCoord::from_voxel(voxel_pos, self.config.chunk_width);
        let Some(lock) = self.shared.chunk(coord) else {
            tracing::warn!("Ignored edit at {}: chunk {:?} not loaded", voxel_pos, coord);
            return false;
        };

        let neighbors = lock.write().edit_voxel(voxel_pos, id);
        let Some(neighbors) = neighbors else {
            tracing::warn!("Ignored edit at {}: chunk {:?} not editable", voxel_pos, coord);
            return false;
        };

        let mut dirty = vec![coord];
        dirty.extend(
            neighbors
                .into_iter()
                .filter(|c| self.shared.is_allocated(*c)),
        );
        self.shared.enqueue_front(&dirty);
        true
    }

    pub fn request_break(&mut self, pos: Vec3) -> bool {
        self.edit_voxel(pos, AIR)
    }

    pub fn request_place(&mut self, pos: Vec3, id: BlockId) -> bool {
        self.edit_voxel(pos, id)
    }

    pub fn set_view_distance(&mut self, view_distance: i32) {
        let view_distance = view_distance.max(1);
        if view_distance == self.config.view_distance {
            return;
        }
        tracing::info!(
            "View distance {} -> {}",
            self.config.view_distance,
            view_distance
        );
        self.config.view_distance = view_distance;
        if let Some(center) = self.observer_chunk {
            self.rebuild_region(center);
        }
    }

    pub fn set_view_shape(&mut self, shape: ViewShape) {
        if shape == self.config.view_shape {
            return;
        }
        self.config.view_shape = shape;
        if let Some(center) = self.observer_chunk {
            self.rebuild_region(center);
        }
    }

    /// Switch between the background worker and main-thread meshing.
    pub fn set_threading(&mut self, enabled: bool) -> Result<(), WorldError> {
        self.config.enable_threading = enabled;
        if !self.started {
            return Ok(());
        }
        if enabled {
            self.start_worker()
        } else {
            self.stop_worker();
            Ok(())
        }
    }

    fn start_worker(&mut self) -> Result<(), WorldError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let idle = Duration::from_millis(self.config.worker_idle_ms);
        let worker =
            MeshWorker::spawn(Arc::clone(&self.shared), idle).map_err(WorldError::WorkerSpawn)?;
        self.worker = Some(worker);
        tracing::info!("Threaded chunk meshing enabled");
        Ok(())
    }

    fn stop_worker(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
            tracing::info!("Threaded chunk meshing disabled");
        }
    }

    /// Stop background work. The world stays queryable.
    pub fn shutdown(&mut self) {
        self.stop_worker();
    }

    pub fn is_threaded(&self) -> bool {
        self.worker.is_some()
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn spawn_position(&self) -> Vec3 {
        self.spawn_position
    }

    pub fn observer_chunk(&self) -> Option<ChunkCoord> {
        self.observer_chunk
    }

    pub fn shared(&self) -> &Arc<WorldShared> {
        &self.shared
    }

    /// Active chunk coordinates, sorted by (x, z).
    pub fn active_chunks(&self) -> Vec<ChunkCoord> {
        let mut active: Vec<ChunkCoord> = self.shared.queues().active.iter().copied().collect();
        active.sort_by_key(|c| (c.x, c.z));
        active
    }

    pub fn is_chunk_active(&self, coord: ChunkCoord) -> bool {
        self.shared.queues().active.contains(&coord)
    }

    pub fn remesh_queue(&self) -> Vec<ChunkCoord> {
        self.shared.queues().remesh.clone()
    }

    pub fn pending_creation(&self) -> Vec<ChunkCoord> {
        self.chunks_to_create.iter().copied().collect()
    }

    pub fn allocated_chunks(&self) -> usize {
        self.shared.allocated_count()
    }
}

impl Drop for World {
    fn drop(&mut self) {
        self.shutdown();
    }
}
