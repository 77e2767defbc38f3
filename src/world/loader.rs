//! Background chunk meshing
//!
//! Chunks waiting for light and a fresh mesh sit in a shared remesh queue.
//! Either the main thread or one dedicated worker drains it, and finished
//! meshes travel back over a channel so that only the thread owning the
//! graphics context ever touches the renderer.
//!
//! Locking: the queue mutex may be taken before a chunk lock, never the
//! other way round. Chunk locks are always released before the queue mutex
//! is requested, and chunk readiness is probed with `try_read` while the
//! queue mutex is held.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use glam::IVec3;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, MutexGuard, RwLock, RwLockWriteGuard};
use rustc_hash::FxHashSet;

use crate::core::block::BlockRegistry;
use crate::core::chunk::{Chunk, ChunkCoord, ChunkDims, Voxel, VoxelSource};
use crate::render::atlas::TextureAtlas;
use crate::render::mesh::ChunkMesh;
use crate::settings::WorldConfig;
use crate::world::generator::VoxelGenerator;
use crate::world::light::LightPropagator;

/// A finished mesh on its way to the render thread.
pub type MeshResult = (ChunkCoord, ChunkMesh);

/// State guarded by the single world lock.
#[derive(Debug, Default)]
pub struct UpdateQueues {
    /// Chunks waiting for light and mesh, front first.
    pub remesh: Vec<ChunkCoord>,
    pub active: FxHashSet<ChunkCoord>,
}

impl UpdateQueues {
    fn push_back(&mut self, coord: ChunkCoord) {
        if !self.remesh.contains(&coord) {
            self.remesh.push(coord);
        }
    }

    fn push_front(&mut self, coords: &[ChunkCoord]) {
        let mut unique: Vec<ChunkCoord> = Vec::with_capacity(coords.len());
        for coord in coords {
            if !unique.contains(coord) {
                unique.push(*coord);
            }
        }
        self.remesh.retain(|c| !unique.contains(c));
        self.remesh.splice(0..0, unique);
    }
}

/// Everything the mesh worker shares with the world.
pub struct WorldShared {
    pub registry: BlockRegistry,
    pub generator: VoxelGenerator,
    pub propagator: LightPropagator,
    pub atlas: TextureAtlas,
    dims: ChunkDims,
    world_size_in_chunks: i32,
    grid: Vec<OnceCell<RwLock<Chunk>>>,
    queues: Mutex<UpdateQueues>,
    mesh_tx: Sender<MeshResult>,
}

impl WorldShared {
    pub fn new(config: &WorldConfig, mesh_tx: Sender<MeshResult>) -> Self {
        let size = config.world_size_in_chunks.max(0) as usize;
        let mut grid = Vec::with_capacity(size * size);
        grid.resize_with(size * size, OnceCell::new);

        WorldShared {
            registry: config.registry(),
            generator: VoxelGenerator::new(config),
            propagator: LightPropagator::new(config.light_falloff, config.cross_chunk_light),
            atlas: TextureAtlas::new(config.texture_atlas_size),
            dims: config.chunk_dims(),
            world_size_in_chunks: config.world_size_in_chunks,
            grid,
            queues: Mutex::new(UpdateQueues::default()),
            mesh_tx,
        }
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn world_size_in_chunks(&self) -> i32 {
        self.world_size_in_chunks
    }

    pub fn is_chunk_in_world(&self, coord: ChunkCoord) -> bool {
        coord.x >= 0
            && coord.x < self.world_size_in_chunks
            && coord.z >= 0
            && coord.z < self.world_size_in_chunks
    }

    fn slot(&self, coord: ChunkCoord) -> Option<&OnceCell<RwLock<Chunk>>> {
        if !self.is_chunk_in_world(coord) {
            return None;
        }
        let index = (coord.x + coord.z * self.world_size_in_chunks) as usize;
        self.grid.get(index)
    }

    /// The chunk at `coord`, if it has been allocated.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&RwLock<Chunk>> {
        self.slot(coord)?.get()
    }

    /// Allocate an empty chunk, or return the existing one.
    pub fn allocate(&self, coord: ChunkCoord) -> Option<&RwLock<Chunk>> {
        let dims = self.dims;
        Some(
            self.slot(coord)?
                .get_or_init(|| RwLock::new(Chunk::new(coord, dims))),
        )
    }

    pub fn is_allocated(&self, coord: ChunkCoord) -> bool {
        self.chunk(coord).is_some()
    }

    pub fn allocated_count(&self) -> usize {
        self.grid.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Whether the chunk exists and has been populated. Blocks on the chunk lock.
    pub fn is_editable(&self, coord: ChunkCoord) -> bool {
        self.chunk(coord).is_some_and(|lock| lock.read().is_editable())
    }

    fn is_ready(&self, coord: ChunkCoord) -> bool {
        self.chunk(coord)
            .and_then(|lock| lock.try_read())
            .is_some_and(|chunk| chunk.is_editable())
    }

    pub fn queues(&self) -> MutexGuard<'_, UpdateQueues> {
        self.queues.lock()
    }

    pub fn enqueue_back(&self, coord: ChunkCoord) {
        self.queues.lock().push_back(coord);
    }

    /// Move `coords` to the head of the remesh queue, in the given order.
    pub fn enqueue_front(&self, coords: &[ChunkCoord]) {
        self.queues.lock().push_front(coords);
    }

    /// Light and mesh the first ready chunk in the remesh queue.
    ///
    /// Returns `false` when nothing was ready.
    pub fn process_next_remesh(&self) -> bool {
        let coord = {
            let mut queues = self.queues.lock();
            let Some(index) = queues.remesh.iter().position(|c| self.is_ready(*c)) else {
                return false;
            };
            queues.remesh.remove(index)
        };

        let Some(lock) = self.chunk(coord) else {
            return true;
        };

        let mut chunk = lock.write();
        let stale = self
            .propagator
            .light_chunk(&mut chunk, &self.registry, self);
        let chunk = RwLockWriteGuard::downgrade(chunk);
        let mesh = chunk.build_mesh(&self.registry, &self.atlas, self);
        drop(chunk);

        tracing::trace!("Remeshed chunk {:?}: {} quads", coord, mesh.quad_count());

        let stale: Vec<ChunkCoord> = stale
            .into_iter()
            .filter(|c| self.is_editable(*c))
            .collect();
        if !stale.is_empty() {
            let mut queues = self.queues.lock();
            for neighbor in stale {
                queues.push_back(neighbor);
            }
        }

        if self.mesh_tx.send((coord, mesh)).is_err() {
            tracing::debug!("Mesh receiver dropped, discarding mesh for {:?}", coord);
        }
        true
    }
}

impl VoxelSource for WorldShared {
    /// Populated chunks are read directly; anything else is recomputed.
    fn voxel_state(&self, pos: IVec3) -> Voxel {
        if !self.generator.in_world(pos) {
            return Voxel::AIR;
        }
        let coord = ChunkCoord::from_voxel(pos, self.dims.width);
        if let Some(lock) = self.chunk(coord) {
            let chunk = lock.read();
            if chunk.is_editable() {
                return chunk.voxel_from_world(pos).unwrap_or(Voxel::AIR);
            }
        }
        Voxel::new(self.generator.voxel_at(pos))
    }
}

/// Dedicated thread draining the remesh queue.
pub struct MeshWorker {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MeshWorker {
    pub fn spawn(shared: Arc<WorldShared>, idle: Duration) -> io::Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("chunk-mesh".to_string())
            .spawn(move || {
                tracing::info!("Mesh worker started");
                while !flag.load(Ordering::Acquire) {
                    if !shared.process_next_remesh() {
                        thread::sleep(idle);
                    }
                }
                tracing::info!("Mesh worker stopped");
            })?;

        Ok(MeshWorker {
            shutdown,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Ask the worker to finish its current chunk and wait for it.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Mesh worker panicked");
            }
        }
    }
}

impl Drop for MeshWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
