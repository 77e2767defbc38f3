use crate::core::chunk::ChunkCoord;
use crate::render::atlas::TextureAtlas;
use crate::render::mesh::ChunkMesh;

/// Rendering collaborator fed by the world streamer.
///
/// Every call is made from the thread that drives [`crate::World::update`],
/// which must be the thread owning the graphics context.
pub trait ChunkRenderer {
    fn set_mesh(&mut self, coord: ChunkCoord, mesh: &ChunkMesh, atlas: &TextureAtlas);

    fn set_active(&mut self, coord: ChunkCoord, active: bool);
}

/// Renderer that only counts what it receives. Used by the headless driver.
#[derive(Debug, Default)]
pub struct StatsRenderer {
    pub meshes_uploaded: usize,
    pub quads_uploaded: usize,
    pub activations: usize,
    pub deactivations: usize,
}

impl ChunkRenderer for StatsRenderer {
    fn set_mesh(&mut self, coord: ChunkCoord, mesh: &ChunkMesh, _atlas: &TextureAtlas) {
        self.meshes_uploaded += 1;
        self.quads_uploaded += mesh.quad_count();
        tracing::trace!("Uploaded mesh for {:?}: {} quads", coord, mesh.quad_count());
    }

    fn set_active(&mut self, _coord: ChunkCoord, active: bool) {
        if active {
            self.activations += 1;
        } else {
            self.deactivations += 1;
        }
    }
}
