use glam::{IVec3, Vec3};

use crate::constants::*;
use crate::core::block::{BlockFace, BlockId, BlockRegistry};
use crate::render::atlas::TextureAtlas;
use crate::render::mesh::ChunkMesh;
use crate::world::generator::VoxelGenerator;
use crate::world::light::LightPropagator;

/// Chunk footprint: `width` x `height` x `width` voxels.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChunkDims {
    pub width: i32,
    pub height: i32,
}

impl ChunkDims {
    pub fn new(width: i32, height: i32) -> Self {
        ChunkDims { width, height }
    }

    pub fn volume(&self) -> usize {
        (self.width * self.width * self.height) as usize
    }
}

impl Default for ChunkDims {
    fn default() -> Self {
        ChunkDims::new(CHUNK_WIDTH, CHUNK_HEIGHT)
    }
}

/// Position of a chunk in the world grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// Chunk owning the world-space position.
    pub fn from_world(pos: Vec3, width: i32) -> Self {
        Self::from_voxel(pos.floor().as_ivec3(), width)
    }

    pub fn from_voxel(pos: IVec3, width: i32) -> Self {
        ChunkCoord {
            x: pos.x.div_euclid(width),
            z: pos.z.div_euclid(width),
        }
    }

    pub fn origin(&self, width: i32) -> IVec3 {
        IVec3::new(self.x * width, 0, self.z * width)
    }

    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        ChunkCoord::new(self.x + dx, self.z + dz)
    }
}

/// A single grid cell: block id plus the light reaching it.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Voxel {
    pub id: BlockId,
    /// Light level in [0, 1].
    pub light: f32,
}

impl Voxel {
    pub const AIR: Voxel = Voxel { id: AIR, light: 0.0 };

    pub fn new(id: BlockId) -> Self {
        Voxel { id, light: 0.0 }
    }
}

/// Global voxel lookup used when a query leaves the chunk being processed.
pub trait VoxelSource {
    fn voxel_state(&self, pos: IVec3) -> Voxel;
}

impl<F> VoxelSource for F
where
    F: Fn(IVec3) -> Voxel,
{
    fn voxel_state(&self, pos: IVec3) -> Voxel {
        self(pos)
    }
}

pub struct Chunk {
    coord: ChunkCoord,
    dims: ChunkDims,
    voxels: Vec<Voxel>,
    populated: bool,
    active: bool,
}

impl Chunk {
    pub fn new(coord: ChunkCoord, dims: ChunkDims) -> Self {
        Chunk {
            coord,
            dims,
            voxels: vec![Voxel::AIR; dims.volume()],
            populated: false,
            active: false,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn origin(&self) -> IVec3 {
        self.coord.origin(self.dims.width)
    }

    /// Voxels may only be read or written once population has finished.
    pub fn is_editable(&self) -> bool {
        self.populated
    }

    /// Hidden until the view region first covers the chunk.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn contains_local(&self, local: IVec3) -> bool {
        local.x >= 0
            && local.x < self.dims.width
            && local.y >= 0
            && local.y < self.dims.height
            && local.z >= 0
            && local.z < self.dims.width
    }

    fn index(&self, local: IVec3) -> usize {
        let w = self.dims.width;
        (local.x + local.z * w + local.y * w * w) as usize
    }

    pub fn voxel(&self, local: IVec3) -> Option<Voxel> {
        if self.contains_local(local) {
            Some(self.voxels[self.index(local)])
        } else {
            None
        }
    }

    pub fn voxel_mut(&mut self, local: IVec3) -> Option<&mut Voxel> {
        if self.contains_local(local) {
            let index = self.index(local);
            Some(&mut self.voxels[index])
        } else {
            None
        }
    }

    pub fn voxel_from_world(&self, pos: IVec3) -> Option<Voxel> {
        self.voxel(pos - self.origin())
    }

    /// Fill every voxel from the generator, one column at a time.
    pub fn populate(&mut self, generator: &VoxelGenerator) {
        let origin = self.origin();
        for x in 0..self.dims.width {
            for z in 0..self.dims.width {
                let column = generator.column(origin.x + x, origin.z + z);
                for y in 0..self.dims.height {
                    let local = IVec3::new(x, y, z);
                    let id = generator.voxel_in_column(origin + local, &column);
                    let index = self.index(local);
                    self.voxels[index] = Voxel::new(id);
                }
            }
        }
        self.populated = true;
    }

    /// Set the voxel at `pos` (world space) to `id`.
    ///
    /// Returns the coordinates of the horizontal neighbours whose meshes
    /// share a face with the edited voxel, or `None` if the edit was refused.
    pub fn edit_voxel(&mut self, pos: IVec3, id: BlockId) -> Option<Vec<ChunkCoord>> {
        if !self.populated {
            return None;
        }
        let local = pos - self.origin();
        let voxel = self.voxel_mut(local)?;
        voxel.id = id;

        let mut neighbors = Vec::new();
        for face in BlockFace::ALL {
            let adjacent = local + IVec3::from(face.offset());
            let vertical_exit = adjacent.y < 0 || adjacent.y >= self.dims.height;
            if !self.contains_local(adjacent) && !vertical_exit {
                neighbors.push(ChunkCoord::from_voxel(
                    self.origin() + adjacent,
                    self.dims.width,
                ));
            }
        }
        Some(neighbors)
    }

    /// In-chunk light pass: sky scan followed by a flood fill.
    pub fn compute_light(&mut self, propagator: &LightPropagator, registry: &BlockRegistry) {
        let queue = propagator.sky_pass(self, registry);
        propagator.flood(self, queue);
    }

    /// Extract every visible face of every solid voxel.
    ///
    /// Positions are local to the chunk origin. Neighbours outside this chunk
    /// are resolved through `source`.
    pub fn build_mesh<S: VoxelSource + ?Sized>(
        &self,
        registry: &BlockRegistry,
        atlas: &TextureAtlas,
        source: &S,
    ) -> ChunkMesh {
        let mut mesh = ChunkMesh::default();
        let origin = self.origin();

        for y in 0..self.dims.height {
            for z in 0..self.dims.width {
                for x in 0..self.dims.width {
                    let local = IVec3::new(x, y, z);
                    let voxel = self.voxels[self.index(local)];
                    let block = registry.get(voxel.id);
                    if !block.is_solid() {
                        continue;
                    }

                    for face in BlockFace::ALL {
                        let adjacent = local + IVec3::from(face.offset());
                        let neighbor = match self.voxel(adjacent) {
                            Some(v) => v,
                            None => source.voxel_state(origin + adjacent),
                        };

                        if registry.get(neighbor.id).exposes_faces() {
                            mesh.push_face(
                                local.as_vec3(),
                                face,
                                atlas.uv_rect(block.texture_id(face)),
                                neighbor.light,
                            );
                        }
                    }
                }
            }
        }

        mesh
    }

    #[cfg(test)]
    pub(crate) fn fill_with(&mut self, f: impl Fn(IVec3) -> BlockId) {
        for y in 0..self.dims.height {
            for z in 0..self.dims.width {
                for x in 0..self.dims.width {
                    let local = IVec3::new(x, y, z);
                    let index = self.index(local);
                    self.voxels[index] = Voxel::new(f(local));
                }
            }
        }
        self.populated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRASS: BlockId = 1;
    const GLASS: BlockId = 9;

    fn small_dims() -> ChunkDims {
        ChunkDims::new(4, 8)
    }

    fn open_air(_: IVec3) -> Voxel {
        Voxel::AIR
    }

    fn solid_stone(_: IVec3) -> Voxel {
        Voxel::new(STONE)
    }

    #[test]
    fn test_coord_from_world_floors() {
        assert_eq!(ChunkCoord::from_world(Vec3::new(15.9, 3.0, 0.0), 16), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(Vec3::new(16.0, 3.0, 33.0), 16), ChunkCoord::new(1, 2));
        assert_eq!(ChunkCoord::from_world(Vec3::new(-0.5, 0.0, -17.0), 16), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_new_chunk_starts_hidden() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        assert!(!chunk.is_active());
        chunk.set_active(true);
        assert!(chunk.is_active());
    }

    #[test]
    fn test_edit_refused_before_population() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        assert!(!chunk.is_editable());
        assert!(chunk.edit_voxel(IVec3::new(1, 1, 1), GRASS).is_none());
    }

    #[test]
    fn test_edit_interior_has_no_neighbors() {
        let mut chunk = Chunk::new(ChunkCoord::new(1, 1), small_dims());
        chunk.fill_with(|_| STONE);
        let neighbors = chunk.edit_voxel(IVec3::new(5, 3, 6), AIR).unwrap();
        assert!(neighbors.is_empty());
        assert_eq!(chunk.voxel(IVec3::new(1, 3, 2)).unwrap().id, AIR);
    }

    #[test]
    fn test_edit_corner_reports_both_neighbors() {
        let mut chunk = Chunk::new(ChunkCoord::new(1, 1), small_dims());
        chunk.fill_with(|_| STONE);
        let neighbors = chunk.edit_voxel(IVec3::new(4, 0, 7), AIR).unwrap();
        assert_eq!(neighbors, vec![ChunkCoord::new(1, 2), ChunkCoord::new(0, 1)]);
    }

    #[test]
    fn test_edit_outside_chunk_is_refused() {
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.fill_with(|_| STONE);
        assert!(chunk.edit_voxel(IVec3::new(4, 0, 0), AIR).is_none());
        assert!(chunk.edit_voxel(IVec3::new(0, 8, 0), AIR).is_none());
    }

    #[test]
    fn test_single_block_has_six_faces() {
        let registry = BlockRegistry::default();
        let atlas = TextureAtlas::new(4);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.fill_with(|p| if p == IVec3::new(1, 1, 1) { STONE } else { AIR });

        let mesh = chunk.build_mesh(&registry, &atlas, &open_air);
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangles.len(), 36);
        assert_eq!(mesh.uvs.len(), 24);
        assert_eq!(mesh.colors.len(), 24);
        assert_eq!(mesh.normals.len(), 24);
    }

    #[test]
    fn test_interior_faces_are_culled() {
        let registry = BlockRegistry::default();
        let atlas = TextureAtlas::new(4);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.fill_with(|_| STONE);

        // Fully enclosed by stone.
        let mesh = chunk.build_mesh(&registry, &atlas, &solid_stone);
        assert!(mesh.is_empty());

        // Two touching blocks share a hidden face.
        chunk.fill_with(|p| {
            if p == IVec3::new(1, 1, 1) || p == IVec3::new(2, 1, 1) {
                STONE
            } else {
                AIR
            }
        });
        let mesh = chunk.build_mesh(&registry, &atlas, &open_air);
        assert_eq!(mesh.quad_count(), 10);
    }

    #[test]
    fn test_glass_exposes_neighbor_faces() {
        let registry = BlockRegistry::default();
        let atlas = TextureAtlas::new(4);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.fill_with(|p| match (p.x, p.y, p.z) {
            (1, 1, 1) => STONE,
            (2, 1, 1) => GLASS,
            _ => AIR,
        });
        let mesh = chunk.build_mesh(&registry, &atlas, &open_air);
        // Stone shows all 6, glass hides the face against stone.
        assert_eq!(mesh.quad_count(), 11);
    }

    #[test]
    fn test_boundary_lookup_goes_through_source() {
        let registry = BlockRegistry::default();
        let atlas = TextureAtlas::new(4);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.fill_with(|p| if p.x == 0 && p.y == 0 && p.z == 0 { STONE } else { AIR });

        let stone_outside = |pos: IVec3| {
            if pos.x < 0 || pos.z < 0 || pos.y < 0 {
                Voxel::new(STONE)
            } else {
                Voxel::AIR
            }
        };
        let mesh = chunk.build_mesh(&registry, &atlas, &stone_outside);
        // Left, back and bottom are hidden by the outside world.
        assert_eq!(mesh.quad_count(), 3);
    }

    #[test]
    fn test_face_color_uses_neighbor_light() {
        let registry = BlockRegistry::default();
        let atlas = TextureAtlas::new(4);
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0), small_dims());
        chunk.fill_with(|p| if p.y == 0 { STONE } else { AIR });
        chunk.voxel_mut(IVec3::new(0, 1, 0)).unwrap().light = 0.75;

        let mesh = chunk.build_mesh(&registry, &atlas, &solid_stone);
        let top_face = mesh
            .normals
            .iter()
            .position(|n| *n == [0.0, 1.0, 0.0])
            .unwrap();
        assert_eq!(mesh.colors[top_face], [0.0, 0.0, 0.0, 0.75]);
    }
}
