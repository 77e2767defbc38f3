use crate::constants::TEXTURE_ATLAS_SIZE;

/// Square texture atlas laid out as an evenly spaced `size x size` grid.
///
/// Texture ids run left to right, top to bottom.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TextureAtlas {
    size_in_blocks: u32,
}

impl TextureAtlas {
    pub fn new(size_in_blocks: u32) -> Self {
        TextureAtlas {
            size_in_blocks: size_in_blocks.max(1),
        }
    }

    /// Normalized size of one tile.
    pub fn tile_size(&self) -> f32 {
        1.0 / self.size_in_blocks as f32
    }

    /// UV corners of a tile, matching the quad corner order used by the mesher.
    pub fn uv_rect(&self, texture_id: u16) -> [[f32; 2]; 4] {
        let id = texture_id as u32;
        let row = id / self.size_in_blocks;
        let col = id % self.size_in_blocks;
        let n = self.tile_size();

        let x = col as f32 * n;
        let y = 1.0 - row as f32 * n - n;

        [[x, y], [x, y + n], [x + n, y], [x + n, y + n]]
    }
}

impl Default for TextureAtlas {
    fn default() -> Self {
        TextureAtlas::new(TEXTURE_ATLAS_SIZE)
    }
}
