//! Seeded coherent noise used by the voxel generator
//!
//! Samples are remapped into [0, 1] so they can be used directly as biome
//! weights and height fractions.

use glam::IVec3;
use ::noise::{NoiseFn, Perlin};

/// Nudge off the integer lattice where Perlin is always zero.
const LATTICE_NUDGE: f64 = 0.1;

#[derive(Clone)]
pub struct TerrainNoise {
    perlin: Perlin,
    chunk_width: f64,
}

impl TerrainNoise {
    pub fn new(seed: u32, chunk_width: i32) -> Self {
        TerrainNoise {
            perlin: Perlin::new(seed),
            chunk_width: chunk_width.max(1) as f64,
        }
    }

    /// 2D Perlin in [0, 1] at world column (x, z).
    pub fn sample_2d(&self, x: i32, z: i32, offset: f32, scale: f32) -> f32 {
        let scale = scale as f64;
        let offset = offset as f64;
        let nx = (x as f64 + LATTICE_NUDGE) / self.chunk_width * scale + offset;
        let nz = (z as f64 + LATTICE_NUDGE) / self.chunk_width * scale + offset;
        self.unit(nx, nz)
    }

    /// Pseudo-3D noise test built from the six axis-pair 2D samples.
    pub fn sample_3d(&self, pos: IVec3, offset: f32, scale: f32, threshold: f32) -> bool {
        let scale = scale as f64;
        let offset = offset as f64;
        let x = (pos.x as f64 + offset + LATTICE_NUDGE) * scale;
        let y = (pos.y as f64 + offset + LATTICE_NUDGE) * scale;
        let z = (pos.z as f64 + offset + LATTICE_NUDGE) * scale;

        let ab = self.unit(x, y);
        let bc = self.unit(y, z);
        let ac = self.unit(x, z);
        let ba = self.unit(y, x);
        let cb = self.unit(z, y);
        let ca = self.unit(z, x);

        (ab + bc + ac + ba + cb + ca) / 6.0 > threshold
    }

    fn unit(&self, a: f64, b: f64) -> f32 {
        ((self.perlin.get([a, b]) + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}
