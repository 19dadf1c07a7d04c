//! Lattice gradient noise.
//!
//! Improved gradient noise over an integer lattice: every lattice corner gets a
//! pseudo-random gradient picked through a 256-entry permutation table, and the
//! eight corner contributions around a point are blended with a quintic fade
//! curve. The result is smooth, deterministic for a given table, and lies in
//! roughly `[-1, 1]`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{CumulusError, Result};

/// Number of entries in a permutation table.
pub const TABLE_SIZE: usize = 256;

/// The classic fixed permutation used by improved gradient noise.
const CLASSIC_PERMUTATION: [u8; TABLE_SIZE] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30, 69,
    142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219,
    203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60, 211, 133, 230,
    220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1, 216, 80, 73, 209, 76,
    132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173,
    186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212, 207, 206,
    59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213, 119, 248, 152, 2, 44, 154, 163,
    70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232,
    178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162,
    241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157, 184, 84, 204,
    176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141,
    128, 195, 78, 66, 215, 61, 156, 180,
];

/// A permutation of `0..=255` used to hash lattice coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    entries: [u8; TABLE_SIZE],
}

impl PermutationTable {
    /// Returns the classic fixed table.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            entries: CLASSIC_PERMUTATION,
        }
    }

    /// Builds a table by shuffling `0..=255` with a seeded generator.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut entries = [0u8; TABLE_SIZE];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = i as u8;
        }
        entries.shuffle(&mut rng);
        Self { entries }
    }

    /// Builds a table from raw bytes.
    ///
    /// The slice must hold exactly 256 values with every byte appearing once.
    pub fn from_slice(values: &[u8]) -> Result<Self> {
        if values.len() != TABLE_SIZE {
            return Err(CumulusError::InvalidPermutation(format!(
                "expected {TABLE_SIZE} entries, got {}",
                values.len()
            )));
        }

        let mut seen = [false; TABLE_SIZE];
        for &v in values {
            if seen[v as usize] {
                return Err(CumulusError::InvalidPermutation(format!(
                    "value {v} appears more than once"
                )));
            }
            seen[v as usize] = true;
        }

        let mut entries = [0u8; TABLE_SIZE];
        entries.copy_from_slice(values);
        Ok(Self { entries })
    }

    /// Returns the entry at `index`, wrapping modulo the table size.
    #[inline]
    #[must_use]
    pub fn get(&self, index: i32) -> i32 {
        i32::from(self.entries[(index & 0xff) as usize])
    }

    /// Returns the raw entries.
    #[must_use]
    pub fn entries(&self) -> &[u8; TABLE_SIZE] {
        &self.entries
    }
}

impl Default for PermutationTable {
    fn default() -> Self {
        Self::classic()
    }
}

/// Improved gradient noise evaluated through a permutation table.
#[derive(Debug, Clone, Default)]
pub struct GradientNoise {
    table: PermutationTable,
}

impl GradientNoise {
    /// Creates a noise function over the given table.
    #[must_use]
    pub fn new(table: PermutationTable) -> Self {
        Self { table }
    }

    /// Evaluates the noise at a point.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        let (xf, yf, zf) = (x.floor(), y.floor(), z.floor());

        // Lattice cell, wrapped by `PermutationTable::get`.
        let xi = xf as i32;
        let yi = yf as i32;
        let zi = zf as i32;

        let x = x - xf;
        let y = y - yf;
        let z = z - zf;

        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let p = &self.table;
        let a = p.get(xi) + yi;
        let aa = p.get(a) + zi;
        let ab = p.get(a + 1) + zi;
        let b = p.get(xi + 1) + yi;
        let ba = p.get(b) + zi;
        let bb = p.get(b + 1) + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p.get(aa), x, y, z), grad(p.get(ba), x - 1.0, y, z)),
                lerp(
                    u,
                    grad(p.get(ab), x, y - 1.0, z),
                    grad(p.get(bb), x - 1.0, y - 1.0, z),
                ),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p.get(aa + 1), x, y, z - 1.0),
                    grad(p.get(ba + 1), x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p.get(ab + 1), x, y - 1.0, z - 1.0),
                    grad(p.get(bb + 1), x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Dot product of the offset with one of 12 edge gradients.
#[inline]
fn grad(hash: i32, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let u = if h & 1 == 0 { u } else { -u };
    let v = if h & 2 == 0 { v } else { -v };
    u + v
}
