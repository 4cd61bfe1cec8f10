//! Ground surfaces that placement samples from

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Regular grid of heights covering a rectangle of the XZ plane.
///
/// Sample `(col, row)` sits at `origin + (col * cell_x, _, row * cell_z)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    /// Corner with the smallest x and z; `origin.y` offsets every height
    pub origin: Vec3,
    /// Extent along x and z
    pub size: Vec2,
    cols: usize,
    rows: usize,
    heights: Vec<f32>,
}

impl HeightField {
    /// Build from row-major heights. `None` if the grid is smaller than
    /// 1x1 or the height count does not match.
    pub fn new(origin: Vec3, size: Vec2, cols: usize, rows: usize, heights: Vec<f32>) -> Option<Self> {
        if cols == 0 || rows == 0 || heights.len() != cols * rows {
            return None;
        }
        Some(Self {
            origin,
            size,
            cols,
            rows,
            heights,
        })
    }

    /// Build by evaluating `f(x, z)` at every grid point, in local coordinates
    pub fn from_fn(origin: Vec3, size: Vec2, cols: usize, rows: usize, f: impl Fn(f32, f32) -> f32) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let step = |extent: f32, n: usize| if n > 1 { extent / (n - 1) as f32 } else { 0.0 };
        let (dx, dz) = (step(size.x, cols), step(size.y, rows));

        let heights = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (col, row)))
            .map(|(col, row)| f(col as f32 * dx, row as f32 * dz))
            .collect();

        Self {
            origin,
            size,
            cols,
            rows,
            heights,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    fn height_at(&self, col: usize, row: usize) -> f32 {
        self.heights[row * self.cols + col]
    }

    /// World-space height at `(x, z)`, bilinearly interpolated and clamped
    /// to the field's edges
    pub fn sample_height(&self, x: f32, z: f32) -> f32 {
        let grid = |value: f32, origin: f32, extent: f32, n: usize| -> f32 {
            if n < 2 || extent <= 0.0 {
                return 0.0;
            }
            (((value - origin) / extent).clamp(0.0, 1.0)) * (n - 1) as f32
        };

        let gx = grid(x, self.origin.x, self.size.x, self.cols);
        let gz = grid(z, self.origin.z, self.size.y, self.rows);

        let c0 = gx.floor() as usize;
        let r0 = gz.floor() as usize;
        let c1 = (c0 + 1).min(self.cols - 1);
        let r1 = (r0 + 1).min(self.rows - 1);
        let (tx, tz) = (gx - c0 as f32, gz - r0 as f32);

        let near = self.height_at(c0, r0) + (self.height_at(c1, r0) - self.height_at(c0, r0)) * tx;
        let far = self.height_at(c0, r1) + (self.height_at(c1, r1) - self.height_at(c0, r1)) * tx;
        self.origin.y + near + (far - near) * tz
    }
}

/// Where placement draws candidate positions from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnSurface {
    /// Rectangle of size `size` centred on `center`, at `center.y`
    Flat { center: Vec3, size: Vec2 },
    /// Anywhere on a height field, snapped to its surface
    Terrain(HeightField),
}

impl Default for SpawnSurface {
    fn default() -> Self {
        Self::Flat {
            center: Vec3::ZERO,
            size: Vec2::new(100.0, 100.0),
        }
    }
}

/// Uniform draw in `[lo, hi)`, or `lo` for an empty or unbounded range
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo && (hi - lo).is_finite() {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl SpawnSurface {
    /// Draw one uniformly distributed point on the surface
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        match self {
            SpawnSurface::Flat { center, size } => {
                let half = *size * 0.5;
                let x = uniform(rng, center.x - half.x, center.x + half.x);
                let z = uniform(rng, center.z - half.y, center.z + half.y);
                Vec3::new(x, center.y, z)
            }
            SpawnSurface::Terrain(field) => {
                let x = uniform(rng, field.origin.x, field.origin.x + field.size.x);
                let z = uniform(rng, field.origin.z, field.origin.z + field.size.y);
                Vec3::new(x, field.sample_height(x, z), z)
            }
        }
    }
}
