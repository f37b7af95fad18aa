//! Orthonormal 8×8 DCT-II and its inverse.

use crate::config::dct_params::BLOCK_SIZE;
use std::sync::OnceLock;

/// One 8×8 block, row-major: `block[row][col]`.
pub type Block = [[f64; BLOCK_SIZE]; BLOCK_SIZE];

/// `BASIS[u][x] = C(u) * cos((2x + 1) * u * PI / 16)` with C(0) = 1/sqrt(8), C(u>0) = 1/2.
static BASIS: OnceLock<Block> = OnceLock::new();

fn basis() -> &'static Block {
    BASIS.get_or_init(|| {
        let mut table = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
        for (u, row) in table.iter_mut().enumerate() {
            let norm = if u == 0 {
                1.0 / (BLOCK_SIZE as f64).sqrt()
            } else {
                (2.0 / BLOCK_SIZE as f64).sqrt()
            };
            for (x, value) in row.iter_mut().enumerate() {
                let angle = (2 * x + 1) as f64 * u as f64 * std::f64::consts::PI
                    / (2 * BLOCK_SIZE) as f64;
                *value = norm * angle.cos();
            }
        }
        table
    })
}

/// Spatial samples to frequency coefficients.
pub fn forward(block: &Block) -> Block {
    let b = basis();
    // Rows first, then columns.
    let mut tmp = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for y in 0..BLOCK_SIZE {
        for v in 0..BLOCK_SIZE {
            tmp[y][v] = (0..BLOCK_SIZE).map(|x| b[v][x] * block[y][x]).sum();
        }
    }
    let mut out = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for u in 0..BLOCK_SIZE {
        for v in 0..BLOCK_SIZE {
            out[u][v] = (0..BLOCK_SIZE).map(|y| b[u][y] * tmp[y][v]).sum();
        }
    }
    out
}

/// Frequency coefficients back to spatial samples.
pub fn inverse(coeffs: &Block) -> Block {
    let b = basis();
    let mut tmp = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for u in 0..BLOCK_SIZE {
        for x in 0..BLOCK_SIZE {
            tmp[u][x] = (0..BLOCK_SIZE).map(|v| b[v][x] * coeffs[u][v]).sum();
        }
    }
    let mut out = [[0.0f64; BLOCK_SIZE]; BLOCK_SIZE];
    for y in 0..BLOCK_SIZE {
        for x in 0..BLOCK_SIZE {
            out[y][x] = (0..BLOCK_SIZE).map(|u| b[u][y] * tmp[u][x]).sum();
        }
    }
    out
}
