//! Raw embedding-matrix blobs and cosine scoring.
//!
//! A blob is rows * dim little-endian f32 values with no header; row count
//! and dimension live in the sibling metadata JSON.

use std::fs;
use std::path::Path;

use hearth_core::error::{EngineError, Result};

pub fn write_matrix(path: &Path, rows: &[Vec<f32>]) -> Result<()> {
    let dim = rows.first().map_or(0, Vec::len);
    let mut bytes = Vec::with_capacity(rows.len() * dim * 4);
    for row in rows {
        for v in row {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_matrix(path: &Path, rows: usize, dim: usize) -> Result<Vec<Vec<f32>>> {
    let bytes = fs::read(path)?;
    let expected = rows * dim * 4;
    if bytes.len() != expected {
        return Err(EngineError::VectorStoreIo(format!(
            "{}: expected {} bytes ({} x {}), found {}",
            path.display(),
            expected,
            rows,
            dim,
            bytes.len()
        )));
    }
    let mut matrix = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut row = Vec::with_capacity(dim);
        for c in 0..dim {
            let off = (r * dim + c) * 4;
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[off..off + 4]);
            row.push(f32::from_le_bytes(buf));
        }
        matrix.push(row);
    }
    Ok(matrix)
}

/// Cosine similarity of `query` against each matrix row.
///
/// Norms are epsilon-guarded so zero vectors score 0 instead of dividing by
/// zero.
pub fn cosine_scores(query: &[f32], matrix: &[Vec<f32>]) -> Vec<f32> {
    const EPS: f32 = 1e-8;
    let q_norm = query.iter().map(|x| x * x).sum::<f32>().sqrt() + EPS;
    matrix
        .iter()
        .map(|row| {
            let r_norm = row.iter().map(|x| x * x).sum::<f32>().sqrt() + EPS;
            let dot: f32 = query.iter().zip(row.iter()).map(|(a, b)| a * b).sum();
            dot / (q_norm * r_norm)
        })
        .collect()
}
