//! Rectilinear (tensor) meshes in UBC format.
//!
//! UBC mesh files:
//!
//! ```text
//! nx ny nz
//! x0 y0 z0          top south-west corner
//! dx_1 ... dx_nx    widths along x (west to east)
//! dy_1 ... dy_ny    widths along y (south to north)
//! dz_1 ... dz_nz    widths along z (top to bottom)
//! ```
//!
//! Widths accept the `n*w` shorthand for `n` repeated widths. Internally the
//! z axis runs bottom-up and cells are numbered `ix + nx * (iy + ny * iz)`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, read_text};
use crate::io::line::{Line, parse_f64};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorMesh {
    /// Bottom south-west corner.
    pub origin: [f64; 3],
    /// Cell widths per axis; z is bottom-up.
    pub widths: [Vec<f64>; 3],
}

impl TensorMesh {
    pub fn new(origin: [f64; 3], hx: Vec<f64>, hy: Vec<f64>, hz: Vec<f64>) -> Self {
        Self {
            origin,
            widths: [hx, hy, hz],
        }
    }

    pub fn shape(&self) -> [usize; 3] {
        [self.widths[0].len(), self.widths[1].len(), self.widths[2].len()]
    }

    pub fn n_cells(&self) -> usize {
        self.shape().iter().product()
    }

    /// Split a cell index into `(ix, iy, iz)`.
    pub fn cell_ijk(&self, cell: usize) -> [usize; 3] {
        let [nx, ny, _] = self.shape();
        [cell % nx, (cell / nx) % ny, cell / (nx * ny)]
    }

    pub fn cell_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        let [nx, ny, _] = self.shape();
        ix + nx * (iy + ny * iz)
    }

    /// Cell-centre coordinates along one axis.
    pub fn centers(&self, axis: usize) -> Vec<f64> {
        let mut edge = self.origin[axis];
        self.widths[axis]
            .iter()
            .map(|w| {
                let c = edge + w / 2.0;
                edge += w;
                c
            })
            .collect()
    }
}

/// Read a UBC tensor mesh file.
pub fn read_ubc_mesh(path: &Path) -> Result<TensorMesh, AppError> {
    let text = read_text(path)?;
    let lines: Vec<Line<'_>> = text
        .lines()
        .enumerate()
        .map(|(idx, text)| Line::new(path, idx + 1, text))
        .filter(|line| !line.tokens().is_empty())
        .collect();
    if lines.len() < 5 {
        return Err(AppError::format(
            path,
            text.lines().count() + 1,
            "Unexpected end of file: a UBC mesh has 5 lines.",
        ));
    }

    let shape = lines[0].tokens();
    if shape.len() < 3 {
        return Err(lines[0].error("Expected `nx ny nz`."));
    }
    let mut n = [0usize; 3];
    for (slot, tok) in n.iter_mut().zip(&shape) {
        *slot = tok
            .parse::<usize>()
            .ok()
            .filter(|v| *v > 0)
            .ok_or_else(|| lines[0].error(format!("Invalid cell count '{tok}'.")))?;
    }
    if n[0].checked_mul(n[1]).and_then(|c| c.checked_mul(n[2])).is_none() {
        return Err(lines[0].error(format!("Mesh of {} x {} x {} cells is too large.", n[0], n[1], n[2])));
    }

    let corner = lines[1].numbers(3)?;
    let hx = widths(&lines[2], n[0])?;
    let hy = widths(&lines[3], n[1])?;
    let mut hz = widths(&lines[4], n[2])?;

    let depth: f64 = hz.iter().sum();
    hz.reverse();

    let mesh = TensorMesh::new([corner[0], corner[1], corner[2] - depth], hx, hy, hz);
    tracing::debug!(file = %path.display(), shape = ?mesh.shape(), "read mesh");
    Ok(mesh)
}

/// Expand a width line, honoring `n*w` repeats, and check its length.
fn widths(line: &Line<'_>, expected: usize) -> Result<Vec<f64>, AppError> {
    let tokens = line.tokens();
    let mut out = Vec::with_capacity(tokens.len().min(expected));
    for tok in tokens {
        let (count, width) = match tok.split_once('*') {
            Some((count, width)) => {
                let count = count
                    .parse::<usize>()
                    .map_err(|_| line.error(format!("Invalid repeat count in '{tok}'.")))?;
                (count, width)
            }
            None => (1, tok),
        };
        let width = parse_f64(width)
            .filter(|w| *w > 0.0)
            .ok_or_else(|| line.error(format!("Invalid cell width '{tok}'.")))?;
        if count > expected - out.len() {
            return Err(line.error(format!("Expected {expected} cell widths, found more.")));
        }
        out.extend(std::iter::repeat_n(width, count));
    }
    if out.len() != expected {
        return Err(line.error(format!("Expected {expected} cell widths, found {}.", out.len())));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_mesh_with_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.msh");
        fs::write(&path, "2 3 2\n-10 0 100\n2*5\n1 2 3\n10 30\n").unwrap();

        let mesh = read_ubc_mesh(&path).unwrap();
        assert_eq!(mesh.shape(), [2, 3, 2]);
        assert_eq!(mesh.n_cells(), 12);
        assert_eq!(mesh.origin, [-10.0, 0.0, 60.0]);
        // top-down widths are stored bottom-up
        assert_eq!(mesh.widths[2], vec![30.0, 10.0]);
        assert_eq!(mesh.centers(0), vec![-7.5, -2.5]);
        assert_eq!(mesh.centers(2), vec![75.0, 95.0]);
    }

    #[test]
    fn width_count_must_match_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.msh");
        fs::write(&path, "2 1 1\n0 0 0\n3*5\n1\n1\n").unwrap();
        assert!(matches!(read_ubc_mesh(&path), Err(AppError::Format { line: 3, .. })));
    }

    #[test]
    fn oversized_repeat_is_rejected_before_expanding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.msh");
        fs::write(&path, "2 1 1\n0 0 0\n99999999999*5\n1\n1\n").unwrap();
        assert!(matches!(read_ubc_mesh(&path), Err(AppError::Format { line: 3, .. })));
    }

    #[test]
    fn overflowing_cell_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.msh");
        fs::write(&path, "4294967296 4294967296 2\n0 0 0\n1\n1\n1\n").unwrap();
        assert!(matches!(read_ubc_mesh(&path), Err(AppError::Format { line: 1, .. })));
    }

    #[test]
    fn cell_numbering_is_x_fastest() {
        let mesh = TensorMesh::new([0.0; 3], vec![1.0; 2], vec![1.0; 3], vec![1.0; 4]);
        assert_eq!(mesh.cell_index(1, 2, 3), 1 + 2 * (2 + 3 * 3));
        assert_eq!(mesh.cell_ijk(mesh.cell_index(1, 2, 3)), [1, 2, 3]);
    }
}
