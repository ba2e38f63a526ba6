//! Per-cell model files in UBC order.
//!
//! A model file holds one value per mesh cell, ordered with z fastest
//! (top-down), then x, then y. Values are reordered into mesh cell numbering
//! on read.

use std::path::Path;

use nalgebra::DVector;

use crate::error::{AppError, read_text};
use crate::io::line::{Line, parse_f64};
use crate::mesh::TensorMesh;

/// Read a full-mesh model into cell order.
pub fn read_ubc_model(path: &Path, mesh: &TensorMesh) -> Result<DVector<f64>, AppError> {
    let text = read_text(path)?;

    let mut values = Vec::with_capacity(mesh.n_cells());
    for (idx, raw) in text.lines().enumerate() {
        let line = Line::new(path, idx + 1, raw);
        for tok in line.tokens() {
            let v = parse_f64(tok).ok_or_else(|| line.error(format!("Invalid model value '{tok}'.")))?;
            values.push(v);
        }
    }

    if values.len() != mesh.n_cells() {
        return Err(AppError::Invalid(format!(
            "Model '{}' has {} values but the mesh has {} cells.",
            path.display(),
            values.len(),
            mesh.n_cells()
        )));
    }

    tracing::debug!(file = %path.display(), cells = values.len(), "read model");
    Ok(ubc_to_cell_order(mesh, &values))
}

/// Reorder values from UBC file order into mesh cell numbering.
pub fn ubc_to_cell_order(mesh: &TensorMesh, values: &[f64]) -> DVector<f64> {
    let [nx, _, nz] = mesh.shape();
    let mut out = DVector::zeros(values.len());
    for (f, &v) in values.iter().enumerate() {
        let iz_top = f % nz;
        let ix = (f / nz) % nx;
        let iy = f / (nz * nx);
        out[mesh.cell_index(ix, iy, nz - 1 - iz_top)] = v;
    }
    out
}

/// Pick the entries of a full-mesh vector at the given cells.
pub fn restrict(values: &DVector<f64>, cells: &[usize]) -> DVector<f64> {
    DVector::from_iterator(cells.len(), cells.iter().map(|&c| values[c]))
}
