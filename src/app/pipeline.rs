//! Shared "assemble" pipeline used by the CLI subcommands and tests.
//!
//! Resolves every derived property of a driver in dependency order and
//! gathers the results into one record the inversion can consume:
//! mesh -> survey -> active cells -> models -> static/dynamic split -> magnetization

use nalgebra::{DMatrix, DVector};

use crate::domain::{Bounds, CellIndexSet, ConfigRecord, Norms, SurveyRecord};
use crate::driver::MagneticsDriver;
use crate::error::AppError;
use crate::mesh::TensorMesh;

/// Everything the inversion needs, fully resolved.
#[derive(Debug, Clone)]
pub struct InversionInputs {
    pub config: ConfigRecord,
    pub mesh: TensorMesh,
    pub survey: SurveyRecord,
    /// Mesh cell indices.
    pub active_cells: CellIndexSet,
    /// Positions into `active_cells` (and `m0`/`mref`), not mesh indices.
    pub static_cells: CellIndexSet,
    pub dynamic_cells: CellIndexSet,
    pub m0: DVector<f64>,
    pub mref: DVector<f64>,
    pub weights: Option<DVector<f64>>,
    /// `n_c x 3`
    pub magnetization: DMatrix<f64>,
}

impl InversionInputs {
    pub fn n_c(&self) -> usize {
        self.active_cells.len()
    }

    pub fn alphas(&self) -> [f64; 4] {
        self.config.alphas
    }

    pub fn bounds(&self) -> Bounds {
        self.config.bounds
    }

    pub fn norms(&self) -> Norms {
        self.config.norms
    }

    pub fn epsilon(&self) -> Option<(f64, f64)> {
        self.config.epsilon
    }

    pub fn target_misfit(&self) -> f64 {
        self.config.target_misfit
    }
}

/// Resolve every property of `driver` and collect the results.
pub fn assemble(driver: &MagneticsDriver) -> Result<InversionInputs, AppError> {
    let mesh = driver.mesh()?.clone();
    tracing::info!(shape = ?mesh.shape(), cells = mesh.n_cells(), "mesh loaded");

    let survey = driver.survey()?.clone();
    tracing::info!(receivers = survey.n_receivers(), "survey loaded");

    let active_cells = driver.active_cells()?.to_vec();
    tracing::info!(active = active_cells.len(), "active cells resolved");

    let m0 = driver.m0()?.clone();
    let mref = driver.mref()?.clone();
    let weights = driver.weights()?.cloned();

    let static_cells = driver.static_cells()?.to_vec();
    let dynamic_cells = driver.dynamic_cells()?.to_vec();
    tracing::info!(
        static_cells = static_cells.len(),
        dynamic_cells = dynamic_cells.len(),
        "cell partition resolved"
    );

    let magnetization = driver.magnetization_model()?.clone();

    Ok(InversionInputs {
        config: driver.config().clone(),
        mesh,
        survey,
        active_cells,
        static_cells,
        dynamic_cells,
        m0,
        mref,
        weights,
        magnetization,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn assembles_a_complete_run() {
        let dir = tempfile::tempdir().unwrap();
        let files = [
            ("mesh.msh", "3 1 2\n0 0 0\n3*10\n10\n2*5\n"),
            ("obs.mag", "70 10 55000\n70 10 1\n2\n5 5 1 3.5 0.2\n15 5 1 -1.0\n"),
            (
                "inv.inp",
                "mesh.msh\nobs.mag\nnull\nVALUE 1e-4\nVALUE 0\nVALUE 1e-4\nDEFAULT\nDEFAULT\n1\n0.0025 1 1 1\nVALUE 0 1\nVALUE 0 2 2 2 2\nVALUE 1e-4 1e-4\n",
            ),
        ];
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }

        let driver = MagneticsDriver::from_file(&dir.path().join("inv.inp")).unwrap();
        let inputs = assemble(&driver).unwrap();

        assert_eq!(inputs.n_c(), 6);
        assert_eq!(inputs.survey.data, vec![3.5, -1.0]);
        // every starting value equals the static literal
        assert_eq!(inputs.static_cells.len(), 6);
        assert!(inputs.dynamic_cells.is_empty());
        assert_eq!(inputs.magnetization.nrows(), 6);
        assert_eq!(inputs.bounds(), Bounds::Bounded { lower: 0.0, upper: 1.0 });
        assert_eq!(inputs.norms(), Norms::Custom([0.0, 2.0, 2.0, 2.0, 2.0]));
        assert_eq!(inputs.epsilon(), Some((1e-4, 1e-4)));
        assert_eq!(inputs.alphas(), [0.0025, 1.0, 1.0, 1.0]);
        assert_eq!(inputs.target_misfit(), 1.0);
    }
}
