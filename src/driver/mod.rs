//! The derived-property graph behind a driver file.
//!
//! `MagneticsDriver` owns the decoded `ConfigRecord` and resolves everything
//! else on demand:
//!
//! ```text
//! mesh ──► active_cells ──► n_c ──► m0 / mref / weights
//!                                      │
//!                                      ▼
//!                          static_cells / dynamic_cells
//! survey ──► magnetization_model
//! ```
//!
//! Every property has its own `OnceLock` slot: the first successful
//! computation is stored and returned to every later caller. Failures are
//! not cached, so a failing accessor fails the same way each time it is
//! called. Nothing is ever invalidated; re-reading a driver file means
//! building a new `MagneticsDriver`.

use std::path::Path;
use std::sync::OnceLock;

use nalgebra::{DMatrix, DVector};

use crate::domain::{
    CellIndexSet, ConfigRecord, FieldOrder, MagnetizationSpec, ModelSource, StaticSpec, SurveyRecord,
};
use crate::error::AppError;
use crate::io::driver::read_driver;
use crate::io::observations::read_observations;
use crate::math::dip_azimuth_to_xyz;
use crate::mesh::{TensorMesh, Topography, read_ubc_mesh, read_ubc_model, restrict};

/// Labels in a static-cell file.
const LABEL_STATIC: f64 = -1.0;
const LABEL_DYNAMIC: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellRole {
    Static,
    Dynamic,
}

#[derive(Debug)]
pub struct MagneticsDriver {
    config: ConfigRecord,
    field_order: FieldOrder,

    mesh: OnceLock<TensorMesh>,
    survey: OnceLock<SurveyRecord>,
    active_cells: OnceLock<CellIndexSet>,
    m0: OnceLock<DVector<f64>>,
    mref: OnceLock<DVector<f64>>,
    weights: OnceLock<Option<DVector<f64>>>,
    static_cells: OnceLock<CellIndexSet>,
    dynamic_cells: OnceLock<CellIndexSet>,
    magnetization: OnceLock<DMatrix<f64>>,
}

impl MagneticsDriver {
    pub fn new(config: ConfigRecord) -> Self {
        Self {
            config,
            field_order: FieldOrder::default(),
            mesh: OnceLock::new(),
            survey: OnceLock::new(),
            active_cells: OnceLock::new(),
            m0: OnceLock::new(),
            mref: OnceLock::new(),
            weights: OnceLock::new(),
            static_cells: OnceLock::new(),
            dynamic_cells: OnceLock::new(),
            magnetization: OnceLock::new(),
        }
    }

    /// Parse a driver file and wrap it. No other file is touched yet.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        read_driver(path).map(Self::new)
    }

    /// Header convention used when the survey is read.
    pub fn with_field_order(mut self, order: FieldOrder) -> Self {
        self.field_order = order;
        self
    }

    pub fn config(&self) -> &ConfigRecord {
        &self.config
    }

    pub fn mesh(&self) -> Result<&TensorMesh, AppError> {
        cached(&self.mesh, "mesh", || read_ubc_mesh(&self.config.mesh_path))
    }

    pub fn survey(&self) -> Result<&SurveyRecord, AppError> {
        cached(&self.survey, "survey", || {
            read_observations(&self.config.obs_path, self.field_order)
        })
    }

    /// Mesh cells below the topography (all cells when there is none).
    pub fn active_cells(&self) -> Result<&[usize], AppError> {
        cached(&self.active_cells, "active_cells", || {
            let mesh = self.mesh()?;
            match &self.config.topography {
                None => Ok((0..mesh.n_cells()).collect()),
                Some(path) => Ok(Topography::read(path)?.active_cells(mesh)),
            }
        })
        .map(Vec::as_slice)
    }

    /// Number of active cells.
    pub fn n_c(&self) -> Result<usize, AppError> {
        self.active_cells().map(<[usize]>::len)
    }

    /// Starting model on the active cells.
    pub fn m0(&self) -> Result<&DVector<f64>, AppError> {
        cached(&self.m0, "m0", || self.active_model(&self.config.start_model))
    }

    /// Reference model on the active cells.
    pub fn mref(&self) -> Result<&DVector<f64>, AppError> {
        cached(&self.mref, "mref", || self.active_model(&self.config.reference_model))
    }

    /// Cell weights on the active cells, if the driver names a weight file.
    pub fn weights(&self) -> Result<Option<&DVector<f64>>, AppError> {
        cached(&self.weights, "weights", || match &self.config.weights {
            None => Ok(None),
            Some(path) => self.active_model(&ModelSource::File(path.clone())).map(Some),
        })
        .map(Option::as_ref)
    }

    /// Positions (within the active set) of cells held fixed.
    ///
    /// These index `m0`/`mref`, not the mesh: map back through
    /// [`Self::active_cells`] to get mesh cell indices.
    pub fn static_cells(&self) -> Result<&[usize], AppError> {
        cached(&self.static_cells, "static_cells", || self.partition(CellRole::Static))
            .map(Vec::as_slice)
    }

    /// Positions (within the active set) of cells free to change.
    ///
    /// These index `m0`/`mref`, not the mesh: map back through
    /// [`Self::active_cells`] to get mesh cell indices.
    pub fn dynamic_cells(&self) -> Result<&[usize], AppError> {
        cached(&self.dynamic_cells, "dynamic_cells", || self.partition(CellRole::Dynamic))
            .map(Vec::as_slice)
    }

    /// `n_c x 3` magnetization directions.
    ///
    /// Only the uniform default is supported: every row is the unit vector
    /// along the survey's ambient inclination and declination. A magnetization
    /// file is reported as [`AppError::Unsupported`].
    pub fn magnetization_model(&self) -> Result<&DMatrix<f64>, AppError> {
        cached(&self.magnetization, "magnetization", || match &self.config.magnetization {
            MagnetizationSpec::Default => {
                let n = self.n_c()?;
                let field = self.survey()?.ambient;
                let dir = dip_azimuth_to_xyz(field.inclination, field.declination);
                Ok(DMatrix::from_fn(n, 3, |_, j| dir[j]))
            }
            MagnetizationSpec::File(path) => Err(AppError::Unsupported(format!(
                "reading a three-column magnetization model ('{}') is not implemented; use DEFAULT",
                path.display()
            ))),
        })
    }

    fn active_model(&self, source: &ModelSource) -> Result<DVector<f64>, AppError> {
        match source {
            ModelSource::Literal(v) => Ok(DVector::from_element(self.n_c()?, *v)),
            ModelSource::File(path) => {
                let full = read_ubc_model(path, self.mesh()?)?;
                Ok(restrict(&full, self.active_cells()?))
            }
        }
    }

    /// One half of the static/dynamic split. Each half is derived on its own.
    fn partition(&self, role: CellRole) -> Result<CellIndexSet, AppError> {
        match &self.config.static_cells {
            StaticSpec::AllDynamic => Ok(match role {
                CellRole::Static => Vec::new(),
                CellRole::Dynamic => (0..self.n_c()?).collect(),
            }),
            StaticSpec::Literal(value) => {
                let wanted = role == CellRole::Static;
                Ok(positions(self.m0()?, |v| (v == *value) == wanted))
            }
            StaticSpec::File(path) => {
                let labels = restrict(&read_ubc_model(path, self.mesh()?)?, self.active_cells()?);
                let label = match role {
                    CellRole::Static => LABEL_STATIC,
                    CellRole::Dynamic => LABEL_DYNAMIC,
                };
                Ok(positions(&labels, |v| v == label))
            }
        }
    }
}

fn positions(values: &DVector<f64>, keep: impl Fn(f64) -> bool) -> CellIndexSet {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| keep(v))
        .map(|(i, _)| i)
        .collect()
}

/// Compute-once guard over a fallible computation.
fn cached<'a, T>(
    slot: &'a OnceLock<T>,
    name: &str,
    compute: impl FnOnce() -> Result<T, AppError>,
) -> Result<&'a T, AppError> {
    if let Some(value) = slot.get() {
        return Ok(value);
    }
    let value = compute()?;
    tracing::debug!(property = name, "resolved");
    Ok(slot.get_or_init(|| value))
}
