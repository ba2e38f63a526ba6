//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced once by the parsers and never mutated afterwards
//! - exported to JSON alongside the resolved model vectors
//! - compared field by field in tests

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Ordered, strictly increasing cell indices.
pub type CellIndexSet = Vec<usize>;

/// Column order of the ambient-field triple on the first observation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FieldOrder {
    /// `inclination declination intensity` (UBC convention).
    #[default]
    Ubc,
    /// `intensity inclination declination`.
    Intensity,
}

impl FieldOrder {
    pub fn decode(self, values: [f64; 3]) -> AmbientField {
        let [a, b, c] = values;
        match self {
            FieldOrder::Ubc => AmbientField {
                intensity: c,
                inclination: a,
                declination: b,
            },
            FieldOrder::Intensity => AmbientField {
                intensity: a,
                inclination: b,
                declination: c,
            },
        }
    }

    pub fn encode(self, field: &AmbientField) -> [f64; 3] {
        match self {
            FieldOrder::Ubc => [field.inclination, field.declination, field.intensity],
            FieldOrder::Intensity => [field.intensity, field.inclination, field.declination],
        }
    }
}

/// A per-cell model given either as one value for every cell or as a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    Literal(f64),
    File(PathBuf),
}

/// How cells are split into static (fixed) and dynamic (free) subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticSpec {
    /// No static cells: everything active is free.
    AllDynamic,
    /// Cells whose starting value equals this literal are static.
    Literal(f64),
    /// Label file: `-1` static, `1` dynamic, `0` air.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnetizationSpec {
    /// Uniform magnetization along the survey's ambient field.
    Default,
    /// A three-column vector model (not supported yet).
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bounds {
    Unbounded,
    Bounded { lower: f64, upper: f64 },
}

/// Lp-norm parameters: `p, qx, qy, qz, r`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norms {
    Default,
    Custom([f64; 5]),
}

/// Everything the driver file says, with every field resolved to one variant.
///
/// Paths are already joined onto the driver file's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub mesh_path: PathBuf,
    pub obs_path: PathBuf,
    /// `None` means the whole mesh is below ground.
    pub topography: Option<PathBuf>,
    pub start_model: ModelSource,
    pub reference_model: ModelSource,
    pub static_cells: StaticSpec,
    pub magnetization: MagnetizationSpec,
    pub weights: Option<PathBuf>,
    /// Target data misfit (chi factor).
    pub target_misfit: f64,
    /// Smoothness weights `alpha_s, alpha_x, alpha_y, alpha_z`.
    pub alphas: [f64; 4],
    pub bounds: Bounds,
    pub norms: Norms,
    /// `(eps_p, eps_q)`; `None` lets the solver pick.
    pub epsilon: Option<(f64, f64)>,
}

/// Background geomagnetic field at the survey site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientField {
    /// nT
    pub intensity: f64,
    /// Degrees, positive down.
    pub inclination: f64,
    /// Degrees, clockwise from north.
    pub declination: f64,
}

/// Second header line of an observation file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnetizationOrientation {
    pub inclination: f64,
    pub declination: f64,
    pub flag: Option<f64>,
}

/// Receivers, observed data and uncertainties for one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub ambient: AmbientField,
    pub orientation: MagnetizationOrientation,
    pub locations: Vec<[f64; 3]>,
    /// Zero where the file gave no datum.
    pub data: Vec<f64>,
    /// Zero where the file gave no uncertainty.
    pub uncertainty: Vec<f64>,
}

impl SurveyRecord {
    pub fn n_receivers(&self) -> usize {
        self.locations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_encode_inverts_decode() {
        let field = FieldOrder::Ubc.decode([65.0, -12.5, 54000.0]);
        assert_eq!(field.intensity, 54000.0);
        assert_eq!(field.inclination, 65.0);
        assert_eq!(field.declination, -12.5);
        assert_eq!(FieldOrder::Ubc.encode(&field), [65.0, -12.5, 54000.0]);
        assert_eq!(FieldOrder::Intensity.encode(&field), [54000.0, 65.0, -12.5]);
    }
}
