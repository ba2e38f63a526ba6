//! Driver file parsing.
//!
//! The driver is a strict positional grammar: fields are identified by line
//! number, not by name. Line order:
//!
//! ```text
//!  1  mesh file
//!  2  observation file
//!  3  topography file | null
//!  4  starting model   (VALUE x | file)
//!  5  reference model  (VALUE x | file)
//!  6  static cells     (VALUE x | file | DEFAULT)
//!  7  magnetization    (file | DEFAULT)
//!  8  cell weights     (file | DEFAULT)
//!  9  target misfit
//! 10  alpha_s alpha_x alpha_y alpha_z
//! 11  bounds           (VALUE lower upper | DEFAULT)
//! 12  lp norms         (VALUE p qx qy qz r | DEFAULT)
//! 13  epsilons         (VALUE eps_p eps_q | DEFAULT)
//! ```
//!
//! A reordered file therefore decodes into the wrong fields rather than
//! failing; only token counts and numeric syntax are checked.

use std::path::{Path, PathBuf};

use crate::domain::{Bounds, ConfigRecord, MagnetizationSpec, ModelSource, Norms, StaticSpec};
use crate::error::{AppError, read_text};
use crate::io::line::{Line, LineValue};

pub const DRIVER_LINES: usize = 13;

/// Read and decode a driver file. Relative paths resolve against its directory.
pub fn read_driver(path: &Path) -> Result<ConfigRecord, AppError> {
    let text = read_text(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    let config = parse_driver(&text, path, base_dir)?;
    tracing::debug!(driver = %path.display(), "decoded driver file");
    Ok(config)
}

/// Decode driver text. `source` is only used in error messages.
pub fn parse_driver(text: &str, source: &Path, base_dir: &Path) -> Result<ConfigRecord, AppError> {
    let raw: Vec<&str> = text.lines().collect();
    if raw.len() < DRIVER_LINES {
        return Err(AppError::format(
            source,
            raw.len() + 1,
            format!("Unexpected end of file: a driver file has {DRIVER_LINES} lines."),
        ));
    }
    let lines: Vec<Line<'_>> = raw[..DRIVER_LINES]
        .iter()
        .enumerate()
        .map(|(idx, text)| Line::new(source, idx + 1, text))
        .collect();

    let mesh_path = required_path(&lines[0], base_dir)?;
    let obs_path = required_path(&lines[1], base_dir)?;
    let topography = optional_path(&lines[2], base_dir)?;
    let start_model = model_source(&lines[3], base_dir)?;
    let reference_model = model_source(&lines[4], base_dir)?;
    let static_cells = static_spec(&lines[5], base_dir)?;
    let magnetization = magnetization_spec(&lines[6], base_dir)?;
    let weights = optional_path(&lines[7], base_dir)?;

    let target_misfit = lines[8].numbers(1)?[0];
    let alphas = lines[9].numbers(4)?;
    let alphas = [alphas[0], alphas[1], alphas[2], alphas[3]];

    let bounds = bounds(&lines[10])?;
    let norms = norms(&lines[11])?;
    let epsilon = epsilon(&lines[12])?;

    Ok(ConfigRecord {
        mesh_path,
        obs_path,
        topography,
        start_model,
        reference_model,
        static_cells,
        magnetization,
        weights,
        target_misfit,
        alphas,
        bounds,
        norms,
        epsilon,
    })
}

fn required_path(line: &Line<'_>, base_dir: &Path) -> Result<PathBuf, AppError> {
    match line.decode(0)? {
        LineValue::Path(p) => Ok(base_dir.join(p)),
        LineValue::Sentinel => Err(line.error("A file path is required here; DEFAULT/null is not allowed.")),
        LineValue::Values(_) => Err(line.error("A file path is required here, not a VALUE.")),
    }
}

fn optional_path(line: &Line<'_>, base_dir: &Path) -> Result<Option<PathBuf>, AppError> {
    match line.decode(0)? {
        LineValue::Path(p) => Ok(Some(base_dir.join(p))),
        LineValue::Sentinel => Ok(None),
        LineValue::Values(_) => Err(line.error("Expected a file path or DEFAULT/null, not a VALUE.")),
    }
}

fn model_source(line: &Line<'_>, base_dir: &Path) -> Result<ModelSource, AppError> {
    match line.decode(1)? {
        LineValue::Values(v) => Ok(ModelSource::Literal(v[0])),
        LineValue::Path(p) => Ok(ModelSource::File(base_dir.join(p))),
        LineValue::Sentinel => Err(line.error("Expected `VALUE x` or a model file; this field has no default.")),
    }
}

fn static_spec(line: &Line<'_>, base_dir: &Path) -> Result<StaticSpec, AppError> {
    Ok(match line.decode(1)? {
        LineValue::Values(v) => StaticSpec::Literal(v[0]),
        LineValue::Path(p) => StaticSpec::File(base_dir.join(p)),
        LineValue::Sentinel => StaticSpec::AllDynamic,
    })
}

fn magnetization_spec(line: &Line<'_>, base_dir: &Path) -> Result<MagnetizationSpec, AppError> {
    match line.decode(0)? {
        LineValue::Path(p) => Ok(MagnetizationSpec::File(base_dir.join(p))),
        LineValue::Sentinel => Ok(MagnetizationSpec::Default),
        LineValue::Values(_) => Err(line.error("Expected a magnetization file or DEFAULT, not a VALUE.")),
    }
}

fn bounds(line: &Line<'_>) -> Result<Bounds, AppError> {
    match line.decode(2)? {
        LineValue::Values(v) => {
            let (lower, upper) = (v[0], v[1]);
            if lower > upper {
                return Err(line.error(format!("Lower bound {lower} exceeds upper bound {upper}.")));
            }
            Ok(Bounds::Bounded { lower, upper })
        }
        LineValue::Sentinel => Ok(Bounds::Unbounded),
        LineValue::Path(p) => Err(line.error(format!("Expected `VALUE lower upper` or DEFAULT, found '{p}'."))),
    }
}

fn norms(line: &Line<'_>) -> Result<Norms, AppError> {
    match line.decode(5)? {
        LineValue::Values(v) => Ok(Norms::Custom([v[0], v[1], v[2], v[3], v[4]])),
        LineValue::Sentinel => Ok(Norms::Default),
        LineValue::Path(p) => Err(line.error(format!("Expected `VALUE p qx qy qz r` or DEFAULT, found '{p}'."))),
    }
}

fn epsilon(line: &Line<'_>) -> Result<Option<(f64, f64)>, AppError> {
    match line.decode(2)? {
        LineValue::Values(v) => Ok(Some((v[0], v[1]))),
        LineValue::Sentinel => Ok(None),
        LineValue::Path(p) => Err(line.error(format!("Expected `VALUE eps_p eps_q` or DEFAULT, found '{p}'."))),
    }
}
