//! Export assembled inversion inputs.
//!
//! - JSON: the whole run (configuration, index sets, model vectors, survey)
//! - CSV: one row per active cell, easy to load in a spreadsheet

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::InversionInputs;
use crate::domain::{ConfigRecord, SurveyRecord};
use crate::error::AppError;

/// JSON layout of an assembled run.
#[derive(Debug, Serialize)]
struct InputsFile<'a> {
    tool: &'static str,
    config: &'a ConfigRecord,
    mesh_shape: [usize; 3],
    n_c: usize,
    active_cells: &'a [usize],
    static_cells: &'a [usize],
    dynamic_cells: &'a [usize],
    m0: &'a [f64],
    mref: &'a [f64],
    weights: Option<&'a [f64]>,
    magnetization: Vec<[f64; 3]>,
    survey: &'a SurveyRecord,
}

/// Write the assembled inputs as pretty-printed JSON.
pub fn write_inputs_json(path: &Path, inputs: &InversionInputs) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::from_io(path, &e))?;

    let magnetization = inputs
        .magnetization
        .row_iter()
        .map(|r| [r[0], r[1], r[2]])
        .collect();

    let doc = InputsFile {
        tool: "magdriver",
        config: &inputs.config,
        mesh_shape: inputs.mesh.shape(),
        n_c: inputs.n_c(),
        active_cells: &inputs.active_cells,
        static_cells: &inputs.static_cells,
        dynamic_cells: &inputs.dynamic_cells,
        m0: inputs.m0.as_slice(),
        mref: inputs.mref.as_slice(),
        weights: inputs.weights.as_ref().map(|w| w.as_slice()),
        magnetization,
        survey: &inputs.survey,
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &doc).map_err(|e| AppError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to write JSON: {e}"),
    })
}

/// Write one CSV row per active cell.
pub fn write_cells_csv(path: &Path, inputs: &InversionInputs) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::from_io(path, &e))?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| AppError::from_io(path, &e);

    writeln!(out, "active_index,mesh_index,m0,mref,weight,static,mx,my,mz").map_err(io_err)?;

    let statics: HashSet<usize> = inputs.static_cells.iter().copied().collect();
    for (i, &cell) in inputs.active_cells.iter().enumerate() {
        let m = inputs.magnetization.row(i);
        writeln!(
            out,
            "{},{},{},{},{},{},{:.10},{:.10},{:.10}",
            i,
            cell,
            inputs.m0[i],
            inputs.mref[i],
            inputs.weights.as_ref().map(|w| w[i].to_string()).unwrap_or_default(),
            u8::from(statics.contains(&i)),
            m[0],
            m[1],
            m[2],
        )
        .map_err(io_err)?;
    }

    out.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MagneticsDriver;
    use std::fs;

    fn inputs(dir: &Path) -> InversionInputs {
        fs::write(dir.join("mesh.msh"), "2 1 1\n0 0 0\n2*1\n1\n1\n").unwrap();
        fs::write(dir.join("obs.mag"), "90 0 50000\n90 0 1\n1\n0 0 1 2.0 0.1\n").unwrap();
        fs::write(
            dir.join("inv.inp"),
            "mesh.msh\nobs.mag\nnull\nVALUE 0.5\nVALUE 0\nVALUE 0.5\nDEFAULT\nDEFAULT\n1\n1 1 1 1\nDEFAULT\nDEFAULT\nDEFAULT\n",
        )
        .unwrap();
        let driver = MagneticsDriver::from_file(&dir.join("inv.inp")).unwrap();
        crate::app::pipeline::assemble(&driver).unwrap()
    }

    #[test]
    fn csv_has_one_row_per_active_cell() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = inputs(dir.path());
        let path = dir.path().join("cells.csv");
        write_cells_csv(&path, &inputs).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "active_index,mesh_index,m0,mref,weight,static,mx,my,mz");
        assert!(lines[1].starts_with("0,0,0.5,0,,1,"));
    }

    #[test]
    fn json_contains_models_and_survey() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = inputs(dir.path());
        let path = dir.path().join("inputs.json");
        write_inputs_json(&path, &inputs).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["n_c"], 2);
        assert_eq!(doc["m0"], serde_json::json!([0.5, 0.5]));
        assert_eq!(doc["static_cells"], serde_json::json!([0, 1]));
        assert_eq!(doc["survey"]["data"], serde_json::json!([2.0]));
        assert!(doc["weights"].is_null());
    }
}
