//! Formatted terminal output.
//!
//! We keep formatting code in one place so parsing and resolution stay free
//! of presentation concerns.

use std::path::Path;

use crate::app::pipeline::InversionInputs;
use crate::domain::{Bounds, ConfigRecord, MagnetizationSpec, ModelSource, Norms, StaticSpec, SurveyRecord};
use crate::report::model_stats;

/// The decoded driver file, one field per line.
pub fn format_config(config: &ConfigRecord) -> String {
    let mut out = String::new();

    out.push_str("=== magdriver - driver file ===\n");
    out.push_str(&format!("Mesh:          {}\n", config.mesh_path.display()));
    out.push_str(&format!("Observations:  {}\n", config.obs_path.display()));
    out.push_str(&format!("Topography:    {}\n", fmt_opt_path(config.topography.as_deref())));
    out.push_str(&format!("Start model:   {}\n", fmt_source(&config.start_model)));
    out.push_str(&format!("Ref model:     {}\n", fmt_source(&config.reference_model)));

    let statics = match &config.static_cells {
        StaticSpec::AllDynamic => "none (all dynamic)".to_string(),
        StaticSpec::Literal(v) => format!("cells with m0 == {v}"),
        StaticSpec::File(p) => format!("labels from {}", p.display()),
    };
    out.push_str(&format!("Static cells:  {statics}\n"));

    let mag = match &config.magnetization {
        MagnetizationSpec::Default => "DEFAULT (along ambient field)".to_string(),
        MagnetizationSpec::File(p) => p.display().to_string(),
    };
    out.push_str(&format!("Magnetization: {mag}\n"));
    out.push_str(&format!("Weights:       {}\n", fmt_opt_path(config.weights.as_deref())));
    out.push_str(&format!("Target misfit: {}\n", config.target_misfit));
    out.push_str(&format!("Alphas:        {}\n", fmt_vec(&config.alphas)));

    let bounds = match config.bounds {
        Bounds::Unbounded => "unbounded".to_string(),
        Bounds::Bounded { lower, upper } => format!("[{lower}, {upper}]"),
    };
    out.push_str(&format!("Bounds:        {bounds}\n"));

    let norms = match config.norms {
        Norms::Default => "DEFAULT".to_string(),
        Norms::Custom(v) => fmt_vec(&v),
    };
    out.push_str(&format!("Lp norms:      {norms}\n"));

    let eps = match config.epsilon {
        None => "DEFAULT".to_string(),
        Some((p, q)) => format!("eps_p={p} eps_q={q}"),
    };
    out.push_str(&format!("Epsilon:       {eps}\n"));

    out
}

/// Header and data ranges of a survey.
pub fn format_survey(survey: &SurveyRecord) -> String {
    let mut out = String::new();
    let f = &survey.ambient;
    let o = &survey.orientation;

    out.push_str("=== magdriver - survey ===\n");
    out.push_str(&format!(
        "Ambient field: {:.1} nT | I={:.2} deg | D={:.2} deg\n",
        f.intensity, f.inclination, f.declination
    ));
    out.push_str(&format!(
        "Magnetization: I={:.2} deg | D={:.2} deg\n",
        o.inclination, o.declination
    ));
    out.push_str(&format!("Receivers:     {}\n", survey.n_receivers()));

    if let (Some(lo), Some(hi)) = (
        survey.data.iter().copied().reduce(f64::min),
        survey.data.iter().copied().reduce(f64::max),
    ) {
        out.push_str(&format!("Data range:    [{lo:.3}, {hi:.3}]\n"));
    }
    let with_uncert = survey.uncertainty.iter().filter(|&&w| w != 0.0).count();
    out.push_str(&format!("Uncertainties: {with_uncert} of {} set\n", survey.n_receivers()));

    out
}

/// Summary of a fully assembled run.
pub fn format_inputs(inputs: &InversionInputs) -> String {
    let mut out = format_config(&inputs.config);
    out.push('\n');
    out.push_str(&format_survey(&inputs.survey));

    let [nx, ny, nz] = inputs.mesh.shape();
    out.push_str("\n=== magdriver - model ===\n");
    out.push_str(&format!(
        "Mesh:    {nx} x {ny} x {nz} = {} cells\n",
        inputs.mesh.n_cells()
    ));
    out.push_str(&format!(
        "Active:  {} | static: {} | dynamic: {}\n",
        inputs.n_c(),
        inputs.static_cells.len(),
        inputs.dynamic_cells.len()
    ));

    let mut models = vec![("m0", &inputs.m0), ("mref", &inputs.mref)];
    if let Some(w) = &inputs.weights {
        models.push(("weights", w));
    }
    for (name, values) in models {
        match model_stats(values) {
            Some(s) => out.push_str(&format!(
                "{name:<8} min={:.4e} max={:.4e} mean={:.4e}\n",
                s.min, s.max, s.mean
            )),
            None => out.push_str(&format!("{name:<8} (empty)\n")),
        }
    }

    if inputs.magnetization.nrows() > 0 {
        let row = inputs.magnetization.row(0);
        out.push_str(&format!(
            "Magnetization direction: [{:.4}, {:.4}, {:.4}]\n",
            row[0], row[1], row[2]
        ));
    }

    out
}

fn fmt_source(source: &ModelSource) -> String {
    match source {
        ModelSource::Literal(v) => format!("VALUE {v}"),
        ModelSource::File(p) => p.display().to_string(),
    }
}

fn fmt_opt_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "DEFAULT".to_string())
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::driver::parse_driver;

    #[test]
    fn config_summary_lists_every_field() {
        let text = "m.msh\no.mag\nnull\nVALUE 0.01\nmref.sus\nDEFAULT\nDEFAULT\nDEFAULT\n1\n1 1 1 1\nDEFAULT\nDEFAULT\nDEFAULT\n";
        let config = parse_driver(text, Path::new("inv.inp"), Path::new("")).unwrap();
        let out = format_config(&config);
        assert!(out.contains("Start model:   VALUE 0.01"));
        assert!(out.contains("Ref model:     mref.sus"));
        assert!(out.contains("Static cells:  none (all dynamic)"));
        assert!(out.contains("Bounds:        unbounded"));
        assert!(out.contains("Alphas:        [1, 1, 1, 1]"));
    }
}
