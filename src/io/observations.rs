//! Magnetic observation files (UBC `.obs` layout).
//!
//! ```text
//! a b c            ambient field triple (order: see `FieldOrder`)
//! inc dec [flag]   magnetization orientation
//! N                number of receivers
//! x y z [d [wd]]   N rows; missing datum/uncertainty read as 0
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{FieldOrder, MagnetizationOrientation, SurveyRecord};
use crate::error::{AppError, read_text};
use crate::io::line::{Line, parse_f64};

const HEADER_LINES: usize = 3;

/// Read an observation file from disk.
pub fn read_observations(path: &Path, order: FieldOrder) -> Result<SurveyRecord, AppError> {
    let text = read_text(path)?;
    let survey = parse_observations(&text, path, order)?;
    tracing::debug!(
        file = %path.display(),
        receivers = survey.n_receivers(),
        "read observations"
    );
    Ok(survey)
}

/// Parse observation text. `source` is only used in error messages.
pub fn parse_observations(text: &str, source: &Path, order: FieldOrder) -> Result<SurveyRecord, AppError> {
    let raw: Vec<&str> = text.lines().collect();
    let line = |idx: usize| line_at(&raw, source, idx);

    let field = floats(&line(0)?, 3, 3)?;
    let ambient = order.decode([field[0], field[1], field[2]]);

    let orientation_line = line(1)?;
    let m = floats(&orientation_line, 2, 3)?;
    let orientation = MagnetizationOrientation {
        inclination: m[0],
        declination: m[1],
        flag: m.get(2).copied(),
    };

    let count_line = line(2)?;
    let n = count_line
        .tokens()
        .first()
        .and_then(|tok| tok.parse::<usize>().ok())
        .ok_or_else(|| count_line.error("Expected the number of receivers (a non-negative integer)."))?;

    let available = raw.len().saturating_sub(HEADER_LINES);
    if n > available {
        return Err(AppError::format(
            source,
            HEADER_LINES + available + 1,
            format!("Expected {n} receiver rows, found {available}."),
        ));
    }

    let mut locations = Vec::with_capacity(n);
    let mut data = Vec::with_capacity(n);
    let mut uncertainty = Vec::with_capacity(n);

    for idx in HEADER_LINES..HEADER_LINES + n {
        let v = floats(&line(idx)?, 3, 5)?;
        locations.push([v[0], v[1], v[2]]);
        data.push(v.get(3).copied().unwrap_or(0.0));
        uncertainty.push(v.get(4).copied().unwrap_or(0.0));
    }

    let trailing = raw[HEADER_LINES + n..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .count();
    if trailing > 0 {
        tracing::warn!(
            file = %source.display(),
            lines = trailing,
            "ignoring lines after the last receiver row"
        );
    }

    Ok(SurveyRecord {
        ambient,
        orientation,
        locations,
        data,
        uncertainty,
    })
}

/// Write a survey back out, always emitting all five columns.
pub fn write_observations(path: &Path, survey: &SurveyRecord, order: FieldOrder) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::from_io(path, &e))?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| AppError::from_io(path, &e);

    let [a, b, c] = order.encode(&survey.ambient);
    writeln!(out, "{a} {b} {c}").map_err(io_err)?;

    let o = &survey.orientation;
    let written = match o.flag {
        Some(flag) => writeln!(out, "{} {} {}", o.inclination, o.declination, flag),
        None => writeln!(out, "{} {}", o.inclination, o.declination),
    };
    written.map_err(io_err)?;

    writeln!(out, "{}", survey.n_receivers()).map_err(io_err)?;
    for ((loc, d), wd) in survey.locations.iter().zip(&survey.data).zip(&survey.uncertainty) {
        writeln!(out, "{} {} {} {} {}", loc[0], loc[1], loc[2], d, wd).map_err(io_err)?;
    }

    out.flush().map_err(io_err)
}

fn line_at<'a>(raw: &[&'a str], source: &'a Path, idx: usize) -> Result<Line<'a>, AppError> {
    raw.get(idx)
        .map(|text| Line::new(source, idx + 1, text))
        .ok_or_else(|| AppError::format(source, idx + 1, "Unexpected end of file."))
}

/// Decode between `min` and `max` floats from a line.
fn floats(line: &Line<'_>, min: usize, max: usize) -> Result<Vec<f64>, AppError> {
    let tokens = line.tokens();
    if tokens.len() < min || tokens.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(line.error(format!("Expected {expected} values, found {}.", tokens.len())));
    }
    tokens
        .iter()
        .map(|tok| parse_f64(tok).ok_or_else(|| line.error(format!("Invalid number '{tok}'."))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBS: &str = "\
50000.0 -10.0 85.0
90 0 1
2
0 0 0 100.0 5.0
10 10 10 -50.0
";

    fn parse(text: &str) -> Result<SurveyRecord, AppError> {
        parse_observations(text, Path::new("obs.mag"), FieldOrder::Ubc)
    }

    #[test]
    fn ragged_rows_default_to_zero() {
        let s = parse(OBS).unwrap();
        assert_eq!(s.n_receivers(), 2);
        assert_eq!(s.locations, vec![[0.0, 0.0, 0.0], [10.0, 10.0, 10.0]]);
        assert_eq!(s.data, vec![100.0, -50.0]);
        assert_eq!(s.uncertainty, vec![5.0, 0.0]);
        assert_eq!(s.orientation.flag, Some(1.0));
    }

    #[test]
    fn header_order_is_selectable() {
        let ubc = parse("65 -12.5 54000\n90 0\n0\n").unwrap().ambient;
        assert_eq!((ubc.inclination, ubc.declination, ubc.intensity), (65.0, -12.5, 54000.0));

        let s = parse_observations(OBS, Path::new("obs.mag"), FieldOrder::Intensity).unwrap();
        assert_eq!(s.ambient.intensity, 50000.0);
        assert_eq!(s.ambient.inclination, -10.0);
        assert_eq!(s.ambient.declination, 85.0);
    }

    #[test]
    fn location_only_rows() {
        let s = parse("60 20 55000\n60 20\n1\n1 2 3\n").unwrap();
        assert_eq!(s.data, vec![0.0]);
        assert_eq!(s.uncertainty, vec![0.0]);
        assert_eq!(s.orientation.flag, None);
    }

    #[test]
    fn missing_rows_are_a_format_error() {
        let err = parse("60 20 55000\n60 20 1\n3\n0 0 0 1\n").unwrap_err();
        match err {
            AppError::Format { line, message, .. } => {
                assert_eq!(line, 5);
                assert!(message.contains("Expected 3 receiver rows"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_row_is_a_format_error() {
        let err = parse("60 20 55000\n60 20 1\n1\n0 0\n").unwrap_err();
        assert!(matches!(err, AppError::Format { line: 4, .. }));
    }

    #[test]
    fn oversized_count_is_a_format_error() {
        let err = parse("60 20 55000\n60 20 1\n18446744073709551615\n0 0 0\n").unwrap_err();
        match err {
            AppError::Format { line, message, .. } => {
                assert_eq!(line, 5);
                assert!(message.contains("found 1"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn long_row_is_a_format_error() {
        let err = parse("60 20 55000\n60 20 1\n2\n0 0 0 1 1\n0 0 0 1 1 9\n").unwrap_err();
        assert!(matches!(err, AppError::Format { line: 5, .. }));
    }

    #[test]
    fn blank_line_inside_table_is_not_skipped() {
        let err = parse("60 20 55000\n60 20 1\n2\n0 0 0 1\n\n5 5 5 2\n").unwrap_err();
        assert!(matches!(err, AppError::Format { line: 5, .. }));
    }

    #[test]
    fn bad_count_is_a_format_error() {
        assert!(matches!(
            parse("60 20 55000\n60 20 1\ntwo\n"),
            Err(AppError::Format { line: 3, .. })
        ));
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mag");
        let s = parse(OBS).unwrap();
        write_observations(&path, &s, FieldOrder::Ubc).unwrap();
        let back = read_observations(&path, FieldOrder::Ubc).unwrap();
        assert_eq!(back, s);
    }
}
