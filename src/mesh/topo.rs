//! Topography surfaces and the air/ground split of a mesh.

use std::path::Path;

use rayon::prelude::*;

use crate::domain::CellIndexSet;
use crate::error::{AppError, read_text};
use crate::io::line::Line;
use crate::mesh::TensorMesh;

/// Scattered `(x, y, z)` surface samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Topography {
    pub points: Vec<[f64; 3]>,
}

impl Topography {
    /// Read a topography file: one header line, then `x y z` rows.
    pub fn read(path: &Path) -> Result<Self, AppError> {
        let text = read_text(path)?;
        let mut points = Vec::new();
        for (idx, raw) in text.lines().enumerate().skip(1) {
            let line = Line::new(path, idx + 1, raw);
            if line.tokens().is_empty() {
                continue;
            }
            let v = line.numbers(3)?;
            points.push([v[0], v[1], v[2]]);
        }
        if points.is_empty() {
            return Err(AppError::Invalid(format!(
                "Topography '{}' has no points.",
                path.display()
            )));
        }
        tracing::debug!(file = %path.display(), points = points.len(), "read topography");
        Ok(Self { points })
    }

    /// Surface elevation at `(x, y)`, taken from the nearest sample.
    ///
    /// Scans every point; [`Self::active_cells`] indexes the points once
    /// instead.
    pub fn elevation_at(&self, x: f64, y: f64) -> f64 {
        self.points
            .iter()
            .min_by(|a, b| dist2(a, x, y).total_cmp(&dist2(b, x, y)))
            .map(|p| p[2])
            .unwrap_or(f64::INFINITY)
    }

    /// Cells whose centre lies below the surface, in increasing index order.
    pub fn active_cells(&self, mesh: &TensorMesh) -> CellIndexSet {
        let [nx, ny, _] = mesh.shape();
        let xc = mesh.centers(0);
        let yc = mesh.centers(1);
        let zc = mesh.centers(2);

        let index = SortedByX::new(&self.points);
        let surface: Vec<f64> = (0..nx * ny)
            .into_par_iter()
            .map(|col| index.elevation_at(xc[col % nx], yc[col / nx]))
            .collect();

        (0..mesh.n_cells())
            .into_par_iter()
            .filter(|&cell| {
                let [ix, iy, iz] = mesh.cell_ijk(cell);
                zc[iz] < surface[ix + nx * iy]
            })
            .collect()
    }
}

fn dist2(p: &[f64; 3], x: f64, y: f64) -> f64 {
    (p[0] - x).powi(2) + (p[1] - y).powi(2)
}

/// Nearest-sample lookup over points sorted by x.
///
/// A query starts at the first point with `px >= x` and walks outward in
/// both directions, stopping each side once `(px - x)^2` alone exceeds the
/// best squared distance found.
struct SortedByX {
    points: Vec<[f64; 3]>,
}

impl SortedByX {
    fn new(points: &[[f64; 3]]) -> Self {
        let mut points = points.to_vec();
        points.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Self { points }
    }

    fn elevation_at(&self, x: f64, y: f64) -> f64 {
        let start = self.points.partition_point(|p| p[0] < x);
        let mut best = f64::INFINITY;
        let mut z = f64::INFINITY;
        let mut visit = |p: &[f64; 3]| {
            if (p[0] - x).powi(2) > best {
                return false;
            }
            let d = dist2(p, x, y);
            if d < best {
                best = d;
                z = p[2];
            }
            true
        };
        for p in &self.points[start..] {
            if !visit(p) {
                break;
            }
        }
        for p in self.points[..start].iter().rev() {
            if !visit(p) {
                break;
            }
        }
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn cells_below_surface_are_active() {
        // 2 x 1 x 2 mesh, cell centres at z = 0.5 and 1.5
        let mesh = TensorMesh::new([0.0; 3], vec![1.0; 2], vec![1.0], vec![1.0; 2]);
        let topo = Topography {
            points: vec![[0.5, 0.5, 2.0], [1.5, 0.5, 1.0]],
        };
        // west column fully buried, east column only its bottom cell
        assert_eq!(topo.active_cells(&mesh), vec![0, 1, 2]);
    }

    #[test]
    fn sorted_lookup_agrees_with_full_scan() {
        // irregular samples with distinct distances to every query below
        let points: Vec<[f64; 3]> = (0..40)
            .map(|i| {
                let f = i as f64;
                [(f * 7.3) % 23.0, (f * 3.1) % 17.0, f]
            })
            .collect();
        let topo = Topography { points };
        let index = SortedByX::new(&topo.points);
        for (x, y) in [(0.0, 0.0), (11.4, 8.2), (22.9, 16.7), (-5.0, 30.0), (6.05, 2.35)] {
            assert_eq!(index.elevation_at(x, y), topo.elevation_at(x, y), "at ({x}, {y})");
        }
    }

    #[test]
    fn reads_points_after_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topo.topo");
        fs::write(&path, "2\n0 0 10\n5 5 12 ! peak\n\n").unwrap();
        let topo = Topography::read(&path).unwrap();
        assert_eq!(topo.points, vec![[0.0, 0.0, 10.0], [5.0, 5.0, 12.0]]);
        assert_eq!(topo.elevation_at(4.0, 4.0), 12.0);
    }

    #[test]
    fn empty_topography_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topo.topo");
        fs::write(&path, "0\n").unwrap();
        assert!(matches!(Topography::read(&path), Err(AppError::Invalid(_))));
    }
}
