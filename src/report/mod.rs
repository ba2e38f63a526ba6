//! Reporting utilities: summary statistics and formatted terminal output.

pub mod format;

pub use format::*;

use nalgebra::DVector;

/// Range and mean of a model vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStats {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

/// Summary statistics; `None` for an empty vector.
pub fn model_stats(values: &DVector<f64>) -> Option<ModelStats> {
    if values.is_empty() {
        return None;
    }
    Some(ModelStats {
        n: values.len(),
        min: values.min(),
        max: values.max(),
        mean: values.mean(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_small_vector() {
        let s = model_stats(&DVector::from_vec(vec![1.0, -2.0, 4.0])).unwrap();
        assert_eq!((s.n, s.min, s.max), (3, -2.0, 4.0));
        assert!((s.mean - 1.0).abs() < 1e-12);
        assert!(model_stats(&DVector::zeros(0)).is_none());
    }
}
