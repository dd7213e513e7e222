//! Feature matrix used for fitting.

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::InferenceError;
use crate::Result;

/// Dense row-major matrix of training samples.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let width = rows
            .first()
            .map(|r| r.len())
            .ok_or_else(|| InferenceError::InvalidInput("no samples".to_string()))?;

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(InferenceError::InvalidInput(format!(
                "row {} has {} features, expected {}",
                index,
                row.len(),
                width
            )));
        }

        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let data = Array2::from_shape_vec((rows.len(), width), flat)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))?;

        Self::from_array(data)
    }

    /// Wrap an existing array, rejecting NaN and infinite values.
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.iter().any(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidInput(
                "feature matrix contains non-finite values".to_string(),
            ));
        }
        Ok(Self { data })
    }

    /// Number of samples (rows).
    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    /// Number of features (columns).
    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Value of one feature for one sample.
    pub fn value(&self, sample: usize, feature: usize) -> f64 {
        self.data[[sample, feature]]
    }

    /// A single sample.
    pub fn row(&self, sample: usize) -> ArrayView1<'_, f64> {
        self.data.row(sample)
    }

    /// The whole matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(m.n_samples(), 3);
        assert_eq!(m.n_features(), 2);
        assert_eq!(m.value(2, 1), 6.0);
        assert_eq!(m.row(1).to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = FeatureMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(FeatureMatrix::from_rows(&[]).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(FeatureMatrix::from_rows(&[vec![f64::NAN]]).is_err());
    }
}
