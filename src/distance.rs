use ndarray::ArrayView1;

use crate::error::{ClusterError, Result};

#[inline]
fn check_dims(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Result<()> {
    if a.len() != b.len() {
        return Err(ClusterError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

/// Sum of squared coordinate differences.
#[inline]
pub fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Result<f64> {
    check_dims(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum())
}

/// Euclidean distance between two points
#[inline]
pub fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Result<f64> {
    squared_euclidean(a, b).map(f64::sqrt)
}

/// Sum of absolute coordinate differences.
#[inline]
pub fn manhattan(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Result<f64> {
    check_dims(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum())
}

/// Point distance used inside the average-linkage cluster distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkageMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl LinkageMetric {
    pub fn distance(self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Result<f64> {
        match self {
            LinkageMetric::Euclidean => euclidean(a, b),
            LinkageMetric::Manhattan => manhattan(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_euclidean() {
        let a = array![0.0, 0.0, 0.0];
        let b = array![0.0, 3.0, 4.0];
        assert_eq!(euclidean(a.view(), b.view()).unwrap(), 5.0);
        assert_eq!(squared_euclidean(a.view(), b.view()).unwrap(), 25.0);
    }

    #[test]
    fn test_manhattan() {
        let a = array![1.0, -1.0];
        let b = array![-2.0, 3.0];
        assert_relative_eq!(manhattan(a.view(), b.view()).unwrap(), 7.0);

        let origin = array![0.0, 0.0];
        let p = array![3.0, 4.0];
        assert_relative_eq!(LinkageMetric::Manhattan.distance(origin.view(), p.view()).unwrap(), 7.0);
        assert_relative_eq!(LinkageMetric::default().distance(origin.view(), p.view()).unwrap(), 5.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = array![1.0, 2.0];
        let b = array![1.0];
        assert_eq!(
            euclidean(a.view(), b.view()).unwrap_err(),
            ClusterError::DimensionMismatch { left: 2, right: 1 }
        );
        assert!(manhattan(b.view(), a.view()).is_err());
    }
}
