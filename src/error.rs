use thiserror::Error;

/// Errors raised by the clustering core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("not enough data points ({n}) for {k} clusters")]
    InsufficientData { k: usize, n: usize },
    #[error("invalid cluster count k={k} for {n} points")]
    InvalidK { k: usize, n: usize },
    #[error("point {index} is not contained in any cluster")]
    PointNotFound { index: usize },
    #[error("non-finite value at row {row}, column {col}")]
    NonFinite { row: usize, col: usize },
    #[error("dataset contains no points")]
    EmptyDataset,
    #[error("label vectors of length {left} and {right} are shorter than n={expected}")]
    LabelLengthMismatch {
        expected: usize,
        left: usize,
        right: usize,
    },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
