use std::path::PathBuf;

use thiserror::Error;

/// `(rows, cols)` of a matrix operand.
pub type Shape = (usize, usize);

#[derive(Debug, Error)]
pub enum Error {
    /// Operand shapes are incompatible for `op`.
    #[error("dimension mismatch in {op}: {}x{} vs {}x{}", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        op: &'static str,
        left: Shape,
        right: Shape,
    },

    /// A vector-only operation was invoked on a matrix with more than one column.
    #[error("expected a column vector, got a {rows}x{cols} matrix")]
    NotAVector { rows: usize, cols: usize },

    #[error("i/o failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn mismatch(op: &'static str, left: Shape, right: Shape) -> Self {
        Error::DimensionMismatch { op, left, right }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
