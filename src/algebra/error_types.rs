use thiserror::Error;

/// Error type returned by the [`check_format`](crate::algebra::CscMatrix::check_format) utility.
#[derive(Error, Debug)]
pub enum SparseFormatError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    #[error("Row value exceeds the matrix row dimension")]
    BadRowval,
    #[error("Bad column pointer values")]
    BadColptr,
}

/// Error type for graph-semantic failures.
///
/// The solver build is all-or-nothing: any of these aborts the build.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error(transparent)]
    BadFormat(#[from] SparseFormatError),
    #[error("Adjacency matrix is not square")]
    NotSquare,
    #[error("Adjacency pattern is not symmetric")]
    AsymmetricPattern,
    #[error("Adjacency stores a self loop at vertex {0}")]
    SelfLoop(usize),
    #[error("Edge weight at entry {0} is not positive and finite")]
    BadWeight(usize),
    #[error("Right-hand side length does not match the vertex count")]
    DimensionMismatch,
    #[error("Graph is disconnected; the tree builder requires a connected input")]
    Disconnected,
}
