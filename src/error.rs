//! Errors reported by the evaluation caches and their collaborators.

/// Errors reported by [`FeValues`](crate::fe_values::FeValues),
/// [`FeFaceValues`](crate::fe_values::FeFaceValues) and the geometry collaborators.
///
/// All of these indicate a defect in the calling code or a degenerate input. None of them are
/// transient, so retrying the failed call is pointless.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FeValuesError {
    /// A field was requested whose computation needs the Jacobians, which were not requested.
    #[error("cannot initialize field `{field}`: it requires the Jacobians, which were not requested")]
    CannotInitializeField { field: &'static str },
    /// A field was accessed whose update flag was not set at construction.
    #[error("access to uninitialized field `{field}`: the corresponding update flag was not set")]
    AccessToUninitializedField { field: &'static str },
    #[error("the index {index} is out of range, it should be less than {bound}")]
    InvalidIndex { index: usize, bound: usize },
    /// No face embedding is known for reference cells of the given dimension.
    #[error("face embeddings are not implemented for reference cells of dimension {dim}")]
    UnsupportedGeometry { dim: usize },
    #[error("the quadrature rule contains no points")]
    EmptyQuadrature,
    #[error("the quadrature rule has {weights} weights but {points} points")]
    InconsistentQuadrature { weights: usize, points: usize },
    #[error("the finite element has no degrees of freedom")]
    NoDegreesOfFreedom,
    /// Physical data was accessed before the first successful call to `reinit`.
    #[error("physical data is not available before a successful call to reinit")]
    NotReinitialized,
    #[error("the finite element has {actual} degrees of freedom, but the cache was built for {expected}")]
    DofCountMismatch { expected: usize, actual: usize },
    /// A mesh cell references a vertex that the mesh does not contain.
    #[error("cell {cell} references vertex {vertex}, but the mesh only has {num_vertices} vertices")]
    InvalidVertexIndex { cell: usize, vertex: usize, num_vertices: usize },
    #[error("the cell has {actual} vertices, but the element requires {expected}")]
    IncompatibleCell { expected: usize, actual: usize },
    #[error("the Jacobian of the cell mapping is singular at quadrature point {point}")]
    SingularJacobian { point: usize },
}
