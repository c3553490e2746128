//! Embedding of face-local reference points into the reference cell `[0, 1]^d`.
//!
//! Faces are numbered as follows, where `xi` and `eta` are the face-local coordinates:
//!
//! | dim | face 0       | face 1       | face 2       | face 3       | face 4       | face 5       |
//! |-----|--------------|--------------|--------------|--------------|--------------|--------------|
//! | 1   | `(0)`        | `(1)`        |              |              |              |              |
//! | 2   | `(xi, 0)`    | `(1, xi)`    | `(xi, 1)`    | `(0, xi)`    |              |              |
//! | 3   | `(xi,eta,0)` | `(xi,eta,1)` | `(xi,0,eta)` | `(1,xi,eta)` | `(xi,1,eta)` | `(0,xi,eta)` |
//!
//! In two dimensions, face `f` is the edge from vertex `f` to vertex `(f + 1) % 4` of the
//! counter-clockwise unit square.
use crate::allocators::ReferenceCellAllocator;
use crate::error::FeValuesError;
use crate::{FaceDim, Real, SmallDim};
use nalgebra::{DefaultAllocator, DimName, OPoint, OVector};

/// The number of faces of the `D`-dimensional reference cell.
pub fn faces_per_cell<D: DimName>() -> usize {
    2 * D::dim()
}

/// Maps a point on face `face` of the reference cell to the corresponding point of the cell.
///
/// # Errors
///
/// Returns [`FeValuesError::UnsupportedGeometry`] if `D` is not between one and three, and
/// [`FeValuesError::InvalidIndex`] if `face` is not a face of the reference cell.
pub fn embed_face_point<T, D>(face: usize, point: &OPoint<T, FaceDim<D>>) -> Result<OPoint<T, D>, FeValuesError>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let dim = D::dim();
    if !(1..=3).contains(&dim) {
        return Err(FeValuesError::UnsupportedGeometry { dim });
    }
    let num_faces = faces_per_cell::<D>();
    if face >= num_faces {
        return Err(FeValuesError::InvalidIndex {
            index: face,
            bound: num_faces,
        });
    }

    let (zero, one) = (T::zero(), T::one());
    let coords = match (dim, face) {
        (1, 0) => vec![zero],
        (1, 1) => vec![one],
        (2, 0) => vec![point[0], zero],
        (2, 1) => vec![one, point[0]],
        (2, 2) => vec![point[0], one],
        (2, 3) => vec![zero, point[0]],
        (3, 0) => vec![point[0], point[1], zero],
        (3, 1) => vec![point[0], point[1], one],
        (3, 2) => vec![point[0], zero, point[1]],
        (3, 3) => vec![one, point[0], point[1]],
        (3, 4) => vec![point[0], one, point[1]],
        (3, 5) => vec![zero, point[0], point[1]],
        _ => unreachable!("dimension and face were checked above"),
    };
    Ok(OPoint::from(OVector::<T, D>::from_iterator(coords)))
}

/// Embeds all points of a face quadrature rule, see [`embed_face_point`].
pub fn embed_face_quadrature_points<T, D>(
    face: usize,
    points: &[OPoint<T, FaceDim<D>>],
) -> Result<Vec<OPoint<T, D>>, FeValuesError>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    points
        .iter()
        .map(|point| embed_face_point(face, point))
        .collect()
}
