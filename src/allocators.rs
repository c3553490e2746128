//! Helper traits for allocator trait bounds.
use crate::{FaceDim, SmallDim};
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, Scalar, U1};

/// An allocator for the vectors, matrices and points of a single dimension.
pub trait DimAllocator<T: Scalar, D: DimName>:
    Allocator<T, D>
    + Allocator<T, D, D>
    + Allocator<T, U1, D>
    // Needed by LU-based routines such as the determinant
    + Allocator<usize, D>
    + Allocator<(usize, usize), D>
{
}

impl<T, D> DimAllocator<T, D> for DefaultAllocator
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>
        + Allocator<T, D, D>
        + Allocator<T, U1, D>
        + Allocator<usize, D>
        + Allocator<(usize, usize), D>,
{
}

/// An allocator for a reference cell of dimension `D` together with its faces.
pub trait ReferenceCellAllocator<T: Scalar, D: SmallDim>: DimAllocator<T, D> + Allocator<T, FaceDim<D>> {}

impl<T, D> ReferenceCellAllocator<T, D> for DefaultAllocator
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D> + Allocator<T, FaceDim<D>>,
{
}
