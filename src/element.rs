//! Reference bases and the geometric mappings of concrete cells.
//!
//! The evaluation caches interact with finite elements through two roles. As a
//! [`ReferenceBasis`] the element provides shape function values and gradients on the reference
//! cell. As a [`CellMapping`] (and [`FaceMapping`]) it maps reference points to a concrete cell
//! and fills the geometric data requested by the caches.
use nalgebra::{DefaultAllocator, OMatrix, OPoint, OVector, Scalar};

use crate::allocators::{DimAllocator, ReferenceCellAllocator};
use crate::boundary::Boundary;
use crate::error::FeValuesError;
use crate::mesh::CellAccessor;
use crate::{FaceDim, Real, SmallDim};

mod quadrilateral;
mod segment;

pub use quadrilateral::*;
pub use segment::*;

/// Shape functions defined on the reference cell `[0, 1]^d`.
pub trait ReferenceBasis<T>
where
    T: Scalar,
    DefaultAllocator: ReferenceCellAllocator<T, Self::ReferenceDim>,
{
    type ReferenceDim: SmallDim;

    /// The number of shape functions (degrees of freedom) of the basis.
    fn dof_count(&self) -> usize;

    /// Evaluates shape function `dof` at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// May panic if `dof >= self.dof_count()`.
    fn shape_value(&self, dof: usize, xi: &OPoint<T, Self::ReferenceDim>) -> T;

    /// Evaluates the reference gradient of shape function `dof` at the given reference coordinates.
    ///
    /// # Panics
    ///
    /// May panic if `dof >= self.dof_count()`.
    fn shape_gradient(&self, dof: usize, xi: &OPoint<T, Self::ReferenceDim>) -> OVector<T, Self::ReferenceDim>;
}

/// Output buffers for [`CellMapping::fill_cell_data`].
///
/// Buffers that are `None` were not requested and must be left alone. Point-wise buffers have one
/// entry per quadrature point, `ansatz_points` has one entry per degree of freedom.
#[derive(Debug)]
pub struct CellDataMut<'a, T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    /// Jacobians `d xi / d x` of the inverse cell mapping.
    pub jacobians: Option<&'a mut [OMatrix<T, D, D>]>,
    pub ansatz_points: Option<&'a mut [OPoint<T, D>]>,
    pub quadrature_points: Option<&'a mut [OPoint<T, D>]>,
}

/// Output buffers for [`FaceMapping::fill_face_data`].
///
/// Has the same conventions as [`CellDataMut`], with additional face quantities.
#[derive(Debug)]
pub struct FaceDataMut<'a, T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub jacobians: Option<&'a mut [OMatrix<T, D, D>]>,
    pub ansatz_points: Option<&'a mut [OPoint<T, D>]>,
    pub quadrature_points: Option<&'a mut [OPoint<T, D>]>,
    /// The ratio of the physical face measure to the reference face measure.
    pub face_jacobian_determinants: Option<&'a mut [T]>,
    /// Unit normals pointing out of the cell.
    pub normals: Option<&'a mut [OVector<T, D>]>,
}

/// Maps the reference cell to concrete cells.
pub trait CellMapping<T>: ReferenceBasis<T>
where
    T: Scalar,
    DefaultAllocator: ReferenceCellAllocator<T, Self::ReferenceDim>,
{
    /// Fills the requested buffers for the cell at the given reference points.
    ///
    /// Curved boundary faces of the cell are described by `boundary`.
    fn fill_cell_data<C, B>(
        &self,
        cell: &C,
        reference_points: &[OPoint<T, Self::ReferenceDim>],
        boundary: &B,
        data: CellDataMut<T, Self::ReferenceDim>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, Self::ReferenceDim>,
        B: ?Sized + Boundary<T, Self::ReferenceDim>;
}

/// Maps the faces of the reference cell to the faces of concrete cells.
pub trait FaceMapping<T>: CellMapping<T>
where
    T: Scalar,
    DefaultAllocator: ReferenceCellAllocator<T, Self::ReferenceDim>,
{
    /// Fills the requested buffers for face `face` of the cell.
    ///
    /// `face_points` are the quadrature points on the reference face and `cell_points` are the
    /// same points embedded in the reference cell.
    fn fill_face_data<C, B>(
        &self,
        cell: &C,
        face: usize,
        face_points: &[OPoint<T, FaceDim<Self::ReferenceDim>>],
        cell_points: &[OPoint<T, Self::ReferenceDim>],
        boundary: &B,
        data: FaceDataMut<T, Self::ReferenceDim>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, Self::ReferenceDim>,
        B: ?Sized + Boundary<T, Self::ReferenceDim>;
}

/// Evaluates the mapping `x(xi) = sum_k X_k phi_k(xi)` defined by the nodes `X_k` together with
/// its forward Jacobian `dx / dxi`.
#[allow(non_snake_case)]
pub(crate) fn map_reference_point<T, D, E>(
    element: &E,
    nodes: &[OPoint<T, D>],
    xi: &OPoint<T, D>,
) -> (OPoint<T, D>, OMatrix<T, D, D>)
where
    T: Real,
    D: SmallDim,
    E: ?Sized + ReferenceBasis<T, ReferenceDim = D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let mut x = OVector::<T, D>::zeros();
    let mut F = OMatrix::<T, D, D>::zeros();
    for (k, X_k) in nodes.iter().enumerate() {
        x.axpy(element.shape_value(k, xi), &X_k.coords, T::one());
        F.ger(T::one(), &X_k.coords, &element.shape_gradient(k, xi), T::one());
    }
    (OPoint::from(x), F)
}

/// Fills cell data for an element whose geometry is described by its own shape functions and the
/// given nodes, which are then also the ansatz points.
pub(crate) fn fill_isoparametric_cell_data<T, D, E>(
    element: &E,
    nodes: &[OPoint<T, D>],
    reference_points: &[OPoint<T, D>],
    data: CellDataMut<T, D>,
) -> Result<(), FeValuesError>
where
    T: Real,
    D: SmallDim,
    E: ?Sized + ReferenceBasis<T, ReferenceDim = D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let CellDataMut {
        mut jacobians,
        ansatz_points,
        mut quadrature_points,
    } = data;

    if let Some(ansatz_points) = ansatz_points {
        ansatz_points.clone_from_slice(nodes);
    }

    if jacobians.is_none() && quadrature_points.is_none() {
        return Ok(());
    }

    for (q, xi) in reference_points.iter().enumerate() {
        let (x, forward_jacobian) = map_reference_point(element, nodes, xi);
        if let Some(quadrature_points) = quadrature_points.as_deref_mut() {
            quadrature_points[q] = x;
        }
        if let Some(jacobians) = jacobians.as_deref_mut() {
            jacobians[q] = forward_jacobian
                .try_inverse()
                .ok_or(FeValuesError::SingularJacobian { point: q })?;
        }
    }
    Ok(())
}

/// Collects the vertices of a cell, checking that it has the expected number of them.
pub(crate) fn collect_vertices<T, D, C, const N: usize>(cell: &C) -> Result<[OPoint<T, D>; N], FeValuesError>
where
    T: Real,
    D: SmallDim,
    C: ?Sized + CellAccessor<T, D>,
    DefaultAllocator: DimAllocator<T, D>,
{
    if cell.num_vertices() != N {
        return Err(FeValuesError::IncompatibleCell {
            expected: N,
            actual: cell.num_vertices(),
        });
    }
    Ok(std::array::from_fn(|i| cell.vertex(i).clone()))
}
