//! Evaluation caches for shape functions on cells and faces.
//!
//! An evaluation cache is built once for a combination of a reference basis, a quadrature rule
//! and a set of [`UpdateFlags`]. Construction evaluates the basis at the quadrature points of the
//! reference domain. A subsequent call to `reinit` maps this data to a concrete physical cell
//! (or one of its faces), overwriting the physical tables of the previous call.
//!
//! Borrowed results are valid until the next call to `reinit`, which the borrow checker enforces
//! since `reinit` takes `&mut self`.
//!
//! The stored Jacobians follow the convention
//! <div>$$ J_{ij} = \frac{\partial \xi_i}{\partial x_j}, $$</div>
//! i.e. they are Jacobians of the map from the physical cell *to* the reference cell. Physical
//! gradients are therefore obtained as $\nabla_x \phi = J^T \nabla_\xi \phi$, and the cell
//! integration factor is the *reciprocal* of $\det J$.
use crate::allocators::{DimAllocator, ReferenceCellAllocator};
use crate::element::ReferenceBasis;
use crate::error::FeValuesError;
use crate::{Real, SmallDim};
use nalgebra::{DMatrix, DefaultAllocator, OMatrix, OPoint, OVector, Scalar};

mod cell;
mod embedding;
mod face;
mod table;
mod update_flags;

pub use cell::FeValues;
pub use embedding::{embed_face_point, embed_face_quadrature_points, faces_per_cell};
pub use face::FeFaceValues;
pub use table::DofPointTable;
pub use update_flags::UpdateFlags;

/// Read access shared by [`FeValues`] and [`FeFaceValues`].
///
/// Allows consumers such as the routines in [`assembly`](crate::assembly) to be written once
/// for cells and faces. The methods panic under the same conditions as the inherent accessors
/// of the implementing caches.
pub trait FiniteElementValues<T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    fn n_quadrature_points(&self) -> usize;

    fn dof_count(&self) -> usize;

    fn update_flags(&self) -> UpdateFlags;

    fn shape_value(&self, dof: usize, point: usize) -> T;

    fn shape_gradient(&self, dof: usize, point: usize) -> &OVector<T, D>;

    fn quadrature_point(&self, point: usize) -> &OPoint<T, D>;

    fn ansatz_point(&self, dof: usize) -> &OPoint<T, D>;

    fn jxw(&self, point: usize) -> T;
}

/// Whether the physical tables of a cache describe a cell.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum CacheState {
    Constructed,
    Reinitialized,
}

/// Shape function values and gradients evaluated on the reference domain.
///
/// Tables whose update flag is not set are left empty.
#[derive(Debug, Clone)]
pub(crate) struct ReferenceTables<T, D>
where
    T: Scalar,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    pub shape_values: DMatrix<T>,
    pub gradients: DofPointTable<OVector<T, D>>,
}

impl<T, D> ReferenceTables<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    pub fn evaluate<E>(element: &E, points: &[OPoint<T, D>], update_flags: UpdateFlags) -> Self
    where
        E: ?Sized + ReferenceBasis<T, ReferenceDim = D>,
    {
        let num_dofs = element.dof_count();
        let num_points = points.len();

        let shape_values = if update_flags.contains(UpdateFlags::VALUES) {
            DMatrix::from_fn(num_dofs, num_points, |i, j| element.shape_value(i, &points[j]))
        } else {
            DMatrix::zeros(0, 0)
        };

        let gradients = if update_flags.contains(UpdateFlags::GRADIENTS) {
            DofPointTable::from_fn(num_dofs, num_points, |i, j| element.shape_gradient(i, &points[j]))
        } else {
            DofPointTable::unallocated(num_dofs, num_points)
        };

        Self {
            shape_values,
            gradients,
        }
    }
}

/// Allocates a buffer of length `len` if `flag` was requested, and an empty one otherwise.
pub(crate) fn allocate_if<X: Clone>(update_flags: UpdateFlags, flag: UpdateFlags, len: usize, value: X) -> Vec<X> {
    if update_flags.contains(flag) {
        vec![value; len]
    } else {
        Vec::new()
    }
}

/// Gradients and `JxW` values are derived from the Jacobians, which must therefore be requested.
pub(crate) fn check_jacobian_prerequisites(update_flags: UpdateFlags) -> Result<(), FeValuesError> {
    if !update_flags.contains(UpdateFlags::JACOBIANS) {
        if update_flags.contains(UpdateFlags::GRADIENTS) {
            return Err(FeValuesError::CannotInitializeField { field: "shape gradients" });
        }
        if update_flags.contains(UpdateFlags::JXW_VALUES) {
            return Err(FeValuesError::CannotInitializeField { field: "JxW values" });
        }
    }
    Ok(())
}

pub(crate) fn check_dof_count(expected: usize, actual: usize) -> Result<(), FeValuesError> {
    if expected == actual {
        Ok(())
    } else {
        Err(FeValuesError::DofCountMismatch { expected, actual })
    }
}

/// Maps reference gradients to physical gradients with the chain rule.
pub(crate) fn transform_gradients<T, D>(
    reference_gradients: &DofPointTable<OVector<T, D>>,
    jacobians: &[OMatrix<T, D, D>],
    physical_gradients: &mut DofPointTable<OVector<T, D>>,
) where
    T: Real,
    D: SmallDim,
    DefaultAllocator: DimAllocator<T, D>,
{
    for i in 0..reference_gradients.num_dofs() {
        for (j, jacobian) in jacobians.iter().enumerate() {
            // (grad phi)_s = sum_b (grad_xi phi)_b J_bs
            jacobian.tr_mul_to(&reference_gradients[(i, j)], &mut physical_gradients[(i, j)]);
        }
    }
}

#[cold]
#[track_caller]
fn report(error: FeValuesError) -> ! {
    panic!("{error}")
}

#[inline]
#[track_caller]
pub(crate) fn require_index(index: usize, bound: usize) {
    if index >= bound {
        report(FeValuesError::InvalidIndex { index, bound })
    }
}

#[inline]
#[track_caller]
pub(crate) fn require_field(update_flags: UpdateFlags, flag: UpdateFlags, field: &'static str) {
    if !cfg!(feature = "unchecked-field-access") && !update_flags.contains(flag) {
        report(FeValuesError::AccessToUninitializedField { field })
    }
}

#[inline]
#[track_caller]
pub(crate) fn require_reinitialized(state: CacheState) {
    if !cfg!(feature = "unchecked-field-access") && state != CacheState::Reinitialized {
        report(FeValuesError::NotReinitialized)
    }
}
