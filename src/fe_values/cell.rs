use itertools::izip;
use log::{debug, trace};
use nalgebra::{DMatrix, DefaultAllocator, OMatrix, OPoint, OVector};

use crate::allocators::ReferenceCellAllocator;
use crate::boundary::Boundary;
use crate::element::{CellDataMut, CellMapping, ReferenceBasis};
use crate::error::FeValuesError;
use crate::fe_values::{
    allocate_if, check_dof_count, check_jacobian_prerequisites, require_field, require_index, require_reinitialized,
    transform_gradients, CacheState, DofPointTable, FiniteElementValues, ReferenceTables, UpdateFlags,
};
use crate::mesh::CellAccessor;
use crate::quadrature::{validate_quadrature, Quadrature};
use crate::{Real, SmallDim};

/// Shape function data on the cells of a mesh.
///
/// # Example
///
/// ```
/// use fevalues::boundary::StraightBoundary;
/// use fevalues::element::BilinearQuad;
/// use fevalues::fe_values::{FeValues, UpdateFlags};
/// use fevalues::mesh::procedural::create_unit_square_uniform_quad_mesh_2d;
/// use fevalues::quadrature::gauss_2d;
///
/// let mesh = create_unit_square_uniform_quad_mesh_2d::<f64>(4);
/// let flags = UpdateFlags::VALUES | UpdateFlags::JACOBIANS | UpdateFlags::JXW_VALUES;
/// let mut fe_values = FeValues::new(&BilinearQuad, &gauss_2d::<f64>(2), flags).unwrap();
///
/// let mut area = 0.0;
/// for cell in mesh.cell_iter() {
///     fe_values.reinit(&cell, &BilinearQuad, &StraightBoundary).unwrap();
///     area += fe_values.jxw_values().iter().sum::<f64>();
/// }
/// assert!((area - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FeValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    n_quadrature_points: usize,
    dof_count: usize,
    update_flags: UpdateFlags,
    state: CacheState,

    // Reference data, fixed at construction
    shape_values: DMatrix<T>,
    reference_gradients: DofPointTable<OVector<T, D>>,
    weights: Vec<T>,
    reference_quadrature_points: Vec<OPoint<T, D>>,

    // Physical data, overwritten by every reinit
    shape_gradients: DofPointTable<OVector<T, D>>,
    jacobians: Vec<OMatrix<T, D, D>>,
    quadrature_points: Vec<OPoint<T, D>>,
    ansatz_points: Vec<OPoint<T, D>>,
    jxw_values: Vec<T>,
}

impl<T, D> FeValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    /// Evaluates the reference basis at the points of the quadrature rule and allocates storage
    /// for the physical quantities selected by `update_flags`.
    ///
    /// # Errors
    ///
    /// Fails if the quadrature rule is empty or inconsistent, or if the element has no degrees
    /// of freedom.
    pub fn new<E, Q>(element: &E, quadrature: &Q, update_flags: UpdateFlags) -> Result<Self, FeValuesError>
    where
        E: ?Sized + ReferenceBasis<T, ReferenceDim = D>,
        Q: ?Sized + Quadrature<T, D>,
    {
        validate_quadrature(quadrature)?;
        let dof_count = element.dof_count();
        if dof_count == 0 {
            return Err(FeValuesError::NoDegreesOfFreedom);
        }

        let n_quadrature_points = quadrature.num_points();
        let reference_quadrature_points = quadrature.points().to_vec();
        let ReferenceTables {
            shape_values,
            gradients: reference_gradients,
        } = ReferenceTables::evaluate(element, &reference_quadrature_points, update_flags);

        let shape_gradients = if update_flags.contains(UpdateFlags::GRADIENTS) {
            DofPointTable::from_element(dof_count, n_quadrature_points, OVector::<T, D>::zeros())
        } else {
            DofPointTable::unallocated(dof_count, n_quadrature_points)
        };

        debug!(
            "Constructed cell evaluation cache with {dof_count} dofs and {n_quadrature_points} quadrature points \
             ({update_flags:?})"
        );

        Ok(Self {
            n_quadrature_points,
            dof_count,
            update_flags,
            state: CacheState::Constructed,
            shape_values,
            reference_gradients,
            weights: quadrature.weights().to_vec(),
            reference_quadrature_points,
            shape_gradients,
            jacobians: allocate_if(
                update_flags,
                UpdateFlags::JACOBIANS,
                n_quadrature_points,
                OMatrix::<T, D, D>::zeros(),
            ),
            quadrature_points: allocate_if(
                update_flags,
                UpdateFlags::QUADRATURE_POINTS,
                n_quadrature_points,
                OPoint::origin(),
            ),
            ansatz_points: allocate_if(update_flags, UpdateFlags::ANSATZ_POINTS, dof_count, OPoint::origin()),
            jxw_values: allocate_if(update_flags, UpdateFlags::JXW_VALUES, n_quadrature_points, T::zero()),
        })
    }

    /// Maps the cached reference data to the given cell.
    ///
    /// All physical quantities of a previous call are overwritten. If this fails, the cache
    /// behaves as if it had never been reinitialized until the next successful call.
    ///
    /// # Errors
    ///
    /// Fails if gradients or `JxW` values were requested without Jacobians, if `element` has a
    /// different number of degrees of freedom than the basis the cache was built for, or if the
    /// cell cannot be mapped by `element`.
    pub fn reinit<C, E, B>(&mut self, cell: &C, element: &E, boundary: &B) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, D>,
        E: ?Sized + CellMapping<T, ReferenceDim = D>,
        B: ?Sized + Boundary<T, D>,
    {
        self.state = CacheState::Constructed;
        let flags = self.update_flags;
        check_jacobian_prerequisites(flags)?;
        check_dof_count(self.dof_count, element.dof_count())?;
        trace!("Reinitializing cell evaluation cache on cell {}", cell.index());

        if flags.intersects(UpdateFlags::JACOBIANS | UpdateFlags::QUADRATURE_POINTS | UpdateFlags::ANSATZ_POINTS) {
            let data = CellDataMut {
                jacobians: flags
                    .contains(UpdateFlags::JACOBIANS)
                    .then_some(&mut self.jacobians[..]),
                ansatz_points: flags
                    .contains(UpdateFlags::ANSATZ_POINTS)
                    .then_some(&mut self.ansatz_points[..]),
                quadrature_points: flags
                    .contains(UpdateFlags::QUADRATURE_POINTS)
                    .then_some(&mut self.quadrature_points[..]),
            };
            element.fill_cell_data(cell, &self.reference_quadrature_points, boundary, data)?;
        }

        if flags.contains(UpdateFlags::GRADIENTS) {
            transform_gradients(&self.reference_gradients, &self.jacobians, &mut self.shape_gradients);
        }

        if flags.contains(UpdateFlags::JXW_VALUES) {
            // The stored Jacobians belong to the inverse mapping, hence the division
            for (jxw, &weight, jacobian) in izip!(&mut self.jxw_values, &self.weights, &self.jacobians) {
                *jxw = weight / jacobian.determinant();
            }
        }

        self.state = CacheState::Reinitialized;
        Ok(())
    }

    pub fn n_quadrature_points(&self) -> usize {
        self.n_quadrature_points
    }

    pub fn dof_count(&self) -> usize {
        self.dof_count
    }

    pub fn update_flags(&self) -> UpdateFlags {
        self.update_flags
    }

    /// Whether the last call to [`reinit`](Self::reinit) succeeded.
    pub fn is_reinitialized(&self) -> bool {
        self.state == CacheState::Reinitialized
    }

    /// The quadrature weights on the reference cell.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn reference_quadrature_points(&self) -> &[OPoint<T, D>] {
        &self.reference_quadrature_points
    }

    /// The value of shape function `dof` at quadrature point `point`.
    ///
    /// Shape function values do not depend on the cell and are available before the first call
    /// to [`reinit`](Self::reinit).
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds or [`UpdateFlags::VALUES`] was not requested.
    #[track_caller]
    pub fn shape_value(&self, dof: usize, point: usize) -> T {
        require_index(dof, self.dof_count);
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::VALUES, "shape values");
        self.shape_values[(dof, point)]
    }

    /// All shape function values, with one row per dof and one column per quadrature point.
    #[track_caller]
    pub fn shape_values(&self) -> &DMatrix<T> {
        require_field(self.update_flags, UpdateFlags::VALUES, "shape values");
        &self.shape_values
    }

    /// The physical gradient of shape function `dof` at quadrature point `point`.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds, [`UpdateFlags::GRADIENTS`] was not requested or the
    /// cache has not been reinitialized.
    #[track_caller]
    pub fn shape_gradient(&self, dof: usize, point: usize) -> &OVector<T, D> {
        require_index(dof, self.dof_count);
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::GRADIENTS, "shape gradients");
        require_reinitialized(self.state);
        &self.shape_gradients[(dof, point)]
    }

    #[track_caller]
    pub fn shape_gradients(&self) -> &DofPointTable<OVector<T, D>> {
        require_field(self.update_flags, UpdateFlags::GRADIENTS, "shape gradients");
        require_reinitialized(self.state);
        &self.shape_gradients
    }

    /// Gradients of the shape functions with respect to the reference coordinates.
    ///
    /// Available before the first call to [`reinit`](Self::reinit).
    #[track_caller]
    pub fn reference_shape_gradients(&self) -> &DofPointTable<OVector<T, D>> {
        require_field(self.update_flags, UpdateFlags::GRADIENTS, "shape gradients");
        &self.reference_gradients
    }

    #[track_caller]
    pub fn quadrature_point(&self, point: usize) -> &OPoint<T, D> {
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::QUADRATURE_POINTS, "quadrature points");
        require_reinitialized(self.state);
        &self.quadrature_points[point]
    }

    #[track_caller]
    pub fn quadrature_points(&self) -> &[OPoint<T, D>] {
        require_field(self.update_flags, UpdateFlags::QUADRATURE_POINTS, "quadrature points");
        require_reinitialized(self.state);
        &self.quadrature_points
    }

    /// The physical support point of `dof`.
    #[track_caller]
    pub fn ansatz_point(&self, dof: usize) -> &OPoint<T, D> {
        require_index(dof, self.dof_count);
        require_field(self.update_flags, UpdateFlags::ANSATZ_POINTS, "ansatz points");
        require_reinitialized(self.state);
        &self.ansatz_points[dof]
    }

    #[track_caller]
    pub fn ansatz_points(&self) -> &[OPoint<T, D>] {
        require_field(self.update_flags, UpdateFlags::ANSATZ_POINTS, "ansatz points");
        require_reinitialized(self.state);
        &self.ansatz_points
    }

    /// The quadrature weight scaled by the volume element of the cell mapping at `point`.
    ///
    /// Negative for cells whose orientation is opposite to that of the reference cell.
    #[track_caller]
    pub fn jxw(&self, point: usize) -> T {
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::JXW_VALUES, "JxW values");
        require_reinitialized(self.state);
        self.jxw_values[point]
    }

    #[track_caller]
    pub fn jxw_values(&self) -> &[T] {
        require_field(self.update_flags, UpdateFlags::JXW_VALUES, "JxW values");
        require_reinitialized(self.state);
        &self.jxw_values
    }

    /// The Jacobian `d xi / d x` of the inverse cell mapping at `point`.
    #[track_caller]
    pub fn jacobian(&self, point: usize) -> &OMatrix<T, D, D> {
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::JACOBIANS, "Jacobians");
        require_reinitialized(self.state);
        &self.jacobians[point]
    }

    #[track_caller]
    pub fn jacobians(&self) -> &[OMatrix<T, D, D>] {
        require_field(self.update_flags, UpdateFlags::JACOBIANS, "Jacobians");
        require_reinitialized(self.state);
        &self.jacobians
    }
}

impl<T, D> FiniteElementValues<T, D> for FeValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    fn n_quadrature_points(&self) -> usize {
        self.n_quadrature_points
    }

    fn dof_count(&self) -> usize {
        self.dof_count
    }

    fn update_flags(&self) -> UpdateFlags {
        self.update_flags
    }

    #[track_caller]
    fn shape_value(&self, dof: usize, point: usize) -> T {
        FeValues::shape_value(self, dof, point)
    }

    #[track_caller]
    fn shape_gradient(&self, dof: usize, point: usize) -> &OVector<T, D> {
        FeValues::shape_gradient(self, dof, point)
    }

    #[track_caller]
    fn quadrature_point(&self, point: usize) -> &OPoint<T, D> {
        FeValues::quadrature_point(self, point)
    }

    #[track_caller]
    fn ansatz_point(&self, dof: usize) -> &OPoint<T, D> {
        FeValues::ansatz_point(self, dof)
    }

    #[track_caller]
    fn jxw(&self, point: usize) -> T {
        FeValues::jxw(self, point)
    }
}
