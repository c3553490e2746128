use itertools::izip;
use log::{debug, trace};
use nalgebra::{DMatrix, DefaultAllocator, OMatrix, OPoint, OVector};

use crate::allocators::ReferenceCellAllocator;
use crate::boundary::Boundary;
use crate::element::{FaceDataMut, FaceMapping, ReferenceBasis};
use crate::error::FeValuesError;
use crate::fe_values::{
    allocate_if, check_dof_count, check_jacobian_prerequisites, embed_face_quadrature_points, faces_per_cell,
    require_field, require_index, require_reinitialized, transform_gradients, CacheState, DofPointTable,
    FiniteElementValues, ReferenceTables, UpdateFlags,
};
use crate::mesh::CellAccessor;
use crate::quadrature::{validate_quadrature, Quadrature};
use crate::{FaceDim, Real, SmallDim};

/// Shape function data on the faces of the cells of a mesh.
///
/// The face quadrature rule is embedded into every face of the reference cell at construction,
/// so that reference data is available for all faces. A call to [`reinit`](Self::reinit) selects
/// one face of one cell.
///
/// Unlike [`FeValues`](crate::fe_values::FeValues), all accessors require a successful call to
/// `reinit`, since even the shape function values depend on the selected face.
///
/// The `JxW` values of a face are the face quadrature weights scaled by the ratio of the physical
/// face measure to the reference face measure, see
/// [`face_jacobian_determinant`](Self::face_jacobian_determinant).
#[derive(Debug, Clone)]
pub struct FeFaceValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    n_quadrature_points: usize,
    dof_count: usize,
    update_flags: UpdateFlags,
    state: CacheState,
    selected_face: usize,

    // Reference data for every face, fixed at construction
    shape_values: Vec<DMatrix<T>>,
    reference_gradients: Vec<DofPointTable<OVector<T, D>>>,
    weights: Vec<T>,
    reference_quadrature_points: Vec<OPoint<T, FaceDim<D>>>,
    cell_reference_quadrature_points: Vec<Vec<OPoint<T, D>>>,

    // Physical data for the selected face
    shape_gradients: DofPointTable<OVector<T, D>>,
    jacobians: Vec<OMatrix<T, D, D>>,
    quadrature_points: Vec<OPoint<T, D>>,
    ansatz_points: Vec<OPoint<T, D>>,
    jxw_values: Vec<T>,
    face_jacobian_determinants: Vec<T>,
    normal_vectors: Vec<OVector<T, D>>,
}

impl<T, D> FeFaceValues<T, D>
where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    /// Evaluates the reference basis at the points of the face quadrature rule on every face of
    /// the reference cell.
    ///
    /// # Errors
    ///
    /// In addition to the failure modes of [`FeValues::new`](crate::fe_values::FeValues::new),
    /// fails with [`FeValuesError::UnsupportedGeometry`] if no face embedding is known for `D`.
    pub fn new<E, Q>(element: &E, face_quadrature: &Q, update_flags: UpdateFlags) -> Result<Self, FeValuesError>
    where
        E: ?Sized + ReferenceBasis<T, ReferenceDim = D>,
        Q: ?Sized + Quadrature<T, FaceDim<D>>,
    {
        validate_quadrature(face_quadrature)?;
        let dof_count = element.dof_count();
        if dof_count == 0 {
            return Err(FeValuesError::NoDegreesOfFreedom);
        }

        let n_quadrature_points = face_quadrature.num_points();
        let reference_quadrature_points = face_quadrature.points().to_vec();

        let num_faces = faces_per_cell::<D>();
        let mut shape_values = Vec::with_capacity(num_faces);
        let mut reference_gradients = Vec::with_capacity(num_faces);
        let mut cell_reference_quadrature_points = Vec::with_capacity(num_faces);
        for face in 0..num_faces {
            let cell_points = embed_face_quadrature_points::<T, D>(face, &reference_quadrature_points)?;
            let tables = ReferenceTables::evaluate(element, &cell_points, update_flags);
            shape_values.push(tables.shape_values);
            reference_gradients.push(tables.gradients);
            cell_reference_quadrature_points.push(cell_points);
        }

        let shape_gradients = if update_flags.contains(UpdateFlags::GRADIENTS) {
            DofPointTable::from_element(dof_count, n_quadrature_points, OVector::<T, D>::zeros())
        } else {
            DofPointTable::unallocated(dof_count, n_quadrature_points)
        };

        debug!(
            "Constructed face evaluation cache with {dof_count} dofs and {n_quadrature_points} quadrature points \
             on each of {num_faces} faces ({update_flags:?})"
        );

        let nq = n_quadrature_points;
        Ok(Self {
            n_quadrature_points,
            dof_count,
            update_flags,
            state: CacheState::Constructed,
            selected_face: 0,
            shape_values,
            reference_gradients,
            weights: face_quadrature.weights().to_vec(),
            reference_quadrature_points,
            cell_reference_quadrature_points,
            shape_gradients,
            jacobians: allocate_if(update_flags, UpdateFlags::JACOBIANS, nq, OMatrix::<T, D, D>::zeros()),
            quadrature_points: allocate_if(update_flags, UpdateFlags::QUADRATURE_POINTS, nq, OPoint::origin()),
            ansatz_points: allocate_if(update_flags, UpdateFlags::ANSATZ_POINTS, dof_count, OPoint::origin()),
            jxw_values: allocate_if(update_flags, UpdateFlags::JXW_VALUES, nq, T::zero()),
            face_jacobian_determinants: allocate_if(update_flags, UpdateFlags::JXW_VALUES, nq, T::zero()),
            normal_vectors: allocate_if(update_flags, UpdateFlags::NORMAL_VECTORS, nq, OVector::<T, D>::zeros()),
        })
    }

    /// Selects face `face` of the given cell and maps the cached reference data to it.
    ///
    /// All physical quantities of a previous call are overwritten. If this fails, the cache
    /// behaves as if it had never been reinitialized until the next successful call.
    ///
    /// # Errors
    ///
    /// Fails with [`FeValuesError::InvalidIndex`] if `face` is not a face of the reference cell,
    /// and otherwise under the same conditions as [`FeValues::reinit`](crate::fe_values::FeValues::reinit).
    pub fn reinit<C, E, B>(&mut self, cell: &C, face: usize, element: &E, boundary: &B) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, D>,
        E: ?Sized + FaceMapping<T, ReferenceDim = D>,
        B: ?Sized + Boundary<T, D>,
    {
        self.state = CacheState::Constructed;
        let num_faces = self.num_faces();
        if face >= num_faces {
            return Err(FeValuesError::InvalidIndex {
                index: face,
                bound: num_faces,
            });
        }
        let flags = self.update_flags;
        check_jacobian_prerequisites(flags)?;
        check_dof_count(self.dof_count, element.dof_count())?;
        trace!("Reinitializing face evaluation cache on face {face} of cell {}", cell.index());

        self.selected_face = face;
        let geometric_flags = UpdateFlags::JACOBIANS
            | UpdateFlags::QUADRATURE_POINTS
            | UpdateFlags::ANSATZ_POINTS
            | UpdateFlags::JXW_VALUES
            | UpdateFlags::NORMAL_VECTORS;
        if flags.intersects(geometric_flags) {
            let data = FaceDataMut {
                jacobians: flags
                    .contains(UpdateFlags::JACOBIANS)
                    .then_some(&mut self.jacobians[..]),
                ansatz_points: flags
                    .contains(UpdateFlags::ANSATZ_POINTS)
                    .then_some(&mut self.ansatz_points[..]),
                quadrature_points: flags
                    .contains(UpdateFlags::QUADRATURE_POINTS)
                    .then_some(&mut self.quadrature_points[..]),
                face_jacobian_determinants: flags
                    .contains(UpdateFlags::JXW_VALUES)
                    .then_some(&mut self.face_jacobian_determinants[..]),
                normals: flags
                    .contains(UpdateFlags::NORMAL_VECTORS)
                    .then_some(&mut self.normal_vectors[..]),
            };
            element.fill_face_data(
                cell,
                face,
                &self.reference_quadrature_points,
                &self.cell_reference_quadrature_points[face],
                boundary,
                data,
            )?;
        }

        if flags.contains(UpdateFlags::GRADIENTS) {
            transform_gradients(&self.reference_gradients[face], &self.jacobians, &mut self.shape_gradients);
        }

        if flags.contains(UpdateFlags::JXW_VALUES) {
            for (jxw, &weight, &det) in izip!(&mut self.jxw_values, &self.weights, &self.face_jacobian_determinants) {
                *jxw = weight * det;
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

    pub fn num_faces(&self) -> usize {
        self.shape_values.len()
    }

    pub fn update_flags(&self) -> UpdateFlags {
        self.update_flags
    }

    pub fn is_reinitialized(&self) -> bool {
        self.state == CacheState::Reinitialized
    }

    /// The face selected by the last successful call to [`reinit`](Self::reinit), if any.
    pub fn selected_face(&self) -> Option<usize> {
        self.is_reinitialized().then_some(self.selected_face)
    }

    /// The quadrature weights on the reference face.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// The quadrature points in face-local reference coordinates.
    pub fn reference_quadrature_points(&self) -> &[OPoint<T, FaceDim<D>>] {
        &self.reference_quadrature_points
    }

    /// The quadrature points of face `face`, embedded into the reference cell.
    #[track_caller]
    pub fn cell_reference_quadrature_points(&self, face: usize) -> &[OPoint<T, D>] {
        require_index(face, self.num_faces());
        &self.cell_reference_quadrature_points[face]
    }

    #[track_caller]
    pub fn shape_value(&self, dof: usize, point: usize) -> T {
        require_index(dof, self.dof_count);
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::VALUES, "shape values");
        require_reinitialized(self.state);
        self.shape_values[self.selected_face][(dof, point)]
    }

    /// Shape function values on the selected face, with one row per dof and one column per
    /// quadrature point.
    #[track_caller]
    pub fn shape_values(&self) -> &DMatrix<T> {
        require_field(self.update_flags, UpdateFlags::VALUES, "shape values");
        require_reinitialized(self.state);
        &self.shape_values[self.selected_face]
    }

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

    /// Reference gradients of the shape functions on the selected face.
    #[track_caller]
    pub fn reference_shape_gradients(&self) -> &DofPointTable<OVector<T, D>> {
        require_field(self.update_flags, UpdateFlags::GRADIENTS, "shape gradients");
        require_reinitialized(self.state);
        &self.reference_gradients[self.selected_face]
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

    /// The physical support point of `dof`, which need not lie on the selected face.
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

    /// The ratio of the physical to the reference face measure at `point`.
    ///
    /// Computed whenever `JxW` values are requested.
    #[track_caller]
    pub fn face_jacobian_determinant(&self, point: usize) -> T {
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::JXW_VALUES, "face Jacobian determinants");
        require_reinitialized(self.state);
        self.face_jacobian_determinants[point]
    }

    #[track_caller]
    pub fn face_jacobian_determinants(&self) -> &[T] {
        require_field(self.update_flags, UpdateFlags::JXW_VALUES, "face Jacobian determinants");
        require_reinitialized(self.state);
        &self.face_jacobian_determinants
    }

    /// The outward unit normal of the selected face at `point`.
    #[track_caller]
    pub fn normal_vector(&self, point: usize) -> &OVector<T, D> {
        require_index(point, self.n_quadrature_points);
        require_field(self.update_flags, UpdateFlags::NORMAL_VECTORS, "normal vectors");
        require_reinitialized(self.state);
        &self.normal_vectors[point]
    }

    #[track_caller]
    pub fn normal_vectors(&self) -> &[OVector<T, D>] {
        require_field(self.update_flags, UpdateFlags::NORMAL_VECTORS, "normal vectors");
        require_reinitialized(self.state);
        &self.normal_vectors
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

impl<T, D> FiniteElementValues<T, D> for FeFaceValues<T, D>
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
        FeFaceValues::shape_value(self, dof, point)
    }

    #[track_caller]
    fn shape_gradient(&self, dof: usize, point: usize) -> &OVector<T, D> {
        FeFaceValues::shape_gradient(self, dof, point)
    }

    #[track_caller]
    fn quadrature_point(&self, point: usize) -> &OPoint<T, D> {
        FeFaceValues::quadrature_point(self, point)
    }

    #[track_caller]
    fn ansatz_point(&self, dof: usize) -> &OPoint<T, D> {
        FeFaceValues::ansatz_point(self, dof)
    }

    #[track_caller]
    fn jxw(&self, point: usize) -> T {
        FeFaceValues::jxw(self, point)
    }
}
