//! Local and global assembly of scalar problems with the evaluation caches.
//!
//! The local routines are generic over [`FiniteElementValues`] and therefore work with cell and
//! face caches alike. They expect the cache to have been reinitialized on the cell (or face) of
//! interest and panic if a quantity they need was not requested.
use nalgebra::{DMatrix, DMatrixViewMut, DVectorView, DVectorViewMut, DefaultAllocator, OPoint, OVector};

use crate::allocators::ReferenceCellAllocator;
use crate::fe_values::{FeFaceValues, FiniteElementValues};
use crate::{Real, SmallDim};

fn check_local_matrix_dimensions<T: Real>(matrix: &DMatrixViewMut<T>, dof_count: usize) {
    assert_eq!(matrix.nrows(), dof_count, "Local matrix must have one row per dof.");
    assert_eq!(matrix.ncols(), dof_count, "Local matrix must have one column per dof.");
}

fn check_local_vector_dimensions<T: Real>(vector: &DVectorViewMut<T>, dof_count: usize) {
    assert_eq!(vector.len(), dof_count, "Local vector must have one entry per dof.");
}

/// Assembles the local matrix `A_ij = sum_q grad phi_i . grad phi_j JxW` of the Laplace operator.
///
/// Requires shape gradients and `JxW` values.
///
/// # Panics
///
/// Panics if `output` is not a square matrix with one row per dof.
pub fn assemble_local_laplace<'a, T, D, V>(values: &V, output: impl Into<DMatrixViewMut<'a, T>>)
where
    T: Real,
    D: SmallDim,
    V: ?Sized + FiniteElementValues<T, D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let mut output = output.into();
    let n = values.dof_count();
    check_local_matrix_dimensions(&output, n);

    output.fill(T::zero());
    for q in 0..values.n_quadrature_points() {
        let jxw = values.jxw(q);
        for i in 0..n {
            let grad_i = values.shape_gradient(i, q);
            for j in 0..n {
                output[(i, j)] += grad_i.dot(values.shape_gradient(j, q)) * jxw;
            }
        }
    }
}

/// Assembles the local mass matrix `M_ij = sum_q phi_i phi_j JxW`.
///
/// Requires shape values and `JxW` values.
///
/// # Panics
///
/// Panics if `output` is not a square matrix with one row per dof.
pub fn assemble_local_mass<'a, T, D, V>(values: &V, output: impl Into<DMatrixViewMut<'a, T>>)
where
    T: Real,
    D: SmallDim,
    V: ?Sized + FiniteElementValues<T, D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let mut output = output.into();
    let n = values.dof_count();
    check_local_matrix_dimensions(&output, n);

    output.fill(T::zero());
    for q in 0..values.n_quadrature_points() {
        let jxw = values.jxw(q);
        for i in 0..n {
            let phi_i = values.shape_value(i, q);
            for j in 0..n {
                output[(i, j)] += phi_i * values.shape_value(j, q) * jxw;
            }
        }
    }
}

/// Assembles the local load vector `f_i = sum_q f(x_q) phi_i JxW`.
///
/// Requires shape values, quadrature points and `JxW` values.
///
/// # Panics
///
/// Panics if `output` does not have one entry per dof.
pub fn assemble_local_source<'a, T, D, V>(
    values: &V,
    source: impl Fn(&OPoint<T, D>) -> T,
    output: impl Into<DVectorViewMut<'a, T>>,
) where
    T: Real,
    D: SmallDim,
    V: ?Sized + FiniteElementValues<T, D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let mut output = output.into();
    let n = values.dof_count();
    check_local_vector_dimensions(&output, n);

    output.fill(T::zero());
    for q in 0..values.n_quadrature_points() {
        let f_jxw = source(values.quadrature_point(q)) * values.jxw(q);
        for i in 0..n {
            output[i] += values.shape_value(i, q) * f_jxw;
        }
    }
}

/// Assembles the boundary term `g_i = sum_q g(x_q, n_q) phi_i JxW` on the selected face, where
/// `n_q` is the outward unit normal.
///
/// Requires shape values, quadrature points, normal vectors and `JxW` values.
///
/// # Panics
///
/// Panics if `output` does not have one entry per dof.
pub fn assemble_local_face_flux<'a, T, D>(
    values: &FeFaceValues<T, D>,
    flux: impl Fn(&OPoint<T, D>, &OVector<T, D>) -> T,
    output: impl Into<DVectorViewMut<'a, T>>,
) where
    T: Real,
    D: SmallDim,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let mut output = output.into();
    let n = values.dof_count();
    check_local_vector_dimensions(&output, n);

    output.fill(T::zero());
    for q in 0..values.n_quadrature_points() {
        let g_jxw = flux(values.quadrature_point(q), values.normal_vector(q)) * values.jxw(q);
        for i in 0..n {
            output[i] += values.shape_value(i, q) * g_jxw;
        }
    }
}

/// Evaluates `f` at the ansatz points, which yields the local coefficients of the nodal
/// interpolant of `f` for Lagrange elements.
///
/// Requires ansatz points.
///
/// # Panics
///
/// Panics if `output` does not have one entry per dof.
pub fn interpolate_at_ansatz_points<'a, T, D, V>(
    values: &V,
    f: impl Fn(&OPoint<T, D>) -> T,
    output: impl Into<DVectorViewMut<'a, T>>,
) where
    T: Real,
    D: SmallDim,
    V: ?Sized + FiniteElementValues<T, D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let mut output = output.into();
    check_local_vector_dimensions(&output, values.dof_count());
    for (i, value) in output.iter_mut().enumerate() {
        *value = f(values.ansatz_point(i));
    }
}

/// Computes `sum_q (u_h(x_q) - u(x_q))^2 JxW`, the squared `L2` error of the discrete function
/// with the given local coefficients on the current cell.
///
/// Requires shape values, quadrature points and `JxW` values.
///
/// # Panics
///
/// Panics if `u_local` does not have one entry per dof.
pub fn estimate_local_l2_error_squared<'a, T, D, V>(
    values: &V,
    u_local: impl Into<DVectorView<'a, T>>,
    u: impl Fn(&OPoint<T, D>) -> T,
) -> T
where
    T: Real,
    D: SmallDim,
    V: ?Sized + FiniteElementValues<T, D>,
    DefaultAllocator: ReferenceCellAllocator<T, D>,
{
    let u_local = u_local.into();
    let n = values.dof_count();
    assert_eq!(u_local.len(), n, "Local coefficients must have one entry per dof.");

    let mut error_squared = T::zero();
    for q in 0..values.n_quadrature_points() {
        let u_h = (0..n).fold(T::zero(), |sum, i| sum + u_local[i] * values.shape_value(i, q));
        let e = u_h - u(values.quadrature_point(q));
        error_squared += e * e * values.jxw(q);
    }
    error_squared
}

/// Adds a local matrix to the rows and columns of a dense global matrix given by `dofs`.
pub fn add_local_matrix_to_global<T: Real>(global: &mut DMatrix<T>, local: &DMatrix<T>, dofs: &[usize]) {
    assert_eq!(local.nrows(), dofs.len(), "Local matrix must have one row per dof.");
    for (i_local, &i) in dofs.iter().enumerate() {
        for (j_local, &j) in dofs.iter().enumerate() {
            global[(i, j)] += local[(i_local, j_local)];
        }
    }
}

/// Adds a local vector to the entries of a global vector given by `dofs`.
pub fn add_local_vector_to_global<'a, 'b, T: Real>(
    global: impl Into<DVectorViewMut<'a, T>>,
    local: impl Into<DVectorView<'b, T>>,
    dofs: &[usize],
) {
    let mut global = global.into();
    let local = local.into();
    assert_eq!(local.len(), dofs.len(), "Local vector must have one entry per dof.");
    for (i_local, &i) in dofs.iter().enumerate() {
        global[i] += local[i_local];
    }
}

/// Constrains the given dofs to the given values in a dense linear system.
///
/// Rows and columns of constrained dofs are eliminated from the system, with the diagonal entry
/// replaced by a value on the scale of the remaining diagonal to preserve conditioning.
pub fn apply_dirichlet_bc_dense<'a, T: Real>(
    matrix: &mut DMatrix<T>,
    rhs: impl Into<DVectorViewMut<'a, T>>,
    constraints: &[(usize, T)],
) {
    let mut rhs = rhs.into();
    let n = matrix.nrows();
    assert_eq!(rhs.len(), n, "Right-hand side must match the matrix dimensions.");
    if n == 0 {
        return;
    }

    let scale = matrix
        .diagonal()
        .map(|x| x.abs())
        .fold(T::zero(), |a, b| a + b)
        / T::from_usize(n).expect("Must be able to fit usize in T");

    for &(dof, value) in constraints {
        // Move the known column to the right-hand side before eliminating it
        for i in 0..n {
            rhs[i] -= matrix[(i, dof)] * value;
        }
        matrix.column_mut(dof).fill(T::zero());
        matrix.row_mut(dof).fill(T::zero());
        matrix[(dof, dof)] = scale;
        rhs[dof] = scale * value;
    }
}
