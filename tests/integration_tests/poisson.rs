//! Method of manufactured solutions for the Poisson problem
//!   - Delta u = f,
//! assembled cell by cell with the evaluation caches and solved with a dense LU factorization.
use std::f64::consts::PI;
use std::ops::Deref;

use fevalues::assembly::{
    add_local_matrix_to_global, add_local_vector_to_global, apply_dirichlet_bc_dense, assemble_local_face_flux,
    assemble_local_laplace, assemble_local_source, estimate_local_l2_error_squared,
};
use fevalues::boundary::StraightBoundary;
use fevalues::connectivity::Connectivity;
use fevalues::element::{BilinearQuad, LinearSegment};
use fevalues::fe_values::{FeFaceValues, FeValues, UpdateFlags};
use fevalues::mesh::procedural::{create_unit_interval_mesh, create_unit_square_uniform_quad_mesh_2d};
use fevalues::mesh::CellAccessor;
use fevalues::quadrature::{gauss_1d, gauss_2d};
use matrixcompare::assert_scalar_eq;
use nalgebra::coordinates::XY;
use nalgebra::{DMatrix, DVector, Point1, Point2, Vector2};

fn sin(x: f64) -> f64 {
    x.sin()
}

fn u_exact(x: &Point2<f64>) -> f64 {
    let &XY { x, y } = x.coords.deref();
    sin(PI * x) * sin(PI * y)
}

fn f(x: &Point2<f64>) -> f64 {
    // f = - u_xx - u_yy
    2.0 * PI * PI * u_exact(x)
}

fn cell_flags() -> UpdateFlags {
    UpdateFlags::VALUES
        | UpdateFlags::GRADIENTS
        | UpdateFlags::QUADRATURE_POINTS
        | UpdateFlags::JACOBIANS
        | UpdateFlags::JXW_VALUES
}

/// Solves the problem with homogeneous Dirichlet conditions on a uniform mesh of the unit
/// square and returns the L2 error.
fn solve_poisson_2d(cells_per_dim: usize) -> f64 {
    let mesh = create_unit_square_uniform_quad_mesh_2d::<f64>(cells_per_dim);
    let n = mesh.vertices().len();
    let mut fe_values = FeValues::new(&BilinearQuad, &gauss_2d(2), cell_flags()).unwrap();

    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);
    let mut a_local = DMatrix::zeros(4, 4);
    let mut f_local = DVector::zeros(4);
    for cell in mesh.cell_iter() {
        fe_values
            .reinit(&cell, &BilinearQuad, &StraightBoundary)
            .unwrap();
        assemble_local_laplace(&fe_values, &mut a_local);
        assemble_local_source(&fe_values, f, &mut f_local);
        let dofs = cell.connectivity().vertex_indices();
        add_local_matrix_to_global(&mut matrix, &a_local, dofs);
        add_local_vector_to_global(&mut rhs, &f_local, dofs);
    }

    let mut constraints = Vec::new();
    for (cell_index, face) in mesh.boundary_faces() {
        let face_connectivity = mesh.connectivity()[cell_index]
            .get_face_connectivity(face)
            .unwrap();
        constraints.extend(face_connectivity.vertex_indices().iter().map(|&v| (v, 0.0)));
    }
    constraints.sort_by_key(|&(v, _)| v);
    constraints.dedup_by_key(|&mut (v, _)| v);
    apply_dirichlet_bc_dense(&mut matrix, &mut rhs, &constraints);

    let u_h = matrix.lu().solve(&rhs).unwrap();

    let mut fe_values = FeValues::new(&BilinearQuad, &gauss_2d(4), cell_flags()).unwrap();
    let mut error_squared = 0.0;
    for cell in mesh.cell_iter() {
        fe_values
            .reinit(&cell, &BilinearQuad, &StraightBoundary)
            .unwrap();
        let u_local = DVector::from_iterator(4, cell.connectivity().iter().map(|&v| u_h[v]));
        error_squared += estimate_local_l2_error_squared(&fe_values, &u_local, u_exact);
    }
    error_squared.sqrt()
}

#[test]
fn poisson_2d_bilinear_converges_quadratically() {
    let errors: Vec<_> = [4, 8, 16].into_iter().map(solve_poisson_2d).collect();
    assert!(errors[2] < 1e-2);
    for pair in errors.windows(2) {
        let rate = (pair[0] / pair[1]).log2();
        assert!(rate > 1.8, "observed convergence rate {rate}, errors {errors:?}");
    }
}

#[test]
fn poisson_1d_linear_is_nodally_exact() {
    // -u'' = 1 on [0, 1] with u(0) = u(1) = 0 has the solution u = x (1 - x) / 2, which linear
    // elements reproduce exactly at the vertices
    let mesh = create_unit_interval_mesh::<f64>(8);
    let n = mesh.vertices().len();
    let mut fe_values = FeValues::new(&LinearSegment, &gauss_1d(2), cell_flags()).unwrap();

    let mut matrix = DMatrix::zeros(n, n);
    let mut rhs = DVector::zeros(n);
    let mut a_local = DMatrix::zeros(2, 2);
    let mut f_local = DVector::zeros(2);
    for cell in mesh.cell_iter() {
        fe_values
            .reinit(&cell, &LinearSegment, &StraightBoundary)
            .unwrap();
        assemble_local_laplace(&fe_values, &mut a_local);
        assemble_local_source(&fe_values, |_: &Point1<f64>| 1.0, &mut f_local);
        let dofs = cell.connectivity().vertex_indices();
        add_local_matrix_to_global(&mut matrix, &a_local, dofs);
        add_local_vector_to_global(&mut rhs, &f_local, dofs);
    }
    apply_dirichlet_bc_dense(&mut matrix, &mut rhs, &[(0, 0.0), (n - 1, 0.0)]);
    let u_h = matrix.lu().solve(&rhs).unwrap();

    for (v, x) in mesh.vertices().iter().enumerate() {
        assert_scalar_eq!(u_h[v], 0.5 * x.x * (1.0 - x.x), comp = abs, tol = 1e-14);
    }
}

#[test]
fn divergence_theorem_on_every_cell() {
    // The integral of div w over a cell equals the outward flux of w through its faces. With
    // w = (x^2, xy) and div w = 3x, both sides are integrated exactly on the straight cells
    let mesh = create_unit_square_uniform_quad_mesh_2d::<f64>(3);
    let flags = cell_flags() | UpdateFlags::NORMAL_VECTORS;
    let mut fe_values = FeValues::new(&BilinearQuad, &gauss_2d(2), cell_flags()).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), flags).unwrap();
    let w = |x: &Point2<f64>| Vector2::new(x.x * x.x, x.x * x.y);

    let mut local = DVector::zeros(4);
    for cell in mesh.cell_iter() {
        fe_values
            .reinit(&cell, &BilinearQuad, &StraightBoundary)
            .unwrap();
        // The shape functions sum to one, so summing the local vector integrates the source
        assemble_local_source(&fe_values, |x| 3.0 * x.x, &mut local);
        let volume_integral = local.sum();

        let mut flux = 0.0;
        for face in 0..cell.num_faces() {
            fe_face_values
                .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
                .unwrap();
            assemble_local_face_flux(&fe_face_values, |x, n| w(x).dot(n), &mut local);
            flux += local.sum();
        }
        assert_scalar_eq!(volume_integral, flux, comp = abs, tol = 1e-14);
    }
}
