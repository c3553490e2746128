use crate::{single_quad_mesh, skewed_quad_vertices, square_vertices, unit_square_vertices};
use fevalues::boundary::{HyperBallBoundary, StraightBoundary};
use fevalues::element::{BilinearQuad, BiquadraticQuad, LinearSegment, ReferenceBasis};
use fevalues::fe_values::{FeFaceValues, UpdateFlags};
use fevalues::mesh::procedural::create_uniform_interval_mesh;
use fevalues::quadrature::{gauss_1d, gauss_3d, vertex, Quadrature};
use fevalues::FeValuesError;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{Point2, Point4, Vector1, Vector2, Vector4, U2, U4};

fn all_face_flags() -> UpdateFlags {
    UpdateFlags::all()
}

#[test]
fn face_jxw_sums_to_face_length_on_unit_square() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();
    assert_eq!(fe_face_values.num_faces(), 4);

    for face in 0..4 {
        fe_face_values
            .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
            .unwrap();
        assert_eq!(fe_face_values.selected_face(), Some(face));
        let length: f64 = fe_face_values.jxw_values().iter().sum();
        assert_scalar_eq!(length, 1.0, comp = abs, tol = 1e-14);
    }
}

#[test]
fn face_jxw_sums_to_face_length_on_rectangle() {
    let vertices = [
        Point2::new(1.0, 1.0),
        Point2::new(3.0, 1.0),
        Point2::new(3.0, 4.0),
        Point2::new(1.0, 4.0),
    ];
    let mesh = single_quad_mesh(vertices);
    let cell = mesh.cell(0).unwrap();
    let flags = UpdateFlags::JACOBIANS | UpdateFlags::JXW_VALUES;
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(3), flags).unwrap();

    for (face, expected_length) in [2.0, 3.0, 2.0, 3.0].into_iter().enumerate() {
        fe_face_values
            .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
            .unwrap();
        let length: f64 = fe_face_values.jxw_values().iter().sum();
        assert_scalar_eq!(length, expected_length, comp = abs, tol = 1e-13);
        for &det in fe_face_values.face_jacobian_determinants() {
            assert_scalar_eq!(det, expected_length, comp = abs, tol = 1e-13);
        }
    }
}

#[test]
fn normals_point_out_of_the_cell() {
    let expected_normals = [
        Vector2::new(0.0, -1.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(0.0, 1.0),
        Vector2::new(-1.0, 0.0),
    ];
    let mesh = single_quad_mesh(square_vertices(Vector2::new(-1.0, 2.0), 0.5));
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();

    for (face, expected) in expected_normals.into_iter().enumerate() {
        fe_face_values
            .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
            .unwrap();
        for &normal in fe_face_values.normal_vectors() {
            assert_matrix_eq!(normal, expected, comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn normals_of_skewed_cell_are_outward_unit_vectors() {
    let vertices = skewed_quad_vertices();
    let mesh = single_quad_mesh(vertices);
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();
    let centroid = vertices.iter().fold(Vector2::zeros(), |sum, v| sum + v.coords) / 4.0;

    for face in 0..4 {
        fe_face_values
            .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
            .unwrap();
        let edge = vertices[(face + 1) % 4] - vertices[face];
        for q in 0..fe_face_values.n_quadrature_points() {
            let normal = fe_face_values.normal_vector(q);
            assert_scalar_eq!(normal.norm(), 1.0, comp = abs, tol = 1e-14);
            assert_scalar_eq!(normal.dot(&edge), 0.0, comp = abs, tol = 1e-13);
            let x = fe_face_values.quadrature_point(q);
            assert!(normal.dot(&(x.coords - centroid)) > 0.0);
        }
    }
}

#[test]
fn normals_of_clockwise_cell_are_outward() {
    let mut vertices = unit_square_vertices();
    vertices.swap(1, 3);
    let mesh = single_quad_mesh(vertices);
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();
    let centroid = Vector2::new(0.5, 0.5);

    for face in 0..4 {
        fe_face_values
            .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
            .unwrap();
        for q in 0..2 {
            let x = fe_face_values.quadrature_point(q);
            assert!(fe_face_values.normal_vector(q).dot(&(x.coords - centroid)) > 0.0);
        }
    }
}

#[test]
fn normals_alone_trigger_geometry_computation() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), UpdateFlags::NORMAL_VECTORS).unwrap();
    fe_face_values
        .reinit(&cell, 1, &BilinearQuad, &StraightBoundary)
        .unwrap();
    assert_matrix_eq!(*fe_face_values.normal_vector(0), Vector2::new(1.0, 0.0), comp = abs, tol = 1e-14);
}

#[test]
fn shape_values_depend_on_selected_face() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let cell = mesh.cell(0).unwrap();
    let quadrature = gauss_1d(2);
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &quadrature, UpdateFlags::VALUES).unwrap();

    // Face f connects vertex f and vertex (f + 1) % 4, so only their shape functions are non-zero
    for face in 0..4 {
        fe_face_values
            .reinit(&cell, face, &BilinearQuad, &StraightBoundary)
            .unwrap();
        for q in 0..2 {
            for dof in 0..4 {
                let on_face = dof == face || dof == (face + 1) % 4;
                if !on_face {
                    assert_eq!(fe_face_values.shape_value(dof, q), 0.0);
                }
            }
            let xi = &fe_face_values.cell_reference_quadrature_points(face)[q];
            assert_eq!(fe_face_values.shape_value(face, q), BilinearQuad.shape_value(face, xi));
        }
    }
}

#[test]
fn face_gradients_and_ansatz_points_on_scaled_square() {
    let vertices = square_vertices(Vector2::zeros(), 2.0);
    let mesh = single_quad_mesh(vertices);
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();
    fe_face_values
        .reinit(&cell, 2, &BilinearQuad, &StraightBoundary)
        .unwrap();

    assert_eq!(fe_face_values.ansatz_points(), &vertices);
    for q in 0..2 {
        assert_scalar_eq!(fe_face_values.quadrature_point(q).y, 2.0, comp = abs, tol = 1e-14);
        for dof in 0..4 {
            let expected = fe_face_values.reference_shape_gradients()[(dof, q)] / 2.0;
            assert_matrix_eq!(*fe_face_values.shape_gradient(dof, q), expected, comp = abs, tol = 1e-14);
        }
    }
}

#[test]
fn curved_boundary_faces_follow_the_boundary() {
    let radius = 2.0_f64.sqrt();
    let mesh = single_quad_mesh(square_vertices(Vector2::new(-1.0, -1.0), 2.0));
    let cell = mesh.cell(0).unwrap();
    let boundary = HyperBallBoundary::new(Point2::origin(), radius);
    let quadrature = gauss_1d(8);
    let mut fe_face_values = FeFaceValues::new(&BiquadraticQuad, &quadrature, all_face_flags()).unwrap();

    // On each face, x(xi) traces a parabola through two corners and the projected midpoint, with
    // arc length int_0^1 sqrt(4 + (4 (r - 1) (1 - 2 xi))^2) dxi
    let reference_length = gauss_1d::<f64>(20).integrate(|xi| {
        let slope = 4.0 * (radius - 1.0) * (1.0 - 2.0 * xi.x);
        (4.0 + slope * slope).sqrt()
    });

    for face in 0..4 {
        fe_face_values
            .reinit(&cell, face, &BiquadraticQuad, &boundary)
            .unwrap();
        let length: f64 = fe_face_values.jxw_values().iter().sum();
        assert_scalar_eq!(length, reference_length, comp = abs, tol = 1e-8);
        assert!(length > 2.0);

        for q in 0..fe_face_values.n_quadrature_points() {
            let x = fe_face_values.quadrature_point(q);
            let n = fe_face_values.normal_vector(q);
            // The outward normal points away from the centre of the ball
            assert!(n.dot(&x.coords) > 0.0);
            assert!(x.coords.norm() <= radius + 1e-12);
        }
    }
}

#[test]
fn straight_biquadratic_faces_match_bilinear_faces() {
    let mesh = single_quad_mesh(skewed_quad_vertices());
    let cell = mesh.cell(0).unwrap();
    let quadrature = gauss_1d(3);
    let mut q1 = FeFaceValues::new(&BilinearQuad, &quadrature, all_face_flags()).unwrap();
    let mut q2 = FeFaceValues::new(&BiquadraticQuad, &quadrature, all_face_flags()).unwrap();

    for face in 0..4 {
        q1.reinit(&cell, face, &BilinearQuad, &StraightBoundary).unwrap();
        q2.reinit(&cell, face, &BiquadraticQuad, &StraightBoundary).unwrap();
        for q in 0..3 {
            assert_scalar_eq!(q1.jxw(q), q2.jxw(q), comp = abs, tol = 1e-13);
            assert_matrix_eq!(*q1.normal_vector(q), *q2.normal_vector(q), comp = abs, tol = 1e-13);
            assert_matrix_eq!(
                q1.quadrature_point(q).coords,
                q2.quadrature_point(q).coords,
                comp = abs,
                tol = 1e-13
            );
        }
    }
}

#[test]
fn segment_faces_are_end_points() {
    let mesh = create_uniform_interval_mesh(1.0, 3.0, 1);
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&LinearSegment, &vertex::<f64>(), all_face_flags()).unwrap();
    assert_eq!(fe_face_values.num_faces(), 2);

    for (face, x, normal) in [(0, 1.0, -1.0), (1, 3.0, 1.0)] {
        fe_face_values
            .reinit(&cell, face, &LinearSegment, &StraightBoundary)
            .unwrap();
        assert_eq!(fe_face_values.n_quadrature_points(), 1);
        assert_scalar_eq!(fe_face_values.quadrature_point(0).x, x, comp = abs, tol = 1e-14);
        assert_eq!(fe_face_values.normal_vector(0), &Vector1::new(normal));
        assert_eq!(fe_face_values.jxw(0), 1.0);
        assert_scalar_eq!(fe_face_values.shape_gradient(1, 0).x, 0.5, comp = abs, tol = 1e-14);
    }
}

#[test]
fn reinit_rejects_invalid_face() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let cell = mesh.cell(0).unwrap();
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();
    fe_face_values
        .reinit(&cell, 0, &BilinearQuad, &StraightBoundary)
        .unwrap();

    let error = fe_face_values
        .reinit(&cell, 4, &BilinearQuad, &StraightBoundary)
        .unwrap_err();
    assert_eq!(error, FeValuesError::InvalidIndex { index: 4, bound: 4 });
    assert!(!fe_face_values.is_reinitialized());
    assert_eq!(fe_face_values.selected_face(), None);
}

#[test]
fn reinit_without_jacobians_fails_for_jxw() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let cell = mesh.cell(0).unwrap();
    let flags = UpdateFlags::JXW_VALUES | UpdateFlags::NORMAL_VECTORS;
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), flags).unwrap();
    let error = fe_face_values
        .reinit(&cell, 0, &BilinearQuad, &StraightBoundary)
        .unwrap_err();
    assert_eq!(error, FeValuesError::CannotInitializeField { field: "JxW values" });
}

/// A constant basis on the four-dimensional unit cube, for which no face embedding exists.
struct ConstantBasis4d;

impl ReferenceBasis<f64> for ConstantBasis4d {
    type ReferenceDim = U4;

    fn dof_count(&self) -> usize {
        1
    }

    fn shape_value(&self, _dof: usize, _xi: &Point4<f64>) -> f64 {
        1.0
    }

    fn shape_gradient(&self, _dof: usize, _xi: &Point4<f64>) -> Vector4<f64> {
        Vector4::zeros()
    }
}

#[test]
fn construction_fails_for_unsupported_dimension() {
    let error = FeFaceValues::new(&ConstantBasis4d, &gauss_3d::<f64>(1), UpdateFlags::VALUES).unwrap_err();
    assert_eq!(error, FeValuesError::UnsupportedGeometry { dim: 4 });
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "physical data is not available before a successful call to reinit")]
fn face_shape_values_require_reinit() {
    let fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d::<f64>(2), UpdateFlags::VALUES).unwrap();
    fe_face_values.shape_value(0, 0);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `normal vectors`")]
fn normal_vector_requires_normal_vectors_flag() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let flags = UpdateFlags::JACOBIANS | UpdateFlags::JXW_VALUES;
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), flags).unwrap();
    fe_face_values
        .reinit(&mesh.cell(0).unwrap(), 0, &BilinearQuad, &StraightBoundary)
        .unwrap();
    fe_face_values.normal_vector(0);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `face Jacobian determinants`")]
fn face_jacobian_determinant_requires_jxw_flag() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), UpdateFlags::JACOBIANS).unwrap();
    fe_face_values
        .reinit(&mesh.cell(0).unwrap(), 0, &BilinearQuad, &StraightBoundary)
        .unwrap();
    fe_face_values.face_jacobian_determinant(0);
}

#[test]
#[should_panic(expected = "the index 2 is out of range, it should be less than 2")]
fn face_quadrature_point_index_is_checked() {
    let mesh = single_quad_mesh(unit_square_vertices());
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), all_face_flags()).unwrap();
    fe_face_values
        .reinit(&mesh.cell(0).unwrap(), 0, &BilinearQuad, &StraightBoundary)
        .unwrap();
    fe_face_values.jxw(2);
}

/// Face values on the bottom face of the unit square, with two quadrature points.
fn reinitialized_face_values(flags: UpdateFlags) -> FeFaceValues<f64, U2> {
    let mesh = single_quad_mesh(unit_square_vertices());
    let mut fe_face_values = FeFaceValues::new(&BilinearQuad, &gauss_1d(2), flags).unwrap();
    fe_face_values
        .reinit(&mesh.cell(0).unwrap(), 0, &BilinearQuad, &StraightBoundary)
        .unwrap();
    fe_face_values
}

#[test]
#[should_panic(expected = "the index 4 is out of range, it should be less than 4")]
fn face_shape_value_dof_index_is_checked() {
    let fe_face_values = reinitialized_face_values(all_face_flags());
    fe_face_values.shape_value(4, 0);
}

#[test]
#[should_panic(expected = "the index 2 is out of range, it should be less than 2")]
fn face_shape_value_point_index_is_checked() {
    let fe_face_values = reinitialized_face_values(all_face_flags());
    fe_face_values.shape_value(0, 2);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `shape values`")]
fn face_shape_value_requires_values_flag() {
    let fe_face_values = reinitialized_face_values(UpdateFlags::JACOBIANS | UpdateFlags::GRADIENTS);
    fe_face_values.shape_value(0, 0);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `shape gradients`")]
fn face_shape_gradient_requires_gradients_flag() {
    let fe_face_values = reinitialized_face_values(UpdateFlags::VALUES | UpdateFlags::JACOBIANS);
    fe_face_values.shape_gradient(0, 0);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `quadrature points`")]
fn face_quadrature_point_requires_quadrature_points_flag() {
    let fe_face_values = reinitialized_face_values(UpdateFlags::ANSATZ_POINTS);
    fe_face_values.quadrature_point(0);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `ansatz points`")]
fn face_ansatz_point_requires_ansatz_points_flag() {
    let fe_face_values = reinitialized_face_values(UpdateFlags::QUADRATURE_POINTS);
    fe_face_values.ansatz_point(0);
}

#[test]
#[cfg_attr(feature = "unchecked-field-access", ignore)]
#[should_panic(expected = "access to uninitialized field `JxW values`")]
fn face_jxw_requires_jxw_flag() {
    let fe_face_values = reinitialized_face_values(UpdateFlags::JACOBIANS | UpdateFlags::NORMAL_VECTORS);
    fe_face_values.jxw(0);
}
