use nalgebra::{center, OPoint, Point2, Vector2, U2};
use numeric_literals::replace_float_literals;

use crate::boundary::Boundary;
use crate::element::{
    collect_vertices, fill_isoparametric_cell_data, map_reference_point, CellDataMut, CellMapping, FaceDataMut,
    FaceMapping, ReferenceBasis,
};
use crate::error::FeValuesError;
use crate::mesh::CellAccessor;
use crate::{FaceDim, Real};

/// Bilinear Lagrange basis on the unit square.
///
/// The nodes are the vertices of the square in counter-clockwise order, starting at the origin.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BilinearQuad;

/// Tensor indices of the nodes of [`BilinearQuad`] into the nodes `{0, 1}` of the linear basis.
const BILINEAR_NODES: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn linear_1d<T: Real>(node: usize, x: T) -> (T, T) {
    match node {
        0 => (1.0 - x, -1.0),
        _ => (x, 1.0),
    }
}

impl<T: Real> ReferenceBasis<T> for BilinearQuad {
    type ReferenceDim = U2;

    fn dof_count(&self) -> usize {
        4
    }

    fn shape_value(&self, dof: usize, xi: &Point2<T>) -> T {
        let (a, b) = BILINEAR_NODES[dof];
        linear_1d(a, xi.x).0 * linear_1d(b, xi.y).0
    }

    fn shape_gradient(&self, dof: usize, xi: &Point2<T>) -> Vector2<T> {
        let (a, b) = BILINEAR_NODES[dof];
        let (phi_a, dphi_a) = linear_1d(a, xi.x);
        let (phi_b, dphi_b) = linear_1d(b, xi.y);
        Vector2::new(dphi_a * phi_b, phi_a * dphi_b)
    }
}

impl<T: Real> CellMapping<T> for BilinearQuad {
    fn fill_cell_data<C, B>(
        &self,
        cell: &C,
        reference_points: &[Point2<T>],
        _boundary: &B,
        data: CellDataMut<T, U2>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, U2>,
        B: ?Sized + Boundary<T, U2>,
    {
        let vertices: [Point2<T>; 4] = collect_vertices(cell)?;
        fill_isoparametric_cell_data(self, &vertices, reference_points, data)
    }
}

impl<T: Real> FaceMapping<T> for BilinearQuad {
    fn fill_face_data<C, B>(
        &self,
        cell: &C,
        face: usize,
        _face_points: &[OPoint<T, FaceDim<U2>>],
        cell_points: &[Point2<T>],
        _boundary: &B,
        data: FaceDataMut<T, U2>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, U2>,
        B: ?Sized + Boundary<T, U2>,
    {
        let vertices: [Point2<T>; 4] = collect_vertices(cell)?;
        fill_quadrilateral_face_data(self, &vertices, face, cell_points, data)
    }
}

/// Biquadratic Lagrange basis on the unit square.
///
/// The nine nodes are ordered as the four vertices (as in [`BilinearQuad`]), followed by the
/// midpoints of faces `0` to `3` and finally the centre of the square.
///
/// The element is isoparametric: a face at the domain boundary is curved by placing its midpoint
/// node on the [`Boundary`] passed to the mapping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BiquadraticQuad;

/// Tensor indices of the nodes of [`BiquadraticQuad`] into the nodes `{0, 1/2, 1}` of the
/// quadratic basis.
const BIQUADRATIC_NODES: [(usize, usize); 9] = [
    (0, 0),
    (2, 0),
    (2, 2),
    (0, 2),
    (1, 0),
    (2, 1),
    (1, 2),
    (0, 1),
    (1, 1),
];

#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quadratic_1d<T: Real>(node: usize, x: T) -> (T, T) {
    match node {
        0 => ((1.0 - x) * (1.0 - 2.0 * x), 4.0 * x - 3.0),
        1 => (4.0 * x * (1.0 - x), 4.0 - 8.0 * x),
        _ => (x * (2.0 * x - 1.0), 4.0 * x - 1.0),
    }
}

impl<T: Real> ReferenceBasis<T> for BiquadraticQuad {
    type ReferenceDim = U2;

    fn dof_count(&self) -> usize {
        9
    }

    fn shape_value(&self, dof: usize, xi: &Point2<T>) -> T {
        let (a, b) = BIQUADRATIC_NODES[dof];
        quadratic_1d(a, xi.x).0 * quadratic_1d(b, xi.y).0
    }

    fn shape_gradient(&self, dof: usize, xi: &Point2<T>) -> Vector2<T> {
        let (a, b) = BIQUADRATIC_NODES[dof];
        let (phi_a, dphi_a) = quadratic_1d(a, xi.x);
        let (phi_b, dphi_b) = quadratic_1d(b, xi.y);
        Vector2::new(dphi_a * phi_b, phi_a * dphi_b)
    }
}

impl BiquadraticQuad {
    /// Computes the nine mapping nodes of a quadrilateral cell.
    ///
    /// Midpoints of faces at the boundary are placed by `boundary`, all others lie halfway
    /// between the face vertices.
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    pub fn mapping_nodes<T, C, B>(cell: &C, boundary: &B) -> Result<[Point2<T>; 9], FeValuesError>
    where
        T: Real,
        C: ?Sized + CellAccessor<T, U2>,
        B: ?Sized + Boundary<T, U2>,
    {
        let vertices: [Point2<T>; 4] = collect_vertices(cell)?;
        let mut nodes = [Point2::origin(); 9];
        nodes[..4].copy_from_slice(&vertices);
        for face in 0..4 {
            let (a, b) = (&vertices[face], &vertices[(face + 1) % 4]);
            nodes[4 + face] = if cell.face_at_boundary(face) {
                boundary.new_point_on_line(a, b)
            } else {
                center(a, b)
            };
        }

        // Coincides with the image of the centre under the bilinear map if all faces are straight
        let midpoint_sum = nodes[4..8].iter().fold(Vector2::zeros(), |sum, p| sum + p.coords);
        let vertex_sum = vertices.iter().fold(Vector2::zeros(), |sum, p| sum + p.coords);
        nodes[8] = OPoint::from(midpoint_sum * 0.5 - vertex_sum * 0.25);
        Ok(nodes)
    }
}

impl<T: Real> CellMapping<T> for BiquadraticQuad {
    fn fill_cell_data<C, B>(
        &self,
        cell: &C,
        reference_points: &[Point2<T>],
        boundary: &B,
        data: CellDataMut<T, U2>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, U2>,
        B: ?Sized + Boundary<T, U2>,
    {
        let nodes = Self::mapping_nodes(cell, boundary)?;
        fill_isoparametric_cell_data(self, &nodes, reference_points, data)
    }
}

impl<T: Real> FaceMapping<T> for BiquadraticQuad {
    fn fill_face_data<C, B>(
        &self,
        cell: &C,
        face: usize,
        _face_points: &[OPoint<T, FaceDim<U2>>],
        cell_points: &[Point2<T>],
        boundary: &B,
        data: FaceDataMut<T, U2>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, U2>,
        B: ?Sized + Boundary<T, U2>,
    {
        let nodes = Self::mapping_nodes(cell, boundary)?;
        fill_quadrilateral_face_data(self, &nodes, face, cell_points, data)
    }
}

#[allow(non_snake_case)]
fn fill_quadrilateral_face_data<T, E>(
    element: &E,
    nodes: &[Point2<T>],
    face: usize,
    cell_points: &[Point2<T>],
    data: FaceDataMut<T, U2>,
) -> Result<(), FeValuesError>
where
    T: Real,
    E: ?Sized + ReferenceBasis<T, ReferenceDim = U2>,
{
    let FaceDataMut {
        mut jacobians,
        ansatz_points,
        mut quadrature_points,
        mut face_jacobian_determinants,
        mut normals,
    } = data;

    if let Some(ansatz_points) = ansatz_points {
        ansatz_points.clone_from_slice(nodes);
    }

    // Faces 0 and 2 run along the first reference axis, faces 1 and 3 along the second
    let tangent_axis = face % 2;
    for (q, xi) in cell_points.iter().enumerate() {
        let (x, F) = map_reference_point(element, nodes, xi);
        if let Some(quadrature_points) = quadrature_points.as_deref_mut() {
            quadrature_points[q] = x;
        }
        if let Some(jacobians) = jacobians.as_deref_mut() {
            jacobians[q] = F
                .try_inverse()
                .ok_or(FeValuesError::SingularJacobian { point: q })?;
        }

        let tangent: Vector2<T> = F.column(tangent_axis).into_owned();
        let length = tangent.norm();
        if let Some(determinants) = face_jacobian_determinants.as_deref_mut() {
            determinants[q] = length;
        }
        if let Some(normals) = normals.as_deref_mut() {
            if length == T::zero() {
                return Err(FeValuesError::SingularJacobian { point: q });
            }
            // Clockwise rotation of the tangent points outwards on faces 0 and 1 of a
            // counter-clockwise cell, counter-clockwise rotation on faces 2 and 3
            let rotated = if face < 2 {
                Vector2::new(tangent.y, -tangent.x)
            } else {
                Vector2::new(-tangent.y, tangent.x)
            };
            normals[q] = rotated * (F.determinant().signum() / length);
        }
    }
    Ok(())
}
