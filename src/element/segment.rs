use nalgebra::{OPoint, Point1, Vector1, U1};
use numeric_literals::replace_float_literals;

use crate::boundary::Boundary;
use crate::element::{
    collect_vertices, fill_isoparametric_cell_data, map_reference_point, CellDataMut, CellMapping, FaceDataMut,
    FaceMapping, ReferenceBasis,
};
use crate::error::FeValuesError;
use crate::mesh::CellAccessor;
use crate::{FaceDim, Real};

/// Linear Lagrange basis on the unit interval, with nodes at `0` and `1`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LinearSegment;

impl<T: Real> ReferenceBasis<T> for LinearSegment {
    type ReferenceDim = U1;

    fn dof_count(&self) -> usize {
        2
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn shape_value(&self, dof: usize, xi: &Point1<T>) -> T {
        match dof {
            0 => 1.0 - xi.x,
            1 => xi.x,
            _ => panic!("dof index {dof} out of bounds for linear segment"),
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn shape_gradient(&self, dof: usize, _xi: &Point1<T>) -> Vector1<T> {
        match dof {
            0 => Vector1::new(-1.0),
            1 => Vector1::new(1.0),
            _ => panic!("dof index {dof} out of bounds for linear segment"),
        }
    }
}

impl<T: Real> CellMapping<T> for LinearSegment {
    fn fill_cell_data<C, B>(
        &self,
        cell: &C,
        reference_points: &[Point1<T>],
        _boundary: &B,
        data: CellDataMut<T, U1>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, U1>,
        B: ?Sized + Boundary<T, U1>,
    {
        let vertices: [Point1<T>; 2] = collect_vertices(cell)?;
        fill_isoparametric_cell_data(self, &vertices, reference_points, data)
    }
}

impl<T: Real> FaceMapping<T> for LinearSegment {
    /// The faces of a segment are its end points, whose measure is one by convention.
    fn fill_face_data<C, B>(
        &self,
        cell: &C,
        face: usize,
        _face_points: &[OPoint<T, FaceDim<U1>>],
        cell_points: &[Point1<T>],
        _boundary: &B,
        data: FaceDataMut<T, U1>,
    ) -> Result<(), FeValuesError>
    where
        C: ?Sized + CellAccessor<T, U1>,
        B: ?Sized + Boundary<T, U1>,
    {
        let vertices: [Point1<T>; 2] = collect_vertices(cell)?;
        let FaceDataMut {
            jacobians,
            ansatz_points,
            quadrature_points,
            face_jacobian_determinants,
            normals,
        } = data;

        let cell_data = CellDataMut {
            jacobians,
            ansatz_points,
            quadrature_points,
        };
        fill_isoparametric_cell_data(self, &vertices, cell_points, cell_data)?;

        if let Some(determinants) = face_jacobian_determinants {
            determinants.fill(T::one());
        }
        if let Some(normals) = normals {
            let reference_normal = if face == 0 { -T::one() } else { T::one() };
            for (normal, xi) in normals.iter_mut().zip(cell_points) {
                let (_, forward_jacobian) = map_reference_point(self, &vertices, xi);
                *normal = Vector1::new(reference_normal * forward_jacobian[(0, 0)].signum());
            }
        }
        Ok(())
    }
}
