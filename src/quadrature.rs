//! Quadrature rules on the unit reference domains.
//!
//! Rules are represented by the [`Quadrature`] trait. The simplest implementor is a
//! [`QuadraturePair`] of weights and points, which is what the rule constructors in this module
//! return. All rules are defined on `[0, 1]^d`, and their weights sum to the volume of the unit
//! domain, i.e. one.
use nalgebra::allocator::Allocator;
use nalgebra::{convert, DefaultAllocator, DimName, OPoint, Point1, Point2, Point3, Scalar, U0, U1, U2, U3};
use num::Zero;
use std::ops::{AddAssign, Mul};

use crate::error::FeValuesError;
use crate::Real;

/// Errors returned by the raw rule constructors.
pub use fevalues_quadrature::Error as QuadratureError;

pub type QuadraturePair<T, D> = (Vec<T>, Vec<OPoint<T, D>>);
pub type QuadraturePair0d<T> = QuadraturePair<T, U0>;
pub type QuadraturePair1d<T> = QuadraturePair<T, U1>;
pub type QuadraturePair2d<T> = QuadraturePair<T, U2>;
pub type QuadraturePair3d<T> = QuadraturePair<T, U3>;

/// A quadrature rule consisting of weights and points on a reference domain.
pub trait Quadrature<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn weights(&self) -> &[T];
    fn points(&self) -> &[OPoint<T, D>];

    fn num_points(&self) -> usize {
        self.points().len()
    }

    /// Approximates the integral of the given function using this quadrature rule.
    fn integrate<U, Function>(&self, f: Function) -> U
    where
        Function: Fn(&OPoint<T, D>) -> U,
        U: Zero + Mul<T, Output = U> + AddAssign<U>,
    {
        let mut integral = U::zero();
        for (w, p) in self.weights().iter().zip(self.points()) {
            integral += f(p) * w.clone();
        }
        integral
    }
}

impl<T, D, A, B> Quadrature<T, D> for (A, B)
where
    T: Scalar,
    D: DimName,
    A: AsRef<[T]>,
    B: AsRef<[OPoint<T, D>]>,
    DefaultAllocator: Allocator<T, D>,
{
    fn weights(&self) -> &[T] {
        self.0.as_ref()
    }

    fn points(&self) -> &[OPoint<T, D>] {
        self.1.as_ref()
    }
}

impl<T, D, X> Quadrature<T, D> for &X
where
    T: Scalar,
    D: DimName,
    X: ?Sized + Quadrature<T, D>,
    DefaultAllocator: Allocator<T, D>,
{
    fn weights(&self) -> &[T] {
        X::weights(self)
    }

    fn points(&self) -> &[OPoint<T, D>] {
        X::points(self)
    }
}

/// Checks that a rule is non-empty and has as many weights as points.
pub(crate) fn validate_quadrature<T, D, Q>(quadrature: &Q) -> Result<(), FeValuesError>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
    Q: ?Sized + Quadrature<T, D>,
{
    let (weights, points) = (quadrature.weights().len(), quadrature.points().len());
    if weights != points {
        Err(FeValuesError::InconsistentQuadrature { weights, points })
    } else if points == 0 {
        Err(FeValuesError::EmptyQuadrature)
    } else {
        Ok(())
    }
}

fn convert_rule_1d<T: Real>((weights, points): fevalues_quadrature::Rule1d) -> QuadraturePair1d<T> {
    let weights = weights.into_iter().map(convert).collect();
    let points = points.into_iter().map(|p| Point1::from(p).map(convert)).collect();
    (weights, points)
}

fn convert_rule_2d<T: Real>((weights, points): fevalues_quadrature::Rule2d) -> QuadraturePair2d<T> {
    let weights = weights.into_iter().map(convert).collect();
    let points = points.into_iter().map(|p| Point2::from(p).map(convert)).collect();
    (weights, points)
}

fn convert_rule_3d<T: Real>((weights, points): fevalues_quadrature::Rule3d) -> QuadraturePair3d<T> {
    let weights = weights.into_iter().map(convert).collect();
    let points = points.into_iter().map(|p| Point3::from(p).map(convert)).collect();
    (weights, points)
}

/// The trivial rule on the zero-dimensional reference domain (a single vertex).
///
/// This is the face rule for one-dimensional cells.
pub fn vertex<T: Real>() -> QuadraturePair0d<T> {
    (vec![T::one()], vec![OPoint::origin()])
}

/// Gauss rule with `n` points on the unit interval `[0, 1]`.
pub fn try_gauss_1d<T: Real>(n: usize) -> Result<QuadraturePair1d<T>, QuadratureError> {
    fevalues_quadrature::univariate::try_gauss(n).map(convert_rule_1d)
}

/// Tensor-product Gauss rule with `n` points per dimension on the unit square.
pub fn try_gauss_2d<T: Real>(n: usize) -> Result<QuadraturePair2d<T>, QuadratureError> {
    fevalues_quadrature::tensor::try_square_gauss(n).map(convert_rule_2d)
}

/// Tensor-product Gauss rule with `n` points per dimension on the unit cube.
pub fn try_gauss_3d<T: Real>(n: usize) -> Result<QuadraturePair3d<T>, QuadratureError> {
    fevalues_quadrature::tensor::try_cube_gauss(n).map(convert_rule_3d)
}

/// See [`try_gauss_1d`].
///
/// # Panics
///
/// Panics if `n == 0`.
pub fn gauss_1d<T: Real>(n: usize) -> QuadraturePair1d<T> {
    convert_rule_1d(fevalues_quadrature::univariate::gauss(n))
}

/// See [`try_gauss_2d`].
///
/// # Panics
///
/// Panics if `n == 0`.
pub fn gauss_2d<T: Real>(n: usize) -> QuadraturePair2d<T> {
    convert_rule_2d(fevalues_quadrature::tensor::square_gauss(n))
}

/// See [`try_gauss_3d`].
///
/// # Panics
///
/// Panics if `n == 0`.
pub fn gauss_3d<T: Real>(n: usize) -> QuadraturePair3d<T> {
    convert_rule_3d(fevalues_quadrature::tensor::cube_gauss(n))
}
