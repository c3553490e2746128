//! Rules on the unit square and unit cube formed as tensor products of 1D Gauss rules.

use crate::univariate::try_gauss;
use crate::{Error, Rule};

/// A Gauss rule on the unit square `[0, 1]^2` with `n` points per dimension.
///
/// Points are ordered with the first coordinate varying slowest.
pub fn try_square_gauss(points_per_dim: usize) -> Result<Rule<2>, Error> {
    let (weights_1d, points_1d) = try_gauss(points_per_dim)?;
    let n = points_per_dim;
    let mut weights = Vec::with_capacity(n * n);
    let mut points = Vec::with_capacity(n * n);

    for (&wx, &[x]) in weights_1d.iter().zip(&points_1d) {
        for (&wy, &[y]) in weights_1d.iter().zip(&points_1d) {
            weights.push(wx * wy);
            points.push([x, y]);
        }
    }
    Ok((weights, points))
}

/// A Gauss rule on the unit cube `[0, 1]^3` with `n` points per dimension.
pub fn try_cube_gauss(points_per_dim: usize) -> Result<Rule<3>, Error> {
    let (weights_1d, points_1d) = try_gauss(points_per_dim)?;
    let n = points_per_dim;
    let mut weights = Vec::with_capacity(n * n * n);
    let mut points = Vec::with_capacity(n * n * n);

    let rule_1d = || weights_1d.iter().zip(&points_1d);
    for (&wx, &[x]) in rule_1d() {
        for (&wy, &[y]) in rule_1d() {
            for (&wz, &[z]) in rule_1d() {
                weights.push(wx * wy * wz);
                points.push([x, y, z]);
            }
        }
    }
    Ok((weights, points))
}

/// See [`try_square_gauss`].
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn square_gauss(points_per_dim: usize) -> Rule<2> {
    try_square_gauss(points_per_dim).unwrap_or_else(|err| panic!("{err}"))
}

/// See [`try_cube_gauss`].
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn cube_gauss(points_per_dim: usize) -> Rule<3> {
    try_cube_gauss(points_per_dim).unwrap_or_else(|err| panic!("{err}"))
}
