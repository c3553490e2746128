//! Quadrature rules for the one-dimensional unit interval `[0, 1]`.

use crate::{Error, Rule};
use std::f64::consts::PI;

/// Legendre polynomial `p_n` and its predecessor `p_{n-1}` at a point in `(-1, 1)`.
#[derive(Debug, Clone, Copy)]
struct Legendre {
    n: usize,
    x: f64,
    p_n: f64,
    p_prev: f64,
}

impl Legendre {
    fn at(n: usize, x: f64) -> Self {
        // m P_m(x) = (2m - 1) x P_{m - 1}(x) - (m - 1) P_{m - 2}(x)
        let mut p_n = 1.0;
        let mut p_prev = 0.0;
        for m in 1..=n {
            let m = m as f64;
            let p_prev_prev = p_prev;
            p_prev = p_n;
            p_n = ((2.0 * m - 1.0) * x * p_prev - (m - 1.0) * p_prev_prev) / m;
        }
        Self { n, x, p_n, p_prev }
    }

    /// Derivative of `p_n`. Undefined at `|x| == 1`.
    fn derivative(&self) -> f64 {
        let n = self.n as f64;
        n * (self.x * self.p_n - self.p_prev) / (self.x * self.x - 1.0)
    }
}

/// Gauss-Legendre nodes and weights on `[-1, 1]`, in no particular order.
fn symmetric_gauss_legendre(n: usize) -> Vec<(f64, f64)> {
    let half = (n + 1) / 2;
    let mut pairs = Vec::with_capacity(n);

    for i in 0..half {
        // Chebyshev-like initial guess, refined with Newton's method
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut legendre = Legendre::at(n, x);
        for _ in 0..100 {
            let dx = -legendre.p_n / legendre.derivative();
            x += dx;
            legendre = Legendre::at(n, x);
            if dx.abs() <= 1e-15 {
                break;
            }
        }
        let dp = legendre.derivative();
        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        pairs.push((x, w));
    }

    // The remaining nodes mirror the ones already found
    for i in half..n {
        let (x, w) = pairs[n - i - 1];
        pairs.push((-x, w));
    }
    pairs
}

/// Gauss quadrature for the unit interval `[0, 1]`.
///
/// Returns the Gauss-Legendre rule with the given number of points, sorted by increasing
/// coordinate. A rule with `n` points integrates polynomials of degree up to `2n - 1` exactly.
/// The weights sum to one.
pub fn try_gauss(num_points: usize) -> Result<Rule<1>, Error> {
    if num_points == 0 {
        return Err(Error::NoPointsRequested);
    }

    let mut pairs = symmetric_gauss_legendre(num_points);
    pairs.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    let (points, weights) = pairs
        .into_iter()
        .map(|(x, w)| ([0.5 * (x + 1.0)], 0.5 * w))
        .unzip();
    Ok((weights, points))
}

/// Gauss quadrature for the unit interval `[0, 1]`.
///
/// See [`try_gauss`].
///
/// # Panics
///
/// Panics if zero points are requested.
pub fn gauss(num_points: usize) -> Rule<1> {
    try_gauss(num_points).unwrap_or_else(|err| panic!("{err}"))
}
