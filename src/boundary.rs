//! Descriptions of the domain boundary, used to place new nodes on curved boundary faces.
use nalgebra::allocator::Allocator;
use nalgebra::{convert, DefaultAllocator, DimName, OPoint, OVector, Scalar};
use serde::{Deserialize, Serialize};

use crate::Real;

/// A description of the boundary of a domain.
pub trait Boundary<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// Returns a point on the boundary between the two given boundary points.
    fn new_point_on_line(&self, start: &OPoint<T, D>, end: &OPoint<T, D>) -> OPoint<T, D>;
}

fn midpoint<T, D>(start: &OPoint<T, D>, end: &OPoint<T, D>) -> OPoint<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    OPoint::from((&start.coords + &end.coords) * convert::<f64, T>(0.5))
}

/// A boundary made up of straight faces, so that new points are placed at the midpoint.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StraightBoundary;

impl<T, D> Boundary<T, D> for StraightBoundary
where
    T: Real,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn new_point_on_line(&self, start: &OPoint<T, D>, end: &OPoint<T, D>) -> OPoint<T, D> {
        midpoint(start, end)
    }
}

/// The boundary of a ball (a circle in two dimensions).
///
/// New points are obtained by projecting the midpoint of the straight line radially onto the
/// sphere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "OPoint<T, D>: Serialize, T: Serialize",
    deserialize = "OPoint<T, D>: Deserialize<'de>, T: Deserialize<'de>"
))]
pub struct HyperBallBoundary<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    center: OPoint<T, D>,
    radius: T,
}

impl<T, D> HyperBallBoundary<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn new(center: OPoint<T, D>, radius: T) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> &OPoint<T, D> {
        &self.center
    }

    pub fn radius(&self) -> T {
        self.radius.clone()
    }
}

impl<T, D> Boundary<T, D> for HyperBallBoundary<T, D>
where
    T: Real,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn new_point_on_line(&self, start: &OPoint<T, D>, end: &OPoint<T, D>) -> OPoint<T, D> {
        let straight = midpoint(start, end);
        let direction: OVector<T, D> = &straight.coords - &self.center.coords;
        let distance = direction.norm();
        if distance == T::zero() {
            // Every direction is equally valid, keep the straight midpoint
            straight
        } else {
            OPoint::from(&self.center.coords + direction * (self.radius / distance))
        }
    }
}
