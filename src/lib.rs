//! Finite element evaluation caches.
//!
//! The central types are [`FeValues`](fe_values::FeValues), which caches shape function data on
//! the reference cell for a given quadrature rule and maps it to a physical cell on every call
//! to `reinit`, and [`FeFaceValues`](fe_values::FeFaceValues), which does the same for the faces
//! of a cell.
//!
//! Which physical quantities are computed is decided once, at construction, by
//! [`UpdateFlags`](fe_values::UpdateFlags). Accessing a quantity that was not requested is a
//! programming error and panics, unless the crate is built with the `unchecked-field-access`
//! feature, in which case the flag and state checks in the accessors are skipped. Index checks
//! are always performed.
use nalgebra::{DimMin, DimName, DimNameDiff, DimNameSub, RealField, U1};

pub mod allocators;
pub mod assembly;
pub mod boundary;
pub mod connectivity;
pub mod element;
pub mod error;
pub mod fe_values;
pub mod mesh;
pub mod quadrature;

#[cfg(feature = "proptest-support")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::FeValuesError;

/// Real scalar types supported by `fevalues`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// A small, fixed-size dimension of a reference cell.
///
/// Used as a trait alias for the traits needed by generic `fevalues` routines. Every such
/// dimension has an associated face dimension, see [`FaceDim`].
pub trait SmallDim: DimName + DimMin<Self, Output = Self> + DimNameSub<U1> {}

impl<D> SmallDim for D where D: DimName + DimMin<Self, Output = Self> + DimNameSub<U1> {}

/// The dimension of the faces of a `D`-dimensional reference cell.
pub type FaceDim<D> = DimNameDiff<D, U1>;
