use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// The set of physical quantities an evaluation cache computes on every `reinit`.
///
/// The flags are fixed at construction of a cache. Flags combine with `|`:
///
/// ```
/// use fevalues::fe_values::UpdateFlags;
/// let flags = UpdateFlags::VALUES | UpdateFlags::GRADIENTS | UpdateFlags::JACOBIANS;
/// assert!(flags.contains(UpdateFlags::GRADIENTS));
/// assert!(!flags.contains(UpdateFlags::JXW_VALUES));
/// ```
///
/// Gradients and `JxW` values are derived from the Jacobians, so requesting either of them
/// without [`UpdateFlags::JACOBIANS`] makes `reinit` fail.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UpdateFlags(u8);

impl UpdateFlags {
    /// Shape function values at the quadrature points.
    pub const VALUES: Self = Self(1 << 0);
    /// Shape function gradients in physical coordinates.
    pub const GRADIENTS: Self = Self(1 << 1);
    /// Quadrature points in physical coordinates.
    pub const QUADRATURE_POINTS: Self = Self(1 << 2);
    /// Support points of the shape functions in physical coordinates.
    pub const ANSATZ_POINTS: Self = Self(1 << 3);
    /// Jacobians `∂ξ/∂x` of the inverse cell mapping.
    pub const JACOBIANS: Self = Self(1 << 4);
    /// Quadrature weights times the Jacobian determinant.
    pub const JXW_VALUES: Self = Self(1 << 5);
    /// Outward unit normals (faces only).
    pub const NORMAL_VECTORS: Self = Self(1 << 6);

    const ALL_BITS: u8 = (1 << 7) - 1;

    const NAMES: [(Self, &'static str); 7] = [
        (Self::VALUES, "VALUES"),
        (Self::GRADIENTS, "GRADIENTS"),
        (Self::QUADRATURE_POINTS, "QUADRATURE_POINTS"),
        (Self::ANSATZ_POINTS, "ANSATZ_POINTS"),
        (Self::JACOBIANS, "JACOBIANS"),
        (Self::JXW_VALUES, "JXW_VALUES"),
        (Self::NORMAL_VECTORS, "NORMAL_VECTORS"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::ALL_BITS)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `None` if `bits` contains bits that do not correspond to a flag.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::ALL_BITS == 0 {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether all flags in `other` are also set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether at least one flag in `other` is also set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl BitOr for UpdateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for UpdateFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for UpdateFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for UpdateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UpdateFlags(")?;
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        write!(f, ")")
    }
}
