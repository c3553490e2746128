use std::ops::{Index, IndexMut};

/// A dense table with one entry per (degree of freedom, quadrature point) pair.
///
/// Entries are stored dof-major: all quadrature points of dof `0`, then dof `1`, and so on, so
/// that [`DofPointTable::dof_row`] is a contiguous slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofPointTable<X> {
    entries: Vec<X>,
    num_dofs: usize,
    num_points: usize,
}

impl<X: Clone> DofPointTable<X> {
    pub fn from_element(num_dofs: usize, num_points: usize, element: X) -> Self {
        Self {
            entries: vec![element; num_dofs * num_points],
            num_dofs,
            num_points,
        }
    }
}

impl<X> DofPointTable<X> {
    /// Builds a table by evaluating `f(dof, point)` for every entry.
    pub fn from_fn(num_dofs: usize, num_points: usize, mut f: impl FnMut(usize, usize) -> X) -> Self {
        let mut entries = Vec::with_capacity(num_dofs * num_points);
        for i in 0..num_dofs {
            for j in 0..num_points {
                entries.push(f(i, j));
            }
        }
        Self {
            entries,
            num_dofs,
            num_points,
        }
    }

    /// An empty table with the given nominal shape, used for tables that are never filled.
    pub(crate) fn unallocated(num_dofs: usize, num_points: usize) -> Self {
        Self {
            entries: Vec::new(),
            num_dofs,
            num_points,
        }
    }

    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn get(&self, dof: usize, point: usize) -> Option<&X> {
        if dof < self.num_dofs && point < self.num_points {
            self.entries.get(dof * self.num_points + point)
        } else {
            None
        }
    }

    /// The entries of all quadrature points for the given dof.
    ///
    /// # Panics
    ///
    /// Panics if `dof` is out of bounds.
    pub fn dof_row(&self, dof: usize) -> &[X] {
        assert!(dof < self.num_dofs, "dof index out of bounds");
        &self.entries[dof * self.num_points..(dof + 1) * self.num_points]
    }

    pub fn as_slice(&self) -> &[X] {
        &self.entries
    }
}

impl<X> Index<(usize, usize)> for DofPointTable<X> {
    type Output = X;

    fn index(&self, (dof, point): (usize, usize)) -> &X {
        assert!(dof < self.num_dofs && point < self.num_points, "table index out of bounds");
        &self.entries[dof * self.num_points + point]
    }
}

impl<X> IndexMut<(usize, usize)> for DofPointTable<X> {
    fn index_mut(&mut self, (dof, point): (usize, usize)) -> &mut X {
        assert!(dof < self.num_dofs && point < self.num_points, "table index out of bounds");
        &mut self.entries[dof * self.num_points + point]
    }
}
