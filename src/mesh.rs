//! Conforming meshes and access to their cells.
use crate::connectivity::{Connectivity, QuadConnectivity, SegmentConnectivity};
use crate::FeValuesError;
use nalgebra::allocator::Allocator;
use nalgebra::{DefaultAllocator, DimName, OPoint, Scalar, U1, U2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub mod procedural;

/// Geometric and topological information about a single cell, as needed by the evaluation caches.
pub trait CellAccessor<T, D>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    /// The index of the cell in its mesh.
    fn index(&self) -> usize;

    fn num_vertices(&self) -> usize;

    /// Returns the physical location of the vertex with the given local index.
    ///
    /// # Panics
    ///
    /// Panics if `local_index >= self.num_vertices()`.
    fn vertex(&self, local_index: usize) -> &OPoint<T, D>;

    fn num_faces(&self) -> usize;

    /// Whether the face with the given local index lies on the boundary of the domain.
    fn face_at_boundary(&self, face: usize) -> bool;
}

/// Index-based data structure for conforming meshes (i.e. no hanging nodes).
///
/// Only vertices and connectivity are serialized. Deserialization validates the connectivity
/// and recomputes the boundary faces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(
    try_from = "MeshData<T, D, C>",
    bound(serialize = "T: Serialize", deserialize = "MeshData<T, D, C>: Deserialize<'de>, C: Connectivity")
)]
pub struct Mesh<T: Scalar, D, C>
where
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    #[serde(bound(serialize = "<DefaultAllocator as Allocator<T, D>>::Buffer: Serialize"))]
    vertices: Vec<OPoint<T, D>>,
    #[serde(bound(serialize = "C: Serialize"))]
    connectivity: Vec<C>,
    /// Pairs `(cell index, local face index)` of faces that belong to a single cell.
    #[serde(skip_serializing)]
    boundary_faces: BTreeSet<(usize, usize)>,
}

/// The serialized form of a [`Mesh`].
#[derive(Debug, Deserialize)]
#[serde(bound(
    deserialize = "<DefaultAllocator as Allocator<T, D>>::Buffer: Deserialize<'de>, C: Deserialize<'de>"
))]
pub struct MeshData<T: Scalar, D, C>
where
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub vertices: Vec<OPoint<T, D>>,
    pub connectivity: Vec<C>,
}

impl<T, D, C> TryFrom<MeshData<T, D, C>> for Mesh<T, D, C>
where
    T: Scalar,
    D: DimName,
    C: Connectivity,
    DefaultAllocator: Allocator<T, D>,
{
    type Error = FeValuesError;

    fn try_from(data: MeshData<T, D, C>) -> Result<Self, Self::Error> {
        Self::try_from_vertices_and_connectivity(data.vertices, data.connectivity)
    }
}

pub type Mesh1d<T, C> = Mesh<T, U1, C>;
pub type Mesh2d<T, C> = Mesh<T, U2, C>;

pub type SegmentMesh1d<T> = Mesh1d<T, SegmentConnectivity>;
pub type QuadMesh2d<T> = Mesh2d<T, QuadConnectivity>;

impl<T, D, C> Mesh<T, D, C>
where
    T: Scalar,
    D: DimName,
    C: Connectivity,
    DefaultAllocator: Allocator<T, D>,
{
    /// Construct a mesh from vertices and connectivity.
    ///
    /// Faces that are not shared by two cells are marked as boundary faces.
    ///
    /// # Panics
    ///
    /// Panics if the connectivity references a vertex that does not exist.
    pub fn from_vertices_and_connectivity(vertices: Vec<OPoint<T, D>>, connectivity: Vec<C>) -> Self {
        match Self::try_from_vertices_and_connectivity(vertices, connectivity) {
            Ok(mesh) => mesh,
            Err(error) => panic!("{error}"),
        }
    }

    /// Construct a mesh from vertices and connectivity, or report the first cell that
    /// references a vertex that does not exist.
    pub fn try_from_vertices_and_connectivity(
        vertices: Vec<OPoint<T, D>>,
        connectivity: Vec<C>,
    ) -> Result<Self, FeValuesError> {
        for (cell_index, cell) in connectivity.iter().enumerate() {
            if let Some(&v) = cell.vertex_indices().iter().find(|&&v| v >= vertices.len()) {
                return Err(FeValuesError::InvalidVertexIndex {
                    cell: cell_index,
                    vertex: v,
                    num_vertices: vertices.len(),
                });
            }
        }
        let boundary_faces = find_boundary_faces(&connectivity);
        Ok(Self {
            vertices,
            connectivity,
            boundary_faces,
        })
    }

    pub fn vertices(&self) -> &[OPoint<T, D>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[C] {
        &self.connectivity
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len()
    }

    /// Returns pairs `(cell index, local face index)` of all boundary faces, in ascending order.
    pub fn boundary_faces(&self) -> impl '_ + Iterator<Item = (usize, usize)> {
        self.boundary_faces.iter().copied()
    }

    pub fn is_boundary_face(&self, cell_index: usize, local_face_index: usize) -> bool {
        self.boundary_faces.contains(&(cell_index, local_face_index))
    }

    pub fn cell(&self, index: usize) -> Option<CellRef<'_, T, D, C>> {
        (index < self.num_cells()).then_some(CellRef { mesh: self, index })
    }

    pub fn cell_iter(&self) -> impl '_ + Iterator<Item = CellRef<'_, T, D, C>> {
        (0..self.num_cells()).map(move |index| CellRef { mesh: self, index })
    }
}

fn find_boundary_faces<C: Connectivity>(connectivity: &[C]) -> BTreeSet<(usize, usize)> {
    // Equivalent faces have the same sorted vertex indices. A BTreeMap keeps the result
    // independent of hashing
    let mut face_counts = BTreeMap::new();
    for (cell_index, cell) in connectivity.iter().enumerate() {
        for local_index in 0..cell.num_faces() {
            if let Some(face) = cell.get_face_connectivity(local_index) {
                let mut key = face.vertex_indices().to_vec();
                key.sort_unstable();
                face_counts
                    .entry(key)
                    .and_modify(|(_, count)| *count += 1)
                    .or_insert(((cell_index, local_index), 1));
            }
        }
    }

    face_counts
        .into_values()
        .filter(|&(_, count)| count == 1)
        .map(|(face, _)| face)
        .collect()
}

/// A cell of a [`Mesh`].
#[derive(Debug)]
pub struct CellRef<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    mesh: &'a Mesh<T, D, C>,
    index: usize,
}

impl<'a, T, D, C> Clone for CellRef<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, D, C> Copy for CellRef<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
}

impl<'a, T, D, C> CellRef<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    DefaultAllocator: Allocator<T, D>,
{
    pub fn connectivity(&self) -> &'a C {
        &self.mesh.connectivity[self.index]
    }
}

impl<'a, T, D, C> CellAccessor<T, D> for CellRef<'a, T, D, C>
where
    T: Scalar,
    D: DimName,
    C: Connectivity,
    DefaultAllocator: Allocator<T, D>,
{
    fn index(&self) -> usize {
        self.index
    }

    fn num_vertices(&self) -> usize {
        self.connectivity().vertex_indices().len()
    }

    fn vertex(&self, local_index: usize) -> &OPoint<T, D> {
        &self.mesh.vertices[self.connectivity().vertex_indices()[local_index]]
    }

    fn num_faces(&self) -> usize {
        self.connectivity().num_faces()
    }

    fn face_at_boundary(&self, face: usize) -> bool {
        self.mesh.is_boundary_face(self.index, face)
    }
}
