//! Basic procedural mesh generation routines.
use crate::connectivity::{QuadConnectivity, SegmentConnectivity};
use crate::mesh::{QuadMesh2d, SegmentMesh1d};
use crate::Real;
use log::debug;
use nalgebra::{Point1, Point2, Vector2};

fn usize_as_t<T: Real>(n: usize) -> T {
    T::from_usize(n).expect("Must be able to fit usize in T")
}

/// Generates a uniform mesh of the interval `[a, b]` with the given number of cells.
///
/// Vertices are numbered from left to right, and each cell is oriented from left to right.
pub fn create_uniform_interval_mesh<T: Real>(a: T, b: T, num_cells: usize) -> SegmentMesh1d<T> {
    if num_cells == 0 {
        return SegmentMesh1d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let cell_size = (b - a) / usize_as_t(num_cells);
    let vertices = (0..=num_cells)
        .map(|i| Point1::new(a + cell_size * usize_as_t(i)))
        .collect();
    let cells = (0..num_cells)
        .map(|i| SegmentConnectivity([i, i + 1]))
        .collect();

    debug!("Generated interval mesh with {num_cells} cells");
    SegmentMesh1d::from_vertices_and_connectivity(vertices, cells)
}

pub fn create_unit_interval_mesh<T: Real>(num_cells: usize) -> SegmentMesh1d<T> {
    create_uniform_interval_mesh(T::zero(), T::one(), num_cells)
}

pub fn create_unit_square_uniform_quad_mesh_2d<T: Real>(cells_per_dim: usize) -> QuadMesh2d<T> {
    create_rectangular_uniform_quad_mesh_2d(
        &Point2::origin(),
        &Vector2::new(T::one(), T::one()),
        cells_per_dim,
        cells_per_dim,
    )
}

/// Generates an axis-aligned rectangular uniform mesh with the given lower-left corner and extents.
///
/// Vertices are numbered row by row from the bottom, and all cells are counter-clockwise with
/// their first vertex in the lower-left corner.
pub fn create_rectangular_uniform_quad_mesh_2d<T: Real>(
    origin: &Point2<T>,
    extents: &Vector2<T>,
    num_cells_x: usize,
    num_cells_y: usize,
) -> QuadMesh2d<T> {
    if num_cells_x == 0 || num_cells_y == 0 {
        return QuadMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let cell_size = Vector2::new(
        extents.x / usize_as_t(num_cells_x),
        extents.y / usize_as_t(num_cells_y),
    );
    let to_global_vertex_index = |i, j| (num_cells_x + 1) * j + i;

    let mut vertices = Vec::with_capacity((num_cells_x + 1) * (num_cells_y + 1));
    for j in 0..=num_cells_y {
        for i in 0..=num_cells_x {
            let offset = Vector2::new(usize_as_t::<T>(i), usize_as_t(j)).component_mul(&cell_size);
            vertices.push(origin + offset);
        }
    }

    let mut cells = Vec::with_capacity(num_cells_x * num_cells_y);
    for j in 0..num_cells_y {
        for i in 0..num_cells_x {
            cells.push(QuadConnectivity([
                to_global_vertex_index(i, j),
                to_global_vertex_index(i + 1, j),
                to_global_vertex_index(i + 1, j + 1),
                to_global_vertex_index(i, j + 1),
            ]));
        }
    }

    debug!("Generated rectangular quad mesh with {num_cells_x}x{num_cells_y} cells");
    QuadMesh2d::from_vertices_and_connectivity(vertices, cells)
}
