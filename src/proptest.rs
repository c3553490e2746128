//! Strategies for property-based testing with `proptest`.
use crate::connectivity::QuadConnectivity;
use crate::mesh::procedural::create_rectangular_uniform_quad_mesh_2d;
use crate::mesh::QuadMesh2d;
use ::proptest::prelude::*;
use nalgebra::{Point2, Vector2};
use std::f64::consts::PI;

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from,
    // otherwise we can easily get floating point numbers that are
    // so ridiculously large as to break anything we might want to do with them
    let range = -10.0..10.0;
    [range.clone(), range.clone()].prop_map(|[x, y]| Point2::new(x, y))
}

/// The vertices of a counter-clockwise parallelogram, i.e. the image of the unit square under
/// a non-degenerate affine map with positive determinant.
///
/// Side lengths and the angle between the sides are bounded away from zero, so that the
/// resulting cells are reasonably well-shaped.
pub fn parallelogram_strategy() -> impl Strategy<Value = [Point2<f64>; 4]> {
    let length = 0.1..5.0;
    (point2(), length.clone(), length, 0.0..2.0 * PI, 0.2..PI - 0.2).prop_map(
        |(origin, length_a, length_b, rotation, angle)| {
            let a = length_a * Vector2::new(rotation.cos(), rotation.sin());
            let b = length_b * Vector2::new((rotation + angle).cos(), (rotation + angle).sin());
            [origin, origin + a, origin + a + b, origin + b]
        },
    )
}

/// A mesh consisting of a single quadrilateral cell with the given vertices.
pub fn single_cell_quad_mesh(vertices: [Point2<f64>; 4]) -> QuadMesh2d<f64> {
    QuadMesh2d::from_vertices_and_connectivity(vertices.to_vec(), vec![QuadConnectivity([0, 1, 2, 3])])
}

/// Uniform meshes of axis-aligned rectangles with at most `max_cells` cells.
pub fn rectangular_uniform_mesh_strategy(max_cells: usize) -> impl Strategy<Value = QuadMesh2d<f64>> {
    let max_cells = max_cells.max(1);
    (1..=max_cells)
        .prop_flat_map(move |cells_x| (Just(cells_x), 1..=max_cells / cells_x))
        .prop_flat_map(|(cells_x, cells_y)| (Just(cells_x), Just(cells_y), point2(), 0.1..5.0, 0.1..5.0))
        .prop_map(|(cells_x, cells_y, origin, width, height)| {
            create_rectangular_uniform_quad_mesh_2d(&origin, &Vector2::new(width, height), cells_x, cells_y)
        })
}
