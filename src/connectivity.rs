//! Index-based cell topologies.
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// The vertex indices of a cell and the topology of its faces.
///
/// Faces are numbered consistently with the face numbering of the reference cell, see
/// [`fe_values`](crate::fe_values).
pub trait Connectivity: Clone {
    type FaceConnectivity: Connectivity;

    fn num_faces(&self) -> usize;
    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity>;

    fn vertex_indices(&self) -> &[usize];
}

impl Connectivity for () {
    type FaceConnectivity = ();

    fn num_faces(&self) -> usize {
        0
    }

    fn get_face_connectivity(&self, _index: usize) -> Option<Self::FaceConnectivity> {
        None
    }

    fn vertex_indices(&self) -> &[usize] {
        &[]
    }
}

/// A single vertex, the face of a segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexConnectivity(pub [usize; 1]);

impl Connectivity for VertexConnectivity {
    type FaceConnectivity = ();

    fn num_faces(&self) -> usize {
        0
    }

    fn get_face_connectivity(&self, _index: usize) -> Option<Self::FaceConnectivity> {
        None
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

/// A segment with two vertices, which are also its faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentConnectivity(pub [usize; 2]);

impl Deref for SegmentConnectivity {
    type Target = [usize; 2];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Connectivity for SegmentConnectivity {
    type FaceConnectivity = VertexConnectivity;

    fn num_faces(&self) -> usize {
        2
    }

    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity> {
        self.0.get(index).map(|&v| VertexConnectivity([v]))
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}

/// A quadrilateral with vertices in counter-clockwise order.
///
/// Face `f` is the segment from vertex `f` to vertex `(f + 1) % 4`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuadConnectivity(pub [usize; 4]);

impl Deref for QuadConnectivity {
    type Target = [usize; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Connectivity for QuadConnectivity {
    type FaceConnectivity = SegmentConnectivity;

    fn num_faces(&self) -> usize {
        4
    }

    fn get_face_connectivity(&self, index: usize) -> Option<Self::FaceConnectivity> {
        let idx = &self.0;
        if index < 4 {
            Some(SegmentConnectivity([idx[index], idx[(index + 1) % 4]]))
        } else {
            None
        }
    }

    fn vertex_indices(&self) -> &[usize] {
        &self.0
    }
}
