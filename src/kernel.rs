use nalgebra::{Point3, Vector3};

use crate::error::SliceError;
use crate::mesh::{Edge, FaceId};

/// Geometry created by [`MeshKernel::extrude_edges`].
#[derive(Debug,Clone,Default,PartialEq)]
pub struct ExtrudeResult{
    /// The duplicated vertices, in the order they were first reached
    pub vertices: Vec<usize>,
    /// The duplicated edges in the order of the input edges,
    /// together they form the new open boundary
    pub edges: Vec<Edge>,
}

/// The mesh editing operations the disk pipeline needs from a geometry kernel.
/// [`crate::mesh::Mesh`] is the built in implementation.
pub trait MeshKernel {
    /// Cuts the mesh with a plane and returns the cross-section edges.
    /// Material behind the normal is removed when `clear_inner` is set,
    /// material in front of it when `clear_outer` is set.
    fn bisect_by_plane(&mut self,plane_point:&Point3<f32>,plane_normal:&Vector3<f32>,clear_inner:bool,clear_outer:bool) -> Vec<Edge>;
    /// Fills one simple closed loop, edges given in walk order.
    fn fill_simple_loop(&mut self, edge_loop:&[Edge]) -> Result<Vec<FaceId>,SliceError>;
    /// Duplicates the edges and connects originals and duplicates with quads.
    fn extrude_edges(&mut self, edges:&[Edge]) -> Result<ExtrudeResult,SliceError>;
    fn translate_vertices(&mut self, vertices:&[usize], displacement:&Vector3<f32>);
    fn recalc_normals(&mut self);
}
