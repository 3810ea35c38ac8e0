use std::collections::{HashMap, HashSet};

use nalgebra::{Point3, Vector3};

use crate::error::SliceError;
use crate::geo::Aabb;
use crate::kernel::{ExtrudeResult, MeshKernel};

mod bisect;
mod extrude;
mod fill;
mod normals;

#[cfg(test)]
pub(crate) mod test;

pub type FaceId = usize;

/// Undirected edge between two vertex indices, stored with the smaller index first.
/// Two edges are the same edge if and only if they connect the same vertices,
/// coincident vertex positions are never considered.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Edge(pub usize,pub usize);

impl Edge {
    pub fn new(v1:usize, v2:usize) -> Self {
        if v1 < v2 {
            Edge(v1, v2)
        } else {
            Edge(v2, v1) 
        }
    }
    pub fn contains(&self, vertex:usize) -> bool {
        self.0 == vertex || self.1 == vertex
    }
    pub fn shares_vertex(&self, other:&Edge) -> bool {
        self.contains(other.0) || self.contains(other.1)
    }
    /// The opposite end of the edge, None if `vertex` is not an end of this edge.
    pub fn other(&self, vertex:usize) -> Option<usize> {
        if self.0 == vertex { Some(self.1) }
        else if self.1 == vertex { Some(self.0) }
        else { None }
    }
    pub fn is_degenerate(&self) -> bool {
        self.0 == self.1
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct Face{
    pub vertices: Vec<usize>,
    pub normal: Vector3<f32>,
}
impl Face {
    /// Directed edges of the face in winding order.
    pub fn directed_edges(&self) -> impl Iterator<Item = (usize,usize)> + '_ {
        let points = self.vertices.iter().copied();
        let points_offset_by_one = points.clone().cycle().skip(1);
        points.zip(points_offset_by_one)
    }
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.directed_edges().map(|(a,b)| Edge::new(a,b))
    }
    /// True if the face winding walks from `a` directly to `b`.
    pub fn traverses(&self, a:usize, b:usize) -> bool {
        self.directed_edges().any(|(start,end)| start == a && end == b)
    }
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.normal = -self.normal;
    }
}

/// Editable boundary representation of a surface: vertices, undirected edges
/// and faces given as ordered vertex loops. Edges keep their insertion order
/// so every operation that reports edges back does so deterministically.
#[derive(Debug,Clone,Default,PartialEq)]
pub struct Mesh{
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_faces(vertices:Vec<Point3<f32>>, faces:Vec<Vec<usize>>) -> Result<Self,SliceError> {
        let mut mesh = Mesh{ vertices, ..Default::default() };
        for face in faces {
            if face.len() < 3 {
                return Err(SliceError::InvalidParameter(format!("face {face:?} has less than 3 vertices")))
            }
            if let Some(v) = face.iter().find(|v| **v >= mesh.vertices.len()) {
                return Err(SliceError::InvalidParameter(
                    format!("face index {v} is out of range (vertices.len = {})",mesh.vertices.len())
                    ))
            }
            mesh.add_face(face);
        }
        Ok(mesh)
    }

    pub fn add_vertex(&mut self, point:Point3<f32>) -> usize {
        self.vertices.push(point);
        self.vertices.len() - 1
    }

    /// Inserts the edge if it is not already part of the mesh, returns true if it was inserted.
    pub fn add_edge(&mut self, edge:Edge) -> bool {
        if self.edge_set.insert(edge) {
            self.edges.push(edge);
            return true
        }
        false
    }

    /// Adds a face and any of its edges that are missing.
    pub fn add_face(&mut self, vertices:Vec<usize>) -> FaceId {
        let normal = newell_normal(vertices.iter().map(|v| &self.vertices[*v]))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let face = Face{ vertices, normal };
        let edges:Vec<Edge> = face.edges().collect();
        for edge in edges {
            self.add_edge(edge);
        }
        self.faces.push(face);
        self.faces.len() - 1
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn has_edge(&self, edge:&Edge) -> bool {
        self.edge_set.contains(edge)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Number of faces bordering every edge of the mesh, loose edges map to zero.
    pub fn edge_face_counts(&self) -> HashMap<Edge,usize> {
        let mut counts:HashMap<Edge,usize> = self.edges.iter().map(|e|(*e,0)).collect();
        for edge in self.faces.iter().flat_map(|face| face.edges()) {
            *counts.entry(edge).or_insert(0) += 1;
        }
        counts
    }

    /// Edges bordered by exactly one face, in mesh edge order.
    pub fn boundary_edges(&self) -> Vec<Edge> {
        let counts = self.edge_face_counts();
        self.edges.iter()
            .filter(|edge| counts.get(edge) == Some(&1))
            .copied()
            .collect()
    }

    /// A closed mesh has at least one face and every edge borders exactly two faces.
    pub fn is_closed(&self) -> bool {
        !self.faces.is_empty() && self.edge_face_counts().values().all(|count| *count == 2)
    }

    pub fn translate(&mut self, displacement:&Vector3<f32>) {
        for point in self.vertices.iter_mut() {
            *point += displacement;
        }
    }

    pub fn translate_vertices(&mut self, vertices:&[usize], displacement:&Vector3<f32>) {
        for v in vertices {
            if let Some(point) = self.vertices.get_mut(*v) {
                *point += displacement;
            }
        }
    }

    /// Signed volume enclosed by the faces, positive when the normals point outwards.
    pub fn signed_volume(&self) -> f32 {
        self.faces.iter()
            .map(|face| face_signed_volume(&self.vertices, face, &Point3::origin()))
            .sum()
    }

    /// Fan triangulation of every face, used for export.
    pub fn triangles(&self) -> Vec<[usize;3]> {
        self.faces.iter()
            .flat_map(|face|{
                let first = face.vertices[0];
                face.vertices.windows(2)
                    .skip(1)
                    .map(move |w| [first, w[0], w[1]])
            })
            .collect()
    }

    /// Drops vertices that are not used by any face or edge and renumbers the rest.
    /// Returns the old-to-new index map.
    pub(crate) fn compact(&mut self) -> Vec<Option<usize>> {
        let mut used = vec![false; self.vertices.len()];
        for v in self.faces.iter().flat_map(|f| f.vertices.iter()) {
            used[*v] = true;
        }
        for edge in self.edges.iter() {
            used[edge.0] = true;
            used[edge.1] = true;
        }
        let mut remap = vec![None; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for (i,point) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = Some(vertices.len());
                vertices.push(*point);
            }
        }
        let map = |v:usize| remap[v].unwrap_or(v);
        self.vertices = vertices;
        for face in self.faces.iter_mut() {
            face.vertices.iter_mut().for_each(|v| *v = map(*v));
        }
        let edges:Vec<Edge> = self.edges.iter().map(|e| Edge::new(map(e.0),map(e.1))).collect();
        self.edges.clear();
        self.edge_set.clear();
        for edge in edges {
            self.add_edge(edge);
        }
        remap
    }
}

impl MeshKernel for Mesh {
    fn bisect_by_plane(&mut self,plane_point:&Point3<f32>,plane_normal:&Vector3<f32>,clear_inner:bool,clear_outer:bool) -> Vec<Edge> {
        self.bisect(plane_point, plane_normal, clear_inner, clear_outer)
    }
    fn fill_simple_loop(&mut self, edge_loop:&[Edge]) -> Result<Vec<FaceId>,SliceError> {
        self.fill_loop(edge_loop)
    }
    fn extrude_edges(&mut self, edges:&[Edge]) -> Result<ExtrudeResult,SliceError> {
        self.extrude(edges)
    }
    fn translate_vertices(&mut self, vertices:&[usize], displacement:&Vector3<f32>) {
        Mesh::translate_vertices(self, vertices, displacement)
    }
    fn recalc_normals(&mut self) {
        self.recalculate_normals()
    }
}

/// Normal of a polygon by Newell's method, its length is twice the polygon area.
pub fn newell_normal<'a,I>(points:I) -> Vector3<f32>
where I: IntoIterator<Item = &'a Point3<f32>>
{
    let points:Vec<&Point3<f32>> = points.into_iter().collect();
    let mut normal = Vector3::zeros();
    for (i,p1) in points.iter().enumerate() {
        let p2 = points[(i+1)%points.len()];
        normal.x += (p1.y - p2.y) * (p1.z + p2.z);
        normal.y += (p1.z - p2.z) * (p1.x + p2.x);
        normal.z += (p1.x - p2.x) * (p1.y + p2.y);
    }
    normal
}

/// Signed volume of the cone spanned by the face and `apex`.
fn face_signed_volume(vertices:&[Point3<f32>], face:&Face, apex:&Point3<f32>) -> f32 {
    let p0 = vertices[face.vertices[0]] - apex;
    face.vertices.windows(2)
        .skip(1)
        .map(|w|{
            let p1 = vertices[w[0]] - apex;
            let p2 = vertices[w[1]] - apex;
            p0.dot(&p1.cross(&p2))
        })
        .sum::<f32>() / 6.0
}
