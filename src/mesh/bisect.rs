use std::collections::{HashMap, HashSet};

use log::trace;
use nalgebra::{Point3, Vector3};

use super::{Edge, Face, Mesh};
use crate::geo::EPSILON;

/// Which side of the cutting plane a vertex lies on.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
enum Side{
    Inner,
    On,
    Outer,
}

impl Mesh {
    /// Splits the mesh with the plane through `plane_point` with normal `plane_normal`.
    ///
    /// Every edge crossing the plane is split once, and every face crossing it is
    /// divided into an inner piece (behind the normal) and an outer piece. Pieces
    /// on a cleared side are removed together with the vertices only they used.
    /// Faces lying in the plane are kept unless both sides are cleared.
    ///
    /// Returns the cross-section: the edges with both ends on the plane that border
    /// a face crossing or touching the plane, plus loose edges lying in the plane.
    ///
    /// Faces are expected to be convex, which holds for triangulated input.
    pub fn bisect(&mut self,plane_point:&Point3<f32>,plane_normal:&Vector3<f32>,clear_inner:bool,clear_outer:bool) -> Vec<Edge> {
        let Some(normal) = plane_normal.try_normalize(f32::EPSILON) else { return vec![] };

        let mut distance:Vec<f32> = self.vertices.iter()
            .map(|p| (p - plane_point).dot(&normal))
            .collect();
        let mut vertices = self.vertices.clone();

        // split every crossing edge exactly once, shared by all faces using it
        let mut splits:HashMap<Edge,usize> = HashMap::new();
        for edge in self.edges.iter() {
            let (d0,d1) = (distance[edge.0],distance[edge.1]);
            if side_of(d0) == Side::On || side_of(d1) == Side::On || side_of(d0) == side_of(d1) { continue }
            let t = d0 / (d0 - d1);
            let p0 = vertices[edge.0];
            let p1 = vertices[edge.1];
            vertices.push(p0 + (p1 - p0)*t);
            distance.push(0.0);
            splits.insert(*edge, vertices.len()-1);
        }
        let side:Vec<Side> = distance.iter().map(|d| side_of(*d)).collect();

        let mut faces:Vec<Vec<usize>> = Vec::new();
        let mut cut_edges:Vec<Edge> = Vec::new();
        let mut section_candidates:HashSet<Edge> = HashSet::new();

        for face in self.faces.iter() {
            let ring = split_ring(face, &splits);
            let has_inner = ring.iter().any(|v| side[*v] == Side::Inner);
            let has_outer = ring.iter().any(|v| side[*v] == Side::Outer);

            if !has_inner && !has_outer {
                if !(clear_inner && clear_outer) { faces.push(ring) }
                continue
            }

            // edges of a non-coplanar face lying on the plane border the section
            let on_plane:Vec<usize> = ring.iter().copied().filter(|v| side[*v] == Side::On).collect();
            for (a,b) in ring.iter().zip(ring.iter().cycle().skip(1)) {
                if side[*a] == Side::On && side[*b] == Side::On {
                    section_candidates.insert(Edge::new(*a,*b));
                }
            }

            if has_inner && has_outer {
                if on_plane.len() == 2 {
                    cut_edges.push(Edge::new(on_plane[0],on_plane[1]));
                } else {
                    trace!("bisect: face {:?} crosses the plane at {} points",face.vertices,on_plane.len());
                }
                if !clear_inner {
                    faces.push(ring.iter().copied().filter(|v| side[*v] != Side::Outer).collect());
                }
                if !clear_outer {
                    faces.push(ring.iter().copied().filter(|v| side[*v] != Side::Inner).collect());
                }
            } else if (has_inner && !clear_inner) || (has_outer && !clear_outer) {
                faces.push(ring);
            }
        }

        // loose edges are kept unless they reach into a cleared side
        let face_edges:HashSet<Edge> = self.faces.iter().flat_map(|f| f.edges()).collect();
        let mut loose_edges:Vec<Edge> = Vec::new();
        for edge in self.edges.iter().filter(|e| !face_edges.contains(e)) {
            let pieces = match splits.get(edge) {
                Some(mid) => vec![Edge::new(edge.0,*mid),Edge::new(*mid,edge.1)],
                None => vec![*edge],
            };
            for piece in pieces {
                let cleared = [piece.0,piece.1].iter().any(|v|
                    (side[*v] == Side::Inner && clear_inner) || (side[*v] == Side::Outer && clear_outer)
                );
                if cleared { continue }
                if side[piece.0] == Side::On && side[piece.1] == Side::On {
                    section_candidates.insert(piece);
                }
                loose_edges.push(piece);
            }
        }

        // section edges in deterministic order: existing mesh edges first, then new cuts
        let mut section:Vec<Edge> = Vec::new();
        let mut seen:HashSet<Edge> = HashSet::new();
        let existing = self.edges.iter().copied().chain(loose_edges.iter().copied());
        for edge in existing {
            if section_candidates.contains(&edge) && seen.insert(edge) {
                section.push(edge);
            }
        }
        for edge in cut_edges {
            if seen.insert(edge) { section.push(edge) }
        }

        let mut mesh = Mesh{ vertices, ..Default::default() };
        for face in faces.into_iter().filter(|f| f.len() >= 3) {
            mesh.add_face(face);
        }
        for edge in loose_edges.iter().chain(section.iter()) {
            mesh.add_edge(*edge);
        }
        let remap = mesh.compact();
        *self = mesh;

        section.into_iter()
            .filter_map(|e| Some(Edge::new(remap[e.0]?,remap[e.1]?)))
            .collect()
    }
}

fn side_of(distance:f32) -> Side {
    if distance > EPSILON { Side::Outer }
    else if distance < -EPSILON { Side::Inner }
    else { Side::On }
}

/// Face vertices with the split vertices of its crossing edges inserted in winding order.
fn split_ring(face:&Face, splits:&HashMap<Edge,usize>) -> Vec<usize> {
    let mut ring = Vec::with_capacity(face.vertices.len()+2);
    for (a,b) in face.directed_edges() {
        ring.push(a);
        if let Some(mid) = splits.get(&Edge::new(a,b)) {
            ring.push(*mid);
        }
    }
    ring
}
