use std::collections::{HashMap, HashSet};

use super::{Edge, Mesh};
use crate::error::SliceError;
use crate::kernel::ExtrudeResult;

impl Mesh {
    /// Duplicates the given edges and connects every original edge with its
    /// duplicate by a quad. Each vertex is duplicated once no matter how many of
    /// the edges share it. The duplicates are placed on top of the originals,
    /// moving them is up to the caller.
    pub fn extrude(&mut self, edges:&[Edge]) -> Result<ExtrudeResult,SliceError> {
        let mut unique = HashSet::with_capacity(edges.len());
        for edge in edges {
            if edge.is_degenerate() {
                return Err(SliceError::extrude(format!("edge ({},{}) connects a vertex to itself",edge.0,edge.1)))
            }
            if !self.has_edge(edge) {
                return Err(SliceError::extrude(format!("edge ({},{}) is not part of the mesh",edge.0,edge.1)))
            }
            if !unique.insert(*edge) {
                return Err(SliceError::extrude(format!("edge ({},{}) is listed twice",edge.0,edge.1)))
            }
        }

        let mut duplicates:HashMap<usize,usize> = HashMap::with_capacity(edges.len());
        let mut result = ExtrudeResult::default();
        for edge in edges {
            for v in [edge.0,edge.1] {
                if !duplicates.contains_key(&v) {
                    let copy = self.add_vertex(self.vertices[v]);
                    duplicates.insert(v,copy);
                    result.vertices.push(copy);
                }
            }
        }
        for edge in edges {
            let (a,b) = (duplicates[&edge.0],duplicates[&edge.1]);
            self.add_face(vec![edge.0, edge.1, b, a]);
            result.edges.push(Edge::new(a,b));
        }
        Ok(result)
    }
}
