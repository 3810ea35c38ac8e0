use std::collections::{HashMap, VecDeque};

use log::debug;
use nalgebra::{Point3, Vector3};

use super::{face_signed_volume, newell_normal, Edge, Mesh};

impl Mesh {
    /// Makes the winding of all faces consistent and points the normals outwards.
    ///
    /// Winding is propagated breadth first across manifold edges (edges with
    /// exactly two faces), the two faces must walk a shared edge in opposite
    /// directions. Every edge connected component is then flipped as a whole
    /// if its signed volume, measured from the component's centroid, is negative.
    pub fn recalculate_normals(&mut self) {
        let mut edge_to_faces:HashMap<Edge,Vec<usize>> = HashMap::with_capacity(self.faces.len()*2);
        for (i,face) in self.faces.iter().enumerate() {
            for edge in face.edges() {
                edge_to_faces.entry(edge).or_insert_with(Vec::new).push(i);
            }
        }

        let mut visited = vec![false; self.faces.len()];
        let mut nr_of_components = 0;
        for seed in 0..self.faces.len() {
            if visited[seed] { continue }
            nr_of_components += 1;
            visited[seed] = true;

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(seed);
            while let Some(current) = queue.pop_front() {
                component.push(current);
                let directed:Vec<(usize,usize)> = self.faces[current].directed_edges().collect();
                for (a,b) in directed {
                    let Some(neighbours) = edge_to_faces.get(&Edge::new(a,b)) else { continue };
                    if neighbours.len() != 2 { continue }
                    for &neighbour in neighbours {
                        if neighbour == current || visited[neighbour] { continue }
                        if self.faces[neighbour].traverses(a,b) {
                            self.faces[neighbour].vertices.reverse();
                        }
                        visited[neighbour] = true;
                        queue.push_back(neighbour);
                    }
                }
            }

            let centroid = component_centroid(self, &component);
            let volume:f32 = component.iter()
                .map(|f| face_signed_volume(&self.vertices, &self.faces[*f], &centroid))
                .sum();
            if volume < 0.0 {
                for f in component {
                    self.faces[f].vertices.reverse();
                }
            }
        }

        for face in self.faces.iter_mut() {
            face.normal = newell_normal(face.vertices.iter().map(|v| &self.vertices[*v]))
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::zeros);
        }
        debug!("recalculated normals of {} faces in {nr_of_components} components",self.faces.len());
    }
}

fn component_centroid(mesh:&Mesh, component:&[usize]) -> Point3<f32> {
    let mut sum = Vector3::zeros();
    let mut count = 0;
    for v in component.iter().flat_map(|f| mesh.faces[*f].vertices.iter()) {
        sum += mesh.vertices[*v].coords;
        count += 1;
    }
    if count == 0 { return Point3::origin() }
    Point3::from(sum / count as f32)
}
