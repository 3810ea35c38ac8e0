use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::SliceError;
use crate::kernel::MeshKernel;
use crate::loops::{group_into_loops, LoopGrouping};
use crate::mesh::Edge;

/// Cap bookkeeping of one built disk.
#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct DiskCaps{
    /// Number of loops capped on the bisected side
    pub bottom: usize,
    /// Number of loops capped on the extruded side
    pub top: usize,
    /// The boundary had branching vertices, see [`LoopGrouping::is_truncated`]
    pub truncated: bool,
}

impl DiskCaps {
    /// The slice plane missed the mesh.
    pub fn is_empty(&self) -> bool {
        self.bottom == 0 && self.top == 0
    }
    /// Both sides carry a cap for every boundary loop.
    pub fn is_sealed(&self) -> bool {
        self.bottom > 0 && self.bottom == self.top
    }
}

/// One thin slice of the source model, linked into the result collection under `name`.
#[derive(Debug,Clone,PartialEq)]
pub struct Disk{
    /// Position in the slice sequence
    pub index: usize,
    pub name: String,
    pub caps: DiskCaps,
}

/// Name of the `index`-th disk cut from `source`.
pub fn disk_name(source:&str, index:usize) -> String {
    format!("{source}-({index})")
}

/// Turns the open cross-section `boundary` of a bisected mesh into a closed solid
/// of thickness `extrude`.
///
/// 1. cap every boundary loop (bottom)
/// 2. extrude the original boundary edges
/// 3. move the extruded vertices by `extrude`
/// 4. cap every loop of the new boundary (top)
/// 5. make the normals consistent and outward facing
///
/// Every loop is capped on its own. Nested loops are not treated as holes, so a
/// hollow cross-section becomes a solid disk.
///
/// An empty boundary produces an empty disk. A loop the kernel can not fill fails
/// the whole disk with [`SliceError::CapFailure`].
pub fn build_disk<K:MeshKernel>(mesh:&mut K, boundary:&[Edge], extrude:&Vector3<f32>) -> Result<DiskCaps,SliceError> {
    if boundary.is_empty() {
        return Ok(DiskCaps::default())
    }

    let bottom = group_into_loops(boundary);
    let bottom_caps = cap_loops(mesh, &bottom, "bottom")?;

    let extruded = mesh.extrude_edges(boundary)?;
    mesh.translate_vertices(&extruded.vertices, extrude);

    let top = group_into_loops(&extruded.edges);
    let top_caps = cap_loops(mesh, &top, "top")?;

    mesh.recalc_normals();
    debug!("built disk: {} boundary edges, {bottom_caps} bottom and {top_caps} top caps",boundary.len());

    Ok(DiskCaps{
        bottom: bottom_caps,
        top: top_caps,
        truncated: bottom.is_truncated() || top.is_truncated(),
    })
}

fn cap_loops<K:MeshKernel>(mesh:&mut K, grouping:&LoopGrouping, side:&str) -> Result<usize,SliceError> {
    if grouping.is_truncated() {
        warn!("{side} boundary has branching vertices {:?}, loops may be incomplete",grouping.branching_vertices);
    }
    for (i,edge_loop) in grouping.loops.iter().enumerate() {
        mesh.fill_simple_loop(&edge_loop.edges).map_err(|error| match error {
            SliceError::CapFailure{reason} => SliceError::cap(format!("{side} loop {i}: {reason}")),
            other => other,
        })?;
    }
    Ok(grouping.loops.len())
}

#[cfg(test)]
mod test {
    use nalgebra::Point3;

    use super::*;
    use crate::kernel::ExtrudeResult;
    use crate::mesh::FaceId;

    /// Records the calls made by [`build_disk`] and fails filling on request.
    #[derive(Default)]
    struct RecordingKernel{
        calls: Vec<String>,
        fail_fill_at: Option<usize>,
        fills: usize,
    }

    impl MeshKernel for RecordingKernel {
        fn bisect_by_plane(&mut self,_:&Point3<f32>,_:&Vector3<f32>,_:bool,_:bool) -> Vec<Edge> {
            self.calls.push("bisect".into());
            vec![]
        }
        fn fill_simple_loop(&mut self, edge_loop:&[Edge]) -> Result<Vec<FaceId>,SliceError> {
            self.calls.push(format!("fill {}",edge_loop.len()));
            self.fills += 1;
            if self.fail_fill_at == Some(self.fills) {
                return Err(SliceError::cap("degenerate"))
            }
            Ok(vec![0])
        }
        fn extrude_edges(&mut self, edges:&[Edge]) -> Result<ExtrudeResult,SliceError> {
            self.calls.push(format!("extrude {}",edges.len()));
            let mut vertices:Vec<usize> = edges.iter().flat_map(|e| [e.0+100,e.1+100]).collect();
            vertices.sort();
            vertices.dedup();
            Ok(ExtrudeResult{
                vertices,
                edges: edges.iter().map(|e| Edge::new(e.0+100,e.1+100)).collect(),
            })
        }
        fn translate_vertices(&mut self, vertices:&[usize], displacement:&Vector3<f32>) {
            self.calls.push(format!("translate {} by {}",vertices.len(),displacement.z));
        }
        fn recalc_normals(&mut self) {
            self.calls.push("recalc".into());
        }
    }

    fn triangle_and_square() -> Vec<Edge> {
        vec![
            Edge::new(0,1),Edge::new(1,2),Edge::new(2,0),
            Edge::new(3,4),Edge::new(4,5),Edge::new(5,6),Edge::new(6,3),
        ]
    }

    #[test]
    fn build_order_test(){
        let mut kernel = RecordingKernel::default();
        let caps = build_disk(&mut kernel, &triangle_and_square(), &Vector3::new(0.0,0.0,0.5)).unwrap();
        assert_eq!(caps, DiskCaps{ bottom:2, top:2, truncated:false });
        assert_eq!(kernel.calls, vec![
            "fill 3","fill 4",
            "extrude 7",
            "translate 7 by 0.5",
            "fill 3","fill 4",
            "recalc",
        ]);
    }

    #[test]
    fn empty_boundary_builds_nothing_test(){
        let mut kernel = RecordingKernel::default();
        let caps = build_disk(&mut kernel, &[], &Vector3::z()).unwrap();
        assert!(caps.is_empty());
        assert!(!caps.is_sealed());
        assert!(kernel.calls.is_empty());
    }

    #[test]
    fn cap_failure_names_the_loop_test(){
        let mut kernel = RecordingKernel{ fail_fill_at:Some(4), ..Default::default() };
        let error = build_disk(&mut kernel, &triangle_and_square(), &Vector3::z()).unwrap_err();
        match error {
            SliceError::CapFailure{reason} => assert_eq!(reason, "top loop 1: degenerate"),
            other => panic!("unexpected error {other}"),
        }
        assert!(!kernel.calls.contains(&"recalc".to_string()));
    }

    #[test]
    fn branching_boundary_is_flagged_test(){
        // two triangles sharing vertex 0
        let boundary = vec![
            Edge::new(0,1),Edge::new(1,2),Edge::new(2,0),
            Edge::new(0,3),Edge::new(3,4),Edge::new(4,0),
        ];
        let mut kernel = RecordingKernel::default();
        let caps = build_disk(&mut kernel, &boundary, &Vector3::z()).unwrap();
        assert!(caps.truncated);
    }

    #[test]
    fn disk_name_test(){
        assert_eq!(disk_name("Torso",3), "Torso-(3)");
    }
}
