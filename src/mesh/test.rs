use std::collections::HashSet;

use nalgebra::{Point3, Vector3};

use super::*;
use crate::disk::build_disk;
use crate::loops::group_into_loops;

/// Axis aligned triangulated cube with outward normals.
pub(crate) fn cube(min:Point3<f32>, size:f32) -> Mesh {
    let corners = [
        (0.0,0.0,0.0),(1.0,0.0,0.0),(1.0,1.0,0.0),(0.0,1.0,0.0),
        (0.0,0.0,1.0),(1.0,0.0,1.0),(1.0,1.0,1.0),(0.0,1.0,1.0),
    ];
    let vertices = corners.iter()
        .map(|(x,y,z)| min + Vector3::new(*x,*y,*z)*size)
        .collect();
    let faces = vec![
        vec![0,2,1],vec![0,3,2], // bottom
        vec![4,5,6],vec![4,6,7], // top
        vec![0,1,5],vec![0,5,4],
        vec![3,7,6],vec![3,6,2],
        vec![0,4,7],vec![0,7,3],
        vec![1,2,6],vec![1,6,5],
    ];
    Mesh::from_faces(vertices, faces).unwrap()
}

fn octahedron() -> Mesh {
    let vertices = vec![
        Point3::new( 1.0, 0.0, 0.0),
        Point3::new( 0.0, 1.0, 0.0),
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new( 0.0,-1.0, 0.0),
        Point3::new( 0.0, 0.0, 1.0),
        Point3::new( 0.0, 0.0,-1.0),
    ];
    let faces = vec![
        vec![0,1,4],vec![1,2,4],vec![2,3,4],vec![3,0,4],
        vec![1,0,5],vec![2,1,5],vec![3,2,5],vec![0,3,5],
    ];
    Mesh::from_faces(vertices, faces).unwrap()
}

/// Mesh made of loose edges only, one closed loop per polygon.
fn loops_mesh(polygons:&[Vec<Point3<f32>>]) -> (Mesh,Vec<Edge>) {
    let mut mesh = Mesh::new();
    let mut edges = Vec::new();
    for polygon in polygons {
        let first = mesh.vertices.len();
        for p in polygon {
            mesh.add_vertex(*p);
        }
        for i in 0..polygon.len() {
            let edge = Edge::new(first+i, first+(i+1)%polygon.len());
            mesh.add_edge(edge);
            edges.push(edge);
        }
    }
    (mesh,edges)
}

fn square(min:(f32,f32), size:f32, z:f32) -> Vec<Point3<f32>> {
    vec![
        Point3::new(min.0,      min.1,      z),
        Point3::new(min.0+size, min.1,      z),
        Point3::new(min.0+size, min.1+size, z),
        Point3::new(min.0,      min.1+size, z),
    ]
}

fn sorted(edges:&[Edge]) -> Vec<Edge> {
    let mut edges = edges.to_vec();
    edges.sort();
    edges
}

#[test]
fn cube_is_closed_test(){
    let mesh = cube(Point3::origin(), 1.0);
    assert_eq!(mesh.vertices.len(),8);
    assert_eq!(mesh.edges().len(),18);
    assert!(mesh.is_closed());
    assert!(mesh.boundary_edges().is_empty());
    assert!((mesh.signed_volume()-1.0).abs() < 1e-6);
}

#[test]
fn from_faces_rejects_bad_faces_test(){
    let vertices = vec![Point3::origin(),Point3::new(1.0,0.0,0.0),Point3::new(0.0,1.0,0.0)];
    assert!(matches!(Mesh::from_faces(vertices.clone(), vec![vec![0,1,3]]), Err(SliceError::InvalidParameter(_))));
    assert!(matches!(Mesh::from_faces(vertices, vec![vec![0,1]]), Err(SliceError::InvalidParameter(_))));
}

#[test]
fn bisect_through_cube_middle_test(){
    let mut mesh = cube(Point3::origin(), 1.0);
    let section = mesh.bisect(&Point3::new(0.0,0.0,0.5), &Vector3::z(), true, true);

    assert_eq!(section.len(),8);
    assert!(mesh.faces.is_empty());
    assert_eq!(mesh.vertices.len(),8);
    assert!(mesh.vertices.iter().all(|p| (p.z-0.5).abs() < 1e-6));
    assert!(section.iter().all(|e| mesh.has_edge(e)));

    let grouping = group_into_loops(&section);
    assert_eq!(grouping.loops.len(),1);
    assert!(grouping.all_simple());
    assert_eq!(grouping.loops[0].len(),8);
}

#[test]
fn bisect_at_cube_bottom_returns_bottom_square_test(){
    let mut mesh = cube(Point3::origin(), 1.0);
    let section = mesh.bisect(&Point3::origin(), &Vector3::z(), true, true);

    // the bottom diagonal only borders the coplanar bottom faces
    assert_eq!(sorted(&section), vec![Edge(0,1),Edge(0,3),Edge(1,2),Edge(2,3)]);
    assert_eq!(mesh.vertices.len(),4);
    assert!(mesh.vertices.iter().all(|p| p.z.abs() < 1e-6));
}

#[test]
fn bisect_keeping_inner_side_test(){
    let mut mesh = cube(Point3::origin(), 1.0);
    let section = mesh.bisect(&Point3::new(0.0,0.0,0.5), &Vector3::z(), false, true);

    assert!(mesh.vertices.iter().all(|p| p.z <= 0.5 + 1e-6));
    assert!(!mesh.is_closed());
    assert_eq!(sorted(&mesh.boundary_edges()), sorted(&section));
}

#[test]
fn bisect_missing_the_mesh_test(){
    let mut mesh = cube(Point3::origin(), 1.0);
    let section = mesh.bisect(&Point3::new(0.0,0.0,3.0), &Vector3::z(), true, true);
    assert!(section.is_empty());
    assert!(mesh.is_empty());

    let mut mesh = cube(Point3::origin(), 1.0);
    let section = mesh.bisect(&Point3::new(0.0,0.0,3.0), &Vector3::z(), false, true);
    assert!(section.is_empty());
    assert!(mesh.is_closed());
}

#[test]
fn fill_square_loop_test(){
    let (mut mesh,edges) = loops_mesh(&[square((0.0,0.0),1.0,1.0)]);
    let faces = mesh.fill_loop(&edges).unwrap();
    assert_eq!(faces.len(),2);
    for face in faces {
        assert!((mesh.faces[face].normal - Vector3::z()).norm() < 1e-6);
    }
}

#[test]
fn fill_rejects_bad_loops_test(){
    // bow tie, the two halves cancel out
    let bow_tie = vec![
        Point3::new(0.0,0.0,0.0),
        Point3::new(1.0,1.0,0.0),
        Point3::new(1.0,0.0,0.0),
        Point3::new(0.0,1.0,0.0),
    ];
    let (mut mesh,edges) = loops_mesh(&[bow_tie]);
    assert!(matches!(mesh.fill_loop(&edges), Err(SliceError::CapFailure{..})));

    let (mut mesh,edges) = loops_mesh(&[square((0.0,0.0),1.0,0.0)]);
    assert!(matches!(mesh.fill_loop(&edges[..3]), Err(SliceError::CapFailure{..})));
    assert!(matches!(mesh.fill_loop(&[Edge(0,1),Edge(1,2),Edge(0,2)]), Err(SliceError::CapFailure{..})));
    assert!(mesh.faces.is_empty());
}

#[test]
fn extrude_duplicates_shared_vertices_once_test(){
    let (mut mesh,edges) = loops_mesh(&[square((0.0,0.0),1.0,0.0)]);
    let result = mesh.extrude(&edges).unwrap();

    assert_eq!(result.vertices, vec![4,5,6,7]);
    assert_eq!(result.edges, vec![Edge(4,5),Edge(5,6),Edge(6,7),Edge(4,7)]);
    assert_eq!(mesh.vertices.len(),8);
    assert_eq!(mesh.faces.len(),4);
    assert!(result.edges.iter().all(|e| mesh.has_edge(e)));
    // the new boundary is open until it is capped
    assert_eq!(sorted(&mesh.boundary_edges()), sorted(&[edges.clone(),result.edges.clone()].concat()));
}

#[test]
fn extrude_rejects_bad_edges_test(){
    let (mut mesh,edges) = loops_mesh(&[square((0.0,0.0),1.0,0.0)]);
    assert!(matches!(mesh.extrude(&[Edge(0,2)]), Err(SliceError::ExtrudeFailure{..})));
    assert!(matches!(mesh.extrude(&[Edge(1,1)]), Err(SliceError::ExtrudeFailure{..})));
    assert!(matches!(mesh.extrude(&[edges[0],edges[1],edges[0]]), Err(SliceError::ExtrudeFailure{..})));
    assert_eq!(mesh.vertices.len(),4);
}

#[test]
fn recalculate_normals_fixes_flipped_faces_test(){
    let mut mesh = cube(Point3::origin(), 1.0);
    for i in [0,3,4,9] {
        mesh.faces[i].flip();
    }
    mesh.recalculate_normals();
    assert!((mesh.signed_volume()-1.0).abs() < 1e-6);

    let center = Point3::new(0.5,0.5,0.5);
    for face in mesh.faces.iter() {
        let p = mesh.vertices[face.vertices[0]];
        let q = mesh.vertices[face.vertices[1]];
        let r = mesh.vertices[face.vertices[2]];
        let face_center = Point3::from((p.coords+q.coords+r.coords)/3.0);
        assert!(face.normal.dot(&(face_center-center)) > 0.0, "face {:?} points inwards",face.vertices);
    }
}

#[test]
fn recalculate_normals_turns_inside_out_mesh_test(){
    let mut mesh = cube(Point3::new(2.0,2.0,2.0), 2.0);
    for face in mesh.faces.iter_mut() {
        face.flip();
    }
    assert!(mesh.signed_volume() < 0.0);
    mesh.recalculate_normals();
    assert!((mesh.signed_volume()-8.0).abs() < 1e-4);
}

#[test]
fn square_loop_becomes_closed_prism_test(){
    let (mut mesh,edges) = loops_mesh(&[square((0.0,0.0),2.0,0.0)]);
    let caps = build_disk(&mut mesh, &edges, &Vector3::new(0.0,0.0,0.5)).unwrap();

    assert_eq!((caps.bottom,caps.top,caps.truncated),(1,1,false));
    assert!(caps.is_sealed());
    assert_eq!(mesh.faces.len(),8);
    assert!(mesh.is_closed());
    assert!((mesh.signed_volume()-2.0).abs() < 1e-5);
}

#[test]
fn frame_cross_section_caps_both_loops_test(){
    let outer = square((0.0,0.0),3.0,0.0);
    let inner = square((1.0,1.0),1.0,0.0);
    let (mut mesh,edges) = loops_mesh(&[outer,inner]);
    let caps = build_disk(&mut mesh, &edges, &Vector3::new(0.0,0.0,0.25)).unwrap();

    assert_eq!((caps.bottom,caps.top),(2,2));
    assert!(mesh.is_closed());
    // each loop is capped on its own, the hole is filled as well
    assert!((mesh.signed_volume()-(9.0+1.0)*0.25).abs() < 1e-5);
}

#[test]
fn octahedron_disks_are_watertight_test(){
    let step = 0.2;
    for z in [-0.7f32,-0.2,0.0,0.4] {
        let mut mesh = octahedron();
        let boundary = mesh.bisect(&Point3::new(0.0,0.0,z), &Vector3::z(), true, true);
        assert_eq!(boundary.len(),4, "cross-section at z = {z}");
        let boundary_set:HashSet<Edge> = boundary.iter().copied().collect();

        let caps = build_disk(&mut mesh, &boundary, &Vector3::new(0.0,0.0,step)).unwrap();
        assert!(caps.is_sealed());
        assert!(mesh.is_closed(), "disk at z = {z} is not closed");

        // every original boundary edge borders one bottom cap triangle and one side quad
        for edge in boundary_set.iter() {
            let bordering:Vec<&Face> = mesh.faces.iter().filter(|f| f.edges().any(|e| e == *edge)).collect();
            assert_eq!(bordering.len(),2);
            assert_eq!(bordering.iter().filter(|f| f.vertices.len() == 3).count(),1);
        }

        let area = 2.0*(1.0-z.abs()).powi(2);
        assert!((mesh.signed_volume()-area*step).abs() < 1e-4, "volume of disk at z = {z}");
    }
}
