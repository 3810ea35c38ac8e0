use nalgebra::{Point3, Vector3};

use super::*;
use crate::atlas::place;
use crate::bounds::SlicePlan;
use crate::mesh::test::cube;
use crate::mesh::{Edge, Mesh};
use crate::scene::{SCALE_PROPERTY, SCALE_REFERENCE};
use crate::settings::ScaleReference;

/// Unit cubes spanning z = 0..1 and z = 2..3.
pub(crate) fn stacked_cubes() -> Mesh {
    let mut mesh = cube(Point3::origin(), 1.0);
    let upper = cube(Point3::new(0.0,0.0,2.0), 1.0);
    let offset = mesh.vertices.len();
    mesh.vertices.extend(upper.vertices.iter().copied());
    for face in upper.faces.iter() {
        mesh.add_face(face.vertices.iter().map(|v| v+offset).collect());
    }
    mesh
}

/// Adds an open chain of loose edges in the plane z = 0.5, away from the rest
/// of the mesh. A slice through it can not be capped.
pub(crate) fn add_open_chain(mesh:&mut Mesh) {
    let a = mesh.add_vertex(Point3::new(5.0,0.0,0.5));
    let b = mesh.add_vertex(Point3::new(6.0,0.0,0.5));
    let c = mesh.add_vertex(Point3::new(6.0,1.0,0.5));
    mesh.add_edge(Edge::new(a,b));
    mesh.add_edge(Edge::new(b,c));
}

pub(crate) fn scene_with(name:&str, mesh:Mesh) -> Scene {
    let mut scene = Scene::new();
    scene.add_object(Object::new(name, mesh));
    scene
}

#[test]
fn cube_slices_into_closed_disks_test(){
    let mut cube_object = Object::new("cube", cube(Point3::origin(), 1.0));
    cube_object.location = Vector3::new(3.0,0.0,0.0);
    let mut scene = Scene::new();
    scene.add_object(cube_object);

    let settings = Settings{ step:0.25, ..Default::default() };
    let run = slice_model(&mut scene, "cube", &settings).unwrap();

    assert_eq!(run.total(),4);
    assert_eq!(run.succeeded(),4);
    assert!(run.failed_indices().is_empty());
    assert!(run.atlas.is_none());

    let names:Vec<&str> = scene.collection_objects("Disks").iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["cube-(0)","cube-(1)","cube-(2)","cube-(3)"]);

    for (i,object) in scene.collection_objects("Disks").into_iter().enumerate() {
        assert!(object.mesh.is_closed(), "{} is not closed",object.name);
        assert!((object.mesh.signed_volume()-0.25).abs() < 1e-4);
        let bounds = object.world_bounds().unwrap();
        assert!((bounds.min.z - 0.25*i as f32).abs() < 1e-5);
        assert!((bounds.max.z - 0.25*(i+1) as f32).abs() < 1e-5);
        // the source transform is baked into the disks
        assert!((bounds.min.x - 3.0).abs() < 1e-5);
    }
}

#[test]
fn slicing_along_x_test(){
    let mut scene = scene_with("cube", cube(Point3::new(-1.0,0.0,0.0), 2.0));
    let settings = Settings{ axis:Axis::X, step:0.5, ..Default::default() };
    let run = slice_model(&mut scene, "cube", &settings).unwrap();

    assert_eq!(run.total(),4);
    let first = scene.object("cube-(0)").unwrap();
    let bounds = first.world_bounds().unwrap();
    assert!((bounds.min.x + 1.0).abs() < 1e-5);
    assert!((bounds.max.x + 0.5).abs() < 1e-5);
    assert!(first.mesh.is_closed());
}

#[test]
fn missing_source_test(){
    let mut scene = scene_with("cube", cube(Point3::origin(), 1.0));
    let result = slice_model(&mut scene, "sphere", &Settings::default());
    assert!(matches!(result, Err(SliceError::ObjectNotFound(_))));
    assert!(scene.collection("Disks").is_none());
}

#[test]
fn bad_step_test(){
    let mut scene = scene_with("cube", cube(Point3::origin(), 1.0));
    for step in [0.0,-0.25] {
        let settings = Settings{ step, ..Default::default() };
        assert!(matches!(slice_model(&mut scene, "cube", &settings), Err(SliceError::InvalidParameter(_))));
    }
    assert!(scene.collection("Disks").is_none());
}

#[test]
fn rerun_replaces_previous_disks_test(){
    let mut scene = scene_with("cube", cube(Point3::origin(), 1.0));
    slice_model(&mut scene, "cube", &Settings{ step:0.25, ..Default::default() }).unwrap();
    let run = slice_model(&mut scene, "cube", &Settings{ step:0.5, ..Default::default() }).unwrap();

    assert_eq!(run.total(),2);
    assert_eq!(scene.collection_objects("Disks").len(),2);
    assert!(scene.object("cube-(2)").is_err());
    // names are not suffixed, the old disks are gone
    assert!(scene.object("cube-(0).001").is_err());
}

#[test]
fn plane_in_gap_gives_empty_disk_test(){
    let mut scene = scene_with("model", stacked_cubes());

    let run = slice_model(&mut scene, "model", &Settings{ step:0.5, ..Default::default() }).unwrap();
    assert_eq!(run.total(),6);
    assert_eq!(run.succeeded(),6);
    assert_eq!(run.empty(),1);
    assert!(matches!(run.outcomes[3].status, SliceStatus::Empty(_)));

    // the empty disk keeps its place in the collection
    let objects = scene.collection_objects("Disks");
    assert_eq!(objects.len(),6);
    assert_eq!(objects[3].name,"model-(3)");
    assert!(objects[3].mesh.is_empty());
    assert!(objects[4].mesh.is_closed());
}

#[test]
fn failed_slice_is_recorded_and_skipped_test(){
    let mut mesh = cube(Point3::origin(), 1.0);
    add_open_chain(&mut mesh);
    let mut scene = scene_with("model", mesh);

    let run = slice_model(&mut scene, "model", &Settings{ step:0.5, ..Default::default() }).unwrap();
    assert_eq!(run.total(),2);
    assert_eq!(run.failed_indices(), vec![1]);
    assert!(matches!(run.outcomes[1].status, SliceStatus::Failed(SliceError::CapFailure{..})));
    assert!(run.outcomes[1].disk().is_none());

    let names:Vec<&str> = scene.collection_objects("Disks").iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["model-(0)"]);
}

#[test]
fn empty_source_gives_no_slices_test(){
    let mut scene = scene_with("nothing", Mesh::new());
    let run = slice_model(&mut scene, "nothing", &Settings::default()).unwrap();
    assert_eq!(run.total(),0);
    assert!(scene.collection("Disks").unwrap().objects.is_empty());
}

#[test]
fn atlas_places_disks_and_sets_scale_test(){
    let mut scene = scene_with("cube", cube(Point3::origin(), 1.0));
    scene.add_object(Object::new(SCALE_REFERENCE, Mesh::new()));
    let settings = Settings{
        step: 0.0625,
        build_atlas: true,
        scale: Some(ScaleReference{ physical:17.0, units:1.7 }),
        ..Default::default()
    };
    let run = slice_model(&mut scene, "cube", &settings).unwrap();

    assert_eq!(run.total(),16);
    let atlas = run.atlas.as_ref().unwrap();
    assert_eq!(atlas.len(),16);
    let last = atlas.get(15).unwrap();
    assert_eq!((last.row,last.col),(1,0));

    for (i,object) in scene.collection_objects("Disks").into_iter().enumerate() {
        assert_eq!(object.location, place(i, Axis::Z, &settings.atlas).position.coords);
    }
    let scale = scene.object(SCALE_REFERENCE).unwrap().properties[SCALE_PROPERTY];
    assert!((scale-10.0).abs() < 1e-4);
}

#[test]
fn build_slice_outside_the_mesh_test(){
    let source = Object::new("cube", cube(Point3::origin(), 1.0));
    let plan = SlicePlan::new(Axis::Z, 1.0, 5.0, 6.0).unwrap();
    let (object,disk) = build_slice(&source, &plan, 0).unwrap();
    assert!(disk.caps.is_empty());
    assert_eq!(disk.name,"cube-(0)");
    assert!(object.mesh.is_empty());

    assert!(matches!(build_slice(&source, &plan, 1), Err(SliceError::InvalidParameter(_))));
}

#[test]
fn atlas_skips_failed_slices_test(){
    let mut mesh = stacked_cubes();
    add_open_chain(&mut mesh);
    let mut scene = scene_with("model", mesh);
    let settings = Settings{ step:0.5, build_atlas:true, ..Default::default() };
    let run = slice_model(&mut scene, "model", &settings).unwrap();
    assert_eq!(run.failed_indices(), vec![1]);

    // cells follow the collection, disk 2 takes the cell after disk 0
    let atlas = run.atlas.as_ref().unwrap();
    assert_eq!(atlas.len(),5);
    let second = atlas.get(1).unwrap();
    assert_eq!((second.index,second.col),(1,1));
    assert_eq!(scene.object("model-(2)").unwrap().location, second.position.coords);
    let disk_indices:Vec<usize> = run.disks().map(|d| d.index).collect();
    assert_eq!(disk_indices, vec![0,2,3,4,5]);
}
