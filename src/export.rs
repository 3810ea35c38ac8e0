//! JSON manifest of a slicing run, listing every slice and the objects it produced.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SliceError;
use crate::geo::Axis;
use crate::scene::{Object, Scene};
use crate::slicer::{SliceRun, SliceStatus};

#[derive(Debug,Serialize,Deserialize)]
pub struct SceneObj{
    pub collection: String,
    pub name: String,
    pub location: [f32;3],
    pub vertices: Vec<[f32;3]>,
    pub edges: Vec<[usize;2]>,
    pub faces: Vec<Vec<usize>>,
    pub properties: BTreeMap<String,f32>,
}

impl SceneObj {
    pub fn from_object<T:Into<String>>(object:&Object, collection:T) -> Self {
        Self{
            collection: collection.into(),
            name: object.name.clone(),
            location: [object.location.x,object.location.y,object.location.z],
            vertices: object.mesh.vertices.iter().map(|p|[p.x,p.y,p.z]).collect(),
            edges: object.mesh.edges().iter().map(|e|[e.0,e.1]).collect(),
            faces: object.mesh.faces.iter().map(|f| f.vertices.clone()).collect(),
            properties: object.properties.clone(),
        }
    }
}

#[derive(Debug,Serialize,Deserialize)]
pub struct SliceEntry{
    pub index: usize,
    pub offset: f32,
    pub status: String,
    pub name: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug,Serialize,Deserialize)]
pub struct Manifest{
    pub source: String,
    pub axis: Axis,
    pub step: f32,
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<usize>,
    pub slices: Vec<SliceEntry>,
    pub objects: Vec<SceneObj>,
}

impl Manifest {
    pub fn new(run:&SliceRun, scene:&Scene) -> Self {
        let slices = run.outcomes.iter()
            .map(|outcome|{
                let (status,name,error) = match &outcome.status {
                    SliceStatus::Built(disk) => ("built", Some(disk.name.clone()), None),
                    SliceStatus::Empty(disk) => ("empty", Some(disk.name.clone()), None),
                    SliceStatus::Failed(error) => ("failed", None, Some(error.to_string())),
                };
                SliceEntry{ index:outcome.index, offset:outcome.offset, status:status.into(), name, error }
            })
            .collect();
        let objects = scene.collection_objects(&run.collection).into_iter()
            .map(|object| SceneObj::from_object(object, run.collection.clone()))
            .collect();
        Self{
            source: run.source.clone(),
            axis: run.axis,
            step: run.step,
            total: run.total(),
            succeeded: run.succeeded(),
            failed: run.failed_indices(),
            slices,
            objects,
        }
    }

    pub fn write<P:AsRef<Path>>(&self, path:P) -> Result<(),SliceError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
fn sliced_mixed_scene() -> (SliceRun,Scene) {
    use crate::settings::Settings;
    use crate::slicer::slice_model;
    use crate::slicer::test::{add_open_chain, scene_with, stacked_cubes};

    // slice 1 can not be capped, slice 3 falls between the cubes
    let mut mesh = stacked_cubes();
    add_open_chain(&mut mesh);
    let mut scene = scene_with("model", mesh);
    let run = slice_model(&mut scene, "model", &Settings{ step:0.5, ..Default::default() }).unwrap();
    (run,scene)
}

#[test]
fn manifest_lists_every_slice_test(){
    let (run,scene) = sliced_mixed_scene();
    let manifest = Manifest::new(&run, &scene);

    let statuses:Vec<&str> = manifest.slices.iter().map(|s| s.status.as_str()).collect();
    assert_eq!(statuses, vec!["built","failed","built","empty","built","built"]);
    assert_eq!(manifest.total,6);
    assert_eq!(manifest.succeeded,5);
    assert_eq!(manifest.failed, vec![1]);

    assert_eq!(manifest.slices[1].name, None);
    assert!(manifest.slices[1].error.as_deref().is_some_and(|e| e.starts_with("Cap failure")));
    assert_eq!(manifest.slices[3].name.as_deref(), Some("model-(3)"));
    assert_eq!(manifest.slices[3].error, None);

    // the failed slice has no object, the empty one keeps its place
    let names:Vec<&str> = manifest.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["model-(0)","model-(2)","model-(3)","model-(4)","model-(5)"]);
    assert!(manifest.objects[2].faces.is_empty());
    assert!(manifest.objects.iter().all(|o| o.collection == "Disks"));
}

#[test]
fn manifest_written_as_json_test(){
    let (run,scene) = sliced_mixed_scene();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    Manifest::new(&run, &scene).write(&path).unwrap();

    let read:Manifest = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
    assert_eq!(read.source,"model");
    assert_eq!(read.axis,Axis::Z);
    assert_eq!(read.slices.len(),6);
    assert_eq!(read.failed, vec![1]);
    let disk = scene.object("model-(0)").unwrap();
    assert_eq!(read.objects[0].vertices.len(), disk.mesh.vertices.len());
    assert_eq!(read.objects[0].faces.len(), disk.mesh.faces.len());
}
