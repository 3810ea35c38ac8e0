use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use nalgebra::{Point3, Vector3};
use stl_io::{self, IndexedMesh, Triangle, Vector};

use crate::error::SliceError;
use crate::mesh::{newell_normal, Mesh};
use crate::scene::{Object, Scene};

pub fn read_mesh<P:AsRef<Path>>(path:P) -> Result<Mesh,SliceError> {
    let file = File::open(&path)?;
    let mut reader = BufReader::new(file);
    let stl = stl_io::read_stl(&mut reader)?;
    let mesh = mesh_from_indexed(&stl)?;
    info!("loaded {} with {} vertices and {} faces",path.as_ref().display(),mesh.vertices.len(),mesh.faces.len());
    if !mesh.is_closed() {
        warn!("{} is not a closed mesh, slices through open regions can not be capped",path.as_ref().display());
    }
    Ok(mesh)
}

pub fn mesh_from_indexed(stl:&IndexedMesh) -> Result<Mesh,SliceError> {
    let vertices = stl.vertices.iter()
        .map(|v| Point3::new(v[0],v[1],v[2]))
        .collect();
    let faces = stl.faces.iter()
        .map(|tri| tri.vertices.to_vec())
        .filter(|tri| tri[0] != tri[1] && tri[1] != tri[2] && tri[2] != tri[0])
        .collect();
    Mesh::from_faces(vertices, faces)
}

/// Triangles of the object in world space.
pub fn object_triangles(object:&Object) -> Vec<Triangle> {
    let world = |v:usize| object.mesh.vertices[v] + object.location;
    object.mesh.triangles().into_iter()
        .map(|[a,b,c]|{
            let points = [world(a),world(b),world(c)];
            let normal = newell_normal(&points).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros);
            Triangle{
                normal: Vector::new([normal.x,normal.y,normal.z]),
                vertices: points.map(|p| Vector::new([p.x,p.y,p.z])),
            }
        })
        .collect()
}

pub fn write_object<P:AsRef<Path>>(object:&Object, path:P) -> Result<(),SliceError> {
    let triangles = object_triangles(object);
    let mut writer = BufWriter::new(File::create(&path)?);
    stl_io::write_stl(&mut writer, triangles.iter())?;
    debug!("wrote {} triangles to {}",triangles.len(),path.as_ref().display());
    Ok(())
}

/// Writes every non empty object of the collection to `<dir>/<name>.stl`.
pub fn export_collection<P:AsRef<Path>>(scene:&Scene, collection:&str, dir:P) -> Result<Vec<PathBuf>,SliceError> {
    fs::create_dir_all(&dir)?;
    let mut written = Vec::new();
    for object in scene.collection_objects(collection) {
        if object.mesh.faces.is_empty() {
            debug!("skipping empty object {}",object.name);
            continue
        }
        let path = dir.as_ref().join(format!("{}.stl",object.name));
        write_object(object, &path)?;
        written.push(path);
    }
    Ok(written)
}

#[test]
fn mesh_from_indexed_test(){
    use stl_io::IndexedTriangle;
    let stl = IndexedMesh{
        vertices: vec![
            Vector::new([0.0,0.0,0.0]),
            Vector::new([1.0,0.0,0.0]),
            Vector::new([0.0,1.0,0.0]),
            Vector::new([0.0,0.0,1.0]),
        ],
        faces: [[0,2,1],[0,1,3],[1,2,3],[0,3,2]].into_iter()
            .map(|vertices| IndexedTriangle{ normal:Vector::new([0.0,0.0,0.0]), vertices })
            .collect(),
    };
    let mesh = mesh_from_indexed(&stl).unwrap();
    assert_eq!(mesh.faces.len(),4);
    assert_eq!(mesh.edges().len(),6);
    assert!(mesh.is_closed());
}

#[test]
fn export_collection_skips_empty_disks_test(){
    use crate::settings::Settings;
    use crate::slicer::slice_model;
    use crate::slicer::test::{scene_with, stacked_cubes};

    // slice 3 falls between the cubes and has no geometry
    let mut scene = scene_with("model", stacked_cubes());
    let run = slice_model(&mut scene, "model", &Settings{ step:0.5, ..Default::default() }).unwrap();
    assert_eq!(run.empty(),1);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("disks");
    let written = export_collection(&scene, &run.collection, &out).unwrap();
    assert_eq!(written.len(),5);
    assert!(!out.join("model-(3).stl").exists());

    for path in written {
        let name = path.file_stem().unwrap().to_string_lossy().into_owned();
        let disk = scene.object(&name).unwrap();
        let mut reader = BufReader::new(File::open(&path).unwrap());
        let stl = stl_io::read_stl(&mut reader).unwrap();
        assert_eq!(stl.faces.len(), disk.mesh.triangles().len(), "{name}");
        assert!(!stl.faces.is_empty());
    }
}

#[test]
fn read_mesh_from_written_object_test(){
    use crate::mesh::test::cube;

    let mut object = Object::new("cube", cube(Point3::origin(), 1.0));
    object.location = Vector3::new(0.0,0.0,2.0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cube.stl");
    write_object(&object, &path).unwrap();

    let mesh = read_mesh(&path).unwrap();
    assert_eq!(mesh.faces.len(),12);
    assert!(mesh.is_closed());
    let bounds = mesh.bounds().unwrap();
    assert!((bounds.min.z-2.0).abs() < 1e-6);
    assert!((mesh.signed_volume()-1.0).abs() < 1e-5);
}
