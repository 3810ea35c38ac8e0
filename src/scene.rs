//! A minimal object store: named mesh objects grouped into ordered collections.

use std::collections::BTreeMap;

use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::SliceError;
use crate::geo::Aabb;
use crate::mesh::Mesh;

/// Name of the legend object whose `"Scale"` property shows the physical scale.
pub const SCALE_REFERENCE: &str = "scale_reference";
pub const SCALE_PROPERTY: &str = "Scale";

#[derive(Debug,Clone,Default,PartialEq)]
pub struct Object{
    pub name: String,
    pub mesh: Mesh,
    /// Translation from object space to world space
    pub location: Vector3<f32>,
    /// Free form numeric parameters, shader inputs of the object for example
    pub properties: BTreeMap<String,f32>,
}

impl Object {
    pub fn new<T:Into<String>>(name:T, mesh:Mesh) -> Self {
        Self{ name:name.into(), mesh, ..Default::default() }
    }
    /// Copy of the object with its own copy of the mesh.
    pub fn duplicate<T:Into<String>>(&self, name:T) -> Self {
        Self{ name:name.into(), ..self.clone() }
    }
    /// Bakes the location into the mesh, leaving the object at the origin.
    pub fn apply_transform(&mut self) {
        let location = self.location;
        self.mesh.translate(&location);
        self.location = Vector3::zeros();
    }
    /// Bounding box in world space.
    pub fn world_bounds(&self) -> Option<Aabb> {
        Some(self.mesh.bounds()?.translated(&self.location))
    }
}

#[derive(Debug,Clone,Default,PartialEq)]
pub struct Collection{
    pub name: String,
    /// Object names in link order
    pub objects: Vec<String>,
}

#[derive(Debug,Clone,Default)]
pub struct Scene{
    objects: Vec<Object>,
    collections: Vec<Collection>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the object, renaming it `name.001`, `name.002`, .. if the name is taken.
    /// Returns the name it was stored under.
    pub fn add_object(&mut self, mut object:Object) -> String {
        if self.position(&object.name).is_some() {
            let base = object.name.clone();
            let mut n = 1;
            while self.position(&format!("{base}.{n:03}")).is_some() { n += 1 }
            object.name = format!("{base}.{n:03}");
            debug!("object name '{base}' is taken, renamed to '{}'",object.name);
        }
        let name = object.name.clone();
        self.objects.push(object);
        name
    }

    pub fn object(&self, name:&str) -> Result<&Object,SliceError> {
        self.objects.iter()
            .find(|o| o.name == name)
            .ok_or_else(|| SliceError::ObjectNotFound(name.into()))
    }

    pub fn object_mut(&mut self, name:&str) -> Result<&mut Object,SliceError> {
        self.objects.iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| SliceError::ObjectNotFound(name.into()))
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    /// Adds a copy of `source` named `name` and returns the name it was stored under.
    pub fn duplicate_object(&mut self, source:&str, name:&str) -> Result<String,SliceError> {
        let copy = self.object(source)?.duplicate(name);
        Ok(self.add_object(copy))
    }

    /// Removes the object from the scene and from every collection.
    pub fn remove_object(&mut self, name:&str) -> Option<Object> {
        let i = self.position(name)?;
        for collection in self.collections.iter_mut() {
            collection.objects.retain(|o| o != name);
        }
        Some(self.objects.remove(i))
    }

    /// Returns an empty collection named `name`. An existing collection of that
    /// name is emptied and the objects it held are deleted.
    pub fn create_collection(&mut self, name:&str) -> &mut Collection {
        match self.collections.iter().position(|c| c.name == name) {
            Some(i) => {
                let stale = std::mem::take(&mut self.collections[i].objects);
                if !stale.is_empty() {
                    debug!("clearing {} objects from collection '{name}'",stale.len());
                }
                for object in stale {
                    self.remove_object(&object);
                }
                &mut self.collections[i]
            },
            None => {
                self.collections.push(Collection{ name:name.into(), objects:Vec::new() });
                let last = self.collections.len() - 1;
                &mut self.collections[last]
            }
        }
    }

    pub fn collection(&self, name:&str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn link(&mut self, collection:&str, object:&str) -> Result<(),SliceError> {
        if self.position(object).is_none() {
            return Err(SliceError::ObjectNotFound(object.into()))
        }
        let collection = self.collections.iter_mut()
            .find(|c| c.name == collection)
            .ok_or_else(|| SliceError::ObjectNotFound(format!("collection {collection}")))?;
        if !collection.objects.iter().any(|o| o == object) {
            collection.objects.push(object.into());
        }
        Ok(())
    }

    /// Objects of the collection in link order.
    pub fn collection_objects(&self, name:&str) -> Vec<&Object> {
        let Some(collection) = self.collection(name) else { return vec![] };
        collection.objects.iter()
            .filter_map(|o| self.object(o).ok())
            .collect()
    }

    pub fn collection_objects_mut(&mut self, name:&str) -> Vec<&mut Object> {
        let Some(collection) = self.collections.iter().find(|c| c.name == name) else { return vec![] };
        let names = &collection.objects;
        let mut objects:Vec<&mut Object> = self.objects.iter_mut()
            .filter(|o| names.contains(&o.name))
            .collect();
        objects.sort_by_key(|o| names.iter().position(|n| *n == o.name));
        objects
    }

    /// Propagates the physical scale to the legend object, returns false if there is none.
    pub fn set_scale_reference(&mut self, value:f32) -> bool {
        match self.object_mut(SCALE_REFERENCE) {
            Ok(legend) => {
                legend.properties.insert(SCALE_PROPERTY.into(), value);
                true
            },
            Err(_) => {
                warn!("no scale reference object found");
                false
            }
        }
    }

    fn position(&self, name:&str) -> Option<usize> {
        self.objects.iter().position(|o| o.name == name)
    }
}

#[test]
fn create_collection_clears_previous_run_test(){
    let mut scene = Scene::new();
    scene.add_object(Object::new("model",Mesh::new()));
    scene.create_collection("Disks");
    scene.duplicate_object("model","model-(0)").unwrap();
    scene.link("Disks","model-(0)").unwrap();
    assert_eq!(scene.collection_objects("Disks").len(),1);

    scene.create_collection("Disks");
    assert!(scene.collection_objects("Disks").is_empty());
    assert!(matches!(scene.object("model-(0)"), Err(SliceError::ObjectNotFound(_))));
    assert!(scene.object("model").is_ok());
}

#[test]
fn add_object_renames_duplicates_test(){
    let mut scene = Scene::new();
    assert_eq!(scene.add_object(Object::new("a",Mesh::new())),"a");
    assert_eq!(scene.add_object(Object::new("a",Mesh::new())),"a.001");
    assert_eq!(scene.add_object(Object::new("a",Mesh::new())),"a.002");
}

#[test]
fn scale_reference_property_test(){
    let mut scene = Scene::new();
    assert!(!scene.set_scale_reference(2.0));
    scene.add_object(Object::new(SCALE_REFERENCE,Mesh::new()));
    assert!(scene.set_scale_reference(2.0));
    assert_eq!(scene.object(SCALE_REFERENCE).unwrap().properties[SCALE_PROPERTY],2.0);
}
