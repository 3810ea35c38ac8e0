//! Arranging disks on a flat grid for comparison or fabrication.

use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::geo::Axis;
use crate::scene::Scene;

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct AtlasSettings{
    /// [int] Number of disks per row
    pub row_width: usize,
    /// [units] Distance between neighbouring columns
    pub col_spacing: f32,
    /// [units] Distance between neighbouring rows
    pub row_spacing: f32,
}

impl Default for AtlasSettings {
    fn default() -> Self {
        Self{
            row_width: 15,
            col_spacing: 0.45,
            row_spacing: 0.85,
        }
    }
}

impl AtlasSettings {
    /// Fewer, taller columns for models with wide cross-sections.
    pub fn compact() -> Self {
        Self{
            row_width: 11,
            col_spacing: 0.4,
            row_spacing: 1.05,
        }
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Placement{
    /// Position in the laid out collection. This is not [`crate::disk::Disk::index`],
    /// the two differ after a failed slice since failed slices are not linked
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub position: Point3<f32>,
}

/// Grid cells of the objects of a collection, in link order. Failed slices are
/// never linked and take no cell.
#[derive(Debug,Clone,Default,PartialEq)]
pub struct AtlasLayout{
    /// One placement per disk, in disk order
    pub placements: Vec<Placement>,
}

impl AtlasLayout {
    pub fn len(&self) -> usize {
        self.placements.len()
    }
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
    pub fn get(&self, index:usize) -> Option<&Placement> {
        self.placements.get(index)
    }
}

/// Grid cell and position of the disk at `index`. Column and row run along the
/// two axes perpendicular to the slicing axis, the slicing axis coordinate is 0.
pub fn place(index:usize, axis:Axis, settings:&AtlasSettings) -> Placement {
    let row_width = settings.row_width.max(1);
    let col = index % row_width;
    let row = index / row_width;

    let [col_axis,row_axis] = axis.in_plane();
    let mut position = Point3::origin();
    position[col_axis.index()] = col as f32 * settings.col_spacing;
    position[row_axis.index()] = row as f32 * settings.row_spacing;

    Placement{ index, row, col, position }
}

/// Layout of `count` disks. Only depends on the index of a disk, so a longer
/// layout keeps the placement of every disk of a shorter one.
pub fn layout(count:usize, axis:Axis, settings:&AtlasSettings) -> AtlasLayout {
    AtlasLayout{
        placements: (0..count).map(|i| place(i, axis, settings)).collect()
    }
}

/// Lays out the objects of `collection` in link order and moves them into place.
pub fn apply_layout(scene:&mut Scene, collection:&str, axis:Axis, settings:&AtlasSettings) -> AtlasLayout {
    let mut objects = scene.collection_objects_mut(collection);
    let atlas = layout(objects.len(), axis, settings);
    for (object,placement) in objects.iter_mut().zip(atlas.placements.iter()) {
        object.location = placement.position.coords;
    }
    debug!("placed {} disks of '{collection}' in {} rows",atlas.len(),atlas.placements.last().map_or(0,|p| p.row+1));
    atlas
}

#[test]
fn atlas_scenario_test(){
    let settings = AtlasSettings::default();
    let atlas = layout(16, Axis::Z, &settings);
    assert_eq!(atlas.len(),16);
    let first = atlas.get(0).unwrap();
    assert_eq!((first.row,first.col),(0,0));
    let last = atlas.get(15).unwrap();
    assert_eq!((last.row,last.col),(1,0));
    assert_eq!(last.position, Point3::new(0.0,0.85,0.0));
}

#[test]
fn atlas_prefix_stability_test(){
    let settings = AtlasSettings::compact();
    for axis in Axis::ALL {
        for k in 0..30 {
            let short = layout(k, axis, &settings);
            let long = layout(k+1, axis, &settings);
            assert_eq!(&long.placements[..k], &short.placements[..]);
        }
    }
}

#[test]
fn atlas_embedding_per_axis_test(){
    let settings = AtlasSettings{ row_width:2, col_spacing:1.0, row_spacing:10.0 };
    // disk 3 sits in row 1, column 1
    assert_eq!(place(3, Axis::X, &settings).position, Point3::new( 0.0, 1.0,10.0));
    assert_eq!(place(3, Axis::Y, &settings).position, Point3::new( 1.0, 0.0,10.0));
    assert_eq!(place(3, Axis::Z, &settings).position, Point3::new( 1.0,10.0, 0.0));
}

#[test]
fn atlas_cells_are_unique_test(){
    let atlas = layout(40, Axis::Y, &AtlasSettings::default());
    let mut cells:Vec<(usize,usize)> = atlas.placements.iter().map(|p|(p.row,p.col)).collect();
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(),40);
    assert!(layout(0, Axis::Y, &AtlasSettings::default()).is_empty());
}
