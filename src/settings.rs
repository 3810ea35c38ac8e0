use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atlas::AtlasSettings;
use crate::error::SliceError;
use crate::geo::Axis;
use crate::metrics::ScaleFactor;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct Settings{
    /// The axis the slice planes are perpendicular to
    pub axis: Axis,

    /// [units] Distance between slice planes, which is also the disk thickness
    pub step: f32,

    /// [cm] Disk thickness in physical units. Overrides `step` when set,
    /// converted with the scale reference
    pub physical_step: Option<f32>,

    /// Wether to arrange the disks on a grid after slicing
    pub build_atlas: bool,

    /// Name of the collection that receives the disks.
    /// WARNING: objects already in this collection are deleted at the start of a run
    pub collection: String,

    pub atlas: AtlasSettings,

    /// Physical size of the model, used for metrics and the scale legend
    pub scale: Option<ScaleReference>,
}

/// A physical length in cm and the model length in units it corresponds to.
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct ScaleReference{
    pub physical: f32,
    pub units: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self{
            axis: Axis::Z,
            step: 0.1,
            physical_step: None,
            build_atlas: false,
            collection: "Disks".into(),
            atlas: AtlasSettings::default(),
            scale: None,
        }
    }
}

impl Settings {
    pub fn from_json_file<P:AsRef<Path>>(path:P) -> Result<Self,SliceError> {
        let file = File::open(path)?;
        let settings:Settings = serde_json::from_reader(BufReader::new(file))?;
        Ok(settings)
    }

    pub fn scale_factor(&self) -> Result<ScaleFactor,SliceError> {
        match self.scale {
            Some(reference) => ScaleFactor::new(reference.physical, reference.units),
            None => Ok(ScaleFactor::identity()),
        }
    }

    /// The step in model units.
    pub fn effective_step(&self) -> Result<f32,SliceError> {
        match self.physical_step {
            Some(physical) => Ok(self.scale_factor()?.to_units(physical)),
            None => Ok(self.step),
        }
    }

    pub fn validate(&self) -> Result<(),SliceError> {
        self.scale_factor()?;
        let step = self.effective_step()?;
        if !step.is_finite() || step <= 0.0 {
            return Err(SliceError::InvalidParameter(format!("step must be positive, got {step}")))
        }
        if self.build_atlas {
            if self.atlas.row_width == 0 {
                return Err(SliceError::InvalidParameter("atlas row width must be at least 1".into()))
            }
            if !self.atlas.col_spacing.is_finite() || !self.atlas.row_spacing.is_finite() {
                return Err(SliceError::InvalidParameter("atlas spacing must be finite".into()))
            }
        }
        if self.collection.is_empty() {
            return Err(SliceError::InvalidParameter("collection name is empty".into()))
        }
        Ok(())
    }
}

#[test]
fn settings_from_partial_json_test(){
    let settings:Settings = serde_json::from_str(r#"{
        "axis": "x",
        "step": 0.25,
        "build_atlas": true,
        "atlas": { "row_width": 4 }
    }"#).unwrap();
    assert_eq!(settings.axis, Axis::X);
    assert_eq!(settings.step, 0.25);
    assert_eq!(settings.atlas.row_width, 4);
    assert_eq!(settings.atlas.col_spacing, AtlasSettings::default().col_spacing);
    assert_eq!(settings.collection, "Disks");
    assert!(settings.validate().is_ok());
}

#[test]
fn physical_step_is_converted_test(){
    let settings = Settings{
        physical_step: Some(0.2),
        scale: Some(ScaleReference{ physical:17.0, units:1.7 }),
        ..Default::default()
    };
    assert!((settings.effective_step().unwrap() - 0.02).abs() < 1e-6);
}

#[test]
fn invalid_settings_test(){
    let zero_step = Settings{ step:0.0, ..Default::default() };
    assert!(matches!(zero_step.validate(), Err(SliceError::InvalidParameter(_))));

    let zero_width = Settings{
        build_atlas: true,
        atlas: AtlasSettings{ row_width:0, ..Default::default() },
        ..Default::default()
    };
    assert!(matches!(zero_width.validate(), Err(SliceError::InvalidParameter(_))));

    let bad_scale = Settings{ scale:Some(ScaleReference{ physical:0.0, units:1.0 }), physical_step:Some(1.0), ..Default::default() };
    assert!(matches!(bad_scale.validate(), Err(SliceError::InvalidParameter(_))));
}

#[test]
fn settings_from_json_file_test(){
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{
        "axis": "Y",
        "physical_step": 0.5,
        "collection": "Slices",
        "scale": { "physical": 20.0, "units": 2.0 }
    }"#).unwrap();

    let settings = Settings::from_json_file(&path).unwrap();
    assert_eq!(settings.axis, Axis::Y);
    assert_eq!(settings.collection, "Slices");
    assert_eq!(settings.scale, Some(ScaleReference{ physical:20.0, units:2.0 }));
    assert!((settings.effective_step().unwrap() - 0.05).abs() < 1e-6);
    assert!(settings.validate().is_ok());

    std::fs::write(&path, "{ \"step\": ").unwrap();
    assert!(matches!(Settings::from_json_file(&path), Err(SliceError::Config(_))));
    assert!(matches!(Settings::from_json_file(dir.path().join("missing.json")), Err(SliceError::Io(_))));
}
