use std::fmt::{self, Display, Formatter};

use crate::bounds::axis_extent;
use crate::error::SliceError;
use crate::geo::Axis;
use crate::scene::Object;

/// Conversion between model units and physical centimetres.
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct ScaleFactor{
    physical_to_units: f32,
    units_to_physical: f32,
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::identity()
    }
}

impl ScaleFactor {
    pub fn identity() -> Self {
        Self{ physical_to_units:1.0, units_to_physical:1.0 }
    }

    /// Scale at which a physical length of `physical` cm is `units` model units long.
    pub fn new(physical:f32, units:f32) -> Result<Self,SliceError> {
        let valid = |x:f32| x.is_finite() && x > 0.0;
        if !valid(physical) || !valid(units) {
            return Err(SliceError::InvalidParameter(
                format!("scale reference needs two positive lengths, got {physical}cm = {units}u")
                ))
        }
        let physical_to_units = units / physical;
        Ok(Self{ physical_to_units, units_to_physical: 1.0 / physical_to_units })
    }

    pub fn physical_to_units(&self) -> f32 {
        self.physical_to_units
    }
    pub fn units_to_physical(&self) -> f32 {
        self.units_to_physical
    }
    /// Model length of a physical length in cm.
    pub fn to_units(&self, physical:f32) -> f32 {
        physical * self.physical_to_units
    }
    /// Physical length in cm of a model length.
    pub fn to_physical(&self, units:f32) -> f32 {
        units * self.units_to_physical
    }
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct AxisMetrics{
    pub axis: Axis,
    pub min: f32,
    pub max: f32,
    /// [units]
    pub length: f32,
    /// [cm]
    pub physical_length: f32,
}

impl Display for AxisMetrics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f,"length in {} axis is {}u ({} to {}) ({}cm)",
            self.axis, self.length, self.min, self.max, self.physical_length)
    }
}

pub fn axis_metrics(object:&Object, axis:Axis, scale:&ScaleFactor) -> Option<AxisMetrics> {
    let (min,max) = axis_extent(object, axis)?;
    let length = max - min;
    Some(AxisMetrics{ axis, min, max, length, physical_length: scale.to_physical(length) })
}

/// Metrics along X, Y and Z, empty for an object without vertices.
pub fn object_metrics(object:&Object, scale:&ScaleFactor) -> Vec<AxisMetrics> {
    Axis::ALL.iter()
        .filter_map(|axis| axis_metrics(object, *axis, scale))
        .collect()
}

#[test]
fn scale_round_trip_test(){
    let scale = ScaleFactor::new(17.0, 1.1769512).unwrap();
    assert!((scale.physical_to_units() * scale.units_to_physical() - 1.0).abs() < 1e-6);
    for x in [0.0, 0.2, 0.37, 17.0, 250.0] {
        assert!((scale.to_physical(scale.to_units(x)) - x).abs() <= 1e-5 * x.max(1.0));
    }
    assert!((scale.to_units(17.0) - 1.1769512).abs() < 1e-6);
}

#[test]
fn scale_rejects_non_positive_lengths_test(){
    assert!(ScaleFactor::new(0.0, 1.0).is_err());
    assert!(ScaleFactor::new(1.0, -2.0).is_err());
    assert_eq!(ScaleFactor::default(), ScaleFactor::identity());
}
