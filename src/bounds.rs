use log::info;
use nalgebra::{Point3, Vector3};

use crate::error::SliceError;
use crate::geo::Axis;
use crate::scene::Object;

/// Positions of the slice planes along one axis, strictly increasing.
#[derive(Debug,Clone,PartialEq)]
pub struct SlicePlan{
    pub axis: Axis,
    pub step: f32,
    pub min_bound: f32,
    pub max_bound: f32,
    offsets: Vec<f32>,
}

impl SlicePlan {
    /// The plan for the range `[min_bound, max_bound]`. The last plane may lie
    /// up to one step short of `max_bound`, so the last disk can reach past it.
    pub fn new(axis:Axis, step:f32, min_bound:f32, max_bound:f32) -> Result<Self,SliceError> {
        if !(step > 0.0) || !step.is_finite() {
            return Err(SliceError::InvalidParameter(format!("step must be positive, got {step}")))
        }
        let length = max_bound - min_bound;
        let count = (length.abs() / step).ceil() as usize;
        let offsets = (0..count).map(|i| min_bound + i as f32 * step).collect();
        Ok(Self{ axis, step, min_bound, max_bound, offsets })
    }

    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }
    pub fn len(&self) -> usize {
        self.offsets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
    pub fn length(&self) -> f32 {
        self.max_bound - self.min_bound
    }
    /// World space point and normal of the `index`-th plane.
    pub fn plane(&self, index:usize) -> Option<(Point3<f32>,Vector3<f32>)> {
        let offset = *self.offsets.get(index)?;
        Some((Point3::from(self.axis.along(offset)), self.axis.unit()))
    }
    /// Displacement from the bottom to the top of a disk.
    pub fn extrude_vector(&self) -> Vector3<f32> {
        self.axis.along(self.step)
    }
}

/// World space range covered by the object along `axis`, None for an empty mesh.
pub fn axis_extent(object:&Object, axis:Axis) -> Option<(f32,f32)> {
    let bounds = object.world_bounds()?;
    Some((bounds.min_on(axis), bounds.max_on(axis)))
}

/// Slice plan covering the object along `axis` with planes `step` apart.
/// An empty mesh or a mesh flat along `axis` gives an empty plan.
pub fn compute_slice_plan(object:&Object, axis:Axis, step:f32) -> Result<SlicePlan,SliceError> {
    let (min_bound,max_bound) = axis_extent(object, axis).unwrap_or((0.0,0.0));
    let plan = SlicePlan::new(axis, step, min_bound, max_bound)?;
    info!("total length: {}u with {} disks",plan.length(),plan.len());
    Ok(plan)
}

#[test]
fn slice_plan_scenario_test(){
    let plan = SlicePlan::new(Axis::Z, 0.1, 0.0, 0.25).unwrap();
    assert_eq!(plan.len(),3);
    for (offset,expected) in plan.offsets().iter().zip([0.0,0.1,0.2]) {
        assert!((offset-expected).abs() < 1e-6);
    }
}

#[test]
fn slice_plan_count_and_order_test(){
    for (length,step) in [(1.0,0.3),(2.5,0.5),(0.05,0.1),(10.0,0.7),(3.0,4.0)] {
        let plan = SlicePlan::new(Axis::X, step, -1.0, -1.0 + length).unwrap();
        assert_eq!(plan.len(), (length/step as f32).ceil() as usize, "length {length} step {step}");
        assert_eq!(plan.offsets()[0], -1.0);
        assert!(plan.offsets().windows(2).all(|w| w[0] < w[1]));
        assert!(*plan.offsets().last().unwrap() < plan.max_bound);
    }
}

#[test]
fn slice_plan_rejects_bad_step_test(){
    for step in [0.0,-0.1,f32::NAN,f32::INFINITY] {
        assert!(matches!(SlicePlan::new(Axis::Z, step, 0.0, 1.0), Err(SliceError::InvalidParameter(_))));
    }
}

#[test]
fn flat_extent_gives_empty_plan_test(){
    let plan = SlicePlan::new(Axis::Y, 0.1, 2.0, 2.0).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.plane(0), None);
}
