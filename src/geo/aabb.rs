use nalgebra::{Point3, Vector3};
use ordered_float::OrderedFloat;

use super::Axis;

/// Axis Aligned Bounding Box
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Aabb{
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Returns None for an empty point set.
    pub fn from_points<'a, I>(points:I) -> Option<Self>
    where I: IntoIterator<Item = &'a Point3<f32>>
    {
        let points:Vec<&Point3<f32>> = points.into_iter().collect();
        if points.is_empty() { return None }

        let mut min = Point3::origin();
        let mut max = Point3::origin();
        for axis in Axis::ALL {
            let i = axis.index();
            min[i] = points.iter().map(|p| OrderedFloat(p[i])).min()?.0;
            max[i] = points.iter().map(|p| OrderedFloat(p[i])).max()?.0;
        }
        Some(Self{ min, max })
    }
    pub fn min_on(&self, axis:Axis) -> f32 {
        self.min[axis.index()]
    }
    pub fn max_on(&self, axis:Axis) -> f32 {
        self.max[axis.index()]
    }
    pub fn length(&self, axis:Axis) -> f32 {
        self.max_on(axis) - self.min_on(axis)
    }
    pub fn translated(&self, offset:&Vector3<f32>) -> Self {
        Self{
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

#[test]
fn aabb_from_points_test(){
    let points = [
        Point3::new( 1.0, -2.0, 0.5),
        Point3::new(-1.0,  3.0, 0.0),
        Point3::new( 0.0,  0.0, 2.0),
    ];
    let aabb = Aabb::from_points(&points).unwrap();
    assert_eq!(aabb.min, Point3::new(-1.0,-2.0,0.0));
    assert_eq!(aabb.max, Point3::new( 1.0, 3.0,2.0));
    assert_eq!(aabb.length(Axis::Y), 5.0);
    assert_eq!(Aabb::from_points(&Vec::<Point3<f32>>::new()), None);
}
