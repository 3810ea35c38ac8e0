mod aabb;
pub use aabb::*;

mod axis;
pub use axis::*;

/// Distance below which a point counts as lying on a cutting plane.
pub const EPSILON: f32 = 1e-5;
