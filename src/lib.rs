//! Slices a closed surface mesh into thin disks along one axis and lays the
//! disks out on a flat grid, for laminated or laser cut replicas of a model.
//!
//! The pipeline per slice plane: bisect a copy of the model at the plane,
//! cap the cross-section, extrude it by one step, cap the extruded side and
//! fix the normals. See [`slicer::slice_model`].

pub mod atlas;
pub mod bounds;
pub mod disk;
pub mod error;
pub mod export;
pub mod geo;
pub mod kernel;
pub mod loops;
pub mod mesh;
pub mod metrics;
pub mod scene;
pub mod settings;
pub mod slicer;
pub mod stl_op;

pub use atlas::{AtlasLayout, AtlasSettings};
pub use bounds::SlicePlan;
pub use disk::Disk;
pub use error::SliceError;
pub use geo::Axis;
pub use mesh::{Edge, Mesh};
pub use metrics::ScaleFactor;
pub use scene::{Object, Scene};
pub use settings::Settings;
pub use slicer::{slice_model, SliceRun, SliceStatus};
