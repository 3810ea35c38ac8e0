use std::fmt::{self, Display, Formatter};

use log::{debug, info, warn};

use crate::atlas::{apply_layout, AtlasLayout};
use crate::bounds::{compute_slice_plan, SlicePlan};
use crate::disk::{build_disk, disk_name, Disk};
use crate::error::SliceError;
use crate::geo::Axis;
use crate::kernel::MeshKernel;
use crate::metrics::object_metrics;
use crate::scene::{Object, Scene};
use crate::settings::Settings;

#[cfg(test)]
pub(crate) mod test;

#[derive(Debug)]
pub enum SliceStatus{
    /// A closed disk was built and linked
    Built(Disk),
    /// The plane missed the mesh, an empty object keeps the index
    Empty(Disk),
    /// The slice could not be built and was left out
    Failed(SliceError),
}

#[derive(Debug)]
pub struct SliceOutcome{
    pub index: usize,
    /// Position of the slice plane along the slicing axis
    pub offset: f32,
    pub status: SliceStatus,
}

impl SliceOutcome {
    pub fn disk(&self) -> Option<&Disk> {
        match &self.status {
            SliceStatus::Built(disk) | SliceStatus::Empty(disk) => Some(disk),
            SliceStatus::Failed(_) => None,
        }
    }
    pub fn is_failed(&self) -> bool {
        matches!(self.status, SliceStatus::Failed(_))
    }
}

/// Result of slicing one model.
#[derive(Debug)]
pub struct SliceRun{
    pub source: String,
    pub collection: String,
    pub axis: Axis,
    pub step: f32,
    /// One outcome per slice plane, in plane order
    pub outcomes: Vec<SliceOutcome>,
    pub atlas: Option<AtlasLayout>,
}

impl SliceRun {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_failed()).count()
    }
    pub fn empty(&self) -> usize {
        self.outcomes.iter().filter(|o| matches!(o.status, SliceStatus::Empty(_))).count()
    }
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes.iter().filter(|o| o.is_failed()).map(|o| o.index).collect()
    }
    /// Produced disks in slice order.
    pub fn disks(&self) -> impl Iterator<Item = &Disk> {
        self.outcomes.iter().filter_map(|o| o.disk())
    }
}

impl Display for SliceRun {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f,"sliced '{}' along {} into {} slices: {} succeeded ({} empty), failed {:?}",
            self.source, self.axis, self.total(), self.succeeded(), self.empty(), self.failed_indices())
    }
}

/// Slices the object `source` of the scene into disks.
///
/// Bad settings and a missing source abort before anything is produced. A slice
/// that fails to build is reported in its outcome and the run continues.
/// The disks are linked into `settings.collection` in slice order, named
/// `"<source>-(<index>)"`, and arranged on a grid if `settings.build_atlas` is set.
pub fn slice_model(scene:&mut Scene, source:&str, settings:&Settings) -> Result<SliceRun,SliceError> {
    settings.validate()?;
    let step = settings.effective_step()?;
    let scale = settings.scale_factor()?;

    let source_object = scene.object_mut(source)?;
    source_object.apply_transform();
    let source_object = source_object.clone();

    for metrics in object_metrics(&source_object, &scale) {
        info!("{metrics}");
    }
    let plan = compute_slice_plan(&source_object, settings.axis, step)?;

    scene.create_collection(&settings.collection);

    let mut outcomes = Vec::with_capacity(plan.len());
    for (index,offset) in plan.offsets().iter().copied().enumerate() {
        let status = match build_slice(&source_object, &plan, index) {
            Ok((object,disk)) => {
                let name = scene.add_object(object);
                scene.link(&settings.collection, &name)?;
                let disk = Disk{ name, ..disk };
                if disk.caps.is_empty() {
                    debug!("slice {index} at {offset}: plane missed the mesh");
                    SliceStatus::Empty(disk)
                } else {
                    debug!("slice {index} at {offset}: {} with {} loops",disk.name,disk.caps.bottom);
                    SliceStatus::Built(disk)
                }
            },
            Err(error) if error.is_per_slice() => {
                warn!("slice {index} at {offset} failed: {error}");
                SliceStatus::Failed(error)
            },
            Err(error) => return Err(error),
        };
        outcomes.push(SliceOutcome{ index, offset, status });
    }

    let atlas = if settings.build_atlas {
        let atlas = apply_layout(scene, &settings.collection, settings.axis, &settings.atlas);
        scene.set_scale_reference(scale.units_to_physical());
        Some(atlas)
    } else { None };

    let run = SliceRun{
        source: source.into(),
        collection: settings.collection.clone(),
        axis: settings.axis,
        step,
        outcomes,
        atlas,
    };
    info!("{run}");
    Ok(run)
}

/// Builds the `index`-th disk of the plan from a copy of `source`.
pub fn build_slice(source:&Object, plan:&SlicePlan, index:usize) -> Result<(Object,Disk),SliceError> {
    let name = disk_name(&source.name, index);
    let (plane_point,plane_normal) = plan.plane(index).ok_or_else(||
        SliceError::InvalidParameter(format!("slice {index} is outside the plan of {} slices",plan.len()))
    )?;

    let mut object = source.duplicate(name.clone());
    let local_point = plane_point - object.location;
    let boundary = object.mesh.bisect_by_plane(&local_point, &plane_normal, true, true);
    let caps = build_disk(&mut object.mesh, &boundary, &plan.extrude_vector())?;

    Ok((object, Disk{ index, name, caps }))
}
