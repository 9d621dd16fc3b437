//! Datasets and dataset groups: the time-varying values defined over a
//! mesh's vertices, edges, faces or volumes.
//!
//! A [`DatasetGroup`] is a named, ordered collection of [`Dataset`]s sharing
//! one [`DataLocation`] and scalar/vector shape — one group per output
//! variable, one dataset per timestep (or a single dataset for
//! time-independent data such as bed elevation). Grounded on the original
//! source's `DatasetGroup`/`Dataset` pair and its `MDAL_DataType` value-kind
//! enumeration.

use std::collections::HashMap;
use std::fmt;

use crate::datetime::DateTime;
use crate::error::{Error, Result};
use crate::statistics::{self, Statistics, Value};

/// Where a dataset's values are anchored on the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLocation {
    /// One value per vertex.
    Vertex,
    /// One value per edge.
    Edge,
    /// One value per face.
    Face,
    /// One value per 3D volume (layered meshes).
    Volume,
}

/// The value layout a caller requests from [`Dataset::data`].
///
/// Mirrors the original source's `MDAL_DataType`: callers choose both a
/// numeric precision and whether they want scalar, 2D vector, volumetric
/// (3D-layered) values, or the per-element "active" flag array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Scalar value, `f64` per element.
    ScalarDouble,
    /// Scalar value, `f32` per element.
    ScalarFloat,
    /// Scalar value, `i32` per element.
    ScalarInt,
    /// Scalar value for a 3D-layered dataset, `f64` per element.
    ScalarVolumetricDouble,
    /// 2D vector value, `f64` x/y pair per element.
    VectorDouble2D,
    /// 2D vector value, `f32` x/y pair per element.
    VectorFloat2D,
    /// 2D vector value for a 3D-layered dataset, `f64` x/y pair per element.
    VectorVolumetricDouble,
    /// Whether each element is active (`1`) or dry/disabled (`0`), `u8` per
    /// element.
    Active,
    /// Per-face vertical-level count for a 3D-layered dataset, `i32` per
    /// face (spec §3's "per-face vertical-level count").
    VerticalLevelCount,
    /// Flat vertical-level Z coordinates for a 3D-layered dataset, `f64`
    /// per entry, `face_count + volume_count` entries long.
    VerticalLevelZ,
    /// Per-face start offset into the flat volume-value array for a
    /// 3D-layered dataset, `i32` per face (spec §3's `volume_index_base`).
    FaceVolumeIndex,
}

impl ElementKind {
    /// Bytes needed to hold one element's worth of this kind.
    pub fn element_size(self) -> usize {
        match self {
            ElementKind::ScalarDouble | ElementKind::ScalarVolumetricDouble => 8,
            ElementKind::ScalarFloat => 4,
            ElementKind::ScalarInt => 4,
            ElementKind::VectorDouble2D | ElementKind::VectorVolumetricDouble => 16,
            ElementKind::VectorFloat2D => 8,
            ElementKind::Active => 1,
            ElementKind::VerticalLevelCount | ElementKind::FaceVolumeIndex => 4,
            ElementKind::VerticalLevelZ => 8,
        }
    }

    /// Whether this kind carries two components (a vector) rather than one.
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            ElementKind::VectorDouble2D
                | ElementKind::VectorFloat2D
                | ElementKind::VectorVolumetricDouble
        )
    }
}

/// A single timestep (or the sole, time-independent snapshot) of a dataset
/// group's values.
pub trait Dataset: fmt::Debug {
    /// Number of elements this dataset defines a value for — the group's
    /// mesh vertex/edge/face/volume count, depending on
    /// [`DatasetGroup::location`].
    fn value_count(&self) -> usize;

    /// Whether this dataset carries vector (x, y) pairs rather than scalars.
    fn is_vector(&self) -> bool;

    /// Copies `count` elements starting at `offset`, laid out as `kind`,
    /// into `buf`. Returns the number of elements actually written (fewer
    /// than `count` only at the tail of the dataset).
    ///
    /// This is the single uniform entry point every driver-specific dataset
    /// implementation funnels through, regardless of how the underlying
    /// format stores its values.
    fn data(&self, offset: usize, count: usize, kind: ElementKind, buf: &mut [u8]) -> Result<usize>;

    /// Whether the element at `index` is active (wet/enabled). Datasets with
    /// no notion of activity (most scalar outputs) report every index
    /// active.
    fn is_active(&self, index: usize) -> bool {
        let _ = index;
        true
    }

    /// Summary statistics across this dataset's valid values.
    fn statistics(&self) -> Statistics;

    /// The reference time this dataset's values were produced at, if the
    /// group is time-varying.
    fn time(&self) -> Option<DateTime> {
        None
    }
}

/// The per-timestep vertical structure of an `OnVolumes3D` dataset (spec
/// §3's "Volume (3D) extension"): how many layers each face has, where each
/// face's layers start in the flat volume-value array, and the layers'
/// Z coordinates. None of the two fully-specified engines (Selafin,
/// HEC-RAS 2D) produce this — Selafin rejects 3D-layered files outright and
/// HEC-RAS 2D has no volume concept — so this exists purely as the data
/// model's extension point for drivers that do.
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// Vertical-level count per face.
    pub level_counts: Vec<i32>,
    /// Start offset into the flat volume-value array, per face.
    pub volume_index_base: Vec<i32>,
    /// Flat vertical-level Z coordinates, `face_count + volume_count` long.
    pub vertical_z: Vec<f64>,
}

/// Raw values supplied to [`crate::driver::Driver::create_dataset`], shaped
/// to match the target group's scalar or vector kind.
#[derive(Debug, Clone)]
pub enum DatasetValues {
    /// One value per element, for a scalar group.
    Scalar(Vec<f64>),
    /// One `(x, y)` pair per element, for a vector group.
    Vector(Vec<(f64, f64)>),
}

/// An in-memory [`Dataset`] backed by owned `Vec`s, used by [`crate::mesh::MemoryMesh`]
/// and by drivers (Selafin, HEC-RAS) that fully materialize each timestep.
#[derive(Debug, Clone)]
pub struct MemoryDataset {
    values: Vec<(f64, f64)>,
    is_vector: bool,
    active: Option<Vec<bool>>,
    time: Option<DateTime>,
    volume_info: Option<VolumeInfo>,
}

impl MemoryDataset {
    /// Builds a scalar dataset from raw values.
    pub fn scalar(values: Vec<f64>) -> Self {
        MemoryDataset {
            values: values.into_iter().map(|v| (v, 0.0)).collect(),
            is_vector: false,
            active: None,
            time: None,
            volume_info: None,
        }
    }

    /// Builds a 2D vector dataset from (x, y) pairs.
    pub fn vector(values: Vec<(f64, f64)>) -> Self {
        MemoryDataset {
            values,
            is_vector: true,
            active: None,
            time: None,
            volume_info: None,
        }
    }

    /// Attaches a per-element active-flag array (e.g. HEC-RAS's dry cells).
    pub fn with_active(mut self, active: Vec<bool>) -> Self {
        self.active = Some(active);
        self
    }

    /// Attaches this dataset's timestep reference time.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Attaches this dataset's 3D-layered vertical structure, making the
    /// `VerticalLevelCount`/`VerticalLevelZ`/`FaceVolumeIndex` kinds readable
    /// through [`Dataset::data`].
    pub fn with_volume_info(mut self, info: VolumeInfo) -> Self {
        self.volume_info = Some(info);
        self
    }
}

impl MemoryDataset {
    /// Handles the three 3D-structural [`ElementKind`]s, which read from
    /// `self.volume_info` rather than `self.values`. Returns `Ok(0)` (spec
    /// §4.6: "For 3D kinds on non-3D groups ... return 0") when this
    /// dataset carries no volume info at all.
    fn volume_data(&self, offset: usize, count: usize, kind: ElementKind, buf: &mut [u8]) -> Result<usize> {
        let Some(info) = &self.volume_info else {
            return Ok(0);
        };
        let source_i32: &[i32] = match kind {
            ElementKind::VerticalLevelCount => &info.level_counts,
            ElementKind::FaceVolumeIndex => &info.volume_index_base,
            ElementKind::VerticalLevelZ => &[],
        };
        if kind == ElementKind::VerticalLevelZ {
            let available = info.vertical_z.len().saturating_sub(offset);
            let take = available.min(count);
            if buf.len() < take * 8 {
                return Err(Error::InvalidData("buffer too small for vertical level Z".to_string()));
            }
            for i in 0..take {
                buf[i * 8..(i + 1) * 8].copy_from_slice(&info.vertical_z[offset + i].to_ne_bytes());
            }
            return Ok(take);
        }
        let available = source_i32.len().saturating_sub(offset);
        let take = available.min(count);
        if buf.len() < take * 4 {
            return Err(Error::InvalidData("buffer too small for volume index data".to_string()));
        }
        for i in 0..take {
            buf[i * 4..(i + 1) * 4].copy_from_slice(&source_i32[offset + i].to_ne_bytes());
        }
        Ok(take)
    }
}

impl Dataset for MemoryDataset {
    fn value_count(&self) -> usize {
        self.values.len()
    }

    fn is_vector(&self) -> bool {
        self.is_vector
    }

    fn data(&self, offset: usize, count: usize, kind: ElementKind, buf: &mut [u8]) -> Result<usize> {
        if matches!(
            kind,
            ElementKind::VerticalLevelCount | ElementKind::VerticalLevelZ | ElementKind::FaceVolumeIndex
        ) {
            return self.volume_data(offset, count, kind, buf);
        }

        let available = self.values.len().saturating_sub(offset);
        let take = available.min(count);
        let element_size = kind.element_size();
        if buf.len() < take * element_size {
            return Err(Error::InvalidData(format!(
                "buffer too small for {take} elements of {element_size} bytes each"
            )));
        }

        for i in 0..take {
            let (x, y) = self.values[offset + i];
            let dst = &mut buf[i * element_size..(i + 1) * element_size];
            match kind {
                ElementKind::ScalarDouble | ElementKind::ScalarVolumetricDouble => {
                    dst.copy_from_slice(&x.to_ne_bytes());
                }
                ElementKind::ScalarFloat => dst.copy_from_slice(&(x as f32).to_ne_bytes()),
                ElementKind::ScalarInt => dst.copy_from_slice(&(x as i32).to_ne_bytes()),
                ElementKind::VectorDouble2D | ElementKind::VectorVolumetricDouble => {
                    dst[0..8].copy_from_slice(&x.to_ne_bytes());
                    dst[8..16].copy_from_slice(&y.to_ne_bytes());
                }
                ElementKind::VectorFloat2D => {
                    dst[0..4].copy_from_slice(&(x as f32).to_ne_bytes());
                    dst[4..8].copy_from_slice(&(y as f32).to_ne_bytes());
                }
                ElementKind::Active => dst[0] = self.is_active(offset + i) as u8,
            }
        }
        Ok(take)
    }

    fn is_active(&self, index: usize) -> bool {
        self.active.as_ref().map_or(true, |a| a.get(index).copied().unwrap_or(false))
    }

    fn statistics(&self) -> Statistics {
        statistics::calculate_statistics(self.values.iter().map(|&(x, y)| {
            if self.is_vector {
                Value::Vector(x, y)
            } else {
                Value::Scalar(x)
            }
        }))
    }

    fn time(&self) -> Option<DateTime> {
        self.time
    }
}

/// Lifecycle of a dataset group, matching the original source's
/// reading-then-editing-then-closed state machine (spec §4.5): new
/// datasets can only be appended while `Editing`, and no further appends
/// are accepted once `close()` transitions the group to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Reading,
    Editing,
    Closed,
}

/// A named group of datasets sharing a location, shape, and (optionally) a
/// reference time axis.
#[derive(Debug)]
pub struct DatasetGroup {
    name: String,
    location: DataLocation,
    is_scalar: bool,
    driver_name: String,
    reference_time: Option<DateTime>,
    metadata: HashMap<String, String>,
    datasets: Vec<Box<dyn Dataset>>,
    lifecycle: Lifecycle,
}

impl DatasetGroup {
    /// Starts a new, empty group in the `Editing` state, ready to receive
    /// datasets via [`DatasetGroup::add_dataset`].
    pub fn new(name: impl Into<String>, location: DataLocation, is_scalar: bool, driver_name: impl Into<String>) -> Self {
        DatasetGroup {
            name: name.into(),
            location,
            is_scalar,
            driver_name: driver_name.into(),
            reference_time: None,
            metadata: HashMap::new(),
            datasets: Vec::new(),
            lifecycle: Lifecycle::Editing,
        }
    }

    /// The group's name (the output variable name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where this group's values are anchored on the mesh.
    pub fn location(&self) -> DataLocation {
        self.location
    }

    /// Whether every dataset in this group is scalar (as opposed to 2D
    /// vector).
    pub fn is_scalar(&self) -> bool {
        self.is_scalar
    }

    /// The name of the driver that produced this group.
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// The time origin datasets' [`Dataset::time`] values are measured
    /// relative to, if this group is time-varying.
    pub fn reference_time(&self) -> Option<DateTime> {
        self.reference_time
    }

    /// Sets the group's reference time. No-op once the group is `Closed`.
    pub fn set_reference_time(&mut self, time: DateTime) {
        if self.lifecycle != Lifecycle::Closed {
            self.reference_time = Some(time);
        }
    }

    /// Arbitrary string metadata carried alongside the group (units, CRS
    /// WKT, driver-specific attributes, ...).
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Sets a metadata key/value pair.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Appends a dataset (one timestep), rejecting the append once the
    /// group has been closed or the dataset's value count/shape doesn't
    /// match the group's.
    pub fn add_dataset(&mut self, dataset: Box<dyn Dataset>) -> Result<()> {
        if self.lifecycle == Lifecycle::Closed {
            return Err(Error::IncompatibleDatasetGroup(format!(
                "group {} is closed to further datasets",
                self.name
            )));
        }
        if let Some(first) = self.datasets.first() {
            if first.is_vector() != dataset.is_vector() {
                return Err(Error::IncompatibleDatasetGroup(format!(
                    "group {}: dataset scalar/vector shape mismatch",
                    self.name
                )));
            }
        }
        self.datasets.push(dataset);
        Ok(())
    }

    /// Transitions this group from `Editing` to `Closed`: no further
    /// datasets may be appended, and the group becomes eligible for
    /// statistics aggregation and saving.
    pub fn close(&mut self) {
        self.lifecycle = Lifecycle::Closed;
    }

    /// Whether [`DatasetGroup::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    /// Number of datasets (timesteps) in this group.
    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    /// The dataset at `index`, if any.
    pub fn dataset(&self, index: usize) -> Option<&dyn Dataset> {
        self.datasets.get(index).map(|d| d.as_ref())
    }

    /// All datasets in this group, in timestep order.
    pub fn datasets(&self) -> impl Iterator<Item = &dyn Dataset> {
        self.datasets.iter().map(|d| d.as_ref())
    }

    /// Rolls every dataset's own [`Statistics`] up into one group-wide
    /// min/max (spec §4.6, grounded on `combineStatistics`).
    pub fn statistics(&self) -> Statistics {
        statistics::combine_statistics(self.datasets.iter().map(|d| d.statistics()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_dataset_round_trips_through_data() {
        let dataset = MemoryDataset::scalar(vec![1.0, 2.0, 3.0]);
        let mut buf = vec![0u8; 3 * 8];
        let written = dataset.data(0, 3, ElementKind::ScalarDouble, &mut buf).unwrap();
        assert_eq!(written, 3);
        let second = f64::from_ne_bytes(buf[8..16].try_into().unwrap());
        assert_eq!(second, 2.0);
    }

    #[test]
    fn data_clamps_count_at_tail() {
        let dataset = MemoryDataset::scalar(vec![1.0, 2.0]);
        let mut buf = vec![0u8; 4 * 8];
        let written = dataset.data(1, 4, ElementKind::ScalarDouble, &mut buf).unwrap();
        assert_eq!(written, 1);
    }

    #[test]
    fn group_rejects_appends_after_close() {
        let mut group = DatasetGroup::new("depth", DataLocation::Vertex, true, "2dm");
        group.add_dataset(Box::new(MemoryDataset::scalar(vec![0.0]))).unwrap();
        group.close();
        let err = group
            .add_dataset(Box::new(MemoryDataset::scalar(vec![0.0])))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleDatasetGroup(_)));
    }

    #[test]
    fn group_rejects_shape_mismatch() {
        let mut group = DatasetGroup::new("velocity", DataLocation::Face, false, "selafin");
        group
            .add_dataset(Box::new(MemoryDataset::vector(vec![(1.0, 1.0)])))
            .unwrap();
        let err = group
            .add_dataset(Box::new(MemoryDataset::scalar(vec![1.0])))
            .unwrap_err();
        assert!(matches!(err, Error::IncompatibleDatasetGroup(_)));
    }

    #[test]
    fn volume_kinds_return_zero_without_volume_info() {
        let dataset = MemoryDataset::scalar(vec![1.0, 2.0]);
        let mut buf = vec![0u8; 8];
        let written = dataset
            .data(0, 1, ElementKind::VerticalLevelCount, &mut buf)
            .unwrap();
        assert_eq!(written, 0);
    }

    #[test]
    fn volume_info_round_trips_through_data() {
        let dataset = MemoryDataset::scalar(vec![1.0, 2.0, 3.0, 4.0]).with_volume_info(VolumeInfo {
            level_counts: vec![2, 2],
            volume_index_base: vec![0, 2],
            vertical_z: vec![0.0, -1.0, -2.0, 0.0, -0.5, -1.5],
        });

        let mut counts = vec![0u8; 2 * 4];
        let written = dataset.data(0, 2, ElementKind::VerticalLevelCount, &mut counts).unwrap();
        assert_eq!(written, 2);
        assert_eq!(i32::from_ne_bytes(counts[4..8].try_into().unwrap()), 2);

        let mut bases = vec![0u8; 2 * 4];
        dataset.data(0, 2, ElementKind::FaceVolumeIndex, &mut bases).unwrap();
        assert_eq!(i32::from_ne_bytes(bases[4..8].try_into().unwrap()), 2);

        let mut z = vec![0u8; 6 * 8];
        let written = dataset.data(0, 6, ElementKind::VerticalLevelZ, &mut z).unwrap();
        assert_eq!(written, 6);
        assert_eq!(f64::from_ne_bytes(z[8..16].try_into().unwrap()), -1.0);
    }

    #[test]
    fn group_statistics_combine_across_datasets() {
        let mut group = DatasetGroup::new("depth", DataLocation::Vertex, true, "2dm");
        group.add_dataset(Box::new(MemoryDataset::scalar(vec![1.0, 5.0]))).unwrap();
        group.add_dataset(Box::new(MemoryDataset::scalar(vec![-2.0, 3.0]))).unwrap();
        let stats = group.statistics();
        assert_eq!(stats.min, -2.0);
        assert_eq!(stats.max, 5.0);
    }
}
