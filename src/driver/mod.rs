//! The driver contract, the capability bitset drivers advertise, and the
//! registry ([`DriverManager`]) that picks a driver for a URI.

mod manager;
pub mod mesh2d;
pub mod selafin;

#[cfg(feature = "hecras")]
pub mod hecras;

#[cfg(feature = "dynamic")]
pub mod dynamic;

pub use manager::DriverManager;

use std::fmt;

use crate::dataset::{DataLocation, DatasetGroup, DatasetValues, MemoryDataset};
use crate::datetime::DateTime;
use crate::error::Result;
use crate::mesh::Mesh;

bitflags::bitflags! {
    /// What a driver supports, mirroring spec §4.7's capability bitset.
    ///
    /// Grounded on the `bitflags` crate usage for exactly this kind of
    /// fixed capability set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capability: u32 {
        /// The driver can read mesh geometry.
        const READ_MESH = 1 << 0;
        /// The driver can read dataset groups defined over a mesh it read.
        const READ_DATASETS = 1 << 1;
        /// The driver can save mesh geometry to a new file.
        const WRITE_MESH = 1 << 2;
        /// The driver can save a new dataset group to an existing file.
        const WRITE_DATASETS_ON_VERTICES = 1 << 3;
        /// The driver can save a new dataset group located on faces.
        const WRITE_DATASETS_ON_FACES = 1 << 4;
        /// The driver can save a new dataset group located on edges.
        const WRITE_DATASETS_ON_EDGES = 1 << 5;
        /// The driver can append a dataset group to a file it did not
        /// itself just write (spec §4.5's append-only editing).
        const APPEND_DATASETS = 1 << 6;
        /// The driver can save a new dataset group located on 3D volumes.
        const WRITE_DATASETS_ON_VOLUMES_3D = 1 << 7;
    }
}

/// Maps a [`DataLocation`] to the write capability a driver must advertise
/// to accept a dataset group anchored there.
fn write_capability_for(location: DataLocation) -> Capability {
    match location {
        DataLocation::Vertex => Capability::WRITE_DATASETS_ON_VERTICES,
        DataLocation::Edge => Capability::WRITE_DATASETS_ON_EDGES,
        DataLocation::Face => Capability::WRITE_DATASETS_ON_FACES,
        DataLocation::Volume => Capability::WRITE_DATASETS_ON_VOLUMES_3D,
    }
}

/// A format engine: probes URIs it might understand, and loads (and,
/// where its capabilities allow, saves) mesh geometry and datasets.
pub trait Driver: fmt::Debug {
    /// The driver's short name, as used in a URI's `driver:` tag and in
    /// `Mesh::driver_name`.
    fn name(&self) -> &str;

    /// A one-line description, surfaced by driver-listing tooling.
    fn description(&self) -> &str;

    /// This driver's capabilities.
    fn capabilities(&self) -> Capability;

    /// Cheaply probes whether `uri`'s path looks like this driver's format
    /// (magic bytes, extension, ...) without fully parsing it.
    fn can_read_mesh(&self, uri: &crate::uri::ParsedUri) -> bool;

    /// Loads the mesh (and, where present, its dataset groups) named by
    /// `uri`.
    fn load(&self, uri: &crate::uri::ParsedUri) -> Result<Box<dyn Mesh>>;

    /// Saves `mesh` to the location named by `uri`. Drivers with no write
    /// capability return [`crate::Error::MissingDriverCapability`].
    fn save(&self, mesh: &dyn Mesh, uri: &crate::uri::ParsedUri) -> Result<()> {
        let _ = (mesh, uri);
        Err(crate::Error::MissingDriverCapability {
            driver: self.name().to_string(),
            capability: Capability::WRITE_MESH,
        })
    }

    /// Cheaply probes whether `uri` names dataset groups this driver can
    /// read, without fully parsing them.
    ///
    /// Every format engine in this crate loads a mesh's dataset groups in
    /// the same pass as its geometry, so the default just gates
    /// [`Driver::can_read_mesh`] on the `READ_DATASETS` capability; a driver
    /// whose dataset and mesh data live in genuinely separate files would
    /// override this.
    fn can_read_datasets(&self, uri: &crate::uri::ParsedUri) -> bool {
        self.capabilities().contains(Capability::READ_DATASETS) && self.can_read_mesh(uri)
    }

    /// Loads `uri`'s dataset groups into `mesh`, skipping any group already
    /// present by name.
    ///
    /// Defaults to reloading the whole mesh via [`Driver::load`] and
    /// grafting its dataset groups onto `mesh`, since none of this crate's
    /// format engines expose dataset loading as a pass separate from
    /// geometry loading.
    fn load_datasets(&self, uri: &crate::uri::ParsedUri, mesh: &mut dyn Mesh) -> Result<()> {
        let mut loaded = self.load(uri)?;
        let existing: std::collections::HashSet<String> =
            mesh.dataset_groups().iter().map(|g| g.name().to_string()).collect();
        for group in std::mem::take(loaded.dataset_groups_mut()) {
            if !existing.contains(group.name()) {
                mesh.dataset_groups_mut().push(group);
            }
        }
        Ok(())
    }

    /// Starts a new, empty dataset group anchored at `location` and appends
    /// it to `mesh`, failing with [`crate::Error::MissingDriverCapability`]
    /// if this driver can't write that location.
    fn create_dataset_group(
        &self,
        mesh: &mut dyn Mesh,
        name: &str,
        location: DataLocation,
        is_scalar: bool,
    ) -> Result<()> {
        let required = write_capability_for(location);
        if !self.capabilities().contains(required) {
            return Err(crate::Error::MissingDriverCapability {
                driver: self.name().to_string(),
                capability: required,
            });
        }
        mesh.dataset_groups_mut()
            .push(DatasetGroup::new(name, location, is_scalar, self.name()));
        Ok(())
    }

    /// Appends one timestep (or the sole, time-independent snapshot) of
    /// values to `group`.
    ///
    /// Fails with [`crate::Error::IncompatibleDataset`] if: `values`'
    /// scalar/vector shape doesn't match `group`'s, `active` is given for a
    /// non-vertex-located group (active flags are only meaningful at
    /// vertices), or this driver lacks the write capability for `group`'s
    /// location.
    fn create_dataset(
        &self,
        group: &mut DatasetGroup,
        time: Option<DateTime>,
        values: DatasetValues,
        active: Option<Vec<bool>>,
    ) -> Result<()> {
        if active.is_some() && group.location() != DataLocation::Vertex {
            return Err(crate::Error::IncompatibleDataset(
                "active flags are only supported for vertex-located datasets".to_string(),
            ));
        }
        let mut dataset = match values {
            DatasetValues::Scalar(values) => {
                if !group.is_scalar() {
                    return Err(crate::Error::IncompatibleDataset(
                        "group holds vector datasets, not scalar".to_string(),
                    ));
                }
                MemoryDataset::scalar(values)
            }
            DatasetValues::Vector(values) => {
                if group.is_scalar() {
                    return Err(crate::Error::IncompatibleDataset(
                        "group holds scalar datasets, not vector".to_string(),
                    ));
                }
                MemoryDataset::vector(values)
            }
        };
        if !self.capabilities().contains(write_capability_for(group.location())) {
            return Err(crate::Error::MissingDriverCapability {
                driver: self.name().to_string(),
                capability: write_capability_for(group.location()),
            });
        }
        if let Some(active) = active {
            dataset = dataset.with_active(active);
        }
        if let Some(time) = time {
            dataset = dataset.with_time(time);
        }
        group.add_dataset(Box::new(dataset))
    }

    /// Flushes `group`'s datasets to durable storage, returning whether
    /// anything was actually written.
    ///
    /// The default is a no-op that reports nothing persisted: a driver
    /// whose write path only produces a file via [`Driver::save`] (the
    /// create-new-file simplification every writer in this crate uses, spec
    /// §4.10) has no separate per-group persistence step to perform.
    fn persist(&self, group: &DatasetGroup) -> Result<bool> {
        let _ = group;
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_bits_compose() {
        let caps = Capability::READ_MESH | Capability::READ_DATASETS;
        assert!(caps.contains(Capability::READ_MESH));
        assert!(!caps.contains(Capability::WRITE_MESH));
    }

    #[test]
    fn create_dataset_group_rejects_missing_capability() {
        let driver = mesh2d::Mesh2dDriver::new();
        let mut mesh = crate::mesh::MemoryMesh::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            "",
            "2DM",
            "",
        );
        let err = driver
            .create_dataset_group(&mut mesh, "depth", DataLocation::Vertex, true)
            .unwrap_err();
        assert!(matches!(err, crate::Error::MissingDriverCapability { .. }));
    }

    #[test]
    fn create_dataset_group_and_create_dataset_round_trip() {
        let driver = selafin::SelafinDriver::new();
        let mut mesh = crate::mesh::MemoryMesh::new(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            "",
            "SELAFIN",
            "",
        );
        driver
            .create_dataset_group(&mut mesh, "depth", DataLocation::Vertex, true)
            .unwrap();
        let group = &mut mesh.dataset_groups_mut()[0];
        driver
            .create_dataset(group, None, DatasetValues::Scalar(vec![1.0, 2.0, 3.0]), None)
            .unwrap();
        assert_eq!(group.dataset_count(), 1);
        assert_eq!(driver.persist(group).unwrap(), false);
    }

    #[test]
    fn create_dataset_rejects_active_on_non_vertex_location() {
        let driver = selafin::SelafinDriver::new();
        let mut group = DatasetGroup::new("depth", DataLocation::Face, true, "SELAFIN");
        let err = driver
            .create_dataset(
                &mut group,
                None,
                DatasetValues::Scalar(vec![1.0]),
                Some(vec![true]),
            )
            .unwrap_err();
        assert!(matches!(err, crate::Error::IncompatibleDataset(_)));
    }
}
