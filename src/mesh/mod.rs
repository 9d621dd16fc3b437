//! The polymorphic mesh contract and its in-memory implementation.
//!
//! Grounded on the original source's `MemoryMesh`/`mdal_memory_data_model`:
//! a mesh is a flat vertex array plus edge and face connectivity, with
//! reads exposed through batching cursors (spec §4.4) so drivers that
//! stream rather than materialize (see `driver::selafin`) can implement the
//! same trait without pre-loading the whole file.

use crate::dataset::{DataLocation, DatasetGroup, MemoryDataset};
use crate::error::Result;
use crate::geometry::{BBox, Edge, Face, Vertex};

/// A batching cursor contract: callers pull elements in chunks rather than
/// receiving the whole collection at once, so a streaming driver can avoid
/// materializing data it was never asked for.
pub trait Mesh: std::fmt::Debug {
    /// Number of vertices in this mesh.
    fn vertex_count(&self) -> usize;

    /// Number of edges (0 for meshes with no 1D elements).
    fn edge_count(&self) -> usize;

    /// Number of faces (0 for meshes with no 2D elements).
    fn face_count(&self) -> usize;

    /// The largest vertex count across all of this mesh's faces, needed by
    /// callers that must size a fixed-width face buffer up front.
    fn face_vertices_maximum_count(&self) -> usize;

    /// The mesh's XY bounding box.
    fn extent(&self) -> BBox;

    /// The mesh's coordinate reference system, as a PROJ/WKT string, empty
    /// if the source format carried none (spec's CRS reprojection Non-goal
    /// means this string is preserved verbatim, never reprojected).
    fn projection(&self) -> &str;

    /// The name of the driver that produced this mesh.
    fn driver_name(&self) -> &str;

    /// The URI this mesh was loaded from.
    fn uri(&self) -> &str;

    /// Copies up to `count` vertices starting at `offset` into `buf`,
    /// returning the number actually written.
    fn read_vertices(&self, offset: usize, count: usize, buf: &mut [Vertex]) -> Result<usize>;

    /// Copies up to `count` edges starting at `offset` into `buf`.
    fn read_edges(&self, offset: usize, count: usize, buf: &mut [Edge]) -> Result<usize>;

    /// Copies up to `count` faces starting at `offset` into `buf`.
    fn read_faces(&self, offset: usize, count: usize, buf: &mut [Face]) -> Result<usize>;

    /// The dataset groups defined over this mesh, in load order.
    fn dataset_groups(&self) -> &[DatasetGroup];

    /// Mutable access to the dataset groups, for drivers that append new
    /// groups after the initial load (spec §4.5's append-only editing).
    fn dataset_groups_mut(&mut self) -> &mut Vec<DatasetGroup>;
}

/// A mesh whose vertices, edges, and faces are fully materialized in
/// memory — the shape every driver that doesn't stream lazily (everything
/// except Selafin) produces.
#[derive(Debug)]
pub struct MemoryMesh {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    projection: String,
    driver_name: String,
    uri: String,
    dataset_groups: Vec<DatasetGroup>,
}

impl MemoryMesh {
    /// Builds a mesh from fully materialized vertex/edge/face arrays.
    pub fn new(
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        faces: Vec<Face>,
        projection: impl Into<String>,
        driver_name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        MemoryMesh {
            vertices,
            edges,
            faces,
            projection: projection.into(),
            driver_name: driver_name.into(),
            uri: uri.into(),
            dataset_groups: Vec::new(),
        }
    }

    /// Appends a dataset group produced for this mesh (e.g. by its driver's
    /// loader, after the geometry was built).
    pub fn push_dataset_group(&mut self, group: DatasetGroup) {
        self.dataset_groups.push(group);
    }

    /// Synthesizes a scalar, vertex-located "Bed Elevation" dataset group
    /// from this mesh's own vertex Z coordinates.
    ///
    /// Grounded on the original source's `MemoryMesh::addBedElevationDataset`
    /// (`mdal_memory_data_model.cpp`): formats that store bed elevation only
    /// as a vertex Z coordinate (`.2dm`, PLY, XMS TIN, Mike21, ...) call this
    /// after geometry is loaded rather than parsing a separate variable. A
    /// no-op when the mesh has no faces, matching the original's early
    /// return (a point cloud with no faces has nothing for the dataset to be
    /// "bed" of).
    pub fn add_bed_elevation_dataset(&mut self) {
        if self.faces.is_empty() {
            return;
        }
        let values: Vec<f64> = self.vertices.iter().map(|v| v.z).collect();
        let mut group = DatasetGroup::new("Bed Elevation", DataLocation::Vertex, true, self.driver_name.clone());
        group
            .add_dataset(Box::new(MemoryDataset::scalar(values)))
            .expect("a freshly constructed group always accepts its first dataset");
        group.close();
        self.dataset_groups.push(group);
    }
}

fn copy_slice<T: Copy>(source: &[T], offset: usize, count: usize, buf: &mut [T]) -> usize {
    let available = source.len().saturating_sub(offset);
    let take = available.min(count).min(buf.len());
    buf[..take].copy_from_slice(&source[offset..offset + take]);
    take
}

impl Mesh for MemoryMesh {
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_vertices_maximum_count(&self) -> usize {
        self.faces.iter().map(Face::vertex_count).max().unwrap_or(0)
    }

    fn extent(&self) -> BBox {
        BBox::from_vertices(&self.vertices)
    }

    fn projection(&self) -> &str {
        &self.projection
    }

    fn driver_name(&self) -> &str {
        &self.driver_name
    }

    fn uri(&self) -> &str {
        &self.uri
    }

    fn read_vertices(&self, offset: usize, count: usize, buf: &mut [Vertex]) -> Result<usize> {
        Ok(copy_slice(&self.vertices, offset, count, buf))
    }

    fn read_edges(&self, offset: usize, count: usize, buf: &mut [Edge]) -> Result<usize> {
        Ok(copy_slice(&self.edges, offset, count, buf))
    }

    fn read_faces(&self, offset: usize, count: usize, buf: &mut [Face]) -> Result<usize> {
        let available = self.faces.len().saturating_sub(offset);
        let take = available.min(count).min(buf.len());
        buf[..take].clone_from_slice(&self.faces[offset..offset + take]);
        Ok(take)
    }

    fn dataset_groups(&self) -> &[DatasetGroup] {
        &self.dataset_groups
    }

    fn dataset_groups_mut(&mut self) -> &mut Vec<DatasetGroup> {
        &mut self.dataset_groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DataLocation;

    fn sample_mesh() -> MemoryMesh {
        MemoryMesh::new(
            vec![
                Vertex::new(0.0, 0.0, 0.0),
                Vertex::new(1.0, 0.0, 0.0),
                Vertex::new(1.0, 1.0, 0.0),
                Vertex::new(0.0, 1.0, 0.0),
            ],
            vec![],
            vec![Face::new(vec![0, 1, 2, 3])],
            "",
            "test",
            "test.2dm",
        )
    }

    #[test]
    fn reports_extent_over_vertices() {
        let mesh = sample_mesh();
        let extent = mesh.extent();
        assert_eq!(extent.min_x, 0.0);
        assert_eq!(extent.max_x, 1.0);
    }

    #[test]
    fn face_vertices_maximum_count_tracks_widest_face() {
        let mesh = sample_mesh();
        assert_eq!(mesh.face_vertices_maximum_count(), 4);
    }

    #[test]
    fn read_vertices_batches_and_clamps() {
        let mesh = sample_mesh();
        let mut buf = vec![Vertex::default(); 2];
        let read = mesh.read_vertices(3, 2, &mut buf).unwrap();
        assert_eq!(read, 1);
        assert_eq!(buf[0], Vertex::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn dataset_groups_start_empty_and_are_appendable() {
        let mut mesh = sample_mesh();
        assert!(mesh.dataset_groups().is_empty());
        mesh.dataset_groups_mut()
            .push(DatasetGroup::new("depth", DataLocation::Vertex, true, "test"));
        assert_eq!(mesh.dataset_groups().len(), 1);
    }
}
