//! Mesh primitive types: vertices, edges, faces, and bounding boxes.

/// A single mesh node in 2.5D space.
///
/// `z` is `0.0` for meshes that carry no elevation (the original source
/// leaves `z` at zero rather than `NaN` in that case, so callers can sum or
/// average it without special-casing 2D data).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    /// X coordinate (or longitude, in a geographic CRS).
    pub x: f64,
    /// Y coordinate (or latitude, in a geographic CRS).
    pub y: f64,
    /// Z coordinate (elevation), `0.0` when the format has none.
    pub z: f64,
}

impl Vertex {
    /// Builds a vertex from its three coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vertex { x, y, z }
    }
}

/// A 1D element connecting two vertices by index into a mesh's vertex array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edge {
    /// Index of the start vertex.
    pub start: usize,
    /// Index of the end vertex.
    pub end: usize,
}

impl Edge {
    /// Builds an edge from its endpoint indices.
    pub fn new(start: usize, end: usize) -> Self {
        Edge { start, end }
    }
}

/// A 2D element: an ordered ring of vertex indices.
///
/// A thin newtype rather than a bare `Vec<usize>` alias, so face-specific
/// behavior (the "unused slot" sentinel used by ragged face tables) has a
/// home that isn't shared with every other `Vec<usize>` in the crate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Face(pub Vec<usize>);

/// Sentinel used by drivers with a fixed-width, ragged face table (e.g.
/// HEC-RAS's per-area maximum face count) to mark an unused trailing slot.
pub const FACE_INDEX_UNUSED: usize = usize::MAX;

impl Face {
    /// Builds a face from its vertex indices, in winding order.
    pub fn new(vertices: Vec<usize>) -> Self {
        Face(vertices)
    }

    /// The number of vertices bounding this face.
    pub fn vertex_count(&self) -> usize {
        self.0.len()
    }

    /// The face's vertex indices, in winding order.
    pub fn vertices(&self) -> &[usize] {
        &self.0
    }
}

impl FromIterator<usize> for Face {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Face(iter.into_iter().collect())
    }
}

/// An axis-aligned bounding box in the mesh's native XY plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    /// Minimum X.
    pub min_x: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BBox {
    /// An "empty" extent, the identity element for [`BBox::extend`].
    pub fn empty() -> Self {
        BBox {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Whether this box has ever been extended by a point.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    /// Widens this box, if necessary, to include `vertex`.
    pub fn extend(&mut self, vertex: Vertex) {
        self.min_x = self.min_x.min(vertex.x);
        self.max_x = self.max_x.max(vertex.x);
        self.min_y = self.min_y.min(vertex.y);
        self.max_y = self.max_y.max(vertex.y);
    }

    /// Computes the bounding box of a vertex slice.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut bbox = BBox::empty();
        for &v in vertices {
            bbox.extend(v);
        }
        bbox
    }
}

impl Default for BBox {
    fn default() -> Self {
        BBox::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_of_empty_slice_is_empty() {
        assert!(BBox::from_vertices(&[]).is_empty());
    }

    #[test]
    fn bbox_extends_to_cover_all_vertices() {
        let vertices = [
            Vertex::new(1.0, 5.0, 0.0),
            Vertex::new(-2.0, 3.0, 0.0),
            Vertex::new(4.0, -1.0, 0.0),
        ];
        let bbox = BBox::from_vertices(&vertices);
        assert_eq!(bbox.min_x, -2.0);
        assert_eq!(bbox.max_x, 4.0);
        assert_eq!(bbox.min_y, -1.0);
        assert_eq!(bbox.max_y, 5.0);
    }

    #[test]
    fn face_vertex_count() {
        let face = Face::new(vec![0, 1, 2, 3]);
        assert_eq!(face.vertex_count(), 4);
        assert_eq!(face.vertices(), &[0, 1, 2, 3]);
    }
}
