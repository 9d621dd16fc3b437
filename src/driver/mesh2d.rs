//! A driver for the plain-text SMS `.2dm` mesh format.
//!
//! `.2dm` has no binary framing or endianness to speak of, which makes it
//! the simplest possible concrete [`Driver`] to exercise the mesh-loading
//! path end to end (spec scenario S1): a `MESH2D` header line, one `ND`
//! line per vertex (`ND <id> <x> <y> <z>`), and one `E3T`/`E4Q` line per
//! triangular/quadrilateral face (`E#? <id> <node ids...> <material id>`).
//! Conventions follow the public SMS `.2dm` format description; node ids
//! are 1-based and need not be contiguous, so this driver keeps an
//! id-to-index map while parsing.

use std::collections::HashMap;
use std::fs;
use std::io::Write;

use super::{Capability, Driver};
use crate::error::{Error, Result};
use crate::geometry::{Edge, Face, Vertex};
use crate::mesh::{MemoryMesh, Mesh};
use crate::uri::ParsedUri;

/// The `.2dm` driver.
#[derive(Debug, Default)]
pub struct Mesh2dDriver;

impl Mesh2dDriver {
    /// Builds the driver.
    pub fn new() -> Self {
        Mesh2dDriver
    }
}

impl Driver for Mesh2dDriver {
    fn name(&self) -> &str {
        "2DM"
    }

    fn description(&self) -> &str {
        "SMS 2D mesh ASCII format"
    }

    fn capabilities(&self) -> Capability {
        Capability::READ_MESH | Capability::WRITE_MESH
    }

    fn can_read_mesh(&self, uri: &ParsedUri) -> bool {
        if uri.path.to_ascii_lowercase().ends_with(".2dm") {
            return true;
        }
        fs::read_to_string(&uri.path)
            .map(|contents| contents.lines().next().unwrap_or("").trim() == "MESH2D")
            .unwrap_or(false)
    }

    fn load(&self, uri: &ParsedUri) -> Result<Box<dyn Mesh>> {
        let contents = fs::read_to_string(&uri.path)?;
        let mut id_to_index = HashMap::new();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for line in contents.lines() {
            let mut fields = line.split_whitespace();
            let Some(tag) = fields.next() else { continue };
            match tag {
                "ND" => {
                    let id: i64 = parse_field(fields.next(), "ND id")?;
                    let x: f64 = parse_field(fields.next(), "ND x")?;
                    let y: f64 = parse_field(fields.next(), "ND y")?;
                    let z: f64 = parse_field(fields.next(), "ND z")?;
                    id_to_index.insert(id, vertices.len());
                    vertices.push(Vertex::new(x, y, z));
                }
                "E3T" | "E4Q" | "E6T" | "E8Q" | "E9Q" => {
                    let _id: i64 = parse_field(fields.next(), "element id")?;
                    // the node count is fixed by the element tag; the field
                    // after the last node is a material id, not a node
                    // reference, and must not be consumed as one (a material
                    // id is commonly a small integer, e.g. the default `1`,
                    // that coincides with a real node id).
                    let node_count = match tag {
                        "E3T" => 3,
                        "E4Q" => 4,
                        "E6T" => 6,
                        "E8Q" => 8,
                        "E9Q" => 9,
                        _ => unreachable!(),
                    };
                    let mut node_indices = Vec::with_capacity(node_count);
                    for _ in 0..node_count {
                        let node_id: i64 = parse_field(fields.next(), "element node id")?;
                        match id_to_index.get(&node_id) {
                            Some(&index) => node_indices.push(index),
                            None => {
                                crate::logging::log_warning(
                                    crate::error::Status::WarnElementWithInvalidNode,
                                    "2DM",
                                    format!("skipping element line with unknown node id {node_id}: {line:?}"),
                                );
                                node_indices.clear();
                                break;
                            }
                        }
                    }
                    if node_indices.is_empty() {
                        crate::logging::log_warning(
                            crate::error::Status::WarnInvalidElements,
                            "2DM",
                            format!("skipping malformed element line {line:?}"),
                        );
                        continue;
                    }
                    faces.push(Face::new(node_indices));
                }
                _ => {}
            }
        }

        let mut mesh = MemoryMesh::new(vertices, Vec::<Edge>::new(), faces, "", "2DM", uri.path.clone());
        mesh.add_bed_elevation_dataset();
        Ok(Box::new(mesh))
    }

    fn save(&self, mesh: &dyn Mesh, uri: &ParsedUri) -> Result<()> {
        let mut file = fs::File::create(&uri.path)?;
        writeln!(file, "MESH2D")?;

        let mut vertices = vec![Vertex::default(); mesh.vertex_count()];
        mesh.read_vertices(0, mesh.vertex_count(), &mut vertices)?;

        let face_count = mesh.face_count();
        let mut faces = vec![Face::default(); face_count];
        mesh.read_faces(0, face_count, &mut faces)?;

        for (i, face) in faces.iter().enumerate() {
            let tag = match face.vertex_count() {
                3 => "E3T",
                4 => "E4Q",
                _ => {
                    return Err(Error::IncompatibleMesh(format!(
                        "2DM cannot represent a face with {} vertices",
                        face.vertex_count()
                    )))
                }
            };
            write!(file, "{tag} {}", i + 1)?;
            for &node_index in face.vertices() {
                write!(file, " {}", node_index + 1)?;
            }
            writeln!(file, " 1")?;
        }

        for (i, vertex) in vertices.iter().enumerate() {
            writeln!(file, "ND {} {} {} {}", i + 1, vertex.x, vertex.y, vertex.z)?;
        }

        Ok(())
    }
}

fn parse_field<T: std::str::FromStr>(field: Option<&str>, what: &str) -> Result<T> {
    field
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::InvalidData(format!("missing or malformed {what}")))
}
