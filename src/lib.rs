//! A polymorphic, in-memory model of unstructured computational meshes and the
//! time-varying datasets defined over them, plus a pluggable driver subsystem
//! that reads (and, where the format allows, writes) the heterogeneous binary
//! and text formats used by hydraulic, hydrodynamic and GIS tooling.
//!
//! # Loading a mesh
//!
//! Use [`DriverManager::load`] with a URI (see [`uri`]) to pick a driver,
//! probe the file, and build a [`Mesh`]:
//!
//! ```
//! use mdal::DriverManager;
//!
//! let manager = DriverManager::new();
//! match manager.load("does/not/exist.2dm") {
//!     Ok(_mesh) => {}
//!     Err(err) => assert!(matches!(err, mdal::Error::FileNotFound(_))),
//! }
//! ```
//!
//! # Dataset groups
//!
//! A loaded [`Mesh`] owns an ordered list of [`DatasetGroup`]s; each group
//! carries one or more [`Dataset`]s sharing a [`DataLocation`] and
//! scalar/vector shape. See [`dataset`] for the value-access contract.
//!
//! # Drivers
//!
//! [`driver::selafin`] and [`driver::hecras`] are the two fully specified
//! format engines; other formats are reachable only through the
//! [`driver::Driver`] contract (capabilities, `can_read_mesh` probing,
//! load/save) since their bit-level layouts are out of scope for this crate.

#![deny(missing_debug_implementations, unused_import_braces, unused_qualifications)]
#![warn(missing_docs)]

pub mod dataset;
pub mod datetime;
pub mod driver;
mod error;
mod geometry;
mod io;
mod logging;
pub mod mesh;
mod statistics;
pub mod uri;

pub use dataset::{DataLocation, Dataset, DatasetGroup, DatasetValues, ElementKind, VolumeInfo};
pub use datetime::{Calendar, DateTime, DurationUnit, RelativeTimestamp};
pub use driver::{Capability, Driver, DriverManager};
pub use error::{Error, Result, Status};
pub use geometry::{BBox, Edge, Face, Vertex};
pub use logging::{set_logger, LastStatus, Logger, Severity};
pub use mesh::{MemoryMesh, Mesh};
pub use statistics::Statistics;

#[cfg(feature = "ffi")]
pub mod ffi;
