//! Crate-wide error type and the MDAL status taxonomy.
//!
//! The C original reports failures through a process-wide "last status" code
//! (see [`crate::logging`]) rather than exceptions at the API boundary. This
//! Rust port keeps that taxonomy (via [`Status`]) but surfaces failures the
//! idiomatic way, as a typed [`Error`] returned from `Result`.

use std::io;
use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while parsing, loading, appending to, or saving mesh and
/// dataset data.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The URI referenced a path that does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// No registered driver recognised the file's contents.
    #[error("unknown format for {0}")]
    UnknownFormat(PathBuf),

    /// The mesh violated a structural invariant (index out of range,
    /// unsupported topology, ...).
    #[error("incompatible mesh: {0}")]
    IncompatibleMesh(String),

    /// A dataset could not be added to its group.
    #[error("incompatible dataset: {0}")]
    IncompatibleDataset(String),

    /// A dataset group's data did not match its own declared shape.
    #[error("incompatible dataset group: {0}")]
    IncompatibleDatasetGroup(String),

    /// A value read from a file violated the format's own framing rules.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// A URI named a driver that is not registered.
    #[error("missing driver: {0}")]
    MissingDriver(String),

    /// A driver does not support the capability requested of it.
    #[error("driver {driver} is missing capability {capability:?}")]
    MissingDriverCapability {
        /// The driver's name.
        driver: String,
        /// The capability that was requested.
        capability: crate::driver::Capability,
    },

    /// An allocation could not be satisfied (surfaced so that very large
    /// declared element counts fail gracefully instead of aborting).
    #[error("not enough memory to allocate {0} elements")]
    NotEnoughMemory(usize),

    /// Wraps an I/O failure while reading or writing a driver's backing file.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A dynamic driver's shared object could not be loaded or was missing a
    /// required symbol.
    #[cfg(feature = "dynamic")]
    #[error("dynamic driver error: {0}")]
    DynamicDriver(String),
}

impl Error {
    /// Maps this error onto the status taxonomy of spec §7 / the original
    /// `MDAL_Status` enum, for consumers (e.g. [`crate::ffi`]) that need the
    /// C-compatible status code rather than a rich error value.
    pub fn status(&self) -> Status {
        match self {
            Error::FileNotFound(_) => Status::FileNotFound,
            Error::UnknownFormat(_) => Status::UnknownFormat,
            Error::IncompatibleMesh(_) => Status::IncompatibleMesh,
            Error::IncompatibleDataset(_) => Status::IncompatibleDataset,
            Error::IncompatibleDatasetGroup(_) => Status::IncompatibleDatasetGroup,
            Error::InvalidData(_) => Status::InvalidData,
            Error::MissingDriver(_) => Status::MissingDriver,
            Error::MissingDriverCapability { .. } => Status::MissingDriverCapability,
            Error::NotEnoughMemory(_) => Status::NotEnoughMemory,
            Error::Io(_) => Status::UnknownFormat,
            #[cfg(feature = "dynamic")]
            Error::DynamicDriver(_) => Status::MissingDriver,
        }
    }
}

/// The MDAL status/severity taxonomy from spec §7.
///
/// Warnings (`Unsupported*`, `*NotUnique`, ...) do not abort a load; the
/// element in question is accepted as-is or marked invalid and the warning
/// is only recorded through the [`crate::logging::Logger`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// No error: everything is fine.
    None,
    /// See [`Error::FileNotFound`].
    FileNotFound,
    /// See [`Error::UnknownFormat`].
    UnknownFormat,
    /// See [`Error::IncompatibleMesh`].
    IncompatibleMesh,
    /// See [`Error::IncompatibleDataset`].
    IncompatibleDataset,
    /// See [`Error::IncompatibleDatasetGroup`].
    IncompatibleDatasetGroup,
    /// See [`Error::InvalidData`].
    InvalidData,
    /// See [`Error::MissingDriver`].
    MissingDriver,
    /// See [`Error::MissingDriverCapability`].
    MissingDriverCapability,
    /// See [`Error::NotEnoughMemory`].
    NotEnoughMemory,
    /// A face, edge or similar element used an index type MDAL does not
    /// understand and was skipped.
    WarnUnsupportedElement,
    /// An element's definition was malformed and was skipped.
    WarnInvalidElements,
    /// An element referenced a vertex index out of range and was skipped.
    WarnElementWithInvalidNode,
    /// Two elements were declared identical; only the first was kept.
    WarnElementNotUnique,
    /// Two vertices were declared identical; only the first was kept.
    WarnNodeNotUnique,
}

impl Default for Status {
    fn default() -> Self {
        Status::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_from_error() {
        let err = Error::FileNotFound(PathBuf::from("x.2dm"));
        assert_eq!(err.status(), Status::FileNotFound);
    }

    #[test]
    fn default_status_is_none() {
        assert_eq!(Status::default(), Status::None);
    }
}
