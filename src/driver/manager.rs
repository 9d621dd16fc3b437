//! The driver registry: builds the static driver list once, probes each
//! registered driver in turn for a given URI, and (when the `dynamic`
//! feature is enabled) scans `MDAL_DRIVER_PATH` for additional drivers.

use std::path::Path;

use super::{Capability, Driver};
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::uri::{self, ParsedUri};

/// Picks a [`Driver`] for a URI and dispatches loads/saves to it.
#[derive(Debug)]
pub struct DriverManager {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverManager {
    /// Builds a manager with every statically compiled-in driver
    /// registered, plus any dynamic drivers found under `MDAL_DRIVER_PATH`
    /// when the `dynamic` feature is enabled.
    pub fn new() -> Self {
        let mut drivers: Vec<Box<dyn Driver>> = vec![
            Box::new(super::selafin::SelafinDriver::new()),
            Box::new(super::mesh2d::Mesh2dDriver::new()),
        ];

        #[cfg(feature = "hecras")]
        drivers.push(Box::new(super::hecras::HecRasDriver::new()));

        #[cfg(feature = "dynamic")]
        drivers.extend(super::dynamic::discover_drivers());

        DriverManager { drivers }
    }

    /// The registered drivers, in probing order.
    pub fn drivers(&self) -> &[Box<dyn Driver>] {
        &self.drivers
    }

    /// Looks up a driver by name (the tag a URI's `driver:` prefix names).
    pub fn driver(&self, name: &str) -> Option<&dyn Driver> {
        self.drivers
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
            .map(|d| d.as_ref())
    }

    /// Loads the mesh named by `uri`.
    ///
    /// If `uri` names an explicit driver, only that driver is tried. Else
    /// every registered driver is probed via [`Driver::can_read_mesh`] in
    /// registration order and the first match is used.
    pub fn load(&self, uri: &str) -> Result<Box<dyn Mesh>> {
        crate::logging::LastStatus::reset();
        let parsed = uri::parse_uri(uri)?;

        if !Path::new(&parsed.path).exists() {
            return Err(Error::FileNotFound(parsed.path.clone().into()));
        }

        let driver = if let Some(name) = &parsed.driver {
            self.driver(name)
                .ok_or_else(|| Error::MissingDriver(name.clone()))?
        } else {
            self.drivers
                .iter()
                .map(|d| d.as_ref())
                .find(|d| d.can_read_mesh(&parsed))
                .ok_or_else(|| Error::UnknownFormat(parsed.path.clone().into()))?
        };

        if !driver.capabilities().contains(Capability::READ_MESH) {
            return Err(Error::MissingDriverCapability {
                driver: driver.name().to_string(),
                capability: Capability::READ_MESH,
            });
        }

        crate::logging::log_info(format!("driver {} selected for {}", driver.name(), uri));
        driver.load(&parsed)
    }

    /// Loads `uri`'s dataset groups into `mesh`, analogous to
    /// [`DriverManager::load`] but probing [`Driver::can_read_datasets`]
    /// instead of `can_read_mesh`.
    pub fn load_datasets(&self, uri: &str, mesh: &mut dyn Mesh) -> Result<()> {
        crate::logging::LastStatus::reset();
        let parsed = uri::parse_uri(uri)?;

        if !Path::new(&parsed.path).exists() {
            return Err(Error::FileNotFound(parsed.path.clone().into()));
        }

        let driver = if let Some(name) = &parsed.driver {
            self.driver(name)
                .ok_or_else(|| Error::MissingDriver(name.clone()))?
        } else {
            self.drivers
                .iter()
                .map(|d| d.as_ref())
                .find(|d| d.can_read_datasets(&parsed))
                .ok_or_else(|| Error::UnknownFormat(parsed.path.clone().into()))?
        };

        if !driver.capabilities().contains(Capability::READ_DATASETS) {
            return Err(Error::MissingDriverCapability {
                driver: driver.name().to_string(),
                capability: Capability::READ_DATASETS,
            });
        }

        driver.load_datasets(&parsed, mesh)
    }

    /// Saves `mesh` to `uri` using the driver named in `uri`, or the
    /// driver that produced `mesh` if `uri` names none.
    pub fn save(&self, mesh: &dyn Mesh, uri: &str) -> Result<()> {
        let parsed = uri::parse_uri(uri)?;
        let driver_name = parsed.driver.as_deref().unwrap_or_else(|| mesh.driver_name());
        let driver = self
            .driver(driver_name)
            .ok_or_else(|| Error::MissingDriver(driver_name.to_string()))?;
        driver.save(mesh, &parsed)
    }
}

impl Default for DriverManager {
    fn default() -> Self {
        DriverManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_reports_file_not_found() {
        let manager = DriverManager::new();
        let err = manager.load("does/not/exist.2dm").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn load_datasets_reports_missing_capability_for_2dm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.2dm");
        std::fs::write(
            &path,
            "MESH2D\nND 1 0.0 0.0 0.0\nND 2 1.0 0.0 0.0\nND 3 0.0 1.0 0.0\nE3T 1 1 2 3 1\n",
        )
        .unwrap();
        let manager = DriverManager::new();
        let mut mesh = manager.load(&path.to_string_lossy()).unwrap();
        let err = manager
            .load_datasets(&path.to_string_lossy(), mesh.as_mut())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(_)));
    }

    #[test]
    fn load_with_unregistered_driver_tag_reports_missing_driver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.xyz");
        std::fs::write(&path, b"data").unwrap();
        let manager = DriverManager::new();
        let uri = format!(r#"NOPE:"{}""#, path.display());
        let err = manager.load(&uri).unwrap_err();
        assert!(matches!(err, Error::MissingDriver(_)));
    }
}
