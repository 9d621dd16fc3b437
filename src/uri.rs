//! Driver URI parsing and formatting (spec §4.9, Property P5:
//! `format_uri(parse_uri(s)) == s` for every `s` this module accepts).
//!
//! Grounded on the original source's driver-manager convention of an
//! optional leading `driver:` tag, a path, and an optional trailing
//! `:meshname` selector for container formats that hold more than one mesh.

use crate::error::{Error, Result};

/// A parsed driver URI: `[driver:]path[:mesh]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUri {
    /// The explicit driver name, if the URI named one.
    pub driver: Option<String>,
    /// The filesystem path (or other location the driver understands).
    pub path: String,
    /// The mesh name within `path`, for container formats with more than
    /// one mesh per file, when the trailing `:mesh` token did not parse as
    /// a non-negative integer.
    pub mesh_name: Option<String>,
    /// The mesh index within `path`, when the trailing `:mesh` token parsed
    /// as a non-negative integer (spec §4.9: "If the token after the
    /// trailing `:` parses as a non-negative integer it is the mesh index;
    /// otherwise it is the mesh name").
    pub mesh_id: Option<u64>,
}

/// Parses a URI of the form `driver:"path":mesh`, `path`, or `path:mesh`.
///
/// A driver tag is only recognised when followed by a quoted path
/// (`driver:"..."`), so plain Windows-style paths (`C:\data\file.2dm`)
/// are never mistaken for a `C` driver tag.
pub fn parse_uri(uri: &str) -> Result<ParsedUri> {
    if uri.is_empty() {
        return Err(Error::InvalidData("empty URI".to_string()));
    }

    let mut remainder = uri;
    let mut driver = None;

    if let Some(colon) = remainder.find(':') {
        if remainder[colon + 1..].starts_with('"') {
            driver = Some(remainder[..colon].to_string());
            remainder = &remainder[colon + 1..];
        }
    }

    let (path, tail) = if let Some(stripped) = remainder.strip_prefix('"') {
        match stripped.find('"') {
            Some(end) => {
                let path = stripped[..end].to_string();
                let tail = stripped[end + 1..].trim_start_matches(':');
                let tail = if tail.is_empty() { None } else { Some(tail.to_string()) };
                (path, tail)
            }
            None => return Err(Error::InvalidData(format!("unterminated quoted path in {uri}"))),
        }
    } else {
        (remainder.to_string(), None)
    };

    let (mesh_name, mesh_id) = match tail {
        Some(tail) => match tail.parse::<u64>() {
            Ok(id) => (None, Some(id)),
            Err(_) => (Some(tail), None),
        },
        None => (None, None),
    };

    Ok(ParsedUri {
        driver,
        path,
        mesh_name,
        mesh_id,
    })
}

/// Reassembles a [`ParsedUri`] into its canonical string form.
pub fn format_uri(parsed: &ParsedUri) -> String {
    let mut out = String::new();
    if let Some(driver) = &parsed.driver {
        out.push_str(driver);
        out.push(':');
    }
    let needs_quotes = parsed.driver.is_some() || parsed.mesh_name.is_some() || parsed.mesh_id.is_some();
    if needs_quotes {
        out.push('"');
        out.push_str(&parsed.path);
        out.push('"');
    } else {
        out.push_str(&parsed.path);
    }
    if let Some(mesh_name) = &parsed.mesh_name {
        out.push(':');
        out.push_str(mesh_name);
    } else if let Some(mesh_id) = parsed.mesh_id {
        out.push(':');
        out.push_str(&mesh_id.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_path() {
        let parsed = parse_uri("mesh.2dm").unwrap();
        assert_eq!(parsed.driver, None);
        assert_eq!(parsed.path, "mesh.2dm");
        assert_eq!(parsed.mesh_name, None);
    }

    #[test]
    fn parses_windows_path_without_mistaking_drive_letter_for_driver() {
        let parsed = parse_uri(r"C:\data\mesh.2dm").unwrap();
        assert_eq!(parsed.driver, None);
        assert_eq!(parsed.path, r"C:\data\mesh.2dm");
    }

    #[test]
    fn parses_driver_and_mesh_name() {
        let parsed = parse_uri(r#"HEC2D:"plan.hdf":2D Area 1"#).unwrap();
        assert_eq!(parsed.driver.as_deref(), Some("HEC2D"));
        assert_eq!(parsed.path, "plan.hdf");
        assert_eq!(parsed.mesh_name.as_deref(), Some("2D Area 1"));
    }

    #[test]
    fn parses_driver_and_quoted_path_with_spaces() {
        let parsed = parse_uri(r#"Ugrid:"/tmp/a b.nc":mesh2d"#).unwrap();
        assert_eq!(parsed.driver.as_deref(), Some("Ugrid"));
        assert_eq!(parsed.path, "/tmp/a b.nc");
        assert_eq!(parsed.mesh_name.as_deref(), Some("mesh2d"));
        assert_eq!(parsed.mesh_id, None);
    }

    #[test]
    fn trailing_integer_token_is_a_mesh_id_not_a_name() {
        let parsed = parse_uri(r#""/tmp/a b.nc":3"#).unwrap();
        assert_eq!(parsed.driver, None);
        assert_eq!(parsed.path, "/tmp/a b.nc");
        assert_eq!(parsed.mesh_name, None);
        assert_eq!(parsed.mesh_id, Some(3));
    }

    #[test]
    fn format_uri_round_trips_parse_uri() {
        for uri in [
            "mesh.2dm",
            r#"HEC2D:"plan.hdf":2D Area 1"#,
            r#"SELAFIN:"a.slf""#,
            r#""/tmp/a b.nc":3"#,
            r#"Ugrid:"/tmp/a b.nc":mesh2d"#,
        ] {
            let parsed = parse_uri(uri).unwrap();
            assert_eq!(format_uri(&parsed), uri);
        }
    }

    #[test]
    fn rejects_empty_uri() {
        assert!(parse_uri("").is_err());
    }
}
