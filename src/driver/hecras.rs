//! The HEC-RAS 2D HDF5 plan-results engine (feature `hecras`).
//!
//! HEC-RAS writes every 2D flow area's geometry and time series into one
//! HDF5 file with two schema variants depending on the RAS version that
//! produced it:
//!
//! - pre-5.0.5: `Geometry/2D Flow Areas/Names`, a plain string array of
//!   area names.
//! - 5.0.5 and later: `Geometry/2D Flow Areas/Attributes`, a compound
//!   dataset whose `Name` field holds the same information.
//!
//! Within each area, cell/face topology is walked from `FacePoints
//! Coordinate`, `Cells FacePoint Indexes`, `Faces Cell Indexes`, and
//! `Cells Minimum Elevation`; the per-cell face index table is a
//! fixed-width, ragged array terminated per row by `-1` once a cell's
//! actual face count is exhausted. All 2D flow areas in the file are
//! concatenated into a single mesh in declaration order — the driver never
//! loads just one area — so every per-area array is offset by a running
//! `area_elem_start_index` before being written into the shared mesh.
//! Because HEC-RAS stores everything for a plan eagerly (there is no
//! incremental/lazy output format here), this driver — unlike
//! `driver::selafin` — materializes every dataset's values up front into
//! `MemoryDataset`s.

use hdf5::{File as H5File, Group};

use crate::dataset::{DataLocation, DatasetGroup, MemoryDataset};
use crate::datetime::{parse_cf_time_unit, Calendar, DateTime, RelativeTimestamp};
use crate::driver::{Capability, Driver};
use crate::error::{Error, Result};
use crate::geometry::{Edge, Face, Vertex};
use crate::mesh::{MemoryMesh, Mesh};
use crate::uri::ParsedUri;

const FACE_INDEX_TERMINATOR: i32 = -1;

/// The HEC-RAS 2D driver.
#[derive(Debug, Default)]
pub struct HecRasDriver;

impl HecRasDriver {
    /// Builds the driver.
    pub fn new() -> Self {
        HecRasDriver
    }
}

impl Driver for HecRasDriver {
    fn name(&self) -> &str {
        "HEC2D"
    }

    fn description(&self) -> &str {
        "HEC-RAS 2D unsteady flow HDF5 plan results"
    }

    fn capabilities(&self) -> Capability {
        Capability::READ_MESH | Capability::READ_DATASETS
    }

    fn can_read_mesh(&self, uri: &ParsedUri) -> bool {
        let lower = uri.path.to_ascii_lowercase();
        if !(lower.ends_with(".hdf") || lower.ends_with(".hdf5")) {
            return false;
        }
        H5File::open(&uri.path)
            .ok()
            .map(|f| file_type(&f).map(|ft| is_known_file_type(&ft)).unwrap_or(false))
            .unwrap_or(false)
    }

    fn load(&self, uri: &ParsedUri) -> Result<Box<dyn Mesh>> {
        let file = H5File::open(&uri.path).map_err(|e| Error::InvalidData(e.to_string()))?;

        let ft = file_type(&file).map_err(|_| Error::UnknownFormat(uri.path.clone().into()))?;
        if !is_known_file_type(&ft) {
            return Err(Error::UnknownFormat(uri.path.clone().into()));
        }

        let geometry_areas = file
            .group("Geometry/2D Flow Areas")
            .map_err(|_| Error::UnknownFormat(uri.path.clone().into()))?;
        let area_names = list_area_names(&geometry_areas)?;

        let assembly = parse_mesh(&geometry_areas, &area_names)?;
        let mut mesh = MemoryMesh::new(
            assembly.vertices,
            Vec::<Edge>::new(),
            assembly.faces,
            "",
            "HEC2D",
            uri.path.clone(),
        );

        let (bed_group, bed_values) = read_bed_elevation(&geometry_areas, &area_names, &assembly.area_elem_start_index)?;
        if let Some(group) = bed_group {
            mesh.push_dataset_group(group);
        }

        if let Ok(results) = ResultsTree::open(&file) {
            for group in read_elem_results(&results, &area_names, &assembly.area_elem_start_index, &bed_values)? {
                mesh.push_dataset_group(group);
            }
            for group in read_face_results(&results, &assembly)? {
                mesh.push_dataset_group(group);
            }
        }

        Ok(Box::new(mesh))
    }
}

fn file_type(file: &H5File) -> Result<String> {
    let attr = file
        .attr("File Type")
        .map_err(|e| Error::InvalidData(format!("File Type: {e}")))?;
    attr.read_scalar::<hdf5::types::VarLenUnicode>()
        .map(|v| v.to_string())
        .map_err(|e| Error::InvalidData(format!("File Type: {e}")))
}

fn is_known_file_type(file_type: &str) -> bool {
    file_type == "HEC-RAS Results" || file_type == "HEC-RAS Geometry"
}

/// Layout of the 5.0.5+ `2D Flow Areas/Attributes` compound dataset. Field
/// order and types mirror the original source's `FlowAreasAttribute505`
/// struct exactly; only the leading `Name` field is actually consumed, the
/// rest exist so the HDF5 compound type maps onto this struct at all.
#[derive(Clone, Copy, hdf5::H5Type)]
#[repr(C)]
struct FlowAreaAttribute505 {
    name: hdf5::types::FixedAscii<16>,
    mann: f32,
    cell_vol_tol: f32,
    cell_min_area_fraction: f32,
    face_profile_tol: f32,
    face_area_tol: f32,
    face_conv_ratio: f32,
    laminar_depth: f32,
    spacing_dx: f32,
    spacing_dy: f32,
    shift_dx: f32,
    shift_dy: f32,
    cell_count: i32,
}

fn list_area_names(areas_group: &Group) -> Result<Vec<String>> {
    if let Ok(names) = areas_group.dataset("Names") {
        let values: Vec<hdf5::types::VarLenUnicode> = names
            .read_raw()
            .map_err(|e| Error::InvalidData(format!("reading 2D Flow Areas/Names: {e}")))?;
        if values.is_empty() {
            return Err(Error::InvalidData("2D Flow Areas/Names is empty".to_string()));
        }
        return Ok(values.into_iter().map(|v| v.to_string()).collect());
    }

    if let Ok(attributes) = areas_group.dataset("Attributes") {
        let rows: Vec<FlowAreaAttribute505> = attributes
            .read_raw()
            .map_err(|e| Error::InvalidData(format!("reading 2D Flow Areas/Attributes: {e}")))?;
        if rows.is_empty() {
            return Err(Error::InvalidData("2D Flow Areas/Attributes is empty".to_string()));
        }
        return Ok(rows
            .into_iter()
            .map(|row| row.name.as_str().trim_end_matches(['\0', ' ']).to_string())
            .collect());
    }

    Err(Error::InvalidData(
        "2D Flow Areas group has neither a pre-5.0.5 Names dataset nor a 5.0.5+ Attributes dataset".to_string(),
    ))
}

/// The mesh assembled by concatenating every 2D flow area, plus the
/// per-area offsets ([`ParsedMesh::area_elem_start_index`]) and face→cell
/// topology needed to fold per-area dataset arrays back onto it.
struct ParsedMesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    /// `area_elem_start_index[i]` is the global cell index the `i`-th area's
    /// cells start at; `area_elem_start_index[area_names.len()]` is the
    /// total cell count, mirroring the original's one-past-the-end sentinel.
    area_elem_start_index: Vec<usize>,
    /// Per-area `(area_name, start_cell_index, face→[cell_a, cell_b])`.
    area_face_cells: Vec<(String, usize, Vec<[i32; 2]>)>,
}

fn parse_mesh(geometry_areas: &Group, area_names: &[String]) -> Result<ParsedMesh> {
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    let mut area_elem_start_index = vec![0usize; area_names.len() + 1];
    let mut area_face_cells = Vec::new();

    for (area_index, area_name) in area_names.iter().enumerate() {
        let area_group = geometry_areas
            .group(area_name)
            .map_err(|e| Error::InvalidData(format!("2D flow area {area_name} not found: {e}")))?;

        let area_node_start = vertices.len();
        let coords_dataset = area_group
            .dataset("FacePoints Coordinate")
            .map_err(|e| Error::InvalidData(format!("FacePoints Coordinate: {e}")))?;
        let coords: Vec<[f64; 2]> = coords_dataset
            .read_2d::<f64>()
            .map_err(|e| Error::InvalidData(format!("reading FacePoints Coordinate: {e}")))?
            .outer_iter()
            .map(|row| [row[0], row[1]])
            .collect();
        vertices.extend(coords.into_iter().map(|[x, y]| Vertex::new(x, y, 0.0)));

        area_elem_start_index[area_index] = faces.len();
        let cell_face_points = area_group
            .dataset("Cells FacePoint Indexes")
            .map_err(|e| Error::InvalidData(format!("Cells FacePoint Indexes: {e}")))?;
        let rows: Vec<Vec<i32>> = cell_face_points
            .read_2d::<i32>()
            .map_err(|e| Error::InvalidData(format!("reading Cells FacePoint Indexes: {e}")))?
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();
        faces.extend(rows.into_iter().map(|row| {
            Face::new(
                row.into_iter()
                    .take_while(|&id| id != FACE_INDEX_TERMINATOR)
                    .map(|id| area_node_start + id as usize)
                    .collect(),
            )
        }));

        let face_cells = match area_group.dataset("Faces Cell Indexes") {
            Ok(dataset) => dataset
                .read_2d::<i32>()
                .map_err(|e| Error::InvalidData(format!("reading Faces Cell Indexes: {e}")))?
                .outer_iter()
                .map(|row| [row[0], row[1]])
                .collect(),
            Err(_) => Vec::new(),
        };
        area_face_cells.push((area_name.clone(), area_elem_start_index[area_index], face_cells));
    }
    area_elem_start_index[area_names.len()] = faces.len();

    Ok(ParsedMesh {
        vertices,
        faces,
        area_elem_start_index,
        area_face_cells,
    })
}

/// Reads `Cells Minimum Elevation` per area and returns both the dataset
/// group (`"Bed Elevation"`, a single time-independent snapshot) and the
/// flat per-cell values, used downstream to mask Water Surface nodata.
fn read_bed_elevation(
    geometry_areas: &Group,
    area_names: &[String],
    area_elem_start_index: &[usize],
) -> Result<(Option<DatasetGroup>, Vec<f64>)> {
    let total_cells = *area_elem_start_index.last().unwrap_or(&0);
    let mut values = vec![f64::NAN; total_cells];
    let mut any = false;

    for (area_index, area_name) in area_names.iter().enumerate() {
        let area_group = geometry_areas
            .group(area_name)
            .map_err(|e| Error::InvalidData(format!("2D flow area {area_name} not found: {e}")))?;
        let Ok(dataset) = area_group.dataset("Cells Minimum Elevation") else {
            continue;
        };
        let raw: Vec<f32> = dataset
            .read_raw()
            .map_err(|e| Error::InvalidData(format!("reading Cells Minimum Elevation: {e}")))?;
        let start = area_elem_start_index[area_index];
        for (i, v) in raw.into_iter().enumerate() {
            let val = v as f64;
            if !val.is_nan() {
                values[start + i] = val;
                any = true;
            }
        }
    }

    if !any {
        return Ok((None, values));
    }

    let mut group = DatasetGroup::new("Bed Elevation", DataLocation::Face, true, "HEC2D");
    let _ = group.add_dataset(Box::new(MemoryDataset::scalar(values.clone())));
    group.close();
    Ok((Some(group), values))
}

/// Handle onto the `Results/Unsteady/Output/Output Blocks/Base Output`
/// subtree every time-series and summary dataset is read from.
struct ResultsTree {
    base_output: Group,
}

impl ResultsTree {
    fn open(file: &H5File) -> Result<Self> {
        let base_output = file
            .group("Results/Unsteady/Output/Output Blocks/Base Output")
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        Ok(ResultsTree { base_output })
    }

    fn flow_areas(&self, loc: &str) -> Result<Group> {
        self.base_output
            .group(loc)
            .and_then(|g| g.group("2D Flow Areas"))
            .map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// The unsteady simulation's timestamps, converted via the units the
    /// `Time` dataset's own attributes declare (spec §4.11's `getDataTimeUnit`
    /// fallback chain: `Time` attribute, then `Variables` with the `Time|`
    /// prefix stripped, then `"Hours"`).
    fn unsteady_times(&self) -> Result<Vec<RelativeTimestamp>> {
        let unsteady = self
            .base_output
            .group("Unsteady Time Series")
            .map_err(|e| Error::InvalidData(e.to_string()))?;
        let dataset = unsteady
            .dataset("Time")
            .map_err(|e| Error::InvalidData(format!("Unsteady Time Series/Time: {e}")))?;
        let unit_spec = time_unit_spec(&dataset);
        let unit = parse_cf_time_unit(&unit_spec);
        let raw: Vec<f32> = dataset
            .read_raw()
            .map_err(|e| Error::InvalidData(format!("reading Time: {e}")))?;
        Ok(raw.into_iter().map(|t| RelativeTimestamp::new(t as f64, unit)).collect())
    }

    /// The reference `DateTime` every unsteady timestep's `RelativeTimestamp`
    /// is measured against: the first entry of `Time Date Stamp`, a string
    /// dataset (not an attribute) alongside `Time`.
    fn reference_time(&self) -> Option<DateTime> {
        let unsteady = self.base_output.group("Unsteady Time Series").ok()?;
        let dataset = unsteady.dataset("Time Date Stamp").ok()?;
        let stamps: Vec<hdf5::types::VarLenUnicode> = dataset.read_raw().ok()?;
        let first = stamps.into_iter().next()?;
        parse_hecras_reference_time(first.as_str())
    }
}

fn time_unit_spec(dataset: &hdf5::Dataset) -> String {
    if let Ok(attr) = dataset.attr("Time") {
        if let Ok(value) = attr.read_scalar::<hdf5::types::VarLenUnicode>() {
            return value.to_string();
        }
    }
    if let Ok(attr) = dataset.attr("Variables") {
        if let Ok(value) = attr.read_scalar::<hdf5::types::VarLenUnicode>() {
            return value.to_string().replace("Time|", "");
        }
    }
    "Hours".to_string()
}

/// `eps` used for the HEC-RAS nodata/bed-elevation comparisons: the
/// original source's `std::numeric_limits<double>::min()`, the smallest
/// positive normal `f64` — effectively "not exactly zero", preserved as
/// specified in spec §4.11/§9 rather than replaced with a looser tolerance.
const HECRAS_EPS: f64 = f64::MIN_POSITIVE;

/// Reads `Water Surface` and `Depth` (cell-located) for the unsteady time
/// series and their `Maximums` summary variants, masking nodata per
/// spec §4.11: depth is nodata at exactly zero; water surface is nodata
/// where it equals the cell's bed elevation (dry cell, no free surface).
fn read_elem_results(
    results: &ResultsTree,
    area_names: &[String],
    area_elem_start_index: &[usize],
    bed_elevation: &[f64],
) -> Result<Vec<DatasetGroup>> {
    let mut groups = Vec::new();
    let reference_time = results.reference_time();
    let total_cells = *area_elem_start_index.last().unwrap_or(&0);

    let unsteady_times = results.unsteady_times().unwrap_or_default();
    let unsteady_group = results.flow_areas("Unsteady Time Series").ok();
    if let Some(ref g) = unsteady_group {
        for (raw_name, group_name) in [("Water Surface", "Water Surface"), ("Depth", "Depth")] {
            if let Some(group) = read_elem_output(
                g,
                area_names,
                area_elem_start_index,
                raw_name,
                group_name,
                &unsteady_times,
                bed_elevation,
                total_cells,
                reference_time,
            )? {
                groups.push(group);
            }
        }
    }

    let summary_group = results.flow_areas("Summary Output").ok();
    if let Some(ref g) = summary_group {
        let dummy_times = vec![RelativeTimestamp::new(0.0, crate::datetime::DurationUnit::Hours)];
        for (raw_name, group_name) in [
            ("Maximum Water Surface", "Water Surface/Maximums"),
            ("Maximum Depth", "Depth/Maximums"),
        ] {
            if let Some(group) = read_elem_output(
                g,
                area_names,
                area_elem_start_index,
                raw_name,
                group_name,
                &dummy_times,
                bed_elevation,
                total_cells,
                reference_time,
            )? {
                groups.push(group);
            }
        }
    }

    Ok(groups)
}

#[allow(clippy::too_many_arguments)]
fn read_elem_output(
    root_group: &Group,
    area_names: &[String],
    area_elem_start_index: &[usize],
    raw_dataset_name: &str,
    group_name: &str,
    times: &[RelativeTimestamp],
    bed_elevation: &[f64],
    total_cells: usize,
    reference_time: Option<DateTime>,
) -> Result<Option<DatasetGroup>> {
    if times.is_empty() {
        return Ok(None);
    }

    let mut per_timestep = vec![vec![f64::NAN; total_cells]; times.len()];
    let mut found_any_area = false;
    let is_depth = group_name.starts_with("Depth");

    for (area_index, area_name) in area_names.iter().enumerate() {
        let Ok(area_group) = root_group.group(area_name) else {
            continue;
        };
        let Ok(dataset) = area_group.dataset(raw_dataset_name) else {
            continue;
        };
        found_any_area = true;
        let n_area_cells = area_elem_start_index[area_index + 1] - area_elem_start_index[area_index];
        let matrix: Vec<Vec<f32>> = dataset
            .read_2d::<f32>()
            .map_err(|e| Error::InvalidData(format!("reading {raw_dataset_name}: {e}")))?
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        for (tidx, row) in matrix.iter().enumerate().take(times.len()) {
            for i in 0..n_area_cells.min(row.len()) {
                let elem_index = area_elem_start_index[area_index] + i;
                let val = row[i] as f64;
                if val.is_nan() {
                    continue;
                }
                if is_depth {
                    if val.abs() > HECRAS_EPS {
                        per_timestep[tidx][elem_index] = val;
                    }
                } else {
                    let bed_elev = bed_elevation.get(elem_index).copied().unwrap_or(f64::NAN);
                    if bed_elev.is_nan() || (bed_elev - val).abs() > HECRAS_EPS {
                        per_timestep[tidx][elem_index] = val;
                    }
                }
            }
        }
    }

    if !found_any_area {
        return Ok(None);
    }

    let mut group = DatasetGroup::new(group_name, DataLocation::Face, true, "HEC2D");
    if let Some(reference_time) = reference_time {
        group.set_reference_time(reference_time);
    }
    for (values, time) in per_timestep.into_iter().zip(times.iter().copied()) {
        let mut dataset = MemoryDataset::scalar(values);
        dataset = attach_time(dataset, reference_time, time);
        let _ = group.add_dataset(Box::new(dataset));
    }
    group.close();
    Ok(Some(group))
}

fn attach_time(dataset: MemoryDataset, reference_time: Option<DateTime>, offset: RelativeTimestamp) -> MemoryDataset {
    match reference_time {
        Some(reference) => dataset.with_time(reference.add(offset)),
        None => dataset,
    }
}

/// Reads `Face Shear Stress`/`Face Velocity` (and their `Maximums`
/// summary variants), averaging face-located values onto the two
/// adjoining cells with **max**, not mean (spec §4.11/§9, preserved
/// bit-for-bit).
fn read_face_results(results: &ResultsTree, assembly: &ParsedMesh) -> Result<Vec<DatasetGroup>> {
    let mut groups = Vec::new();
    let reference_time = results.reference_time();
    let total_cells = *assembly.area_elem_start_index.last().unwrap_or(&0);

    let unsteady_times = results.unsteady_times().unwrap_or_default();
    if let Ok(g) = results.flow_areas("Unsteady Time Series") {
        for (raw_name, group_name) in [("Face Shear Stress", "Face Shear Stress"), ("Face Velocity", "Face Velocity")] {
            if let Some(group) =
                read_face_output(&g, assembly, raw_name, group_name, &unsteady_times, total_cells, reference_time)?
            {
                groups.push(group);
            }
        }
    }

    if let Ok(g) = results.flow_areas("Summary Output") {
        let dummy_times = vec![RelativeTimestamp::new(0.0, crate::datetime::DurationUnit::Hours)];
        for (raw_name, group_name) in [
            ("Maximum Face Shear Stress", "Face Shear Stress/Maximums"),
            ("Maximum Face Velocity", "Face Velocity/Maximums"),
        ] {
            if let Some(group) =
                read_face_output(&g, assembly, raw_name, group_name, &dummy_times, total_cells, reference_time)?
            {
                groups.push(group);
            }
        }
    }

    Ok(groups)
}

fn read_face_output(
    root_group: &Group,
    assembly: &ParsedMesh,
    raw_dataset_name: &str,
    group_name: &str,
    times: &[RelativeTimestamp],
    total_cells: usize,
    reference_time: Option<DateTime>,
) -> Result<Option<DatasetGroup>> {
    if times.is_empty() {
        return Ok(None);
    }

    let mut per_timestep = vec![vec![f64::NAN; total_cells]; times.len()];
    let mut found_any_area = false;

    for (area_name, start_cell, face_cells) in &assembly.area_face_cells {
        let Ok(area_group) = root_group.group(area_name) else {
            continue;
        };
        let Ok(dataset) = area_group.dataset(raw_dataset_name) else {
            continue;
        };
        found_any_area = true;
        let matrix: Vec<Vec<f32>> = dataset
            .read_2d::<f32>()
            .map_err(|e| Error::InvalidData(format!("reading {raw_dataset_name}: {e}")))?
            .outer_iter()
            .map(|row| row.to_vec())
            .collect();

        for (tidx, row) in matrix.iter().enumerate().take(times.len()) {
            let averaged = average_face_values_onto_cells(row, face_cells, *start_cell, total_cells);
            let target = &mut per_timestep[tidx];
            for (i, v) in averaged.into_iter().enumerate() {
                if v.is_nan() {
                    continue;
                }
                if target[i].is_nan() || target[i] < v {
                    target[i] = v;
                }
            }
        }
    }

    if !found_any_area {
        return Ok(None);
    }

    let mut group = DatasetGroup::new(group_name, DataLocation::Face, true, "HEC2D");
    if let Some(reference_time) = reference_time {
        group.set_reference_time(reference_time);
    }
    for (values, time) in per_timestep.into_iter().zip(times.iter().copied()) {
        let mut dataset = MemoryDataset::scalar(values);
        dataset = attach_time(dataset, reference_time, time);
        let _ = group.add_dataset(Box::new(dataset));
    }
    group.close();
    Ok(Some(group))
}

/// Averages one timestep's per-face values onto cells by **maximum**
/// (not mean) over each face's two adjoining cells, folding the
/// area-local cell index into the global mesh's cell numbering via
/// `start_cell`.
fn average_face_values_onto_cells(face_values: &[f32], face_cell_indices: &[[i32; 2]], start_cell: usize, total_cells: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; total_cells];

    for (face_index, &value) in face_values.iter().enumerate() {
        let val = value as f64;
        if val.is_nan() || val == 0.0 {
            continue;
        }
        let Some(&[cell_a, cell_b]) = face_cell_indices.get(face_index) else {
            continue;
        };
        for cell in [cell_a, cell_b] {
            if cell < 0 {
                continue;
            }
            let global = start_cell + cell as usize;
            if global >= total_cells {
                continue;
            }
            if out[global].is_nan() || out[global] < val {
                out[global] = val;
            }
        }
    }

    out
}

/// Parses a HEC-RAS reference date string of the fixed form
/// `DDMMMYYYY HH:MM:SS` (e.g. `"01JAN2020 00:00:00"`), the only date
/// format the HDF5 plan attributes use.
fn parse_hecras_reference_time(text: &str) -> Option<DateTime> {
    let (date_part, time_part) = text.trim().split_once(' ')?;
    if date_part.len() != 9 {
        return None;
    }
    let day: u32 = date_part[0..2].parse().ok()?;
    let month = match &date_part[2..5].to_ascii_uppercase()[..] {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    let year: i32 = date_part[5..9].parse().ok()?;

    let mut time_fields = time_part.splitn(3, ':');
    let hour: u32 = time_fields.next()?.parse().ok()?;
    let minute: u32 = time_fields.next()?.parse().ok()?;
    let second: u32 = time_fields.next().unwrap_or("0").parse().ok()?;

    Some(DateTime::from_civil(Calendar::Gregorian, year, month, day, hour, minute, second, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hecras_fixed_format_reference_time() {
        let dt = parse_hecras_reference_time("01JAN2020 06:30:00").unwrap();
        let (y, m, d, h, mi, ..) = dt.to_civil(Calendar::Gregorian);
        assert_eq!((y, m, d, h, mi), (2020, 1, 1, 6, 30));
    }

    #[test]
    fn rejects_malformed_reference_time() {
        assert!(parse_hecras_reference_time("not a date").is_none());
    }

    #[test]
    fn averages_face_values_onto_cells_using_max() {
        // Two faces both touch cell 0; the averaged value must be the
        // larger of the two, not their mean.
        let face_values = vec![1.0f32, 5.0];
        let face_cell_indices = vec![[0, -1], [0, 1]];
        let averaged = average_face_values_onto_cells(&face_values, &face_cell_indices, 0, 2);
        assert_eq!(averaged[0], 5.0);
        assert_eq!(averaged[1], 5.0);
    }

    #[test]
    fn untouched_cells_report_nan() {
        let averaged = average_face_values_onto_cells(&[], &[], 0, 2);
        assert!(averaged.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn zero_face_values_are_treated_as_nodata() {
        let averaged = average_face_values_onto_cells(&[0.0], &[[0, -1]], 0, 1);
        assert!(averaged[0].is_nan());
    }
}
