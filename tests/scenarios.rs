//! Integration tests exercising the public API end to end: loading a mesh
//! through the driver manager, round-tripping a URI, and the dataset
//! group append/close lifecycle.

use std::io::Write;

use mdal::dataset::{DataLocation, Dataset, DatasetGroup, ElementKind};
use mdal::driver::DriverManager;
use mdal::{uri, Error, Mesh};

fn write_sample_2dm(path: &std::path::Path) {
    std::fs::write(
        path,
        "MESH2D\n\
         ND 1 0.0 0.0 0.0\n\
         ND 2 1.0 0.0 0.0\n\
         ND 3 1.0 1.0 0.0\n\
         ND 4 0.0 1.0 0.0\n\
         E4Q 1 1 2 3 4 1\n",
    )
    .unwrap();
}

#[test]
fn loads_a_2dm_mesh_through_the_driver_manager() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quad.2dm");
    write_sample_2dm(&path);

    let manager = DriverManager::new();
    let mesh = manager.load(path.to_str().unwrap()).unwrap();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.face_count(), 1);
    assert_eq!(mesh.driver_name(), "2DM");

    let mut vertices = vec![mdal::Vertex::default(); 4];
    mesh.read_vertices(0, 4, &mut vertices).unwrap();
    assert_eq!(vertices[2], mdal::Vertex::new(1.0, 1.0, 0.0));
}

#[test]
fn saves_and_reloads_a_selafin_mesh_through_the_driver_manager() {
    let mut mesh = mdal::MemoryMesh::new(
        vec![
            mdal::Vertex::new(0.0, 0.0, 0.0),
            mdal::Vertex::new(1.0, 0.0, 0.0),
            mdal::Vertex::new(0.0, 1.0, 0.0),
        ],
        Vec::new(),
        vec![mdal::Face::new(vec![0, 1, 2])],
        "",
        "SELAFIN",
        "",
    );
    let mut group = DatasetGroup::new("depth", DataLocation::Vertex, true, "SELAFIN");
    group
        .add_dataset(Box::new(mdal::dataset::MemoryDataset::scalar(vec![10.0, 20.0, 30.0])))
        .unwrap();
    mesh.push_dataset_group(group);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.slf");
    let uri = format!(r#"SELAFIN:"{}""#, path.display());

    let manager = DriverManager::new();
    manager.save(&mesh, &uri).unwrap();

    let reloaded = manager.load(&uri).unwrap();
    assert_eq!(reloaded.vertex_count(), 3);
    assert_eq!(reloaded.face_count(), 1);
    let reloaded_group = &reloaded.dataset_groups()[0];
    let mut buf = vec![0u8; 3 * 8];
    reloaded_group
        .dataset(0)
        .unwrap()
        .data(0, 3, ElementKind::ScalarDouble, &mut buf)
        .unwrap();
    let values: Vec<f64> = buf.chunks_exact(8).map(|c| f64::from_ne_bytes(c.try_into().unwrap())).collect();
    assert_eq!(values, vec![10.0, 20.0, 30.0]);
}

#[test]
fn load_of_missing_file_reports_file_not_found() {
    let manager = DriverManager::new();
    let err = manager.load("no/such/file.2dm").unwrap_err();
    assert!(matches!(err, Error::FileNotFound(_)));
}

#[test]
fn load_of_unrecognised_format_reports_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    std::fs::File::create(&path).unwrap().write_all(b"not a mesh").unwrap();

    let manager = DriverManager::new();
    let err = manager.load(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, Error::UnknownFormat(_)));
}

#[test]
fn uri_round_trips_through_parse_and_format() {
    let cases = ["mesh.2dm", r#"SELAFIN:"res.slf""#, r#"HEC2D:"plan.hdf":2D Area 1"#];
    for case in cases {
        let parsed = uri::parse_uri(case).unwrap();
        assert_eq!(uri::format_uri(&parsed), case);
    }
}

#[test]
fn dataset_group_tracks_append_and_close_lifecycle() {
    let mut group = DatasetGroup::new("depth", DataLocation::Vertex, true, "2DM");
    assert!(!group.is_closed());

    group
        .add_dataset(Box::new(mdal::dataset::MemoryDataset::scalar(vec![1.0, 2.0, 3.0])))
        .unwrap();
    assert_eq!(group.dataset_count(), 1);

    group.close();
    assert!(group.is_closed());

    let err = group
        .add_dataset(Box::new(mdal::dataset::MemoryDataset::scalar(vec![4.0])))
        .unwrap_err();
    assert!(matches!(err, Error::IncompatibleDatasetGroup(_)));
}

#[test]
fn dataset_data_entry_point_is_uniform_across_element_kinds() {
    let dataset = mdal::dataset::MemoryDataset::vector(vec![(3.0, 4.0)]);
    let mut buf = vec![0u8; 16];
    let written = dataset.data(0, 1, ElementKind::VectorDouble2D, &mut buf).unwrap();
    assert_eq!(written, 1);
    let x = f64::from_ne_bytes(buf[0..8].try_into().unwrap());
    let y = f64::from_ne_bytes(buf[8..16].try_into().unwrap());
    assert_eq!((x, y), (3.0, 4.0));
}

#[test]
fn cf_time_parsing_never_panics_on_garbage_input() {
    for input in ["", "since", "banana since nowhere", "hours since 1990-01-01 00:00:00"] {
        let _ = mdal::datetime::parse_cf_time_unit(input);
        let _ = mdal::datetime::parse_cf_reference_time(input);
    }
}
