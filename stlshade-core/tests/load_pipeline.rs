use std::fs;
use std::path::PathBuf;

use nalgebra::{Point3, Vector3};
use stlshade_core::stl::{self, binary_len};
use stlshade_core::{MeshBatch, StlError};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("stlshade-{}-{}.stl", std::process::id(), name))
}

fn write_stl(name: &str, facets: &[[[f32; 3]; 3]]) -> PathBuf {
    let mut data = vec![0u8; 80];
    data.extend_from_slice(&(facets.len() as u32).to_le_bytes());
    for facet in facets {
        data.extend_from_slice(&[0u8; 12]);
        for c in facet.iter().flatten() {
            data.extend_from_slice(&c.to_le_bytes());
        }
        data.extend_from_slice(&[0u8; 2]);
    }
    let path = temp_path(name);
    fs::write(&path, data).unwrap();
    path
}

const XY_RIGHT: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
const XZ: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];

#[test]
fn test_load_two_facets_from_disk() {
    let path = write_stl("two-facets", &[XY_RIGHT, XZ]);
    let mesh = stl::load_stl(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(mesh.len(), 2);
    assert_eq!(mesh.triangles[0].vertices[1], Point3::new(1.0, 0.0, 0.0));
    assert_eq!(mesh.triangles[0].vertices[2], Point3::new(0.0, 1.0, 0.0));
    assert_eq!(mesh.triangles[1].vertices[2], Point3::new(0.0, 0.0, 1.0));

    let shaded = mesh.build_normals();
    assert!((shaded.triangles[0].normal() - Vector3::z()).norm() < 1e-6);
    assert!((shaded.triangles[1].normal() + Vector3::y()).norm() < 1e-6);
}

#[test]
fn test_truncated_file_returns_no_mesh() {
    let path = write_stl("truncated", &[XY_RIGHT, XZ]);
    let data = fs::read(&path).unwrap();
    fs::write(&path, &data[..data.len() - 1]).unwrap();

    let result = stl::load_stl(&path);
    fs::remove_file(&path).unwrap();

    match result {
        Err(StlError::Truncated { expected, actual }) => {
            assert_eq!(expected, binary_len(2));
            assert_eq!(actual, binary_len(2) - 1);
        }
        other => panic!("expected truncation error, got {:?}", other),
    }
}

#[test]
fn test_two_models_share_one_batch() {
    let first = write_stl("first", &[XY_RIGHT, XZ]);
    let second = write_stl("second", &[XZ]);

    let mut batch = MeshBatch::new();
    let a = batch.push_prepared(stl::load_stl(&first).unwrap());
    let b = batch.push_prepared(stl::load_stl(&second).unwrap());
    fs::remove_file(&first).unwrap();
    fs::remove_file(&second).unwrap();

    assert_eq!((a.start, a.count), (0, 2));
    assert_eq!((b.start, b.count), (2, 1));
    assert_eq!(batch.packed_vertices().len(), 9);

    // The lone XZ facet is centered on its own centroid
    let lone = batch.slice(b).unwrap()[0];
    let center = lone
        .vertices
        .iter()
        .fold(Vector3::zeros(), |acc, v| acc + v.position.coords)
        / 3.0;
    assert!(center.norm() < 1e-6);
    assert!((lone.normal() + Vector3::y()).norm() < 1e-6);
}
