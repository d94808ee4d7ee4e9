//! Synthetic resource files for integration tests.

#![allow(dead_code)]

use ertm_decode::options::{DEPENDENCY_MARKER, TRANSFORM_MARKER};
use ertm_decode::records::DependencyBlock;
use ertm_decode::{MAGIC, Mesh, MeshChunk, MeshRecord, Transform, Triangle, Vertex, Writer};
use glam::{Vec2, Vec3};

/// One triangle at the origin drawn with `texture`.
pub fn triangle_mesh(texture: &str) -> Mesh {
    Mesh {
        vertices: [Vec3::ZERO, Vec3::X, Vec3::Y]
            .into_iter()
            .map(|p| Vertex::new(p, Vec2::new(p.x, p.y)))
            .collect(),
        triangles: vec![Triangle([0, 1, 2])],
        chunks: vec![MeshChunk {
            last_vertex: 2,
            face_count: 1,
            diffuse_texture: texture.into(),
            ..MeshChunk::default()
        }],
    }
}

pub fn mesh_file(name: &str, texture: &str) -> Vec<u8> {
    MeshRecord::from_mesh(name, &triangle_mesh(texture))
        .unwrap()
        .encode()
}

/// Object blob with a forward dependency block and a transform block.
pub fn object_blob(dependencies: &[&str], transform: &Transform) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_zeros(0x10);
    let count = u32::try_from(dependencies.len()).unwrap();
    w.write_words(&[0, 0, DEPENDENCY_MARKER, count]);
    for name in dependencies {
        w.write_prefixed_string(name, true);
        w.write_zeros(0x10);
    }
    // Scale flag, then scale, position, marker and rotation.
    w.write_u32(2);
    w.write_zeros(0xC);
    w.write_vec3(transform.scale);
    w.write_zeros(0xC);
    w.write_vec3(transform.position);
    w.write_zeros(0x14);
    w.write_u32(TRANSFORM_MARKER);
    w.write_zeros(4);
    w.write_quat(transform.rotation);
    w.write_zeros(0x10);
    w.into_bytes()
}

fn write_blob(w: &mut Writer, blob: &[u8]) {
    w.write_u32(u32::try_from(blob.len() + 4).unwrap());
    w.write_bytes(blob);
}

/// A subtype 3 prop whose object blob names `dependencies`.
pub fn prop_file(dependencies: &[&str]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_bytes(&MAGIC);
    w.write_u32(0x3);
    w.write_zeros(0x24);
    w.write_words(&[0, 0, 0]);
    DependencyBlock::default().write(&mut w, false);
    write_blob(&mut w, &object_blob(dependencies, &Transform::default()));
    w.into_bytes()
}

/// A placed object in a synthetic scene.
pub struct Placement<'a> {
    pub name: &'a str,
    pub modules: &'a [&'a str],
    pub group: Option<&'a str>,
    pub position: Vec3,
}

pub fn scene_file(name: &str, objects: &[Placement<'_>]) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_bytes(&MAGIC);
    w.write_u32(0x9);
    w.write_u8(0);
    w.write_prefixed_string(name, true);
    w.write_u32(0);
    DependencyBlock::default().write(&mut w, false);
    w.write_zeros(0x4C);
    w.write_u32(u32::try_from(objects.len()).unwrap());
    for object in objects {
        w.write_prefixed_string(object.name, true);
        w.write_zeros(0x10);
        DependencyBlock::from_names(object.modules, 0).write(&mut w, false);
        let transform = Transform {
            position: object.position,
            ..Transform::default()
        };
        let group: Vec<&str> = object.group.into_iter().collect();
        write_blob(&mut w, &object_blob(&group, &transform));
    }
    w.into_bytes()
}

/// A fresh scratch directory under the system temp dir.
pub fn scratch_dir(tag: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("ertm-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Route `tracing` output through the test harness.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
