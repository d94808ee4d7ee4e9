//! Print a JSON summary of a decoded resource file.
//!
//! The decoder is chosen from the file extension when it is known, otherwise
//! from the header subtype.
//!
//! Run: `cargo run -p ertm --features tools --bin ertm-inspect -- <file>`

use std::env;
use std::fs;

use ertm_decode::{AssetKind, DecodeOptions, Record, SceneObject, Transform};
use serde_json::{Value, json};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("Usage: ertm-inspect <file>");
        std::process::exit(2);
    };

    let bytes = fs::read(path)?;
    let options = DecodeOptions::default();
    let record = match AssetKind::from_file_name(path) {
        Some(kind) => ertm_decode::decode_as(kind, &bytes, &options)?,
        None => ertm_decode::decode(&bytes, &options)?,
    };

    let summary = summarize(&record, &options);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn summarize(record: &Record, options: &DecodeOptions) -> Value {
    match record {
        Record::Mesh(mesh) => {
            let geometry = mesh.to_mesh(options);
            json!({
                "kind": record.kind().name(),
                "name": mesh.name(),
                "subtype": mesh.subtype,
                "bounds": [vec3(mesh.bounds_min), vec3(mesh.bounds_max)],
                "vertex_count": mesh.positions.len(),
                "vertex_stride": mesh.vertex_stride,
                "triangle_count": mesh.triangles.len(),
                "uv_scale": [mesh.uv_scale().x, mesh.uv_scale().y],
                "chunks": mesh.chunks.iter().map(|chunk| json!({
                    "first_vertex": chunk.first_vertex,
                    "last_vertex": chunk.last_vertex,
                    "face_offset": chunk.face_offset(),
                    "face_count": chunk.face_count,
                    "diffuse_texture": chunk.diffuse_texture(),
                    "material_index": chunk.material_index(),
                })).collect::<Vec<_>>(),
                "material_files": mesh.material.file_names().collect::<Vec<_>>(),
                "valid": geometry.as_ref().map_or_else(|e| json!(e.to_string()), |_| json!(true)),
            })
        }
        Record::Scene(scene) => json!({
            "kind": "scene",
            "name": scene.name,
            "subtype": scene.subtype,
            "dependencies": scene.dependencies.names,
            "object_count": scene.objects.len(),
            "hierarchy": scene.hierarchy().iter().map(object).collect::<Vec<_>>(),
        }),
        Record::Prop(prop) => json!({
            "kind": "prop",
            "subtype": prop.subtype,
            "modules": prop.modules.names,
            "dependencies": prop.dependencies().iter().map(|l| &l.names).collect::<Vec<_>>(),
            "meshes": prop.meshes().collect::<Vec<_>>(),
            "transform": transform(prop.transform()),
        }),
        Record::Language(table) => json!({
            "kind": "language",
            "entries": table.entries.iter().map(|e| json!({
                "name": e.name,
                "text": e.text,
            })).collect::<Vec<_>>(),
        }),
    }
}

fn object(object: &SceneObject) -> Value {
    json!({
        "name": object.name,
        "modules": object.modules.names,
        "group": object.group,
        "transform": transform(&object.transform),
        "children": object.children.iter().map(self::object).collect::<Vec<_>>(),
    })
}

fn transform(t: &Transform) -> Value {
    json!({
        "position": vec3(t.position),
        "rotation": [t.rotation.x, t.rotation.y, t.rotation.z, t.rotation.w],
        "scale": vec3(t.scale),
    })
}

fn vec3(v: glam::Vec3) -> Value {
    json!([v.x, v.y, v.z])
}
