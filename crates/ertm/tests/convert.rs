mod common;

use std::fs;

use common::{Placement, mesh_file, prop_file, scene_file, scratch_dir};
use ertm::{Converter, Error, Output};
use ertm_decode::{LanguageEntry, LanguageRecord};
use glam::Vec3;

#[test]
fn scene_converts_to_obj_and_mtl() {
    let dir = scratch_dir("convert-scene");
    let scene = scene_file(
        "yard",
        &[Placement {
            name: "bench",
            modules: &["bench.prop"],
            group: None,
            position: Vec3::new(0.0, 0.0, 2.0),
        }],
    );
    fs::write(dir.join("yard.scene"), scene).unwrap();
    fs::write(dir.join("bench.prop"), prop_file(&["seat.d3dmesh", "legs.d3dmesh"])).unwrap();
    fs::write(dir.join("seat.d3dmesh"), mesh_file("seat", "tex/wood.dds")).unwrap();
    fs::write(dir.join("legs.d3dmesh"), mesh_file("legs", "color_333.dds")).unwrap();
    fs::write(dir.join("wood.dds"), b"DDS ").unwrap();

    let out = dir.join("out");
    let output = Converter::new()
        .with_out_dir(&out)
        .convert_file(&dir.join("yard.scene"))
        .unwrap();

    let Output::Model {
        obj,
        mtl,
        chunks,
        vertices,
        skipped,
        missing_textures,
    } = output
    else {
        panic!("expected a model");
    };
    assert_eq!(obj, out.join("yard.obj"));
    assert_eq!((chunks, vertices, skipped), (2, 6, 0));
    assert!(missing_textures.is_empty());
    assert!(out.join("wood.dds").is_file());

    let obj_text = fs::read_to_string(&obj).unwrap();
    let lines: Vec<&str> = obj_text.lines().collect();
    assert_eq!(lines[0], "mtllib yard.mtl");
    assert_eq!(lines[1], "v 0 0 2");
    assert!(lines.contains(&"g 0_bench"));
    assert!(lines.contains(&"g 1_bench1"));
    assert!(lines.contains(&"usemtl m_color_333"));
    assert_eq!(lines.last(), Some(&"f 4/4 5/5 6/6"));

    let mtl_text = fs::read_to_string(&mtl).unwrap();
    assert!(mtl_text.starts_with("newmtl m_wood\nKd 1 1 1\n"));
    assert!(mtl_text.contains("newmtl m_color_333\nKd 0.2 0.2 0.2\n"));
    assert!(mtl_text.contains("map_Kd wood.dds\n"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_textures_are_listed() {
    let dir = scratch_dir("convert-textures");
    fs::write(dir.join("rock.d3dmesh"), mesh_file("rock", "tex/granite.dds")).unwrap();

    let output = Converter::new().convert_file(&dir.join("rock.d3dmesh")).unwrap();
    match output {
        Output::Model {
            missing_textures, ..
        } => assert_eq!(missing_textures, vec!["granite"]),
        Output::Strings { .. } => panic!("expected a model"),
    }

    let textures = dir.join("textures");
    fs::create_dir_all(&textures).unwrap();
    fs::write(textures.join("Granite.dds"), b"DDS ").unwrap();
    let output = Converter::new()
        .with_texture_dir(&textures)
        .convert_file(&dir.join("rock.d3dmesh"))
        .unwrap();
    assert!(matches!(output, Output::Model { ref missing_textures, .. } if missing_textures.is_empty()));
    assert!(dir.join("granite.dds").is_file());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn language_table_converts_to_text() {
    let dir = scratch_dir("convert-lang");
    let table = LanguageRecord {
        header: vec![0; 0x4C],
        entries: vec![
            LanguageEntry {
                name: "title".into(),
                text: "Isla Nublar".into(),
                words: [0, 0],
            },
            LanguageEntry {
                name: "quit".into(),
                text: "Quit game".into(),
                words: [1, 0],
            },
        ],
    };
    fs::write(dir.join("english.lang"), table.encode()).unwrap();

    let output = Converter::new().convert_file(&dir.join("english.lang")).unwrap();
    assert_eq!(
        output,
        Output::Strings {
            path: dir.join("english.txt"),
            entries: 2,
        }
    );
    assert_eq!(
        fs::read_to_string(dir.join("english.txt")).unwrap(),
        "title\tIsla Nublar\nquit\tQuit game\n"
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unwritable_output_is_an_io_error() {
    let dir = scratch_dir("convert-unwritable");
    fs::write(dir.join("cup.d3dmesh"), mesh_file("cup", "color_fff.dds")).unwrap();
    // A directory where the OBJ file should go.
    fs::create_dir_all(dir.join("cup.obj")).unwrap();

    let result = Converter::new().convert_file(&dir.join("cup.d3dmesh"));
    match result {
        Err(Error::Io { name, .. }) => assert!(name.ends_with("cup.obj"), "{name}"),
        other => panic!("expected an I/O error, got {other:?}"),
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn batch_reports_each_file() {
    let dir = scratch_dir("convert-batch");
    fs::write(dir.join("good.d3dmesh"), mesh_file("good", "color_fff.dds")).unwrap();
    fs::write(dir.join("bad.d3dmesh"), b"JUNK").unwrap();
    fs::write(dir.join("empty.prop"), prop_file(&["nothing.d3dmesh"])).unwrap();
    fs::write(dir.join("readme.txt"), b"ignored").unwrap();

    let outcomes = Converter::new().convert_all(&[dir.clone()]);
    let summary: Vec<(String, bool)> = outcomes
        .iter()
        .map(|o| {
            let name = o.input.file_name().unwrap().to_string_lossy().into_owned();
            (name, o.result.is_ok())
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("bad.d3dmesh".to_owned(), false),
            ("empty.prop".to_owned(), false),
            ("good.d3dmesh".to_owned(), true),
        ]
    );
    assert!(matches!(outcomes[0].result, Err(Error::Decode { .. })));
    assert!(matches!(outcomes[1].result, Err(Error::NoGeometry { .. })));

    fs::remove_dir_all(&dir).unwrap();
}
