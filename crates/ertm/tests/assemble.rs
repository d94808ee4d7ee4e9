mod common;

use common::{Placement, init_logging, mesh_file, prop_file, scene_file};
use ertm::{Assembler, Error, MemorySource};
use glam::Vec3;
use proptest::prelude::*;

fn village() -> MemorySource {
    init_logging();
    MemorySource::new()
        .with_file(
            "village.scene",
            scene_file(
                "village",
                &[
                    Placement {
                        name: "house",
                        modules: &["house.prop"],
                        group: None,
                        position: Vec3::new(10.0, 0.0, 0.0),
                    },
                    Placement {
                        name: "door",
                        modules: &["door.prop"],
                        group: Some("house"),
                        position: Vec3::new(0.0, 5.0, 0.0),
                    },
                    Placement {
                        name: "well",
                        modules: &["well.prop"],
                        group: None,
                        position: Vec3::new(0.0, 0.0, -3.0),
                    },
                ],
            ),
        )
        .with_file("house.prop", prop_file(&["wall.d3dmesh"]))
        .with_file("door.prop", prop_file(&["door.d3dmesh", "hinge.d3dmesh"]))
        .with_file("well.prop", prop_file(&["stone.prop"]))
        .with_file("stone.prop", prop_file(&["Stone.D3DMESH"]))
        .with_file("wall.d3dmesh", mesh_file("wall", "tex/wall.dds"))
        .with_file("door.d3dmesh", mesh_file("door", "tex/door.dds"))
        .with_file("stone.d3dmesh", mesh_file("stone", "color_808080.dds"))
}

#[test]
fn scene_objects_are_placed_and_merged() {
    let mut assembler = Assembler::new(village());
    let assembly = assembler.assemble_scene("village.scene").unwrap();

    let names: Vec<&str> = assembly.objects.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["house", "well"]);

    let house = &assembly.objects[0].mesh;
    assert_eq!(house.vertices.len(), 6);
    assert_eq!(house.triangles.len(), 2);
    assert_eq!(house.vertices[0].position, Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(house.vertices[4].position, Vec3::new(11.0, 5.0, 0.0));
    assert_eq!(house.triangles[1].0, [3, 4, 5]);
    house.validate().unwrap();

    let owners: Vec<Option<&str>> = house.chunks.iter().map(|c| c.owner.as_deref()).collect();
    assert_eq!(owners, vec![Some("house"), Some("door")]);
    assert_eq!(house.chunks[1].face_offset, 1);
    assert_eq!(house.chunks[1].first_vertex, 3);

    let well = &assembly.objects[1].mesh;
    assert_eq!(well.vertices[2].position, Vec3::new(0.0, 1.0, -3.0));
    assert_eq!(well.chunks[0].owner.as_deref(), Some("well"));
}

#[test]
fn missing_references_are_reported() {
    let mut assembler = Assembler::new(village());
    let assembly = assembler.assemble_scene("village.scene").unwrap();

    assert_eq!(
        assembly.report.missing().collect::<Vec<_>>(),
        vec!["hinge.d3dmesh"]
    );
    // Four props and three meshes.
    assert_eq!(assembly.report.files_loaded, 7);
}

#[test]
fn combined_mesh_keeps_every_object() {
    let mut assembler = Assembler::new(village());
    let assembly = assembler.assemble_scene("village.scene").unwrap();
    let combined = assembly.combined();
    assert_eq!(combined.vertices.len(), 9);
    assert_eq!(combined.chunks.len(), 3);
    assert_eq!(combined.textures(), vec!["wall", "door", "color_808080"]);
    combined.validate().unwrap();
}

#[test]
fn undecodable_reference_is_skipped() {
    let source = MemorySource::new()
        .with_file("crate.prop", prop_file(&["broken.d3dmesh", "lid.d3dmesh"]))
        .with_file("broken.d3dmesh", b"ERTM\x0d\0\0\0\x01\x02".to_vec())
        .with_file("lid.d3dmesh", mesh_file("lid", "tex/lid.dds"));
    let mut assembler = Assembler::new(source);
    let assembly = assembler.assemble_prop("crate.prop").unwrap();

    assert_eq!(assembly.objects.len(), 1);
    assert_eq!(assembly.objects[0].mesh.vertices.len(), 3);
    assert_eq!(assembly.report.skipped.len(), 1);
    assert!(matches!(
        &assembly.report.skipped[0],
        Error::Decode { name, .. } if name == "broken.d3dmesh"
    ));
}

#[test]
fn prop_cycle_is_an_error() {
    let source = MemorySource::new()
        .with_file("a.prop", prop_file(&["b.prop"]))
        .with_file("b.prop", prop_file(&["A.prop"]));
    let mut assembler = Assembler::new(source);
    match assembler.assemble_prop("a.prop") {
        Err(Error::CyclicReference { chain }) => {
            assert_eq!(chain, vec!["a.prop", "b.prop", "A.prop"]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }
}

#[test]
fn shared_props_are_not_cycles() {
    let source = MemorySource::new()
        .with_file(
            "pair.scene",
            scene_file(
                "pair",
                &[
                    Placement {
                        name: "left",
                        modules: &["tree.prop"],
                        group: None,
                        position: Vec3::ZERO,
                    },
                    Placement {
                        name: "right",
                        modules: &["tree.prop"],
                        group: None,
                        position: Vec3::X,
                    },
                ],
            ),
        )
        .with_file("tree.prop", prop_file(&["tree.d3dmesh"]))
        .with_file("tree.d3dmesh", mesh_file("tree", "tex/bark.dds"));
    let mut assembler = Assembler::new(source);
    let assembly = assembler.assemble_scene("pair.scene").unwrap();
    assert_eq!(assembly.objects.len(), 2);
    assert_eq!(assembly.objects[1].mesh.vertices[0].position, Vec3::X);
    assert!(assembly.report.skipped.is_empty());
}

#[test]
fn single_mesh_loads() {
    let mut assembler = Assembler::new(village());
    let mesh = assembler.load_mesh("door.d3dmesh").unwrap();
    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.chunks[0].texture_base_name(), "door");
    assert!(matches!(
        assembler.load_mesh("house.prop"),
        Err(Error::Decode { .. })
    ));
}

proptest! {
    #[test]
    fn corrupt_references_never_abort(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
        let mut junk = b"ERTM\x0d\0\0\0".to_vec();
        junk.extend_from_slice(&tail);
        let source = MemorySource::new()
            .with_file("box.prop", prop_file(&["junk.d3dmesh"]))
            .with_file("junk.d3dmesh", junk);
        let mut assembler = Assembler::new(source);
        let assembly = assembler.assemble_prop("box.prop").unwrap();
        prop_assert_eq!(assembly.objects.len(), 1);
    }
}
