//! Record decoders, one per asset kind.
//!
//! [`decode`] picks a decoder from the subtype table. Prop subtypes overlap
//! other codes, so callers that know a file's kind from its name should use
//! [`decode_as`] instead.

pub mod block;
pub mod language;
pub mod mesh;
pub mod prop;
pub mod scene;

use crate::cursor::Cursor;
use crate::dependency::DependencyList;
use crate::error::{DecodeError, DecodeResult};
use crate::header::{AssetKind, FileHeader};
use crate::mesh::Mesh;
use crate::options::DecodeOptions;
use crate::transform::Transform;

pub use block::{DependencyBlock, DependencyEntry, NameSlot};
pub use language::{LanguageEntry, LanguageRecord};
pub use mesh::MeshRecord;
pub use prop::PropRecord;
pub use scene::{SceneObject, SceneRecord};

/// Any decoded resource file.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Mesh(MeshRecord),
    Scene(SceneRecord),
    Prop(PropRecord),
    Language(LanguageRecord),
}

impl Record {
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Mesh(m) if m.is_skeletal() => AssetKind::SkeletalMesh,
            Self::Mesh(_) => AssetKind::StaticMesh,
            Self::Scene(_) => AssetKind::Scene,
            Self::Prop(_) => AssetKind::Prop,
            Self::Language(_) => AssetKind::Language,
        }
    }

    /// The geometry of a mesh record; other kinds hold none of their own.
    pub fn to_mesh(&self, options: &DecodeOptions) -> DecodeResult<Option<Mesh>> {
        match self {
            Self::Mesh(m) => m.to_mesh(options).map(Some),
            _ => Ok(None),
        }
    }

    /// Every dependency list the record carries.
    #[must_use]
    pub fn dependency_lists(&self) -> Vec<&DependencyList> {
        match self {
            Self::Scene(scene) => std::iter::once(&scene.dependencies)
                .chain(
                    scene
                        .objects
                        .iter()
                        .flat_map(|o| std::iter::once(&o.modules).chain(&o.dependencies)),
                )
                .collect(),
            Self::Prop(prop) => std::iter::once(&prop.modules)
                .chain(prop.dependencies())
                .collect(),
            Self::Mesh(_) | Self::Language(_) => Vec::new(),
        }
    }

    /// Every transform the record carries.
    #[must_use]
    pub fn transforms(&self) -> Vec<&Transform> {
        match self {
            Self::Scene(scene) => scene.objects.iter().map(|o| &o.transform).collect(),
            Self::Prop(prop) => vec![prop.transform()],
            Self::Mesh(_) | Self::Language(_) => Vec::new(),
        }
    }
}

/// Decode a resource, choosing the decoder from the header subtype.
pub fn decode(bytes: &[u8], options: &DecodeOptions) -> DecodeResult<Record> {
    let mut c = Cursor::new(bytes);
    let header = FileHeader::read(&mut c)?;
    let kind = header.kind().ok_or(DecodeError::UnsupportedSubtype {
        kind: "resource",
        subtype: header.subtype,
    })?;
    read_record(&mut c, kind, header.subtype, options)
}

/// Decode a resource known to be of `kind`; the header is still validated.
pub fn decode_as(kind: AssetKind, bytes: &[u8], options: &DecodeOptions) -> DecodeResult<Record> {
    let mut c = Cursor::new(bytes);
    let header = FileHeader::read(&mut c)?;
    read_record(&mut c, kind, header.subtype, options)
}

/// Decode a mesh file.
pub fn decode_mesh(bytes: &[u8]) -> DecodeResult<MeshRecord> {
    let mut c = Cursor::new(bytes);
    let header = FileHeader::read(&mut c)?;
    MeshRecord::read(&mut c, header.subtype)
}

/// Decode a scene file.
pub fn decode_scene(bytes: &[u8], options: &DecodeOptions) -> DecodeResult<SceneRecord> {
    let mut c = Cursor::new(bytes);
    let header = FileHeader::read(&mut c)?;
    SceneRecord::read(&mut c, header.subtype, options)
}

/// Decode a prop file.
pub fn decode_prop(bytes: &[u8], options: &DecodeOptions) -> DecodeResult<PropRecord> {
    let mut c = Cursor::new(bytes);
    let header = FileHeader::read(&mut c)?;
    PropRecord::read(&mut c, header.subtype, options)
}

/// Decode a language table.
pub fn decode_language(bytes: &[u8]) -> DecodeResult<LanguageRecord> {
    let mut c = Cursor::new(bytes);
    let header = FileHeader::read(&mut c)?;
    LanguageRecord::read(&mut c, header.subtype)
}

fn read_record(
    c: &mut Cursor<'_>,
    kind: AssetKind,
    subtype: u32,
    options: &DecodeOptions,
) -> DecodeResult<Record> {
    Ok(match kind {
        AssetKind::StaticMesh | AssetKind::SkeletalMesh => {
            Record::Mesh(MeshRecord::read(c, subtype)?)
        }
        AssetKind::Scene => Record::Scene(SceneRecord::read(c, subtype, options)?),
        AssetKind::Prop => Record::Prop(PropRecord::read(c, subtype, options)?),
        AssetKind::Language => Record::Language(LanguageRecord::read(c, subtype)?),
        AssetKind::Skeleton => {
            return Err(DecodeError::UnsupportedSubtype {
                kind: kind.name(),
                subtype,
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshChunk, Triangle, Vertex};
    use glam::{Vec2, Vec3};
    use proptest::prelude::*;

    fn triangle_mesh() -> Mesh {
        Mesh {
            vertices: [Vec3::ZERO, Vec3::X, Vec3::Y]
                .into_iter()
                .map(|p| Vertex::new(p, Vec2::ZERO))
                .collect(),
            triangles: vec![Triangle([0, 1, 2])],
            chunks: vec![MeshChunk {
                last_vertex: 2,
                face_count: 1,
                diffuse_texture: "leaf.dds".into(),
                ..MeshChunk::default()
            }],
        }
    }

    #[test]
    fn dispatches_by_subtype() {
        let bytes = MeshRecord::from_mesh("tri", &triangle_mesh()).unwrap().encode();
        let record = decode(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(record.kind(), AssetKind::StaticMesh);
        let mesh = record.to_mesh(&DecodeOptions::default()).unwrap().unwrap();
        assert_eq!(mesh.triangles, triangle_mesh().triangles);
        assert!(record.dependency_lists().is_empty());

        let scene = scene::fixtures::scene_file(&[("a", &["a.prop"], None)]);
        let record = decode(&scene, &DecodeOptions::default()).unwrap();
        assert_eq!(record.kind(), AssetKind::Scene);
        assert_eq!(record.transforms().len(), 1);
        assert_eq!(record.dependency_lists().len(), 3);
        assert_eq!(record.to_mesh(&DecodeOptions::default()).unwrap(), None);
    }

    #[test]
    fn prop_subtypes_need_explicit_kind() {
        let bytes = super::prop::fixtures::prop_file(0x2, &[], &["x.d3dmesh"]);
        assert!(matches!(
            decode(&bytes, &DecodeOptions::default()),
            Err(DecodeError::UnsupportedSubtype { subtype: 0x2, .. })
        ));
        let record = decode_as(AssetKind::Prop, &bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(record.kind(), AssetKind::Prop);
        assert_eq!(record.dependency_lists()[1].names, vec!["x.d3dmesh"]);
    }

    #[test]
    fn skeletons_and_unknown_codes_are_unsupported() {
        for subtype in [0x7u32, 0x1, 0x42] {
            let mut bytes = b"ERTM".to_vec();
            bytes.extend_from_slice(&subtype.to_le_bytes());
            bytes.extend_from_slice(&[0; 64]);
            assert!(matches!(
                decode(&bytes, &DecodeOptions::default()),
                Err(DecodeError::UnsupportedSubtype { .. })
            ));
        }
    }

    #[test]
    fn explicit_kind_checks_the_subtype() {
        let mut scene = scene::fixtures::scene_file(&[("a", &[], None)]);
        scene[4] = 0x42;
        assert!(matches!(
            decode_scene(&scene, &DecodeOptions::default()),
            Err(DecodeError::UnsupportedSubtype { kind: "scene", subtype: 0x42 })
        ));

        let mut table = LanguageRecord {
            header: vec![0; 0x4C],
            entries: Vec::new(),
        }
        .encode();
        assert!(decode_language(&table).is_ok());
        table[4] = 0xD;
        assert!(matches!(
            decode_language(&table),
            Err(DecodeError::UnsupportedSubtype { kind: "language", subtype: 0xD })
        ));
        assert!(matches!(
            decode_as(AssetKind::Language, &table, &DecodeOptions::default()),
            Err(DecodeError::UnsupportedSubtype { .. })
        ));
    }

    #[test]
    fn bad_magic_is_fatal() {
        assert!(matches!(
            decode_as(AssetKind::Scene, b"MTRE\x09\0\0\0", &DecodeOptions::default()),
            Err(DecodeError::InvalidMagic { .. })
        ));
    }

    proptest! {
        #[test]
        fn decode_never_panics(subtype in 0u32..16, tail in proptest::collection::vec(any::<u8>(), 0..512)) {
            let mut bytes = b"ERTM".to_vec();
            bytes.extend_from_slice(&subtype.to_le_bytes());
            bytes.extend_from_slice(&tail);
            let options = DecodeOptions::default();
            let _ = decode(&bytes, &options);
            for kind in [AssetKind::StaticMesh, AssetKind::Scene, AssetKind::Prop, AssetKind::Language] {
                let _ = decode_as(kind, &bytes, &options);
            }
        }
    }
}
