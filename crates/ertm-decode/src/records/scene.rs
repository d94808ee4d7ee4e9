//! Scene records (`.scene`): a named list of placed objects.

use crate::cursor::Cursor;
use crate::dependency::DependencyList;
use crate::error::{DecodeError, DecodeResult};
use crate::hierarchy;
use crate::options::DecodeOptions;
use crate::records::block::DependencyBlock;
use crate::resolve::{self, ObjectMeta, SCENE_MARKERS};
use crate::transform::Transform;

/// Subtypes that carry a scene.
pub const SCENE_SUBTYPES: [u32; 3] = [0x6, 0x9, 0xA];

const SCENE_HEADER_LEN: usize = 0x4C;
const OBJECT_HEADER_LEN: usize = 0x10;

/// One placed object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneObject {
    pub name: String,
    /// Files the object is built from, usually `.prop`.
    pub modules: DependencyList,
    /// Lists recovered from the object blob.
    pub dependencies: Vec<DependencyList>,
    pub transform: Transform,
    /// Name of the parent object, if the blob names exactly one.
    pub group: Option<String>,
    /// Filled in by [`hierarchy::build`].
    pub children: Vec<SceneObject>,
    pub header: Vec<u8>,
    /// The raw object blob the dependencies and transform came from.
    pub blob: Vec<u8>,
}

impl SceneObject {
    /// An object with identity transform and no references.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder helper setting the parent name.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    fn read(c: &mut Cursor<'_>, options: &DecodeOptions) -> DecodeResult<Self> {
        let name = c.read_prefixed_string(true)?;
        let header = c.read_opaque(OBJECT_HEADER_LEN)?;
        let modules = DependencyBlock::read(c, 0, false)?.names();
        let blob = read_object_blob(c, "scene object")?;

        let ObjectMeta {
            dependencies,
            transform,
            ..
        } = resolve::resolve_object(&blob, SCENE_MARKERS, &options.resolver);
        let group = group_of(&dependencies);

        tracing::debug!(
            "scene object {name:?}: {} modules, group {group:?}",
            modules.len()
        );
        Ok(Self {
            name,
            modules,
            dependencies,
            transform,
            group,
            children: Vec::new(),
            header,
            blob,
        })
    }

    /// Number of objects in this subtree, itself included.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// The single name of a single dependency list is the parent group.
fn group_of(dependencies: &[DependencyList]) -> Option<String> {
    match dependencies {
        [list] if list.len() == 1 => list.names.first().cloned(),
        _ => None,
    }
}

/// Read a size-prefixed object blob. The size counts its own word.
pub(crate) fn read_object_blob(c: &mut Cursor<'_>, context: &'static str) -> DecodeResult<Vec<u8>> {
    let offset = c.position();
    let size = c.read_u32()?;
    let len = (size as usize)
        .checked_sub(4)
        .ok_or_else(|| DecodeError::Malformed {
            context,
            message: format!("blob size {size} at offset {offset:#x} is smaller than its size word"),
        })?;
    c.read_opaque(len)
}

/// Write a blob with its inclusive size prefix.
#[cfg(test)]
pub(crate) fn write_object_blob(w: &mut crate::cursor::Writer, blob: &[u8]) {
    w.write_u32(u32::try_from(blob.len() + 4).unwrap());
    w.write_bytes(blob);
}

/// A decoded scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRecord {
    pub subtype: u32,
    pub lead: u8,
    pub name: String,
    pub unknown: u32,
    /// Files the scene as a whole references.
    pub dependencies: DependencyList,
    pub header: Vec<u8>,
    /// Objects in file order, before hierarchy resolution.
    pub objects: Vec<SceneObject>,
}

impl SceneRecord {
    /// Read a scene; the cursor must sit just past the file header.
    pub fn read(c: &mut Cursor<'_>, subtype: u32, options: &DecodeOptions) -> DecodeResult<Self> {
        if !SCENE_SUBTYPES.contains(&subtype) {
            return Err(DecodeError::UnsupportedSubtype {
                kind: "scene",
                subtype,
            });
        }
        let lead = c.read_u8()?;
        let name = c.read_prefixed_string(true)?;
        let unknown = c.read_u32()?;
        let dependencies = DependencyBlock::read(c, 0, false)?.names();
        let header = c.read_opaque(SCENE_HEADER_LEN)?;

        let count = c.read_u32()?;
        let mut objects = Vec::with_capacity(c.capacity_hint(count, 8 + OBJECT_HEADER_LEN + 8));
        for _ in 0..count {
            objects.push(SceneObject::read(c, options)?);
        }

        tracing::debug!("scene {name:?}: {} objects", objects.len());
        Ok(Self {
            subtype,
            lead,
            name,
            unknown,
            dependencies,
            header,
            objects,
        })
    }

    /// The objects arranged as a tree; only roots are returned.
    #[must_use]
    pub fn hierarchy(&self) -> Vec<SceneObject> {
        hierarchy::build(self.objects.clone())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::scene_file;
    use super::*;
    use crate::cursor::Writer;
    use crate::header::FileHeader;
    use glam::Vec3;

    fn decode(data: &[u8]) -> DecodeResult<SceneRecord> {
        let mut c = Cursor::new(data);
        let header = FileHeader::read(&mut c)?;
        SceneRecord::read(&mut c, header.subtype, &DecodeOptions::default())
    }

    #[test]
    fn reads_objects() {
        let data = scene_file(&[
            ("root", &["house.prop"], None),
            ("door", &["door.prop", "frame.prop"], Some("root")),
        ]);
        let scene = decode(&data).unwrap();
        assert_eq!(scene.name, "level");
        assert_eq!(scene.dependencies.names, vec!["level.lang"]);
        assert_eq!(scene.objects.len(), 2);

        let door = &scene.objects[1];
        assert_eq!(door.name, "door");
        assert_eq!(door.modules.names, vec!["door.prop", "frame.prop"]);
        assert_eq!(door.group.as_deref(), Some("root"));
        assert_eq!(door.transform.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.objects[0].group, None);
    }

    #[test]
    fn hierarchy_links_groups() {
        let data = scene_file(&[
            ("a", &[], None),
            ("b", &[], Some("a")),
            ("c", &[], Some("b")),
        ]);
        let roots = decode(&data).unwrap().hierarchy();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "a");
        assert_eq!(roots[0].children[0].children[0].name, "c");
        assert_eq!(roots[0].subtree_len(), 3);
    }

    #[test]
    fn multi_name_blob_has_no_group() {
        let deps = vec![DependencyList::from(vec!["a".to_owned(), "b".to_owned()])];
        assert_eq!(group_of(&deps), None);
        let two_lists = vec![DependencyList::from(vec!["a".to_owned()]); 2];
        assert_eq!(group_of(&two_lists), None);
        assert_eq!(group_of(&[]), None);
    }

    #[test]
    fn undersized_blob_is_malformed() {
        let mut w = Writer::new();
        w.write_u32(3);
        let data = w.into_bytes();
        assert!(matches!(
            read_object_blob(&mut Cursor::new(&data), "test"),
            Err(DecodeError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_object_name_fails() {
        let mut data = scene_file(&[("only", &[], None)]);
        // Corrupt the object name checksum.
        let at = data.windows(4).position(|w| w == b"only").unwrap() - 8;
        data[at] ^= 0xFF;
        assert!(matches!(decode(&data), Err(DecodeError::InvalidString { .. })));
    }

    #[test]
    fn other_subtypes_are_rejected() {
        let mut data = scene_file(&[("a", &["a.prop"], None)]);
        data[4] = 0x42;
        assert!(matches!(
            decode(&data),
            Err(DecodeError::UnsupportedSubtype {
                kind: "scene",
                subtype: 0x42
            })
        ));
        for subtype in SCENE_SUBTYPES {
            data[4] = u8::try_from(subtype).unwrap();
            assert_eq!(decode(&data).unwrap().subtype, subtype);
        }
    }

    #[test]
    fn truncated_scene_fails() {
        let data = scene_file(&[("a", &["a.prop"], None)]);
        assert!(matches!(
            decode(&data[..data.len() - 1]),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }
}
