//! Prop records (`.prop`): a reusable object that names the meshes it is built from.

use crate::cursor::Cursor;
use crate::dependency::DependencyList;
use crate::error::{DecodeError, DecodeResult};
use crate::options::DecodeOptions;
use crate::records::block::DependencyBlock;
use crate::records::scene::read_object_blob;
use crate::resolve::{self, ObjectMeta, prop_markers};
use crate::transform::Transform;

/// Subtypes a prop record may carry.
pub const PROP_SUBTYPES: std::ops::RangeInclusive<u32> = 0x2..=0x5;

/// Fields between the opaque header and the module block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropHeader {
    /// Subtypes 2 to 4.
    Words([u32; 3]),
    /// Subtype 5.
    Identified { identifier: [u8; 8], data: Vec<u8> },
}

impl PropHeader {
    /// The word at `0xC` of the subtype 5 data block.
    #[must_use]
    pub fn identified_word(&self) -> Option<u32> {
        match self {
            Self::Words(_) => None,
            Self::Identified { data, .. } => crate::cursor::ByteView::new(data).u32_at(0xC).ok(),
        }
    }
}

fn header_len(subtype: u32) -> usize {
    match subtype {
        0x4 | 0x5 => 0x30,
        0x3 => 0x24,
        _ => 0x18,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropRecord {
    pub subtype: u32,
    pub header: Vec<u8>,
    pub fields: PropHeader,
    pub modules: DependencyList,
    pub blob: Vec<u8>,
    pub meta: ObjectMeta,
}

impl PropRecord {
    /// Read a prop; the cursor must sit just past the file header.
    pub fn read(c: &mut Cursor<'_>, subtype: u32, options: &DecodeOptions) -> DecodeResult<Self> {
        if !PROP_SUBTYPES.contains(&subtype) {
            return Err(DecodeError::UnsupportedSubtype {
                kind: "prop",
                subtype,
            });
        }
        let header = c.read_opaque(header_len(subtype))?;
        let fields = if subtype == 0x5 {
            let mut identifier = [0u8; 8];
            identifier.copy_from_slice(c.read_bytes(8)?);
            PropHeader::Identified {
                identifier,
                data: c.read_opaque(0x10)?,
            }
        } else {
            PropHeader::Words(c.read_words()?)
        };
        let modules = DependencyBlock::read(c, 0, false)?.names();
        let blob = read_object_blob(c, "prop data")?;
        let meta = resolve::resolve_object(&blob, prop_markers(subtype), &options.resolver);

        tracing::debug!(
            "prop subtype {subtype:#x}: {} modules, {} dependencies",
            modules.len(),
            meta.dependency_names().count()
        );
        Ok(Self {
            subtype,
            header,
            fields,
            modules,
            blob,
            meta,
        })
    }

    #[must_use]
    pub fn dependencies(&self) -> &[DependencyList] {
        &self.meta.dependencies
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.meta.transform
    }

    /// Dependency entries naming mesh files, in order.
    pub fn meshes(&self) -> impl Iterator<Item = &str> {
        self.meta
            .dependencies
            .iter()
            .flat_map(|list| list.with_extension("d3dmesh"))
    }
}
