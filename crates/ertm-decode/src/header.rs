//! File header and subtype dispatch table.

use std::fmt;

use crate::cursor::Cursor;
use crate::error::{DecodeError, DecodeResult};

/// Magic bytes at the start of every resource file.
pub const MAGIC: [u8; 4] = *b"ERTM";

/// The kind of record a resource file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    StaticMesh,
    SkeletalMesh,
    Scene,
    Prop,
    Language,
    /// Recognised, but no decoder exists for it.
    Skeleton,
}

/// Subtype codes and the record kind they select.
const SUBTYPES: &[(u32, AssetKind)] = &[
    (0x3, AssetKind::Prop),
    (0x4, AssetKind::Language),
    (0x6, AssetKind::Scene),
    (0x7, AssetKind::Skeleton),
    (0x9, AssetKind::Scene),
    (0xA, AssetKind::Scene),
    (0xD, AssetKind::StaticMesh),
    (0xE, AssetKind::SkeletalMesh),
];

impl AssetKind {
    /// Look up the kind for a subtype code.
    #[must_use]
    pub fn from_subtype(subtype: u32) -> Option<Self> {
        SUBTYPES
            .iter()
            .find(|(code, _)| *code == subtype)
            .map(|&(_, kind)| kind)
    }

    /// Guess the kind from a file extension (case-insensitive, without the dot).
    ///
    /// Mesh files map to [`AssetKind::StaticMesh`]; the subtype decides the
    /// actual mesh flavour when decoding.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "d3dmesh" => Some(Self::StaticMesh),
            "scene" => Some(Self::Scene),
            "prop" => Some(Self::Prop),
            "lang" => Some(Self::Language),
            "skl" => Some(Self::Skeleton),
            _ => None,
        }
    }

    /// Guess the kind from a file name's extension.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        extension(name).and_then(Self::from_extension)
    }

    #[must_use]
    pub fn is_mesh(self) -> bool {
        matches!(self, Self::StaticMesh | Self::SkeletalMesh)
    }

    /// Short name used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::StaticMesh => "static mesh",
            Self::SkeletalMesh => "skeletal mesh",
            Self::Scene => "scene",
            Self::Prop => "prop",
            Self::Language => "language",
            Self::Skeleton => "skeleton",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Extension of a file name, without the dot.
#[must_use]
pub fn extension(name: &str) -> Option<&str> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    file.rfind('.').map(|dot| &file[dot + 1..])
}

/// The fixed 8-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub subtype: u32,
}

impl FileHeader {
    /// Read and validate the header from the start of a cursor.
    pub fn read(c: &mut Cursor<'_>) -> DecodeResult<Self> {
        let magic = c.read_magic()?;
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic { found: magic });
        }
        let subtype = c.read_u32()?;
        Ok(Self { subtype })
    }

    /// Sniff the header of a buffer without decoding anything else.
    pub fn peek(data: &[u8]) -> DecodeResult<Self> {
        Self::read(&mut Cursor::new(data))
    }

    /// The kind selected by the subtype table.
    #[must_use]
    pub fn kind(&self) -> Option<AssetKind> {
        AssetKind::from_subtype(self.subtype)
    }
}
