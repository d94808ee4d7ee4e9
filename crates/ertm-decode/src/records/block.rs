//! Building blocks shared by the record decoders: optional string slots and
//! count-prefixed dependency blocks.

use crate::cursor::{Cursor, STRING_HEADER_LEN, Writer};
use crate::dependency::DependencyList;
use crate::error::{DecodeError, DecodeResult};

/// A checksummed string position that may be left empty.
///
/// Empty slots are stored as a bare 8-byte header whose checksum does not
/// match. Both words are kept so the slot re-encodes unchanged, and present
/// names keep their raw bytes (including padding the decoded text drops).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSlot {
    Present { name: String, raw: Vec<u8> },
    Absent { checksum: u32, length: u32 },
}

impl NameSlot {
    pub fn read(c: &mut Cursor<'_>) -> DecodeResult<Self> {
        let start = c.position();
        let [checksum, length] = c.read_words::<2>()?;
        if u64::from(checksum) != u64::from(length) + STRING_HEADER_LEN as u64 {
            return Ok(Self::Absent { checksum, length });
        }
        let name = c.view().string_at(start, true)?;
        let raw = c.read_opaque(length as usize)?;
        Ok(Self::Present { name, raw })
    }

    /// Read a slot that must hold a string.
    pub fn read_required(c: &mut Cursor<'_>) -> DecodeResult<Self> {
        let offset = c.position();
        match Self::read(c)? {
            Self::Absent { checksum, length } => Err(DecodeError::InvalidString {
                offset,
                checksum,
                length,
            }),
            slot => Ok(slot),
        }
    }

    /// A present slot holding `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::Present {
            name: name.to_owned(),
            raw: name.as_bytes().to_vec(),
        }
    }

    /// An empty slot with a zeroed header.
    #[must_use]
    pub fn empty() -> Self {
        Self::Absent {
            checksum: 0,
            length: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Present { name, .. } => Some(name),
            Self::Absent { .. } => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn write(&self, w: &mut Writer) {
        match self {
            Self::Present { raw, .. } => {
                let len = raw.len() as u32;
                w.write_u32(len + STRING_HEADER_LEN as u32);
                w.write_u32(len);
                w.write_bytes(raw);
            }
            Self::Absent { checksum, length } => w.write_words(&[*checksum, *length]),
        }
    }
}

/// One entry of a dependency block: a name plus an opaque trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// A `u32` count followed by `count` names, each followed by `entry_data_len` opaque bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyBlock {
    pub entries: Vec<DependencyEntry>,
}

impl DependencyBlock {
    /// Read a block at the cursor. Every string is mandatory here.
    pub fn read(c: &mut Cursor<'_>, entry_data_len: usize, checksum: bool) -> DecodeResult<Self> {
        let count = c.read_u32()?;
        let min_entry = 4 + if checksum { 4 } else { 0 } + entry_data_len;
        let mut entries = Vec::with_capacity(c.capacity_hint(count, min_entry));
        for _ in 0..count {
            let name = c.read_prefixed_string(checksum)?;
            let data = c.read_opaque(entry_data_len)?;
            entries.push(DependencyEntry { name, data });
        }
        Ok(Self { entries })
    }

    /// The names in block order.
    #[must_use]
    pub fn names(&self) -> DependencyList {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self, checksum: bool) -> usize {
        let header = if checksum { STRING_HEADER_LEN } else { 4 };
        4 + self
            .entries
            .iter()
            .map(|e| header + e.name.len() + e.data.len())
            .sum::<usize>()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn write(&self, w: &mut Writer, checksum: bool) {
        w.write_u32(self.entries.len() as u32);
        for e in &self.entries {
            w.write_prefixed_string(&e.name, checksum);
            w.write_bytes(&e.data);
        }
    }

    /// Build a block of names with zeroed trailers.
    #[must_use]
    pub fn from_names(names: &[&str], entry_data_len: usize) -> Self {
        Self {
            entries: names
                .iter()
                .map(|&name| DependencyEntry {
                    name: name.to_owned(),
                    data: vec![0; entry_data_len],
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_keep_raw_bytes() {
        let mut w = Writer::new();
        w.write_prefixed_string("tex.dds\0", true);
        w.write_words(&[0, 0]);
        let data = w.into_bytes();

        let mut c = Cursor::new(&data);
        let present = NameSlot::read(&mut c).unwrap();
        assert_eq!(present.name(), Some("tex.dds"));
        let absent = NameSlot::read(&mut c).unwrap();
        assert_eq!(absent, NameSlot::empty());
        assert!(c.is_at_end());

        let mut out = Writer::new();
        present.write(&mut out);
        absent.write(&mut out);
        assert_eq!(out.into_bytes(), data);
    }

    #[test]
    fn required_slot_rejects_bare_header() {
        let data = [0u8; 8];
        assert!(matches!(
            NameSlot::read_required(&mut Cursor::new(&data)),
            Err(DecodeError::InvalidString { offset: 0, .. })
        ));
    }

    #[test]
    fn reads_block_without_checksum() {
        let block = DependencyBlock::from_names(&["a.prop", "b.prop"], 0);
        let mut w = Writer::new();
        block.write(&mut w, false);
        let data = w.into_bytes();
        assert_eq!(data.len(), block.encoded_len(false));

        let mut c = Cursor::new(&data);
        let read = DependencyBlock::read(&mut c, 0, false).unwrap();
        assert!(c.is_at_end());
        assert_eq!(read.names().names, vec!["a.prop", "b.prop"]);
    }

    #[test]
    fn reads_block_with_trailers() {
        let mut block = DependencyBlock::from_names(&["rock.d3dmesh"], 0x10);
        block.entries[0].data[3] = 7;
        let mut w = Writer::new();
        block.write(&mut w, true);
        let data = w.into_bytes();

        let read = DependencyBlock::read(&mut Cursor::new(&data), 0x10, true).unwrap();
        assert_eq!(read, block);
    }

    #[test]
    fn truncated_block_fails() {
        let mut w = Writer::new();
        w.write_u32(3);
        w.write_prefixed_string("only-one", false);
        let data = w.into_bytes();
        assert!(DependencyBlock::read(&mut Cursor::new(&data), 0, false).is_err());
    }
}
