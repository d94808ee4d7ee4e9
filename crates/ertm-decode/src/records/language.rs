//! Localization tables (`.lang`).

use crate::cursor::{Cursor, Writer};
use crate::error::{DecodeError, DecodeResult};
use crate::header::MAGIC;

pub const LANGUAGE_SUBTYPE: u32 = 0x4;
const LANGUAGE_HEADER_LEN: usize = 0x4C;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    pub name: String,
    pub text: String,
    pub words: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    pub header: Vec<u8>,
    pub entries: Vec<LanguageEntry>,
}

impl LanguageRecord {
    /// Read a table; the cursor must sit just past the file header.
    pub fn read(c: &mut Cursor<'_>, subtype: u32) -> DecodeResult<Self> {
        if subtype != LANGUAGE_SUBTYPE {
            return Err(DecodeError::UnsupportedSubtype {
                kind: "language",
                subtype,
            });
        }
        let header = c.read_opaque(LANGUAGE_HEADER_LEN)?;
        let count = c.read_u32()?;
        let mut entries = Vec::with_capacity(c.capacity_hint(count, 24));
        for _ in 0..count {
            entries.push(LanguageEntry {
                name: c.read_prefixed_string(true)?,
                text: c.read_prefixed_string(true)?,
                words: c.read_words()?,
            });
        }
        tracing::debug!("language table: {} entries", entries.len());
        Ok(Self { header, entries })
    }

    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_bytes(&MAGIC);
        w.write_u32(LANGUAGE_SUBTYPE);
        w.write_bytes(&self.header);
        w.write_u32(self.entries.len() as u32);
        for entry in &self.entries {
            w.write_prefixed_string(&entry.name, true);
            w.write_prefixed_string(&entry.text, true);
            w.write_words(&entry.words);
        }
        w.into_bytes()
    }

    /// Look up the text for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.text.as_str())
    }
}
