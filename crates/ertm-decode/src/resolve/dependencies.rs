//! Dependency name recovery from object blobs.
//!
//! Two layouts are seen. When a dependency marker is present the names sit in
//! a count-prefixed block read forward from the marker. Otherwise the names
//! are found by walking backward from the end of the blob, validating each
//! candidate string by its length word.

use crate::cursor::{ByteView, Cursor};
use crate::dependency::DependencyList;
use crate::error::{DecodeError, DecodeResult};
use crate::options::{DEPENDENCY_MARKER, DEPENDENCY_MARKER_ALT};
use crate::resolve::marker::{ScanDirection, locate_marker};

/// Blobs shorter than this hold no dependencies.
const MIN_BLOB_LEN: usize = 0x14;
/// The marker scan starts this far before the end of the blob.
const TAIL_LEN: usize = 0xC;
const MARKER_PROBE: usize = 0x8;
/// Count word offset from the block start.
const BLOCK_COUNT: usize = 0xC;
/// Opaque bytes after each name in a forward block.
const BLOCK_ENTRY_DATA: usize = 0x10;
/// Trailing records skipped before the backward walk.
const TAIL_RECORD_LEN: usize = 0x10;
/// Gap skipped when a walked string is preceded by a zero word.
const ZERO_PREFIX_GAP: usize = 0xC;

/// Marker order for scene objects.
pub const SCENE_MARKERS: &[u32] = &[DEPENDENCY_MARKER, DEPENDENCY_MARKER_ALT];

/// Marker order for a prop subtype. Later subtypes mostly use the alternate marker.
#[must_use]
pub fn prop_markers(subtype: u32) -> &'static [u32] {
    match subtype {
        0x2 | 0x3 => &[DEPENDENCY_MARKER, DEPENDENCY_MARKER_ALT],
        _ => &[DEPENDENCY_MARKER_ALT, DEPENDENCY_MARKER],
    }
}

/// Recover the dependency names of an object blob.
///
/// Never fails: a scan that runs off the blob keeps the names found so far.
#[must_use]
pub fn read_dependencies(blob: ByteView<'_>, markers: &[u32]) -> DependencyList {
    let mut list = DependencyList::new();
    if blob.len() < MIN_BLOB_LEN {
        return list;
    }

    let start = blob.len() - TAIL_LEN;
    let block = markers.iter().find_map(|&marker| {
        locate_marker(blob, marker, MARKER_PROBE, start, ScanDirection::Backward)
            .filter(|&p| p > MARKER_PROBE)
    });

    let result = match block {
        Some(offset) => read_block(blob, offset, &mut list),
        None => walk_backward(blob, &mut list),
    };
    if let Err(e) = result {
        tracing::debug!("dependency scan stopped after {} names: {e}", list.len());
    }
    list
}

fn read_block(blob: ByteView<'_>, offset: usize, list: &mut DependencyList) -> DecodeResult<()> {
    let mut c = Cursor::with_endian(blob.data(), blob.endian());
    c.seek(offset + BLOCK_COUNT)?;
    let count = c.read_u32()?;
    for _ in 0..count {
        let name = c.read_prefixed_string(true)?;
        c.skip(BLOCK_ENTRY_DATA)?;
        list.push(name);
    }
    Ok(())
}

fn back(offset: usize, by: usize) -> DecodeResult<usize> {
    offset
        .checked_sub(by)
        .ok_or(DecodeError::HeuristicScanUnderflow { offset })
}

fn word_before(blob: ByteView<'_>, end: usize) -> DecodeResult<usize> {
    Ok(blob.u32_at(back(end, 4)?)? as usize)
}

fn walk_backward(blob: ByteView<'_>, list: &mut DependencyList) -> DecodeResult<()> {
    let mut end = blob.len();

    // Trailing 16-byte records end in a small tag word.
    while (1..=7).contains(&word_before(blob, end)?) {
        end = back(end, TAIL_RECORD_LEN)?;
    }

    // Look for any length word that matches its distance to `end`.
    let mut text = 0;
    while word_before(blob, back(end, text)?)? != text && end - text > 4 {
        text += 1;
    }
    if end - text <= 4 {
        return Ok(());
    }

    let mut count = 0;
    while word_before(blob, end)? != count {
        let mut len = 0;
        while word_before(blob, back(end, len)?)? != len {
            len += 1;
            if back(end, len)? <= 4 {
                return Ok(());
            }
        }

        let start = back(back(end, len)?, 4)?;
        list.push(blob.string_at(start, false)?);
        end = start;

        let prefix = word_before(blob, end)?;
        if prefix == 0 {
            end = back(end, ZERO_PREFIX_GAP)?;
        } else if prefix == 1 || len + 8 == prefix {
            break;
        }
        count += 1;
    }
    Ok(())
}
