//! Marker constant search.

use crate::cursor::ByteView;

/// Direction of a marker scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// From `start` down to offset 0.
    Backward,
    /// From `start` up to the end of the blob.
    Forward,
}

/// Find the first candidate offset `p` (walking from `start` in `direction`)
/// where the word at `p + probe` equals `marker`.
///
/// Candidates whose probe would read past the end are skipped, so `start`
/// may lie beyond the blob.
#[must_use]
pub fn locate_marker(
    blob: ByteView<'_>,
    marker: u32,
    probe: usize,
    start: usize,
    direction: ScanDirection,
) -> Option<usize> {
    let hit = |p: usize| {
        p.checked_add(probe)
            .and_then(|at| blob.u32_at(at).ok())
            .is_some_and(|word| word == marker)
    };
    match direction {
        ScanDirection::Backward => (0..=start).rev().find(|&p| hit(p)),
        ScanDirection::Forward => (start..blob.len()).find(|&p| hit(p)),
    }
}
