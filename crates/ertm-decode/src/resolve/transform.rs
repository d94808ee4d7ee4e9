//! Transform block recovery.
//!
//! The block sits near the end of an object blob at no fixed offset. It is
//! anchored by [`TRANSFORM_MARKER`](crate::options::TRANSFORM_MARKER) at
//! `MARKER_PROBE` bytes past the block start:
//!
//! ```text
//! -0x10  scale flag
//!  0x00  scale     (vec3, only meaningful when the flag says so)
//!  0x18  position  (vec3)
//!  0x38  marker
//!  0x40  rotation  (x, y, z, w)
//! ```

use crate::cursor::ByteView;
use crate::error::{DecodeError, DecodeResult};
use crate::options::ResolverOptions;
use crate::resolve::marker::{ScanDirection, locate_marker};
use crate::transform::Transform;

/// Blobs shorter than this cannot hold a transform block.
const MIN_BLOB_LEN: usize = 0x54;
/// The scan starts this far before the end of the blob.
const TAIL_LEN: usize = 0x50;
const MARKER_PROBE: usize = 0x38;
/// Lowest block start accepted; the scale flag lives 0x10 bytes before it.
const SCAN_FLOOR: usize = 0x10;

const SCALE_FLAG: usize = 0x10;
const POSITION: usize = 0x18;
const ROTATION: usize = 0x40;

/// Recover the transform of an object blob, or the default when none is found.
#[must_use]
pub fn read_transform(blob: ByteView<'_>, options: &ResolverOptions) -> Transform {
    match locate_transform(blob, options) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!("no transform block: {e}");
            Transform::default()
        }
    }
}

/// Offset of the transform block start, if the marker is present.
#[must_use]
pub fn transform_block_offset(blob: ByteView<'_>, marker: u32) -> Option<usize> {
    if blob.len() < MIN_BLOB_LEN {
        return None;
    }
    locate_marker(
        blob,
        marker,
        MARKER_PROBE,
        blob.len() - TAIL_LEN,
        ScanDirection::Backward,
    )
    .filter(|&p| p >= SCAN_FLOOR)
}

fn locate_transform(blob: ByteView<'_>, options: &ResolverOptions) -> DecodeResult<Transform> {
    if blob.len() < MIN_BLOB_LEN {
        return Ok(Transform::default());
    }
    let pos = transform_block_offset(blob, options.transform_marker)
        .ok_or(DecodeError::HeuristicScanUnderflow { offset: SCAN_FLOOR })?;

    let mut transform = Transform::default();
    let flag = blob.u32_at(pos - SCALE_FLAG)?;
    if options.scale_flag.has_scale(flag) {
        transform.scale = blob.vec3_at(pos)?;
    }
    transform.position = blob.vec3_at(pos + POSITION)?;
    transform.rotation = blob.quat_at(pos + ROTATION)?;
    Ok(transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Writer;
    use crate::options::{ScaleFlagRule, TRANSFORM_MARKER};
    use glam::{Quat, Vec3};

    /// Blob with `lead` filler bytes, then the flag word and a transform block.
    fn transform_blob(lead: usize, flag: u32, trailing: usize) -> Vec<u8> {
        let mut w = Writer::new();
        w.write_zeros(lead);
        w.write_u32(flag);
        w.write_zeros(0xC);
        w.write_vec3(Vec3::new(2.0, 3.0, 4.0)); // 0x00 scale
        w.write_zeros(0xC);
        w.write_vec3(Vec3::new(-1.0, 0.5, 10.0)); // 0x18 position
        w.write_zeros(0x14);
        w.write_u32(TRANSFORM_MARKER); // 0x38
        w.write_zeros(4);
        w.write_quat(Quat::from_xyzw(0.0, 0.0, 0.6, 0.8)); // 0x40
        w.write_zeros(trailing);
        w.into_bytes()
    }

    #[test]
    fn recovers_scale_position_rotation() {
        let data = transform_blob(0x20, 2, 0);
        let t = read_transform(ByteView::new(&data), &ResolverOptions::default());
        assert_eq!(t.scale, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(t.position, Vec3::new(-1.0, 0.5, 10.0));
        assert_eq!(t.rotation, Quat::from_xyzw(0.0, 0.0, 0.6, 0.8));
    }

    #[test]
    fn block_found_before_trailing_data() {
        let data = transform_blob(0x20, 2, 0x33);
        let view = ByteView::new(&data);
        assert_eq!(transform_block_offset(view, TRANSFORM_MARKER), Some(0x30));
        let t = read_transform(view, &ResolverOptions::default());
        assert_eq!(t.position, Vec3::new(-1.0, 0.5, 10.0));
    }

    #[test]
    fn scale_skipped_without_flag() {
        let data = transform_blob(0x20, 1, 0);
        let t = read_transform(ByteView::new(&data), &ResolverOptions::default());
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.position, Vec3::new(-1.0, 0.5, 10.0));

        let lenient = ResolverOptions {
            scale_flag: ScaleFlagRule::AtMost(2),
            ..ResolverOptions::default()
        };
        assert_eq!(
            read_transform(ByteView::new(&data), &lenient).scale,
            Vec3::new(2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn short_or_unmarked_blobs_default() {
        let short = vec![0u8; 0x53];
        assert!(read_transform(ByteView::new(&short), &ResolverOptions::default()).is_identity());

        let unmarked = vec![0xAB; 0x200];
        assert!(read_transform(ByteView::new(&unmarked), &ResolverOptions::default()).is_identity());
    }

    #[test]
    fn marker_below_floor_is_rejected() {
        // Block start at 0x8 leaves no room for the flag word.
        let data = transform_blob(0, 2, 0);
        let view = ByteView::new(&data[8..]);
        assert_eq!(transform_block_offset(view, TRANSFORM_MARKER), None);
    }
}
