//! Heuristic recovery of dependency names and transforms from the opaque
//! per-object blobs of scene and prop records.
//!
//! The blob layout is not tagged, so sub-blocks are found by scanning for
//! marker constants. Both scanners degrade to empty or default values; a
//! malformed blob never fails the record that contains it.

pub mod dependencies;
pub mod marker;
pub mod transform;

use crate::cursor::ByteView;
use crate::dependency::DependencyList;
use crate::options::ResolverOptions;
use crate::transform::Transform;

pub use dependencies::{SCENE_MARKERS, prop_markers, read_dependencies};
pub use marker::{ScanDirection, locate_marker};
pub use transform::{read_transform, transform_block_offset};

/// What the resolver recovered from one object blob.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMeta {
    /// First word of the blob.
    pub lead: Option<u32>,
    /// Always holds one list, possibly empty.
    pub dependencies: Vec<DependencyList>,
    pub transform: Transform,
}

impl ObjectMeta {
    /// All dependency names across every list.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.iter().flat_map(DependencyList::iter)
    }
}

/// Run both scanners over `blob`, trying dependency `markers` in order.
#[must_use]
pub fn resolve_object(blob: &[u8], markers: &[u32], options: &ResolverOptions) -> ObjectMeta {
    let view = ByteView::new(blob);
    ObjectMeta {
        lead: view.u32_at(0).ok(),
        dependencies: vec![read_dependencies(view, markers)],
        transform: read_transform(view, options),
    }
}
