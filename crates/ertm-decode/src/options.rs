//! Decoder settings.

/// Marker preceding the transform block of an object blob.
pub const TRANSFORM_MARKER: u32 = 0x53F2_9BE3;

/// Marker heading a forward dependency block in scene objects and early prop subtypes.
pub const DEPENDENCY_MARKER: u32 = 0x7ADB_4E5A;

/// Dependency block marker used by later prop subtypes.
pub const DEPENDENCY_MARKER_ALT: u32 = 0x73E0_9E0F;

/// How the word before a transform block decides whether a scale is stored.
///
/// Observed decoder revisions disagree on this comparison, so it is left to
/// the caller. The default matches the most common revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleFlagRule {
    /// Scale is present when the flag equals the value.
    Equals(u32),
    /// Scale is present when the flag is at most the value.
    AtMost(u32),
}

impl Default for ScaleFlagRule {
    fn default() -> Self {
        Self::Equals(2)
    }
}

impl ScaleFlagRule {
    #[must_use]
    pub fn has_scale(self, flag: u32) -> bool {
        match self {
            Self::Equals(v) => flag == v,
            Self::AtMost(v) => flag <= v,
        }
    }
}

/// Settings for the object blob resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Marker located before the transform block.
    pub transform_marker: u32,
    /// Scale presence comparison.
    pub scale_flag: ScaleFlagRule,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            transform_marker: TRANSFORM_MARKER,
            scale_flag: ScaleFlagRule::default(),
        }
    }
}

/// Settings shared by every record decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Reject meshes whose triangles or chunks reference out-of-range data.
    pub validate_geometry: bool,
    /// Apply the per-chunk UV scale pair to vertex texture coordinates.
    pub apply_uv_scale: bool,
    /// Maximum nesting depth when following file references.
    pub max_depth: usize,
    pub resolver: ResolverOptions,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            validate_geometry: true,
            apply_uv_scale: true,
            max_depth: 32,
            resolver: ResolverOptions::default(),
        }
    }
}
