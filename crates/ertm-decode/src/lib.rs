//! Decode ERTM resource files: meshes, scenes, props and language tables.
//!
//! This crate provides pure synchronous decoders over in-memory buffers.
//! Large parts of the format are not understood; those regions are kept as
//! raw bytes, and sub-blocks without a fixed position are found by heuristic
//! marker scans.
//!
//! # Design principles
//!
//! - **Synchronous**: No async, no threading primitives, no I/O
//! - **Fail explicitly**: Short or corrupt input is an error, never a panic
//! - **Degrade heuristics**: Blob scans fall back to empty lists and default transforms
//!
//! # Key functions
//!
//! - [`decode`]: Decode any resource by its header subtype
//! - [`decode_as`]: Decode a resource whose kind is known from its file name
//! - [`resolve_object`]: Recover dependencies and a transform from an object blob
//! - [`hierarchy::build`]: Arrange scene objects into parent/child trees
//! - [`Mesh::combine`]: Merge geometry with index remapping

mod error;

pub mod cursor;
pub mod dependency;
pub mod header;
pub mod hierarchy;
pub mod mesh;
pub mod options;
pub mod records;
pub mod resolve;
pub mod transform;

pub use cursor::{ByteView, Cursor, Endian, Writer};
pub use dependency::DependencyList;
pub use error::{DecodeError, DecodeResult};
pub use header::{AssetKind, FileHeader, MAGIC};
pub use mesh::{Mesh, MeshChunk, Triangle, Vertex};
pub use options::{DecodeOptions, ResolverOptions, ScaleFlagRule};
pub use records::{
    LanguageEntry, LanguageRecord, MeshRecord, PropRecord, Record, SceneObject, SceneRecord,
    decode, decode_as, decode_language, decode_mesh, decode_prop, decode_scene,
};
pub use resolve::{ObjectMeta, ScanDirection, locate_marker, resolve_object};
pub use transform::Transform;
