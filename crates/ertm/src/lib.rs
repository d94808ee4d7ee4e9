//! High-level access to ERTM resources: scene assembly and OBJ/MTL export.
//!
//! Built on [`ertm_decode`], this crate adds file access, follows the
//! references between scenes, props and meshes, and writes the merged
//! geometry in Wavefront format.
//!
//! # Design principles
//!
//! - **Pluggable file access**: Everything is read through a [`FileSource`]
//! - **Tolerate missing references**: Absent or broken dependencies are skipped and reported
//! - **Fail on loops**: A file that references itself, directly or not, is an error
//!
//! # Example
//!
//! ```no_run
//! use ertm::{Assembler, FsSource, export};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut assembler = Assembler::new(FsSource::new("assets"));
//! let assembly = assembler.assemble_scene("island.scene")?;
//! let mesh = assembly.combined();
//! export::write_obj(&mut std::io::stdout().lock(), &mesh, "island.mtl")?;
//! # Ok(())
//! # }
//! ```

mod error;

pub mod assemble;
pub mod convert;
pub mod export;
pub mod source;

pub use assemble::{Assembler, Assembly, AssemblyReport, ObjectMesh};
pub use convert::{Converter, Outcome, Output};
pub use error::{Error, Result};
pub use source::{FileSource, FsSource, MemorySource};

pub use ertm_decode::{DecodeOptions, Mesh, MeshChunk, ResolverOptions, ScaleFlagRule};
