//! Batch conversion of resource files to OBJ/MTL and text.
//!
//! Meshes, props and scenes are assembled and written as `<stem>.obj` and
//! `<stem>.mtl`; language tables become `<stem>.txt` with one
//! `name<TAB>text` line per entry. Referenced files are looked up next to the
//! input file.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ertm_decode::{AssetKind, DecodeOptions, Mesh};

use crate::assemble::Assembler;
use crate::error::{Error, Result};
use crate::export;
use crate::source::{FileSource, FsSource};

/// Image extension used for diffuse textures.
pub const TEXTURE_EXTENSION: &str = "dds";

/// What a successful conversion wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Model {
        obj: PathBuf,
        mtl: PathBuf,
        chunks: usize,
        vertices: usize,
        /// Referenced files that were skipped during assembly.
        skipped: usize,
        /// Textures that are neither next to the output nor copied there.
        missing_textures: Vec<String>,
    },
    Strings {
        path: PathBuf,
        entries: usize,
    },
}

/// Result of converting one input file.
#[derive(Debug)]
pub struct Outcome {
    pub input: PathBuf,
    pub result: Result<Output>,
}

/// Conversion settings.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    /// Where outputs go; defaults to the input file's directory.
    pub out_dir: Option<PathBuf>,
    /// Directory to copy missing `.dds` textures from.
    pub texture_dir: Option<PathBuf>,
    pub options: DecodeOptions,
}

impl Converter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_texture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.texture_dir = Some(dir.into());
        self
    }

    /// Convert every input, expanding directories; never stops early.
    pub fn convert_all(&self, inputs: &[PathBuf]) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        for input in inputs {
            let files = match expand(input) {
                Ok(files) => files,
                Err(e) => {
                    outcomes.push(Outcome {
                        input: input.clone(),
                        result: Err(e),
                    });
                    continue;
                }
            };
            for file in files {
                let result = self.convert_file(&file);
                match &result {
                    Ok(_) => tracing::info!("converted {}", file.display()),
                    Err(e) => tracing::info!("failed to convert {}: {e}", file.display()),
                }
                outcomes.push(Outcome {
                    input: file,
                    result,
                });
            }
        }
        outcomes
    }

    /// Convert a single file, choosing the pipeline from its extension.
    pub fn convert_file(&self, path: &Path) -> Result<Output> {
        let display = path.display().to_string();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::UnsupportedFile {
                name: display.clone(),
            })?;
        let input_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let out_dir = self.out_dir.as_deref().unwrap_or(input_dir);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);

        let mut assembler = Assembler::with_options(FsSource::new(input_dir), self.options.clone());
        let (mesh, skipped) = match AssetKind::from_file_name(file_name) {
            Some(AssetKind::StaticMesh | AssetKind::SkeletalMesh) => {
                (assembler.load_mesh(file_name)?, 0)
            }
            Some(AssetKind::Scene) => {
                let assembly = assembler.assemble_scene(file_name)?;
                (assembly.combined(), assembly.report.skipped.len())
            }
            Some(AssetKind::Prop) => {
                let assembly = assembler.assemble_prop(file_name)?;
                (assembly.combined(), assembly.report.skipped.len())
            }
            Some(AssetKind::Language) => {
                return convert_language(assembler.source(), file_name, out_dir, stem);
            }
            Some(AssetKind::Skeleton) | None => {
                return Err(Error::UnsupportedFile { name: display });
            }
        };
        if mesh.is_empty() {
            return Err(Error::NoGeometry { name: display });
        }
        self.write_model(&mesh, input_dir, out_dir, stem, skipped)
    }

    fn write_model(
        &self,
        mesh: &Mesh,
        input_dir: &Path,
        out_dir: &Path,
        stem: &str,
        skipped: usize,
    ) -> Result<Output> {
        fs::create_dir_all(out_dir).map_err(|e| Error::io(&out_dir.display().to_string(), e))?;
        let obj = out_dir.join(format!("{stem}.obj"));
        let mtl = out_dir.join(format!("{stem}.mtl"));
        let mtl_name = format!("{stem}.mtl");

        write_file(&obj, |out| export::write_obj(out, mesh, &mtl_name))?;
        write_file(&mtl, |out| export::write_mtl(out, mesh))?;

        let missing_textures = export::required_textures(mesh)
            .into_iter()
            .filter(|texture| !self.place_texture(texture, input_dir, out_dir))
            .map(str::to_owned)
            .collect::<Vec<_>>();
        if !missing_textures.is_empty() {
            tracing::warn!(
                "{} texture(s) missing for {stem}: {}",
                missing_textures.len(),
                missing_textures.join(", ")
            );
        }

        Ok(Output::Model {
            obj,
            mtl,
            chunks: mesh.chunks.len(),
            vertices: mesh.vertices.len(),
            skipped,
            missing_textures,
        })
    }

    /// Make `<texture>.dds` available in `out_dir`. Returns whether it is there.
    fn place_texture(&self, texture: &str, input_dir: &Path, out_dir: &Path) -> bool {
        let file = format!("{texture}.{TEXTURE_EXTENSION}");
        let target = out_dir.join(&file);
        if target.is_file() {
            return true;
        }
        let candidates = [Some(input_dir), self.texture_dir.as_deref()];
        for dir in candidates.into_iter().flatten() {
            let source = FsSource::new(dir);
            if let Ok(bytes) = source.read(&file) {
                match fs::write(&target, bytes) {
                    Ok(()) => {
                        tracing::debug!("copied {file} from {}", dir.display());
                        return true;
                    }
                    Err(e) => tracing::warn!("failed to copy {file}: {e}"),
                }
            }
        }
        false
    }
}

fn convert_language(
    source: &FsSource,
    file_name: &str,
    out_dir: &Path,
    stem: &str,
) -> Result<Output> {
    let bytes = source.read(file_name).map_err(|e| Error::io(file_name, e))?;
    let table =
        ertm_decode::decode_language(&bytes).map_err(|e| Error::decode(file_name, e))?;

    let mut text = String::new();
    for entry in &table.entries {
        text.push_str(&entry.name);
        text.push('\t');
        text.push_str(&entry.text);
        text.push('\n');
    }
    fs::create_dir_all(out_dir).map_err(|e| Error::io(&out_dir.display().to_string(), e))?;
    let path = out_dir.join(format!("{stem}.txt"));
    write_file(&path, |out| out.write_all(text.as_bytes()))?;
    Ok(Output::Strings {
        path,
        entries: table.entries.len(),
    })
}

fn write_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let written = File::create(path).and_then(|file| {
        let mut out = BufWriter::new(file);
        write(&mut out)?;
        out.flush()
    });
    written.map_err(|e| Error::io(&path.display().to_string(), e))
}

/// A file stays as is; a directory yields its supported files, sorted by name.
pub fn expand(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    let name = input.display().to_string();
    let mut files = fs::read_dir(input)
        .map_err(|e| Error::io(&name, e))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_convertible(path))
        .collect::<Vec<_>>();
    files.sort();
    Ok(files)
}

/// Whether the file's extension names something [`Converter`] can handle.
#[must_use]
pub fn is_convertible(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(AssetKind::from_file_name)
        .is_some_and(|kind| kind != AssetKind::Skeleton)
}
