//! Scene graph assembly: scene -> prop -> mesh composition.
//!
//! A scene places objects; each object names the props it is built from, and
//! each prop names the meshes (and sometimes further props) it uses. The
//! [`Assembler`] follows those references through a [`FileSource`], merges
//! the geometry per object and bakes the object transforms into it.
//!
//! Missing or undecodable references are logged and skipped. A reference
//! back to a file that is still open on the current path aborts the assembly.

use ertm_decode::{AssetKind, DecodeOptions, Mesh, SceneObject};
use glam::Mat4;

use crate::error::{Error, Result};
use crate::source::FileSource;

/// Merged geometry of one root scene object and its descendants.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMesh {
    pub name: String,
    pub mesh: Mesh,
}

/// References that were skipped while assembling.
#[derive(Debug, Default)]
pub struct AssemblyReport {
    pub skipped: Vec<Error>,
    /// Referenced files read and decoded successfully.
    pub files_loaded: usize,
}

impl AssemblyReport {
    /// Names of referenced files that could not be found.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.skipped.iter().filter_map(|e| match e {
            Error::MissingDependency { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Result of assembling a scene or prop.
#[derive(Debug)]
pub struct Assembly {
    pub objects: Vec<ObjectMesh>,
    pub report: AssemblyReport,
}

impl Assembly {
    /// All object meshes merged into one, keeping chunk owners.
    #[must_use]
    pub fn combined(&self) -> Mesh {
        let mut mesh = Mesh::new();
        for object in &self.objects {
            mesh.combine(object.mesh.clone());
        }
        mesh
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.iter().all(|o| o.mesh.is_empty())
    }
}

/// Loads files from a source and assembles them into meshes.
pub struct Assembler<S> {
    source: S,
    options: DecodeOptions,
    /// Files open on the current recursion path.
    open: Vec<String>,
    report: AssemblyReport,
}

impl<S: FileSource> Assembler<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_options(source, DecodeOptions::default())
    }

    #[must_use]
    pub fn with_options(source: S, options: DecodeOptions) -> Self {
        Self {
            source,
            options,
            open: Vec::new(),
            report: AssemblyReport::default(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Assemble every root object of the scene file `name`.
    ///
    /// Failing to read or decode the scene itself is an error; problems with
    /// the files it references are collected in the report.
    pub fn assemble_scene(&mut self, name: &str) -> Result<Assembly> {
        self.begin(name);
        let bytes = self.source.read(name).map_err(|e| Error::io(name, e))?;
        let scene =
            ertm_decode::decode_scene(&bytes, &self.options).map_err(|e| Error::decode(name, e))?;
        tracing::debug!(
            "scene {:?}: {} objects, {} dependencies",
            scene.name,
            scene.objects.len(),
            scene.dependencies.len()
        );

        let mut objects = Vec::new();
        for root in scene.hierarchy() {
            let mesh = self.build_object(&root, Mat4::IDENTITY)?;
            objects.push(ObjectMesh {
                name: root.name,
                mesh,
            });
        }
        Ok(self.finish(name, objects))
    }

    /// Assemble the meshes a single prop file refers to.
    pub fn assemble_prop(&mut self, name: &str) -> Result<Assembly> {
        self.begin(name);
        let bytes = self.source.read(name).map_err(|e| Error::io(name, e))?;
        let mesh = self.prop_from_bytes(name, &bytes, 0)?;
        let objects = vec![ObjectMesh {
            name: name.to_owned(),
            mesh,
        }];
        Ok(self.finish(name, objects))
    }

    /// Read and decode one mesh file.
    pub fn load_mesh(&mut self, name: &str) -> Result<Mesh> {
        let bytes = self.source.read(name).map_err(|e| Error::io(name, e))?;
        let mesh = ertm_decode::decode_mesh(&bytes)
            .and_then(|record| record.to_mesh(&self.options))
            .map_err(|e| Error::decode(name, e))?;
        self.report.files_loaded += 1;
        Ok(mesh)
    }

    fn begin(&mut self, name: &str) {
        self.report = AssemblyReport::default();
        self.open.clear();
        self.open.push(name.to_owned());
    }

    fn finish(&mut self, name: &str, objects: Vec<ObjectMesh>) -> Assembly {
        self.open.clear();
        let report = std::mem::take(&mut self.report);
        tracing::info!(
            "assembled {name}: {} objects, {} files loaded, {} skipped",
            objects.len(),
            report.files_loaded,
            report.skipped.len()
        );
        Assembly { objects, report }
    }

    /// Merge an object's modules, place them with its transform, then add
    /// its children.
    fn build_object(&mut self, object: &SceneObject, parent: Mat4) -> Result<Mesh> {
        let matrix = parent * object.transform.matrix();

        let mut mesh = Mesh::new();
        for module in object.modules.iter() {
            if let Some(part) = self.reference(module, &object.name, 1)? {
                mesh.combine_owned(part, &object.name);
            }
        }
        mesh.transform(&matrix);

        for child in &object.children {
            let child_mesh = self.build_object(child, matrix)?;
            mesh.combine(child_mesh);
        }
        Ok(mesh)
    }

    /// Load a referenced mesh or prop. `Ok(None)` means the reference was
    /// skipped.
    fn reference(&mut self, name: &str, referrer: &str, depth: usize) -> Result<Option<Mesh>> {
        let kind = AssetKind::from_file_name(name);
        if !matches!(kind, Some(AssetKind::StaticMesh | AssetKind::Prop)) {
            return Ok(None);
        }
        if depth > self.options.max_depth {
            return Err(Error::DepthExceeded {
                name: name.to_owned(),
                limit: self.options.max_depth,
            });
        }
        if self.open.iter().any(|open| open.eq_ignore_ascii_case(name)) {
            let mut chain = self.open.clone();
            chain.push(name.to_owned());
            return Err(Error::CyclicReference { chain });
        }
        if !self.source.exists(name) {
            tracing::warn!("{name} (referenced by {referrer}) not found, skipping");
            self.report.skipped.push(Error::MissingDependency {
                name: name.to_owned(),
                referrer: referrer.to_owned(),
            });
            return Ok(None);
        }

        let bytes = match self.source.read(name) {
            Ok(bytes) => bytes,
            Err(e) => return Ok(self.skip(Error::io(name, e))),
        };

        if kind == Some(AssetKind::Prop) {
            self.open.push(name.to_owned());
            let result = self.prop_from_bytes(name, &bytes, depth);
            self.open.pop();
            return match result {
                Ok(mesh) => Ok(Some(mesh)),
                Err(e @ Error::Decode { .. }) => Ok(self.skip(e)),
                Err(e) => Err(e),
            };
        }

        match ertm_decode::decode_mesh(&bytes).and_then(|record| record.to_mesh(&self.options)) {
            Ok(mesh) => {
                self.report.files_loaded += 1;
                Ok(Some(mesh))
            }
            Err(e) => Ok(self.skip(Error::decode(name, e))),
        }
    }

    fn prop_from_bytes(&mut self, name: &str, bytes: &[u8], depth: usize) -> Result<Mesh> {
        let prop =
            ertm_decode::decode_prop(bytes, &self.options).map_err(|e| Error::decode(name, e))?;
        self.report.files_loaded += 1;

        let mut mesh = Mesh::new();
        for entry in prop.dependencies().iter().flat_map(|list| list.iter()) {
            if let Some(part) = self.reference(entry, name, depth + 1)? {
                mesh.combine(part);
            }
        }
        Ok(mesh)
    }

    fn skip(&mut self, error: Error) -> Option<Mesh> {
        tracing::warn!("skipping reference: {error}");
        self.report.skipped.push(error);
        None
    }
}
