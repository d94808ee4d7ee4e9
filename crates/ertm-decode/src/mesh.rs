//! In-memory geometry: vertices, triangles and material chunks.

use glam::{Mat4, Vec2, Vec3};

use crate::error::{DecodeError, DecodeResult};

/// A decoded vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    /// Not decoded yet; always +Y.
    pub normal: Vec3,
}

impl Vertex {
    #[must_use]
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            uv,
            normal: Vec3::Y,
        }
    }
}

/// Three vertex indices (16-bit on disk).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [u32; 3]);

impl Triangle {
    #[must_use]
    pub fn offset(self, by: u32) -> Self {
        Self(self.0.map(|i| i.saturating_add(by)))
    }
}

/// A run of triangles drawn with one material.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshChunk {
    pub index: u32,
    pub first_vertex: u32,
    pub last_vertex: u32,
    /// First triangle of the chunk.
    pub face_offset: u32,
    pub face_count: u32,
    pub diffuse_texture: String,
    /// Scene object the chunk came from, once assembled.
    pub owner: Option<String>,
}

impl MeshChunk {
    /// Triangle index range covered by this chunk.
    #[must_use]
    pub fn faces(&self) -> std::ops::Range<usize> {
        let start = self.face_offset as usize;
        start..start + self.face_count as usize
    }

    /// Diffuse texture name without directory or extension.
    #[must_use]
    pub fn texture_base_name(&self) -> &str {
        texture_base_name(&self.diffuse_texture)
    }

    /// Material name derived from the diffuse texture (`m_<base name>`).
    #[must_use]
    pub fn material_name(&self) -> String {
        format!("m_{}", self.texture_base_name())
    }
}

/// Strip directories and the extension from a texture reference.
#[must_use]
pub fn texture_base_name(texture: &str) -> &str {
    let file = texture.rsplit(['/', '\\']).next().unwrap_or(texture);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

/// Mesh geometry ready for export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub chunks: Vec<MeshChunk>,
}

impl Mesh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Transform every vertex position in place.
    pub fn transform(&mut self, matrix: &Mat4) {
        for v in &mut self.vertices {
            v.position = matrix.transform_point3(v.position);
        }
    }

    /// Append `other`, remapping its indices past this mesh's contents.
    pub fn combine(&mut self, other: Mesh) {
        self.combine_with_owner(other, None);
    }

    /// Append `other` and mark its chunks as owned by `owner`.
    pub fn combine_owned(&mut self, other: Mesh, owner: &str) {
        self.combine_with_owner(other, Some(owner));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn combine_with_owner(&mut self, other: Mesh, owner: Option<&str>) {
        let vertex_offset = self.vertices.len() as u32;
        let triangle_offset = self.triangles.len() as u32;
        let chunk_offset = self.chunks.len() as u32;

        self.vertices.extend(other.vertices);
        self.triangles
            .extend(other.triangles.into_iter().map(|t| t.offset(vertex_offset)));
        self.chunks.extend(other.chunks.into_iter().map(|c| MeshChunk {
            index: c.index.saturating_add(chunk_offset),
            first_vertex: c.first_vertex.saturating_add(vertex_offset),
            last_vertex: c.last_vertex.saturating_add(vertex_offset),
            face_offset: c.face_offset.saturating_add(triangle_offset),
            face_count: c.face_count,
            diffuse_texture: c.diffuse_texture,
            owner: owner.map(str::to_owned).or(c.owner),
        }));
    }

    /// Check that every triangle and chunk references existing data.
    pub fn validate(&self) -> DecodeResult<()> {
        let vertex_count = self.vertices.len();
        for (i, t) in self.triangles.iter().enumerate() {
            if let Some(&bad) = t.0.iter().find(|&&idx| idx as usize >= vertex_count) {
                return Err(DecodeError::InvalidGeometry {
                    message: format!(
                        "triangle {i} references vertex {bad}, mesh has {vertex_count}"
                    ),
                });
            }
        }
        for chunk in &self.chunks {
            if chunk.faces().end > self.triangles.len() {
                return Err(DecodeError::InvalidGeometry {
                    message: format!(
                        "chunk {} covers faces {:?}, mesh has {}",
                        chunk.index,
                        chunk.faces(),
                        self.triangles.len()
                    ),
                });
            }
            if chunk.first_vertex > chunk.last_vertex {
                return Err(DecodeError::InvalidGeometry {
                    message: format!(
                        "chunk {} vertex range {}..={} is inverted",
                        chunk.index, chunk.first_vertex, chunk.last_vertex
                    ),
                });
            }
        }
        Ok(())
    }

    /// Unique diffuse texture base names, in chunk order.
    #[must_use]
    pub fn textures(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for chunk in &self.chunks {
            let name = chunk.texture_base_name();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Order chunks by diffuse texture, keeping the input order for ties.
    pub fn sort_chunks(&mut self) {
        self.chunks
            .sort_by(|a, b| a.diffuse_texture.cmp(&b.diffuse_texture));
    }
}
