//! Static and skeletal mesh records (`.d3dmesh`).
//!
//! Only the chunk table, triangle list and vertex positions are understood.
//! Everything else is carried as named opaque regions so a record can be
//! re-encoded byte for byte.

use glam::{Vec2, Vec3};

use crate::cursor::{ByteView, Cursor, Writer};
use crate::error::{DecodeError, DecodeResult};
use crate::header::MAGIC;
use crate::mesh::{Mesh, MeshChunk, Triangle, Vertex};
use crate::options::DecodeOptions;
use crate::records::block::NameSlot;

pub const STATIC_SUBTYPE: u32 = 0xD;
pub const SKELETAL_SUBTYPE: u32 = 0xE;

const HEADER_DATA_LEN: usize = 0x60;
const STATIC_TYPE_DATA_LEN: usize = 0x3C;
const SKELETAL_TYPE_DATA_LEN: usize = 0x48;
const PRE_BOUNDS_LEN: usize = 0x6;
const POST_BOUNDS_LEN: usize = 0x14;

const CHUNK_HEADER_LEN: usize = 0x24;
const CHUNK_ATTRIBUTES_LEN: usize = 0x58;
const TEXTURE_SLOTS: usize = 9;
const CHUNK_GAP_LEN: usize = 0x19;
const CHUNK_FOOTER_LEN: usize = 0xD9;

const FILE_NAME_SLOTS: usize = 8;
const FILE_NAME_DATA_LEN: usize = 0x32;

/// Word observed in every geometry header.
pub const GEOMETRY_CONSTANT: u32 = 0x0065_3030;
const GEOMETRY_GAP_LEN: usize = 0x2;
const VERTEX_HEADER_LEN: usize = 0xAC;
const POSITION_LEN: usize = 12;
/// Stride used by [`MeshRecord::from_mesh`]: position plus two UV words and padding.
const DEFAULT_STRIDE: u32 = 0x14;

/// One material group of the chunk table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRecord {
    pub header: Vec<u8>,
    pub first_vertex: u32,
    pub last_vertex: u32,
    /// Offset into the index list; divide by three for a triangle offset.
    pub index_offset: u32,
    pub face_count: u32,
    /// Per-chunk attribute block holding bounds and a material index.
    pub attributes: Vec<u8>,
    /// Texture slots; slot 0 is the diffuse map.
    pub textures: Vec<NameSlot>,
    pub gap: Vec<u8>,
    pub footer_name: NameSlot,
    /// Opens with the UV scale pair.
    pub footer: Vec<u8>,
}

impl ChunkRecord {
    fn read(c: &mut Cursor<'_>) -> DecodeResult<Self> {
        let header = c.read_opaque(CHUNK_HEADER_LEN)?;
        let [first_vertex, last_vertex, index_offset, face_count] = c.read_words::<4>()?;
        let attributes = c.read_opaque(CHUNK_ATTRIBUTES_LEN)?;
        let textures = (0..TEXTURE_SLOTS)
            .map(|_| NameSlot::read(c))
            .collect::<DecodeResult<Vec<_>>>()?;
        let gap = c.read_opaque(CHUNK_GAP_LEN)?;
        let footer_name = NameSlot::read(c)?;
        let footer = c.read_opaque(CHUNK_FOOTER_LEN)?;
        Ok(Self {
            header,
            first_vertex,
            last_vertex,
            index_offset,
            face_count,
            attributes,
            textures,
            gap,
            footer_name,
            footer,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_bytes(&self.header);
        w.write_words(&[
            self.first_vertex,
            self.last_vertex,
            self.index_offset,
            self.face_count,
        ]);
        w.write_bytes(&self.attributes);
        for slot in &self.textures {
            slot.write(w);
        }
        w.write_bytes(&self.gap);
        self.footer_name.write(w);
        w.write_bytes(&self.footer);
    }

    /// A chunk with zeroed opaque regions.
    fn blank(chunk: &MeshChunk) -> Self {
        let mut textures = vec![NameSlot::empty(); TEXTURE_SLOTS];
        if !chunk.diffuse_texture.is_empty() {
            textures[0] = NameSlot::new(&chunk.diffuse_texture);
        }
        let mut footer = vec![0; CHUNK_FOOTER_LEN];
        footer[0..4].copy_from_slice(&1.0f32.to_le_bytes());
        footer[4..8].copy_from_slice(&1.0f32.to_le_bytes());
        Self {
            header: vec![0; CHUNK_HEADER_LEN],
            first_vertex: chunk.first_vertex,
            last_vertex: chunk.last_vertex,
            index_offset: chunk.face_offset.saturating_mul(3),
            face_count: chunk.face_count,
            attributes: vec![0; CHUNK_ATTRIBUTES_LEN],
            textures,
            gap: vec![0; CHUNK_GAP_LEN],
            footer_name: NameSlot::empty(),
            footer,
        }
    }

    /// First triangle of the chunk.
    #[must_use]
    pub fn face_offset(&self) -> u32 {
        self.index_offset / 3
    }

    #[must_use]
    pub fn diffuse_texture(&self) -> Option<&str> {
        self.textures.first().and_then(NameSlot::name)
    }

    /// Chunk bounding box from the attribute block.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let view = ByteView::new(&self.attributes);
        Some((view.vec3_at(0xC).ok()?, view.vec3_at(0x18).ok()?))
    }

    #[must_use]
    pub fn material_index(&self) -> Option<u32> {
        ByteView::new(&self.attributes).u32_at(0x38).ok()
    }

    /// UV scale pair, if the footer holds a usable one.
    #[must_use]
    pub fn uv_scale(&self) -> Option<Vec2> {
        let view = ByteView::new(&self.footer);
        let scale = Vec2::new(view.f32_at(0).ok()?, view.f32_at(4).ok()?);
        (scale.is_finite() && scale.cmpgt(Vec2::ZERO).all()).then_some(scale)
    }
}

/// Subtype-specific block between the chunk table and the material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkinData {
    Static { padding: [u32; 5] },
    /// Bone and skin data, not decoded.
    Skeletal { counts: [u32; 2], data: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameEntry {
    pub name: NameSlot,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameSlot {
    pub lead: u32,
    pub entries: Vec<FileNameEntry>,
}

/// Material description following the chunk table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialBlock {
    pub lead: u32,
    pub tag: [u8; 4],
    pub flag: u8,
    pub words: [u32; 3],
    pub slots: Vec<FileNameSlot>,
    pub trailer: [u32; 5],
    pub padding: [u32; 5],
}

impl Default for MaterialBlock {
    fn default() -> Self {
        Self {
            lead: 0,
            tag: [0; 4],
            flag: 0,
            words: [0; 3],
            slots: vec![
                FileNameSlot {
                    lead: 0,
                    entries: Vec::new(),
                };
                FILE_NAME_SLOTS
            ],
            trailer: [0; 5],
            padding: [0; 5],
        }
    }
}

impl MaterialBlock {
    fn read(c: &mut Cursor<'_>) -> DecodeResult<Self> {
        let lead = c.read_u32()?;
        let tag = c.read_magic()?;
        let flag = c.read_u8()?;
        let words = c.read_words::<3>()?;
        let mut slots = Vec::with_capacity(FILE_NAME_SLOTS);
        for _ in 0..FILE_NAME_SLOTS {
            let lead = c.read_u32()?;
            let count = c.read_u32()?;
            let mut entries = Vec::with_capacity(c.capacity_hint(count, 8 + FILE_NAME_DATA_LEN));
            for _ in 0..count {
                let name = NameSlot::read(c)?;
                let data = c.read_opaque(FILE_NAME_DATA_LEN)?;
                entries.push(FileNameEntry { name, data });
            }
            slots.push(FileNameSlot { lead, entries });
        }
        Ok(Self {
            lead,
            tag,
            flag,
            words,
            slots,
            trailer: c.read_words()?,
            padding: c.read_words()?,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write(&self, w: &mut Writer) {
        w.write_u32(self.lead);
        w.write_bytes(&self.tag);
        w.write_u8(self.flag);
        w.write_words(&self.words);
        for slot in &self.slots {
            w.write_u32(slot.lead);
            w.write_u32(slot.entries.len() as u32);
            for entry in &slot.entries {
                entry.name.write(w);
                w.write_bytes(&entry.data);
            }
        }
        w.write_words(&self.trailer);
        w.write_words(&self.padding);
    }

    /// Every file name referenced by the material.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .flat_map(|slot| &slot.entries)
            .filter_map(|entry| entry.name.name())
    }
}

/// Header of the index and vertex buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryHeader {
    pub lead: Vec<u8>,
    pub words: [u32; 3],
    pub constant: u32,
    pub gap: Vec<u8>,
    /// Number of 16-bit indices that follow.
    pub index_count: u32,
    pub trailer: [u32; 2],
}

impl GeometryHeader {
    fn read(c: &mut Cursor<'_>) -> DecodeResult<Self> {
        let lead = c.read_opaque(GEOMETRY_GAP_LEN)?;
        let words = c.read_words()?;
        let constant = c.read_u32()?;
        if constant != GEOMETRY_CONSTANT {
            tracing::debug!("unexpected geometry constant {constant:#x}");
        }
        let gap = c.read_opaque(GEOMETRY_GAP_LEN)?;
        let index_count = c.read_u32()?;
        let trailer = c.read_words()?;
        Ok(Self {
            lead,
            words,
            constant,
            gap,
            index_count,
            trailer,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_bytes(&self.lead);
        w.write_words(&self.words);
        w.write_u32(self.constant);
        w.write_bytes(&self.gap);
        w.write_u32(self.index_count);
        w.write_words(&self.trailer);
    }
}

/// A fully decoded `.d3dmesh` file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRecord {
    pub subtype: u32,
    pub header_data: Vec<u8>,
    /// Region whose size depends on the subtype.
    pub type_data: Vec<u8>,
    pub name: NameSlot,
    pub pre_bounds: Vec<u8>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub header_word: u32,
    pub post_bounds: Vec<u8>,
    pub chunks: Vec<ChunkRecord>,
    pub chunk_trailer: [u32; 2],
    pub skin: SkinData,
    pub material: MaterialBlock,
    pub geometry: GeometryHeader,
    pub triangles: Vec<[u16; 3]>,
    pub vertex_stride: u32,
    pub vertex_header: Vec<u8>,
    pub positions: Vec<Vec3>,
    /// `vertex_stride - 12` bytes per vertex, packed.
    pub attributes: Vec<u8>,
    /// Bytes after the vertex buffer.
    pub trailing: Vec<u8>,
}

impl MeshRecord {
    /// Read a mesh record; the cursor must sit just past the file header.
    pub fn read(c: &mut Cursor<'_>, subtype: u32) -> DecodeResult<Self> {
        let type_data_len = match subtype {
            STATIC_SUBTYPE => STATIC_TYPE_DATA_LEN,
            SKELETAL_SUBTYPE => SKELETAL_TYPE_DATA_LEN,
            _ => {
                return Err(DecodeError::UnsupportedSubtype {
                    kind: "mesh",
                    subtype,
                });
            }
        };
        let header_data = c.read_opaque(HEADER_DATA_LEN)?;
        let type_data = c.read_opaque(type_data_len)?;
        let name = NameSlot::read_required(c)?;
        let pre_bounds = c.read_opaque(PRE_BOUNDS_LEN)?;
        let bounds_min = c.read_vec3()?;
        let bounds_max = c.read_vec3()?;
        let header_word = c.read_u32()?;
        let post_bounds = c.read_opaque(POST_BOUNDS_LEN)?;

        let chunk_count = c.read_u32()?;
        let mut chunks = Vec::with_capacity(c.capacity_hint(chunk_count, CHUNK_HEADER_LEN));
        for _ in 0..chunk_count {
            chunks.push(ChunkRecord::read(c)?);
        }
        let chunk_trailer = c.read_words()?;

        let skin = if subtype == SKELETAL_SUBTYPE {
            let size = c.read_u32()?;
            let counts = c.read_words()?;
            SkinData::Skeletal {
                counts,
                data: c.read_opaque(size as usize)?,
            }
        } else {
            SkinData::Static {
                padding: c.read_words()?,
            }
        };

        let material = MaterialBlock::read(c)?;
        let geometry = GeometryHeader::read(c)?;

        let triangle_count = geometry.index_count / 3;
        let mut triangles = Vec::with_capacity(c.capacity_hint(triangle_count, 6));
        for _ in 0..triangle_count {
            triangles.push([c.read_u16()?, c.read_u16()?, c.read_u16()?]);
        }

        let vertex_count = c.read_u32()?;
        let vertex_stride = c.read_u32()?;
        let attribute_len = (vertex_stride as usize)
            .checked_sub(POSITION_LEN)
            .ok_or_else(|| DecodeError::Malformed {
                context: "mesh vertices",
                message: format!("vertex stride {vertex_stride} is smaller than a position"),
            })?;
        let vertex_header = c.read_opaque(VERTEX_HEADER_LEN)?;
        let capacity = c.capacity_hint(vertex_count, vertex_stride as usize);
        let mut positions = Vec::with_capacity(capacity);
        let mut attributes = Vec::with_capacity(capacity * attribute_len);
        for _ in 0..vertex_count {
            positions.push(c.read_vec3()?);
            attributes.extend_from_slice(c.read_bytes(attribute_len)?);
        }
        let trailing = c.read_opaque(c.remaining())?;

        tracing::debug!(
            "mesh {:?}: {} chunks, {} triangles, {} vertices (stride {vertex_stride})",
            name.name().unwrap_or_default(),
            chunks.len(),
            triangles.len(),
            positions.len(),
        );

        Ok(Self {
            subtype,
            header_data,
            type_data,
            name,
            pre_bounds,
            bounds_min,
            bounds_max,
            header_word,
            post_bounds,
            chunks,
            chunk_trailer,
            skin,
            material,
            geometry,
            triangles,
            vertex_stride,
            vertex_header,
            positions,
            attributes,
            trailing,
        })
    }

    /// Re-emit the record, header included.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(self.positions.len() * self.vertex_stride as usize);
        w.write_bytes(&MAGIC);
        w.write_u32(self.subtype);
        w.write_bytes(&self.header_data);
        w.write_bytes(&self.type_data);
        self.name.write(&mut w);
        w.write_bytes(&self.pre_bounds);
        w.write_vec3(self.bounds_min);
        w.write_vec3(self.bounds_max);
        w.write_u32(self.header_word);
        w.write_bytes(&self.post_bounds);

        w.write_u32(self.chunks.len() as u32);
        for chunk in &self.chunks {
            chunk.write(&mut w);
        }
        w.write_words(&self.chunk_trailer);

        match &self.skin {
            SkinData::Static { padding } => w.write_words(padding),
            SkinData::Skeletal { counts, data } => {
                w.write_u32(data.len() as u32);
                w.write_words(counts);
                w.write_bytes(data);
            }
        }

        self.material.write(&mut w);
        self.geometry.write(&mut w);
        for triangle in &self.triangles {
            for &index in triangle {
                w.write_u16(index);
            }
        }

        w.write_u32(self.positions.len() as u32);
        w.write_u32(self.vertex_stride);
        w.write_bytes(&self.vertex_header);
        for (i, &position) in self.positions.iter().enumerate() {
            w.write_vec3(position);
            w.write_bytes(self.vertex_attributes(i));
        }
        w.write_bytes(&self.trailing);
        w.into_bytes()
    }

    /// Wrap plain geometry in a static mesh record with zeroed opaque regions.
    ///
    /// Fails when an index does not fit the 16-bit on-disk format.
    pub fn from_mesh(name: &str, mesh: &Mesh) -> DecodeResult<Self> {
        let triangles = mesh
            .triangles
            .iter()
            .map(|t| -> DecodeResult<[u16; 3]> {
                let mut out = [0u16; 3];
                for (dst, &src) in out.iter_mut().zip(&t.0) {
                    *dst = u16::try_from(src).map_err(|_| DecodeError::InvalidGeometry {
                        message: format!("index {src} does not fit in 16 bits"),
                    })?;
                }
                Ok(out)
            })
            .collect::<DecodeResult<Vec<_>>>()?;
        let index_count = u32::try_from(triangles.len() * 3).map_err(|_| {
            DecodeError::InvalidGeometry {
                message: "too many triangles".into(),
            }
        })?;

        let positions: Vec<Vec3> = mesh.vertices.iter().map(|v| v.position).collect();
        let (bounds_min, bounds_max) = positions
            .iter()
            .fold(None, |acc: Option<(Vec3, Vec3)>, &p| match acc {
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
                None => Some((p, p)),
            })
            .unwrap_or((Vec3::ZERO, Vec3::ZERO));

        let attribute_len = DEFAULT_STRIDE as usize - POSITION_LEN;
        let mut attributes = Vec::with_capacity(positions.len() * attribute_len);
        for vertex in &mesh.vertices {
            attributes.extend_from_slice(&encode_unorm16(vertex.uv.x).to_le_bytes());
            attributes.extend_from_slice(&encode_unorm16(1.0 - vertex.uv.y).to_le_bytes());
            attributes.extend_from_slice(&[0; 4]);
        }

        Ok(Self {
            subtype: STATIC_SUBTYPE,
            header_data: vec![0; HEADER_DATA_LEN],
            type_data: vec![0; STATIC_TYPE_DATA_LEN],
            name: NameSlot::new(name),
            pre_bounds: vec![0; PRE_BOUNDS_LEN],
            bounds_min,
            bounds_max,
            header_word: 0,
            post_bounds: vec![0; POST_BOUNDS_LEN],
            chunks: mesh.chunks.iter().map(ChunkRecord::blank).collect(),
            chunk_trailer: [0; 2],
            skin: SkinData::Static { padding: [0; 5] },
            material: MaterialBlock::default(),
            geometry: GeometryHeader {
                lead: vec![0; GEOMETRY_GAP_LEN],
                words: [0; 3],
                constant: GEOMETRY_CONSTANT,
                gap: vec![0; GEOMETRY_GAP_LEN],
                index_count,
                trailer: [0; 2],
            },
            triangles,
            vertex_stride: DEFAULT_STRIDE,
            vertex_header: vec![0; VERTEX_HEADER_LEN],
            positions,
            attributes,
            trailing: Vec::new(),
        })
    }

    /// The mesh name, empty if the slot is unset.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.name().unwrap_or_default()
    }

    #[must_use]
    pub fn is_skeletal(&self) -> bool {
        matches!(self.skin, SkinData::Skeletal { .. })
    }

    /// Opaque attribute bytes of vertex `index`.
    #[must_use]
    pub fn vertex_attributes(&self, index: usize) -> &[u8] {
        let len = (self.vertex_stride as usize).saturating_sub(POSITION_LEN);
        index
            .checked_mul(len)
            .and_then(|start| self.attributes.get(start..start + len))
            .unwrap_or_default()
    }

    /// UV scale of the mesh, taken from the first chunk that stores a usable pair.
    #[must_use]
    pub fn uv_scale(&self) -> Vec2 {
        self.chunks
            .iter()
            .find_map(ChunkRecord::uv_scale)
            .unwrap_or(Vec2::ONE)
    }

    /// Build the in-memory mesh.
    pub fn to_mesh(&self, options: &DecodeOptions) -> DecodeResult<Mesh> {
        let scale = if options.apply_uv_scale {
            self.uv_scale()
        } else {
            Vec2::ONE
        };

        let vertices = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex::new(position, vertex_uv(self.vertex_attributes(i), scale)))
            .collect();
        let triangles = self
            .triangles
            .iter()
            .map(|t| Triangle(t.map(u32::from)))
            .collect();
        let chunks = (0u32..)
            .zip(&self.chunks)
            .map(|(index, chunk)| MeshChunk {
                index,
                first_vertex: chunk.first_vertex,
                last_vertex: chunk.last_vertex,
                face_offset: chunk.face_offset(),
                face_count: chunk.face_count,
                diffuse_texture: chunk.diffuse_texture().unwrap_or_default().to_owned(),
                owner: None,
            })
            .collect();

        let mesh = Mesh {
            vertices,
            triangles,
            chunks,
        };
        if options.validate_geometry {
            mesh.validate()?;
        }
        Ok(mesh)
    }
}

fn vertex_uv(attributes: &[u8], scale: Vec2) -> Vec2 {
    let view = ByteView::new(attributes);
    match (view.unorm16_at(0), view.unorm16_at(2)) {
        (Ok(u), Ok(v)) => Vec2::new(u * scale.x, 1.0 - v * scale.y),
        _ => Vec2::ZERO,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn encode_unorm16(value: f32) -> u16 {
    (value / 2.0 * f32::from(u16::MAX))
        .round()
        .clamp(0.0, f32::from(u16::MAX)) as u16
}
