//! Wavefront OBJ/MTL writers.
//!
//! Chunks become OBJ groups named `<chunk index>_<owner>` with a counter
//! suffix for repeated materials of the same owner; every unique diffuse
//! texture becomes one `m_<texture>` material.

use std::io::{self, Write};

use ertm_decode::Mesh;
use glam::Vec3;

/// Prefix of texture names that encode a flat colour (`color_RRGGBB`).
pub const COLOR_PREFIX: &str = "color_";

/// Write `mesh` as OBJ, referencing the material library `mtllib`.
pub fn write_obj<W: Write>(out: &mut W, mesh: &Mesh, mtllib: &str) -> io::Result<()> {
    writeln!(out, "mtllib {mtllib}")?;
    for v in &mesh.vertices {
        writeln!(out, "v {} {} {}", v.position.x, v.position.y, v.position.z)?;
        writeln!(out, "vt {} {}", v.uv.x, v.uv.y)?;
    }

    let mut texture: Option<&str> = None;
    let mut owner: Option<&str> = None;
    let mut repeat = 0u32;
    for chunk in &mesh.chunks {
        let chunk_owner = chunk.owner.as_deref().unwrap_or("");
        if texture != Some(chunk.diffuse_texture.as_str()) || owner != Some(chunk_owner) {
            if owner != Some(chunk_owner) {
                repeat = 0;
            }
            if repeat > 0 {
                writeln!(out, "g {}_{chunk_owner}{repeat}", chunk.index)?;
            } else {
                writeln!(out, "g {}_{chunk_owner}", chunk.index)?;
            }
            writeln!(out, "usemtl {}", chunk.material_name())?;
            texture = Some(chunk.diffuse_texture.as_str());
            owner = Some(chunk_owner);
            repeat += 1;
        }

        let Some(faces) = mesh.triangles.get(chunk.faces()) else {
            tracing::warn!(
                "chunk {} covers faces {:?} but the mesh has {}, skipping its faces",
                chunk.index,
                chunk.faces(),
                mesh.triangles.len()
            );
            continue;
        };
        for t in faces {
            let [a, b, c] = t.0.map(|i| u64::from(i) + 1);
            writeln!(out, "f {a}/{a} {b}/{b} {c}/{c}")?;
        }
    }
    Ok(())
}

/// Write one material per unique diffuse texture of `mesh`.
pub fn write_mtl<W: Write>(out: &mut W, mesh: &Mesh) -> io::Result<()> {
    for texture in mesh.textures() {
        writeln!(out, "newmtl m_{texture}")?;
        let kd = material_color(texture).unwrap_or(Vec3::ONE);
        writeln!(out, "Kd {} {} {}", kd.x, kd.y, kd.z)?;
        writeln!(out, "Ka 1.000 1.000 1.000")?;
        writeln!(out, "Ks 0.000 0.000 0.000")?;
        writeln!(out, "map_Kd {texture}.dds")?;
    }
    Ok(())
}

/// Colour encoded in a texture name of the form `color_RGB` .. `color_RRGGBB`.
///
/// Three digits expand each nibble (`color_f80` is `#ff8800`); other lengths
/// are read as a right-aligned `RRGGBB` value.
#[must_use]
pub fn material_color(texture: &str) -> Option<Vec3> {
    let hex = texture.strip_prefix(COLOR_PREFIX)?;
    if !(3..=6).contains(&hex.len()) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    let rgb = if hex.len() == 3 {
        let nibble = |shift: u32| ((value >> shift) & 0xF) * 0x11;
        [nibble(8), nibble(4), nibble(0)]
    } else {
        [(value >> 16) & 0xFF, (value >> 8) & 0xFF, value & 0xFF]
    };
    let [r, g, b] = rgb.map(|c| u8::try_from(c).map_or(1.0, |c| f32::from(c) / 255.0));
    Some(Vec3::new(r, g, b))
}

/// Textures a converted mesh needs as image files (flat-colour names excluded).
#[must_use]
pub fn required_textures(mesh: &Mesh) -> Vec<&str> {
    mesh.textures()
        .into_iter()
        .filter(|t| !t.starts_with(COLOR_PREFIX) && !t.is_empty())
        .collect()
}
