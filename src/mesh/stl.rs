use super::Triangle;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write triangles to a binary STL file
///
/// Binary STL format:
/// - 80 byte header
/// - 4 byte u32 triangle count (little endian)
/// - For each triangle: normal, three vertices (f32) and a 2 byte attribute
///
/// # Arguments
/// * `path` - Output file path
/// * `triangles` - Triangles to write
pub fn write_stl(path: &Path, triangles: &[Triangle]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    write_stl_to(&mut writer, triangles)
        .with_context(|| format!("Failed to write STL file: {}", path.display()))?;
    writer.flush()?;

    Ok(())
}

/// Write binary STL to any writer
pub fn write_stl_to<W: Write>(writer: &mut W, triangles: &[Triangle]) -> Result<()> {
    let faces = triangles.iter().map(|tri| stl_io::Triangle {
        normal: stl_io::Normal::new(tri.normal),
        vertices: tri.vertices.map(stl_io::Vertex::new),
    });
    stl_io::write_stl(writer, faces)?;
    Ok(())
}

/// Get the file size of an STL with the given number of triangles
pub fn estimate_stl_size(triangle_count: usize) -> usize {
    // 80 (header) + 4 (count) + triangles * (12 normal + 36 vertices + 2 attribute)
    80 + 4 + triangle_count * 50
}
