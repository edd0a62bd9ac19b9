//! Single-file conversion (mesh XML -> OBJ + MTL)

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::ExportConfig;
use crate::document::MeshDocument;
use crate::formats::{write_mtl, write_obj};
use crate::mesh::MeshAssembly;
use crate::textures::discover_textures;
use crate::tree::parse_document;

/// Result of in-memory conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedObj {
    /// OBJ file contents
    pub obj: String,
    /// MTL file contents, when a material file is produced
    pub mtl: Option<String>,
    pub vertex_count: usize,
    pub face_count: usize,
}

/// Convert mesh XML text to OBJ/MTL text
///
/// `obj_path` is where the OBJ will live; it names the OBJ groups, the
/// material library and the textures to look for, and anchors the relative
/// texture paths.
pub fn convert_xml_to_memory(
    xml: &str,
    obj_path: &Path,
    config: &ExportConfig,
) -> Result<ConvertedObj> {
    let tree = parse_document(xml).context("Failed to parse mesh XML")?;
    let document = MeshDocument::from_tree(&tree)?;
    let mesh = MeshAssembly::from_document(&document)?;

    let base_name = obj_path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Output has no usable file name: {:?}", obj_path))?;

    let mtl = if config.write_mtl && !mesh.submeshes.is_empty() {
        let output_dir = obj_path.parent().unwrap_or(Path::new("."));
        let textures = discover_textures(
            &config.texture_root(),
            base_name,
            output_dir,
            &config.texture_extensions,
        );
        let mut buf = Vec::new();
        write_mtl(&mut buf, &mesh, &textures)?;
        Some(String::from_utf8(buf)?)
    } else {
        None
    };

    let mtl_name = mtl.as_ref().map(|_| format!("{}.mtl", base_name));
    let mut buf = Vec::new();
    write_obj(&mut buf, &mesh, base_name, mtl_name.as_deref())?;

    Ok(ConvertedObj {
        obj: String::from_utf8(buf)?,
        mtl,
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
    })
}

/// Convert a mesh XML file to an OBJ file (plus MTL alongside)
///
/// Nothing is written unless the whole conversion succeeded.
pub fn convert_xml_file(input: &Path, output: &Path, config: &ExportConfig) -> Result<ConvertedObj> {
    let xml = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read mesh XML: {:?}", input))?;
    let converted = convert_xml_to_memory(&xml, output, config)
        .with_context(|| format!("Failed to convert {:?}", input))?;

    // Material file first: an OBJ on disk always has its mtllib next to it
    let mtl_path = output.with_extension("mtl");
    if let Some(mtl) = &converted.mtl {
        std::fs::write(&mtl_path, mtl)
            .with_context(|| format!("Failed to create output: {:?}", mtl_path))?;
    }
    if let Err(e) = std::fs::write(output, &converted.obj) {
        if converted.mtl.is_some() {
            let _ = std::fs::remove_file(&mtl_path);
        }
        return Err(e).with_context(|| format!("Failed to create output: {:?}", output));
    }

    tracing::info!(
        "Converted {:?} -> {:?}: {} vertices, {} faces",
        input,
        output,
        converted.vertex_count,
        converted.face_count
    );

    Ok(converted)
}

/// OBJ file name for a mesh input: `a.mesh.xml`, `a.xml` and `a.mesh` all give `a.obj`
pub fn obj_file_name(input: &Path) -> Option<String> {
    let name = input.file_name()?.to_str()?;
    let stem = strip_suffix_ignore_case(name, ".xml").unwrap_or(name);
    let stem = strip_suffix_ignore_case(stem, ".mesh").unwrap_or(stem);
    Some(format!("{}.obj", stem))
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if s.is_char_boundary(split) && s[split..].eq_ignore_ascii_case(suffix) {
        Some(&s[..split])
    } else {
        None
    }
}
