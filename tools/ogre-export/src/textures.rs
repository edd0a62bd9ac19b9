//! Texture auto-discovery for material files
//!
//! Looks for `{mesh}{suffix}.{ext}` anywhere under a search root, where the
//! suffix picks the material slot (`_d` diffuse, `_e` emissive, `_n` bump,
//! `_s` specular). Extensions are tried in configured order and the first
//! match per slot wins.

use std::path::{Component, Path, PathBuf};

use hashbrown::HashMap;
use walkdir::WalkDir;

use crate::formats::{TextureBindings, TextureMap};

/// Extensions tried for each texture slot, in priority order
pub const DEFAULT_TEXTURE_EXTENSIONS: [&str; 8] =
    ["tga", "png", "jpg", "jpeg", "dds", "tif", "tiff", "bmp"];

/// Find textures for `base_name` under `root`
///
/// Returned paths are relative to `output_dir` (the material file's directory).
pub fn discover_textures(
    root: &Path,
    base_name: &str,
    output_dir: &Path,
    extensions: &[String],
) -> TextureBindings {
    // First occurrence in sorted walk order wins for each file name
    let mut candidates: HashMap<String, PathBuf> = HashMap::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with(base_name) {
            candidates
                .entry(name.to_owned())
                .or_insert_with(|| entry.path().to_path_buf());
        }
    }

    let mut bindings = TextureBindings::default();
    for map in TextureMap::ALL {
        let found = extensions.iter().find_map(|ext| {
            let file_name = format!("{}{}.{}", base_name, map.suffix(), ext.trim_start_matches('.'));
            candidates.get(&file_name)
        });

        if let Some(path) = found {
            let relative = relative_path(path, output_dir);
            tracing::debug!("Found {} texture: {}", map.mtl_key(), relative);
            bindings.bind(map, relative);
        }
    }

    bindings
}

/// Path of `path` relative to directory `base`, using `/` separators
pub fn relative_path(path: &Path, base: &Path) -> String {
    let base = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base
    };
    let path = normalize(path);
    let base = normalize(base);

    let path_parts: Vec<Component<'_>> = path.components().collect();
    let base_parts: Vec<Component<'_>> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_owned(); base_parts.len() - common];
    parts.extend(
        path_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        ".".to_owned()
    } else {
        parts.join("/")
    }
}

/// Absolute form of `path` with `.` and `..` resolved lexically
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !matches!(
                    normalized.components().next_back(),
                    None | Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.pop();
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
