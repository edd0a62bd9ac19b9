//! Export settings
//!
//! Settings come from an optional TOML file; command-line flags override
//! individual fields.
//!
//! ```toml
//! texture_root = "assets/textures"
//! texture_extensions = ["png", "tga"]
//! write_mtl = true
//! keep_xml = false
//! converter_path = "/opt/ogre/bin"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::textures::DEFAULT_TEXTURE_EXTENSIONS;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory searched recursively for textures (current directory if unset)
    pub texture_root: Option<PathBuf>,
    /// Texture extensions, in the order they are tried
    pub texture_extensions: Vec<String>,
    /// Write an MTL file next to each OBJ
    pub write_mtl: bool,
    /// Keep intermediate XML produced by the external converter
    pub keep_xml: bool,
    /// Directory containing the OgreXMLConverter executable
    pub converter_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            texture_root: None,
            texture_extensions: DEFAULT_TEXTURE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            write_mtl: true,
            keep_xml: false,
            converter_path: None,
        }
    }
}

impl ExportConfig {
    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Directory searched for textures
    pub fn texture_root(&self) -> PathBuf {
        self.texture_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Load settings from a TOML file
pub fn load_config(path: &Path) -> Result<ExportConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    ExportConfig::parse(&content).with_context(|| format!("Failed to parse config: {:?}", path))
}
