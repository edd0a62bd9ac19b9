//! Binary `.mesh` -> mesh XML conversion
//!
//! The binary format is read by Ogre's own `OgreXMLConverter`, run as a
//! subprocess. Everything downstream only sees the XML it produces.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces mesh XML from a binary mesh file
pub trait MeshXmlConverter {
    /// Convert `input` into an XML file inside `output_dir`, returning its path
    fn convert_to_xml(&self, input: &Path, output_dir: &Path) -> Result<PathBuf>;
}

/// Runs the `OgreXMLConverter` command-line tool
#[derive(Debug, Clone)]
pub struct OgreXmlConverter {
    executable: PathBuf,
}

impl OgreXmlConverter {
    const NAMES: [&'static str; 2] = ["OgreXMLConverter", "OgreXMLConverter.exe"];

    /// Use an explicit executable path
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Find the converter in `tools_dir`, then on `PATH`
    ///
    /// Falls back to the bare executable name so a failure surfaces when
    /// the converter is actually run.
    pub fn locate(tools_dir: Option<&Path>) -> Self {
        if let Some(dir) = tools_dir {
            for name in Self::NAMES {
                let candidate = dir.join(name);
                if candidate.exists() {
                    return Self::new(candidate);
                }
            }
        }

        for name in Self::NAMES {
            if let Ok(path) = which::which(name) {
                return Self::new(path);
            }
        }

        tracing::warn!("OgreXMLConverter not found, relying on PATH at run time");
        Self::new(Self::NAMES[0])
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl MeshXmlConverter for OgreXmlConverter {
    fn convert_to_xml(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        let file_name = input
            .file_name()
            .with_context(|| format!("Input has no file name: {:?}", input))?;

        let mut xml_name = file_name.to_os_string();
        xml_name.push(".xml");
        let expected = output_dir.join(xml_name);

        tracing::info!("Running: {:?} {:?} {:?}", self.executable, input, expected);
        let output = Command::new(&self.executable)
            .arg(input)
            .arg(&expected)
            .output()
            .with_context(|| format!("Failed to run {:?}", self.executable))?;

        if !output.status.success() {
            bail!(
                "{:?} failed on {:?} ({}):\n{}{}",
                self.executable,
                input,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        if expected.exists() {
            return Ok(expected);
        }

        // Some converter builds replace the extension instead of appending
        let alternative = output_dir.join(Path::new(file_name).with_extension("xml"));
        if alternative.exists() {
            return Ok(alternative);
        }

        bail!(
            "Converter reported success but no XML was written for {:?} (expected {:?})",
            input,
            expected
        )
    }
}
