//! Batch conversion of a directory of meshes
//!
//! Each input is converted on its own. A failure is recorded against that
//! file and the batch moves on; it never leaves output for the failed file
//! and never affects the other files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::ExportConfig;
use crate::convert::{convert_xml_file, obj_file_name};
use crate::converter::MeshXmlConverter;

/// A file that failed to convert
#[derive(Debug)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: anyhow::Error,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// (input, written OBJ) pairs
    pub converted: Vec<(PathBuf, PathBuf)>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// List mesh inputs directly inside `dir`: `*.xml` and binary `*.mesh`
///
/// A binary mesh is left out when its `.mesh.xml` sits next to it.
pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut xml = Vec::new();
    let mut binary = Vec::new();

    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {:?}", dir))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        match extension(&path).as_str() {
            "xml" => xml.push(path),
            "mesh" => binary.push(path),
            _ => {}
        }
    }

    binary.retain(|mesh| {
        let mut sibling = mesh.clone().into_os_string();
        sibling.push(".xml");
        !xml.contains(&PathBuf::from(sibling))
    });

    let mut inputs: Vec<PathBuf> = xml.into_iter().chain(binary).collect();
    inputs.sort();
    Ok(inputs)
}

/// Convert every input into `output_dir`
///
/// Binary meshes go through `converter` first. Intermediate XML lands in
/// `output_dir/xml_temp` when `keep_xml` is set, else in a scratch
/// directory removed afterwards.
pub fn convert_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &ExportConfig,
    converter: &dyn MeshXmlConverter,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut scratch: Option<TempDir> = None;
    let xml_dir = if config.keep_xml {
        let dir = output_dir.join("xml_temp");
        std::fs::create_dir_all(&dir)?;
        dir
    } else {
        let dir = tempfile::tempdir().context("Failed to create scratch directory")?;
        let path = dir.path().to_path_buf();
        scratch = Some(dir);
        path
    };

    tracing::info!("Processing {} mesh files", inputs.len());

    let mut report = BatchReport::default();
    for input in inputs {
        tracing::info!("Processing: {:?}", input);
        match convert_one(input, output_dir, &xml_dir, config, converter) {
            Ok(output) => report.converted.push((input.clone(), output)),
            Err(error) => {
                tracing::error!("Error converting {:?}: {:#}", input, error);
                report.failed.push(BatchFailure {
                    input: input.clone(),
                    error,
                });
            }
        }
    }

    if let Some(dir) = scratch {
        dir.close().context("Failed to remove scratch directory")?;
        tracing::debug!("Cleaned up temporary XML files");
    }

    tracing::info!(
        "Converted {} of {} files",
        report.converted.len(),
        report.total()
    );
    Ok(report)
}

fn convert_one(
    input: &Path,
    output_dir: &Path,
    xml_dir: &Path,
    config: &ExportConfig,
    converter: &dyn MeshXmlConverter,
) -> Result<PathBuf> {
    let name = obj_file_name(input)
        .with_context(|| format!("Input has no usable file name: {:?}", input))?;
    let output = output_dir.join(name);

    let xml = if extension(input) == "mesh" {
        converter.convert_to_xml(input, xml_dir)?
    } else {
        input.to_path_buf()
    };

    convert_xml_file(&xml, &output, config)?;
    Ok(output)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}
