//! ogre-export - Ogre mesh conversion tool
//!
//! Converts Ogre meshes (binary .mesh via OgreXMLConverter, or .mesh.xml)
//! to OBJ + MTL, and recalculates vertex normals in mesh XML files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use ogre_export::{batch, config, convert, normals};
use ogre_export::{ExportConfig, MeshXmlConverter, OgreXmlConverter};

#[derive(Parser)]
#[command(name = "ogre-export")]
#[command(about = "Ogre mesh conversion tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Export settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Do not create MTL files
    #[arg(long, global = true)]
    no_mtl: bool,

    /// Keep intermediate XML files
    #[arg(long, global = true)]
    keep_xml: bool,

    /// Directory searched for textures (default: current directory)
    #[arg(long, global = true)]
    texture_root: Option<PathBuf>,

    /// Directory containing OgreXMLConverter
    #[arg(long, global = true)]
    ogre_tools: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single mesh to OBJ
    Obj {
        /// Input .mesh or .mesh.xml file
        input: PathBuf,

        /// Output .obj file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert every mesh in a directory to OBJ
    Batch {
        /// Directory containing .mesh / .mesh.xml files
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Recalculate vertex normals in a mesh XML file (in place)
    Normals {
        /// Input .mesh.xml file
        input: PathBuf,
    },
}

impl Cli {
    /// Settings file (if any) with command-line overrides applied
    fn export_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ExportConfig::default(),
        };
        if self.no_mtl {
            config.write_mtl = false;
        }
        if self.keep_xml {
            config.keep_xml = true;
        }
        if let Some(root) = &self.texture_root {
            config.texture_root = Some(root.clone());
        }
        if let Some(tools) = &self.ogre_tools {
            config.converter_path = Some(tools.clone());
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.export_config()?;

    match cli.command {
        Commands::Obj { input, output } => {
            let output = match output {
                Some(output) => output,
                None => default_obj_path(&input)?,
            };
            tracing::info!("Converting {:?} -> {:?}", input, output);
            convert_single(&input, &output, &config)?;
            tracing::info!("Done!");
        }

        Commands::Batch { input, output } => {
            let inputs = batch::collect_inputs(&input)?;
            let converter = OgreXmlConverter::locate(config.converter_path.as_deref());
            let report = batch::convert_batch(&inputs, &output, &config, &converter)?;

            if !report.is_success() {
                for failure in &report.failed {
                    tracing::error!("Failed: {:?}", failure.input);
                }
                anyhow::bail!(
                    "{} of {} files failed to convert",
                    report.failed.len(),
                    report.total()
                );
            }
            tracing::info!("Conversion complete!");
        }

        Commands::Normals { input } => {
            if !input.exists() {
                anyhow::bail!("File {:?} not found", input);
            }
            let is_xml = input
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
            if !is_xml {
                anyhow::bail!("File {:?} is not an XML file", input);
            }

            tracing::info!("Processing: {:?}", input);
            normals::recalculate_normals_file(&input)?;
            tracing::info!("Normal recalculation completed successfully");
        }
    }

    Ok(())
}

fn default_obj_path(input: &Path) -> Result<PathBuf> {
    let name = convert::obj_file_name(input)
        .ok_or_else(|| anyhow::anyhow!("Input has no usable file name: {:?}", input))?;
    Ok(input.with_file_name(name))
}

/// Convert one mesh, running the external converter first for binary input
fn convert_single(input: &Path, output: &Path, config: &ExportConfig) -> Result<()> {
    let is_xml = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
    if is_xml {
        convert::convert_xml_file(input, output, config)?;
        return Ok(());
    }

    let converter = OgreXmlConverter::locate(config.converter_path.as_deref());
    if config.keep_xml {
        let xml_dir = input.parent().unwrap_or(Path::new("."));
        let xml = converter.convert_to_xml(input, xml_dir)?;
        convert::convert_xml_file(&xml, output, config)?;
    } else {
        let scratch = tempfile::tempdir()?;
        let xml = converter.convert_to_xml(input, scratch.path())?;
        convert::convert_xml_file(&xml, output, config)?;
        tracing::info!("Cleaned up temporary XML file");
    }
    Ok(())
}
