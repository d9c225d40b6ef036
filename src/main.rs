use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use maven_version_agent::{
    config::Config,
    error::MavenError,
    github::ActionsOutputs,
    maven::{BumpType, ModuleReader, Project, SemanticVersion},
    types::{
        uniform_version, BumpReport, ModuleVersionChange, ModuleVersionEntry, VersionsReport,
        UNDEFINED_VERSION,
    },
};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "maven-version")]
#[command(about = "Version resolution and bump agent for Maven multi-module projects")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bump the project version across every module
    Bump {
        /// Version component to increase
        #[arg(long, value_enum)]
        bump_type: BumpType,

        /// Update the modules with a custom X.Y.Z version instead.
        /// Overrides the bump type; existing prefix/suffix decorations
        /// are kept.
        #[arg(long, default_value = "")]
        custom_version: String,

        /// Bump even when the modules currently disagree on a version.
        /// Every module version is then increased independently.
        #[arg(long)]
        accept_non_uniform_versions: bool,

        /// Do not publish GitHub Actions step outputs
        #[arg(long)]
        no_github_action_outputs: bool,

        /// Report format (text, markdown, json)
        #[arg(short, long)]
        output: Option<String>,

        /// Report file path (defaults to stdout)
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,

        /// Root descriptor paths, each literally named pom.xml
        #[arg(required = true)]
        pom: Vec<PathBuf>,
    },

    /// Report the currently resolved module versions without changing anything
    Versions {
        /// Report format (text, markdown, json)
        #[arg(short, long)]
        output: Option<String>,

        /// Report file path (defaults to stdout)
        #[arg(short = 'f', long)]
        output_file: Option<PathBuf>,

        /// Root descriptor paths, each literally named pom.xml
        #[arg(required = true)]
        pom: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)?;

    info!("Starting Maven version agent");

    let config = load_config(cli.config.as_ref()).await?;

    match cli.command {
        Commands::Bump {
            bump_type,
            custom_version,
            accept_non_uniform_versions,
            no_github_action_outputs,
            output,
            output_file,
            pom,
        } => {
            bump(
                pom,
                bump_type,
                custom_version,
                accept_non_uniform_versions,
                no_github_action_outputs,
                output,
                output_file,
                config,
            )
            .await?;
        }

        Commands::Versions {
            output,
            output_file,
            pom,
        } => {
            versions(pom, output, output_file, config).await?;
        }
    }

    Ok(())
}

/// Initialize tracing with the specified log level
fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .context("Failed to create env filter")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}

/// Load configuration from file, falling back to environment overrides
async fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        if path.exists() {
            info!("Loading configuration from: {:?}", path);
            Config::load_from_file(path)
                .await
                .with_context(|| format!("Failed to load config file: {:?}", path))?
        } else {
            warn!("Configuration file not found: {:?}. Using defaults.", path);
            Config::load_from_env()?
        }
    } else {
        Config::load_from_env()?
    };

    config.validate()?;
    Ok(config)
}

/// Bump every module of the forest reachable from the given root descriptors
#[allow(clippy::too_many_arguments)]
async fn bump(
    poms: Vec<PathBuf>,
    bump_type: BumpType,
    custom_version: String,
    accept_non_uniform_versions: bool,
    no_github_action_outputs: bool,
    output_format: Option<String>,
    output_file: Option<PathBuf>,
    config: Config,
) -> Result<()> {
    validate_descriptor_paths(&poms)?;

    if !custom_version.is_empty() && !SemanticVersion::is_valid(&custom_version) {
        return Err(MavenError::InvalidCustomVersion {
            version: custom_version,
        }
        .into());
    }

    let project = load_project(&poms)?;
    info!(
        "Loaded {} modules from {} root descriptor(s)",
        project.len(),
        poms.len()
    );

    let github_outputs = ActionsOutputs::from_env();
    let outputs_enabled = config.github.action_outputs && !no_github_action_outputs;

    let old_versions = project.module_versions()?;
    let old_version =
        uniform_version(old_versions.values()).unwrap_or_else(|| UNDEFINED_VERSION.to_string());
    if outputs_enabled {
        github_outputs.write("old_version", &old_version)?;
    }

    let assert_uniform_version =
        !(accept_non_uniform_versions || config.bump.accept_non_uniform_versions);
    project.bump_version(bump_type, &custom_version, assert_uniform_version, true)?;

    let new_versions = project.module_versions()?;
    let new_version =
        uniform_version(new_versions.values()).unwrap_or_else(|| UNDEFINED_VERSION.to_string());
    if outputs_enabled {
        github_outputs.write("new_version", &new_version)?;
    }

    let report = build_bump_report(old_version, new_version, &old_versions, &new_versions);
    let format = output_format.unwrap_or_else(|| config.output.format.clone());
    let content = render_bump_report(&report, &format)?;
    write_output(&content, output_file.as_ref()).await?;

    info!("Version bump completed successfully");
    Ok(())
}

/// Report the currently resolved versions across the forest
async fn versions(
    poms: Vec<PathBuf>,
    output_format: Option<String>,
    output_file: Option<PathBuf>,
    config: Config,
) -> Result<()> {
    validate_descriptor_paths(&poms)?;

    let project = load_project(&poms)?;
    info!(
        "Loaded {} modules from {} root descriptor(s)",
        project.len(),
        poms.len()
    );

    let module_versions = project.module_versions()?;
    let version = uniform_version(module_versions.values())
        .unwrap_or_else(|| UNDEFINED_VERSION.to_string());

    let report = VersionsReport {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        version,
        modules: module_versions
            .into_iter()
            .map(|(module, version)| ModuleVersionEntry { module, version })
            .collect(),
    };

    let format = output_format.unwrap_or_else(|| config.output.format.clone());
    let content = render_versions_report(&report, &format)?;
    write_output(&content, output_file.as_ref()).await?;

    Ok(())
}

/// Only descriptors literally named `pom.xml` are supported
fn validate_descriptor_paths(poms: &[PathBuf]) -> Result<()> {
    for pom in poms {
        if pom.file_name() != Some(std::ffi::OsStr::new("pom.xml")) {
            return Err(MavenError::UnsupportedDescriptor { path: pom.clone() }.into());
        }
    }

    Ok(())
}

/// Read every root descriptor recursively into one module registry
fn load_project(poms: &[PathBuf]) -> Result<Project> {
    let reader = ModuleReader::new();
    let mut project = Project::new();

    for pom in poms {
        let modules = reader
            .read_recursive(pom)
            .with_context(|| format!("Failed to read module tree from {:?}", pom))?;
        debug!("Discovered {} modules from {:?}", modules.len(), pom);
        project.add_modules(modules);
    }

    Ok(project)
}

fn build_bump_report(
    old_version: String,
    new_version: String,
    old_versions: &IndexMap<String, String>,
    new_versions: &IndexMap<String, String>,
) -> BumpReport {
    let modules = old_versions
        .iter()
        .map(|(module, old)| ModuleVersionChange {
            module: module.clone(),
            old_version: old.clone(),
            new_version: new_versions
                .get(module)
                .cloned()
                .unwrap_or_else(|| UNDEFINED_VERSION.to_string()),
        })
        .collect();

    BumpReport {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        old_version,
        new_version,
        modules,
    }
}

/// Render the bump report in the specified format
fn render_bump_report(report: &BumpReport, format: &str) -> Result<String> {
    match format.to_lowercase().as_str() {
        "json" => Ok(serde_json::to_string_pretty(report)?),
        "markdown" => Ok(generate_bump_markdown(report)),
        "text" => Ok(generate_bump_text(report)),
        _ => {
            warn!("Unknown output format '{}', using text", format);
            Ok(generate_bump_text(report))
        }
    }
}

fn render_versions_report(report: &VersionsReport, format: &str) -> Result<String> {
    match format.to_lowercase().as_str() {
        "json" => Ok(serde_json::to_string_pretty(report)?),
        "markdown" => Ok(generate_versions_markdown(report)),
        "text" => Ok(generate_versions_text(report)),
        _ => {
            warn!("Unknown output format '{}', using text", format);
            Ok(generate_versions_text(report))
        }
    }
}

/// Generate markdown format report
fn generate_bump_markdown(report: &BumpReport) -> String {
    format!(
        r#"# Maven Version Bump Report

**Old Version**: {}
**New Version**: {}

## Modules
{}

---
*Generated at: {}*
"#,
        report.old_version,
        report.new_version,
        report
            .modules
            .iter()
            .map(|change| {
                format!(
                    "- `{}`: {} -> {}",
                    change.module, change.old_version, change.new_version
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Generate plain text format report
fn generate_bump_text(report: &BumpReport) -> String {
    format!(
        r#"Maven Version Bump Report
=========================

Old Version: {}
New Version: {}

Modules:
{}

Generated at: {}
"#,
        report.old_version,
        report.new_version,
        report
            .modules
            .iter()
            .map(|change| {
                format!(
                    "- {}: {} -> {}",
                    change.module, change.old_version, change.new_version
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn generate_versions_markdown(report: &VersionsReport) -> String {
    format!(
        r#"# Maven Module Versions

**Project Version**: {}

## Modules
{}

---
*Generated at: {}*
"#,
        report.version,
        report
            .modules
            .iter()
            .map(|entry| format!("- `{}`: {}", entry.module, entry.version))
            .collect::<Vec<_>>()
            .join("\n"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

fn generate_versions_text(report: &VersionsReport) -> String {
    format!(
        r#"Maven Module Versions
=====================

Project Version: {}

Modules:
{}

Generated at: {}
"#,
        report.version,
        report
            .modules
            .iter()
            .map(|entry| format!("- {}: {}", entry.module, entry.version))
            .collect::<Vec<_>>()
            .join("\n"),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Write the rendered report to a file or stdout
async fn write_output(content: &str, output_file: Option<&PathBuf>) -> Result<()> {
    if let Some(file_path) = output_file {
        tokio::fs::write(file_path, content)
            .await
            .with_context(|| format!("Failed to write output to: {:?}", file_path))?;
        info!("Report written to: {:?}", file_path);
    } else {
        println!("{}", content);
    }

    Ok(())
}
