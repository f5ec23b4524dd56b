//! TapStack: deployment configuration for the TapStack web application stack
//!
//! Resolves stack configuration from the environment and deployment context,
//! renders the stack plan, and checks deployment outputs offline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use tapstack_core::{
    logging::{self, Logger, SharedLogger},
    outputs::{self, DEFAULT_OUTPUTS_FILE},
    sources::DEFAULT_REGION_FILE,
    ConfigurationResolver, ConsoleLogger, ContextLoader, ContextMap, EnvSnapshot, FlatOutputs,
    ResolvedConfiguration, ResolverInputs, StackFlags, StackPlanBuilder,
};

/// TapStack: stack configuration resolver
///
/// Every setting is taken from the environment first, then the deployment
/// context, then a built-in default.
#[derive(Parser, Debug)]
#[command(name = "tapstack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Context override as key=value (repeatable)
    #[arg(short = 'c', long = "context", value_name = "KEY=VALUE", global = true)]
    context: Vec<String>,

    /// Extra context file (JSON or YAML), applied after cdk.json
    #[arg(long, value_name = "PATH", global = true)]
    context_file: Option<PathBuf>,

    /// Project directory holding cdk.json and lib/AWS_REGION
    #[arg(long, default_value = ".", env = "TAPSTACK_PROJECT_DIR", global = true)]
    project_dir: PathBuf,

    /// Region override file [default: <project-dir>/lib/AWS_REGION]
    #[arg(long, value_name = "PATH", global = true)]
    region_file: Option<PathBuf>,

    /// Skip ~/.tapstack/context.yaml
    #[arg(long, global = true)]
    no_user_context: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the resolved configuration and where each value came from
    Resolve {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Render the stack plan
    Synth {
        /// Write the plan here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Show deployment outputs
    Outputs {
        /// Flat outputs file [default: <project-dir>/cfn-outputs/flat-outputs.json]
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check deployment outputs against the stack plan
    Verify {
        /// Flat outputs file [default: <project-dir>/cfn-outputs/flat-outputs.json]
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the name for a resource label
    Name {
        /// Resource label, e.g. vpc
        label: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let logger: SharedLogger = Arc::new(ConsoleLogger::new().verbose(cli.verbose));
    logger.debug(&format!("debug trail: {}", logging::log_file_path().display()));

    match &cli.command {
        Commands::Resolve { format } => {
            let (config, _) = resolve_config(&cli, logger)?;
            show_resolved(&config, *format)
        }

        Commands::Synth { out, format } => {
            let (config, context) = resolve_config(&cli, logger.clone())?;
            let plan = StackPlanBuilder::new(&config, StackFlags::from_context(&context))
                .with_logger(logger)
                .build();
            let rendered = match format {
                Format::Json => plan.to_json_pretty()?,
                Format::Yaml => plan.to_yaml()?,
            };

            match out {
                Some(path) => {
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        fs::create_dir_all(parent)
                            .with_context(|| format!("Failed to create {}", parent.display()))?;
                    }
                    fs::write(path, rendered)
                        .with_context(|| format!("Failed to write plan to {}", path.display()))?;
                    println!("Wrote {} ({} resources)", path.display(), plan.resources.len());
                }
                None => println!("{}", rendered),
            }
            Ok(())
        }

        Commands::Outputs { file } => {
            let path = outputs_path(&cli, file.as_deref());
            match FlatOutputs::load(&path)
                .with_context(|| format!("Failed to read outputs from {}", path.display()))?
            {
                Some(outputs) => println!("{}", serde_json::to_string_pretty(&outputs)?),
                None => println!("No outputs at {}, skipping", path.display()),
            }
            Ok(())
        }

        Commands::Verify { file } => {
            let path = outputs_path(&cli, file.as_deref());
            let (config, context) = resolve_config(&cli, logger.clone())?;
            let plan = StackPlanBuilder::new(&config, StackFlags::from_context(&context))
                .with_logger(logger)
                .build();

            let report = outputs::load_and_verify(&path, &plan)
                .with_context(|| format!("Failed to verify outputs in {}", path.display()))?;
            match report {
                None => {
                    println!("No outputs at {}, skipping verification", path.display());
                    Ok(())
                }
                Some(report) => {
                    println!("{}", report);
                    if !report.is_success() {
                        anyhow::bail!("{} check(s) failed", report.failed());
                    }
                    Ok(())
                }
            }
        }

        Commands::Name { label } => {
            let (config, _) = resolve_config(&cli, logger)?;
            println!("{}", config.resource_name(label));
            Ok(())
        }
    }
}

/// Load context layers and resolve against the process environment
fn resolve_config(
    cli: &Cli,
    logger: SharedLogger,
) -> anyhow::Result<(ResolvedConfiguration, ContextMap)> {
    let mut loader = ContextLoader::new(&cli.project_dir).with_overrides(cli.context.iter().cloned());
    if cli.no_user_context {
        loader = loader.with_user_file(None);
    }
    if let Some(path) = &cli.context_file {
        if !path.exists() {
            anyhow::bail!("Context file not found: {}", path.display());
        }
        loader = loader.with_context_file(path);
    }

    let context = loader.load().context("Failed to load deployment context")?;
    logging::debug("cli", &format!("context keys: {:?}", context.keys().collect::<Vec<_>>()));

    let region_file = cli
        .region_file
        .clone()
        .unwrap_or_else(|| cli.project_dir.join(DEFAULT_REGION_FILE));
    let inputs = ResolverInputs::new(EnvSnapshot::capture(), context.clone())
        .with_region_file(region_file);

    let config = ConfigurationResolver::with_logger(inputs, logger)
        .resolve()
        .context("Failed to resolve stack configuration")?;
    Ok((config, context))
}

fn outputs_path(cli: &Cli, file: Option<&Path>) -> PathBuf {
    file.map(Path::to_path_buf)
        .unwrap_or_else(|| cli.project_dir.join(DEFAULT_OUTPUTS_FILE))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedView<'a> {
    stack_id: String,
    artifact_bucket_arn: String,
    configuration: &'a ResolvedConfiguration,
    origins: &'a [tapstack_core::FieldOrigin],
}

fn show_resolved(config: &ResolvedConfiguration, format: Format) -> anyhow::Result<()> {
    let view = ResolvedView {
        stack_id: config.stack_id(),
        artifact_bucket_arn: config.artifact_bucket_arn(),
        configuration: config,
        origins: config.origins(),
    };
    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(&view)?,
        Format::Yaml => serde_yaml::to_string(&view)?,
    };
    println!("{}", rendered);
    Ok(())
}
