use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use core_logging::{LoggingPlugin, init_subscriber};
use keel_core::{Kernel, KernelConfig, KernelError};
use log::{debug, error};

mod cli;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect Keel manager manifests", long_about = None)]
struct CliArgs {
    /// Simple ping test
    #[arg(long)]
    ping: bool,

    /// Log filter, overrides `logging.level` from the manifest
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print machine readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the order in which eager managers initialize
    Order { manifest: PathBuf },
    /// Check the manifest for missing dependencies and cycles
    Validate { manifest: PathBuf },
    /// Print the manager dependency graph in Graphviz format
    Graph { manifest: PathBuf },
}

impl Commands {
    fn manifest(&self) -> &Path {
        match self {
            Commands::Order { manifest } | Commands::Validate { manifest } | Commands::Graph { manifest } => manifest.as_path(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    let Some(command) = &args.command else {
        // Nothing to do without a subcommand
        let _ = CliArgs::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(command, &args).await {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: &Commands, args: &CliArgs) -> Result<ExitCode, KernelError> {
    let mut config = KernelConfig::load(command.manifest())?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    init_subscriber(&config.logging.level, config.logging.json)?;
    config.validate()?;

    let mut kernel = Kernel::with_config(config);
    kernel.use_plugin(Arc::new(LoggingPlugin)).await?;

    let registry = cli::build_registry(&kernel.config().managers);
    debug!("Loaded {} managers from {}", registry.len(), command.manifest().display());

    let code = match command {
        Commands::Order { .. } => match registry.get_initialization_order() {
            Ok(order) => {
                if args.json {
                    println!("{}", serde_json::json!({ "order": order }));
                } else {
                    print!("{}", cli::render_order(&registry, &order));
                }
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        },
        Commands::Validate { .. } => {
            let report = registry.validate_dependency_graph();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
            } else {
                print!("{}", cli::render_report(&report));
            }
            if report.valid { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Commands::Graph { .. } => {
            print!("{}", registry.generate_dependency_graph());
            ExitCode::SUCCESS
        }
    };

    kernel.shutdown().await?;
    Ok(code)
}
