use std::path::{Path, PathBuf};
use std::process;

use binpatch_core::config::{CONFIG_FILENAME, Layout, ProjectConfig};
use binpatch_core::patch::{ApplyReport, CreateReport, PatchState};
use binpatch_core::vcs::InitOutcome;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "binpatch")]
#[command(about = "Keep an extracted binary tree in sync with a directory of patches")]
#[command(version)]
struct Cli {
    /// Project root that configured paths are resolved against
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Configuration file (defaults to <root>/binpatch.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reverse previously applied patches, then apply the current set
    Apply {
        /// Tree to patch (defaults to the configured bin dir)
        #[arg(long)]
        target: Option<PathBuf>,
    },
    /// Reverse previously applied patches and forget them
    Rollback {
        /// Tree to restore (defaults to the configured bin dir)
        #[arg(long)]
        target: Option<PathBuf>,
    },
    /// Write a patch for every locally modified file in the tree
    Create {
        /// Git-initialized tree (defaults to the configured bin dir)
        #[arg(long)]
        target: Option<PathBuf>,
    },
    /// Snapshot the pristine tree into a git repository
    Init {
        /// Tree to initialize (defaults to the configured bin dir)
        #[arg(long)]
        target: Option<PathBuf>,
    },
    /// Compare the patch directory against what was last applied
    Status,
    /// Apply patches, then run the configured dev processes until Ctrl-C
    Run {
        /// Tree to patch (defaults to the configured bin dir)
        #[arg(long)]
        target: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn target_or_default(target: Option<PathBuf>, layout: &Layout) -> PathBuf {
    target.unwrap_or_else(|| layout.bin_dir.clone())
}

fn print_apply(report: &ApplyReport) {
    if !report.reversed.is_empty() {
        println!("Reversed {} patch(es)", report.reversed.len());
    }
    println!("Applied {} patch(es)", report.applied.len());
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .unwrap_or_else(|| cli.root.join(CONFIG_FILENAME))
}

fn load_config(path: &Path) -> ProjectConfig {
    match ProjectConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = config_path(&cli);
    let config = load_config(&config_path);
    let layout = config.layout(&cli.root);

    match cli.command {
        Commands::Apply { target } => {
            let target = target_or_default(target, &layout);
            match binpatch::commands::patch_apply::run(&layout, &target) {
                Ok(report) => print_apply(&report),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            }
        }
        Commands::Rollback { target } => {
            let target = target_or_default(target, &layout);
            match binpatch::commands::patch_rollback::run(&layout, &target) {
                Ok(reversed) => {
                    println!("Rollback complete ({} patch(es) reversed)", reversed.len());
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            }
        }
        Commands::Create { target } => {
            let target = target_or_default(target, &layout);
            match binpatch::commands::patch_create::run(&layout, &target) {
                Ok(CreateReport::NoChanges) => {
                    println!("No changes detected");
                }
                Ok(CreateReport::Written { written, failures }) => {
                    for path in &written {
                        println!("Wrote {}", path.display());
                    }
                    if !failures.is_empty() {
                        for failure in &failures {
                            eprintln!("Skipped {}", failure);
                        }
                        process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            }
        }
        Commands::Init { target } => {
            let target = target_or_default(target, &layout);
            match binpatch::commands::init::run(&config, &config_path, &target) {
                Ok(report) => {
                    match report.outcome {
                        InitOutcome::Created => println!("Initialized {}", target.display()),
                        InitOutcome::AlreadyInitialized => {
                            println!("{} is already initialized", target.display())
                        }
                    }
                    if let Some(path) = report.config_written {
                        println!("Config written to {}", path.display());
                    }
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            }
        }
        Commands::Status => match binpatch::commands::status::run(&layout) {
            Ok(report) => {
                if !report.snapshot_present {
                    println!("No patches applied yet");
                }
                for entry in &report.entries {
                    println!("{:<9} {}", entry.state, entry.name);
                }
                if !report.is_clean() {
                    println!(
                        "{} pending, {} stale, {} orphaned",
                        report.count(PatchState::Pending),
                        report.count(PatchState::Stale),
                        report.count(PatchState::Orphaned)
                    );
                    process::exit(1);
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(2);
            }
        },
        Commands::Run { target } => {
            let target = target_or_default(target, &layout);
            match binpatch::commands::run::run(&config, &layout, &target).await {
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(2);
                }
            }
        }
    }
}
