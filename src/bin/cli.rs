use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cachesweep::command::Mode;
use cachesweep::config::Config;
use cachesweep::error::SweepError;
use cachesweep::output::OutputFormat;
use cachesweep::provider::ProviderRegistry;
use cachesweep::{RunOptions, CONFIG_FILE};

#[derive(Parser)]
#[command(
    name = "cachesweep",
    about = "Rule-driven cleaner for caches, histories and traces",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what a rules file would clean, without touching anything
    Preview {
        /// Rules file ([[rule]] tables)
        rules: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Clean everything a rules file matches
    Clean {
        /// Rules file ([[rule]] tables)
        rules: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// List all available rule actions
    ListActions {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter cachesweep.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct RunArgs {
    /// Config file path
    #[arg(long, short = 'c', env = "CACHESWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Output format (console, json)
    #[arg(long, short = 'f', default_value = "console")]
    format: String,

    /// Write output to file instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Preview { rules, run } => cmd_run(rules, run, Mode::Preview),
        Commands::Clean { rules, run } => cmd_run(rules, run, Mode::Execute),
        Commands::ListActions { format } => cmd_list_actions(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_run(rules: PathBuf, args: RunArgs, mode: Mode) -> Result<i32, SweepError> {
    let format = OutputFormat::from_str_lenient(&args.format).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", args.format);
        OutputFormat::Console
    });

    let options = RunOptions {
        config_path: args.config,
        format,
        mode,
    };

    let report = cachesweep::clean(&rules, &options)?;
    let rendered = cachesweep::render_report(&report, format)?;

    match args.output {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = every command succeeded, 1 = some failed or were skipped
    Ok(if report.failures.is_empty() && report.skipped_rules.is_empty() {
        0
    } else {
        1
    })
}

fn cmd_list_actions(format_str: String) -> Result<i32, SweepError> {
    let providers = ProviderRegistry::builtin().list();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&providers)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<18} DESCRIPTION", "ACTION");
            println!("{}", "-".repeat(72));
            for provider in &providers {
                println!("{:<18} {}", provider.id, provider.description);
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, SweepError> {
    let path = PathBuf::from(CONFIG_FILE);

    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", CONFIG_FILE);
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created {}", CONFIG_FILE);

    Ok(0)
}
