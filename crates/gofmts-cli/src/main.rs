mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gofmts")]
#[command(about = "Format embedded content and sort groups in Go source", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to gofmts config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite Go files, or standard input when no file is given
    Format {
        /// Files or directories to format
        files: Vec<PathBuf>,

        /// Write the result back to the source files instead of stdout
        #[arg(short, long)]
        write: bool,

        /// Exit with status 1 when any file was changed
        #[arg(long)]
        set_exit_status: bool,
    },

    /// Report issues without changing anything
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout may carry formatted source, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Format {
            files,
            write,
            set_exit_status,
        } => {
            commands::format::run(cli.config, files, write, set_exit_status).await?;
        }
        Commands::Check { paths, format } => {
            commands::check::run(cli.config, paths, format).await?;
        }
    }

    Ok(())
}
