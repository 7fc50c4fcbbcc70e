//! draftpress CLI — the main entry point.
//!
//! Commands:
//! - `generate`  — Expand one draft into a post in the output directory
//! - `providers` — Show supported providers and which one is active
//! - `check`     — Validate posts against the site's frontmatter schema
//!
//! Logs go to stderr; stdout carries only command output.

use clap::{Parser, Subcommand, ValueEnum};
use draftpress_config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

#[derive(Parser)]
#[command(
    name = "draftpress",
    about = "draftpress — expand raw drafts into frontmatter-tagged blog posts",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Settings file (defaults to ./draftpress.toml when present)
    #[arg(long, global = true, env = "DRAFTPRESS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a post from a draft
    Generate(commands::generate::GenerateArgs),

    /// List providers, their environment variables, and the active one
    Providers,

    /// Validate every post in a directory against the frontmatter schema
    Check {
        /// Directory to check (defaults to the configured output directory)
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> draftpress_core::Result<ExitCode> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, &config).await,
        Commands::Providers => Ok(commands::providers::run(&config)),
        Commands::Check { dir } => {
            let dir = dir.unwrap_or_else(|| config.paths.output_dir.clone());
            commands::check::run(&dir)
        }
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "draftpress",
            "generate",
            "--draft",
            "drafts/final.md",
            "--provider",
            "gemini",
            "--dry-run",
            "--json",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.log_format, LogFormat::Text);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.draft, PathBuf::from("drafts/final.md"));
                assert_eq!(args.provider.as_deref(), Some("gemini"));
                assert!(args.dry_run);
                assert!(args.json);
                assert!(args.profile.is_none());
                assert!(args.outdir.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn generate_requires_draft() {
        assert!(Cli::try_parse_from(["draftpress", "generate"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "draftpress",
            "check",
            "posts",
            "--log-format",
            "json",
            "--config",
            "site/draftpress.toml",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("site/draftpress.toml")));
        assert!(matches!(cli.command, Commands::Check { dir: Some(_) }));
    }

    #[test]
    fn unknown_log_format_rejected() {
        assert!(Cli::try_parse_from(["draftpress", "providers", "--log-format", "xml"]).is_err());
    }
}
