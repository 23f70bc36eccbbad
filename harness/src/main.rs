//! # Common Tests Operator CLI
//!
//! File: harness/src/main.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A small companion binary for the people wiring a subject into the shared
//! tests. It answers the questions that come up before the first green run:
//! which nerdctl dialect does my subject speak, can the environment be swept,
//! does the local registry choreography work here?
//!
//! ## Commands
//!
//! - **`version`**: Print the nerdctl version reported by the subject and the dialect it maps to.
//! - **`clean`**: Remove all containers, images, volumes and custom networks, keeping a running local registry.
//! - **`registry-check`**: Start the local registry, print the image mapping, and remove it again.
//!
//! `--subject "<words>"` overrides the configured subject; `-v` raises the log
//! level (warn, info, debug, trace).
//!
use clap::{Parser, Subcommand};
use common_tests::common::subject::{remove_all, LocalRegistry};
use common_tests::core::config::{self, SuiteConfig};
use common_tests::core::logging::level_for_verbosity;
use common_tests::option::nerdctl;
use common_tests::HarnessError;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "common-tests",
    about = "Operator tools for the shared container CLI end-to-end tests",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Subject to drive, e.g. "limactl shell finch nerdctl". Overrides configuration.
    #[arg(short, long, global = true)]
    subject: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the subject's nerdctl version and dialect.
    Version,
    /// Sweep all test resources from the subject, except a running local registry.
    Clean,
    /// Set up and tear down the local registry once.
    RegistryCheck,
}

fn resolve_config(subject: Option<&str>) -> anyhow::Result<SuiteConfig> {
    let mut cfg = config::load_suite_config()?;
    if let Some(subject) = subject {
        cfg.subject = subject.split_whitespace().map(str::to_string).collect();
        cfg.validate()?;
    }
    Ok(cfg)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = resolve_config(cli.subject.as_deref())?;
    let o = cfg.to_option()?;

    match cli.command {
        Commands::Version => {
            let version = o.get_nerdctl_version()?;
            let trimmed = version.trim_start_matches('v');
            let dialect = if nerdctl::is_nerdctl_1xx(trimmed) {
                nerdctl::NERDCTL_1XX
            } else if nerdctl::is_nerdctl_2xx(trimmed) {
                nerdctl::NERDCTL_2XX
            } else {
                "unknown"
            };
            println!("nerdctl {version} ({dialect})");
        }
        Commands::Clean => {
            let retained = LocalRegistry::running(&o, &cfg.registry).unwrap_or_default();
            if let Some(id) = &retained.container_id {
                println!("Keeping local registry container {id}");
            }
            remove_all(&o, &retained);
            println!("Environment swept");
        }
        Commands::RegistryCheck => {
            if !cfg.local_registry {
                return Err(HarnessError::Config(format!(
                    "local registry is disabled ({} or [local_registry] enabled = false)",
                    config::ENV_LOCAL_REGISTRY
                ))
                .into());
            }
            let registry = LocalRegistry::setup(&o, &cfg.images, &cfg.registry);
            println!("Local registry on port {}", registry.host_port());
            for (image, reference) in registry.images() {
                println!("{image:>14} -> {reference}");
            }
            registry.cleanup(&o);
            println!("Local registry removed");
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(cli.verbose)));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli) {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["common-tests", "clean", "-vv", "--subject", "nerdctl"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Clean));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.subject.as_deref(), Some("nerdctl"));
    }
}
