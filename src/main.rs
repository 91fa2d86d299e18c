//! `golicense-checkr` — resolve Go module dependencies to their source
//! repositories and report the license of each one.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Locate the module root ([`detector::find_module_root`]) and load config
//!    ([`config::load_config`]).
//! 3. Collect raw import paths from `go.mod` or `go list` ([`source`]).
//! 4. Resolve and deduplicate them into dependency records ([`resolve`]).
//! 5. Fetch licenses from GitHub, optionally star the repositories ([`registry`]).
//! 6. Render the requested report ([`report`]) and optionally write license
//!    texts to disk ([`license::writer`]).

mod cli;
mod config;
mod detector;
mod license;
mod models;
mod registry;
mod report;
mod resolve;
mod source;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputFormat};
use config::load_config;
use detector::find_module_root;
use registry::github::GitHubClient;
use resolve::aggregator::{AggregateOptions, Aggregator};
use resolve::vanity::{HttpMetaFetcher, VanityResolver};
use source::golist::GoListSource;
use source::gomod::{read_go_mod, GoModSource};
use source::ImportSource;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let root = find_module_root(&path)
        .with_context(|| format!("no go.mod file present in {} or its parents", path.display()))?;

    let config = load_config(&root, cli.config.as_deref())?;

    let token = cli.gh_token.clone().filter(|t| !t.is_empty());
    if cli.thanks && token.is_none() {
        bail!("cannot use --thanks without a GitHub API token (--gh-token or GITHUB_API_KEY)");
    }

    // Collect raw import paths
    let go_mod = read_go_mod(&root)?;
    let raw = if cli.imports {
        GoListSource::new(cli.ignore_dirs.clone()).imports(&root, cli.indirect)?
    } else {
        if !cli.ignore_dirs.is_empty() {
            warn!("--ignore-dirs only applies to --imports scans; ignoring it");
        }
        GoModSource::new().imports(&root, cli.indirect)?
    };

    if !cli.quiet {
        eprintln!(
            "  {} {} {} import paths",
            "→".cyan(),
            go_mod.module.as_deref().unwrap_or("(unnamed module)"),
            raw.len()
        );
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .user_agent(config.http.user_agent.as_str())
        .build()?;

    // Resolve and deduplicate
    let hosts = config.resolve.host_table();
    let options = AggregateOptions {
        verbose: cli.verbose,
        include_std: cli.stdlib,
        scan_root: go_mod.module.clone(),
        ignore: config.resolve.ignore.clone(),
    };
    let resolver = VanityResolver::new(HttpMetaFetcher::new(client.clone()));
    let mut records = Aggregator::new(&hosts, resolver, options)
        .aggregate(&raw)
        .await;

    if !cli.quiet {
        eprintln!("  {} {} dependencies", "→".cyan(), records.len());
    }

    // License lookup
    let github = GitHubClient::new(client, config.http.github_api.as_str(), token);

    if !cli.offline {
        let pb = if !cli.quiet {
            let pb = ProgressBar::new(registry::lookup_count(&records) as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )?
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        registry::enrich_licenses(&mut records, &github, pb.as_ref()).await;

        if let Some(pb) = pb {
            pb.finish_with_message("Done");
        }
    }

    if cli.thanks {
        registry::star_all(&records, &github).await;
    }

    // Render report
    let rows = report::rows(&records);
    match cli.format {
        OutputFormat::Table => report::terminal::render(&rows, &root, cli.count, cli.quiet)?,
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => report::csv::render(&rows, std::io::stdout().lock(), cli.count)?,
    }

    if cli.write_licenses {
        let dir = root.join("licenses");
        let written = license::writer::write_licenses(&records, &dir)?;
        if !cli.quiet {
            eprintln!(
                "  {} wrote {} license files to {}",
                "→".cyan(),
                written.len(),
                dir.display()
            );
        }
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
