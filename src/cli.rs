use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "golicense-checkr",
    about = "Resolve Go module dependencies to their repositories and report their licenses",
    version
)]
pub struct Cli {
    /// Path inside the Go module to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Scan package imports via `go list` instead of go.mod requirements
    #[arg(long)]
    pub imports: bool,

    /// Comma separated project folders whose packages are not scanned (with --imports)
    #[arg(short = 'i', long, value_delimiter = ',', value_name = "DIR")]
    pub ignore_dirs: Vec<String>,

    /// Include indirect requirements (with --imports: all transitive imports)
    #[arg(long)]
    pub indirect: bool,

    /// Keep standard-library imports in the report
    #[arg(long)]
    pub stdlib: bool,

    /// Keep full import paths instead of collapsing them to their module root
    #[arg(short, long)]
    pub verbose: bool,

    /// Show how many times each dependency is imported
    #[arg(short, long)]
    pub count: bool,

    /// Output format
    #[arg(long, default_value = "table", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Skip license lookups
    #[arg(long)]
    pub offline: bool,

    /// Write license texts to <module root>/licenses
    #[arg(short = 'f', long)]
    pub write_licenses: bool,

    /// Star every dependency's GitHub repository (requires a token)
    #[arg(short, long)]
    pub thanks: bool,

    /// GitHub API token; raises the rate limit from 60 to 5000 requests per hour
    #[arg(long = "gh-token", env = "GITHUB_API_KEY", hide_env_values = true)]
    pub gh_token: Option<String>,

    /// Config file [default: ./.golicense-checkr/config.toml, fallback ~/.config/golicense-checkr/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only print the summary line (table format)
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}
