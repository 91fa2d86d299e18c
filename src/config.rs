use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::resolve::classifier::HostTable;

/// Root configuration structure, deserialized from `.golicense-checkr/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// How import paths are mapped to repositories.
#[derive(Debug, Deserialize)]
pub struct ResolveConfig {
    /// Hosts whose import paths are `host/author/project[/...]`.
    #[serde(default = "default_direct_hosts")]
    pub direct_hosts: Vec<String>,
    /// Short-alias host → canonical host (e.g. `gopkg.in` → `github.com`).
    #[serde(default = "default_aliases")]
    pub aliases: HashMap<String, String>,
    /// Import path prefixes that are never reported.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            direct_hosts: default_direct_hosts(),
            aliases: default_aliases(),
            ignore: Vec::new(),
        }
    }
}

impl ResolveConfig {
    pub fn host_table(&self) -> HostTable {
        HostTable::new(self.direct_hosts.clone(), self.aliases.clone())
    }
}

fn default_direct_hosts() -> Vec<String> {
    vec![
        "github.com".to_string(),
        "gitlab.com".to_string(),
        "bitbucket.org".to_string(),
    ]
}

fn default_aliases() -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    aliases.insert("gopkg.in".to_string(), "github.com".to_string());
    aliases
}

/// Outbound HTTP settings shared by vanity lookups and the GitHub client.
#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. Bounds every vanity fetch and license lookup.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_github_api")]
    pub github_api: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            github_api: default_github_api(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("golicense-checkr/{}", env!("CARGO_PKG_VERSION"))
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<module_root>/.golicense-checkr/config.toml`
/// 3. `~/.config/golicense-checkr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(module_root: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = module_root.join(".golicense-checkr").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("golicense-checkr")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))
}
