use std::collections::HashMap;

use super::ResolveError;
use crate::config::ResolveConfig;
use crate::models::RepositoryIdentity;

/// Hosting domains the classifier recognises without any network access.
#[derive(Debug, Clone)]
pub struct HostTable {
    direct: Vec<String>,
    /// Short-alias domain → canonical host it redirects to.
    aliases: HashMap<String, String>,
}

impl HostTable {
    pub fn new(direct: Vec<String>, aliases: HashMap<String, String>) -> Self {
        Self { direct, aliases }
    }

    fn is_direct(&self, host: &str) -> bool {
        self.direct.iter().any(|h| h == host)
    }

    fn alias_target(&self, host: &str) -> Option<&str> {
        self.aliases.get(host).map(String::as_str)
    }
}

impl Default for HostTable {
    /// `github.com`, `gitlab.com`, `bitbucket.org`; `gopkg.in` → `github.com`.
    fn default() -> Self {
        ResolveConfig::default().host_table()
    }
}

/// Which strategy an import path is resolved with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Direct host or short alias: the identity is known from the path alone.
    Known {
        identity: RepositoryIdentity,
        root: String,
    },
    /// Standard-library path (no `.` in the first segment).
    Standard,
    /// Must be discovered through the `go-import` meta tag.
    Vanity,
}

/// Route a raw import path to its resolution strategy. Performs no I/O.
pub fn classify(path: &str, hosts: &HostTable) -> Result<Route, ResolveError> {
    let segments: Vec<&str> = path.split('/').collect();
    let first = segments[0];

    if first.is_empty() {
        return Err(ResolveError::Malformed(path.to_string()));
    }

    if hosts.is_direct(first) {
        let [host, author, project] = repo_segments(path, &segments)?;
        return Ok(Route::Known {
            identity: RepositoryIdentity::new(host, author, project),
            root: segments[..3].join("/"),
        });
    }

    if let Some(target) = hosts.alias_target(first) {
        let [_, author, versioned] = repo_segments(path, &segments)?;
        // gopkg.in/user/pkg.v3 → github.com/user/pkg
        let project = versioned.split('.').next().unwrap_or(versioned);
        if project.is_empty() {
            return Err(ResolveError::Malformed(path.to_string()));
        }
        return Ok(Route::Known {
            identity: RepositoryIdentity::new(target, author, project),
            root: segments[..3].join("/"),
        });
    }

    if !first.contains('.') {
        return Ok(Route::Standard);
    }

    Ok(Route::Vanity)
}

/// First three segments, each required to be non-empty.
fn repo_segments<'a>(path: &str, segments: &[&'a str]) -> Result<[&'a str; 3], ResolveError> {
    match segments {
        [host, author, project, ..] if !author.is_empty() && !project.is_empty() => {
            Ok([*host, *author, *project])
        }
        _ => Err(ResolveError::Malformed(path.to_string())),
    }
}
