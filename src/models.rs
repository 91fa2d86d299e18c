use serde::{Deserialize, Serialize};

use crate::resolve::ResolveError;

/// A distinct source repository.
///
/// Equality is field-wise on `(host, author, project)`; the URL is derived
/// from those fields and is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub host: String,
    pub author: String,
    /// Empty when the repository path has a single segment
    /// (e.g. `https://go.googlesource.com/net`).
    pub project: String,
}

impl RepositoryIdentity {
    pub fn new(
        host: impl Into<String>,
        author: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            author: author.into(),
            project: project.into(),
        }
    }

    pub fn canonical_url(&self) -> String {
        if self.project.is_empty() {
            format!("https://{}/{}", self.host, self.author)
        } else {
            format!("https://{}/{}/{}", self.host, self.author, self.project)
        }
    }
}

impl std::fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.project.is_empty() {
            write!(f, "{}/{}", self.host, self.author)
        } else {
            write!(f, "{}/{}/{}", self.host, self.author, self.project)
        }
    }
}

/// Outcome of resolving one raw import path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `root` is the module root path the import was normalized to.
    Resolved {
        identity: RepositoryIdentity,
        root: String,
    },
    /// Standard-library import; there is no repository to look up.
    Standard,
    Unresolved(ResolveError),
}

impl Resolution {
    pub fn identity(&self) -> Option<&RepositoryIdentity> {
        match self {
            Resolution::Resolved { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn root(&self) -> Option<&str> {
        match self {
            Resolution::Resolved { root, .. } => Some(root),
            _ => None,
        }
    }
}

/// One distinct (normalized) import path observed during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRecord {
    pub import_path: String,
    pub occurrence_count: usize,
    pub resolution: Resolution,
    /// Set when an earlier record already resolved to the same repository.
    /// Downstream code skips the license fetch and the license file for it.
    pub already_seen: bool,
    pub license: Option<LicenseInfo>,
}

impl DependencyRecord {
    pub fn new(import_path: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            import_path: import_path.into(),
            occurrence_count: 1,
            resolution,
            already_seen: false,
            license: None,
        }
    }

    pub fn identity(&self) -> Option<&RepositoryIdentity> {
        self.resolution.identity()
    }

    pub fn repo_url(&self) -> Option<String> {
        self.identity().map(RepositoryIdentity::canonical_url)
    }
}

/// License metadata reported by the hosting provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    /// Provider license key, e.g. `mit` or `apache-2.0`.
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
    /// Base64-encoded license body, as returned by the API.
    #[serde(skip)]
    pub text: Option<String>,
}
