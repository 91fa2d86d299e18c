//! Async HTTP client for license data from repository hosting APIs.
//!
//! Only GitHub exposes a license endpoint; records on other hosts keep their
//! repository URL but get no license. Failed lookups are logged and never retried.

pub mod github;

use std::collections::HashMap;

use futures::future::join_all;
use indicatif::ProgressBar;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{DependencyRecord, LicenseInfo, RepositoryIdentity};
use github::GitHubClient;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no license found for {0}")]
    NotFound(String),

    #[error("bad credentials for the GitHub API")]
    BadCredentials,

    #[error("GitHub API rate limit exceeded (set GITHUB_API_KEY to raise it)")]
    RateLimited,

    #[error("{0} has no supported license API")]
    UnsupportedHost(String),

    #[error("a GitHub API token is required")]
    MissingToken,

    #[error("unexpected HTTP status {status} for {repo}")]
    Status { status: StatusCode, repo: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

const BATCH_SIZE: usize = 25;

/// Fetch licenses for every distinct repository and attach them to `records`.
///
/// Records flagged `already_seen` are not looked up themselves; they share the
/// result of the first record that resolved to the same repository.
pub async fn enrich_licenses(
    records: &mut [DependencyRecord],
    github: &GitHubClient,
    pb: Option<&ProgressBar>,
) {
    let targets: Vec<&RepositoryIdentity> = records
        .iter()
        .filter(|r| !r.already_seen)
        .filter_map(DependencyRecord::identity)
        .collect();

    let mut found: HashMap<RepositoryIdentity, LicenseInfo> = HashMap::new();

    for batch in targets.chunks(BATCH_SIZE) {
        let results = join_all(batch.iter().map(|repo| github.fetch_license(repo))).await;

        for (repo, result) in batch.iter().zip(results) {
            match result {
                Ok(info) => {
                    found.insert((*repo).clone(), info);
                }
                Err(RegistryError::UnsupportedHost(host)) => {
                    debug!(%repo, %host, "no license API for host");
                }
                Err(e) => warn!(%repo, error = %e, "license lookup failed"),
            }
            if let Some(pb) = pb {
                pb.inc(1);
            }
        }
    }

    for record in records.iter_mut() {
        let license = record.identity().and_then(|repo| found.get(repo)).cloned();
        record.license = license;
    }
}

/// Number of license lookups [`enrich_licenses`] will issue.
pub fn lookup_count(records: &[DependencyRecord]) -> usize {
    records
        .iter()
        .filter(|r| !r.already_seen && r.identity().is_some())
        .count()
}

/// Star every distinct GitHub repository in `records`.
pub async fn star_all(records: &[DependencyRecord], github: &GitHubClient) {
    for record in records.iter().filter(|r| !r.already_seen) {
        let Some(repo) = record.identity() else {
            continue;
        };
        if repo.host != "github.com" {
            continue;
        }
        match github.star(repo).await {
            Ok(()) => debug!(%repo, "starred"),
            Err(e) => warn!(%repo, error = %e, "could not star repository"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resolution;
    use httpmock::prelude::*;
    use reqwest::Client;

    fn resolved(path: &str, repo: RepositoryIdentity) -> DependencyRecord {
        DependencyRecord::new(
            path,
            Resolution::Resolved {
                identity: repo,
                root: path.to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_enrich_fetches_once_per_repository() {
        let server = MockServer::start_async().await;
        let yaml = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/go-yaml/yaml/license");
                then.status(200).json_body(serde_json::json!({
                    "content": "YXBhY2hl",
                    "license": { "key": "apache-2.0", "name": "Apache License 2.0", "spdx_id": "Apache-2.0" }
                }));
            })
            .await;
        let missing = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/x/gone/license");
                then.status(404);
            })
            .await;

        let repo = RepositoryIdentity::new("github.com", "go-yaml", "yaml");
        let mut duplicate = resolved("gopkg.in/go-yaml/yaml.v2", repo.clone());
        duplicate.already_seen = true;
        let mut records = vec![
            resolved("github.com/go-yaml/yaml", repo),
            duplicate,
            resolved(
                "github.com/x/gone",
                RepositoryIdentity::new("github.com", "x", "gone"),
            ),
            resolved(
                "golang.org/x/net",
                RepositoryIdentity::new("go.googlesource.com", "net", ""),
            ),
            DependencyRecord::new("fmt", Resolution::Standard),
        ];

        assert_eq!(lookup_count(&records), 3);

        let gh = GitHubClient::new(Client::new(), server.base_url(), None);
        enrich_licenses(&mut records, &gh, None).await;

        yaml.assert_hits_async(1).await;
        missing.assert_hits_async(1).await;
        assert_eq!(records[0].license.as_ref().map(|l| l.key.as_str()), Some("apache-2.0"));
        assert_eq!(records[1].license, records[0].license);
        assert!(records[2].license.is_none());
        assert!(records[3].license.is_none());
        assert!(records[4].license.is_none());
    }

    #[tokio::test]
    async fn test_star_all_skips_duplicates_and_other_hosts() {
        let server = MockServer::start_async().await;
        let star = server
            .mock_async(|when, then| {
                when.method(PUT).path("/user/starred/fatih/color");
                then.status(204);
            })
            .await;

        let repo = RepositoryIdentity::new("github.com", "fatih", "color");
        let mut duplicate = resolved("gopkg.in/fatih/color.v1", repo.clone());
        duplicate.already_seen = true;
        let records = vec![
            resolved("github.com/fatih/color", repo),
            duplicate,
            resolved(
                "gitlab.com/a/b",
                RepositoryIdentity::new("gitlab.com", "a", "b"),
            ),
        ];

        let gh = GitHubClient::new(Client::new(), server.base_url(), Some("t".to_string()));
        star_all(&records, &gh).await;

        star.assert_hits_async(1).await;
    }
}
