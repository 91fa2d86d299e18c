//! Vanity import discovery.
//!
//! An import path whose host is not a known forge names its repository through
//! a `<meta name="go-import" content="prefix vcs repo-url">` tag served at
//! `https://<import path>?go-get=1`. Every outcome, including failures, is kept
//! in a [`ResolutionMemo`] so each distinct path is fetched at most once per run.

use std::collections::HashMap;

use regex::Regex;
use reqwest::Client;
use tracing::debug;

use super::ResolveError;
use crate::models::RepositoryIdentity;

/// A successful `go-import` lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanityHit {
    /// Import path prefix declared by the tag (the module root).
    pub prefix: String,
    pub identity: RepositoryIdentity,
}

/// Source of the HTML document served at an import path.
pub trait MetaFetcher {
    async fn fetch(&self, import_path: &str) -> Result<String, ResolveError>;
}

/// Fetches `<base><import path>?go-get=1` with a shared [`Client`].
pub struct HttpMetaFetcher {
    client: Client,
    base: String,
}

impl HttpMetaFetcher {
    pub fn new(client: Client) -> Self {
        Self::with_base(client, "https://")
    }

    pub fn with_base(client: Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }
}

impl MetaFetcher for HttpMetaFetcher {
    async fn fetch(&self, import_path: &str) -> Result<String, ResolveError> {
        let url = format!("{}{}?go-get=1", self.base, import_path);
        debug!(%url, "fetching go-import metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ResolveError::unreachable(import_path, e.to_string()))?;

        if !response.status().is_success() {
            return Err(ResolveError::unreachable(
                import_path,
                format!("HTTP {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::unreachable(import_path, e.to_string()))
    }
}

/// Per-run cache of vanity lookups, keyed by the raw import path.
#[derive(Debug, Default)]
pub struct ResolutionMemo {
    entries: HashMap<String, Result<VanityHit, ResolveError>>,
}

impl ResolutionMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, import_path: &str) -> Option<&Result<VanityHit, ResolveError>> {
        self.entries.get(import_path)
    }

    pub fn insert(
        &mut self,
        import_path: impl Into<String>,
        outcome: Result<VanityHit, ResolveError>,
    ) {
        self.entries.insert(import_path.into(), outcome);
    }

    /// Number of distinct import paths looked up so far.
    pub fn lookups(&self) -> usize {
        self.entries.len()
    }
}

pub struct VanityResolver<F> {
    fetcher: F,
    memo: ResolutionMemo,
}

impl<F: MetaFetcher> VanityResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_memo(fetcher, ResolutionMemo::new())
    }

    pub fn with_memo(fetcher: F, memo: ResolutionMemo) -> Self {
        Self { fetcher, memo }
    }

    pub fn memo(&self) -> &ResolutionMemo {
        &self.memo
    }

    /// Resolve `import_path`, consulting the memo first. A failed lookup is
    /// memoized too and never retried within the run.
    pub async fn resolve(&mut self, import_path: &str) -> Result<VanityHit, ResolveError> {
        if let Some(outcome) = self.memo.get(import_path) {
            debug!(import_path, "go-import memo hit");
            return outcome.clone();
        }

        let outcome = match self.fetcher.fetch(import_path).await {
            Ok(html) => parse_go_import(import_path, &html),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            debug!(error = %e, "vanity resolution failed");
        }

        self.memo.insert(import_path, outcome.clone());
        outcome
    }
}

/// Extract the repository identity from the `go-import` tags of `html`.
///
/// When several tags are present the one whose prefix covers `import_path`
/// wins; otherwise the first one. Module-proxy `mod` entries are never used.
pub fn parse_go_import(import_path: &str, html: &str) -> Result<VanityHit, ResolveError> {
    let contents = go_import_contents(html)
        .map_err(|e| ResolveError::unreachable(import_path, e.to_string()))?;

    if contents.is_empty() {
        return Err(ResolveError::unreachable(import_path, "no go-import meta tag"));
    }

    // `mod` entries point at a module proxy, not a repository.
    let candidates: Vec<&String> = contents
        .iter()
        .filter(|content| content.split_whitespace().nth(1) != Some("mod"))
        .collect();
    let chosen = candidates
        .iter()
        .find(|content| {
            let fields: Vec<&str> = content.split_whitespace().collect();
            fields.len() == 3 && covers(fields[0], import_path)
        })
        .or_else(|| candidates.first())
        .ok_or_else(|| {
            ResolveError::unreachable(import_path, "only module proxy go-import tags")
        })?;

    let fields: Vec<&str> = chosen.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(ResolveError::unreachable(
            import_path,
            format!("malformed go-import content `{}`", chosen),
        ));
    }

    let identity = identity_from_repo_url(fields[2], fields[1]).ok_or_else(|| {
        ResolveError::unreachable(import_path, format!("unusable repo URL `{}`", fields[2]))
    })?;

    Ok(VanityHit {
        prefix: fields[0].to_string(),
        identity,
    })
}

/// `content` values of every `<meta name="go-import">` tag, in document order.
fn go_import_contents(html: &str) -> Result<Vec<String>, regex::Error> {
    let meta_re = Regex::new(r"(?is)<meta\s[^>]*>")?;
    let attr_re = Regex::new(r#"(?i)([a-z-]+)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?;

    let mut contents = Vec::new();
    for tag in meta_re.find_iter(html) {
        let mut name = None;
        let mut content = None;
        for caps in attr_re.captures_iter(tag.as_str()) {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().trim().to_string());
            match caps[1].to_ascii_lowercase().as_str() {
                "name" => name = value,
                "content" => content = value,
                _ => {}
            }
        }
        if let (Some(name), Some(content)) = (name, content) {
            if name.eq_ignore_ascii_case("go-import") {
                contents.push(content);
            }
        }
    }
    Ok(contents)
}

fn covers(prefix: &str, import_path: &str) -> bool {
    import_path == prefix
        || import_path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// `scheme://host/author[/project]` → identity. Index 2 is the host, 3 the
/// author, 4 (optional) the project. A present-but-empty field is rejected.
fn identity_from_repo_url(url: &str, vcs: &str) -> Option<RepositoryIdentity> {
    let parts: Vec<&str> = url.split('/').collect();
    let (host, author, project) = match parts.as_slice() {
        [_, _, host, author] => (*host, strip_vcs_suffix(author, vcs), ""),
        [_, _, host, author, project, ..] => {
            if project.is_empty() {
                return None;
            }
            (*host, *author, strip_vcs_suffix(project, vcs))
        }
        _ => return None,
    };

    if host.is_empty() || author.is_empty() || (parts.len() > 4 && project.is_empty()) {
        return None;
    }

    Some(RepositoryIdentity::new(host, author, project))
}

fn strip_vcs_suffix<'a>(name: &'a str, vcs: &str) -> &'a str {
    name.strip_suffix(".git")
        .or_else(|| name.strip_suffix(format!(".{}", vcs).as_str()))
        .unwrap_or(name)
}
