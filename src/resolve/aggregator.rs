use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::classifier::{classify, HostTable, Route};
use super::vanity::{MetaFetcher, VanityResolver};
use crate::models::{DependencyRecord, RepositoryIdentity, Resolution};

/// Knobs that change how raw import paths are folded.
#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
    /// Keep full import paths instead of truncating them to their module root.
    pub verbose: bool,
    /// Keep standard-library imports as records.
    pub include_std: bool,
    /// Module path of the scanned project; it and its packages are skipped.
    pub scan_root: Option<String>,
    /// Import path prefixes to drop before resolution.
    pub ignore: Vec<String>,
}

/// Folds raw import paths into distinct [`DependencyRecord`]s in first-seen order.
pub struct Aggregator<'a, F> {
    hosts: &'a HostTable,
    resolver: VanityResolver<F>,
    options: AggregateOptions,
    records: Vec<DependencyRecord>,
    by_path: HashMap<String, usize>,
    identities: HashSet<RepositoryIdentity>,
}

impl<'a, F: MetaFetcher> Aggregator<'a, F> {
    pub fn new(
        hosts: &'a HostTable,
        resolver: VanityResolver<F>,
        options: AggregateOptions,
    ) -> Self {
        Self {
            hosts,
            resolver,
            options,
            records: Vec::new(),
            by_path: HashMap::new(),
            identities: HashSet::new(),
        }
    }

    /// Fold a whole sequence of raw import paths, in order.
    pub async fn aggregate<I, S>(mut self, raw_paths: I) -> Vec<DependencyRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in raw_paths {
            self.observe(raw.as_ref()).await;
        }
        self.finish()
    }

    /// Fold one raw import path into the record set.
    pub async fn observe(&mut self, raw: &str) {
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }

        let path = strip_vendor_prefix(raw);
        if self.is_skipped(path) {
            trace!(path, "skipping import");
            return;
        }

        if self.options.verbose && self.bump(path) {
            return;
        }

        let resolution = self.resolve(path).await;
        if resolution == Resolution::Standard && !self.options.include_std {
            return;
        }

        let normalized = match resolution.root() {
            Some(root) if !self.options.verbose => root.to_string(),
            _ => path.to_string(),
        };

        if self.is_self_reference(&normalized) || self.bump(&normalized) {
            return;
        }

        let already_seen = resolution
            .identity()
            .is_some_and(|identity| !self.identities.insert(identity.clone()));
        if already_seen {
            debug!(import_path = %normalized, "repository already seen under another path");
        }

        let mut record = DependencyRecord::new(normalized.clone(), resolution);
        record.already_seen = already_seen;

        self.by_path.insert(normalized, self.records.len());
        self.records.push(record);
    }

    pub fn finish(self) -> Vec<DependencyRecord> {
        debug!(
            records = self.records.len(),
            vanity_lookups = self.resolver.memo().lookups(),
            "aggregation finished"
        );
        self.records
    }

    /// Increment the count of an existing record; false when none exists.
    fn bump(&mut self, import_path: &str) -> bool {
        match self.by_path.get(import_path) {
            Some(&idx) => {
                self.records[idx].occurrence_count += 1;
                true
            }
            None => false,
        }
    }

    async fn resolve(&mut self, path: &str) -> Resolution {
        match classify(path, self.hosts) {
            Ok(Route::Known { identity, root }) => Resolution::Resolved { identity, root },
            Ok(Route::Standard) => Resolution::Standard,
            Ok(Route::Vanity) => match self.resolver.resolve(path).await {
                Ok(hit) => {
                    // The declared prefix is the module root when it covers the path.
                    let root = if is_within(path, &hit.prefix) {
                        hit.prefix
                    } else {
                        path.to_string()
                    };
                    Resolution::Resolved {
                        identity: hit.identity,
                        root,
                    }
                }
                Err(e) => Resolution::Unresolved(e),
            },
            Err(e) => {
                debug!(error = %e, "import path not classifiable");
                Resolution::Unresolved(e)
            }
        }
    }

    fn is_skipped(&self, path: &str) -> bool {
        self.is_self_reference(path)
            || self
                .options
                .ignore
                .iter()
                .map(|prefix| prefix.trim_end_matches('/'))
                .any(|prefix| !prefix.is_empty() && is_within(path, prefix))
    }

    fn is_self_reference(&self, path: &str) -> bool {
        match &self.options.scan_root {
            Some(root) => is_within(path, root),
            None => false,
        }
    }
}

/// `proj/vendor/github.com/a/b` → `github.com/a/b` (innermost vendor directory wins).
pub fn strip_vendor_prefix(path: &str) -> &str {
    let mut rest = path;
    while let Some(idx) = rest.find("vendor/") {
        let at_segment_start = idx == 0 || rest.as_bytes()[idx - 1] == b'/';
        let suffix = &rest[idx + "vendor/".len()..];
        if at_segment_start && !suffix.is_empty() {
            return strip_vendor_prefix(suffix);
        }
        rest = suffix;
    }
    path
}

fn is_within(path: &str, root: &str) -> bool {
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::vanity::tests::{go_import_page, StubFetcher};
    use crate::resolve::vanity::ResolutionMemo;
    use crate::resolve::ResolveError;

    fn stub_pages() -> StubFetcher {
        let net = go_import_page("golang.org/x/net git https://go.googlesource.com/net");
        let zap = go_import_page("go.uber.org/zap git https://github.com/uber-go/zap");
        StubFetcher::new(&[
            ("golang.org/x/net/context/ctxhttp", net.as_str()),
            ("golang.org/x/net/http2", net.as_str()),
            ("go.uber.org/zap/zapcore", zap.as_str()),
        ])
    }

    async fn run(raw: &[&str], options: AggregateOptions) -> Vec<DependencyRecord> {
        let hosts = HostTable::default();
        let aggregator = Aggregator::new(&hosts, VanityResolver::new(stub_pages()), options);
        aggregator.aggregate(raw.iter().copied()).await
    }

    fn paths(records: &[DependencyRecord]) -> Vec<&str> {
        records.iter().map(|r| r.import_path.as_str()).collect()
    }

    #[tokio::test]
    async fn test_counts_repeated_imports() {
        let records = run(
            &[
                "github.com/fatih/color",
                "github.com/pkg/errors",
                "github.com/fatih/color",
                "github.com/fatih/color",
            ],
            AggregateOptions::default(),
        )
        .await;

        assert_eq!(paths(&records), vec!["github.com/fatih/color", "github.com/pkg/errors"]);
        assert_eq!(records[0].occurrence_count, 3);
        assert_eq!(records[1].occurrence_count, 1);
    }

    #[tokio::test]
    async fn test_subpackages_collapse_to_repo_root() {
        let records = run(
            &["github.com/gorilla/mux", "github.com/gorilla/mux/internal/x"],
            AggregateOptions::default(),
        )
        .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occurrence_count, 2);
        assert_eq!(
            records[0].repo_url().as_deref(),
            Some("https://github.com/gorilla/mux")
        );
    }

    #[tokio::test]
    async fn test_verbose_keeps_full_paths_and_marks_duplicates() {
        let options = AggregateOptions {
            verbose: true,
            ..Default::default()
        };
        let records = run(
            &["github.com/gorilla/mux", "github.com/gorilla/mux/internal/x"],
            options,
        )
        .await;

        assert_eq!(
            paths(&records),
            vec!["github.com/gorilla/mux", "github.com/gorilla/mux/internal/x"]
        );
        assert!(!records[0].already_seen);
        assert!(records[1].already_seen);
    }

    #[tokio::test]
    async fn test_alias_and_direct_same_repo_marked_seen() {
        let records = run(
            &["github.com/go-yaml/yaml", "gopkg.in/go-yaml/yaml.v2"],
            AggregateOptions::default(),
        )
        .await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity(), records[1].identity());
        assert!(!records[0].already_seen);
        assert!(records[1].already_seen);
    }

    #[tokio::test]
    async fn test_vanity_normalizes_to_declared_prefix() {
        let records = run(
            &["go.uber.org/zap/zapcore", "golang.org/x/net/context/ctxhttp"],
            AggregateOptions::default(),
        )
        .await;

        assert_eq!(paths(&records), vec!["go.uber.org/zap", "golang.org/x/net"]);
        assert_eq!(
            records[1].repo_url().as_deref(),
            Some("https://go.googlesource.com/net")
        );
    }

    #[tokio::test]
    async fn test_vanity_fetch_once_per_raw_path() {
        let hosts = HostTable::default();
        let mut aggregator = Aggregator::new(
            &hosts,
            VanityResolver::new(stub_pages()),
            AggregateOptions::default(),
        );
        for raw in [
            "golang.org/x/net/http2",
            "golang.org/x/net/http2",
            "golang.org/x/net/context/ctxhttp",
        ] {
            aggregator.observe(raw).await;
        }

        assert_eq!(aggregator.resolver.memo().lookups(), 2);
        let records = aggregator.finish();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].occurrence_count, 3);
    }

    #[tokio::test]
    async fn test_unresolved_vanity_is_kept_without_identity() {
        let records = run(&["example.org/unknown/pkg"], AggregateOptions::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].import_path, "example.org/unknown/pkg");
        assert!(matches!(
            records[0].resolution,
            Resolution::Unresolved(ResolveError::Unreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_is_kept_without_identity() {
        let records = run(&["github.com/ribice"], AggregateOptions::default()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].resolution,
            Resolution::Unresolved(ResolveError::Malformed("github.com/ribice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_vendor_prefix_normalizes_like_bare_path() {
        let records = run(
            &["proj/vendor/github.com/a/b", "github.com/a/b"],
            AggregateOptions::default(),
        )
        .await;

        assert_eq!(paths(&records), vec!["github.com/a/b"]);
        assert_eq!(records[0].occurrence_count, 2);
    }

    #[test]
    fn test_strip_vendor_prefix() {
        assert_eq!(strip_vendor_prefix("proj/vendor/github.com/a/b"), "github.com/a/b");
        assert_eq!(strip_vendor_prefix("vendor/github.com/a/b"), "github.com/a/b");
        assert_eq!(
            strip_vendor_prefix("a/vendor/b.org/x/vendor/c.org/y/z"),
            "c.org/y/z"
        );
        assert_eq!(strip_vendor_prefix("github.com/myvendor/x"), "github.com/myvendor/x");
        assert_eq!(strip_vendor_prefix("github.com/a/vendor/"), "github.com/a/vendor/");
    }

    #[tokio::test]
    async fn test_self_references_excluded() {
        let options = AggregateOptions {
            scan_root: Some("github.com/me/proj".to_string()),
            ..Default::default()
        };
        let records = run(
            &[
                "github.com/me/proj",
                "github.com/me/proj/internal/db",
                "github.com/me/project-other",
                "github.com/pkg/errors",
            ],
            options,
        )
        .await;

        assert_eq!(
            paths(&records),
            vec!["github.com/me/project-other", "github.com/pkg/errors"]
        );
    }

    #[tokio::test]
    async fn test_standard_library_dropped_unless_requested() {
        let raw = ["fmt", "net/http", "github.com/pkg/errors", "fmt"];

        let records = run(&raw, AggregateOptions::default()).await;
        assert_eq!(paths(&records), vec!["github.com/pkg/errors"]);

        let options = AggregateOptions {
            include_std: true,
            ..Default::default()
        };
        let records = run(&raw, options).await;
        assert_eq!(paths(&records), vec!["fmt", "net/http", "github.com/pkg/errors"]);
        assert_eq!(records[0].occurrence_count, 2);
        assert_eq!(records[0].resolution, Resolution::Standard);
    }

    #[tokio::test]
    async fn test_ignore_prefixes() {
        let options = AggregateOptions {
            ignore: vec!["github.com/internal-org/".to_string()],
            ..Default::default()
        };
        let records = run(
            &["github.com/internal-org/tools", "github.com/pkg/errors"],
            options,
        )
        .await;
        assert_eq!(paths(&records), vec!["github.com/pkg/errors"]);
    }

    #[tokio::test]
    async fn test_ignore_matches_whole_segments() {
        let options = AggregateOptions {
            ignore: vec!["github.com/acme".to_string()],
            ..Default::default()
        };
        let records = run(
            &[
                "github.com/acme-corp/tool",
                "github.com/acme/x",
                "github.com/acme",
            ],
            options,
        )
        .await;
        assert_eq!(paths(&records), vec!["github.com/acme-corp/tool"]);
    }

    #[tokio::test]
    async fn test_verbose_counts_repeats_of_full_path() {
        let options = AggregateOptions {
            verbose: true,
            ..Default::default()
        };
        let records = run(
            &[
                "proj/vendor/github.com/gorilla/mux/internal/x",
                "github.com/gorilla/mux/internal/x",
                "github.com/gorilla/mux/internal/x",
            ],
            options,
        )
        .await;

        assert_eq!(paths(&records), vec!["github.com/gorilla/mux/internal/x"]);
        assert_eq!(records[0].occurrence_count, 3);
        assert!(!records[0].already_seen);
    }

    #[tokio::test]
    async fn test_deterministic_across_runs() {
        let raw = [
            "golang.org/x/net/http2",
            "github.com/fatih/color",
            "gopkg.in/fatih/color.v1",
            "example.org/unknown",
            "github.com/fatih/color/sub",
            "golang.org/x/net/context/ctxhttp",
        ];
        let first = run(&raw, AggregateOptions::default()).await;
        let second = run(&raw, AggregateOptions::default()).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_seeded_memo_avoids_fetch() {
        let mut memo = ResolutionMemo::new();
        memo.insert(
            "example.org/lib",
            Err(ResolveError::unreachable("example.org/lib", "seeded")),
        );
        let hosts = HostTable::default();
        let resolver = VanityResolver::with_memo(stub_pages(), memo);
        let records = Aggregator::new(&hosts, resolver, AggregateOptions::default())
            .aggregate(["example.org/lib"])
            .await;

        assert!(records[0].identity().is_none());
    }
}
