//! Report renderers for resolved dependencies.
//!
//! - [`terminal`] — colored table with a summary line; respects `--count` / `--quiet`.
//! - [`csv`] — one row per dependency, for spreadsheets and scripts.
//!
//! JSON output is produced directly from [`Row`] with `serde_json`.

pub mod csv;
pub mod terminal;

use serde::Serialize;

use crate::license::label;
use crate::models::{DependencyRecord, Resolution};

/// Flattened view of a record, shared by every output format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub dependency: String,
    pub count: usize,
    pub repo_url: Option<String>,
    pub license: Option<String>,
    #[serde(skip)]
    pub license_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn rows(records: &[DependencyRecord]) -> Vec<Row> {
    records
        .iter()
        .map(|r| Row {
            dependency: r.import_path.clone(),
            count: r.occurrence_count,
            repo_url: r.repo_url(),
            license: r.license.as_ref().map(label::short_name),
            license_key: r.license.as_ref().map(|l| l.key.clone()),
            error: match &r.resolution {
                Resolution::Unresolved(e) => Some(e.to_string()),
                _ => None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LicenseInfo, RepositoryIdentity};
    use crate::resolve::ResolveError;

    #[test]
    fn test_rows() {
        let mut resolved = DependencyRecord::new(
            "github.com/fatih/color",
            Resolution::Resolved {
                identity: RepositoryIdentity::new("github.com", "fatih", "color"),
                root: "github.com/fatih/color".to_string(),
            },
        );
        resolved.occurrence_count = 2;
        resolved.license = Some(LicenseInfo {
            key: "mit".to_string(),
            name: "MIT License".to_string(),
            spdx_id: Some("MIT".to_string()),
            text: None,
        });
        let unresolved = DependencyRecord::new(
            "github.com/ribice",
            Resolution::Unresolved(ResolveError::Malformed("github.com/ribice".to_string())),
        );

        let rows = rows(&[resolved, unresolved]);

        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].repo_url.as_deref(), Some("https://github.com/fatih/color"));
        assert_eq!(rows[0].license.as_deref(), Some("MIT"));
        assert_eq!(rows[0].error, None);
        assert_eq!(rows[1].repo_url, None);
        assert_eq!(
            rows[1].error.as_deref(),
            Some("malformed import path `github.com/ribice`")
        );

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["dependency"], "github.com/fatih/color");
        assert!(json.get("license_key").is_none());
        assert!(json.get("error").is_none());
    }
}
