use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::DependencyRecord;

/// Write the license text of every distinct repository into `dir`, as
/// `<author>-<project>-license.MD`. Returns the files written.
///
/// Records flagged `already_seen` and records without license text are skipped.
pub fn write_licenses(records: &[DependencyRecord], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for record in records.iter().filter(|r| !r.already_seen) {
        let (Some(repo), Some(text)) = (
            record.identity(),
            record.license.as_ref().and_then(|l| l.text.as_deref()),
        ) else {
            continue;
        };

        let encoded: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let decoded = base64::decode(&encoded)
            .with_context(|| format!("invalid license text for {}", record.import_path))?;

        if written.is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let file_name = if repo.project.is_empty() {
            format!("{}-license.MD", repo.author)
        } else {
            format!("{}-{}-license.MD", repo.author, repo.project)
        };
        let path = dir.join(file_name);
        std::fs::write(&path, decoded)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}
