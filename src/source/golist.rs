use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Package imports of every package in the module, as reported by `go list`.
///
/// Each package contributes its own import list, so a dependency imported from
/// several packages appears several times and ends up with a usage count > 1.
/// Packages under an ignored folder contribute nothing.
pub struct GoListSource {
    ignore_dirs: Vec<String>,
}

impl GoListSource {
    pub fn new(ignore_dirs: Vec<String>) -> Self {
        Self { ignore_dirs }
    }
}

impl super::ImportSource for GoListSource {
    fn imports(&self, root: &Path, include_indirect: bool) -> Result<Vec<String>> {
        let field = if include_indirect { "Deps" } else { "Imports" };

        let output = Command::new("go")
            .args(["list", "-f", &list_template(field), "./..."])
            .current_dir(root)
            .output()
            .context("failed to execute `go list`")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("go list failed: {}", stderr.trim());
        }

        Ok(parse_go_list_output(
            &String::from_utf8_lossy(&output.stdout),
            root,
            &self.ignore_dirs,
        ))
    }
}

/// One unindented line with the package directory, then one tab-indented
/// line per import.
fn list_template(field: &str) -> String {
    format!("{{{{.Dir}}}}{{{{range .{}}}}}\n\t{{{{.}}}}{{{{end}}}}", field)
}

fn parse_go_list_output(stdout: &str, root: &Path, ignore_dirs: &[String]) -> Vec<String> {
    let mut imports = Vec::new();
    let mut skipping = false;

    for line in stdout.lines() {
        if let Some(import) = line.strip_prefix('\t') {
            let import = import.trim();
            if !skipping && !import.is_empty() {
                imports.push(import.to_string());
            }
            continue;
        }

        let dir = line.trim();
        if dir.is_empty() {
            continue;
        }
        let dir = Path::new(dir);
        let relative = dir.strip_prefix(root).unwrap_or(dir);
        skipping = is_ignored_dir(relative, ignore_dirs);
        if skipping {
            debug!(dir = %dir.display(), "skipping package in ignored folder");
        }
    }

    imports
}

/// A bare folder name matches at any depth; an entry containing `/` must
/// match the leading components of the module-relative path.
fn is_ignored_dir(relative: &Path, ignore_dirs: &[String]) -> bool {
    ignore_dirs
        .iter()
        .map(|entry| entry.trim().trim_matches('/'))
        .filter(|entry| !entry.is_empty())
        .any(|entry| {
            if entry.contains('/') {
                relative.starts_with(entry)
            } else {
                relative.components().any(|c| c.as_os_str() == entry)
            }
        })
}
