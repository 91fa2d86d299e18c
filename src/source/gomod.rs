use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

/// The parts of a `go.mod` file the scanner cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoMod {
    /// Path declared by the `module` directive (the scan root).
    pub module: Option<String>,
    pub require: Vec<Require>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: String,
    pub version: String,
    /// Marked `// indirect`.
    pub indirect: bool,
}

pub fn read_go_mod(root: &Path) -> Result<GoMod> {
    let path = root.join("go.mod");
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("no go.mod file present at {}", path.display()))?;
    parse_go_mod(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse `module` and `require` directives, single-line or parenthesised.
/// Other directives (`replace`, `exclude`, `retract`, `go`, `toolchain`) are skipped.
pub fn parse_go_mod(content: &str) -> Result<GoMod> {
    let module_re = Regex::new(r#"^module\s+"?([^\s"]+)"?"#)?;
    let entry_re = Regex::new(r#"^"?([^\s"]+)"?\s+(\S+)"#)?;

    let mut go_mod = GoMod::default();
    let mut block: Option<String> = None;

    for raw_line in content.lines() {
        let (code, comment) = match raw_line.find("//") {
            Some(idx) => (&raw_line[..idx], Some(raw_line[idx + 2..].trim())),
            None => (raw_line, None),
        };
        let line = code.trim();
        let indirect = comment.is_some_and(|c| c.starts_with("indirect"));

        if line.is_empty() {
            continue;
        }

        if let Some(kind) = &block {
            if line == ")" {
                block = None;
            } else if kind == "require" {
                if let Some(caps) = entry_re.captures(line) {
                    go_mod.require.push(Require {
                        path: caps[1].to_string(),
                        version: caps[2].to_string(),
                        indirect,
                    });
                }
            }
            continue;
        }

        if let Some(caps) = module_re.captures(line) {
            go_mod.module = Some(caps[1].to_string());
            continue;
        }

        let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        if rest == "(" {
            block = Some(directive.to_string());
            continue;
        }

        if directive == "require" {
            if let Some(caps) = entry_re.captures(rest) {
                go_mod.require.push(Require {
                    path: caps[1].to_string(),
                    version: caps[2].to_string(),
                    indirect,
                });
            }
        }
    }

    Ok(go_mod)
}

/// Requirements declared in `go.mod`, one raw import path per module.
pub struct GoModSource;

impl GoModSource {
    pub fn new() -> Self {
        Self
    }
}

impl super::ImportSource for GoModSource {
    fn imports(&self, root: &Path, include_indirect: bool) -> Result<Vec<String>> {
        let go_mod = read_go_mod(root)?;
        Ok(go_mod
            .require
            .into_iter()
            .filter(|r| include_indirect || !r.indirect)
            .inspect(|r| debug!(path = %r.path, version = %r.version, "requirement"))
            .map(|r| r.path)
            .collect())
    }
}
