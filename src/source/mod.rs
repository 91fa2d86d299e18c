//! Producers of raw import paths for a Go module.
//!
//! - [`gomod`] — module requirements declared in `go.mod`.
//! - [`golist`] — package imports reported by `go list`.

use std::path::Path;

use anyhow::Result;

pub mod golist;
pub mod gomod;

pub trait ImportSource {
    /// Raw import paths, in the order the source emits them.
    fn imports(&self, root: &Path, include_indirect: bool) -> Result<Vec<String>>;
}
