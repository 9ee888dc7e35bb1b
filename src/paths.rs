//! Filesystem naming: identifier sanitization and collision-free path
//! allocation.
//!
//! Every entity that owns a file or directory derives its location here.
//! Two policies exist on purpose:
//!
//! - Directories (projects) probe `slug`, `slug_1`, `slug_2`, ... until a
//!   free path is found.
//! - Note files fall back to a single `slug_YYYY-MM-DD.md` date suffix and
//!   stop there. Invoked twice on the same day for the same title this
//!   still collides and the later write overwrites; a known limitation.
//!
//! Allocation is a scan-then-act existence check, not a reservation. Two
//! concurrent callers can receive the same path; the loser surfaces as a
//! filesystem error when it tries to create the file.

use chrono::Utc;
use std::path::{Path, PathBuf};

// ============================================================================
// Identifier Sanitizer
// ============================================================================

/// Lowercase the name and replace every character outside `[a-z0-9]` with
/// an underscore. Runs of underscores are kept as-is. Pure and idempotent.
/// An empty input yields an empty slug; callers validate names are
/// non-empty before sanitizing.
pub fn sanitize(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Like [`sanitize`] but collapses runs of underscores to one. Used for
/// citation filenames only.
pub fn sanitize_collapsed(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out
}

// ============================================================================
// Path Allocator
// ============================================================================

/// Find a directory path under `parent` that does not yet exist, starting
/// from `slug` and appending `_1`, `_2`, ... as needed.
pub fn allocate_dir(parent: &Path, slug: &str) -> PathBuf {
    let candidate = parent.join(slug);
    if !candidate.exists() {
        return candidate;
    }

    let mut counter: u32 = 1;
    loop {
        let candidate = parent.join(format!("{}_{}", slug, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Allocate `slug.ext` under `parent`; if that exists, fall back to
/// `slug_YYYY-MM-DD.ext` once without further probing (weaker uniqueness,
/// see the module docs).
pub fn allocate_file_dated(parent: &Path, slug: &str, ext: &str) -> PathBuf {
    let candidate = parent.join(format!("{}.{}", slug, ext));
    if !candidate.exists() {
        return candidate;
    }
    let date = Utc::now().format("%Y-%m-%d");
    parent.join(format!("{}_{}.{}", slug, date, ext))
}
