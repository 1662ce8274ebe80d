use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use regex::Regex;

use super::model::ModuleEntry;

/// `depends_on("name")` at the start of a line, after optional whitespace.
static DEPENDS_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*depends_on\("([^"]+)"\)"#).expect("dependency pattern is valid")
});

/// Shell-style matching: `*` never crosses `/` or picks up dotfiles.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every module file directly inside `dir`, one entry per readable file.
///
/// Listing `dir` itself is the only hard failure. A file that cannot be read
/// is logged and skipped, so it produces no entry at all.
pub fn load_module_dir(dir: &Path, package: &str, pattern: &Pattern) -> Result<Vec<ModuleEntry>> {
    let files = module_files(dir, pattern)?;
    let mut entries = Vec::with_capacity(files.len());

    for file in files {
        match load_module_file(&file, package) {
            Ok(entry) => entries.push(entry),
            Err(e) => log::warn!("Skipping module file {}: {e:#}", file.display()),
        }
    }

    Ok(entries)
}

/// Read one module file into `package/version` plus its dependency string.
/// The version is the file name without its extension.
pub fn load_module_file(path: &Path, package: &str) -> Result<ModuleEntry> {
    let text = std::fs::read_to_string(path).context("reading module file")?;
    let version = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .context("module file has no name")?;

    Ok(ModuleEntry {
        package: format!("{package}/{version}"),
        dependency: parse_dependencies(&text).join(", "),
    })
}

/// Dependency names declared in a module file, in file order.
/// Names are captured verbatim, version suffixes included.
pub fn parse_dependencies(text: &str) -> Vec<&str> {
    DEPENDS_ON
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Files directly inside `dir` whose name matches `pattern`, sorted by name.
fn module_files(dir: &Path, pattern: &Pattern) -> Result<Vec<PathBuf>> {
    let listing =
        std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in listing {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let name = entry.file_name();
        let path = entry.path();
        // Anything but a directory is kept, so unreadable entries (dangling
        // links, special files) fail later in `load_module_file` with a warning.
        if pattern.matches_with(&name.to_string_lossy(), MATCH_OPTIONS) && !path.is_dir() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Whether `dir` holds at least one module file. Unreadable counts as no.
pub fn has_module_files(dir: &Path, pattern: &Pattern) -> bool {
    module_files(dir, pattern).is_ok_and(|files| !files.is_empty())
}
