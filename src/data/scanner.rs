use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

use super::loader::{has_module_files, load_module_dir};
use super::model::{Collection, CollectionScan, LayoutKind, ModuleRecord, RecordContext};
use super::path::{decode, ModulePath};
use crate::error::ConfigError;

/// Default module file pattern.
pub const DEFAULT_PATTERN: &str = "*.lua";

// ---------------------------------------------------------------------------
// Scan options
// ---------------------------------------------------------------------------

/// Everything a scan needs besides the collection name.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub pattern: Pattern,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>, pattern: &str) -> Result<Self, ConfigError> {
        let compiled = Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(ScanOptions {
            root: root.into(),
            pattern: compiled,
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Names of the collections under `root`, sorted. `.git` is never one.
pub fn discover_collections(root: &Path) -> Result<Vec<String>> {
    let names = subdirectories(root, true)
        .with_context(|| format!("reading module root {}", root.display()))?
        .into_iter()
        .filter_map(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .filter(|name| name != ".git")
        .collect();
    Ok(names)
}

/// Scan one collection with the strategy its layout calls for.
pub fn scan_collection(
    options: &ScanOptions,
    collection: &Collection,
) -> Result<CollectionScan, ConfigError> {
    if collection.layout.is_stacked() {
        scan_stacked(options, &collection.name)
    } else {
        Ok(scan_flat(options, collection.clone()))
    }
}

/// Flat collections: every subdirectory of the collection is a module.
pub fn scan_flat(options: &ScanOptions, collection: Collection) -> CollectionScan {
    let dir = options.root.join(&collection.name);
    let modules = match subdirectories(&dir, true) {
        Ok(modules) => modules,
        Err(e) => {
            log::warn!("Cannot list collection {}: {e:#}", collection.name);
            return CollectionScan::empty(collection);
        }
    };

    let mut scan = CollectionScan::empty(collection);
    for module_dir in modules {
        let Some(module) = module_dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match load_module_dir(&module_dir, &module, &options.pattern) {
            Ok(entries) => scan.groups.push(
                entries
                    .into_iter()
                    .map(|entry| ModuleRecord::new(RecordContext::Flat, entry))
                    .collect(),
            ),
            Err(e) => log::warn!("Skipping module {module}: {e:#}"),
        }
    }

    log::debug!(
        "Scanned flat collection {}: {} records",
        scan.collection.name,
        scan.len()
    );
    scan
}

/// Stacked collections: walk the directories below the collection and keep
/// those whose depth fits the layout.
///
/// The walk stops one level past the layout's depth, so a misplaced module
/// directory just below the expected depth is still counted as excluded
/// while deeper trees are never listed.
///
/// Fails only when `name` has no stacked layout.
pub fn scan_stacked(options: &ScanOptions, name: &str) -> Result<CollectionScan, ConfigError> {
    let layout = LayoutKind::stacked(name)?;
    let mut scan = CollectionScan::empty(Collection {
        name: name.to_string(),
        layout,
    });

    let top = options.root.join(name);
    let top_depth = ModulePath::from_relative(Path::new(name)).depth();
    let levels = layout
        .expected_depth()
        .map_or(0, |depth| (depth + 1).saturating_sub(top_depth));
    let dirs = match walk_dirs(&top, levels) {
        Ok(dirs) => dirs,
        Err(e) => {
            log::warn!("Cannot list collection {name}: {e:#}");
            return Ok(scan);
        }
    };

    for dir in dirs {
        let Ok(relative) = dir.strip_prefix(&options.root) else {
            continue;
        };
        let module_path = ModulePath::from_relative(relative);

        let Some(decoded) = decode(&module_path, layout) else {
            if has_module_files(&dir, &options.pattern) {
                log::debug!(
                    "Depth {} does not fit {layout} layout: {}",
                    module_path.depth(),
                    dir.display()
                );
                scan.excluded += 1;
            }
            continue;
        };

        match load_module_dir(&dir, &decoded.package_name, &options.pattern) {
            Ok(entries) if !entries.is_empty() => scan.groups.push(
                entries
                    .into_iter()
                    .map(|entry| ModuleRecord::new(decoded.context.clone(), entry))
                    .collect(),
            ),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping {}: {e:#}", dir.display()),
        }
    }

    if scan.excluded > 0 {
        log::warn!(
            "{name}: ignored {} directories with module files at an unexpected depth",
            scan.excluded
        );
    }
    log::debug!("Scanned stacked collection {name}: {} records", scan.len());
    Ok(scan)
}

// ---------------------------------------------------------------------------
// Directory helpers
// ---------------------------------------------------------------------------

/// `top` and the directories up to `levels` below it, parents before children.
/// Symlinked directories are listed by neither this nor their parent walk.
fn walk_dirs(top: &Path, levels: usize) -> Result<Vec<PathBuf>> {
    let mut dirs = vec![top.to_path_buf()];
    if levels == 0 {
        return Ok(dirs);
    }
    for child in subdirectories(top, false)? {
        collect_dirs(child, levels - 1, &mut dirs);
    }
    Ok(dirs)
}

fn collect_dirs(dir: PathBuf, levels: usize, out: &mut Vec<PathBuf>) {
    let children = if levels == 0 {
        Vec::new()
    } else {
        match subdirectories(&dir, false) {
            Ok(children) => children,
            Err(e) => {
                log::warn!("Skipping {}: {e:#}", dir.display());
                Vec::new()
            }
        }
    };
    out.push(dir);
    for child in children {
        collect_dirs(child, levels - 1, out);
    }
}

/// Immediate subdirectories of `dir`, sorted by path.
fn subdirectories(dir: &Path, follow_links: bool) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry.with_context(|| format!("listing {}", dir.display()))?;
        let is_dir = if follow_links {
            entry.path().is_dir()
        } else {
            entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
        };
        if is_dir {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write_module(root: &Path, rel: &str, text: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    fn options(root: &Path) -> ScanOptions {
        ScanOptions::new(root, DEFAULT_PATTERN).unwrap()
    }

    fn rows(scan: &CollectionScan) -> Vec<Vec<String>> {
        scan.groups.iter().flatten().map(ModuleRecord::to_row).collect()
    }

    #[test]
    fn discovers_collections_without_git() {
        let root = TempDir::new().unwrap();
        for dir in ["MPI", "Core", ".git", "Collections"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        fs::write(root.path().join("README"), "").unwrap();

        let names = discover_collections(root.path()).unwrap();
        assert_eq!(names, ["Collections", "Core", "MPI"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let root = TempDir::new().unwrap();
        assert!(discover_collections(&root.path().join("nope")).is_err());
    }

    #[test]
    fn flat_collection_groups_by_module() {
        let root = TempDir::new().unwrap();
        write_module(root.path(), "Core/git/2.44.lua", "depends_on(\"curl\")\n");
        write_module(root.path(), "Core/git/2.45.lua", "");
        write_module(root.path(), "Core/cmake/3.28.lua", "depends_on(\"openssl\")\n");
        write_module(root.path(), "Core/stray.lua", "depends_on(\"ignored\")\n");

        let scan = scan_flat(&options(root.path()), Collection::new("Core"));
        assert_eq!(scan.groups.len(), 2);
        assert_eq!(
            rows(&scan),
            [
                vec!["cmake/3.28".to_string(), "openssl".into()],
                vec!["git/2.44".into(), "curl".into()],
                vec!["git/2.45".into(), String::new()],
            ]
        );
    }

    #[test]
    fn compilers_scan_decodes_toolchain() {
        let root = TempDir::new().unwrap();
        write_module(root.path(), "Compilers/gcc/12.2/foo/1.0.lua", "depends_on(\"bar\")\n");

        let scan = scan_stacked(&options(root.path()), "Compilers").unwrap();
        assert_eq!(scan.collection.layout, LayoutKind::Compiler);
        assert_eq!(scan.groups.len(), 1);
        let record = &scan.groups[0][0];
        assert_eq!(
            record.context,
            RecordContext::Compiler {
                compiler_version: "gcc/12.2".into()
            }
        );
        assert_eq!(record.package, "foo/1.0");
        assert_eq!(record.dependency, "bar");
    }

    #[test]
    fn mpi_scan_reads_every_level() {
        let root = TempDir::new().unwrap();
        write_module(
            root.path(),
            "MPI/openmpi-4.1/gcc-12/hdf5/1.14.lua",
            "depends_on(\"zlib\")\ndepends_on(\"szip\")\n",
        );
        write_module(root.path(), "MPI/openmpi-4.1/gcc-12/fftw/3.3.lua", "");

        let scan = scan_stacked(&options(root.path()), "MPI").unwrap();
        assert_eq!(
            rows(&scan),
            [
                vec![
                    "openmpi-4.1".to_string(),
                    "gcc-12".into(),
                    "fftw/3.3".into(),
                    String::new()
                ],
                vec![
                    "openmpi-4.1".into(),
                    "gcc-12".into(),
                    "hdf5/1.14".into(),
                    "zlib, szip".into()
                ],
            ]
        );
        assert_eq!(scan.excluded, 0);
    }

    #[test]
    fn python_scan_uses_collection_in_version() {
        let root = TempDir::new().unwrap();
        write_module(root.path(), "Python/3.11/numpy/1.26.lua", "depends_on(\"openblas\")\n");

        let scan = scan_stacked(&options(root.path()), "Python").unwrap();
        assert_eq!(
            rows(&scan),
            [vec![
                "Python/3.11".to_string(),
                "numpy/1.26".into(),
                "openblas".into()
            ]]
        );
    }

    #[test]
    fn wrong_depth_is_excluded_and_counted() {
        let root = TempDir::new().unwrap();
        write_module(
            root.path(),
            "Compilers/core/gcc/12.2/openmpi/4.1/foo/1.0.lua",
            "depends_on(\"bar\")\n",
        );
        write_module(root.path(), "Compilers/gcc/12.2/foo/1.0.lua", "");
        write_module(root.path(), "Compilers/gcc/12.2/foo/old/0.9.lua", "");
        write_module(root.path(), "Compilers/gcc/12.2.lua", "");

        let scan = scan_stacked(&options(root.path()), "Compilers").unwrap();
        assert_eq!(scan.len(), 1);
        assert_eq!(scan.groups[0][0].package, "foo/1.0");
        // `Compilers/gcc` is too shallow and `foo/old` one level too deep.
        // The ten-segment tree lies past the walk and is not counted.
        assert_eq!(scan.excluded, 2);
    }

    #[test]
    fn walk_stops_one_level_past_layout_depth() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("Python/3.11/numpy/extra/deeper/still")).unwrap();

        let top = root.path().join("Python");
        let dirs = walk_dirs(&top, 3).unwrap();
        let relative: Vec<_> = dirs
            .iter()
            .map(|d| d.strip_prefix(root.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            [
                PathBuf::from("Python"),
                PathBuf::from("Python/3.11"),
                PathBuf::from("Python/3.11/numpy"),
                PathBuf::from("Python/3.11/numpy/extra"),
            ]
        );
        assert_eq!(walk_dirs(&top, 0).unwrap(), [top.clone()]);
    }

    #[test]
    fn python_module_one_level_too_deep_is_counted() {
        let root = TempDir::new().unwrap();
        write_module(root.path(), "Python/3.11/numpy/1.26.lua", "");
        write_module(root.path(), "Python/3.11/numpy/extra/1.0.lua", "");
        write_module(root.path(), "Python/3.11/numpy/extra/deeper/1.0.lua", "");

        let scan = scan_stacked(&options(root.path()), "Python").unwrap();
        assert_eq!(scan.len(), 1);
        assert_eq!(scan.excluded, 1);
    }

    #[test]
    fn stacked_scan_of_flat_name_is_a_config_error() {
        let root = TempDir::new().unwrap();
        let err = scan_stacked(&options(root.path()), "Core").unwrap_err();
        assert_eq!(err, ConfigError::UnknownLayout("Core".into()));
    }

    #[test]
    fn missing_collection_yields_nothing() {
        let root = TempDir::new().unwrap();
        let opts = options(root.path());
        assert!(scan_flat(&opts, Collection::new("Core")).is_empty());
        assert!(scan_stacked(&opts, "MPI").unwrap().is_empty());
    }

    #[test]
    fn scan_collection_dispatches_on_layout() {
        let root = TempDir::new().unwrap();
        write_module(root.path(), "Bio/samtools/1.19.lua", "depends_on(\"htslib\")\n");
        write_module(root.path(), "Python/3.12/scipy/1.12.lua", "depends_on(\"numpy\")\n");
        let opts = options(root.path());

        let bio = scan_collection(&opts, &Collection::new("Bio")).unwrap();
        assert_eq!(rows(&bio), [vec!["samtools/1.19".to_string(), "htslib".into()]]);

        let python = scan_collection(&opts, &Collection::new("Python")).unwrap();
        assert_eq!(python.collection.layout, LayoutKind::Python);
        assert_eq!(python.len(), 1);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = ScanOptions::new("/sw/modules", "[*.lua").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
