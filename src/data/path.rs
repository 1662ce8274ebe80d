use std::path::{Component, Path};

use super::model::{LayoutKind, RecordContext};

/// Number of segments the module root contributes. Depths and indices are
/// counted as if the root were `/sw/modules` (`""`, `"sw"`, `"modules"`), so
/// segment 3 is always the collection name whatever `--dir` points at.
pub const ROOT_SEGMENTS: usize = 3;

// ---------------------------------------------------------------------------
// ModulePath
// ---------------------------------------------------------------------------

/// A module directory expressed as path segments, anchored at the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    /// Segments below the root, collection name first.
    relative: Vec<String>,
}

impl ModulePath {
    /// Build from a path relative to the module root, e.g. `MPI/openmpi/gcc/hdf5`.
    pub fn from_relative(path: &Path) -> Self {
        let relative = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        ModulePath { relative }
    }

    /// Segment count including the root anchor.
    pub fn depth(&self) -> usize {
        ROOT_SEGMENTS + self.relative.len()
    }

    /// Segment at an anchored index. Root anchor indices have no name.
    pub fn segment(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(ROOT_SEGMENTS)
            .and_then(|i| self.relative.get(i))
            .map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.relative.last().map(String::as_str)
    }

    /// Segments `start..end` joined with `/`.
    fn join(&self, start: usize, end: usize) -> Option<String> {
        let parts = (start..end)
            .map(|i| self.segment(i))
            .collect::<Option<Vec<_>>>()?;
        Some(parts.join("/"))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Identity recovered from a module directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPath {
    pub context: RecordContext,
    pub package_name: String,
}

/// Decode a module directory according to its collection layout.
///
/// Returns `None` when a stacked layout sees a path of the wrong depth.
/// Flat paths are always accepted and named after their last segment.
pub fn decode(path: &ModulePath, layout: LayoutKind) -> Option<DecodedPath> {
    if let Some(depth) = layout.expected_depth() {
        if path.depth() != depth {
            return None;
        }
    }

    let (context, package) = match layout {
        LayoutKind::Flat => (RecordContext::Flat, path.last()?),
        LayoutKind::Mpi => (
            RecordContext::Mpi {
                mpi_version: path.segment(4)?.to_string(),
                compiler: path.segment(5)?.to_string(),
            },
            path.segment(6)?,
        ),
        LayoutKind::Python => (
            RecordContext::Python {
                python_version: path.join(3, 5)?,
            },
            path.segment(5)?,
        ),
        LayoutKind::Compiler => (
            RecordContext::Compiler {
                compiler_version: path.join(4, 6)?,
            },
            path.segment(6)?,
        ),
    };

    Some(DecodedPath {
        context,
        package_name: package.to_string(),
    })
}
