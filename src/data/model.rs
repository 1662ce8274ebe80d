use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// LayoutKind – how a collection arranges its module directories
// ---------------------------------------------------------------------------

/// Directory layout of a collection. Decides the expected path depth and
/// which segments carry toolchain context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// `<collection>/<package>/<version>.lua`
    Flat,
    /// `MPI/<mpi>/<compiler>/<package>/<version>.lua`
    Mpi,
    /// `Python/<pyver>/<package>/<version>.lua`
    Python,
    /// `Compilers/<compiler>/<cver>/<package>/<version>.lua`
    Compiler,
}

impl LayoutKind {
    /// Layout for any collection name. Names without a stacked layout are flat.
    pub fn of_collection(name: &str) -> Self {
        Self::stacked(name).unwrap_or(LayoutKind::Flat)
    }

    /// Layout for a collection that must be stacked.
    pub fn stacked(name: &str) -> Result<Self, ConfigError> {
        match name {
            "MPI" => Ok(LayoutKind::Mpi),
            "Python" => Ok(LayoutKind::Python),
            "Compilers" => Ok(LayoutKind::Compiler),
            other => Err(ConfigError::UnknownLayout(other.to_string())),
        }
    }

    /// Exact segment count a module path must have, `None` for flat layouts.
    pub fn expected_depth(self) -> Option<usize> {
        match self {
            LayoutKind::Flat => None,
            LayoutKind::Mpi | LayoutKind::Compiler => Some(7),
            LayoutKind::Python => Some(6),
        }
    }

    pub fn is_stacked(self) -> bool {
        self != LayoutKind::Flat
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutKind::Flat => "flat",
            LayoutKind::Mpi => "mpi",
            LayoutKind::Python => "python",
            LayoutKind::Compiler => "compiler",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Collection – a top-level directory under the module root
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub layout: LayoutKind,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let layout = LayoutKind::of_collection(&name);
        Collection { name, layout }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Context columns recovered from the module's directory path.
/// One variant per layout, each with its own fixed field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordContext {
    Flat,
    Mpi { mpi_version: String, compiler: String },
    Python { python_version: String },
    Compiler { compiler_version: String },
}

impl RecordContext {
    fn fields(&self) -> Vec<String> {
        match self {
            RecordContext::Flat => Vec::new(),
            RecordContext::Mpi {
                mpi_version,
                compiler,
            } => vec![mpi_version.clone(), compiler.clone()],
            RecordContext::Python { python_version } => vec![python_version.clone()],
            RecordContext::Compiler { compiler_version } => vec![compiler_version.clone()],
        }
    }
}

/// What a single module file yields before path context is attached:
/// `package/version` and the comma-joined dependency names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    pub package: String,
    pub dependency: String,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub context: RecordContext,
    pub package: String,
    /// Empty when the module declares nothing.
    pub dependency: String,
}

impl ModuleRecord {
    pub fn new(context: RecordContext, entry: ModuleEntry) -> Self {
        ModuleRecord {
            context,
            package: entry.package,
            dependency: entry.dependency,
        }
    }

    /// Generic string row: context fields, then package, then dependency.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = self.context.fields();
        row.push(self.package.clone());
        row.push(self.dependency.clone());
        row
    }
}

/// Records coming from one module directory. Filtering keeps or drops a
/// group as a whole.
pub type RecordGroup = Vec<ModuleRecord>;

// ---------------------------------------------------------------------------
// CollectionScan – everything one collection produced
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CollectionScan {
    pub collection: Collection,
    pub groups: Vec<RecordGroup>,
    /// Directories rejected for their depth even though they held module files.
    pub excluded: usize,
}

impl CollectionScan {
    pub fn empty(collection: Collection) -> Self {
        CollectionScan {
            collection,
            groups: Vec::new(),
            excluded: 0,
        }
    }

    /// Total number of records across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
