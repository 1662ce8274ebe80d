use clap::Parser;
use std::path::PathBuf;

use crate::data::scanner::DEFAULT_PATTERN;
use crate::report::OutputFormat;

/// Software Dependency Check
///
/// Lists the modules of each collection under an environment-module root,
/// together with the dependencies their module files declare.
#[derive(Debug, Parser)]
#[command(name = "lmod-depcheck", version)]
pub struct Cli {
    /// Root directory holding the module collections
    #[arg(short, long, value_name = "DIR", default_value = "/sw/modules")]
    pub dir: PathBuf,

    /// Comma separated collections to report (default: all)
    #[arg(short, long, value_name = "NAMES", value_delimiter = ',')]
    pub collection: Option<Vec<String>>,

    /// Only show modules whose dependencies contain this keyword
    #[arg(short, long, value_name = "KEYWORD", default_value = "")]
    pub filter: String,

    /// Glob for module file names
    #[arg(short, long, value_name = "GLOB", default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file (accepted, currently unused)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Tree view (accepted, currently unused)
    #[arg(short, long, value_name = "VALUE")]
    pub tree: Option<String>,
}
