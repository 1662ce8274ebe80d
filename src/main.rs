mod cli;
mod data;
mod error;
mod report;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use data::filter::filter_scan;
use data::model::Collection;
use data::scanner::{discover_collections, scan_collection, ScanOptions};
use error::ConfigError;
use report::{assemble, write_collection};

/// Directory under the root that holds no modules of its own.
const PSEUDO_COLLECTION: &str = "Collections";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Unknown collection names go to stdout in place of the report.
            match e.downcast_ref::<ConfigError>() {
                Some(invalid @ ConfigError::InvalidCollection(_)) => println!("{invalid}"),
                _ => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(output) = &cli.output {
        log::debug!("Ignoring --output {output}: file output is not supported");
    }
    if let Some(tree) = &cli.tree {
        log::debug!("Ignoring --tree {tree}: tree output is not supported");
    }

    let options = ScanOptions::new(&cli.dir, &cli.pattern)?;
    let mut discovered = discover_collections(&options.root)?;
    discovered.retain(|name| name != PSEUDO_COLLECTION);
    let selected = select_collections(discovered, cli.collection.as_deref())?;

    log::info!(
        "Scanning {} collections under {}",
        selected.len(),
        options.root.display()
    );

    let mut out = std::io::stdout().lock();
    for name in selected {
        let collection = Collection::new(name);
        let scan = filter_scan(scan_collection(&options, &collection)?, &cli.filter);
        let report = assemble(scan);
        write_collection(&mut out, cli.format, &collection.name, report.as_ref())?;
    }
    out.flush()?;
    Ok(())
}

/// The requested collections in the order given, or every discovered one.
/// Any name that was not discovered rejects the whole request.
fn select_collections(
    discovered: Vec<String>,
    requested: Option<&[String]>,
) -> Result<Vec<String>, ConfigError> {
    let Some(requested) = requested else {
        return Ok(discovered);
    };

    let unknown: Vec<String> = requested
        .iter()
        .filter(|name| !discovered.contains(name))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ConfigError::InvalidCollection(unknown));
    }
    Ok(requested.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn all_collections_by_default() {
        let selected = select_collections(names(&["Core", "MPI"]), None).unwrap();
        assert_eq!(selected, ["Core", "MPI"]);
    }

    #[test]
    fn requested_order_is_kept() {
        let requested = names(&["MPI", "Core"]);
        let selected = select_collections(names(&["Core", "MPI"]), Some(&requested)).unwrap();
        assert_eq!(selected, ["MPI", "Core"]);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let requested = names(&["Core", "Bogus"]);
        let err = select_collections(names(&["Core", "MPI"]), Some(&requested)).unwrap_err();
        assert_eq!(err, ConfigError::InvalidCollection(names(&["Bogus"])));
        assert!(err.to_string().starts_with("Invalid Collection Name"));
    }
}
