//! Catalog and sheet-listing command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::catalog::{build_master, find_xml_files, Catalog, CatalogError};
use crate::config::loader::CliOverrides;

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Expand directories into their XML files, keeping argument order.
fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CatalogError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(find_xml_files(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Execute the catalog command
pub fn run_catalog(
    config_path: Option<&Path>,
    inputs: &[PathBuf],
    output: Option<&Path>,
    per_document: Option<&Path>,
    keep_going: bool,
) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides::default()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let inputs = if inputs.is_empty() {
        vec![config.paths.xml.clone()]
    } else {
        inputs.to_vec()
    };
    let files = match expand_inputs(&inputs) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if files.is_empty() {
        eprintln!("Error: No XML documents found in {}", display_list(&inputs));
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let report = match build_master(&files, keep_going, per_document) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let output = output.unwrap_or(&config.paths.catalog);
    if let Err(e) = report.catalog.save(output) {
        eprintln!("Error: {}", e);
        return ExitCode::from(EXIT_ERROR);
    }

    for skipped in &report.skipped {
        eprintln!("Warning: skipped {}", skipped);
    }
    eprintln!(
        "Wrote {} entries from {} document(s) to {}",
        report.catalog.len(),
        files.len() - report.skipped.len(),
        output.display()
    );

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the sheets command
pub fn run_sheets(config_path: Option<&Path>, catalog: Option<PathBuf>) -> ExitCode {
    let overrides = CliOverrides {
        catalog,
        ..CliOverrides::default()
    };
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let catalog = match Catalog::load(&config.paths.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!(
                "Error: Cannot load catalog '{}': {}",
                config.paths.catalog.display(),
                e
            );
            return ExitCode::from(EXIT_ERROR);
        }
    };

    for sheet in catalog.required_sheets() {
        println!("{}", sheet);
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn display_list(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
