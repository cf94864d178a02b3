//! Icon and infographic command implementations

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use crate::assets::DirAssets;
use crate::catalog::Catalog;
use crate::config::loader::CliOverrides;
use crate::config::QuestcardConfig;
use crate::infographic::Compositor;
use crate::output::save_png;
use crate::quest::QuestEntry;

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

fn load_catalog(config: &QuestcardConfig) -> Result<Catalog, ExitCode> {
    Catalog::load(&config.paths.catalog).map_err(|e| {
        eprintln!("Error: Cannot load catalog '{}': {}", config.paths.catalog.display(), e);
        ExitCode::from(EXIT_ERROR)
    })
}

fn write_png(image: &image::RgbaImage, output: &Path) -> ExitCode {
    match save_png(image, output) {
        Ok(()) => {
            eprintln!("Wrote {} ({}x{})", output.display(), image.width(), image.height());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the icon command
pub fn run_icon(
    config_path: Option<&Path>,
    item: &str,
    output: &Path,
    overrides: CliOverrides,
) -> ExitCode {
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };

    let assets = DirAssets::new(&config.paths);
    let compositor = Compositor::new(&catalog, &assets, &config);
    match compositor.render_item(item) {
        Ok(icon) => write_png(&icon, output),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the render command
pub fn run_render(
    config_path: Option<&Path>,
    input: &Path,
    output: &Path,
    overrides: CliOverrides,
) -> ExitCode {
    let config = match resolve_config(config_path, &overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let contents = match fs::read_to_string(input) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error: Cannot open input file '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let quests = match QuestEntry::list_from_json(&contents) {
        Ok(quests) => quests,
        Err(e) => {
            eprintln!("Error: Invalid quest list '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    if quests.is_empty() {
        eprintln!("Error: No quests in '{}'", input.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(code) => return code,
    };

    for quest in &quests {
        if !config.frequency_options.iter().any(|option| *option == quest.icon) {
            tracing::warn!(
                title = %quest.title,
                icon = %quest.icon,
                "category icon is not a configured frequency option"
            );
        }
    }

    let assets = DirAssets::new(&config.paths);
    let compositor = Compositor::new(&catalog, &assets, &config);
    match compositor.compose_all(&quests) {
        Ok(image) => write_png(&image, output),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
