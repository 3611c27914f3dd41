use super::defaults::{DefaultsConfig, OutputKind, SetupLocation};
use super::models::AppConfig;
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use voxdose::engine::setup::Setup;

/// Paths and defaults a command hands to [`build_config`].
pub struct CommandPaths<'a> {
    pub input: &'a Path,
    pub setup: Option<&'a Path>,
    pub output_prefix: Option<&'a Path>,
    pub setup_location: SetupLocation,
    pub output_kind: OutputKind,
}

pub fn build_config(paths: CommandPaths, search_dirs: &[PathBuf]) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let input_path = resolve_input(paths.input, search_dirs)?;

    let setup_path = paths
        .setup
        .map(Path::to_path_buf)
        .unwrap_or_else(|| defaults.setup_path(paths.setup_location));
    debug!("Loading setup record from {:?}", setup_path);
    let setup = Setup::load(&setup_path).map_err(|e| CliError::Setup {
        path: setup_path.clone(),
        source: e,
    })?;

    let output_prefix = paths
        .output_prefix
        .map(Path::to_path_buf)
        .unwrap_or_else(|| defaults.output_prefix(paths.output_kind));

    Ok(AppConfig {
        input_path,
        setup_path,
        setup,
        output_prefix,
    })
}

/// The given path followed by the same relative path under each search directory.
pub fn input_candidates(input: &Path, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates = vec![input.to_path_buf()];
    if input.is_relative() {
        candidates.extend(search_dirs.iter().map(|dir| dir.join(input)));
    }
    candidates
}

/// Returns the first existing candidate, noting on the console when it is not the given path.
pub fn resolve_input(input: &Path, search_dirs: &[PathBuf]) -> Result<PathBuf> {
    let candidates = input_candidates(input, search_dirs);
    let Some(position) = candidates.iter().position(|c| c.is_file()) else {
        return Err(CliError::InputNotFound { candidates });
    };
    let found = candidates[position].clone();
    if position > 0 {
        info!("Input {:?} not found; using {:?}", input, found);
        println!("Using input from {}", found.display());
    }
    Ok(found)
}
