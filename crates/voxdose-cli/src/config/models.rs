use std::path::PathBuf;
use voxdose::engine::setup::Setup;

/// Fully resolved inputs of one command invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub setup_path: PathBuf,
    pub setup: Setup,
    pub output_prefix: PathBuf,
}
