use std::path::PathBuf;
use thiserror::Error;
use voxdose::engine::config::ConfigError;
use voxdose::engine::error::EngineError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EngineError),

    #[error("Setup error in '{path}': {source}", path = path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("Input file not found; tried {}", format_candidates(.candidates))]
    InputNotFound { candidates: Vec<PathBuf> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}
