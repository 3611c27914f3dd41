use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::deposits::DepositError;
use crate::core::io::output::OutputError;
use crate::core::io::vti::VtiError;
use crate::core::models::grid::GridError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to read grid '{path}': {source}")]
    GridRead {
        path: String,
        #[source]
        source: VtiError,
    },

    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Invalid grid: {source}")]
    Grid {
        #[from]
        source: GridError,
    },

    #[error("Failed to read step deposits: {source}")]
    Deposits {
        #[from]
        source: DepositError,
    },

    #[error("Failed to write outputs: {source}")]
    Output {
        #[from]
        source: OutputError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
