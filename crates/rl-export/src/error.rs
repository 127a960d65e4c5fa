use thiserror::Error;

use rl_directory::DirectoryError;
use rl_model::ModelError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("write output: {0}")]
    Csv(#[from] csv::Error),
    #[error("write output: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("resolve list {uri}: {source}")]
    Resolve {
        uri: String,
        #[source]
        source: ModelError,
    },
}
