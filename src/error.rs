use crate::download::error::DownloadError;
use crate::stations::error::DirectoryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MesonetError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Failed to create output directory '{0}'")]
    OutputDirCreation(PathBuf, #[source] std::io::Error),
}
