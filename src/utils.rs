use log::info;
use std::io;
use std::path::{Path, PathBuf};

const OUTPUT_DIR_NAME: &str = "data";

pub(crate) fn default_output_dir() -> PathBuf {
    PathBuf::from(OUTPUT_DIR_NAME)
}

pub(crate) async fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating output directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");

        ensure_dir_exists(&target).await.unwrap();

        assert!(target.is_dir());
    }

    #[tokio::test]
    async fn accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();

        ensure_dir_exists(dir.path()).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        tokio::fs::write(&file, "x").await.unwrap();

        let result = ensure_dir_exists(&file).await;

        assert!(result.is_err());
    }
}
