//! Maps stations to output artifacts and writes payloads verbatim.

use crate::download::error::DownloadError;
use crate::types::time_window::TimeWindow;
use std::path::{Path, PathBuf};

/// Writes one artifact per station under a fixed output directory.
///
/// Paths are keyed by station id and window, so concurrent workers never
/// touch the same file and the sink needs no locking. Writes truncate: a
/// re-run replaces prior artifacts instead of accumulating stale ones. An
/// exhausted fetch produces a zero-byte file on purpose, so failed downloads
/// stay visible to the caller by artifact size.
#[derive(Debug, Clone)]
pub struct OutputSink {
    output_dir: PathBuf,
}

impl OutputSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Deterministic artifact path:
    /// `{output_dir}/{station_id}_{start}_{end}.txt` with `YYYYMMDDHHMM`
    /// window stamps.
    pub fn path_for(&self, station_id: &str, window: &TimeWindow) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.txt", station_id, window.file_stamp()))
    }

    /// Writes `payload` verbatim, replacing any previous artifact.
    pub async fn write(
        &self,
        station_id: &str,
        window: &TimeWindow,
        payload: &str,
    ) -> Result<PathBuf, DownloadError> {
        let path = self.path_for(station_id, window);
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| DownloadError::OutputWrite(path.clone(), e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2022, 1, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2022, 1, 16, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn path_is_keyed_by_station_and_window() {
        let sink = OutputSink::new("/tmp/obs");

        assert_eq!(
            sink.path_for("1V4", &window()),
            PathBuf::from("/tmp/obs/1V4_202201150000_202201160000.txt")
        );
    }

    #[tokio::test]
    async fn writes_payload_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path());

        let path = sink
            .write("AMW", &window(), "station,valid,pres1\nAMW,00:00,29.92\n")
            .await
            .unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents, "station,valid,pres1\nAMW,00:00,29.92\n");
    }

    #[tokio::test]
    async fn empty_payload_leaves_zero_byte_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path());

        let path = sink.write("AMW", &window(), "").await.unwrap();

        assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn rerun_overwrites_prior_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path());

        sink.write("AMW", &window(), "first run").await.unwrap();
        let path = sink.write("AMW", &window(), "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "second");
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().join("nope"));

        let result = sink.write("AMW", &window(), "data").await;

        assert!(matches!(result, Err(DownloadError::OutputWrite(_, _))));
    }
}
