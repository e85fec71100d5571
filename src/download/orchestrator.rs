//! Concurrent per-station dispatch of observation downloads.

use crate::download::error::DownloadError;
use crate::download::retry::Retrier;
use crate::download::sink::OutputSink;
use crate::types::station::Station;
use crate::types::time_window::TimeWindow;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Cap on in-flight station downloads. The upstream service rate-limits
/// aggressively, so one worker per station with no bound would mostly buy
/// retries, not throughput.
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Pause between successive dispatches, smearing the initial request burst.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

const DEFAULT_VARIABLE: &str = "pres1";
const DEFAULT_SAMPLE: &str = "1min";

/// Summary of one orchestration run.
///
/// Per-station success is also observable from the artifacts themselves: an
/// exhausted fetch leaves a zero-byte file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Tasks dispatched. Equals the station count unless the run was
    /// cancelled before every station could be started.
    pub dispatched: usize,
    /// Stations whose fetch returned a body.
    pub fetched: usize,
    /// Stations whose retry budget ran out (zero-byte artifact written).
    pub exhausted: usize,
    /// Stations whose artifact could not be written.
    pub write_failures: usize,
}

enum TaskOutcome {
    Fetched,
    Exhausted,
    WriteFailed,
}

/// Fans one download task out per station, bounded by a semaphore.
///
/// Stations are sorted by id before dispatch so the start order (and the
/// artifact naming it drives) is reproducible; completion order is
/// unspecified. One station's exhausted fetch or failed write never blocks
/// or aborts its siblings.
pub struct Orchestrator {
    retrier: Retrier,
    sink: OutputSink,
    base_url: String,
    variable: String,
    sample: String,
    concurrency: usize,
    stagger: Duration,
}

impl Orchestrator {
    pub fn new(retrier: Retrier, sink: OutputSink, base_url: impl Into<String>) -> Self {
        Self {
            retrier,
            sink,
            base_url: base_url.into(),
            variable: DEFAULT_VARIABLE.to_string(),
            sample: DEFAULT_SAMPLE.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            stagger: DEFAULT_STAGGER,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Observation variable requested per station, `pres1` (station
    /// pressure) by default. One variable per run.
    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    /// Sampling interval code sent to the service, `1min` by default.
    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = sample.into();
        self
    }

    /// Downloads the window for every station and persists each result to
    /// its own artifact, returning once all dispatched tasks finished.
    pub async fn run(
        &self,
        stations: &[Station],
        window: &TimeWindow,
        cancel: &CancellationToken,
    ) -> Result<DownloadReport, DownloadError> {
        let mut ordered: Vec<Station> = stations.to_vec();
        ordered.sort_by(|a, b| a.id.cmp(&b.id));

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
        let mut report = DownloadReport::default();

        let total = ordered.len();
        for (position, station) in ordered.into_iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(
                    "Run cancelled; skipping dispatch of {} remaining stations",
                    total - position
                );
                break;
            }

            tasks.spawn(self.station_task(station, window, &semaphore, cancel));
            report.dispatched += 1;

            if position + 1 < total {
                tokio::time::sleep(self.stagger).await;
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined? {
                TaskOutcome::Fetched => report.fetched += 1,
                TaskOutcome::Exhausted => report.exhausted += 1,
                TaskOutcome::WriteFailed => report.write_failures += 1,
            }
        }

        info!(
            "Run complete: {} dispatched, {} fetched, {} exhausted, {} write failures",
            report.dispatched, report.fetched, report.exhausted, report.write_failures
        );
        Ok(report)
    }

    /// Builds the future for one station's download. Each task owns its
    /// inputs outright; workers share nothing mutable beyond the semaphore.
    fn station_task(
        &self,
        station: Station,
        window: &TimeWindow,
        semaphore: &Arc<Semaphore>,
        cancel: &CancellationToken,
    ) -> impl std::future::Future<Output = TaskOutcome> + Send + 'static {
        let uri = self.observation_uri(&station.id, window);
        let retrier = self.retrier.clone();
        let sink = self.sink.clone();
        let semaphore = Arc::clone(semaphore);
        let cancel = cancel.clone();
        let window = *window;

        async move {
            // The semaphore is never closed while a run is in flight; if it
            // ever were, running unbounded is still preferable to dropping
            // the station without an artifact.
            let _permit = semaphore.acquire_owned().await.ok();

            info!("Downloading station {}", station.id);
            let outcome = retrier.fetch(&uri, &cancel).await;
            let exhausted = outcome.is_exhausted();

            match sink.write(&station.id, &window, &outcome.into_text()).await {
                Ok(path) => {
                    if exhausted {
                        warn!(
                            "Station {}: no data retrieved, wrote empty {}",
                            station.id,
                            path.display()
                        );
                        TaskOutcome::Exhausted
                    } else {
                        info!("Station {}: wrote {}", station.id, path.display());
                        TaskOutcome::Fetched
                    }
                }
                Err(e) => {
                    error!("Station {}: failed to persist result: {e}", station.id);
                    TaskOutcome::WriteFailed
                }
            }
        }
    }

    /// Builds the `1min_dl` request for one station. The bracketed parameter
    /// names are pre-encoded exactly as the service publishes them.
    fn observation_uri(&self, station_id: &str, window: &TimeWindow) -> String {
        format!(
            "{}/request/asos/1min_dl.php?station%5B%5D={}&tz=UTC&{}&vars%5B%5D={}&sample={}&what=view&delim=comma&gis=yes",
            self.base_url,
            station_id,
            window.query_fragment(),
            self.variable,
            self.sample,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::retry::FixedBackoff;
    use chrono::{TimeZone, Utc};
    use reqwest::Client;
    use std::path::Path;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OBS_PATH: &str = "/request/asos/1min_dl.php";

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2022, 1, 15, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2022, 1, 16, 0, 0, 0).unwrap(),
        )
    }

    fn orchestrator(server: &MockServer, out_dir: &Path) -> Orchestrator {
        let retrier = Retrier::new(Client::new())
            .with_backoff(std::sync::Arc::new(FixedBackoff::new(Duration::ZERO)));
        Orchestrator::new(retrier, OutputSink::new(out_dir), server.uri())
            .with_stagger(Duration::ZERO)
    }

    fn stations(ids: &[&str]) -> Vec<Station> {
        ids.iter().map(|id| Station::new(*id, 0.0, 0.0)).collect()
    }

    async fn mount_ok(server: &MockServer, body: &str) {
        Mock::given(method("GET"))
            .and(path(OBS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn produces_one_artifact_per_station() {
        let server = MockServer::start().await;
        mount_ok(&server, "station,valid,pres1").await;
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&server, dir.path())
            .run(&stations(&["AMW", "DSM", "1V4"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.dispatched, 3);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.exhausted, 0);
        for id in ["AMW", "DSM", "1V4"] {
            let artifact = dir
                .path()
                .join(format!("{id}_202201150000_202201160000.txt"));
            assert!(artifact.is_file(), "missing artifact for {id}");
        }
    }

    #[tokio::test]
    async fn dispatches_in_lexicographic_station_order() {
        let server = MockServer::start().await;
        mount_ok(&server, "data").await;
        let dir = tempfile::tempdir().unwrap();

        // A single worker plus a real stagger keeps the start order
        // observable at the mock server.
        orchestrator(&server, dir.path())
            .with_concurrency(1)
            .with_stagger(Duration::from_millis(25))
            .run(&stations(&["ZZZ1", "AAA2"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let ids: Vec<String> = requests
            .iter()
            .map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "station[]")
                    .map(|(_, v)| v.to_string())
                    .unwrap()
            })
            .collect();
        assert_eq!(ids, ["AAA2", "ZZZ1"]);
    }

    #[tokio::test]
    async fn request_carries_window_and_format_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(OBS_PATH))
            .and(query_param("station[]", "AMW"))
            .and(query_param("tz", "UTC"))
            .and(query_param("year1", "2022"))
            .and(query_param("month1", "01"))
            .and(query_param("day1", "15"))
            .and(query_param("day2", "16"))
            .and(query_param("vars[]", "pres1"))
            .and(query_param("sample", "1min"))
            .and(query_param("what", "view"))
            .and(query_param("delim", "comma"))
            .and(query_param("gis", "yes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("data"))
            .expect(1)
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&server, dir.path())
            .run(&stations(&["AMW"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.fetched, 1);
    }

    #[tokio::test]
    async fn exhausted_station_leaves_zero_byte_artifact() {
        let server = MockServer::start().await;
        mount_ok(&server, "ERROR: rate limited").await;
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&server, dir.path())
            .run(&stations(&["AMW"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.exhausted, 1);
        assert_eq!(report.fetched, 0);
        let artifact = dir.path().join("AMW_202201150000_202201160000.txt");
        assert_eq!(std::fs::metadata(artifact).unwrap().len(), 0);
        // 6 attempts for the single station.
        assert_eq!(server.received_requests().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn one_failing_station_does_not_block_the_others() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(OBS_PATH))
            .and(query_param("station[]", "BAD"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ERROR: no such station"))
            .mount(&server)
            .await;
        mount_ok(&server, "good data").await;
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&server, dir.path())
            .run(&stations(&["BAD", "FIN", "OK1"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.dispatched, 3);
        assert_eq!(report.fetched, 2);
        assert_eq!(report.exhausted, 1);
        let bad = dir.path().join("BAD_202201150000_202201160000.txt");
        let fin = dir.path().join("FIN_202201150000_202201160000.txt");
        assert_eq!(std::fs::metadata(bad).unwrap().len(), 0);
        assert_eq!(std::fs::read_to_string(fin).unwrap(), "good data");
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_artifacts() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        mount_ok(&server, "first run").await;
        orchestrator(&server, dir.path())
            .run(&stations(&["AMW"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        server.reset().await;
        mount_ok(&server, "second run").await;
        orchestrator(&server, dir.path())
            .run(&stations(&["AMW"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        let artifact = dir.path().join("AMW_202201150000_202201160000.txt");
        assert_eq!(std::fs::read_to_string(artifact).unwrap(), "second run");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn write_failure_is_isolated_and_reported() {
        let server = MockServer::start().await;
        mount_ok(&server, "data").await;
        let dir = tempfile::tempdir().unwrap();
        let retrier = Retrier::new(Client::new())
            .with_backoff(std::sync::Arc::new(FixedBackoff::new(Duration::ZERO)));
        // Output directory does not exist, so every write fails.
        let orchestrator = Orchestrator::new(
            retrier,
            OutputSink::new(dir.path().join("missing")),
            server.uri(),
        )
        .with_stagger(Duration::ZERO);

        let report = orchestrator
            .run(&stations(&["AMW", "DSM"]), &window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.write_failures, 2);
        assert_eq!(report.fetched, 0);
    }

    #[tokio::test]
    async fn cancelled_token_stops_further_dispatch() {
        let server = MockServer::start().await;
        mount_ok(&server, "data").await;
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = orchestrator(&server, dir.path())
            .run(&stations(&["AMW", "DSM"]), &window(), &cancel)
            .await
            .unwrap();

        assert_eq!(report.dispatched, 0);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_station_list_completes_immediately() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let report = orchestrator(&server, dir.path())
            .run(&[], &window(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report, DownloadReport::default());
    }
}
