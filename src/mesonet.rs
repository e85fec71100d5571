//! This module provides the main entry point for the IEM ASOS bulk download
//! client. It discovers stations across the service's networks and fetches
//! one-minute observation records for each station over a UTC time window,
//! persisting every result to its own file.

use crate::download::orchestrator::{DownloadReport, Orchestrator};
use crate::download::retry::{BackoffPolicy, Retrier};
use crate::download::sink::OutputSink;
use crate::error::MesonetError;
use crate::stations::directory::{DirectoryBuilder, StationDirectory};
use crate::types::network::Network;
use crate::types::station::Station;
use crate::types::time_window::TimeWindow;
use crate::utils::{default_output_dir, ensure_dir_exists};
use bon::bon;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Base URL of the public IEM service.
pub const DEFAULT_BASE_URL: &str = "https://mesonet.agron.iastate.edu";

/// The main client for bulk-downloading ASOS observations.
///
/// The client owns the shared HTTP connection pool, the service base URL,
/// and the output directory; all other knobs are supplied per call through
/// the builder methods. Create one with [`Mesonet::new()`] (writes under
/// `./data`) or [`Mesonet::with_output_dir()`].
///
/// # Examples
///
/// ```no_run
/// # use mesonet::{Mesonet, MesonetError, Network, TimeWindow};
/// # use chrono::{TimeZone, Utc};
/// # async fn run() -> Result<(), MesonetError> {
/// let client = Mesonet::new().await?;
/// let window = TimeWindow::new(
///     Utc.with_ymd_and_hms(2022, 1, 15, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2022, 1, 16, 0, 0, 0).unwrap(),
/// );
///
/// let directory = client
///     .build_directory()
///     .networks(&Network::us_asos())
///     .call()
///     .await?;
///
/// let report = client
///     .download()
///     .stations(directory.stations())
///     .window(window)
///     .call()
///     .await?;
/// println!("{} of {} stations returned data", report.fetched, report.dispatched);
/// # Ok(())
/// # }
/// ```
pub struct Mesonet {
    http: Client,
    base_url: String,
    output_dir: PathBuf,
}

#[bon]
impl Mesonet {
    /// Creates a client writing artifacts under a specific output directory.
    ///
    /// The directory is created if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MesonetError::OutputDirCreation`] if the directory cannot
    /// be created or is shadowed by a regular file.
    pub async fn with_output_dir(output_dir: PathBuf) -> Result<Self, MesonetError> {
        ensure_dir_exists(&output_dir)
            .await
            .map_err(|e| MesonetError::OutputDirCreation(output_dir.clone(), e))?;
        Ok(Self {
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir,
        })
    }

    /// Creates a client using the default `./data` output directory.
    pub async fn new() -> Result<Self, MesonetError> {
        Self::with_output_dir(default_output_dir()).await
    }

    /// Points the client at a different service root, e.g. a mirror or a
    /// local test server. Trailing slashes are trimmed.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builds the station directory for a set of networks.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.networks(&[Network])`: **Required.** Networks to query, e.g.
    ///   [`Network::us_asos()`] or [`Network::all_asos()`].
    /// * `.station_list(PathBuf)`: Optional. Also writes the discovered
    ///   stations as a `station,lon,lat` CSV artifact.
    ///
    /// # Errors
    ///
    /// Returns [`MesonetError::Directory`] if any network's metadata request
    /// or the optional CSV write fails. Metadata requests are not retried;
    /// a single failing network aborts the build.
    #[builder]
    pub async fn build_directory(
        &self,
        networks: &[Network],
        station_list: Option<PathBuf>,
    ) -> Result<StationDirectory, MesonetError> {
        let builder = DirectoryBuilder::new(self.http.clone(), &self.base_url);
        let directory = builder.build(networks).await?;
        if let Some(path) = station_list {
            directory.write_csv(&path).map_err(MesonetError::from)?;
        }
        Ok(directory)
    }

    /// Downloads the observation window for every station, one artifact per
    /// station, and reports how the run went.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.stations(&[Station])`: **Required.** Stations to fetch; they are
    ///   sorted by id before dispatch.
    /// * `.window(TimeWindow)`: **Required.** UTC window shared by all
    ///   requests.
    /// * `.concurrency(usize)`: Optional. Cap on in-flight downloads
    ///   (default 8).
    /// * `.stagger(Duration)`: Optional. Pause between dispatches
    ///   (default 100 ms).
    /// * `.max_attempts(u32)`: Optional. Retry budget per station
    ///   (default 6).
    /// * `.request_timeout(Duration)`: Optional. Bound per attempt
    ///   (default 300 s).
    /// * `.backoff(Arc<dyn BackoffPolicy>)`: Optional. Inter-attempt wait
    ///   policy (default: fixed 5 s).
    /// * `.variable(String)` / `.sample(String)`: Optional. Observation
    ///   variable and sampling interval codes (defaults `pres1` / `1min`).
    /// * `.cancel(CancellationToken)`: Optional. Cooperative shutdown; stops
    ///   further dispatch and cuts in-flight retries short.
    ///
    /// # Errors
    ///
    /// Returns [`MesonetError::Download`] only for run-level faults (a
    /// worker task failing to join). Per-station trouble never fails the
    /// run: an exhausted station leaves a zero-byte artifact and a write
    /// failure is counted in the report.
    #[builder]
    pub async fn download(
        &self,
        stations: &[Station],
        window: TimeWindow,
        concurrency: Option<usize>,
        stagger: Option<Duration>,
        max_attempts: Option<u32>,
        request_timeout: Option<Duration>,
        backoff: Option<Arc<dyn BackoffPolicy>>,
        variable: Option<String>,
        sample: Option<String>,
        cancel: Option<CancellationToken>,
    ) -> Result<DownloadReport, MesonetError> {
        let mut retrier = Retrier::new(self.http.clone());
        if let Some(n) = max_attempts {
            retrier = retrier.with_max_attempts(n);
        }
        if let Some(t) = request_timeout {
            retrier = retrier.with_request_timeout(t);
        }
        if let Some(policy) = backoff {
            retrier = retrier.with_backoff(policy);
        }

        let sink = OutputSink::new(self.output_dir.clone());
        let mut orchestrator = Orchestrator::new(retrier, sink, &self.base_url);
        if let Some(limit) = concurrency {
            orchestrator = orchestrator.with_concurrency(limit);
        }
        if let Some(pause) = stagger {
            orchestrator = orchestrator.with_stagger(pause);
        }
        if let Some(var) = variable {
            orchestrator = orchestrator.with_variable(var);
        }
        if let Some(code) = sample {
            orchestrator = orchestrator.with_sample(code);
        }

        let cancel = cancel.unwrap_or_default();
        let report = orchestrator.run(stations, &window, &cancel).await?;
        Ok(report)
    }

    /// Convenience pipeline: builds the directory for `networks`, then
    /// downloads `window` for every discovered station.
    ///
    /// This method uses a builder pattern; see [`Mesonet::build_directory`]
    /// and [`Mesonet::download`] for the individual halves and their
    /// optional arguments.
    #[builder]
    pub async fn run(
        &self,
        networks: &[Network],
        window: TimeWindow,
        station_list: Option<PathBuf>,
        concurrency: Option<usize>,
        cancel: Option<CancellationToken>,
    ) -> Result<DownloadReport, MesonetError> {
        let directory = self
            .build_directory()
            .networks(networks)
            .maybe_station_list(station_list)
            .call()
            .await?;

        self.download()
            .stations(directory.stations())
            .window(window)
            .maybe_concurrency(concurrency)
            .maybe_cancel(cancel)
            .call()
            .await
    }
}
