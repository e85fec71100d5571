mod download;
mod error;
mod mesonet;
mod stations;
mod types;
mod utils;

pub use error::MesonetError;
pub use mesonet::*;

pub use download::orchestrator::{DownloadReport, Orchestrator};
pub use download::retry::{BackoffPolicy, FetchOutcome, FixedBackoff, Retrier};
pub use download::sink::OutputSink;

pub use types::network::Network;
pub use types::station::Station;
pub use types::time_window::TimeWindow;

pub use stations::directory::{DirectoryBuilder, StationDirectory};

pub use download::error::DownloadError;
pub use stations::error::DirectoryError;
