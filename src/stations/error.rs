use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read metadata response body for {0}")]
    BodyRead(String, #[source] reqwest::Error),

    #[error("Failed to parse geojson for network '{network}'")]
    JsonParse {
        network: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed coordinates for station '{station}' in network '{network}'")]
    MalformedCoordinates { network: String, station: String },

    #[error("Failed to write station list '{0}'")]
    CsvWrite(PathBuf, #[source] csv::Error),
}
