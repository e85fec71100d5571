//! Builds the aggregate station directory by querying network metadata.
//!
//! A build issues one geojson request per network and appends that network's
//! stations in feature order. Metadata requests are not retried: a failing
//! network aborts the whole build, since a partial directory would silently
//! shrink the download set downstream.

use crate::stations::error::DirectoryError;
use crate::types::network::Network;
use crate::types::station::Station;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use log::info;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

/// How many metadata requests may be in flight at once. Responses are
/// appended in network order regardless of completion order, so the
/// directory layout stays deterministic.
const METADATA_CONCURRENCY: usize = 4;

#[derive(Debug, Deserialize)]
struct NetworkGeoJson {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    // [lon, lat], sometimes with a trailing elevation element.
    coordinates: Vec<f64>,
}

/// An ordered snapshot of stations aggregated across networks.
///
/// Order is network iteration order, then per-network feature order.
/// Duplicate station ids across networks are preserved as-is; callers that
/// need a unique set must dedupe themselves.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: Vec<Station>,
}

impl StationDirectory {
    pub fn from_stations(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn into_stations(self) -> Vec<Station> {
        self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Writes the directory as a `station,lon,lat` table for reuse or audit.
    ///
    /// The artifact is a side effect; downstream orchestration never reads
    /// it back.
    pub fn write_csv(&self, path: &Path) -> Result<(), DirectoryError> {
        let to_err = |e: csv::Error| DirectoryError::CsvWrite(path.to_path_buf(), e);

        let mut writer = csv::Writer::from_path(path).map_err(to_err)?;
        writer.write_record(["station", "lon", "lat"]).map_err(to_err)?;
        for station in &self.stations {
            writer
                .write_record([
                    station.id.as_str(),
                    &station.longitude.to_string(),
                    &station.latitude.to_string(),
                ])
                .map_err(to_err)?;
        }
        writer
            .flush()
            .map_err(|e| DirectoryError::CsvWrite(path.to_path_buf(), csv::Error::from(e)))?;
        info!(
            "Wrote station list ({} rows) to {}",
            self.stations.len(),
            path.display()
        );
        Ok(())
    }
}

/// Queries the fixed-template metadata endpoint for each network and
/// aggregates the discovered stations.
pub struct DirectoryBuilder {
    http: Client,
    base_url: String,
}

impl DirectoryBuilder {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetches every network's geojson document and collects the stations,
    /// preserving network-then-feature order. Any network failure aborts
    /// the build.
    pub async fn build(&self, networks: &[Network]) -> Result<StationDirectory, DirectoryError> {
        let per_network: Vec<Vec<Station>> = stream::iter(networks)
            .map(|network| self.fetch_network(network))
            .buffered(METADATA_CONCURRENCY)
            .try_collect()
            .await?;

        let stations: Vec<Station> = per_network.into_iter().flatten().collect();
        info!(
            "Built station directory: {} stations across {} networks",
            stations.len(),
            networks.len()
        );
        Ok(StationDirectory { stations })
    }

    async fn fetch_network(&self, network: &Network) -> Result<Vec<Station>, DirectoryError> {
        let url = format!("{}/geojson/network/{}.geojson", self.base_url, network);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::NetworkRequest(url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(if let Some(status) = e.status() {
                    DirectoryError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    DirectoryError::NetworkRequest(url, e)
                });
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| DirectoryError::BodyRead(url, e))?;
        let parsed: NetworkGeoJson =
            serde_json::from_str(&body).map_err(|source| DirectoryError::JsonParse {
                network: network.to_string(),
                source,
            })?;

        let mut stations = Vec::with_capacity(parsed.features.len());
        for feature in parsed.features {
            let coords = &feature.geometry.coordinates;
            if coords.len() < 2 {
                return Err(DirectoryError::MalformedCoordinates {
                    network: network.to_string(),
                    station: feature.properties.sid,
                });
            }
            stations.push(Station::new(feature.properties.sid, coords[0], coords[1]));
        }
        info!("Network {}: {} stations", network, stations.len());
        Ok(stations)
    }
}
