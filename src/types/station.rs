//! Defines the station record extracted from the IEM network metadata documents.

use serde::{Deserialize, Serialize};

/// A single ASOS observing site.
///
/// Stations are collected during a directory build and are immutable from
/// then on. The identifier is unique within its network; the aggregated
/// directory treats it as globally unique and applies no deduplication
/// across networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Short alphanumeric station code as reported by the service
    /// (`properties.sid` in the network geojson).
    pub id: String,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
}

impl Station {
    pub fn new(id: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            id: id.into(),
            longitude,
            latitude,
        }
    }
}
