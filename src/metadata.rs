// src/metadata.rs

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPoint { latitude, longitude }
    }
}

/// A photo accepted into the run whose trip group is not known yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UngroupedPhoto {
    pub id: String,
    pub source_path: String,
    pub thumbnail_path: String,
    pub position: GeoPoint,
    pub caption: String,
    pub capture_date: String,
    pub camera: String,
}

impl UngroupedPhoto {
    pub fn with_group(self, group: usize) -> PhotoRecord {
        PhotoRecord {
            id: self.id,
            source_path: self.source_path,
            thumbnail_path: self.thumbnail_path,
            latitude: self.position.latitude,
            longitude: self.position.longitude,
            caption: self.caption,
            capture_date: self.capture_date,
            camera: self.camera,
            group,
        }
    }
}

/// One row of the published catalog.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PhotoRecord {
    pub id: String,
    #[serde(rename = "src")]
    pub source_path: String,
    #[serde(rename = "thumb")]
    pub thumbnail_path: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    pub caption: String,
    #[serde(rename = "date")]
    pub capture_date: String,
    pub camera: String,
    pub group: usize,
}

/// Display label for a photo id: `-` and `_` become spaces.
pub fn caption_for(id: &str) -> String {
    id.replace(['-', '_'], " ")
}
