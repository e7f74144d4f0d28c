//! Response types returned by the client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Successful conversion, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Human-readable summary, e.g. "PDF converted to Word successfully".
    pub message: String,
    /// Server-relative download path, e.g. `/download/<filename>`.
    pub download_url: String,
    /// Download locator: pass to
    /// [`crate::client::ConversionClient::download_file`]. The backend deletes
    /// it after its retention window.
    pub filename: String,
    /// Number of rendered pages; only present for `pdf-to-images`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_count: Option<u32>,
}

/// Backend liveness snapshot from `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    /// Availability of each backend conversion library.
    #[serde(default)]
    pub dependencies: BTreeMap<String, bool>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }

    /// Names of dependencies the backend reports as missing, sorted.
    pub fn unavailable_dependencies(&self) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Connectivity diagnostics that never fail to produce.
///
/// Returned by [`crate::client::ConversionClient::api_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    pub reachable: bool,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthStatus>,
}
