//! Rapports de lecture (JSON)
//!
//! Les lecteurs découvrent le point d'entrée des rapports via `/manifest`,
//! puis envoient régulièrement leur position sur `.../report/timePlayed`.
//! La réponse fixe l'intervalle entre deux rapports.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version du schéma du manifeste
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0";

/// Chemin du point d'entrée des rapports
pub const REPORT_PATH: &str = "/playback/v2.1/report";

/// Chemin des rapports de position
pub const TIME_PLAYED_PATH: &str = "/playback/v2.1/report/timePlayed";

/// Réponse de `GET /manifest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: String,
    pub endpoints: Vec<ManifestEndpoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEndpoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
}

impl Manifest {
    /// Manifeste annonçant le point d'entrée des rapports sous `public_url`
    pub fn reporting(public_url: &str) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            endpoints: vec![ManifestEndpoint {
                kind: "reporting".to_string(),
                uri: format!("{}{}", public_url.trim_end_matches('/'), REPORT_PATH),
            }],
        }
    }
}

/// Corps de `POST .../report/timePlayed`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimePlayedReport {
    #[serde(default)]
    pub items: Vec<TimePlayedItem>,
}

/// Position d'une piste rapportée par un lecteur
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePlayedItem {
    /// Identifiant du livre
    #[serde(default)]
    pub container_id: Option<String>,
    /// Identifiant de la piste (`{item}/file/{part}`)
    pub object_id: String,
    #[serde(default)]
    pub position_millis: u64,
}

/// Réponse de `POST .../report/timePlayed`
///
/// Seul `reports` est interprété par les lecteurs, les autres champs doivent
/// être présents mais vides.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePlayedResponse {
    pub context_version: String,
    pub queue_version: String,
    pub container: Map<String, Value>,
    pub playback_policies: Map<String, Value>,
    pub reports: ReportsPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsPolicy {
    pub periodic_interval_millis: u64,
}

impl TimePlayedResponse {
    pub fn with_interval(periodic_interval_millis: u64) -> Self {
        Self {
            context_version: String::new(),
            queue_version: String::new(),
            container: Map::new(),
            playback_policies: Map::new(),
            reports: ReportsPolicy {
                periodic_interval_millis,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manifest_json() {
        let manifest = Manifest::reporting("https://bridge.example.com/");
        assert_eq!(
            serde_json::to_value(&manifest).unwrap(),
            json!({
                "schemaVersion": "1.0",
                "endpoints": [{
                    "type": "reporting",
                    "uri": "https://bridge.example.com/playback/v2.1/report"
                }]
            })
        );
    }

    #[test]
    fn test_time_played_report() {
        let report: TimePlayedReport = serde_json::from_value(json!({
            "items": [{
                "containerId": "li_1",
                "objectId": "li_1/file/102",
                "positionMillis": 50000,
                "durationPlayedMillis": 10000,
                "type": "update"
            }]
        }))
        .unwrap();

        assert_eq!(report.items.len(), 1);
        assert_eq!(report.items[0].container_id.as_deref(), Some("li_1"));
        assert_eq!(report.items[0].object_id, "li_1/file/102");
        assert_eq!(report.items[0].position_millis, 50000);
    }

    #[test]
    fn test_time_played_response_json() {
        assert_eq!(
            serde_json::to_value(TimePlayedResponse::with_interval(10_000)).unwrap(),
            json!({
                "contextVersion": "",
                "queueVersion": "",
                "container": {},
                "playbackPolicies": {},
                "reports": {"periodicIntervalMillis": 10000}
            })
        );
    }
}
