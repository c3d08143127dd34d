//! Typed metric snapshots
//!
//! These records are both what the dashboard server serializes on its
//! `/api/admin/system/*` endpoints and what the monitor decodes from them.
//! Values a collector could not read are rendered as `"N/A"` on the wire and
//! are `None` here, so an unavailable metric never reads as zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current local time in RFC 3339
pub fn timestamp_now() -> String {
    chrono::Local::now().to_rfc3339()
}

/// Disk usage snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskSnapshot {
    /// Total capacity, e.g. `"457.9 GB"`
    pub total: String,
    /// Used space
    pub used: String,
    /// Free space
    pub free: String,
    /// Used / total, 0-100, one decimal
    pub usage_percent: f64,
    /// Sizes of pool components (database, node data, logs, backups)
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Memory usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    /// e.g. `"15934 MB"`
    pub total: String,
    pub used: String,
    pub usage_percent: f64,
}

/// 1/5/15 minute load averages as reported by the kernel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    #[serde(rename = "1min")]
    pub one: String,
    #[serde(rename = "5min")]
    pub five: String,
    #[serde(rename = "15min")]
    pub fifteen: String,
}

/// CPU, memory and load snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    /// CPU busy percent
    #[serde(default, with = "na")]
    pub cpu_usage: Option<f64>,
    #[serde(default, with = "na")]
    pub memory: Option<MemoryUsage>,
    #[serde(default, with = "na")]
    pub load_average: Option<LoadAverage>,
    #[serde(default)]
    pub network_available: bool,
}

/// Envelope of the performance endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub metrics: PerformanceSnapshot,
    #[serde(default)]
    pub timestamp: String,
}

/// Pool API reachability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolStatus {
    /// Answered 200
    Online,
    /// Answered with another status code
    HttpStatus(u16),
    /// Could not be reached at all
    Unreachable(String),
}

impl PoolStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

/// One row of `docker stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerStats {
    pub container: String,
    pub name: String,
    pub cpu: String,
    pub memory: String,
    pub net: String,
    pub block: String,
}

/// Envelope of the docker endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DockerReport {
    pub containers: Vec<ContainerStats>,
    pub timestamp: String,
}

/// PostgreSQL table sizes, or why they could not be read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostgresSizes {
    Tables {
        tables: BTreeMap<String, String>,
        total: String,
    },
    Error {
        error: String,
    },
}

/// Detailed component sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSizes {
    pub postgresql: PostgresSizes,
    #[serde(default, with = "na")]
    pub docker_volumes: Option<String>,
}

/// Envelope of the components endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentsReport {
    pub components: ComponentSizes,
    pub timestamp: String,
}

/// Serde adapter for optional values rendered as `"N/A"` when absent
///
/// On input, `null`, a missing field, or any value that does not decode as
/// `T` (such as the `"N/A"` marker) becomes `None`.
pub mod na {
    use serde::de::IgnoredAny;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub const NOT_AVAILABLE: &str = "N/A";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Value(T),
        Other(IgnoredAny),
    }

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_str(NOT_AVAILABLE),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        match Option::<Field<T>>::deserialize(deserializer)? {
            Some(Field::Value(v)) => Ok(Some(v)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_performance_not_available_is_none() {
        let json = r#"{"cpuUsage":"N/A","memory":"N/A","loadAverage":"N/A","networkAvailable":false}"#;
        let snapshot: PerformanceSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.cpu_usage, None);
        assert_eq!(snapshot.memory, None);
        assert_eq!(snapshot.load_average, None);
    }

    #[test]
    fn test_performance_zero_is_not_unavailable() {
        let json = r#"{"cpuUsage":0.0,"memory":{"total":"100 MB","used":"0 MB","usagePercent":0.0}}"#;
        let snapshot: PerformanceSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.cpu_usage, Some(0.0));
        assert_eq!(snapshot.memory.unwrap().usage_percent, 0.0);
    }

    #[test]
    fn test_performance_serializes_missing_as_na() {
        let snapshot = PerformanceSnapshot {
            cpu_usage: Some(12.5),
            ..Default::default()
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["cpuUsage"], 12.5);
        assert_eq!(value["memory"], "N/A");
        assert_eq!(value["loadAverage"], "N/A");
    }

    #[test]
    fn test_disk_snapshot_wire_names() {
        let json = r#"{"total":"100.0 GB","used":"85.0 GB","free":"15.0 GB","usagePercent":85.0}"#;
        let disk: DiskSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(disk.usage_percent, 85.0);
        assert!(disk.components.is_empty());
    }

    #[test]
    fn test_load_average_keys() {
        let load = LoadAverage {
            one: "0.52".to_string(),
            five: "0.48".to_string(),
            fifteen: "0.40".to_string(),
        };
        let value = serde_json::to_value(&load).unwrap();
        assert_eq!(value["1min"], "0.52");
        assert_eq!(value["15min"], "0.40");
    }

    #[test]
    fn test_postgres_sizes_untagged() {
        let err = PostgresSizes::Error {
            error: "Unable to fetch".to_string(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value, serde_json::json!({"error": "Unable to fetch"}));
    }
}
