//! Host statistics collected from system commands
//!
//! Each collector shells out with a deadline. Values that cannot be read are
//! reported as unavailable rather than failing the whole snapshot, except
//! where the snapshot is meaningless without them (disk totals, docker).

use super::command::run_command;
use super::types::{
    timestamp_now, ComponentSizes, ComponentsReport, ContainerStats, DiskSnapshot, DockerReport,
    LoadAverage, MemoryUsage, PerformanceReport, PerformanceSnapshot, PostgresSizes,
};
use crate::config::CollectorsConfig;
use crate::error::MetricsError;
use std::collections::BTreeMap;
use std::path::Path;

const NOT_AVAILABLE: &str = super::types::na::NOT_AVAILABLE;

const DOCKER_STATS_FORMAT: &str = r#"{"container":"{{.Container}}","name":"{{.Name}}","cpu":"{{.CPUPerc}}","memory":"{{.MemUsage}}","net":"{{.NetIO}}","block":"{{.BlockIO}}"}"#;

const TABLE_SIZES_QUERY: &str = "SELECT tablename, pg_size_pretty(pg_total_relation_size(schemaname||'.'||tablename)) \
     FROM pg_tables WHERE schemaname = 'public' \
     ORDER BY pg_total_relation_size(schemaname||'.'||tablename) DESC LIMIT 10;";

/// Filesystem usage in 1 KiB blocks, as reported by `df -Pk`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DfUsage {
    pub total_kb: u64,
    pub used_kb: u64,
    pub available_kb: u64,
}

impl DfUsage {
    fn usage_percent(&self) -> f64 {
        if self.total_kb == 0 {
            return 0.0;
        }
        round1(self.used_kb as f64 / self.total_kb as f64 * 100.0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_gb(kb: u64) -> String {
    format!("{:.1} GB", kb as f64 / (1024.0 * 1024.0))
}

/// Parse the data line of `df -Pk <path>`
pub(crate) fn parse_df(output: &str) -> Result<DfUsage, MetricsError> {
    let line = output
        .lines()
        .nth(1)
        .ok_or_else(|| MetricsError::Parse("df: no data line".to_string()))?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(MetricsError::Parse(format!("df: unexpected line '{}'", line)));
    }

    let field = |i: usize| {
        fields[i]
            .parse::<u64>()
            .map_err(|e| MetricsError::Parse(format!("df: '{}': {}", fields[i], e)))
    };

    Ok(DfUsage {
        total_kb: field(1)?,
        used_kb: field(2)?,
        available_kb: field(3)?,
    })
}

/// CPU busy percent from the `Cpu(s)` line of `top -bn1`
pub(crate) fn parse_top_cpu(output: &str) -> Option<f64> {
    let line = output.lines().find(|l| l.contains("Cpu(s)"))?;
    let idle = line
        .split(',')
        .find(|part| part.contains("id"))?
        .split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()?;
    Some(round1(100.0 - idle))
}

/// Memory usage from `free -m`
pub(crate) fn parse_free(output: &str) -> Option<MemoryUsage> {
    let fields: Vec<&str> = output.lines().nth(1)?.split_whitespace().collect();
    let total: u64 = fields.get(1)?.parse().ok()?;
    let used: u64 = fields.get(2)?.parse().ok()?;
    if total == 0 {
        return None;
    }
    Some(MemoryUsage {
        total: format!("{} MB", total),
        used: format!("{} MB", used),
        usage_percent: round1(used as f64 / total as f64 * 100.0),
    })
}

/// First three fields of `/proc/loadavg`
pub(crate) fn parse_loadavg(contents: &str) -> Option<LoadAverage> {
    let mut fields = contents.split_whitespace();
    Some(LoadAverage {
        one: fields.next()?.to_string(),
        five: fields.next()?.to_string(),
        fifteen: fields.next()?.to_string(),
    })
}

/// One JSON object per line; lines that do not decode are skipped
pub(crate) fn parse_docker_stats(output: &str) -> Vec<ContainerStats> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect()
}

/// `name | size` rows from `psql -t`
pub(crate) fn parse_table_sizes(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (name, size) = line.split_once('|')?;
            if size.contains('|') {
                return None;
            }
            Some((name.trim().to_string(), size.trim().to_string()))
        })
        .collect()
}

/// Collects host statistics for the dashboard's system endpoints
#[derive(Debug, Clone)]
pub struct SystemCollector {
    config: CollectorsConfig,
}

impl SystemCollector {
    pub fn new(config: CollectorsConfig) -> Self {
        Self { config }
    }

    /// Filesystem usage plus the size of each pool component
    pub async fn disk(&self) -> Result<DiskSnapshot, MetricsError> {
        let root = self.config.disk_root.display().to_string();
        let output = run_command("df", &["-Pk", &root], self.config.command_timeout()).await?;
        let usage = parse_df(&output)?;

        let mut components = BTreeMap::new();
        components.insert(
            "postgresql".to_string(),
            self.database_size()
                .await
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        );
        components.insert(
            "ergoNode".to_string(),
            self.dir_size(&self.config.node_data_dir, NOT_AVAILABLE).await,
        );
        components.insert(
            "logs".to_string(),
            self.dir_size(&self.config.logs_dir, NOT_AVAILABLE).await,
        );
        components.insert(
            "backups".to_string(),
            self.dir_size(&self.config.backups_dir, "0B").await,
        );

        Ok(DiskSnapshot {
            total: format_gb(usage.total_kb),
            used: format_gb(usage.used_kb),
            free: format_gb(usage.available_kb),
            usage_percent: usage.usage_percent(),
            components,
            timestamp: timestamp_now(),
        })
    }

    /// PostgreSQL table sizes and docker volume usage
    pub async fn components(&self) -> ComponentsReport {
        let postgresql = match self.psql(TABLE_SIZES_QUERY).await {
            Some(output) => PostgresSizes::Tables {
                tables: parse_table_sizes(&output),
                total: "See disk info".to_string(),
            },
            None => PostgresSizes::Error {
                error: "Unable to fetch".to_string(),
            },
        };

        let docker_volumes = run_command(
            "docker",
            &["system", "df", "-v", "--format", "{{json .}}"],
            self.config.slow_command_timeout(),
        )
        .await
        .map_err(|e| log::debug!("docker system df: {}", e))
        .ok()
        .map(|out| out.trim().to_string())
        .filter(|out| !out.is_empty());

        ComponentsReport {
            components: ComponentSizes {
                postgresql,
                docker_volumes,
            },
            timestamp: timestamp_now(),
        }
    }

    /// CPU, memory, load average and network availability
    pub async fn performance(&self) -> PerformanceReport {
        let timeout = self.config.command_timeout();

        let cpu_usage = match run_command("top", &["-bn1"], timeout).await {
            Ok(out) => parse_top_cpu(&out),
            Err(e) => {
                log::debug!("cpu usage unavailable: {}", e);
                None
            }
        };

        let memory = match run_command("free", &["-m"], timeout).await {
            Ok(out) => parse_free(&out),
            Err(e) => {
                log::debug!("memory usage unavailable: {}", e);
                None
            }
        };

        let load_average = tokio::fs::read_to_string("/proc/loadavg")
            .await
            .ok()
            .and_then(|contents| parse_loadavg(&contents));

        let network_available = tokio::fs::metadata("/proc/net/dev").await.is_ok();

        PerformanceReport {
            metrics: PerformanceSnapshot {
                cpu_usage,
                memory,
                load_average,
                network_available,
            },
            timestamp: timestamp_now(),
        }
    }

    /// One row per running container
    pub async fn docker(&self) -> Result<DockerReport, MetricsError> {
        let output = run_command(
            "docker",
            &["stats", "--no-stream", "--format", DOCKER_STATS_FORMAT],
            self.config.slow_command_timeout(),
        )
        .await?;

        Ok(DockerReport {
            containers: parse_docker_stats(&output),
            timestamp: timestamp_now(),
        })
    }

    async fn database_size(&self) -> Option<String> {
        let query = format!(
            "SELECT pg_size_pretty(pg_database_size('{}'));",
            self.config.postgres_database
        );
        self.psql(&query)
            .await
            .map(|out| out.trim().to_string())
            .filter(|size| !size.is_empty())
    }

    async fn psql(&self, query: &str) -> Option<String> {
        let args = [
            "exec",
            self.config.postgres_container.as_str(),
            "psql",
            "-U",
            self.config.postgres_user.as_str(),
            "-t",
            "-c",
            query,
        ];
        match run_command("docker", &args, self.config.command_timeout()).await {
            Ok(out) => Some(out),
            Err(e) => {
                log::debug!("psql query failed: {}", e);
                None
            }
        }
    }

    /// `du -sh` of a directory, `missing` if it does not exist
    async fn dir_size(&self, path: &Path, missing: &str) -> String {
        if !path.exists() {
            return missing.to_string();
        }
        let path_str = path.display().to_string();
        match run_command("du", &["-sh", &path_str], self.config.slow_command_timeout()).await {
            Ok(out) => out
                .split_whitespace()
                .next()
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            Err(e) => {
                log::debug!("du {} failed: {}", path_str, e);
                NOT_AVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_df() {
        let output = "Filesystem     1024-blocks      Used Available Capacity Mounted on\n\
                      /dev/nvme0n1p2   480141312 408120064  47602688      90% /\n";
        let usage = parse_df(output).unwrap();
        assert_eq!(usage.total_kb, 480141312);
        assert_eq!(usage.used_kb, 408120064);
        assert_eq!(usage.usage_percent(), 85.0);
        assert_eq!(format_gb(usage.total_kb), "457.9 GB");
    }

    #[test]
    fn test_parse_df_garbage() {
        assert!(matches!(parse_df("nothing here"), Err(MetricsError::Parse(_))));
        assert!(parse_df("header\n/dev/sda1 lots of space /").is_err());
    }

    #[test]
    fn test_parse_top_cpu() {
        let output = "top - 12:00:01 up 3 days,  1 user,  load average: 0.52, 0.48, 0.40\n\
                      Tasks: 312 total,   1 running, 311 sleeping,   0 stopped,   0 zombie\n\
                      %Cpu(s):  2.3 us,  0.8 sy,  0.0 ni, 96.7 id,  0.1 wa,  0.0 hi,  0.1 si,  0.0 st\n";
        assert_eq!(parse_top_cpu(output), Some(3.3));
    }

    #[test]
    fn test_parse_top_without_cpu_line() {
        assert_eq!(parse_top_cpu("Tasks: 1 total"), None);
    }

    #[test]
    fn test_parse_free() {
        let output = "               total        used        free      shared  buff/cache   available\n\
                      Mem:           15934        8123        1200         312        6610        7170\n\
                      Swap:           2047           0        2047\n";
        let memory = parse_free(output).unwrap();
        assert_eq!(memory.total, "15934 MB");
        assert_eq!(memory.used, "8123 MB");
        assert_eq!(memory.usage_percent, 51.0);
    }

    #[test]
    fn test_parse_loadavg() {
        let load = parse_loadavg("0.52 0.48 0.40 2/1234 56789\n").unwrap();
        assert_eq!(load.one, "0.52");
        assert_eq!(load.fifteen, "0.40");
        assert!(parse_loadavg("0.52").is_none());
    }

    #[test]
    fn test_parse_docker_stats_skips_bad_lines() {
        let output = concat!(
            r#"{"container":"abc123","name":"postgres","cpu":"0.50%","memory":"120MiB / 15.5GiB","net":"1.2kB / 0B","block":"0B / 0B"}"#,
            "\n",
            "not json\n",
            "\n"
        );
        let containers = parse_docker_stats(output);
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name, "postgres");
    }

    #[test]
    fn test_parse_table_sizes() {
        let output = " shares        | 1203 MB\n blocks        | 8192 bytes\n\n";
        let tables = parse_table_sizes(output);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables["shares"], "1203 MB");
    }

    #[tokio::test]
    async fn test_dir_size_missing_dir() {
        let collector = SystemCollector::new(CollectorsConfig::default());
        let size = collector
            .dir_size(Path::new("/nonexistent/backups"), "0B")
            .await;
        assert_eq!(size, "0B");
    }

    #[tokio::test]
    async fn test_dir_size_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pool.log"), b"line\n").unwrap();

        let collector = SystemCollector::new(CollectorsConfig::default());
        let size = collector.dir_size(dir.path(), "0B").await;
        assert_ne!(size, "0B");
    }
}
