use std::path::PathBuf;
use std::time::Duration;

use crate::model::QuantumPolicy;

/// Deployment settings for a process embedding the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub snapshot_interval: Duration,
    pub quantum_policy: QuantumPolicy,
    pub metrics_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("./data/schedule.snap"),
            snapshot_interval: Duration::from_secs(5),
            quantum_policy: QuantumPolicy::Strict,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Read `SLOTCAL_*` environment variables, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let snapshot_path = lookup("SLOTCAL_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.snapshot_path);
        let snapshot_interval = lookup("SLOTCAL_SNAPSHOT_INTERVAL_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.snapshot_interval);
        let quantum_policy = match lookup("SLOTCAL_QUANTUM_POLICY") {
            Some(s) => s.parse().unwrap_or_else(|e| {
                tracing::warn!("{e}, using {:?}", defaults.quantum_policy);
                defaults.quantum_policy
            }),
            None => defaults.quantum_policy,
        };
        let metrics_port = lookup("SLOTCAL_METRICS_PORT").and_then(|s| s.parse().ok());

        Self {
            snapshot_path,
            snapshot_interval,
            quantum_policy,
            metrics_port,
        }
    }
}
