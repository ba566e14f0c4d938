//! TOML configuration for woodpecker.
//!
//! Every section is optional. With no file at all the built-in sources are
//! watched: the Armored Witness firmware log and the Go checksum database.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;
use woodpecker_engine::MIN_WITNESSES;
use woodpecker_log::{LogKind, LogSource};

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Logs to watch, in display order (`[[source]]` tables).
    #[serde(rename = "source")]
    pub sources: Vec<SourceSection>,
    /// Witness distributor and quorum policy.
    pub witness: WitnessSection,
    /// Periodic refresh.
    pub refresh: RefreshSection,
    /// Logging configuration.
    pub log: LogSection,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            witness: WitnessSection::default(),
            refresh: RefreshSection::default(),
            log: LogSection::default(),
        }
    }
}

/// One `[[source]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSection {
    /// Checkpoint origin line; also the name the log is selected by.
    pub origin: String,
    /// Log root: `https://`, `http://`, `file://` or a local path.
    pub url: String,
    /// Verifier key for the log's checkpoints.
    pub key: String,
    /// Log layout: `"serverless"` (default) or `"sumdb"`.
    #[serde(default)]
    pub kind: LogKind,
}

/// `[witness]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WitnessSection {
    /// Base URL of the witness distributor.
    pub distributor: String,
    /// Cosignatures required before a checkpoint counts as witnessed.
    pub threshold: usize,
    /// Witness verifier keys. When empty the distributor's list is used.
    pub keys: Vec<String>,
}

impl Default for WitnessSection {
    fn default() -> Self {
        Self {
            distributor: "https://api.transparency.dev/".to_string(),
            threshold: MIN_WITNESSES,
            keys: Vec::new(),
        }
    }
}

/// `[refresh]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RefreshSection {
    /// Seconds between checkpoint refreshes.
    pub interval_secs: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn default_sources() -> Vec<SourceSection> {
    vec![
        SourceSection {
            origin: "transparency.dev/armored-witness/firmware_transparency/prod/1".to_string(),
            url: "https://api.transparency.dev/armored-witness-firmware/prod/log/1/".to_string(),
            key: "transparency.dev-aw-ftlog-prod-1+3e6d87ee+Aa3qdhefd2cc/98jV3blslJT2L+iFR8WKHeGcgFmyjnt"
                .to_string(),
            kind: LogKind::Serverless,
        },
        SourceSection {
            origin: "go.sum database tree".to_string(),
            url: "https://sum.golang.org/".to_string(),
            key: "sum.golang.org+033de0ae+Ac4zctda0e5eza+HJyk9SxEdh+s3Ly18Ks3HPcDJ0g/GP".to_string(),
            kind: LogKind::Sumdb,
        },
    ]
}

impl CliConfig {
    /// Load config from a TOML file.
    ///
    /// Without an explicit path, `<config dir>/woodpecker/woodpecker.toml` is
    /// read if it exists, otherwise the built-in defaults are used.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Per-user config file location, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("woodpecker").join("woodpecker.toml"))
    }

    /// Reject settings the controller cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sources.is_empty() {
            bail!("no log sources configured");
        }
        if self.witness.threshold < MIN_WITNESSES {
            bail!(
                "witness threshold {} is below the minimum of {MIN_WITNESSES}",
                self.witness.threshold
            );
        }
        if self.refresh.interval_secs == 0 {
            bail!("refresh interval must be at least one second");
        }
        Ok(())
    }

    pub fn log_sources(&self) -> Vec<LogSource> {
        self.sources
            .iter()
            .map(|s| LogSource {
                origin: s.origin.clone(),
                url: s.url.clone(),
                key: s.key.clone(),
                kind: s.kind,
            })
            .collect()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval_secs)
    }
}
