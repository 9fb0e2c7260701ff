//! Dashboard configuration, stored as RON next to where the binary runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use dashboard_engine::{AtomicFileWriter, ClientSettings, EngineSettings, PollSettings};
use engine_logging::LogDestination;
use serde::{Deserialize, Serialize};

pub(crate) const CONFIG_FILENAME: &str = "dashboard.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DashboardConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    /// Give up on a job after this many seconds; unset waits forever.
    pub max_poll_duration_secs: Option<u64>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_download_bytes: u64,
    /// Downloads and word-cloud images land here.
    pub output_dir: PathBuf,
    pub log_destination: LogTarget,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let poll = PollSettings::default();
        Self {
            base_url: client.base_url,
            poll_interval_ms: poll.interval.as_millis() as u64,
            max_poll_duration_secs: poll.max_duration.map(|d| d.as_secs()),
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            max_download_bytes: client.max_download_bytes,
            output_dir: PathBuf::from("./downloads"),
            log_destination: LogTarget::default(),
        }
    }
}

impl DashboardConfig {
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            client: ClientSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                max_download_bytes: self.max_download_bytes,
            },
            poll: PollSettings {
                interval: Duration::from_millis(self.poll_interval_ms),
                max_duration: self.max_poll_duration_secs.map(Duration::from_secs),
            },
        }
    }
}

/// Reads the config at `path`. A missing file is `Ok(None)`.
pub(crate) fn load(path: &Path) -> anyhow::Result<Option<DashboardConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    Ok(Some(config))
}

/// Writes `config` to `path`, replacing any existing file.
pub(crate) fn save(path: &Path, config: &DashboardConfig) -> anyhow::Result<PathBuf> {
    let content = ron::ser::to_string_pretty(config, ron::ser::PrettyConfig::new())
        .context("failed to serialize config")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("config path {} has no file name", path.display()))?;

    let written = AtomicFileWriter::new(dir)
        .write(filename, content.as_bytes())
        .with_context(|| format!("failed to write config {}", path.display()))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load(&temp.path().join(CONFIG_FILENAME)).unwrap(), None);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(base_url: "http://backend:8080", max_poll_duration_secs: Some(600))"#,
        )
        .unwrap();

        let config = load(&path).unwrap().unwrap();
        assert_eq!(config.base_url, "http://backend:8080");
        assert_eq!(config.max_poll_duration_secs, Some(600));
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.log_destination, LogTarget::Terminal);

        let settings = config.engine_settings();
        assert_eq!(settings.poll.interval, Duration::from_millis(2000));
        assert_eq!(settings.poll.max_duration, Some(Duration::from_secs(600)));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(base_url: 42").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn saved_defaults_load_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        let defaults = DashboardConfig::default();

        save(&path, &defaults).unwrap();
        assert_eq!(load(&path).unwrap(), Some(defaults));
    }
}
