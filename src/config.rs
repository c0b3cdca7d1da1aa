use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::DEFAULT_NULL_MARKER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Ron,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Ron => "ron",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PearConfig {
    /// `Father_Mark` value that marks a root component.
    #[serde(default = "default_null_marker")]
    pub null_marker: String,
    #[serde(default = "default_dot_dir")]
    pub dot_dir: PathBuf,
    #[serde(default = "default_intact_dot")]
    pub intact_dot: String,
    #[serde(default = "default_damaged_dot")]
    pub damaged_dot: String,
    #[serde(default)]
    pub report_format: ReportFormat,
}

impl Default for PearConfig {
    fn default() -> Self {
        Self {
            null_marker: default_null_marker(),
            dot_dir: default_dot_dir(),
            intact_dot: default_intact_dot(),
            damaged_dot: default_damaged_dot(),
            report_format: ReportFormat::default(),
        }
    }
}

impl PearConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: PearConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    pub fn intact_dot_path(&self) -> PathBuf {
        self.dot_dir.join(&self.intact_dot)
    }

    pub fn damaged_dot_path(&self) -> PathBuf {
        self.dot_dir.join(&self.damaged_dot)
    }
}

// Names used by the original drawing step
fn default_null_marker() -> String {
    DEFAULT_NULL_MARKER.to_string()
}

fn default_dot_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_intact_dot() -> String {
    "intact_PN.dot".to_string()
}

fn default_damaged_dot() -> String {
    "damaged_PN.dot".to_string()
}
