//! What a run did, for the console summary and the optional JSON report.

use crate::plugin::{PluginCategory, PluginFormat};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// A problem that skipped an item but let the run continue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    MissingSourceFolder { path: PathBuf },
    UnreadableSourceFolder { path: PathBuf, reason: String },
    UnreadableDescriptor { path: PathBuf, reason: String },
    MissingVendor { descriptor: PathBuf },
    MissingCompanion { descriptor: PathBuf },
    SanitizedVendor { original: String, sanitized: String },
    UnusableVendor { original: String },
}

/// A copy that did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub vendor: String,
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FolderReport {
    pub category: PluginCategory,
    pub format: PluginFormat,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub vendors: Vec<String>,
    pub copied: usize,
    pub warnings: Vec<Warning>,
    pub failures: Vec<Failure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub database_root: PathBuf,
    pub output_dir: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub folders: Vec<FolderReport>,
}

impl RunReport {
    pub fn copied(&self) -> usize {
        self.folders.iter().map(|f| f.copied).sum()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.folders.iter().flat_map(|f| f.warnings.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.folders.iter().flat_map(|f| f.failures.iter())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
