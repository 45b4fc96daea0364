//! Data models for mod_fetcher
//!
//! This module defines the core data structures that flow through a batch run:
//! the validated request for one mod, the artifact the index resolved it to,
//! the outcome of fetching it, and the bookkeeping records for the run.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::constants::{files, reasons};
use crate::errors::ValidationError;

/// A single entry of the mod list, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModRequest {
    /// Name used as the index search query and as the file name prefix
    pub name: String,
    /// Optional locator supplied with the entry
    pub locator_hint: Option<Url>,
}

impl ModRequest {
    /// Create a request without a locator hint
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator_hint: None,
        }
    }

    /// Validate one raw entry of the mod list
    ///
    /// An entry must be an object with a non-empty string `name`. If a `url`
    /// key is present it must hold an absolute URL with a host.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` describing the first problem found
    pub fn from_value(entry: &Value) -> Result<Self, ValidationError> {
        let object = entry.as_object().ok_or(ValidationError::NotAnObject)?;

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .ok_or(ValidationError::MissingName)?;

        let locator_hint = match object.get("url") {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => Some(parse_locator(raw)?),
            Some(other) => {
                return Err(ValidationError::InvalidUrl {
                    url: other.to_string(),
                    reason: "not a string".to_string(),
                })
            }
        };

        Ok(Self {
            name: name.to_string(),
            locator_hint,
        })
    }

    /// Best-effort name for an entry that failed validation
    pub fn display_name(entry: &Value) -> String {
        entry
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(reasons::UNKNOWN_NAME)
            .to_string()
    }
}

fn parse_locator(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Artifact chosen by the resolver for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    /// Where the artifact bytes live
    pub download_url: Url,
    /// Version label reported by the index (`version_number`)
    pub version_label: String,
    /// Loader the artifact was resolved for
    pub loader: String,
    /// Game version the artifact was resolved for
    pub game_version: String,
    /// File name reported by the index, if any
    pub remote_file_name: Option<String>,
}

impl ResolvedArtifact {
    /// Metadata persisted next to the artifact
    pub fn metadata(&self) -> ArtifactMetadata {
        ArtifactMetadata {
            version_number: self.version_label.clone(),
            mod_loader: self.loader.clone(),
            minecraft_version: self.game_version.clone(),
        }
    }

    /// Extension of the remote file, falling back to `jar`
    pub fn extension(&self) -> String {
        let from_name = self.remote_file_name.as_deref().and_then(extension_of);
        let from_url = || {
            self.download_url
                .path_segments()
                .and_then(|segments| segments.last())
                .and_then(extension_of)
        };

        from_name
            .or_else(from_url)
            .unwrap_or_else(|| files::DEFAULT_ARTIFACT_EXTENSION.to_string())
    }

    /// Deterministic local file name: `{name}_{version}_{loader}.{ext}`
    ///
    /// Re-running a batch with the same resolution yields the same name, so
    /// the previous download is overwritten rather than duplicated.
    pub fn artifact_file_name(&self, name: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            sanitize_component(name),
            sanitize_component(&self.version_label),
            sanitize_component(&self.loader),
            self.extension()
        )
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}

fn sanitize_component(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

/// Sidecar metadata written as `{artifact}.meta.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub version_number: String,
    pub mod_loader: String,
    pub minecraft_version: String,
}

/// Result of fetching one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Whether artifact and sidecar are both on disk
    pub success: bool,
    /// Artifact path, set on success
    pub saved_path: Option<PathBuf>,
    /// Final error message, set on failure
    pub error: Option<String>,
    /// Number of attempts made
    pub attempts: u32,
}

impl DownloadOutcome {
    /// Create a successful outcome
    pub fn succeeded(saved_path: PathBuf, attempts: u32) -> Self {
        Self {
            success: true,
            saved_path: Some(saved_path),
            error: None,
            attempts,
        }
    }

    /// Create a failed outcome
    pub fn failed(error: impl Into<String>, attempts: u32) -> Self {
        Self {
            success: false,
            saved_path: None,
            error: Some(error.into()),
            attempts,
        }
    }
}

/// One failed request, as written to the failure log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub name: String,
    pub reason: String,
}

impl FailureRecord {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Line written to the failure log
    pub fn log_line(&self) -> String {
        format!("Mod: {}, Reason: {}", self.name, self.reason)
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.log_line())
    }
}

/// Progress of a batch: `completed` never decreases, `total` never changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
        }
    }

    /// Record one terminal transition
    pub fn advance(&mut self) {
        debug_assert!(self.completed < self.total, "progress advanced past total");
        self.completed = (self.completed + 1).min(self.total);
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Completion percentage (100 for an empty batch)
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.completed as f64 / self.total as f64) * 100.0
    }
}
