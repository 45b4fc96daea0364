//! Wire types for the index search and version endpoints
//!
//! Only the fields the resolver reads are modelled; everything else in the
//! index responses is ignored.

use serde::{Deserialize, Serialize};

/// `GET /search` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

/// One ranked search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub project_id: String,
    #[serde(default)]
    pub slug: Option<String>,
}

/// One entry of `GET /project/{id}/version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub version_number: String,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

impl ProjectVersion {
    /// Whether this version declares both `loader` and `game_version`
    pub fn supports(&self, loader: &str, game_version: &str) -> bool {
        self.loaders.iter().any(|l| l == loader)
            && self.game_versions.iter().any(|v| v == game_version)
    }
}

/// A downloadable file of a version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionFile {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
}
