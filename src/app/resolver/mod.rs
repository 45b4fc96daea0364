//! Artifact resolution against the package index
//!
//! Resolution is two lookups: a faceted search for the mod name, then the
//! version list of the first ranked project. Versions are scanned in the order
//! the index returns them and the first one declaring both the loader and the
//! game version wins. There is exactly one attempt per request.

pub mod types;

use tracing::{debug, info};
use url::Url;

use crate::app::client::IndexClient;
use crate::app::models::ResolvedArtifact;
use crate::constants::index;
use crate::errors::{ResolutionError, ResolutionResult};

pub use types::{ProjectVersion, SearchHit, SearchResponse, VersionFile};

/// Resolves mod names to downloadable artifacts
#[derive(Debug)]
pub struct ArtifactResolver {
    client: IndexClient,
}

impl ArtifactResolver {
    pub fn new(client: IndexClient) -> Self {
        Self { client }
    }

    /// Facet filter for the search endpoint
    pub fn search_facets(loader: &str, game_version: &str) -> String {
        serde_json::json!([[
            format!("{}:{}", index::LOADER_FACET, loader),
            format!("{}:{}", index::GAME_VERSION_FACET, game_version),
        ]])
        .to_string()
    }

    /// First version, in index order, that supports `loader` and
    /// `game_version` and lists at least one file
    pub fn select_version<'a>(
        versions: &'a [ProjectVersion],
        loader: &str,
        game_version: &str,
    ) -> Option<(&'a ProjectVersion, &'a VersionFile)> {
        versions
            .iter()
            .filter(|version| version.supports(loader, game_version))
            .find_map(|version| version.files.first().map(|file| (version, file)))
    }

    /// Resolve `name` to an artifact compatible with `loader` and `game_version`
    ///
    /// # Errors
    ///
    /// - `ResolutionError::NoMatch` if the search returns no project
    /// - `ResolutionError::NoCompatibleVersion` if no version fits
    /// - `ResolutionError::Transport` / `MalformedResponse` if a lookup fails
    pub async fn resolve(
        &self,
        name: &str,
        loader: &str,
        game_version: &str,
    ) -> ResolutionResult<ResolvedArtifact> {
        let facets = Self::search_facets(loader, game_version);
        let search: SearchResponse = self
            .client
            .get_json(
                &[index::SEARCH_PATH],
                &[("query", name), ("facets", facets.as_str())],
            )
            .await?;

        let Some(hit) = search.hits.first() else {
            debug!("No matching mod found for: {}", name);
            return Err(ResolutionError::NoMatch);
        };
        debug!(
            "Search for {} matched project {} ({})",
            name,
            hit.project_id,
            hit.slug.as_deref().unwrap_or("-")
        );

        let versions: Vec<ProjectVersion> = self
            .client
            .get_json(
                &[index::PROJECT_PATH, hit.project_id.as_str(), index::VERSION_PATH],
                &[],
            )
            .await?;

        let Some((version, file)) = Self::select_version(&versions, loader, game_version) else {
            debug!("No compatible version found for mod: {}", name);
            return Err(ResolutionError::NoCompatibleVersion);
        };

        let download_url = Url::parse(&file.url).map_err(|e| {
            ResolutionError::MalformedResponse(format!("invalid file URL {}: {}", file.url, e))
        })?;

        info!(
            "Resolved {} to version {} ({})",
            name, version.version_number, download_url
        );

        Ok(ResolvedArtifact {
            download_url,
            version_label: version.version_number.clone(),
            loader: loader.to_string(),
            game_version: game_version.to_string(),
            remote_file_name: file.filename.clone(),
        })
    }
}
