//! Release lookup for a single source repository.
use log::*;

use crate::{
    config::RepoId,
    error::{NotesError, Result},
    forge::{request::Release, traits::ReleaseProvider},
};

/// Fetches the release to document for a repository: the release matching
/// `tag` when one is given, otherwise the most recent one.
pub async fn fetch_release(
    provider: &dyn ReleaseProvider,
    repo: &RepoId,
    tag: Option<&str>,
) -> Result<Release> {
    match tag {
        Some(tag) => {
            info!("fetching release {tag} for {repo}");
            provider
                .get_release_by_tag(repo.clone(), tag.to_string())
                .await
                .map_err(|e| NotesError::fetch(repo.to_string(), e))?
                .ok_or_else(|| NotesError::NotFound {
                    repo: repo.to_string(),
                    tag: tag.to_string(),
                })
        }
        None => {
            info!("fetching latest release for {repo}");
            provider
                .get_latest_release(repo.clone())
                .await
                .map_err(|e| NotesError::fetch(repo.to_string(), e))?
                .ok_or_else(|| NotesError::EmptyCatalog {
                    repo: repo.to_string(),
                })
        }
    }
}
