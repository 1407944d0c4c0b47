//! Deterministic naming of branches, paths and pull requests.
use std::path::PathBuf;

use crate::{
    config::{BranchStrategy, Config, DEFAULT_BRANCH_PREFIX, RepoId},
    forge::request::Release,
};

/// Extension of written documents.
pub const DOCUMENT_EXTENSION: &str = "md";

/// Everything the coordinator needs to publish one release's notes. Derived
/// purely from the release and configuration, so the same (repository, tag)
/// always lands on the same branch and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub branch: String,
    /// Document path relative to the working tree root.
    pub file_path: PathBuf,
    pub commit_message: String,
    /// Repository the pull request is opened in.
    pub pr_repo: RepoId,
    /// Owner of the repository the branch is pushed to.
    pub head_owner: String,
    pub pr_title: String,
    pub pr_body: String,
}

impl PublishTarget {
    pub fn new(release: &Release, config: &Config) -> Self {
        let repo = &release.repo;

        let (branch, pr_title) = match config.branch_strategy {
            BranchStrategy::PerRepo => (
                format!("{DEFAULT_BRANCH_PREFIX}/{}/{}", repo.owner, repo.repo),
                format!("Release notes updates for {repo}"),
            ),
            BranchStrategy::PerTag => (
                format!(
                    "{DEFAULT_BRANCH_PREFIX}/{}/{}-{}",
                    repo.owner, repo.repo, release.tag
                ),
                format!("Release notes for {repo} {}", release.tag),
            ),
        };

        let file_path = config
            .output_dir
            .join(&repo.owner)
            .join(&repo.repo)
            .join(format!("{}.{DOCUMENT_EXTENSION}", release.tag));

        let pr_repo =
            config.target_repo.clone().unwrap_or_else(|| repo.clone());
        let head_owner = pr_repo.owner.clone();

        Self {
            branch,
            file_path,
            commit_message: format!(
                "Update release notes for {repo} {}",
                release.tag
            ),
            pr_repo,
            head_owner,
            pr_title,
            pr_body: format!(
                "Automated release notes updates.\n\nSource release: {}",
                release.url
            ),
        }
    }
}
