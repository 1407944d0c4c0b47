//! Traits related to remote release and pull request providers
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    config::RepoId,
    error::Result,
    forge::request::{
        CreatePrRequest, CreatePrResponse, GetPrRequest, PullRequest, Release,
    },
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReleaseProvider {
    /// Release with exactly this tag, or `None` when the provider has none.
    async fn get_release_by_tag(
        &self,
        repo: RepoId,
        tag: String,
    ) -> Result<Option<Release>>;

    /// Most recent release, or `None` when the repository has no releases.
    async fn get_latest_release(&self, repo: RepoId) -> Result<Option<Release>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PullRequestProvider {
    async fn get_open_pr(&self, req: GetPrRequest)
    -> Result<Option<PullRequest>>;

    /// Transport failures are errors; provider rejections are reported as
    /// [`CreatePrResponse::Rejected`].
    async fn create_pr(&self, req: CreatePrRequest) -> Result<CreatePrResponse>;
}
