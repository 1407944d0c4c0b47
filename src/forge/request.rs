use crate::config::RepoId;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A published release of a source repository.
pub struct Release {
    pub repo: RepoId,
    pub tag: String,
    /// Raw release description. Empty when the provider returned none.
    pub body: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An open pull request as reported by the provider.
pub struct PullRequest {
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to find open pull requests by head branch.
pub struct GetPrRequest {
    /// Repository the pull request lives in.
    pub repo: RepoId,
    /// Owner of the repository the head branch was pushed to.
    pub head_owner: String,
    pub head_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new pull request.
pub struct CreatePrRequest {
    pub repo: RepoId,
    pub head_branch: String,
    pub base_branch: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a pull request creation call that reached the provider.
pub enum CreatePrResponse {
    Created(PullRequest),
    /// The provider answered with a non-success status.
    Rejected { status: u16, body: String },
}
