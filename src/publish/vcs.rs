//! Narrow version-control capability consumed by the publish coordinator.
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

/// Result of a commit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A commit was created with this id.
    Committed(String),
    /// The staged tree matched HEAD, nothing was committed.
    NoChanges,
}

#[cfg_attr(test, automock)]
pub trait VersionControl {
    /// Update remote-tracking refs for `remote`.
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Whether `branch` exists locally or as `{remote}/{branch}`.
    fn branch_exists(&self, remote: &str, branch: &str) -> Result<bool>;

    /// Switch to an existing branch, creating the local branch from
    /// `{remote}/{branch}` if only the remote one exists.
    fn checkout(&self, remote: &str, branch: &str) -> Result<()>;

    /// Create `branch` from `base` and switch to it.
    fn create_branch(&self, remote: &str, branch: &str, base: &str)
    -> Result<()>;

    /// Fast-forward the checked out `branch` to `{remote}/{branch}` as of the
    /// last [`VersionControl::fetch`].
    fn pull(&self, remote: &str, branch: &str) -> Result<()>;

    /// Stage a single path, relative to the working tree root.
    fn add(&self, path: &Path) -> Result<()>;

    fn commit(&self, message: &str) -> Result<CommitOutcome>;

    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}
