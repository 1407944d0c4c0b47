//! Publishing of rendered release notes: write, branch, commit, push, and
//! pull request reconciliation.
//!
//! Steps run strictly in order and are never retried or rolled back. A
//! failure leaves whatever was already done in place; the next run picks the
//! existing branch back up.
use log::*;
use std::rc::Rc;
use tokio::fs;

use crate::{
    config::Config,
    error::{NotesError, Result},
    forge::{
        request::{
            CreatePrRequest, CreatePrResponse, GetPrRequest, PullRequest,
            Release,
        },
        traits::PullRequestProvider,
    },
};

/// git2 implementation of [`vcs::VersionControl`].
pub mod git;

/// Deterministic branch, path and pull request naming.
pub mod target;

/// Version control capability trait.
pub mod vcs;

use target::PublishTarget;
use vcs::{CommitOutcome, VersionControl};

/// Terminal state of a publish attempt that did not error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new pull request was opened.
    Published(PullRequest),
    /// An open pull request for the branch already existed.
    PrExists(PullRequest),
    /// The provider refused to create the pull request.
    Failed { status: u16, body: String },
    /// Document written, version control and provider left untouched.
    DryRun,
}

pub struct PublishCoordinator {
    config: Rc<Config>,
    vcs: Rc<dyn VersionControl>,
    pull_requests: Rc<dyn PullRequestProvider>,
}

impl PublishCoordinator {
    pub fn new(
        config: Rc<Config>,
        vcs: Rc<dyn VersionControl>,
        pull_requests: Rc<dyn PullRequestProvider>,
    ) -> Self {
        Self {
            config,
            vcs,
            pull_requests,
        }
    }

    pub async fn publish(
        &self,
        release: &Release,
        document: &str,
    ) -> Result<PublishOutcome> {
        let target = PublishTarget::new(release, &self.config);

        self.write_document(&target, document).await?;

        if self.config.dry_run {
            warn!(
                "dry_run: would commit {} to branch {} and open a PR in {}",
                target.file_path.display(),
                target.branch,
                target.pr_repo
            );
            return Ok(PublishOutcome::DryRun);
        }

        self.resolve_branch(&target)?;
        self.commit_and_push(&target)?;
        self.reconcile_pr(&target).await
    }

    async fn write_document(
        &self,
        target: &PublishTarget,
        document: &str,
    ) -> Result<()> {
        let path = self.config.workdir.join(&target.file_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| NotesError::publish("write-document", e))?;
        }

        fs::write(&path, document)
            .await
            .map_err(|e| NotesError::publish("write-document", e))?;

        info!("wrote {}", path.display());

        Ok(())
    }

    fn resolve_branch(&self, target: &PublishTarget) -> Result<()> {
        let remote = &self.config.remote;
        let step = |e: NotesError| NotesError::publish("resolve-branch", e);

        self.vcs.fetch(remote).map_err(step)?;

        if self.vcs.branch_exists(remote, &target.branch).map_err(step)? {
            info!("reusing existing branch {}", target.branch);
            self.vcs.checkout(remote, &target.branch).map_err(step)?;
            self.vcs.pull(remote, &target.branch).map_err(step)?;
        } else {
            info!("creating branch {}", target.branch);
            self.vcs
                .create_branch(remote, &target.branch, &self.config.base_branch)
                .map_err(step)?;
        }

        Ok(())
    }

    fn commit_and_push(&self, target: &PublishTarget) -> Result<()> {
        let step = |e: NotesError| NotesError::publish("commit", e);

        self.vcs.add(&target.file_path).map_err(step)?;

        match self.vcs.commit(&target.commit_message).map_err(step)? {
            CommitOutcome::Committed(id) => {
                info!("committed {id}: {}", target.commit_message)
            }
            CommitOutcome::NoChanges => {
                info!("{} unchanged since last run", target.file_path.display())
            }
        }

        self.vcs
            .push(&self.config.remote, &target.branch)
            .map_err(|e| NotesError::publish("push", e))?;

        Ok(())
    }

    async fn reconcile_pr(
        &self,
        target: &PublishTarget,
    ) -> Result<PublishOutcome> {
        let step = |e: NotesError| NotesError::publish("reconcile-pr", e);

        info!("searching for existing pr for branch {}", target.branch);
        let existing = self
            .pull_requests
            .get_open_pr(GetPrRequest {
                repo: target.pr_repo.clone(),
                head_owner: target.head_owner.clone(),
                head_branch: target.branch.clone(),
            })
            .await
            .map_err(step)?;

        if let Some(pr) = existing {
            info!("PR #{} already exists for {}", pr.number, target.branch);
            return Ok(PublishOutcome::PrExists(pr));
        }

        let response = self
            .pull_requests
            .create_pr(CreatePrRequest {
                repo: target.pr_repo.clone(),
                head_branch: target.branch.clone(),
                base_branch: self.config.base_branch.clone(),
                title: target.pr_title.clone(),
                body: target.pr_body.clone(),
            })
            .await
            .map_err(step)?;

        match response {
            CreatePrResponse::Created(pr) => {
                info!("created PR #{} in {}", pr.number, target.pr_repo);
                Ok(PublishOutcome::Published(pr))
            }
            CreatePrResponse::Rejected { status, body } => {
                error!(
                    "failed to create PR for {} ({status}): {body}",
                    target.branch
                );
                Ok(PublishOutcome::Failed { status, body })
            }
        }
    }
}
