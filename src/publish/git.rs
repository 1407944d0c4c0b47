//! git2 backed [`VersionControl`] for a local working tree.
//!
//! The working tree must be the repository root: documents are staged by
//! their path relative to it. Network operations authenticate with the
//! configured access token over HTTPS, or the ssh-agent for SSH remotes.
use git2::{
    BranchType, CredentialType, ErrorCode, RemoteCallbacks,
    build::CheckoutBuilder,
};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use std::{cell::RefCell, path::Path};

use crate::{
    error::{NotesError, Result},
    publish::vcs::{CommitOutcome, VersionControl},
};

/// Username sent alongside the token for HTTPS remotes.
const TOKEN_USERNAME: &str = "x-access-token";

/// Create Git authentication callbacks for username/token authentication.
fn get_auth_callbacks<'r>(token: String) -> RemoteCallbacks<'r> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed| {
        if allowed.contains(CredentialType::SSH_KEY) {
            return git2::Cred::ssh_key_from_agent(
                username_from_url.unwrap_or("git"),
            );
        }
        git2::Cred::userpass_plaintext(TOKEN_USERNAME, &token)
    });
    callbacks
}

/// Checkout options shared by every branch switch. Paths that differ between
/// the working tree and the target (such as a freshly written document) are
/// left untouched instead of aborting the checkout.
fn checkout_options() -> CheckoutBuilder<'static> {
    let mut builder = CheckoutBuilder::new();
    builder.safe().allow_conflicts(true);
    builder
}

pub struct GitRepository {
    repo: git2::Repository,
    token: SecretString,
}

impl GitRepository {
    /// Open the repository whose working tree root is `path`.
    pub fn open(path: &Path, token: SecretString) -> Result<Self> {
        let repo = git2::Repository::open(path)?;

        if repo.is_bare() {
            return Err(NotesError::config(format!(
                "{} is a bare repository",
                path.display()
            )));
        }

        Ok(Self { repo, token })
    }

    fn callbacks<'r>(&self) -> RemoteCallbacks<'r> {
        get_auth_callbacks(self.token.expose_secret().to_string())
    }

    fn find_branch(
        &self,
        name: &str,
        kind: BranchType,
    ) -> Result<Option<git2::Branch<'_>>> {
        match self.repo.find_branch(name, kind) {
            Ok(branch) => Ok(Some(branch)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn switch_branch(&self, branch: &str) -> Result<()> {
        info!("switching to branch: {branch}");
        let ref_name = format!("refs/heads/{branch}");
        let target = self.repo.revparse_single(&ref_name)?;
        self.repo
            .checkout_tree(&target, Some(&mut checkout_options()))?;
        self.repo.set_head(&ref_name)?;
        Ok(())
    }

    /// First of `{remote}/{base}`, local `base`, HEAD that resolves.
    fn base_commit(
        &self,
        remote: &str,
        base: &str,
    ) -> Result<git2::Commit<'_>> {
        let candidates = [
            format!("refs/remotes/{remote}/{base}"),
            format!("refs/heads/{base}"),
        ];

        for spec in candidates {
            if let Ok(object) = self.repo.revparse_single(&spec) {
                debug!("starting new branch from {spec}");
                return Ok(object.peel_to_commit()?);
            }
        }

        warn!("base branch {base} not found: starting from HEAD");
        Ok(self.repo.head()?.peel_to_commit()?)
    }
}

impl VersionControl for GitRepository {
    fn fetch(&self, remote: &str) -> Result<()> {
        info!("fetching {remote}");
        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.callbacks());

        let mut remote = self.repo.find_remote(remote)?;
        remote.fetch(&[] as &[&str], Some(&mut fetch_options), None)?;
        Ok(())
    }

    fn branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        if self.find_branch(branch, BranchType::Local)?.is_some() {
            return Ok(true);
        }

        let remote_name = format!("{remote}/{branch}");
        Ok(self.find_branch(&remote_name, BranchType::Remote)?.is_some())
    }

    fn checkout(&self, remote: &str, branch: &str) -> Result<()> {
        if self.find_branch(branch, BranchType::Local)?.is_none() {
            let remote_name = format!("{remote}/{branch}");
            let remote_branch = self
                .find_branch(&remote_name, BranchType::Remote)?
                .ok_or_else(|| {
                    NotesError::publish(
                        "checkout",
                        format!(
                            "branch {branch} not found locally or on {remote}"
                        ),
                    )
                })?;

            info!("creating local branch {branch} tracking {remote_name}");
            let commit = remote_branch.get().peel_to_commit()?;
            let mut local = self.repo.branch(branch, &commit, false)?;
            local.set_upstream(Some(&remote_name))?;
        }

        self.switch_branch(branch)
    }

    fn create_branch(
        &self,
        remote: &str,
        branch: &str,
        base: &str,
    ) -> Result<()> {
        info!("creating branch: {branch}");
        let commit = self.base_commit(remote, base)?;
        self.repo.branch(branch, &commit, false)?;
        self.switch_branch(branch)
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        let remote_ref_name = format!("refs/remotes/{remote}/{branch}");
        let remote_ref = match self.repo.find_reference(&remote_ref_name) {
            Ok(reference) => reference,
            Err(e) if e.code() == ErrorCode::NotFound => {
                debug!("{remote_ref_name} does not exist: nothing to pull");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let incoming = self.repo.reference_to_annotated_commit(&remote_ref)?;
        let (analysis, _) = self.repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            debug!("{branch} is up to date with {remote}");
            return Ok(());
        }

        if !analysis.is_fast_forward() {
            return Err(NotesError::publish(
                "pull",
                format!(
                    "{branch} has diverged from {remote} and cannot be \
                     fast-forwarded"
                ),
            ));
        }

        info!("fast-forwarding {branch} to {}", incoming.id());
        let local_ref_name = format!("refs/heads/{branch}");
        let mut local_ref = self.repo.find_reference(&local_ref_name)?;
        local_ref.set_target(incoming.id(), "notesmith: fast-forward")?;
        self.repo.set_head(&local_ref_name)?;
        self.repo.checkout_head(Some(&mut checkout_options()))?;

        Ok(())
    }

    fn add(&self, path: &Path) -> Result<()> {
        debug!("adding {} to index", path.display());
        let mut index = self.repo.index()?;
        index.add_path(path)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let mut index = self.repo.index()?;
        let oid = index.write_tree()?;
        let parent_commit = self.repo.head()?.peel_to_commit()?;

        if parent_commit.tree_id() == oid {
            info!("nothing to commit: document unchanged");
            return Ok(CommitOutcome::NoChanges);
        }

        debug!("committing changes with msg: {message}");
        let config = self.repo.config()?.snapshot()?;
        let user = config.get_str("user.name")?;
        let email = config.get_str("user.email")?;
        let tree = self.repo.find_tree(oid)?;
        let committer = git2::Signature::now(user, email)?;

        let commit = self.repo.commit(
            Some("HEAD"),
            &committer,
            &committer,
            message,
            &tree,
            &[&parent_commit],
        )?;

        Ok(CommitOutcome::Committed(commit.to_string()))
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        info!("pushing branch {branch} to {remote}");
        let rejected: RefCell<Option<String>> = RefCell::new(None);

        {
            let mut callbacks = self.callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(status) = status {
                    *rejected.borrow_mut() =
                        Some(format!("{refname}: {status}"));
                }
                Ok(())
            });

            let mut push_opts = git2::PushOptions::default();
            push_opts.remote_callbacks(callbacks);

            let mut remote = self.repo.find_remote(remote)?;
            let ref_spec = format!("refs/heads/{branch}:refs/heads/{branch}");
            remote.push(&[ref_spec], Some(&mut push_opts))?;
        }

        if let Some(reason) = rejected.into_inner() {
            return Err(NotesError::publish("push", reason));
        }

        Ok(())
    }
}
