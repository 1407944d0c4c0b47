//! In-memory fakes shared across test modules.
//!
//! [`MemoryVcs`] models local and remote branches as path to content maps and
//! reads staged files from a real working directory, so the publish pipeline
//! can be exercised end to end without git. [`MemoryForge`] stands in for both
//! the release and pull request providers.
use async_trait::async_trait;
use secrecy::SecretString;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::{
    config::{Config, RepoId},
    error::{NotesError, Result},
    forge::{
        request::{
            CreatePrRequest, CreatePrResponse, GetPrRequest, PullRequest,
            Release,
        },
        traits::{PullRequestProvider, ReleaseProvider},
    },
    publish::vcs::{CommitOutcome, VersionControl},
};

type Tree = BTreeMap<PathBuf, String>;

/// Creates a test Release with a github style url.
pub fn create_test_release(
    owner: &str,
    repo: &str,
    tag: &str,
    body: &str,
) -> Release {
    Release {
        repo: RepoId::new(owner, repo),
        tag: tag.to_string(),
        body: body.to_string(),
        url: format!("https://github.com/{owner}/{repo}/releases/tag/{tag}"),
    }
}

/// Creates a test Config for `repos` rooted at `workdir`.
pub fn create_test_config(repos: &[&str], workdir: &Path) -> Config {
    Config::builder()
        .repos(
            repos
                .iter()
                .map(|r| r.parse().unwrap())
                .collect::<Vec<RepoId>>(),
        )
        .github_token(SecretString::from("test-token".to_string()))
        .workdir(workdir.to_path_buf())
        .build()
        .unwrap()
}

#[derive(Debug, Default)]
struct VcsState {
    workdir: PathBuf,
    local: BTreeMap<String, Tree>,
    remote: BTreeMap<String, Tree>,
    current: String,
    index: Tree,
    commits: Vec<String>,
    pushes: Vec<String>,
    ops: Vec<String>,
}

/// Fake [`VersionControl`] backed by in-memory branch trees.
#[derive(Debug, Clone, Default)]
pub struct MemoryVcs {
    state: Arc<Mutex<VcsState>>,
}

impl MemoryVcs {
    /// Starts with an empty `main` branch both locally and on the remote.
    pub fn new(workdir: &Path) -> Self {
        let state = VcsState {
            workdir: workdir.to_path_buf(),
            local: BTreeMap::from([("main".to_string(), Tree::new())]),
            remote: BTreeMap::from([("main".to_string(), Tree::new())]),
            current: "main".to_string(),
            ..Default::default()
        };

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Content of `path` on the remote `branch`.
    pub fn remote_file(&self, branch: &str, path: &Path) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.remote.get(branch)?.get(path).cloned()
    }

    pub fn remote_branches(&self) -> Vec<String> {
        self.state.lock().unwrap().remote.keys().cloned().collect()
    }

    pub fn current_branch(&self) -> String {
        self.state.lock().unwrap().current.clone()
    }

    /// Messages of every commit created, oldest first.
    pub fn commits(&self) -> Vec<String> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Branch names pushed, one entry per push.
    pub fn pushes(&self) -> Vec<String> {
        self.state.lock().unwrap().pushes.clone()
    }

    /// Every call made, in order, as `op branch` strings.
    pub fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }
}

impl VersionControl for MemoryVcs {
    fn fetch(&self, _remote: &str) -> Result<()> {
        self.state.lock().unwrap().ops.push("fetch".into());
        Ok(())
    }

    fn branch_exists(&self, _remote: &str, branch: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("branch_exists {branch}"));
        Ok(state.local.contains_key(branch)
            || state.remote.contains_key(branch))
    }

    fn checkout(&self, _remote: &str, branch: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("checkout {branch}"));

        if !state.local.contains_key(branch) {
            let tree = state.remote.get(branch).cloned().ok_or_else(|| {
                NotesError::publish("checkout", format!("no branch {branch}"))
            })?;
            state.local.insert(branch.to_string(), tree);
        }

        state.index = state.local[branch].clone();
        state.current = branch.to_string();

        Ok(())
    }

    fn create_branch(
        &self,
        _remote: &str,
        branch: &str,
        base: &str,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("create_branch {branch}"));

        let tree = state
            .remote
            .get(base)
            .or_else(|| state.local.get(base))
            .cloned()
            .ok_or_else(|| {
                NotesError::publish("create-branch", format!("no base {base}"))
            })?;

        state.local.insert(branch.to_string(), tree.clone());
        state.index = tree;
        state.current = branch.to_string();

        Ok(())
    }

    fn pull(&self, _remote: &str, branch: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("pull {branch}"));

        if let Some(tree) = state.remote.get(branch).cloned() {
            state.local.insert(branch.to_string(), tree.clone());
            state.index = tree;
        }

        Ok(())
    }

    fn add(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("add {}", path.display()));

        let content = fs::read_to_string(state.workdir.join(path))?;
        state.index.insert(path.to_path_buf(), content);

        Ok(())
    }

    fn commit(&self, message: &str) -> Result<CommitOutcome> {
        let mut state = self.state.lock().unwrap();
        state.ops.push("commit".into());

        let current = state.current.clone();

        if state.local.get(&current) == Some(&state.index) {
            return Ok(CommitOutcome::NoChanges);
        }

        let index = state.index.clone();
        state.local.insert(current, index);
        state.commits.push(message.to_string());

        Ok(CommitOutcome::Committed(format!("c{}", state.commits.len())))
    }

    fn push(&self, _remote: &str, branch: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(format!("push {branch}"));

        let tree = state.local.get(branch).cloned().ok_or_else(|| {
            NotesError::publish("push", format!("no local branch {branch}"))
        })?;

        state.remote.insert(branch.to_string(), tree);
        state.pushes.push(branch.to_string());

        Ok(())
    }
}

#[derive(Debug, Default)]
struct ForgeState {
    /// Releases per repository, oldest first.
    releases: HashMap<RepoId, Vec<Release>>,
    failing: HashSet<RepoId>,
    /// Open PRs keyed by (repository, head branch).
    open_prs: HashMap<(RepoId, String), PullRequest>,
    rejection: Option<(u16, String)>,
    created: Vec<CreatePrRequest>,
    next_number: u64,
}

/// Fake release and pull request provider.
#[derive(Debug, Clone, Default)]
pub struct MemoryForge {
    state: Arc<Mutex<ForgeState>>,
}

impl MemoryForge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_release(&self, release: Release) {
        self.state
            .lock()
            .unwrap()
            .releases
            .entry(release.repo.clone())
            .or_default()
            .push(release);
    }

    /// Every release lookup for `repo` fails with a transport error.
    pub fn fail_repo(&self, repo: RepoId) {
        self.state.lock().unwrap().failing.insert(repo);
    }

    pub fn add_open_pr(&self, repo: RepoId, branch: &str, pr: PullRequest) {
        self.state
            .lock()
            .unwrap()
            .open_prs
            .insert((repo, branch.to_string()), pr);
    }

    /// Every subsequent create call is rejected with `status` and `body`.
    pub fn reject_creates(&self, status: u16, body: &str) {
        self.state.lock().unwrap().rejection = Some((status, body.to_string()));
    }

    /// Every create call made, including rejected ones.
    pub fn created(&self) -> Vec<CreatePrRequest> {
        self.state.lock().unwrap().created.clone()
    }

    fn check_failing(&self, repo: &RepoId) -> Result<()> {
        if self.state.lock().unwrap().failing.contains(repo) {
            return Err(NotesError::Network(format!("{repo} unreachable")));
        }
        Ok(())
    }
}

#[async_trait]
impl ReleaseProvider for MemoryForge {
    async fn get_release_by_tag(
        &self,
        repo: RepoId,
        tag: String,
    ) -> Result<Option<Release>> {
        self.check_failing(&repo)?;

        let state = self.state.lock().unwrap();
        Ok(state
            .releases
            .get(&repo)
            .and_then(|all| all.iter().find(|r| r.tag == tag).cloned()))
    }

    async fn get_latest_release(
        &self,
        repo: RepoId,
    ) -> Result<Option<Release>> {
        self.check_failing(&repo)?;

        let state = self.state.lock().unwrap();
        Ok(state.releases.get(&repo).and_then(|all| all.last().cloned()))
    }
}

#[async_trait]
impl PullRequestProvider for MemoryForge {
    async fn get_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>> {
        let state = self.state.lock().unwrap();
        Ok(state.open_prs.get(&(req.repo, req.head_branch)).cloned())
    }

    async fn create_pr(
        &self,
        req: CreatePrRequest,
    ) -> Result<CreatePrResponse> {
        let mut state = self.state.lock().unwrap();
        state.created.push(req.clone());

        if let Some((status, body)) = state.rejection.clone() {
            return Ok(CreatePrResponse::Rejected { status, body });
        }

        state.next_number += 1;
        let number = state.next_number;

        let pr = PullRequest {
            number,
            url: format!("https://github.com/{}/pull/{number}", req.repo),
        };

        state
            .open_prs
            .insert((req.repo, req.head_branch), pr.clone());

        Ok(CreatePrResponse::Created(pr))
    }
}
