//! Run configuration for notesmith.
//!
//! [`Config`] is built once at process start (see [`crate::cli`]) and handed
//! to the orchestrator by reference. Nothing below this module reads the
//! process environment.
use derive_builder::Builder;
use secrecy::{ExposeSecret, SecretString};
use std::{fmt, path::PathBuf, str::FromStr};
use url::Url;

use crate::error::{NotesError, Result};

/// Default GitHub REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Default directory, relative to the working tree, that receives drafts.
pub const DEFAULT_OUTPUT_DIR: &str = "drafts";
/// Default remote the notes branch is fetched from and pushed to.
pub const DEFAULT_REMOTE: &str = "origin";
/// Default base branch new notes branches start from and PRs target.
pub const DEFAULT_BASE_BRANCH: &str = "main";
/// Prefix shared by every branch notesmith creates.
pub const DEFAULT_BRANCH_PREFIX: &str = "release-notes";
/// Default Gemini model used for enrichment.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com";

/// A repository identifier in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();

        match trimmed.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty()
                    && !repo.is_empty()
                    && !repo.contains('/') =>
            {
                Ok(Self::new(owner, repo))
            }
            _ => Err(NotesError::config(format!(
                "repository identifier must be in owner/repo form: '{trimmed}'"
            ))),
        }
    }
}

/// Parse a comma-delimited repository list, preserving order and dropping
/// blank entries.
pub fn parse_repo_list(list: &str) -> Result<Vec<RepoId>> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(RepoId::from_str)
        .collect()
}

/// How notes branches are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum BranchStrategy {
    /// One branch per repository, reused across tags.
    #[default]
    PerRepo,
    /// One branch per repository and tag.
    PerTag,
}

/// Settings for the optional generative enrichment step.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: Url,
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default api url is valid")
}

#[derive(Debug, Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct ConfigParams {
    pub repos: Vec<RepoId>,
    pub github_token: SecretString,
    #[builder(setter(into, strip_option), default)]
    pub tag: Option<String>,
    #[builder(default = "default_api_url()")]
    pub api_url: Url,
    #[builder(setter(into, strip_option), default)]
    pub enrichment: Option<EnrichmentConfig>,
    #[builder(default = "PathBuf::from(DEFAULT_OUTPUT_DIR)")]
    pub output_dir: PathBuf,
    #[builder(default = "PathBuf::from(\".\")")]
    pub workdir: PathBuf,
    #[builder(default = "DEFAULT_REMOTE.into()")]
    pub remote: String,
    #[builder(default = "DEFAULT_BASE_BRANCH.into()")]
    pub base_branch: String,
    #[builder(default)]
    pub branch_strategy: BranchStrategy,
    #[builder(setter(into, strip_option), default)]
    pub target_repo: Option<RepoId>,
    #[builder(setter(into, strip_option), default)]
    pub template: Option<String>,
    #[builder(default)]
    pub dry_run: bool,
}

impl ConfigParamsBuilder {
    pub fn build(&self) -> Result<Config> {
        let params = self._build().map_err(|e| {
            NotesError::config(format!("Failed to build config: {}", e))
        })?;
        Config::new(params)
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Source repositories, processed in this order.
    pub repos: Vec<RepoId>,
    /// Exact release tag to fetch. `None` means the latest release.
    pub tag: Option<String>,
    pub github_token: SecretString,
    pub api_url: Url,
    /// Present only when a generative service credential was supplied.
    pub enrichment: Option<EnrichmentConfig>,
    pub output_dir: PathBuf,
    /// Root of the working tree documents are written into and committed from.
    pub workdir: PathBuf,
    pub remote: String,
    pub base_branch: String,
    pub branch_strategy: BranchStrategy,
    /// Repository hosting the working tree. PRs are opened here when set,
    /// otherwise against each source repository.
    pub target_repo: Option<RepoId>,
    /// Custom tera template for the note document.
    pub template: Option<String>,
    pub dry_run: bool,
}

impl Config {
    pub fn builder() -> ConfigParamsBuilder {
        ConfigParamsBuilder::default()
    }

    pub fn new(params: ConfigParams) -> Result<Self> {
        if params.repos.is_empty() {
            return Err(NotesError::config(
                "at least one source repository is required",
            ));
        }

        if params.github_token.expose_secret().trim().is_empty() {
            return Err(NotesError::config("a GitHub token is required"));
        }

        if params.remote.trim().is_empty() {
            return Err(NotesError::config("remote name must not be empty"));
        }

        if params.base_branch.trim().is_empty() {
            return Err(NotesError::config("base branch must not be empty"));
        }

        let tag = params
            .tag
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Ok(Self {
            repos: params.repos,
            tag,
            github_token: params.github_token,
            api_url: params.api_url,
            enrichment: params.enrichment,
            output_dir: params.output_dir,
            workdir: params.workdir,
            remote: params.remote,
            base_branch: params.base_branch,
            branch_strategy: params.branch_strategy,
            target_repo: params.target_repo,
            template: params.template,
            dry_run: params.dry_run,
        })
    }
}
