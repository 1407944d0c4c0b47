//! CLI argument parsing and environment fallback.
//!
//! This is the only module that reads the process environment. Everything it
//! resolves ends up in a validated [`Config`].
use clap::Parser;
use secrecy::SecretString;
use std::{env, fs, path::PathBuf};
use url::Url;

use crate::{
    config::{
        BranchStrategy, Config, DEFAULT_API_URL, DEFAULT_BASE_BRANCH,
        DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL, DEFAULT_OUTPUT_DIR,
        DEFAULT_REMOTE, EnrichmentConfig, RepoId, parse_repo_list,
    },
    error::{NotesError, Result},
};

/// Comma-delimited `owner/repo` list.
pub const REPOS_ENV: &str = "SOURCE_REPOS";
/// Exact release tag to document.
pub const TAG_ENV: &str = "RELEASE_TAG";
/// GitHub token variables, in lookup order.
pub const GITHUB_TOKEN_ENVS: [&str; 2] =
    ["GITHUB_TOKEN", "GITHUB_PERSONAL_ACCESS_TOKEN"];
/// Gemini API key. Enrichment is enabled only when this resolves.
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Generate stakeholder-friendly release notes from GitHub releases and open
/// pull requests with them.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = "")]
    /// Comma-delimited owner/repo list. Falls back to SOURCE_REPOS env var.
    pub repos: String,

    #[arg(long, default_value = "")]
    /// Exact release tag. Falls back to RELEASE_TAG env var, then to the
    /// latest release.
    pub tag: String,

    #[arg(long, default_value = "")]
    /// GitHub token. Falls back to GITHUB_TOKEN, then
    /// GITHUB_PERSONAL_ACCESS_TOKEN env vars.
    pub github_token: String,

    #[arg(long, default_value = DEFAULT_API_URL)]
    /// GitHub API base URL.
    pub github_api_url: String,

    #[arg(long, default_value = "")]
    /// Gemini API key enabling the impact analysis section. Falls back to
    /// GEMINI_API_KEY env var.
    pub gemini_api_key: String,

    #[arg(long, default_value = DEFAULT_GEMINI_MODEL)]
    /// Gemini model used for impact analysis.
    pub gemini_model: String,

    #[arg(long, default_value = DEFAULT_GEMINI_URL)]
    /// Gemini API base URL.
    pub gemini_url: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    /// Directory, relative to the working tree, documents are written to.
    pub output_dir: PathBuf,

    #[arg(long, default_value = ".")]
    /// Local git working tree documents are committed from.
    pub workdir: PathBuf,

    #[arg(long, default_value = DEFAULT_REMOTE)]
    /// Remote branches are fetched from and pushed to.
    pub remote: String,

    #[arg(long, default_value = DEFAULT_BASE_BRANCH)]
    /// Branch new notes branches start from and pull requests target.
    pub base_branch: String,

    #[arg(long, value_enum, default_value_t = BranchStrategy::PerRepo)]
    /// Reuse one branch per repository, or create one per tag.
    pub branch_strategy: BranchStrategy,

    #[arg(long)]
    /// Repository (owner/repo) hosting the working tree. Pull requests are
    /// opened here instead of in each source repository.
    pub target_repo: Option<String>,

    #[arg(long)]
    /// Path to a tera template replacing the built-in note layout.
    pub template: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    /// Write documents without touching git or opening pull requests.
    pub dry_run: bool,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

/// First non-empty value among `value` and the named env vars.
fn resolve(value: &str, env_vars: &[&str]) -> Option<String> {
    if !value.trim().is_empty() {
        return Some(value.trim().to_string());
    }

    env_vars
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| {
        NotesError::config(format!("invalid {name} '{value}': {e}"))
    })
}

impl Args {
    /// Resolve arguments and environment into a validated [`Config`].
    pub fn to_config(&self) -> Result<Config> {
        let repos = resolve(&self.repos, &[REPOS_ENV]).ok_or_else(|| {
            NotesError::config(format!(
                "must set --repos or the {REPOS_ENV} env var"
            ))
        })?;

        let github_token =
            resolve(&self.github_token, &GITHUB_TOKEN_ENVS).ok_or_else(|| {
                NotesError::config(format!(
                    "must set --github-token or one of {} env vars",
                    GITHUB_TOKEN_ENVS.join(", ")
                ))
            })?;

        let mut builder = Config::builder();

        builder
            .repos(parse_repo_list(&repos)?)
            .github_token(SecretString::from(github_token))
            .api_url(parse_url("github api url", &self.github_api_url)?)
            .output_dir(self.output_dir.clone())
            .workdir(self.workdir.clone())
            .remote(self.remote.clone())
            .base_branch(self.base_branch.clone())
            .branch_strategy(self.branch_strategy)
            .dry_run(self.dry_run);

        if let Some(tag) = resolve(&self.tag, &[TAG_ENV]) {
            builder.tag(tag);
        }

        if let Some(api_key) = resolve(&self.gemini_api_key, &[GEMINI_KEY_ENV])
        {
            builder.enrichment(EnrichmentConfig {
                api_key: SecretString::from(api_key),
                model: self.gemini_model.clone(),
                base_url: parse_url("gemini url", &self.gemini_url)?,
            });
        }

        if let Some(target) = self.target_repo.as_deref() {
            builder.target_repo(target.parse::<RepoId>()?);
        }

        if let Some(path) = self.template.as_ref() {
            let template = fs::read_to_string(path).map_err(|e| {
                NotesError::config(format!(
                    "failed to read template {}: {e}",
                    path.display()
                ))
            })?;
            builder.template(template);
        }

        builder.build()
    }
}
