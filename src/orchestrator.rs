//! Drives the per-repository pipeline: fetch, interpret, enrich, compose and
//! publish, one repository at a time.
use derive_builder::Builder;
use log::*;
use std::{fmt, rc::Rc};

use crate::{
    composer::{NoteComposer, NoteDocument},
    config::{Config, RepoId},
    enricher::{Enricher, GenerativeTextProvider, gemini::Gemini},
    error::{NotesError, Result},
    forge::{
        github::Github,
        traits::{PullRequestProvider, ReleaseProvider},
    },
    interpreter::{self, ChangeSet},
    publish::{
        PublishCoordinator, PublishOutcome, git::GitRepository,
        vcs::VersionControl,
    },
    release::fetch_release,
};

/// Terminal state of one repository's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoOutcome {
    Published { number: u64, url: String },
    PrExists { number: u64, url: String },
    /// Release body was blank, nothing was written.
    Skipped,
    Failed { reason: String },
    DryRun,
}

impl fmt::Display for RepoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published { number, url } => {
                write!(f, "published PR #{number} ({url})")
            }
            Self::PrExists { number, url } => {
                write!(f, "PR #{number} already exists ({url})")
            }
            Self::Skipped => write!(f, "skipped: empty release notes"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::DryRun => write!(f, "dry run: document written"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReport {
    pub repo: RepoId,
    pub outcome: RepoOutcome,
}

/// Outcomes of a run, in the order repositories were configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub repos: Vec<RepoReport>,
}

impl RunReport {
    pub fn failed(&self) -> usize {
        self.repos
            .iter()
            .filter(|r| matches!(r.outcome, RepoOutcome::Failed { .. }))
            .count()
    }

    pub fn log_summary(&self) {
        info!("processed {} repositories", self.repos.len());

        for report in self.repos.iter() {
            match report.outcome {
                RepoOutcome::Failed { .. } => {
                    error!("{}: {}", report.repo, report.outcome)
                }
                _ => info!("{}: {}", report.repo, report.outcome),
            }
        }
    }
}

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Rc<Config>,
    pub releases: Rc<dyn ReleaseProvider>,
    pub pull_requests: Rc<dyn PullRequestProvider>,
    pub vcs: Rc<dyn VersionControl>,
    #[builder(setter(into, strip_option), default)]
    pub generator: Option<Rc<dyn GenerativeTextProvider>>,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            NotesError::config(format!("Failed to build orchestrator: {}", e))
        })?;
        Orchestrator::new(params)
    }
}

pub struct Orchestrator {
    config: Rc<Config>,
    releases: Rc<dyn ReleaseProvider>,
    enricher: Option<Enricher>,
    composer: NoteComposer,
    publisher: PublishCoordinator,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Result<Self> {
        let composer = NoteComposer::new(params.config.template.as_deref())?;

        Ok(Self {
            config: Rc::clone(&params.config),
            releases: params.releases,
            enricher: params.generator.map(Enricher::new),
            composer,
            publisher: PublishCoordinator::new(
                Rc::clone(&params.config),
                params.vcs,
                params.pull_requests,
            ),
        })
    }

    /// Wires the GitHub, git and (when configured) Gemini clients.
    pub fn from_config(config: Config) -> Result<Self> {
        let github =
            Rc::new(Github::new(&config.api_url, config.github_token.clone())?);

        let vcs =
            GitRepository::open(&config.workdir, config.github_token.clone())?;

        let mut builder = Self::builder();

        if let Some(enrichment) = config.enrichment.as_ref() {
            info!("enrichment enabled with model {}", enrichment.model);
            let gemini = Rc::new(Gemini::new(enrichment));
            builder.generator(gemini as Rc<dyn GenerativeTextProvider>);
        }

        builder
            .config(config)
            .releases(Rc::clone(&github) as Rc<dyn ReleaseProvider>)
            .pull_requests(github as Rc<dyn PullRequestProvider>)
            .vcs(Rc::new(vcs) as Rc<dyn VersionControl>)
            .build()
    }

    /// Processes every configured repository in order. Failures are recorded
    /// in the report and never stop iteration.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        for repo in self.config.repos.iter() {
            info!("processing {repo}");

            let outcome = match self.process(repo).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("{repo}: {err}");
                    RepoOutcome::Failed {
                        reason: err.to_string(),
                    }
                }
            };

            report.repos.push(RepoReport {
                repo: repo.clone(),
                outcome,
            });
        }

        report
    }

    async fn process(&self, repo: &RepoId) -> Result<RepoOutcome> {
        let tag = self.config.tag.as_deref();
        let release = fetch_release(self.releases.as_ref(), repo, tag).await?;

        info!("found release {} for {repo}", release.tag);

        if interpreter::is_blank(&release.body) {
            warn!("release {} for {repo} has no notes: skipping", release.tag);
            return Ok(RepoOutcome::Skipped);
        }

        let changes = ChangeSet::interpret(&release.body);

        if changes.is_empty() {
            warn!(
                "release {} for {repo} has no change lines: skipping",
                release.tag
            );
            return Ok(RepoOutcome::Skipped);
        }

        debug!("interpreted {} changes for {repo}", changes.len());

        let impact = match self.enricher.as_ref() {
            Some(enricher) => Some(enricher.enrich(&changes).await?),
            None => None,
        };

        let document = NoteDocument::new(&release, &changes, impact);
        let rendered = self.composer.render(&document)?;

        let outcome = match self.publisher.publish(&release, &rendered).await? {
            PublishOutcome::Published(pr) => RepoOutcome::Published {
                number: pr.number,
                url: pr.url,
            },
            PublishOutcome::PrExists(pr) => RepoOutcome::PrExists {
                number: pr.number,
                url: pr.url,
            },
            PublishOutcome::Failed { status, body } => RepoOutcome::Failed {
                reason: format!("pull request rejected ({status}): {body}"),
            },
            PublishOutcome::DryRun => RepoOutcome::DryRun,
        };

        Ok(outcome)
    }
}
