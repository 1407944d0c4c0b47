//! Implements the provider traits for Github
use async_trait::async_trait;
use log::*;
use octocrab::{Octocrab, params};
use reqwest::StatusCode;
use secrecy::SecretString;
use url::Url;

use crate::{
    config::RepoId,
    error::Result,
    forge::{
        request::{
            CreatePrRequest, CreatePrResponse, GetPrRequest, PullRequest,
            Release,
        },
        traits::{PullRequestProvider, ReleaseProvider},
    },
};

/// GitHub provider using Octocrab for release lookups and pull request
/// reconciliation.
pub struct Github {
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(api_url: &Url, token: SecretString) -> Result<Self> {
        let instance = Octocrab::builder()
            .personal_token(token)
            .base_uri(api_url.as_str())?
            .build()?;

        Ok(Self { instance })
    }
}

fn to_release(
    repo: RepoId,
    release: octocrab::models::repos::Release,
) -> Release {
    Release {
        repo,
        tag: release.tag_name,
        body: release.body.unwrap_or_default(),
        url: release.html_url.to_string(),
    }
}

fn to_pull_request(pr: octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        url: pr.html_url.map(|u| u.to_string()).unwrap_or_default(),
    }
}

#[async_trait]
impl ReleaseProvider for Github {
    async fn get_release_by_tag(
        &self,
        repo: RepoId,
        tag: String,
    ) -> Result<Option<Release>> {
        debug!("looking up release {tag} for {repo}");

        let result = self
            .instance
            .repos(&repo.owner, &repo.repo)
            .releases()
            .get_by_tag(&tag)
            .await;

        match result {
            Ok(release) => Ok(Some(to_release(repo, release))),
            Err(octocrab::Error::GitHub { source, .. })
                if source.status_code == StatusCode::NOT_FOUND =>
            {
                info!("no release found for tag {tag} in {repo}");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get_latest_release(
        &self,
        repo: RepoId,
    ) -> Result<Option<Release>> {
        debug!("listing most recent release for {repo}");

        let page = self
            .instance
            .repos(&repo.owner, &repo.repo)
            .releases()
            .list()
            .per_page(1)
            .send()
            .await?;

        Ok(page
            .items
            .into_iter()
            .next()
            .map(|release| to_release(repo, release)))
    }
}

#[async_trait]
impl PullRequestProvider for Github {
    async fn get_open_pr(
        &self,
        req: GetPrRequest,
    ) -> Result<Option<PullRequest>> {
        let head = format!("{}:{}", req.head_owner, req.head_branch);

        let prs = self
            .instance
            .pulls(&req.repo.owner, &req.repo.repo)
            .list()
            .state(params::State::Open)
            .head(head)
            .send()
            .await?;

        Ok(prs.items.into_iter().next().map(to_pull_request))
    }

    async fn create_pr(
        &self,
        req: CreatePrRequest,
    ) -> Result<CreatePrResponse> {
        let result = self
            .instance
            .pulls(&req.repo.owner, &req.repo.repo)
            .create(req.title, req.head_branch, req.base_branch)
            .body(req.body)
            .send()
            .await;

        match result {
            Ok(pr) => Ok(CreatePrResponse::Created(to_pull_request(pr))),
            Err(octocrab::Error::GitHub { source, .. }) => {
                let mut body = source.message.clone();

                if let Some(errors) = &source.errors
                    && !errors.is_empty()
                {
                    body = format!(
                        "{body}: {}",
                        serde_json::Value::Array(errors.clone())
                    );
                }

                Ok(CreatePrResponse::Rejected {
                    status: source.status_code.as_u16(),
                    body,
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
