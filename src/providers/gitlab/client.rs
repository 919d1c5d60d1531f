use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{CimonError, Result};
use crate::model::{Commit, Job, JobId, Pipeline, PipelineId, ProjectId};
use crate::providers::DataSource;

use super::types::{CommitNode, JobNode, PipelineNode};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab REST v4 client.
pub struct GitLabClient {
    client: Client,
    api_url: Url,
    token: Option<Token>,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("cimon/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CimonError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let api_url = Url::parse(&base)
            .map_err(|e| CimonError::Config(format!("Invalid base URL: {e}")))?
            .join("api/v4/")
            .map_err(|e| CimonError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.header(TOKEN_HEADER, token.as_str())
        } else {
            request
        }
    }

    fn project_url(&self, project: ProjectId, path: &str) -> Result<Url> {
        self.api_url
            .join(&format!("projects/{project}/{path}"))
            .map_err(|e| CimonError::Config(format!("Invalid project URL: {e}")))
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        debug!("GET {url}");
        let path = url.path().to_string();
        let response = self.auth_request(self.client.get(url)).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CimonError::NotFound(path));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(CimonError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl DataSource for GitLabClient {
    async fn list_pipelines(&self, project: ProjectId, limit: usize) -> Result<Vec<Pipeline>> {
        let mut url = self.project_url(project, "pipelines")?;
        url.query_pairs_mut()
            .append_pair("per_page", &limit.to_string());

        let nodes: Vec<PipelineNode> = self.get_json(url).await?;
        let mut pipelines: Vec<Pipeline> = nodes.into_iter().map(Pipeline::from).collect();
        pipelines.truncate(limit);
        Ok(pipelines)
    }

    async fn list_jobs(&self, project: ProjectId, pipeline: PipelineId) -> Result<Vec<Job>> {
        let url = self.project_url(project, &format!("pipelines/{pipeline}/jobs"))?;
        let nodes: Vec<JobNode> = self.get_json(url).await?;
        Ok(nodes.into_iter().map(Job::from).collect())
    }

    async fn get_log(&self, project: ProjectId, job: JobId) -> Result<String> {
        let url = self.project_url(project, &format!("jobs/{job}/trace"))?;
        self.get_text(url).await
    }

    async fn get_commit(&self, project: ProjectId, sha: &str) -> Result<Commit> {
        let url = self.project_url(
            project,
            &format!("repository/commits/{}", urlencoding::encode(sha)),
        )?;
        let node: CommitNode = self.get_json(url).await?;
        Ok(node.into())
    }
}
