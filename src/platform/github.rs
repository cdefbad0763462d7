//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, RetryPolicy};
use crate::types::{PlatformConfig, PullRequest, RepoRef};
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::models::repos::Object;
use octocrab::params::repos::Reference;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    retry: RetryPolicy,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(
        token: &str,
        upstream: RepoRef,
        host: Option<String>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig { upstream, host },
            retry,
        })
    }

    fn upstream(&self) -> &RepoRef {
        &self.config.upstream
    }
}

fn is_not_found(err: &octocrab::Error) -> bool {
    matches!(err, octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404)
}

/// Percent-encode each segment of a repository path for the contents API
fn encode_content_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn current_user(&self) -> Result<String> {
        self.retry
            .retry_read("current user", move || async move {
                let user = self.client.current().user().await?;
                Ok(user.login)
            })
            .await
    }

    async fn find_fork(&self, owner: &str) -> Result<Option<RepoRef>> {
        let repo_name = self.upstream().repo.as_str();
        self.retry
            .retry_read("find fork", move || async move {
                match self.client.repos(owner, repo_name).get().await {
                    Ok(repo) => {
                        let login = repo.owner.map_or_else(|| owner.to_string(), |o| o.login);
                        Ok(Some(RepoRef::new(login, repo.name)))
                    }
                    Err(e) if is_not_found(&e) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    async fn create_fork(&self) -> Result<RepoRef> {
        let upstream = self.upstream();
        let fork = self
            .retry
            .write_once("create fork", async {
                Ok(self
                    .client
                    .repos(&upstream.owner, &upstream.repo)
                    .create_fork()
                    .send()
                    .await?)
            })
            .await?;

        let owner = fork
            .owner
            .map(|o| o.login)
            .ok_or_else(|| Error::GitHubApi("fork response has no owner".to_string()))?;
        Ok(RepoRef::new(owner, fork.name))
    }

    async fn default_branch(&self, repo: &RepoRef) -> Result<String> {
        self.retry
            .retry_read("default branch", move || async move {
                let info = self.client.repos(&repo.owner, &repo.repo).get().await?;
                Ok(info.default_branch.unwrap_or_else(|| "main".to_string()))
            })
            .await
    }

    async fn branch_sha(&self, repo: &RepoRef, branch: &str) -> Result<String> {
        self.retry
            .retry_read("branch head", move || async move {
                let reference = Reference::Branch(branch.to_string());
                let found = self
                    .client
                    .repos(&repo.owner, &repo.repo)
                    .get_ref(&reference)
                    .await?;
                match found.object {
                    Object::Commit { sha, .. } | Object::Tag { sha, .. } => Ok(sha),
                    #[allow(unreachable_patterns)]
                    _ => Err(Error::GitHubApi(format!(
                        "{branch} does not point at a commit"
                    ))),
                }
            })
            .await
    }

    async fn create_branch(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<()> {
        debug!(%repo, branch, sha, "creating branch");
        self.retry
            .write_once("create branch", async {
                self.client
                    .repos(&repo.owner, &repo.repo)
                    .create_ref(&Reference::Branch(branch.to_string()), sha)
                    .await?;
                Ok(())
            })
            .await
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<()> {
        debug!(%repo, branch, path, bytes = content.len(), "committing file");
        self.retry
            .write_once("upload file", async {
                self.client
                    .repos(&repo.owner, &repo.repo)
                    .create_file(encode_content_path(path), message, content)
                    .branch(branch)
                    .send()
                    .await?;
                Ok(())
            })
            .await
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        let upstream = self.upstream();
        let pr = self
            .retry
            .write_once("create pull request", async {
                Ok(self
                    .client
                    .pulls(&upstream.owner, &upstream.repo)
                    .create(title, head, base)
                    .body(body)
                    .send()
                    .await?)
            })
            .await?;

        Ok(PullRequest {
            number: pr.number,
            html_url: pr
                .html_url
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        })
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
