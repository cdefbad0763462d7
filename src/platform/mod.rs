//! Remote hosting platform
//!
//! Provides the repository operations a contribution needs: forks, branches,
//! file commits and pull requests.

mod detection;
mod factory;
mod github;
mod retry;

pub use detection::parse_repo_spec;
pub use factory::create_platform_service;
pub use github::GitHubService;
pub use retry::{RetryPolicy, with_timeout};

use crate::error::Result;
use crate::types::{PlatformConfig, PullRequest, RepoRef};
use async_trait::async_trait;

/// Platform service trait for repository operations
///
/// The contribution pipeline only talks to the hosting service through this
/// trait; tests substitute a recording mock.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Login of the account behind the credential
    async fn current_user(&self) -> Result<String>;

    /// The user's fork of the upstream repository, if one exists
    async fn find_fork(&self, owner: &str) -> Result<Option<RepoRef>>;

    /// Fork the upstream repository into the authenticated account
    async fn create_fork(&self) -> Result<RepoRef>;

    /// Default branch of a repository
    async fn default_branch(&self, repo: &RepoRef) -> Result<String>;

    /// Commit SHA at the head of a branch
    async fn branch_sha(&self, repo: &RepoRef, branch: &str) -> Result<String>;

    /// Create a branch pointing at `sha`
    async fn create_branch(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<()>;

    /// Commit a single file onto a branch
    async fn put_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<()>;

    /// Open a pull request against the upstream repository
    ///
    /// `head` is `branch` for same-repository PRs or `owner:branch` from a fork.
    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str)
    -> Result<PullRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
