//! Contribution branch naming and creation
//!
//! A session creates exactly one branch. Callers only reach
//! [`BranchCoordinator::create_from_default`] when no branch name is known
//! yet, which is true for the first batch alone.

use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{RepoRef, Submitter};
use chrono::{DateTime, Utc};
use tracing::info;

const BRANCH_PREFIX: &str = "contribution";

/// Derive a branch name from the submitter and a timestamp
///
/// `contribution-<handle>-<microseconds since epoch>`. The handle is reduced
/// to lowercase ASCII letters, digits and hyphens.
pub fn derive_branch_name(submitter: &Submitter, now: DateTime<Utc>) -> String {
    format!(
        "{BRANCH_PREFIX}-{}-{}",
        slugify(submitter.handle()),
        now.timestamp_micros()
    )
}

fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "contributor".to_string()
    } else {
        slug.to_string()
    }
}

/// Whether a batch must create the branch before uploading
pub const fn needs_branch(batch_index: usize, known_branch: Option<&str>) -> bool {
    batch_index == 0 && known_branch.is_none()
}

/// Creates the contribution branch on a repository
pub struct BranchCoordinator<'a> {
    platform: &'a dyn PlatformService,
}

impl<'a> BranchCoordinator<'a> {
    /// Coordinator over a platform service
    pub const fn new(platform: &'a dyn PlatformService) -> Self {
        Self { platform }
    }

    /// Create `name` in `repo` at the head of its default branch
    ///
    /// Returns the default branch name. Nothing else is attempted if the
    /// lookup or the creation fails.
    pub async fn create_from_default(&self, repo: &RepoRef, name: &str) -> Result<String> {
        let base = self.platform.default_branch(repo).await?;
        let sha = self.platform.branch_sha(repo, &base).await?;
        self.platform.create_branch(repo, name, &sha).await?;
        info!(%repo, branch = name, base = %base, "created contribution branch");
        Ok(base)
    }
}
