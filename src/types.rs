//! Core types for qpr-contrib

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is submitting a contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Submitter {
    /// Verified by institutional email domain (trusted-domain path)
    Trusted {
        /// Institutional email address
        email: String,
        /// Display name
        name: String,
    },
    /// Authorized through their own GitHub account (delegated path)
    OAuth {
        /// GitHub login
        login: String,
    },
}

impl Submitter {
    /// Short identity used to derive branch names
    pub fn handle(&self) -> &str {
        match self {
            Self::Trusted { email, .. } => email.split('@').next().unwrap_or(email),
            Self::OAuth { login } => login,
        }
    }

    /// Attribution line for pull-request bodies
    pub fn attribution(&self) -> String {
        match self {
            Self::Trusted { email, name } if name.trim().is_empty() => {
                format!("Contributed by {email}")
            }
            Self::Trusted { email, name } => format!("Contributed by {name} ({email})"),
            Self::OAuth { login } => format!("Contributed by @{login}"),
        }
    }
}

/// A GitHub repository coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoRef {
    /// Create a repository coordinate
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A pull request opened for a contribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Upstream repository that receives contributions
    pub upstream: RepoRef,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

/// One (folder, display name) pair confirmed uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Destination folder path
    pub folder: String,
    /// File display name
    pub name: String,
}

impl ManifestEntry {
    /// Create an entry
    pub fn new(folder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }

    /// Repository path of the file
    pub fn path(&self) -> String {
        format!("{}/{}", self.folder, self.name)
    }
}

/// Title and free-text description for the pull request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrDetails {
    /// Pull request title (required)
    pub title: String,
    /// Optional description placed above the file listing
    pub description: String,
}
