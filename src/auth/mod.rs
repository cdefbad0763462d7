//! Authentication for contributions
//!
//! The delegated path uses the contributor's own GitHub token (gh CLI or
//! environment). The trusted path uses an elevated credential or a worker
//! identity token, and is open only to institutional email domains.

mod github;
mod trusted;

pub use github::{GitHubAuthConfig, get_github_auth, oauth_authorize_url, test_github_auth};
pub use trusted::{
    ELEVATED_TOKEN_VAR, ID_TOKEN_VAR, TrustedCredential, get_trusted_credential,
    is_trusted_email,
};

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from the gh CLI
    Cli,
    /// Token from environment variable
    EnvVar,
}
