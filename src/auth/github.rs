//! GitHub authentication for the delegated path

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use std::env;
use tokio::process::Command;
use url::Url;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// Scope needed to fork public repositories and open pull requests
pub const OAUTH_SCOPE: &str = "public_repo";

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
    /// GitHub Enterprise host, if any
    pub host: Option<String>,
}

/// Get GitHub authentication
///
/// Priority:
/// 1. gh CLI (`gh auth token`)
/// 2. `GITHUB_TOKEN` environment variable
/// 3. `GH_TOKEN` environment variable
pub async fn get_github_auth(host: Option<&str>) -> Result<GitHubAuthConfig> {
    if let Some(token) = get_gh_cli_token(host).await {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
            host: host.map(String::from),
        });
    }

    for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
        let token = env::var(var).ok().map(|t| t.trim().to_string());
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            return Ok(GitHubAuthConfig {
                token,
                source: AuthSource::EnvVar,
                host: host.map(String::from),
            });
        }
    }

    Err(Error::Auth(
        "No GitHub authentication found. Run `gh auth login` or set GITHUB_TOKEN".to_string(),
    ))
}

async fn get_gh_cli_token(host: Option<&str>) -> Option<String> {
    let mut args = vec!["auth", "token"];
    if let Some(h) = host {
        args.extend(["--hostname", h]);
    }

    let output = Command::new("gh").args(&args).output().await.ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() { None } else { Some(token) }
}

/// Test GitHub authentication, returning the login behind the token
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    let mut builder = octocrab::Octocrab::builder().personal_token(config.token.clone());
    if let Some(h) = &config.host {
        builder = builder
            .base_uri(format!("https://{h}/api/v3"))
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
    }
    let octocrab = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

    let user = octocrab
        .current()
        .user()
        .await
        .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?;

    Ok(user.login)
}

/// Build the URL that starts the OAuth authorization for the delegated path
pub fn oauth_authorize_url(client_id: &str, redirect_uri: &str, state: &str) -> Result<String> {
    let redirect = parse_redirect_uri(redirect_uri)?;
    Ok(format!(
        "{AUTHORIZE_URL}?client_id={}&redirect_uri={}&scope={OAUTH_SCOPE}&state={}",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect.as_str()),
        urlencoding::encode(state),
    ))
}

fn parse_redirect_uri(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::Auth(format!("invalid redirect URI: {e}")))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1")) => Ok(url),
        other => Err(Error::Auth(format!(
            "redirect URI must use https, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_parameters() {
        let url = oauth_authorize_url(
            "Iv1.abc",
            "https://iiserm.github.io/question-paper-repo/contribute.html",
            "x y",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://github.com/login/oauth/authorize?client_id=Iv1.abc\
             &redirect_uri=https%3A%2F%2Fiiserm.github.io%2Fquestion-paper-repo%2Fcontribute.html\
             &scope=public_repo&state=x%20y"
        );
    }

    #[test]
    fn test_redirect_uri_scheme() {
        assert!(parse_redirect_uri("https://example.org/cb").is_ok());
        assert!(parse_redirect_uri("http://localhost:8080/cb").is_ok());
        assert!(parse_redirect_uri("http://example.org/cb").is_err());
        assert!(parse_redirect_uri("not a url").is_err());
        assert!(oauth_authorize_url("id", "ftp://example.org", "s").is_err());
    }
}
