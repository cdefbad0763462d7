//! Repository spec parsing

use crate::error::{Error, Result};
use crate::types::RepoRef;
use regex::Regex;
use std::sync::OnceLock;

fn ssh_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^git@[^:]+:(.+?)(?:\.git)?/?$").expect("hardcoded SSH pattern is valid")
    })
}

/// Parse `owner/repo`, an HTTPS URL, or an SSH remote into a [`RepoRef`]
///
/// Hosts other than github.com are accepted so Enterprise remotes work.
pub fn parse_repo_spec(spec: &str) -> Result<RepoRef> {
    let spec = spec.trim();

    // SSH format: git@host:owner/repo.git
    // HTTPS format: https://host/owner/repo.git
    let path = if let Some(caps) = ssh_re().captures(spec) {
        caps.get(1).map(|m| m.as_str().to_string())
    } else if spec.starts_with("http://") || spec.starts_with("https://") {
        url::Url::parse(spec)
            .ok()
            .map(|u| u.path().trim_matches('/').trim_end_matches(".git").to_string())
    } else {
        Some(spec.trim_matches('/').to_string())
    }
    .ok_or_else(|| Error::Parse(format!("cannot parse repository: {spec}")))?;

    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
        [owner, repo] if !owner.is_empty() && !repo.is_empty() => {
            Ok(RepoRef::new(*owner, *repo))
        }
        _ => Err(Error::Parse(format!("invalid repo path: {path}"))),
    }
}
