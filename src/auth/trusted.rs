//! Credentials for the trusted-domain path

use crate::error::{Error, Result};

/// Environment variable holding an elevated (installation) token
pub const ELEVATED_TOKEN_VAR: &str = "QPR_ELEVATED_TOKEN";

/// Environment variable holding the contributor's identity token for the worker
pub const ID_TOKEN_VAR: &str = "QPR_ID_TOKEN";

/// Credential used to submit batches
#[derive(Clone, PartialEq, Eq)]
pub enum TrustedCredential {
    /// Token with write access to the upstream repository, used in-process
    Elevated(String),
    /// Identity token presented to a contribution worker
    Identity(String),
}

impl std::fmt::Debug for TrustedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Elevated(_) => f.write_str("Elevated(..)"),
            Self::Identity(_) => f.write_str("Identity(..)"),
        }
    }
}

/// Pick the trusted-path credential
///
/// With a worker configured the identity token is required; otherwise the
/// elevated token is.
pub fn get_trusted_credential<F>(has_worker: bool, env: F) -> Result<TrustedCredential>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |var: &str| env(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if has_worker {
        lookup(ID_TOKEN_VAR)
            .map(TrustedCredential::Identity)
            .ok_or_else(|| Error::Auth(format!("{ID_TOKEN_VAR} is not set")))
    } else {
        lookup(ELEVATED_TOKEN_VAR)
            .map(TrustedCredential::Elevated)
            .ok_or_else(|| {
                Error::Auth(format!(
                    "{ELEVATED_TOKEN_VAR} is not set and no worker URL is configured"
                ))
            })
    }
}

/// Whether `email` belongs to one of `domains`
///
/// The domain after the last `@` must match exactly, ignoring case.
pub fn is_trusted_email(email: &str, domains: &[String]) -> bool {
    let Some((local, domain)) = email.trim().rsplit_once('@') else {
        return false;
    };
    !local.is_empty() && domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains() -> Vec<String> {
        vec!["iisermohali.ac.in".to_string()]
    }

    #[test]
    fn test_trusted_email() {
        assert!(is_trusted_email("ms21001@iisermohali.ac.in", &domains()));
        assert!(is_trusted_email("MS21001@IISERMohali.ac.in", &domains()));
        assert!(!is_trusted_email("ms21001@evil-iisermohali.ac.in", &domains()));
        assert!(!is_trusted_email("ms21001@iisermohali.ac.in.evil.com", &domains()));
        assert!(!is_trusted_email("@iisermohali.ac.in", &domains()));
        assert!(!is_trusted_email("no-at-sign", &domains()));
    }

    #[test]
    fn test_credential_selection() {
        let env = |var: &str| match var {
            ELEVATED_TOKEN_VAR => Some("ghs_elevated".to_string()),
            ID_TOKEN_VAR => Some("  ".to_string()),
            _ => None,
        };
        assert_eq!(
            get_trusted_credential(false, env).unwrap(),
            TrustedCredential::Elevated("ghs_elevated".to_string())
        );
        assert!(matches!(get_trusted_credential(true, env), Err(Error::Auth(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let cred = TrustedCredential::Identity("secret".to_string());
        assert_eq!(format!("{cred:?}"), "Identity(..)");
    }
}
