//! Platform service factory
//!
//! Creates platform services based on configuration.

use crate::error::Result;
use crate::platform::{GitHubService, PlatformService, RetryPolicy};
use crate::types::PlatformConfig;

/// Create a platform service from configuration and a resolved token
///
/// The token decides the path: a user token for delegated contributions,
/// the elevated credential for trusted ones.
pub fn create_platform_service(
    config: &PlatformConfig,
    token: &str,
    retry: RetryPolicy,
) -> Result<Box<dyn PlatformService>> {
    Ok(Box::new(GitHubService::new(
        token,
        config.upstream.clone(),
        config.host.clone(),
        retry,
    )?))
}
