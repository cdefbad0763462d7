//! Auth command - test and explain authentication

use anstream::println;
use qpr_contrib::auth::{
    ELEVATED_TOKEN_VAR, ID_TOKEN_VAR, get_github_auth, oauth_authorize_url, test_github_auth,
};
use qpr_contrib::config::Config;
use qpr_contrib::error::Result;
use std::path::Path;

use crate::cli::style::{Stylize, check};

/// Run the auth test command
pub async fn run_auth_test(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    println!("Testing GitHub authentication...");
    let auth = get_github_auth(config.host.as_deref()).await?;
    let username = test_github_auth(&auth).await?;
    println!("{} Authenticated as: {}", check(), username.accent());
    println!("Token source: {:?}", auth.source);
    println!("Contributions go to: {}", config.upstream.accent());
    Ok(())
}

/// Run the auth setup command (show instructions)
pub fn run_auth_setup(client_id: Option<&str>, redirect_uri: Option<&str>) -> Result<()> {
    println!("{}", "Contributing with your GitHub account".emphasis());
    println!("=====================================");
    println!();
    println!("Option 1: GitHub CLI (recommended)");
    println!("  Install: https://cli.github.com/");
    println!("  Run: gh auth login");
    println!();
    println!("Option 2: Environment variable");
    println!("  Set GITHUB_TOKEN or GH_TOKEN (scope: public_repo)");
    println!();
    println!("For GitHub Enterprise:");
    println!("  Set GH_HOST to your instance hostname");

    if let (Some(client_id), Some(redirect_uri)) = (client_id, redirect_uri) {
        println!();
        println!("Authorize in a browser:");
        println!("  {}", oauth_authorize_url(client_id, redirect_uri, "qpr-cli")?);
    }

    println!();
    println!("{}", "Contributing with an institutional email".emphasis());
    println!("========================================");
    println!();
    println!("  With a contribution worker: set {ID_TOKEN_VAR} and worker_url");
    println!("  Without a worker: set {ELEVATED_TOKEN_VAR} to a token with write access");
    println!("  Then run: qpr contribute --direct --email you@iisermohali.ac.in ...");
    Ok(())
}
