//! Contribute command - upload files and open a pull request

use crate::cli::CliProgress;
use crate::cli::style::{Stream, Stylize, bang, check, hyperlink_url};
use anstream::{eprintln, println};
use dialoguer::Confirm;
use qpr_contrib::auth::{TrustedCredential, get_github_auth, get_trusted_credential};
use qpr_contrib::config::Config;
use qpr_contrib::contribute::{
    BatchTransport, ContributionRequest, ContributionResult, DirectBatchHandler, HttpTransport,
    contribute_batched, contribute_delegated, plan, report_dry_run, validate,
};
use qpr_contrib::error::{Error, Result};
use qpr_contrib::files::{FileEntry, UploadGroup, format_size};
use qpr_contrib::platform::create_platform_service;
use qpr_contrib::types::{PrDetails, Submitter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One `--group` argument: a folder and the files headed there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Folder path as typed
    pub folder: String,
    /// Local files, each with an optional display name
    pub files: Vec<(PathBuf, Option<String>)>,
}

/// Parse `FOLDER=FILE[::NAME][,FILE[::NAME]...]`
pub fn parse_group_spec(raw: &str) -> Result<GroupSpec> {
    let (folder, files) = raw
        .split_once('=')
        .ok_or_else(|| Error::Parse(format!("expected FOLDER=FILE[,FILE...], got {raw:?}")))?;

    let files = files
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| match f.split_once("::") {
            Some((path, name)) => (PathBuf::from(path), Some(name.trim().to_string())),
            None => (PathBuf::from(f), None),
        })
        .collect();

    Ok(GroupSpec {
        folder: folder.trim().to_string(),
        files,
    })
}

/// Options for the contribute command
#[derive(Debug, Clone, Default)]
pub struct ContributeOptions {
    /// Parsed `--group` arguments
    pub groups: Vec<GroupSpec>,
    /// Pull request title
    pub title: String,
    /// Pull request description
    pub description: String,
    /// Use the trusted-domain path
    pub direct: bool,
    /// Institutional email (trusted path)
    pub email: Option<String>,
    /// Display name (trusted path)
    pub name: Option<String>,
    /// Plan only
    pub dry_run: bool,
    /// Skip the confirmation prompt
    pub yes: bool,
}

/// Run the contribute command
pub async fn run_contribute(config_path: Option<&Path>, options: ContributeOptions) -> Result<()> {
    let config = Config::load(config_path)?;
    let request = ContributionRequest {
        groups: load_groups(&options.groups, &config).await?,
        details: PrDetails {
            title: options.title.clone(),
            description: options.description.clone(),
        },
    };

    // Form errors are reported before any credential or network access
    validate(&request, &config.file_policy())?;

    if options.dry_run {
        let batches = plan(&request, &config)?;
        report_dry_run(&batches, &CliProgress::plain()).await;
        return Ok(());
    }

    print_summary(&request);
    if !options.yes && !confirm()? {
        println!("Aborted");
        return Ok(());
    }

    let progress = CliProgress::new();
    let result = if options.direct {
        run_trusted(&request, &options, &config, &progress).await
    } else {
        run_delegated(&request, &config, &progress).await
    };
    progress.finish();

    let result = result?;
    print_result(&result);
    Ok(())
}

async fn load_groups(specs: &[GroupSpec], config: &Config) -> Result<Vec<UploadGroup>> {
    let policy = config.file_policy();
    let mut groups = Vec::with_capacity(specs.len());

    for spec in specs {
        let mut group = UploadGroup::new(spec.folder.clone());
        for (path, name) in &spec.files {
            let entry = FileEntry::load(path)
                .await
                .map_err(|e| Error::Validation(format!("{}: {}", path.display(), e.user_message())))?;
            let id = entry.id();

            for rejection in group.add_files([entry], &policy) {
                eprintln!(
                    "{} Skipping {}: {}",
                    bang(),
                    rejection.name.accent().for_stderr(),
                    rejection.reason.warn()
                );
            }

            if let Some(name) = name {
                group.rename(id, name.clone());
            }
        }
        groups.push(group);
    }

    Ok(groups)
}

fn print_summary(request: &ContributionRequest) {
    println!("{}", request.details.title.emphasis());
    for group in request.groups.iter().filter(|g| !g.is_empty()) {
        println!("  {}/", group.folder().accent());
        for file in group.files() {
            println!(
                "    {} {}",
                group.display_name(file),
                format_size(file.len()).muted()
            );
        }
    }
    println!();
}

fn confirm() -> Result<bool> {
    Confirm::new()
        .with_prompt("Open a pull request with these files?")
        .default(true)
        .interact()
        .map_err(|e| Error::Internal(format!("prompt failed ({e}); pass --yes to skip it")))
}

async fn run_trusted(
    request: &ContributionRequest,
    options: &ContributeOptions,
    config: &Config,
    progress: &CliProgress,
) -> Result<ContributionResult> {
    let email = options
        .email
        .clone()
        .ok_or_else(|| Error::Validation("--email is required with --direct".to_string()))?;
    let submitter = Submitter::Trusted {
        email,
        name: options.name.clone().unwrap_or_default(),
    };

    let credential =
        get_trusted_credential(config.worker_url.is_some(), |var| std::env::var(var).ok())?;

    let transport: Box<dyn BatchTransport> = match (credential, &config.worker_url) {
        (TrustedCredential::Identity(token), Some(url)) => {
            Box::new(HttpTransport::new(url, &token, config.retry.call_timeout)?)
        }
        (TrustedCredential::Elevated(token), _) => {
            let platform = create_platform_service(&config.platform_config(), &token, config.retry)?;
            Box::new(DirectBatchHandler::new(
                Arc::from(platform),
                config.trusted_domains.clone(),
                config.file_policy(),
            ))
        }
        (TrustedCredential::Identity(_), None) => {
            return Err(Error::Config("no worker URL configured".to_string()));
        }
    };

    contribute_batched(transport.as_ref(), submitter, request, config, progress).await
}

async fn run_delegated(
    request: &ContributionRequest,
    config: &Config,
    progress: &CliProgress,
) -> Result<ContributionResult> {
    let auth = get_github_auth(config.host.as_deref()).await?;
    let platform = create_platform_service(&config.platform_config(), &auth.token, config.retry)?;
    contribute_delegated(platform.as_ref(), request, config, progress).await
}

fn print_result(result: &ContributionResult) {
    println!();
    println!(
        "{} Contributed {} file{} on {}",
        check(),
        result.manifest.len(),
        if result.manifest.len() == 1 { "" } else { "s" },
        result.branch.accent()
    );
    println!(
        "  Pull request #{}: {}",
        result.pull_request.number,
        hyperlink_url(Stream::Stdout, &result.pull_request.html_url)
    );
}
