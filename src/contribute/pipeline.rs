//! Contribution pipeline
//!
//! Validates the form, plans batches and runs one session to completion on
//! the trusted-domain path. The delegated path lives in
//! [`delegated`](crate::contribute::delegated) and shares validation.

use crate::auth::is_trusted_email;
use crate::config::Config;
use crate::contribute::batch::{Batch, BatchItem, plan_batches};
use crate::contribute::orchestrate::UploadOrchestrator;
use crate::contribute::progress::{Phase, ProgressCallback};
use crate::contribute::session::{
    COMPLETE_PERCENT, ContributionSession, FINALIZING_PERCENT, PLANNED_PERCENT, SessionState,
};
use crate::contribute::transport::BatchTransport;
use crate::error::{Error, Result};
use crate::files::{FilePolicy, FolderPath, UploadGroup, format_size, validate_file_name};
use crate::types::{ManifestEntry, PrDetails, PullRequest, Submitter};
use std::collections::HashSet;
use tracing::info;

/// What the contributor filled in
#[derive(Debug, Clone, Default)]
pub struct ContributionRequest {
    /// Destination folders and their files
    pub groups: Vec<UploadGroup>,
    /// Pull request title and description
    pub details: PrDetails,
}

/// Outcome of a successful contribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionResult {
    /// Branch holding the files
    pub branch: String,
    /// Pull request opened for the branch
    pub pull_request: PullRequest,
    /// Every file committed, in upload order
    pub manifest: Vec<ManifestEntry>,
}

/// Check the form and pair every non-empty group with its parsed folder
///
/// Empty groups are skipped whatever their folder path says. Display names
/// must pass the type check of `policy`, and no two files may land on the
/// same repository path.
pub fn validate<'a>(
    request: &'a ContributionRequest,
    policy: &FilePolicy,
) -> Result<Vec<(FolderPath, &'a UploadGroup)>> {
    if request.groups.iter().all(UploadGroup::is_empty) {
        return Err(Error::Validation(
            "Please select at least one file to upload".to_string(),
        ));
    }

    let mut validated = Vec::new();
    let mut paths = HashSet::new();
    for group in request.groups.iter().filter(|g| !g.is_empty()) {
        let folder = FolderPath::parse(group.folder())?;
        for file in group.files() {
            let name = group.display_name(file);
            validate_file_name(name)?;
            policy.check_type(name)?;
            let path = format!("{folder}/{name}");
            if !paths.insert(path.clone()) {
                return Err(Error::Validation(format!(
                    "{path} is selected more than once; give each file a unique name"
                )));
            }
        }
        validated.push((folder, group));
    }

    if request.details.title.trim().is_empty() {
        return Err(Error::Validation(
            "Please provide a pull request title".to_string(),
        ));
    }

    Ok(validated)
}

/// Validate and partition a contribution into batches of `config.batch_capacity`
pub fn plan(request: &ContributionRequest, config: &Config) -> Result<Vec<Batch>> {
    let items: Vec<BatchItem> = validate(request, &config.file_policy())?
        .into_iter()
        .flat_map(|(folder, group)| BatchItem::from_group(&folder, group))
        .collect();
    Ok(plan_batches(items, config.batch_capacity))
}

/// Describe planned batches without sending anything
pub async fn report_dry_run(batches: &[Batch], progress: &dyn ProgressCallback) {
    progress
        .on_message("Dry run - no changes will be made")
        .await;
    let total = batches.len();
    for (idx, batch) in batches.iter().enumerate() {
        progress
            .on_message(&format!(
                "Batch {}/{total}: {} file(s), ~{}",
                idx + 1,
                batch.len(),
                format_size(batch.total_size())
            ))
            .await;
        for item in batch.items() {
            progress
                .on_message(&format!("  {}/{}", item.folder(), item.name()))
                .await;
        }
    }
}

/// Run a trusted-domain contribution through `transport`
///
/// Validation failures return before any request is sent.
pub async fn contribute_batched(
    transport: &dyn BatchTransport,
    submitter: Submitter,
    request: &ContributionRequest,
    config: &Config,
    progress: &dyn ProgressCallback,
) -> Result<ContributionResult> {
    progress.on_phase(Phase::Planning).await;

    let batches = match check_trusted(&submitter, config)
        .and_then(|()| plan(request, config))
    {
        Ok(batches) => batches,
        Err(e) => {
            progress.on_error(&e).await;
            return Err(e);
        }
    };

    info!(
        batches = batches.len(),
        capacity = config.batch_capacity,
        "planned contribution"
    );

    let mut session = ContributionSession::new(submitter, request.details.clone(), batches);
    if session.advance(PLANNED_PERCENT) {
        progress.on_percent(PLANNED_PERCENT).await;
    }

    progress.on_phase(Phase::Uploading).await;
    let pr = UploadOrchestrator::new(transport, progress)
        .run(&mut session)
        .await?;

    session.set_state(SessionState::Finalizing);
    progress.on_phase(Phase::Finalizing).await;
    if session.advance(FINALIZING_PERCENT) {
        progress.on_percent(FINALIZING_PERCENT).await;
    }

    let Some(pull_request) = pr else {
        session.set_state(SessionState::Failed);
        let err = Error::Remote("The pull request was not created".to_string());
        progress.on_error(&err).await;
        return Err(err);
    };

    progress.on_pr_created(&pull_request).await;
    session.set_state(SessionState::Succeeded);
    if session.advance(COMPLETE_PERCENT) {
        progress.on_percent(COMPLETE_PERCENT).await;
    }
    progress.on_phase(Phase::Complete).await;

    let (branch, manifest) = session.into_parts();
    let branch = branch.ok_or_else(|| Error::Internal("no branch after upload".to_string()))?;

    Ok(ContributionResult {
        branch,
        pull_request,
        manifest,
    })
}

fn check_trusted(submitter: &Submitter, config: &Config) -> Result<()> {
    match submitter {
        Submitter::Trusted { email, .. } if is_trusted_email(email, &config.trusted_domains) => {
            Ok(())
        }
        Submitter::Trusted { email, .. } => Err(Error::Validation(format!(
            "{email} is not an address in a trusted domain ({})",
            config.trusted_domains.join(", ")
        ))),
        Submitter::OAuth { .. } => Err(Error::Validation(
            "Batched contributions require a verified institutional email".to_string(),
        )),
    }
}
