//! Delegated contribution: fork, branch, per-file commits, pull request
//!
//! Runs with the contributor's own token. Files go up one request at a time,
//! in selection order, onto a branch of the contributor's fork.

use crate::config::Config;
use crate::contribute::branch::{BranchCoordinator, derive_branch_name};
use crate::contribute::describe::build_description;
use crate::contribute::pipeline::{ContributionRequest, ContributionResult, validate};
use crate::contribute::progress::{Phase, ProgressCallback};
use crate::contribute::session::{COMPLETE_PERCENT, ContributionSession, SessionState};
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{ManifestEntry, RepoRef, Submitter};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

const FORK_CHECK_PERCENT: u8 = 10;
const FORK_READY_PERCENT: u8 = 20;
const BRANCH_READY_PERCENT: u8 = 30;
const FILES_SPAN_PERCENT: usize = 50;
const CREATING_PR_PERCENT: u8 = 90;

/// Run a contribution from the authenticated user's fork
///
/// Validation failures return before any request is sent.
pub async fn contribute_delegated(
    platform: &dyn PlatformService,
    request: &ContributionRequest,
    config: &Config,
    progress: &dyn ProgressCallback,
) -> Result<ContributionResult> {
    progress.on_phase(Phase::Planning).await;
    let result = run(platform, request, config, progress).await;
    if let Err(e) = &result {
        progress.on_error(e).await;
    }
    result
}

async fn run(
    platform: &dyn PlatformService,
    request: &ContributionRequest,
    config: &Config,
    progress: &dyn ProgressCallback,
) -> Result<ContributionResult> {
    let groups = validate(request, &config.file_policy())?;
    let mut uploads: Vec<(ManifestEntry, Arc<[u8]>)> = Vec::new();
    for (folder, group) in &groups {
        for file in group.files() {
            uploads.push((
                ManifestEntry::new(folder.to_string(), group.display_name(file)),
                file.payload(),
            ));
        }
    }

    let login = platform.current_user().await?;
    let submitter = Submitter::OAuth { login };
    let mut session =
        ContributionSession::new(submitter.clone(), request.details.clone(), Vec::new());

    progress.on_phase(Phase::PreparingFork).await;
    step(&mut session, progress, FORK_CHECK_PERCENT).await;
    progress.on_message("Checking for existing fork...").await;
    let fork = ensure_fork(platform, submitter.handle(), config, progress).await?;
    step(&mut session, progress, FORK_READY_PERCENT).await;

    progress.on_phase(Phase::CreatingBranch).await;
    let branch = derive_branch_name(&submitter, Utc::now());
    BranchCoordinator::new(platform)
        .create_from_default(&fork, &branch)
        .await?;
    session.set_branch(branch.clone());
    step(&mut session, progress, BRANCH_READY_PERCENT).await;

    progress.on_phase(Phase::Uploading).await;
    let total = uploads.len();
    for (idx, (entry, payload)) in uploads.into_iter().enumerate() {
        session.set_state(SessionState::Uploading { batch: idx });
        let path = entry.path();
        platform
            .put_file(
                &fork,
                &branch,
                &path,
                &payload,
                &format!("Add {}", entry.name),
            )
            .await?;
        session.record([entry]);

        let uploaded = idx + 1;
        progress.on_file_uploaded(&path, uploaded, total).await;
        let done = u8::try_from(FILES_SPAN_PERCENT * uploaded / total).unwrap_or(50);
        step(&mut session, progress, BRANCH_READY_PERCENT + done).await;
    }

    session.set_state(SessionState::Finalizing);
    progress.on_phase(Phase::Finalizing).await;
    step(&mut session, progress, CREATING_PR_PERCENT).await;
    progress.on_message("Creating pull request...").await;

    let upstream = platform.config().upstream.clone();
    let base = platform.default_branch(&upstream).await?;
    let body = build_description(
        &request.details.description,
        session.manifest(),
        Some(&submitter),
    );
    let head = format!("{}:{branch}", fork.owner);
    let pull_request = platform
        .create_pr(&head, &base, request.details.title.trim(), &body)
        .await?;
    info!(number = pull_request.number, url = %pull_request.html_url, "opened pull request");

    progress.on_pr_created(&pull_request).await;
    session.set_state(SessionState::Succeeded);
    step(&mut session, progress, COMPLETE_PERCENT).await;
    progress.on_phase(Phase::Complete).await;

    let (branch, manifest) = session.into_parts();
    Ok(ContributionResult {
        branch: branch.ok_or_else(|| Error::Internal("no branch after upload".to_string()))?,
        pull_request,
        manifest,
    })
}

async fn ensure_fork(
    platform: &dyn PlatformService,
    login: &str,
    config: &Config,
    progress: &dyn ProgressCallback,
) -> Result<RepoRef> {
    if let Some(fork) = platform.find_fork(login).await? {
        info!(fork = %fork, "using existing fork");
        return Ok(fork);
    }

    progress.on_message("Creating fork...").await;
    let fork = platform.create_fork().await?;
    info!(fork = %fork, "created fork");
    // Fork creation is asynchronous on GitHub's side
    tokio::time::sleep(config.fork_ready_delay).await;
    Ok(fork)
}

async fn step(session: &mut ContributionSession, progress: &dyn ProgressCallback, percent: u8) {
    if session.advance(percent) {
        progress.on_percent(percent).await;
    }
}
