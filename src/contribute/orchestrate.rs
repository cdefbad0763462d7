//! Upload orchestration
//!
//! Drives planned batches through a [`BatchTransport`] strictly in order.
//! Batch 0 carries no branch name and learns it from the reply; every later
//! batch sends that name back. Only the last batch asks for a pull request
//! and carries the full manifest.

use crate::contribute::progress::{BatchStatus, ProgressCallback};
use crate::contribute::session::{ContributionSession, SessionState, upload_percent};
use crate::contribute::transport::BatchTransport;
use crate::contribute::wire::{BatchInfo, BatchRequest, encode_batch, manifest_groups};
use crate::error::{Error, Result};
use crate::types::{ManifestEntry, PullRequest, Submitter};
use tracing::{error, info, warn};

/// Sends a session's batches one after another
pub struct UploadOrchestrator<'a> {
    transport: &'a dyn BatchTransport,
    progress: &'a dyn ProgressCallback,
}

impl<'a> UploadOrchestrator<'a> {
    /// Orchestrator over a transport, reporting to `progress`
    pub const fn new(transport: &'a dyn BatchTransport, progress: &'a dyn ProgressCallback) -> Self {
        Self {
            transport,
            progress,
        }
    }

    /// Upload every batch of `session`
    ///
    /// Returns the pull request reported by the last batch, if any. On the
    /// first failing batch the session is marked failed and
    /// [`Error::BatchFailed`] is returned; batches already sent are not
    /// undone and stay in the session manifest.
    pub async fn run(&self, session: &mut ContributionSession) -> Result<Option<PullRequest>> {
        let (email, name) = match session.submitter() {
            Submitter::Trusted { email, name } => (email.clone(), name.clone()),
            Submitter::OAuth { .. } => {
                session.set_state(SessionState::Failed);
                return Err(Error::Validation(
                    "Batched contributions require a verified institutional email".to_string(),
                ));
            }
        };

        let total = session.batches().len();
        let mut pull_request = None;

        for index in 0..total {
            session.set_state(SessionState::Uploading { batch: index });
            let is_last = index + 1 == total;
            let batch = session.batches()[index].clone();

            let entries: Vec<ManifestEntry> = batch
                .items()
                .iter()
                .map(|item| ManifestEntry::new(item.folder(), item.name()))
                .collect();

            info!(batch = index + 1, total, files = entries.len(), "sending batch");
            self.progress
                .on_batch(index, total, BatchStatus::Started)
                .await;

            // Encode off the async executor, one batch at a time
            let files = match tokio::task::spawn_blocking(move || encode_batch(&batch)).await {
                Ok(files) => files,
                Err(e) => {
                    let err = Error::Internal(format!("encoding task failed: {e}"));
                    return Err(self.fail(session, index, total, &err).await);
                }
            };

            let all_files = is_last.then(|| {
                let mut full = session.manifest().to_vec();
                full.extend(entries.iter().cloned());
                manifest_groups(&full)
            });

            let request = BatchRequest {
                email: email.clone(),
                name: name.clone(),
                files,
                all_files,
                pr_title: session.details().title.clone(),
                pr_description: session.details().description.clone(),
                branch_name: session.branch().map(String::from),
                create_pr: is_last,
                batch_info: BatchInfo {
                    current: index + 1,
                    total,
                },
            };

            let response = match self.transport.submit_batch(&request).await {
                Ok(response) => response,
                Err(e) => return Err(self.fail(session, index, total, &e).await),
            };

            match session.branch() {
                None => session.set_branch(response.branch.clone()),
                Some(known) if known != response.branch => {
                    warn!(
                        expected = known,
                        reported = %response.branch,
                        "remote reported a different branch; keeping the first"
                    );
                }
                Some(_) => {}
            }

            session.record(entries);
            self.progress
                .on_batch(index, total, BatchStatus::Success)
                .await;

            let percent = upload_percent(index + 1, total);
            if session.advance(percent) {
                self.progress.on_percent(percent).await;
            }

            if is_last {
                pull_request = response.pr;
            }
        }

        Ok(pull_request)
    }

    /// Report a failed batch, mark the session failed and build the error
    async fn fail(
        &self,
        session: &mut ContributionSession,
        index: usize,
        total: usize,
        cause: &Error,
    ) -> Error {
        let message = cause.user_message();
        error!(batch = index + 1, total, error = %message, "batch failed");
        self.progress
            .on_batch(index, total, BatchStatus::Failed(message.clone()))
            .await;
        self.progress.on_error(cause).await;
        session.set_state(SessionState::Failed);
        Error::BatchFailed {
            batch: index,
            total,
            message,
        }
    }
}
