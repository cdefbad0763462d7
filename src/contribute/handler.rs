//! In-process batch handler
//!
//! Applies a [`BatchRequest`] straight against the upstream repository with
//! the elevated credential: create the branch when the request carries
//! none, commit every file, and open the pull request when asked.

use crate::auth::is_trusted_email;
use crate::contribute::branch::{BranchCoordinator, derive_branch_name, needs_branch};
use crate::contribute::describe::build_description;
use crate::contribute::transport::BatchTransport;
use crate::contribute::wire::{BatchRequest, BatchResponse};
use crate::error::{Error, Result};
use crate::files::{FilePolicy, FolderPath, validate_file_name};
use crate::platform::PlatformService;
use crate::types::Submitter;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Remote-side batch semantics over a [`PlatformService`]
pub struct DirectBatchHandler {
    platform: Arc<dyn PlatformService>,
    trusted_domains: Vec<String>,
    policy: FilePolicy,
}

impl DirectBatchHandler {
    /// Handler writing to the platform's upstream repository
    pub fn new(
        platform: Arc<dyn PlatformService>,
        trusted_domains: Vec<String>,
        policy: FilePolicy,
    ) -> Self {
        Self {
            platform,
            trusted_domains,
            policy,
        }
    }

    fn check_request(&self, request: &BatchRequest) -> Result<()> {
        if !is_trusted_email(&request.email, &self.trusted_domains) {
            return Err(Error::Auth(format!(
                "{} is not in a trusted domain",
                request.email
            )));
        }
        if request.pr_title.trim().is_empty() {
            return Err(Error::Validation(
                "Please provide a pull request title".to_string(),
            ));
        }
        let mut paths = HashSet::new();
        for group in &request.files {
            FolderPath::parse(&group.folder_path)?;
            for file in &group.files {
                validate_file_name(&file.name)?;
                self.policy.check_type(&file.name)?;
                let path = format!("{}/{}", group.folder_path, file.name);
                if !paths.insert(path.clone()) {
                    return Err(Error::Validation(format!(
                        "{path} appears more than once in the batch"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BatchTransport for DirectBatchHandler {
    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse> {
        self.check_request(request)?;

        let upstream = self.platform.config().upstream.clone();
        let submitter = Submitter::Trusted {
            email: request.email.clone(),
            name: request.name.clone(),
        };

        // batchInfo.current is one-based
        let index = request.batch_info.current.saturating_sub(1);
        let branch = if needs_branch(index, request.branch_name.as_deref()) {
            let name = derive_branch_name(&submitter, Utc::now());
            BranchCoordinator::new(self.platform.as_ref())
                .create_from_default(&upstream, &name)
                .await?;
            name
        } else if let Some(name) = &request.branch_name {
            name.clone()
        } else {
            return Err(Error::Validation(format!(
                "batch {} of {} has no branch name",
                request.batch_info.current, request.batch_info.total
            )));
        };

        let mut files_uploaded = Vec::new();
        for group in &request.files {
            for file in &group.files {
                let content = BASE64.decode(&file.content).map_err(|e| {
                    Error::Validation(format!("{}: content is not valid base64: {e}", file.name))
                })?;
                let path = format!("{}/{}", group.folder_path, file.name);
                debug!(path = %path, bytes = content.len(), "committing");
                self.platform
                    .put_file(
                        &upstream,
                        &branch,
                        &path,
                        &content,
                        &format!("Add {}", file.name),
                    )
                    .await?;
                files_uploaded.push(path);
            }
        }

        let pr = if request.create_pr {
            let body = build_description(
                &request.pr_description,
                &request.manifest(),
                Some(&submitter),
            );
            let base = self.platform.default_branch(&upstream).await?;
            let pr = self
                .platform
                .create_pr(&branch, &base, request.pr_title.trim(), &body)
                .await?;
            info!(number = pr.number, url = %pr.html_url, "opened pull request");
            Some(pr)
        } else {
            None
        };

        Ok(BatchResponse {
            branch,
            pr,
            files_uploaded,
        })
    }
}
