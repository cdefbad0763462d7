//! Mock platform service and batch transport for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use qpr_contrib::contribute::{BatchRequest, BatchResponse, BatchTransport};
use qpr_contrib::error::{Error, Result};
use qpr_contrib::platform::PlatformService;
use qpr_contrib::types::{PlatformConfig, PullRequest, RepoRef};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBranchCall {
    pub repo: RepoRef,
    pub branch: String,
    pub sha: String,
}

/// Call record for `put_file`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutFileCall {
    pub repo: RepoRef,
    pub branch: String,
    pub path: String,
    pub content: Vec<u8>,
    pub message: String,
}

/// Call record for `create_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: String,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Auto-incrementing PR numbers
/// - Call tracking for verification
/// - Configurable login, fork and default branch
/// - Error injection for failure path testing
pub struct MockPlatformService {
    config: PlatformConfig,
    login: String,
    default_branch: String,
    next_pr_number: AtomicU64,
    fork: Mutex<Option<RepoRef>>,
    // Call tracking
    find_fork_calls: Mutex<Vec<String>>,
    create_fork_calls: Mutex<usize>,
    create_branch_calls: Mutex<Vec<CreateBranchCall>>,
    put_file_calls: Mutex<Vec<PutFileCall>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    // Error injection
    error_on_create_branch: Mutex<Option<String>>,
    error_on_put_file: Mutex<Option<(usize, String)>>,
    error_on_create_pr: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            login: "octocat".to_string(),
            default_branch: "main".to_string(),
            next_pr_number: AtomicU64::new(1),
            fork: Mutex::new(None),
            find_fork_calls: Mutex::new(Vec::new()),
            create_fork_calls: Mutex::new(0),
            create_branch_calls: Mutex::new(Vec::new()),
            put_file_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_create_branch: Mutex::new(None),
            error_on_put_file: Mutex::new(None),
            error_on_create_pr: Mutex::new(None),
        }
    }

    /// Mock pointed at the default upstream repository
    pub fn new() -> Self {
        Self::with_config(PlatformConfig {
            upstream: RepoRef::new("IISERM", "question-paper-repo"),
            host: None,
        })
    }

    /// Pretend the authenticated user already has a fork
    pub fn with_existing_fork(self) -> Self {
        let fork = RepoRef::new(self.login.clone(), self.config.upstream.repo.clone());
        *self.fork.lock().unwrap() = Some(fork);
        self
    }

    // === Error injection methods ===

    /// Make `create_branch` return an error
    pub fn fail_create_branch(&self, msg: &str) {
        *self.error_on_create_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make the `nth` (zero-based) `put_file` call return an error
    pub fn fail_put_file_at(&self, nth: usize, msg: &str) {
        *self.error_on_put_file.lock().unwrap() = Some((nth, msg.to_string()));
    }

    /// Make `create_pr` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Owners passed to `find_fork`
    pub fn get_find_fork_calls(&self) -> Vec<String> {
        self.find_fork_calls.lock().unwrap().clone()
    }

    /// Number of `create_fork` calls
    pub fn create_fork_count(&self) -> usize {
        *self.create_fork_calls.lock().unwrap()
    }

    /// Get all `create_branch` calls
    pub fn get_create_branch_calls(&self) -> Vec<CreateBranchCall> {
        self.create_branch_calls.lock().unwrap().clone()
    }

    /// Get all `put_file` calls
    pub fn get_put_file_calls(&self) -> Vec<PutFileCall> {
        self.put_file_calls.lock().unwrap().clone()
    }

    /// Paths committed, in call order
    pub fn put_file_paths(&self) -> Vec<String> {
        self.get_put_file_calls()
            .into_iter()
            .map(|c| c.path)
            .collect()
    }

    /// Get all `create_pr` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn current_user(&self) -> Result<String> {
        Ok(self.login.clone())
    }

    async fn find_fork(&self, owner: &str) -> Result<Option<RepoRef>> {
        self.find_fork_calls.lock().unwrap().push(owner.to_string());
        Ok(self.fork.lock().unwrap().clone())
    }

    async fn create_fork(&self) -> Result<RepoRef> {
        *self.create_fork_calls.lock().unwrap() += 1;
        let fork = RepoRef::new(self.login.clone(), self.config.upstream.repo.clone());
        *self.fork.lock().unwrap() = Some(fork.clone());
        Ok(fork)
    }

    async fn default_branch(&self, _repo: &RepoRef) -> Result<String> {
        Ok(self.default_branch.clone())
    }

    async fn branch_sha(&self, _repo: &RepoRef, branch: &str) -> Result<String> {
        Ok(format!("{branch}_sha_abc123"))
    }

    async fn create_branch(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<()> {
        self.create_branch_calls
            .lock()
            .unwrap()
            .push(CreateBranchCall {
                repo: repo.clone(),
                branch: branch.to_string(),
                sha: sha.to_string(),
            });

        // Check for injected error
        if let Some(msg) = self.error_on_create_branch.lock().unwrap().as_ref() {
            return Err(Error::Remote(msg.clone()));
        }
        Ok(())
    }

    async fn put_file(
        &self,
        repo: &RepoRef,
        branch: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<()> {
        let mut calls = self.put_file_calls.lock().unwrap();
        let nth = calls.len();
        calls.push(PutFileCall {
            repo: repo.clone(),
            branch: branch.to_string(),
            path: path.to_string(),
            content: content.to_vec(),
            message: message.to_string(),
        });

        // Check for injected error
        if let Some((fail_at, msg)) = self.error_on_put_file.lock().unwrap().as_ref() {
            if *fail_at == nth {
                return Err(Error::Remote(msg.clone()));
            }
        }
        Ok(())
    }

    async fn create_pr(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Remote(msg.clone()));
        }

        let number = self.next_pr_number.fetch_add(1, Ordering::SeqCst);
        Ok(PullRequest {
            number,
            html_url: format!(
                "https://github.com/{}/pull/{number}",
                self.config.upstream
            ),
        })
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// Batch transport that records requests and answers from a script
///
/// Succeeds for every batch except the configured failing one. The branch
/// reported back is fixed; the last batch gets a pull request when it asks
/// for one.
pub struct ScriptedTransport {
    branch: String,
    fail_at: Option<(usize, String)>,
    omit_pr: bool,
    requests: Mutex<Vec<BatchRequest>>,
}

impl ScriptedTransport {
    /// Transport where every batch succeeds
    pub fn new() -> Self {
        Self {
            branch: "contribution-ms21001-1700000000000000".to_string(),
            fail_at: None,
            omit_pr: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the batch at zero-based `index` with `msg`
    pub fn failing_at(mut self, index: usize, msg: &str) -> Self {
        self.fail_at = Some((index, msg.to_string()));
        self
    }

    /// Never report a pull request
    pub const fn without_pr(mut self) -> Self {
        self.omit_pr = true;
        self
    }

    /// Branch name this transport reports
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<BatchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl BatchTransport for ScriptedTransport {
    async fn submit_batch(&self, request: &BatchRequest) -> Result<BatchResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };

        if let Some((fail_at, msg)) = &self.fail_at {
            if *fail_at == index {
                return Err(Error::Remote(msg.clone()));
            }
        }

        let files_uploaded = request
            .files
            .iter()
            .flat_map(|g| g.files.iter().map(move |f| format!("{}/{}", g.folder_path, f.name)))
            .collect();
        let pr = (request.create_pr && !self.omit_pr).then(|| PullRequest {
            number: 42,
            html_url: "https://github.com/IISERM/question-paper-repo/pull/42".to_string(),
        });

        Ok(BatchResponse {
            branch: self.branch.clone(),
            pr,
            files_uploaded,
        })
    }
}
