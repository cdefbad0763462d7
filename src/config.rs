//! Configuration loading
//!
//! Built-in defaults, then an optional JSON file, then environment
//! overrides. The file lives at `<config_dir>/qpr/config.json` unless a
//! path is given explicitly.

use crate::error::{Error, Result};
use crate::files::FilePolicy;
use crate::platform::{RetryPolicy, parse_repo_spec};
use crate::types::{PlatformConfig, RepoRef};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Upstream repository that receives contributions by default
pub const DEFAULT_REPO: &str = "IISERM/question-paper-repo";

/// Per-file byte ceiling (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Batch capacity measured after transport encoding (7.5 MiB)
pub const DEFAULT_BATCH_CAPACITY: u64 = 15 * 512 * 1024;

/// File extensions accepted by default
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "jpg", "jpeg", "png", "docx", "pptx", "xlsx", "zip", "txt", "ipynb", "py",
];

/// Email domains allowed on the trusted path by default
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &["iisermohali.ac.in"];

const DEFAULT_FORK_READY_DELAY: Duration = Duration::from_secs(2);

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository that receives pull requests
    pub upstream: RepoRef,
    /// GitHub Enterprise host (None for github.com)
    pub host: Option<String>,
    /// Contribution worker endpoint for the trusted path
    pub worker_url: Option<Url>,
    /// Per-file byte ceiling
    pub max_file_size: u64,
    /// Lower-case extensions accepted at selection
    pub allowed_extensions: Vec<String>,
    /// Per-batch capacity in encoded bytes
    pub batch_capacity: u64,
    /// Email domains accepted on the trusted path
    pub trusted_domains: Vec<String>,
    /// Retry and timeout policy for remote calls
    pub retry: RetryPolicy,
    /// Pause after creating a fork before using it
    pub fork_ready_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: RepoRef::new("IISERM", "question-paper-repo"),
            host: None,
            worker_url: None,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            trusted_domains: DEFAULT_TRUSTED_DOMAINS
                .iter()
                .map(ToString::to_string)
                .collect(),
            retry: RetryPolicy::default(),
            fork_ready_delay: DEFAULT_FORK_READY_DELAY,
        }
    }
}

/// On-disk configuration; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `owner/repo` or a GitHub URL
    pub repo: Option<String>,
    /// GitHub Enterprise host
    pub host: Option<String>,
    /// Contribution worker URL
    pub worker_url: Option<String>,
    /// Per-file byte ceiling
    pub max_file_size: Option<u64>,
    /// Accepted extensions
    pub allowed_extensions: Option<Vec<String>>,
    /// Batch capacity in encoded bytes
    pub batch_capacity: Option<u64>,
    /// Trusted email domains
    pub trusted_domains: Option<Vec<String>>,
    /// Attempts for idempotent reads
    pub retry_attempts: Option<u32>,
    /// First backoff delay in milliseconds
    pub retry_base_delay_ms: Option<u64>,
    /// Per-call timeout in seconds
    pub call_timeout_secs: Option<u64>,
    /// Fork readiness delay in milliseconds
    pub fork_ready_delay_ms: Option<u64>,
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("qpr").join("config.json"))
    }

    /// Load configuration from file (if any) and the process environment
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => Some(read_file_config(p)?),
            None => match Self::default_path() {
                Some(p) if p.exists() => Some(read_file_config(&p)?),
                _ => None,
            },
        };
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from an optional file layer and an env lookup
    pub fn from_sources<F>(file: Option<FileConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(file) = file {
            config.apply_file(file)?;
        }

        if let Some(repo) = env("QPR_REPO") {
            config.upstream = parse_repo_spec(&repo)?;
        }
        if let Some(url) = env("QPR_WORKER_URL") {
            config.worker_url = Some(parse_worker_url(&url)?);
        }
        if let Some(capacity) = env("QPR_BATCH_CAPACITY") {
            config.batch_capacity = parse_bytes("QPR_BATCH_CAPACITY", &capacity)?;
        }
        if let Some(max) = env("QPR_MAX_FILE_SIZE") {
            config.max_file_size = parse_bytes("QPR_MAX_FILE_SIZE", &max)?;
        }
        if let Some(host) = env("GH_HOST").filter(|h| h != "github.com") {
            config.host = Some(host);
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) -> Result<()> {
        if let Some(repo) = file.repo {
            self.upstream = parse_repo_spec(&repo)?;
        }
        if file.host.is_some() {
            self.host = file.host;
        }
        if let Some(url) = file.worker_url {
            self.worker_url = Some(parse_worker_url(&url)?);
        }
        if let Some(max) = file.max_file_size {
            self.max_file_size = max;
        }
        if let Some(exts) = file.allowed_extensions {
            self.allowed_extensions = exts
                .into_iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }
        if let Some(capacity) = file.batch_capacity {
            self.batch_capacity = capacity;
        }
        if let Some(domains) = file.trusted_domains {
            self.trusted_domains = domains;
        }
        if let Some(attempts) = file.retry_attempts {
            self.retry.attempts = attempts;
        }
        if let Some(ms) = file.retry_base_delay_ms {
            self.retry.base_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = file.call_timeout_secs {
            self.retry.call_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = file.fork_ready_delay_ms {
            self.fork_ready_delay = Duration::from_millis(ms);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.batch_capacity == 0 {
            return Err(Error::Config("batch capacity must be positive".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(Error::Config("max file size must be positive".to_string()));
        }
        if self.retry.attempts == 0 {
            return Err(Error::Config("retry attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Platform configuration for the GitHub service
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            upstream: self.upstream.clone(),
            host: self.host.clone(),
        }
    }

    /// Selection policy derived from this configuration
    pub fn file_policy(&self) -> FilePolicy {
        FilePolicy::new(self.max_file_size, self.allowed_extensions.clone())
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| Error::Config(format!("invalid {}: {e}", path.display())))
}

fn parse_worker_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config(format!("invalid worker URL {raw}: {e}")))
}

fn parse_bytes(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a byte count, got {raw:?}")))
}
