//! Progress callback trait for interface-agnostic updates
//!
//! The pipeline reports through [`ProgressCallback`] and never touches the
//! terminal itself. [`ChannelProgress`] turns the callbacks into a stream of
//! [`ProgressEvent`]s for consumers that prefer a channel.

use crate::error::Error;
use crate::types::PullRequest;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// Contribution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Validating the form and planning batches
    Planning,
    /// Looking up or creating the contributor's fork
    PreparingFork,
    /// Creating the contribution branch
    CreatingBranch,
    /// Sending files
    Uploading,
    /// Opening the pull request
    Finalizing,
    /// Contribution complete
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Planning => "Planning",
            Self::PreparingFork => "Preparing fork",
            Self::CreatingBranch => "Creating branch",
            Self::Uploading => "Uploading",
            Self::Finalizing => "Creating pull request",
            Self::Complete => "Done",
        };
        f.write_str(label)
    }
}

/// Batch round-trip status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Request sent
    Started,
    /// Remote side confirmed every file in the batch
    Success,
    /// Round trip failed with error message
    Failed(String),
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("sending"),
            Self::Success => f.write_str("uploaded"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during a contribution.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called with the overall percentage; values never decrease
    async fn on_percent(&self, percent: u8);

    /// Called around each batch round trip (`index` is zero-based)
    async fn on_batch(&self, index: usize, total: usize, status: BatchStatus);

    /// Called after each file is committed on the per-file path
    async fn on_file_uploaded(&self, path: &str, uploaded: usize, total: usize);

    /// Called when the pull request is opened
    async fn on_pr_created(&self, pr: &PullRequest);

    /// Called when an error occurs
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_percent(&self, _percent: u8) {}
    async fn on_batch(&self, _index: usize, _total: usize, _status: BatchStatus) {}
    async fn on_file_uploaded(&self, _path: &str, _uploaded: usize, _total: usize) {}
    async fn on_pr_created(&self, _pr: &PullRequest) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}

/// A progress update delivered over a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// New phase
    Phase(Phase),
    /// Overall percentage
    Percent(u8),
    /// Batch status change
    Batch {
        /// Zero-based batch index
        index: usize,
        /// Number of batches
        total: usize,
        /// Status
        status: BatchStatus,
    },
    /// A file was committed
    FileUploaded {
        /// Repository path
        path: String,
        /// Files committed so far
        uploaded: usize,
        /// Files in the contribution
        total: usize,
    },
    /// Pull request opened
    PrCreated(PullRequest),
    /// Error, rendered for display
    Error(String),
    /// Status message
    Message(String),
}

/// Forwards every callback as a [`ProgressEvent`] on an unbounded channel
///
/// Events sent after the receiver is dropped are discarded.
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create the callback and the receiving end of its event stream
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

#[async_trait]
impl ProgressCallback for ChannelProgress {
    async fn on_phase(&self, phase: Phase) {
        self.send(ProgressEvent::Phase(phase));
    }

    async fn on_percent(&self, percent: u8) {
        self.send(ProgressEvent::Percent(percent));
    }

    async fn on_batch(&self, index: usize, total: usize, status: BatchStatus) {
        self.send(ProgressEvent::Batch {
            index,
            total,
            status,
        });
    }

    async fn on_file_uploaded(&self, path: &str, uploaded: usize, total: usize) {
        self.send(ProgressEvent::FileUploaded {
            path: path.to_string(),
            uploaded,
            total,
        });
    }

    async fn on_pr_created(&self, pr: &PullRequest) {
        self.send(ProgressEvent::PrCreated(pr.clone()));
    }

    async fn on_error(&self, error: &Error) {
        self.send(ProgressEvent::Error(error.user_message()));
    }

    async fn on_message(&self, message: &str) {
        self.send(ProgressEvent::Message(message.to_string()));
    }
}
