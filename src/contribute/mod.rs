//! Contribution pipeline
//!
//! Turns selected files into one branch and one pull request.
//!
//! - Size estimation and batch planning
//! - Branch naming and one-time creation
//! - Sequential batch upload with manifest accumulation
//! - Pull request description rendering
//! - Trusted-domain (batched) and delegated (fork) paths

pub mod batch;
pub mod branch;
pub mod delegated;
pub mod describe;
pub mod estimate;
pub mod handler;
pub mod orchestrate;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod transport;
pub mod wire;

pub use batch::{Batch, BatchItem, partition, plan_batches};
pub use branch::{BranchCoordinator, derive_branch_name, needs_branch};
pub use delegated::contribute_delegated;
pub use describe::build_description;
pub use estimate::encoded_size;
pub use handler::DirectBatchHandler;
pub use orchestrate::UploadOrchestrator;
pub use pipeline::{
    ContributionRequest, ContributionResult, contribute_batched, plan, report_dry_run, validate,
};
pub use progress::{BatchStatus, ChannelProgress, NoopProgress, Phase, ProgressCallback, ProgressEvent};
pub use session::{ContributionSession, SessionState};
pub use transport::{BatchTransport, HttpTransport};
pub use wire::{BatchRequest, BatchResponse};
