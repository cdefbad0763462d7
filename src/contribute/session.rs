//! Running state of one contribution

use crate::contribute::batch::Batch;
use crate::types::{ManifestEntry, PrDetails, Submitter};

/// Percentage reported once planning finishes
pub const PLANNED_PERCENT: u8 = 5;
/// Start of the range reserved for batch uploads
pub const UPLOAD_START_PERCENT: u8 = 10;
/// End of the range reserved for batch uploads
pub const UPLOAD_END_PERCENT: u8 = 90;
/// Percentage reported while the pull request is being finalized
pub const FINALIZING_PERCENT: u8 = 95;
/// Terminal percentage
pub const COMPLETE_PERCENT: u8 = 100;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Validating and planning
    Planning,
    /// Waiting on the round trip of batch `batch` (zero-based)
    ///
    /// The per-file path sends every file as its own request, so there the
    /// index counts files.
    Uploading {
        /// Batch index, or file index on the per-file path
        batch: usize,
    },
    /// Last batch sent; capturing the pull request
    Finalizing,
    /// Pull request opened
    Succeeded,
    /// Aborted; earlier batches stay on the branch
    Failed,
}

/// One submission in flight
///
/// Built at submit time and owned by the caller for the duration of the run;
/// only the upload orchestrator mutates it.
#[derive(Debug)]
pub struct ContributionSession {
    submitter: Submitter,
    details: PrDetails,
    batches: Vec<Batch>,
    branch: Option<String>,
    manifest: Vec<ManifestEntry>,
    percent: u8,
    state: SessionState,
}

impl ContributionSession {
    /// Start a session over planned batches
    pub const fn new(submitter: Submitter, details: PrDetails, batches: Vec<Batch>) -> Self {
        Self {
            submitter,
            details,
            batches,
            branch: None,
            manifest: Vec::new(),
            percent: 0,
            state: SessionState::Planning,
        }
    }

    /// Who is contributing
    pub const fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    /// Pull request title and description
    pub const fn details(&self) -> &PrDetails {
        &self.details
    }

    /// Planned batches
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Branch returned by the first batch, once known
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Files confirmed uploaded so far, in upload order
    pub fn manifest(&self) -> &[ManifestEntry] {
        &self.manifest
    }

    /// Last reported percentage
    pub const fn percent(&self) -> u8 {
        self.percent
    }

    /// Current lifecycle state
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Consume the session, keeping the branch and manifest
    pub fn into_parts(self) -> (Option<String>, Vec<ManifestEntry>) {
        (self.branch, self.manifest)
    }

    pub(crate) const fn set_state(&mut self, state: SessionState) {
        self.state = state;
    }

    pub(crate) fn set_branch(&mut self, branch: String) {
        self.branch = Some(branch);
    }

    pub(crate) fn record(&mut self, entries: impl IntoIterator<Item = ManifestEntry>) {
        self.manifest.extend(entries);
    }

    /// Raise the percentage; returns false when `percent` would not increase it
    pub(crate) const fn advance(&mut self, percent: u8) -> bool {
        if percent > self.percent {
            self.percent = percent;
            true
        } else {
            false
        }
    }
}

/// Percentage after `completed` of `total` batches
pub fn upload_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return UPLOAD_END_PERCENT;
    }
    let span = usize::from(UPLOAD_END_PERCENT - UPLOAD_START_PERCENT);
    let done = span * completed.min(total) / total;
    UPLOAD_START_PERCENT + u8::try_from(done).unwrap_or(UPLOAD_END_PERCENT - UPLOAD_START_PERCENT)
}
