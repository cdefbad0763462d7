//! Test data factories for qpr-contrib types
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use qpr_contrib::config::Config;
use qpr_contrib::contribute::ContributionRequest;
use qpr_contrib::files::{FileEntry, FilePolicy, UploadGroup};
use qpr_contrib::platform::RetryPolicy;
use qpr_contrib::types::{PrDetails, Submitter};
use std::time::Duration;

pub const MIB: usize = 1024 * 1024;

/// A file of `len` bytes
pub fn make_file(name: &str, len: usize) -> FileEntry {
    FileEntry::new(name, vec![b'x'; len])
}

/// A group holding `files` as (name, byte length) pairs
///
/// Files are inserted without the selection policy so tests can use any size.
pub fn make_group(folder: &str, files: &[(&str, usize)]) -> UploadGroup {
    let mut group = UploadGroup::new(folder);
    let policy = FilePolicy::new(u64::MAX, vec!["pdf".to_string()]);
    let rejected = group.add_files(files.iter().map(|(n, len)| make_file(n, *len)), &policy);
    assert!(rejected.is_empty(), "fixture files rejected: {rejected:?}");
    group
}

/// A request with the given groups and a title
pub fn make_request(groups: Vec<UploadGroup>) -> ContributionRequest {
    ContributionRequest {
        groups,
        details: PrDetails {
            title: "Add PHY403 papers".to_string(),
            description: "Midsem and endsem, 2025".to_string(),
        },
    }
}

/// A request whose files have the given byte lengths, one folder each
pub fn make_sized_request(sizes: &[usize]) -> ContributionRequest {
    let groups = sizes
        .iter()
        .enumerate()
        .map(|(idx, len)| {
            let name = format!("paper{idx}.pdf");
            make_group(&format!("Physics/PHY403/{}", 2020 + idx), &[(&name, *len)])
        })
        .collect();
    make_request(groups)
}

/// Trusted submitter from the default trusted domain
pub fn trusted_submitter() -> Submitter {
    Submitter::Trusted {
        email: "ms21001@iisermohali.ac.in".to_string(),
        name: "A Student".to_string(),
    }
}

/// Default config with no waiting and no retries
pub fn fast_config() -> Config {
    Config {
        retry: RetryPolicy {
            attempts: 1,
            base_delay: Duration::ZERO,
            call_timeout: Duration::from_secs(5),
        },
        fork_ready_delay: Duration::ZERO,
        ..Config::default()
    }
}

/// Fast config with a custom batch capacity
pub fn config_with_capacity(capacity: u64) -> Config {
    Config {
        batch_capacity: capacity,
        ..fast_config()
    }
}
