//! Pull request description rendering

use crate::contribute::wire::group_by_folder;
use crate::types::{ManifestEntry, Submitter};
use std::fmt::Write;

/// Marker appended to every generated description
pub const PROVENANCE: &str = "*This PR was created via the QPR Contribution Portal*";

/// Render the pull request body for a manifest
///
/// Entries are grouped by folder in order of first appearance; file order
/// within a folder follows the manifest.
pub fn build_description(
    description: &str,
    manifest: &[ManifestEntry],
    submitter: Option<&Submitter>,
) -> String {
    let mut body = String::new();

    let description = description.trim();
    if !description.is_empty() {
        body.push_str(description);
        body.push_str("\n\n");
    }

    body.push_str("### Files Added:\n");
    let groups = group_by_folder(manifest.iter().map(|e| (e.folder.as_str(), e.name.as_str())));
    for (idx, (folder, names)) in groups.iter().enumerate() {
        if idx > 0 {
            body.push('\n');
        }
        let _ = writeln!(body, "- **{folder}/**:");
        for name in names {
            let _ = writeln!(body, "  - {name}");
        }
    }

    body.push_str("\n---\n");
    if let Some(submitter) = submitter {
        let _ = writeln!(body, "{}\n", submitter.attribution());
    }
    body.push_str(PROVENANCE);
    body
}
