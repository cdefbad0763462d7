//! Batch submission wire format
//!
//! JSON shapes exchanged with the contribution worker. Keys are camelCase;
//! `branchName` and `allFiles` are omitted when absent.

use crate::contribute::batch::Batch;
use crate::types::{ManifestEntry, PullRequest};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// One file with its base64 payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedFile {
    /// Display name
    pub name: String,
    /// Base64 payload
    pub content: String,
}

/// Files of one batch destined for the same folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpload {
    /// Destination folder
    pub folder_path: String,
    /// Files in send order
    pub files: Vec<EncodedFile>,
}

/// A manifest file reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Display name
    pub name: String,
}

/// Manifest entries grouped by folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestGroup {
    /// Folder path
    pub folder_path: String,
    /// Files in upload order
    pub files: Vec<ManifestFile>,
}

/// Position of a batch within its session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInfo {
    /// One-based batch number
    pub current: usize,
    /// Number of batches
    pub total: usize,
}

/// One batch submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Submitter email
    pub email: String,
    /// Submitter display name
    pub name: String,
    /// This batch's files, grouped by folder
    pub files: Vec<FolderUpload>,
    /// Complete manifest, only on the last batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_files: Option<Vec<ManifestGroup>>,
    /// Pull request title
    pub pr_title: String,
    /// Pull request description
    pub pr_description: String,
    /// Branch returned by the first batch; absent on the first call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    /// Whether to open the pull request after this batch
    #[serde(rename = "createPR")]
    pub create_pr: bool,
    /// Batch counter
    pub batch_info: BatchInfo,
}

impl BatchRequest {
    /// Manifest entries carried in `allFiles`, flattened in order
    pub fn manifest(&self) -> Vec<ManifestEntry> {
        self.all_files
            .iter()
            .flatten()
            .flat_map(|group| {
                group
                    .files
                    .iter()
                    .map(|f| ManifestEntry::new(group.folder_path.clone(), f.name.clone()))
            })
            .collect()
    }
}

/// Reply to a batch submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    /// Branch the files were committed to
    pub branch: String,
    /// Pull request, when one was requested and opened
    #[serde(default)]
    pub pr: Option<PullRequest>,
    /// Repository paths committed by this batch
    #[serde(default)]
    pub files_uploaded: Vec<String>,
}

/// Error body returned by the worker
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: Option<String>,
}

/// Group `(folder, value)` pairs by folder in order of first appearance
///
/// Order within each group follows the input.
pub fn group_by_folder<'a, T>(
    pairs: impl IntoIterator<Item = (&'a str, T)>,
) -> Vec<(&'a str, Vec<T>)> {
    let mut groups: Vec<(&str, Vec<T>)> = Vec::new();
    for (folder, value) in pairs {
        match groups.iter_mut().find(|(f, _)| *f == folder) {
            Some((_, values)) => values.push(value),
            None => groups.push((folder, vec![value])),
        }
    }
    groups
}

/// Encode a batch's payloads and group them by folder
pub fn encode_batch(batch: &Batch) -> Vec<FolderUpload> {
    group_by_folder(batch.items().iter().map(|item| {
        (
            item.folder(),
            EncodedFile {
                name: item.name().to_string(),
                content: BASE64.encode(item.payload()),
            },
        )
    }))
    .into_iter()
    .map(|(folder, files)| FolderUpload {
        folder_path: folder.to_string(),
        files,
    })
    .collect()
}

/// Group a manifest into the `allFiles` shape
pub fn manifest_groups(manifest: &[ManifestEntry]) -> Vec<ManifestGroup> {
    group_by_folder(manifest.iter().map(|e| {
        (
            e.folder.as_str(),
            ManifestFile {
                name: e.name.clone(),
            },
        )
    }))
    .into_iter()
    .map(|(folder, files)| ManifestGroup {
        folder_path: folder.to_string(),
        files,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribute::batch::{BatchItem, plan_batches};
    use serde_json::json;
    use std::sync::Arc;

    fn request(branch: Option<&str>, all_files: Option<Vec<ManifestGroup>>) -> BatchRequest {
        BatchRequest {
            email: "ms21001@iisermohali.ac.in".to_string(),
            name: "A Student".to_string(),
            files: vec![FolderUpload {
                folder_path: "Physics/403/2025".to_string(),
                files: vec![EncodedFile {
                    name: "a.pdf".to_string(),
                    content: "JVBERg==".to_string(),
                }],
            }],
            all_files,
            pr_title: "Add PHY403 papers".to_string(),
            pr_description: String::new(),
            branch_name: branch.map(String::from),
            create_pr: false,
            batch_info: BatchInfo {
                current: 1,
                total: 2,
            },
        }
    }

    #[test]
    fn test_first_batch_omits_branch_and_manifest() {
        let value = serde_json::to_value(request(None, None)).unwrap();
        assert_eq!(
            value,
            json!({
                "email": "ms21001@iisermohali.ac.in",
                "name": "A Student",
                "files": [{"folderPath": "Physics/403/2025", "files": [{"name": "a.pdf", "content": "JVBERg=="}]}],
                "prTitle": "Add PHY403 papers",
                "prDescription": "",
                "createPR": false,
                "batchInfo": {"current": 1, "total": 2}
            })
        );
    }

    #[test]
    fn test_last_batch_carries_branch_and_manifest() {
        let manifest = vec![ManifestGroup {
            folder_path: "Physics/403/2025".to_string(),
            files: vec![ManifestFile {
                name: "a.pdf".to_string(),
            }],
        }];
        let value = serde_json::to_value(request(Some("contribution-ms21001-1"), Some(manifest)))
            .unwrap();
        assert_eq!(value["branchName"], "contribution-ms21001-1");
        assert_eq!(value["allFiles"][0]["files"][0]["name"], "a.pdf");
    }

    #[test]
    fn test_response_with_null_pr() {
        let resp: BatchResponse =
            serde_json::from_str(r#"{"branch": "b", "pr": null, "filesUploaded": ["x/y.pdf"]}"#)
                .unwrap();
        assert_eq!(resp.branch, "b");
        assert!(resp.pr.is_none());
        assert_eq!(resp.files_uploaded, vec!["x/y.pdf"]);
    }

    #[test]
    fn test_group_by_folder_is_stable() {
        let groups = group_by_folder(vec![("A", "x"), ("B", "y"), ("A", "z")]);
        assert_eq!(groups, vec![("A", vec!["x", "z"]), ("B", vec!["y"])]);
    }

    #[test]
    fn test_encode_batch_groups_interleaved_folders() {
        let payload: Arc<[u8]> = b"%PDF".to_vec().into();
        let batches = plan_batches(
            vec![
                BatchItem::new("A/1/2020", "x.pdf", Arc::clone(&payload)),
                BatchItem::new("B/2/2021", "y.pdf", Arc::clone(&payload)),
                BatchItem::new("A/1/2020", "z.pdf", payload),
            ],
            1024,
        );
        let uploads = encode_batch(&batches[0]);
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].folder_path, "A/1/2020");
        assert_eq!(uploads[0].files[1].name, "z.pdf");
        assert_eq!(uploads[0].files[0].content, "JVBERg==");
    }

    #[test]
    fn test_request_manifest_round_trip() {
        let manifest = vec![
            ManifestEntry::new("A/1/2020", "x.pdf"),
            ManifestEntry::new("B/2/2021", "y.pdf"),
            ManifestEntry::new("A/1/2020", "z.pdf"),
        ];
        let req = request(None, Some(manifest_groups(&manifest)));
        let flattened = req.manifest();
        assert_eq!(
            flattened,
            vec![
                ManifestEntry::new("A/1/2020", "x.pdf"),
                ManifestEntry::new("A/1/2020", "z.pdf"),
                ManifestEntry::new("B/2/2021", "y.pdf"),
            ]
        );
    }
}
