//! Batch planning
//!
//! Greedy single-pass bin filling. Input order is preserved across and
//! within batches; a file larger than the capacity travels alone.

use crate::contribute::estimate::encoded_size;
use crate::files::{FolderPath, UploadGroup};
use std::sync::Arc;

/// One file queued for transmission
#[derive(Debug, Clone)]
pub struct BatchItem {
    folder: String,
    name: String,
    payload: Arc<[u8]>,
    estimated_size: u64,
}

impl BatchItem {
    /// Queue a payload for `folder/name`
    pub fn new(folder: impl Into<String>, name: impl Into<String>, payload: Arc<[u8]>) -> Self {
        let estimated_size = encoded_size(payload.len() as u64);
        Self {
            folder: folder.into(),
            name: name.into(),
            payload,
            estimated_size,
        }
    }

    /// Items for every file of a group, in selection order, under its validated folder
    pub fn from_group(folder: &FolderPath, group: &UploadGroup) -> Vec<Self> {
        let folder = folder.to_string();
        group
            .files()
            .iter()
            .map(|file| Self::new(folder.clone(), group.display_name(file), file.payload()))
            .collect()
    }

    /// Destination folder
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Display name the file is committed under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Estimated size after transport encoding
    pub const fn estimated_size(&self) -> u64 {
        self.estimated_size
    }
}

/// An ordered group of items sent in one round trip
#[derive(Debug, Clone)]
pub struct Batch {
    items: Vec<BatchItem>,
}

impl Batch {
    /// Items in send order
    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch is empty (never true for planned batches)
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of estimated encoded sizes
    pub fn total_size(&self) -> u64 {
        self.items.iter().map(BatchItem::estimated_size).sum()
    }
}

/// Partition `items` into batches of at most `capacity` encoded bytes
pub fn plan_batches(items: Vec<BatchItem>, capacity: u64) -> Vec<Batch> {
    partition(items, capacity, BatchItem::estimated_size)
        .into_iter()
        .map(|items| Batch { items })
        .collect()
}

/// Greedy partition over any sized item
///
/// Every output chunk sums to at most `capacity`, unless it is a singleton
/// whose one item alone exceeds it.
pub fn partition<T, F>(items: impl IntoIterator<Item = T>, capacity: u64, size_of: F) -> Vec<Vec<T>>
where
    F: Fn(&T) -> u64,
{
    let mut batches = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut current_size = 0u64;

    for item in items {
        let size = size_of(&item);

        if size > capacity {
            if !current.is_empty() {
                batches.push(std::mem::take(&mut current));
                current_size = 0;
            }
            batches.push(vec![item]);
            continue;
        }

        if current_size + size > capacity && !current.is_empty() {
            batches.push(std::mem::take(&mut current));
            current_size = 0;
        }

        current.push(item);
        current_size += size;
    }

    if !current.is_empty() {
        batches.push(current);
    }

    batches
}
