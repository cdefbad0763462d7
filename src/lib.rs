//! qpr-contrib - batched contributions to a shared question-paper repository
//!
//! Uploads files into `Subject/CourseCode/Year` folders of a GitHub
//! repository and opens one pull request for them, either from the
//! contributor's fork or, for verified institutional addresses, through
//! size-bounded batches written straight to the upstream repository.

pub mod auth;
pub mod config;
pub mod contribute;
pub mod error;
pub mod files;
pub mod platform;
pub mod types;

pub use error::{Error, Result};
