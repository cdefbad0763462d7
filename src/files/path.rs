//! Folder path grammar: `Subject/CourseCode/Year[/Subfolder...]`

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("hardcoded segment pattern is valid"))
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}$").expect("hardcoded year pattern is valid"))
}

/// A validated destination folder inside the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderPath {
    subject: String,
    course: String,
    year: String,
    subfolders: Vec<String>,
}

impl FolderPath {
    /// Build a folder path from its individually supplied parts
    pub fn from_parts(
        subject: &str,
        course: &str,
        year: &str,
        subfolder: Option<&str>,
    ) -> Result<Self> {
        let subject = check_segment("subject", subject)?;
        let course = check_segment("course code", course)?;
        let year = year.trim();
        if !year_re().is_match(year) {
            return Err(invalid(format!("year must be four digits, got {year:?}")));
        }

        let subfolders = match subfolder.map(str::trim) {
            None | Some("") => Vec::new(),
            Some(sub) => sub
                .split('/')
                .map(|s| check_segment("subfolder", s))
                .collect::<Result<_>>()?,
        };

        Ok(Self {
            subject,
            course,
            year: year.to_string(),
            subfolders,
        })
    }

    /// Parse a slash-delimited path such as `Physics/403/2025`
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "Please specify folder path for all groups with files".to_string(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(4, '/').collect();
        match parts.as_slice() {
            [subject, course, year] => Self::from_parts(subject, course, year, None),
            [subject, course, year, rest] => Self::from_parts(subject, course, year, Some(rest)),
            _ => Err(invalid(format!(
                "Invalid folder path format: {trimmed}\nUse format: Subject/CourseCode/Year"
            ))),
        }
    }

    /// Subject segment
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Course code segment
    pub fn course(&self) -> &str {
        &self.course
    }

    /// Year segment
    pub fn year(&self) -> &str {
        &self.year
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.subject, self.course, self.year)?;
        for sub in &self.subfolders {
            write!(f, "/{sub}")?;
        }
        Ok(())
    }
}

/// Check a display name is safe to commit as a single path component
pub fn validate_file_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid("file name is empty".to_string()));
    }
    if trimmed == "." || trimmed == ".." || trimmed.contains(['/', '\\']) {
        return Err(invalid(format!("file name may not contain path separators: {name}")));
    }
    Ok(())
}

fn check_segment(what: &str, raw: &str) -> Result<String> {
    let s = raw.trim();
    if segment_re().is_match(s) {
        Ok(s.to_string())
    } else if s.is_empty() {
        Err(invalid(format!("{what} is required")))
    } else {
        Err(invalid(format!(
            "{what} may only contain letters, digits, '-' and '_', got {s:?}"
        )))
    }
}

fn invalid(msg: String) -> Error {
    Error::Validation(msg)
}
