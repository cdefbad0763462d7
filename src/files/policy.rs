//! Per-file selection policy: size ceiling and extension allow-list

use crate::error::Error;

/// A file refused at selection time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// File name as selected
    pub name: String,
    /// Why it was refused
    pub reason: String,
}

impl From<Rejection> for Error {
    fn from(r: Rejection) -> Self {
        Self::Rejected {
            name: r.name,
            reason: r.reason,
        }
    }
}

/// Client-side checks applied before a file joins a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePolicy {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl FilePolicy {
    /// Create a policy; extensions are compared case-insensitively
    pub fn new(max_file_size: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Per-file byte ceiling
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Check one file; size is checked before type
    pub fn check(&self, name: &str, len: u64) -> Result<(), Rejection> {
        if len > self.max_file_size {
            return Err(Rejection {
                name: name.to_string(),
                reason: format!("File too large (max {})", format_size(self.max_file_size)),
            });
        }

        self.check_type(name)
    }

    /// Check only the extension, for names given after selection
    pub fn check_type(&self, name: &str) -> Result<(), Rejection> {
        let ext = extension(name);
        if self.allowed_extensions.iter().any(|a| *a == ext) {
            Ok(())
        } else {
            Err(Rejection {
                name: name.to_string(),
                reason: "Unsupported file type".to_string(),
            })
        }
    }
}

/// Lower-cased text after the last dot (the whole name when there is none)
pub fn extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or(name).to_ascii_lowercase()
}

/// Human-readable size in the units the contribution form uses
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["Bytes", "KB", "MB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> FilePolicy {
        FilePolicy::new(10 * 1024 * 1024, vec!["pdf".into(), "JPG".into()])
    }

    #[test]
    fn test_accepts_allowed() {
        assert!(policy().check("Midsem.PDF", 1024).is_ok());
        assert!(policy().check("scan.jpg", 10 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_rejects_oversized_before_type() {
        let r = policy().check("huge.exe", 10 * 1024 * 1024 + 1).unwrap_err();
        assert_eq!(r.reason, "File too large (max 10 MB)");
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let r = policy().check("virus.exe", 10).unwrap_err();
        assert_eq!(r.name, "virus.exe");
        assert_eq!(r.reason, "Unsupported file type");
        assert!(policy().check("noextension", 10).is_err());
    }

    #[test]
    fn test_check_type_ignores_size() {
        assert!(policy().check_type("Endsem 2025.pdf").is_ok());
        let err: Error = policy().check_type("payload.exe").unwrap_err().into();
        assert_eq!(err.to_string(), "payload.exe: Unsupported file type");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 Bytes");
        assert_eq!(format_size(512), "512 Bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10 MB");
    }
}
