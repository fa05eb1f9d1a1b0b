//! Attachment rules for the upload step. Limits here are advisory: they are
//! reported back to the caller but never block an attachment.

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::protocol::{DocumentAdvisory, DocumentMeta};
use tracing::warn;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "jpg", "jpeg", "png",
];
pub const DEFAULT_MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_file_bytes: u64,
}

impl Default for DocumentPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl DocumentPolicy {
    pub fn accepts_extension(&self, file_name: &str) -> bool {
        let Some(ext) = Path::new(file_name).extension().and_then(|ext| ext.to_str()) else {
            return false;
        };
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }

    pub fn check(&self, file_name: &str, size_bytes: u64) -> Vec<DocumentAdvisory> {
        let mut advisories = Vec::new();
        if !self.accepts_extension(file_name) {
            warn!(file_name, "document extension is outside the accepted list");
            advisories.push(DocumentAdvisory::UnsupportedExtension);
        }
        if size_bytes > self.max_file_bytes {
            warn!(
                file_name,
                size_bytes,
                limit = self.max_file_bytes,
                "document exceeds advisory size limit"
            );
            advisories.push(DocumentAdvisory::ExceedsSizeLimit {
                limit_bytes: self.max_file_bytes,
            });
        }
        advisories
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachedDocument {
    pub meta: DocumentMeta,
    pub size_bytes: u64,
    pub advisories: Vec<DocumentAdvisory>,
}

impl AttachedDocument {
    pub fn new(policy: &DocumentPolicy, name: &str, size_bytes: u64, mime_type: &str) -> Self {
        let advisories = policy.check(name, size_bytes);
        Self {
            meta: DocumentMeta {
                name: name.to_string(),
                size: format_file_size(size_bytes),
                mime_type: mime_type.to_string(),
            },
            size_bytes,
            advisories,
        }
    }
}

/// Human-readable size in base-1024 units with at most two decimals,
/// e.g. `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{scaled:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes_like_the_upload_panel() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2_621_440), "2.5 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let policy = DocumentPolicy::default();
        assert!(policy.accepts_extension("Board_Cert.PDF"));
        assert!(policy.accepts_extension("minutes.docx"));
        assert!(!policy.accepts_extension("archive.zip"));
        assert!(!policy.accepts_extension("README"));
    }

    #[test]
    fn oversize_and_unknown_type_are_advisories_only() {
        let policy = DocumentPolicy::default();
        let doc = AttachedDocument::new(&policy, "dump.bin", DEFAULT_MAX_FILE_BYTES + 1, "");
        assert_eq!(
            doc.advisories,
            vec![
                DocumentAdvisory::UnsupportedExtension,
                DocumentAdvisory::ExceedsSizeLimit {
                    limit_bytes: DEFAULT_MAX_FILE_BYTES
                },
            ]
        );
        assert_eq!(doc.meta.name, "dump.bin");
    }

    #[test]
    fn limit_itself_is_allowed() {
        let policy = DocumentPolicy::default();
        assert!(policy.check("policy.pdf", DEFAULT_MAX_FILE_BYTES).is_empty());
    }
}
