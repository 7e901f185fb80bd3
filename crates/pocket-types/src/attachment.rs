//! File attachments and voice-message metadata.

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Largest accepted attachment payload (50 MiB).
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// MIME types accepted for attachments.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    // Images
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    // Documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "text/plain",
    "text/csv",
    // Audio
    "audio/mpeg",
    "audio/wav",
    "audio/webm",
    "audio/ogg",
    // Video
    "video/mp4",
    "video/webm",
    "video/ogg",
    // Archives
    "application/zip",
    "application/x-rar-compressed",
];

/// A stored file attachment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[ts(type = "number")]
    pub size: u64,
    /// Payload, typically a data URI.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub message_id: String,
    pub conversation_id: String,
    #[serde(default)]
    #[ts(type = "number")]
    pub uploaded_at: Timestamp,
}

/// Why an attachment was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileRejection {
    #[error("file size {size} exceeds the maximum of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    #[error("file type not supported: {0}")]
    UnsupportedType(String),
}

impl StoredFile {
    /// Check size and MIME type against the attachment policy.
    pub fn validate(&self) -> Result<(), FileRejection> {
        if self.size > MAX_FILE_SIZE {
            return Err(FileRejection::TooLarge {
                size: self.size,
                max: MAX_FILE_SIZE,
            });
        }
        if !ALLOWED_MIME_TYPES.contains(&self.mime_type.as_str()) {
            return Err(FileRejection::UnsupportedType(self.mime_type.clone()));
        }
        Ok(())
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Metadata for a recorded voice message. Audio bytes live elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMessage {
    pub id: String,
    /// Seconds.
    pub duration: f64,
    pub message_id: String,
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(mime: &str, size: u64) -> StoredFile {
        StoredFile {
            id: "f1".into(),
            name: "photo".into(),
            mime_type: mime.into(),
            size,
            data: String::new(),
            thumbnail: None,
            message_id: "m1".into(),
            conversation_id: "c1".into(),
            uploaded_at: 0,
        }
    }

    #[test]
    fn test_accepts_allowed_type() {
        assert!(file("image/png", 1024).validate().is_ok());
        assert!(file("image/png", 1024).is_image());
    }

    #[test]
    fn test_rejects_oversized() {
        let err = file("application/pdf", MAX_FILE_SIZE + 1)
            .validate()
            .expect_err("too large");
        assert!(matches!(err, FileRejection::TooLarge { .. }));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(file("video/mp4", MAX_FILE_SIZE).validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_type() {
        let err = file("application/x-msdownload", 10)
            .validate()
            .expect_err("unsupported");
        assert_eq!(
            err,
            FileRejection::UnsupportedType("application/x-msdownload".into())
        );
    }
}
