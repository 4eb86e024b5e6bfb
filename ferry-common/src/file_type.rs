//! File type classification
//!
//! The file type travels with uploads and byte imports so the remote side
//! and the local cache can store the content appropriately. The coordinator
//! treats it as opaque.

use serde::{Deserialize, Serialize};

/// Kind of content a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Document,
    Photo,
    Video,
    Audio,
    Voice,
    Thumbnail,
    Encrypted,
}

impl FileType {
    /// Convert to the string representation used in serialized messages
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Thumbnail => "thumbnail",
            Self::Encrypted => "encrypted",
        }
    }

    /// Parse from the string representation
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "document" => Some(Self::Document),
            "photo" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            "voice" => Some(Self::Voice),
            "thumbnail" => Some(Self::Thumbnail),
            "encrypted" => Some(Self::Encrypted),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str() {
        assert_eq!(FileType::Document.as_str(), "document");
        assert_eq!(FileType::Encrypted.as_str(), "encrypted");
    }

    #[test]
    fn test_parse() {
        assert_eq!(FileType::parse("photo"), Some(FileType::Photo));
        assert_eq!(FileType::parse("voice"), Some(FileType::Voice));
        assert_eq!(FileType::parse("bogus"), None);
        assert_eq!(FileType::parse(""), None);
    }

    #[test]
    fn test_roundtrip() {
        for file_type in [
            FileType::Document,
            FileType::Photo,
            FileType::Video,
            FileType::Audio,
            FileType::Voice,
            FileType::Thumbnail,
            FileType::Encrypted,
        ] {
            assert_eq!(FileType::parse(file_type.as_str()), Some(file_type));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", FileType::Video), "video");
    }
}
