use std::collections::BTreeSet;

use super::{IncomingFile, SlotKind};

pub const AUDIO_CONTENT_TYPES: &[&str] = &[
    "audio/mpeg",
    "audio/mp3",
    "audio/wav",
    "audio/x-wav",
    "audio/ogg",
    "audio/flac",
    "audio/aac",
    "audio/mp4",
    "audio/x-m4a",
    "audio/webm",
];

pub const IMAGE_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotPolicy {
    pub max_size_bytes: u64,
    /// Empty means any content type is accepted.
    pub allowed_content_types: BTreeSet<String>,
    /// Shown in validation errors, e.g. "MP3, WAV, OGG".
    pub label: &'static str,
}

impl SlotPolicy {
    pub fn new(max_size_bytes: u64, allowed: &[&str], label: &'static str) -> Self {
        Self {
            max_size_bytes,
            allowed_content_types: allowed.iter().map(|s| s.to_string()).collect(),
            label,
        }
    }

    #[cfg(test)]
    pub fn unrestricted(max_size_bytes: u64) -> Self {
        Self {
            max_size_bytes,
            allowed_content_types: BTreeSet::new(),
            label: "any",
        }
    }

    /// Returns a user-facing message describing the first violated rule.
    pub fn check(&self, kind: SlotKind, file: &IncomingFile) -> Result<(), String> {
        let essence = file.mime_essence();
        if !self.allowed_content_types.is_empty() && !self.allowed_content_types.contains(&essence)
        {
            return Err(format!(
                "Unsupported {} format '{}'. Allowed: {}.",
                kind, essence, self.label
            ));
        }
        if file.size() > self.max_size_bytes {
            return Err(format!(
                "{} file must be under {}.",
                capitalize(kind.as_str()),
                human_size(self.max_size_bytes)
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MediaPolicies {
    pub avatar: SlotPolicy,
    pub header: SlotPolicy,
    pub audio: SlotPolicy,
    pub cover: SlotPolicy,
}

impl MediaPolicies {
    pub fn with_limits(avatar: u64, header: u64, audio: u64, cover: u64) -> Self {
        let images = "JPEG, PNG, GIF, WebP";
        Self {
            avatar: SlotPolicy::new(avatar, IMAGE_CONTENT_TYPES, images),
            header: SlotPolicy::new(header, IMAGE_CONTENT_TYPES, images),
            audio: SlotPolicy::new(
                audio,
                AUDIO_CONTENT_TYPES,
                "MP3, WAV, OGG, FLAC, AAC, M4A, WebM",
            ),
            cover: SlotPolicy::new(cover, IMAGE_CONTENT_TYPES, images),
        }
    }

    pub fn for_kind(&self, kind: SlotKind) -> &SlotPolicy {
        match kind {
            SlotKind::Avatar => &self.avatar,
            SlotKind::Header => &self.header,
            SlotKind::Audio => &self.audio,
            SlotKind::Cover => &self.cover,
        }
    }
}

impl Default for MediaPolicies {
    fn default() -> Self {
        Self::with_limits(5 * MB, 10 * MB, 50 * MB, 10 * MB)
    }
}

const MB: u64 = 1024 * 1024;

fn human_size(bytes: u64) -> String {
    if bytes >= MB && bytes % MB == 0 {
        format!("{} MB", bytes / MB)
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{} KB", bytes / 1024)
    } else {
        format!("{bytes} bytes")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
