use std::fmt;

use uuid::Uuid;

use super::IncomingFile;

/// File-valued attribute of an owning record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Avatar,
    Header,
    Audio,
    Cover,
}

impl SlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Avatar => "avatar",
            SlotKind::Header => "header",
            SlotKind::Audio => "audio",
            SlotKind::Cover => "cover",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotOwner {
    User(Uuid),
    Track(Uuid),
    Publication(Uuid),
}

impl SlotOwner {
    pub fn id(&self) -> Uuid {
        match self {
            SlotOwner::User(id) | SlotOwner::Track(id) | SlotOwner::Publication(id) => *id,
        }
    }

    /// Slot kinds carried by this owner type.
    pub fn kinds(&self) -> &'static [SlotKind] {
        match self {
            SlotOwner::User(_) => &[SlotKind::Avatar, SlotKind::Header],
            SlotOwner::Track(_) => &[SlotKind::Audio],
            SlotOwner::Publication(_) => &[SlotKind::Audio, SlotKind::Cover],
        }
    }

    /// Storage prefix for files of `kind` owned by this record type.
    /// `None` when the owner type has no such slot.
    pub fn storage_prefix(&self, kind: SlotKind) -> Option<&'static str> {
        match (self, kind) {
            (SlotOwner::User(_), SlotKind::Avatar) => Some("profiles/avatars"),
            (SlotOwner::User(_), SlotKind::Header) => Some("profiles/headers"),
            (SlotOwner::Track(_), SlotKind::Audio) => Some("tracks"),
            (SlotOwner::Publication(_), SlotKind::Audio) => Some("publications"),
            (SlotOwner::Publication(_), SlotKind::Cover) => Some("publications/covers"),
            _ => None,
        }
    }
}

impl fmt::Display for SlotOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotOwner::User(id) => write!(f, "user:{id}"),
            SlotOwner::Track(id) => write!(f, "track:{id}"),
            SlotOwner::Publication(id) => write!(f, "publication:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSlot {
    pub owner: SlotOwner,
    pub kind: SlotKind,
    pub current_path: Option<String>,
}

impl MediaSlot {
    pub fn new(owner: SlotOwner, kind: SlotKind, current_path: Option<String>) -> Self {
        Self {
            owner,
            kind,
            current_path,
        }
    }

    pub fn empty(owner: SlotOwner, kind: SlotKind) -> Self {
        Self::new(owner, kind, None)
    }

    pub fn with_path(&self, path: Option<String>) -> Self {
        Self {
            owner: self.owner,
            kind: self.kind,
            current_path: path,
        }
    }

    /// Generate a never-before-used storage key for `file` in this slot:
    /// `{prefix}/{owner_id}-{key}.{ext}`.
    pub fn fresh_path(&self, file: &IncomingFile) -> anyhow::Result<String> {
        let prefix = self.owner.storage_prefix(self.kind).ok_or_else(|| {
            anyhow::anyhow!("{} has no {} slot", self.owner, self.kind)
        })?;
        let key = Uuid::new_v4().simple().to_string();
        let key = &key[..12];
        let stem = format!("{}/{}-{}", prefix, self.owner.id(), key);
        Ok(match file.extension() {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        })
    }
}
