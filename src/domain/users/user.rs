use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_listener: bool,
    pub is_creator: bool,
    pub bio: String,
    pub profile_picture: Option<String>,
    pub header_image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_listener, self.is_creator)
    }
}

/// Human-readable role derived from the listener/creator flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Listener,
    Creator,
    Both,
    None,
}

impl Role {
    pub fn from_flags(is_listener: bool, is_creator: bool) -> Self {
        match (is_listener, is_creator) {
            (true, true) => Role::Both,
            (false, true) => Role::Creator,
            (true, false) => Role::Listener,
            (false, false) => Role::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Listener => "listener",
            Role::Creator => "creator",
            Role::Both => "both",
            Role::None => "none",
        }
    }
}
