use uuid::Uuid;

pub const DEFAULT_PROJECT_NAME: &str = "Untitled Project";

/// A saved DAW session. `data` is the opaque editor state (tracks, clips,
/// notes, effects, bpm) as produced by the workstation frontend.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub data: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
