use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Track {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub audio_file: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}
