use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Publication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub audio_file: String,
    pub cover_image: Option<String>,
    pub is_public: bool,
    pub play_count: i64,
    pub published_at: chrono::DateTime<chrono::Utc>,
    // Author fields joined from users for feed rendering.
    pub username: String,
    pub author_picture: Option<String>,
}
