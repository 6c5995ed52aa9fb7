pub mod media_slot_repository_sqlx;
pub mod password_reset_repository_sqlx;
pub mod project_repository_sqlx;
pub mod publication_repository_sqlx;
pub mod track_repository_sqlx;
pub mod user_repository_sqlx;
