pub mod email_sender;
pub mod media_slot_repository;
pub mod object_store;
pub mod password_reset_repository;
pub mod project_repository;
pub mod publication_repository;
pub mod track_repository;
pub mod user_repository;
