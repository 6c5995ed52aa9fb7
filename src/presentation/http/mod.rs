pub mod auth;
pub mod error;
pub mod forms;
pub mod health;
pub mod media;
pub mod profile;
pub mod projects;
pub mod publications;
pub mod tracks;
