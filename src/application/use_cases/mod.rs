pub mod auth;
pub mod profile;
pub mod projects;
pub mod publications;
pub mod tracks;
