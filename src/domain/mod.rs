pub mod media;
pub mod projects;
pub mod publications;
pub mod tracks;
pub mod users;
