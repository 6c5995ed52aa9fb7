pub mod create_project;
pub mod delete_project;
pub mod get_project;
pub mod list_projects;
pub mod update_project;
