pub mod create_track;
pub mod delete_track;
pub mod list_tracks;
pub mod update_track;

use crate::application::services::media::MediaError;

pub const TITLE_MAX_LEN: usize = 255;

pub(crate) fn validate_title(title: &str) -> Result<String, MediaError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(MediaError::Validation("Title may not be blank.".into()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(MediaError::Validation(format!(
            "Ensure the title has no more than {TITLE_MAX_LEN} characters."
        )));
    }
    Ok(title.to_string())
}
