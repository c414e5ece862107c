use thiserror::Error;

use crate::models::Role;
use crate::utils::meeting_time::MeetingTimeError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not logged in. Run `coursereg login` first")]
    NotLoggedIn,

    #[error("This page requires the {required} role, current session is {actual}")]
    WrongRole { required: Role, actual: Role },

    #[error("Course ID {0} not found")]
    CourseNotFound(u32),

    #[error("Invalid meeting time: {0}")]
    InvalidMeetingTime(#[from] MeetingTimeError),
}
