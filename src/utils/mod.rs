pub mod api;
pub mod calendar;
pub mod meeting_time;
pub mod preferences;
pub mod render;
pub mod search;
