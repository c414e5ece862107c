use std::fs;
use anyhow::{Context, Result};
use log::{info, warn};
use crate::error::ClientError;
use crate::models::{Course, NewCourse, Role, User};
use crate::state::{AppState, Session};
use crate::utils::calendar::{entries_from_schedule, layout, CalendarLayout};
use crate::utils::meeting_time::validate_meeting_time;
use crate::utils::preferences::{self, Preferences};
use crate::utils::render::{calendar_page, calendar_text, course_list_text, user_list_text};
use crate::utils::search::{filter_courses, CourseFilter};

/// Field overrides for an existing course; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseChanges {
    pub dept_code: Option<String>,
    pub course_number: Option<String>,
    pub instructor: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub meeting_time: Option<String>,
}

impl CourseChanges {
    fn apply(self, mut course: Course) -> Course {
        if let Some(v) = self.dept_code {
            course.dept_code = v;
        }
        if let Some(v) = self.course_number {
            course.course_number = v;
        }
        if let Some(v) = self.instructor {
            course.instructor = v;
        }
        if let Some(v) = self.description {
            course.description = v;
        }
        if let Some(v) = self.location {
            course.location = v;
        }
        if let Some(v) = self.meeting_time {
            course.meeting_time = v;
        }
        course
    }
}

/// Everything a user can ask the client to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Login { username: String, password: String },
    Logout,
    ListCourses(CourseFilter),
    ShowSchedule,
    AddToSchedule(u32),
    DropFromSchedule(u32),
    EditScheduleEntry { course_id: u32, notes: Option<String>, slot: Option<String> },
    ShowPreferences,
    SavePreferences(Preferences),
    AddCourse(NewCourse),
    UpdateCourse { id: u32, changes: CourseChanges },
    DeleteCourse(u32),
    ListUsers,
    AddUser { username: String, password: String },
    DeleteUser(String),
}

impl Intent {
    /// The page (admin or student) this intent belongs to, if any.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Intent::Login { .. } | Intent::Logout | Intent::ListCourses(_) => None,
            Intent::ShowSchedule
            | Intent::AddToSchedule(_)
            | Intent::DropFromSchedule(_)
            | Intent::EditScheduleEntry { .. }
            | Intent::ShowPreferences
            | Intent::SavePreferences(_) => Some(Role::Student),
            Intent::AddCourse(_)
            | Intent::UpdateCourse { .. }
            | Intent::DeleteCourse(_)
            | Intent::ListUsers
            | Intent::AddUser { .. }
            | Intent::DeleteUser(_) => Some(Role::Admin),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Message(String),
    Courses(Vec<Course>),
    Calendar(CalendarLayout),
    Users(Vec<User>),
    Preferences(Preferences),
}

impl Outcome {
    pub fn to_text(&self) -> String {
        match self {
            Outcome::Message(message) => format!("{}\n", message),
            Outcome::Courses(courses) => course_list_text(&courses.iter().collect::<Vec<_>>()),
            Outcome::Calendar(calendar) => calendar_text(calendar),
            Outcome::Users(users) => user_list_text(users),
            Outcome::Preferences(prefs) => preferences::describe(prefs),
        }
    }
}

pub async fn dispatch(state: &mut AppState, intent: Intent) -> Result<Outcome> {
    if let Some(required) = intent.required_role() {
        state.require_role(required)?;
    }

    match intent {
        Intent::Login { username, password } => {
            let response = state.api.login(&username, &password).await?;
            info!("Logged in, role is: {}", response.role);
            let message = format!("Logged in as {} ({})", username, response.role);
            let session = Session { username, role: response.role };
            session.save(&state.config.session_file)?;
            state.session = Some(session);
            Ok(Outcome::Message(message))
        }
        Intent::Logout => {
            state.api.logout().await?;
            Session::clear(&state.config.session_file)?;
            state.session = None;
            Ok(Outcome::Message("Logged out".to_string()))
        }
        Intent::ListCourses(filter) => {
            let courses = state.api.courses().await?;
            let matching = filter_courses(&courses, &filter).into_iter().cloned().collect();
            Ok(Outcome::Courses(matching))
        }
        Intent::ShowSchedule => show_schedule(state).await,
        Intent::AddToSchedule(course_id) => {
            let schedule = state.api.add_to_schedule(course_id).await?;
            info!(
                "Added course {} to schedule, {} courses scheduled",
                course_id,
                schedule.courses.len()
            );
            show_schedule(state).await
        }
        Intent::DropFromSchedule(course_id) => {
            let schedule = state.api.drop_from_schedule(course_id).await?;
            info!("Dropped course: {}, {} courses left", course_id, schedule.courses.len());
            show_schedule(state).await
        }
        Intent::EditScheduleEntry { course_id, notes, slot } => {
            let schedule = state.api.schedule().await?;
            let Some((mut entry, _)) = schedule
                .into_iter()
                .find(|(sc, _)| sc.course_id == course_id)
            else {
                warn!("Course ID {} is not in the schedule", course_id);
                return Err(ClientError::CourseNotFound(course_id).into());
            };
            if let Some(notes) = notes {
                entry.notes = notes;
            }
            if let Some(slot) = slot {
                entry.slot = slot;
            }
            state.api.update_schedule_entry(&entry).await?;
            show_schedule(state).await
        }
        Intent::ShowPreferences => {
            let username = state.require_role(Role::Student)?.username.clone();
            Ok(Outcome::Preferences(preferences::load(&state.config.preferences_file, &username)?))
        }
        Intent::SavePreferences(prefs) => {
            let username = state.require_role(Role::Student)?.username.clone();
            preferences::save(&state.config.preferences_file, &username, &prefs)?;
            Ok(Outcome::Preferences(prefs))
        }
        Intent::AddCourse(course) => {
            validate_meeting_time(&course.meeting_time).map_err(ClientError::from)?;
            let created = state.api.add_course(&course).await?;
            info!("Course added with id {}", created.id);
            Ok(Outcome::Message(format!(
                "Course added! #{} {} {}",
                created.id, created.dept_code, created.course_number
            )))
        }
        Intent::UpdateCourse { id, changes } => {
            let courses = state.api.courses().await?;
            let Some(course) = courses.into_iter().find(|c| c.id == id) else {
                warn!("Course ID {} not found", id);
                return Err(ClientError::CourseNotFound(id).into());
            };
            let updated = changes.apply(course);
            validate_meeting_time(&updated.meeting_time).map_err(ClientError::from)?;
            let saved = state.api.update_course(&updated).await?;
            Ok(Outcome::Message(format!("Course #{} updated", saved.id)))
        }
        Intent::DeleteCourse(id) => {
            let response = state.api.delete_course(id).await?;
            Ok(Outcome::Message(response.message))
        }
        Intent::ListUsers => Ok(Outcome::Users(state.api.users().await?)),
        Intent::AddUser { username, password } => {
            let user = User { username, password, role: Role::Student };
            let response = state.api.add_user(&user).await?;
            Ok(Outcome::Message(response.message))
        }
        Intent::DeleteUser(username) => {
            let response = state.api.delete_user(&username).await?;
            Ok(Outcome::Message(response.message))
        }
    }
}

// Fetches the schedule, rebuilds the calendar from scratch and writes the page.
async fn show_schedule(state: &AppState) -> Result<Outcome> {
    info!("Starting to load schedule...");
    let items = state.api.schedule().await?;
    let calendar = layout(&entries_from_schedule(&items), &state.layout_options());

    let out = &state.config.calendar_out;
    fs::write(out, calendar_page(&calendar).into_string())
        .with_context(|| format!("Failed to write calendar to {}", out.display()))?;
    info!("Calendar with {} events written to {}", calendar.block_count(), out.display());

    Ok(Outcome::Calendar(calendar))
}
