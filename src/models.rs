use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Course {
    pub id: u32,
    pub dept_code: String,
    pub course_number: String,
    pub instructor: String,
    pub description: String,
    pub location: String,
    pub meeting_time: String,
}

// Body of `admin/add_course`; the backend assigns the id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewCourse {
    pub dept_code: String,
    pub course_number: String,
    pub instructor: String,
    pub description: String,
    pub location: String,
    pub meeting_time: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScheduledCourse {
    pub course_id: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub slot: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Schedule {
    pub courses: Vec<ScheduledCourse>,
}

// One element of `GET student/schedule`, serialized as a two-element array.
pub type ScheduleItem = (ScheduledCourse, Course);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Student => write!(f, "student"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoginResponse {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MessageBody {
    pub message: String,
}
