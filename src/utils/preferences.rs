use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use anyhow::{anyhow, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use crate::utils::meeting_time::{build_meeting_time, parse_slots, MeetingSlot};

/// A student's scheduling wishes, kept on this machine only.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub preferred_courses: Vec<u32>,
    pub max_credits: Option<u32>,
    /// Same encoding as a course's meeting time, e.g. `"F 08:00-21:00"`.
    #[serde(default)]
    pub unavailable_times: String,
}

impl Preferences {
    pub fn new(
        preferred_courses: Vec<u32>,
        max_credits: Option<u32>,
        unavailable_times: &str,
    ) -> Self {
        // Re-serializing drops malformed tokens (with a warning) and pads hours.
        let unavailable_times = build_meeting_time(&parse_slots(unavailable_times));
        Self { preferred_courses, max_credits, unavailable_times }
    }

    pub fn unavailable_slots(&self) -> Vec<MeetingSlot> {
        parse_slots(&self.unavailable_times)
    }
}

fn load_all(path: &Path) -> Result<BTreeMap<String, Preferences>> {
    let file_exists_and_non_empty =
        path.exists() && fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
    if !file_exists_and_non_empty {
        return Ok(BTreeMap::new());
    }

    match fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences in {}", path.display())),
        Err(e) => Err(anyhow!("Failed to read preferences: {}", e)),
    }
}

pub fn load(path: &Path, username: &str) -> Result<Preferences> {
    Ok(load_all(path)?.remove(username).unwrap_or_default())
}

pub fn save(path: &Path, username: &str, preferences: &Preferences) -> Result<()> {
    let mut all = load_all(path)?;
    all.insert(username.to_string(), preferences.clone());
    fs::write(path, to_string_pretty(&all)?)
        .with_context(|| format!("Failed to write preferences to {}", path.display()))?;
    info!("Saved preferences for {}", username);
    Ok(())
}

pub fn describe(preferences: &Preferences) -> String {
    let courses = if preferences.preferred_courses.is_empty() {
        "none".to_string()
    } else {
        preferences
            .preferred_courses
            .iter()
            .map(|id| format!("#{}", id))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let credits = preferences.max_credits.map_or("no limit".to_string(), |c| c.to_string());
    let unavailable = match preferences.unavailable_slots() {
        slots if slots.is_empty() => "none".to_string(),
        slots => build_meeting_time(&slots),
    };

    format!(
        "Preferred courses: {}\nMax credits: {}\nUnavailable: {}\n",
        courses, credits, unavailable
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn malformed_unavailable_times_are_dropped() {
        let prefs = Preferences::new(vec![], None, "F 8:00-21:00, Friday, M 9:00-10:00");
        assert_eq!(prefs.unavailable_times, "F 08:00-21:00, M 09:00-10:00");
        assert_eq!(prefs.unavailable_slots().len(), 2);
    }

    #[test]
    fn preferences_are_kept_per_student() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        assert_eq!(load(&path, "sam").unwrap(), Preferences::default());

        let sam = Preferences::new(vec![1, 3], Some(9), "F 08:00-21:00");
        let kim = Preferences::new(vec![2], None, "");
        save(&path, "sam", &sam).unwrap();
        save(&path, "kim", &kim).unwrap();

        assert_eq!(load(&path, "sam").unwrap(), sam);
        assert_eq!(load(&path, "kim").unwrap(), kim);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "[1,2").unwrap();
        assert!(load(&path, "sam").is_err());
    }

    #[test]
    fn description_lists_every_field() {
        let prefs = Preferences::new(vec![1, 3], Some(9), "F 08:00-21:00");
        assert_eq!(
            describe(&prefs),
            "Preferred courses: #1, #3\nMax credits: 9\nUnavailable: F 08:00-21:00\n"
        );
        assert_eq!(
            describe(&Preferences::default()),
            "Preferred courses: none\nMax credits: no limit\nUnavailable: none\n"
        );
    }
}
