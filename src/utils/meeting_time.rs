use std::fmt;
use std::str::FromStr;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// Earliest start and latest end the backend accepts for a class.
pub const FIRST_CLASS_HOUR: i32 = 8;
pub const LAST_CLASS_HOUR: i32 = 21;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(M|T|W|Th|F|MW|MWF|TTh) (\d{2}):([0-5]\d)-(\d{2}):([0-5]\d)$").unwrap()
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeetingTimeError {
    #[error("malformed token '{0}', expected '<days> <HH:MM>-<HH:MM>' (e.g. 'M 08:00-09:15')")]
    Malformed(String),

    #[error("'{0}' must fall between 08:00 and 21:00")]
    OutOfHours(String),

    #[error("'{0}' must end after it starts")]
    EndBeforeStart(String),

    #[error("at least one day and time is required")]
    Empty,
}

/// A weekday column of the calendar, or a code that no column answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Other(String),
}

pub const WEEKDAYS: [Day; 5] =
    [Day::Monday, Day::Tuesday, Day::Wednesday, Day::Thursday, Day::Friday];

impl Day {
    pub fn from_code(code: &str) -> Day {
        match code {
            "M" => Day::Monday,
            "T" => Day::Tuesday,
            "W" => Day::Wednesday,
            "Th" => Day::Thursday,
            "F" => Day::Friday,
            other => Day::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Day::Monday => "M",
            Day::Tuesday => "T",
            Day::Wednesday => "W",
            Day::Thursday => "Th",
            Day::Friday => "F",
            Day::Other(code) => code,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Other(code) => code,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolves a compound day code. Unknown codes pass through as a single day.
pub fn expand_day_code(code: &str) -> Vec<Day> {
    match code {
        "MW" => vec![Day::Monday, Day::Wednesday],
        "MWF" => vec![Day::Monday, Day::Wednesday, Day::Friday],
        "TTh" => vec![Day::Tuesday, Day::Thursday],
        single => vec![Day::from_code(single)],
    }
}

/// Wall-clock range of one meeting. Values are not range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start_hour: i32,
    pub start_minute: i32,
    pub end_hour: i32,
    pub end_minute: i32,
}

impl TimeInterval {
    pub fn new(start_hour: i32, start_minute: i32, end_hour: i32, end_minute: i32) -> Self {
        Self { start_hour, start_minute, end_hour, end_minute }
    }

    // Widened so unchecked hours from the wire cannot overflow.
    pub fn start_of_day(&self) -> i64 {
        i64::from(self.start_hour) * 60 + i64::from(self.start_minute)
    }

    pub fn end_of_day(&self) -> i64 {
        i64::from(self.end_hour) * 60 + i64::from(self.end_minute)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.end_of_day() - self.start_of_day()
    }

    pub fn format_start(&self) -> String {
        format!("{:02}:{:02}", self.start_hour, self.start_minute)
    }

    pub fn format_end(&self) -> String {
        format!("{:02}:{:02}", self.end_hour, self.end_minute)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.format_start(), self.format_end())
    }
}

/// One `<days> <start>-<end>` token, before its day code is expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingSlot {
    pub day_code: String,
    pub interval: TimeInterval,
}

impl MeetingSlot {
    pub fn days(&self) -> Vec<Day> {
        expand_day_code(&self.day_code)
    }
}

impl fmt::Display for MeetingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day_code, self.interval)
    }
}

impl FromStr for MeetingSlot {
    type Err = MeetingTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_slot(s)
    }
}

fn parse_clock(clock: &str) -> Option<(i32, i32)> {
    let (hour, minute) = clock.split_once(':')?;
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

pub fn parse_slot(token: &str) -> Result<MeetingSlot, MeetingTimeError> {
    let token = token.trim();
    let malformed = || MeetingTimeError::Malformed(token.to_string());

    let parts: Vec<&str> = token.split(' ').collect();
    if parts.len() != 2 {
        return Err(malformed());
    }
    let (day_code, range) = (parts[0], parts[1]);

    let (start, end) = range.split_once('-').ok_or_else(malformed)?;
    let (start_hour, start_minute) = parse_clock(start).ok_or_else(malformed)?;
    let (end_hour, end_minute) = parse_clock(end).ok_or_else(malformed)?;

    Ok(MeetingSlot {
        day_code: day_code.to_string(),
        interval: TimeInterval::new(start_hour, start_minute, end_hour, end_minute),
    })
}

/// Splits a meeting-time string into slots, skipping malformed tokens with a warning.
pub fn parse_slots(raw: &str) -> Vec<MeetingSlot> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    raw.split(", ")
        .filter_map(|token| match parse_slot(token) {
            Ok(slot) => Some(slot),
            Err(e) => {
                warn!("Bad slot format, skipping: {}", e);
                None
            }
        })
        .collect()
}

/// Parses a meeting-time string into one `(day, interval)` pair per resolved day.
pub fn parse(raw: &str) -> Vec<(Day, TimeInterval)> {
    parse_slots(raw)
        .into_iter()
        .flat_map(|slot| {
            let interval = slot.interval;
            slot.days().into_iter().map(move |day| (day, interval))
        })
        .collect()
}

// Serializes form slots the way the course form submits them.
pub fn build_meeting_time(slots: &[MeetingSlot]) -> String {
    slots.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Checks a meeting-time string against the rules the backend enforces on
/// course submission.
pub fn validate_meeting_time(raw: &str) -> Result<(), MeetingTimeError> {
    if raw.trim().is_empty() {
        return Err(MeetingTimeError::Empty);
    }

    for token in raw.split(", ") {
        let caps = TOKEN_PATTERN
            .captures(token)
            .ok_or_else(|| MeetingTimeError::Malformed(token.to_string()))?;
        let number = |i: usize| caps[i].parse::<i32>().unwrap_or_default();
        let interval = TimeInterval::new(number(2), number(3), number(4), number(5));

        if interval.start_hour < FIRST_CLASS_HOUR
            || interval.end_hour > LAST_CLASS_HOUR
            || (interval.end_hour == LAST_CLASS_HOUR && interval.end_minute > 0)
        {
            return Err(MeetingTimeError::OutOfHours(token.to_string()));
        }
        if interval.start_of_day() >= interval.end_of_day() {
            return Err(MeetingTimeError::EndBeforeStart(token.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn malformed_token_is_skipped_with_a_warning() {
        testing_logger::setup();
        let pairs = parse("BadToken, F 10:00-11:00");
        assert_eq!(pairs, vec![(Day::Friday, TimeInterval::new(10, 0, 11, 0))]);
        testing_logger::validate(|logs| {
            let warnings: Vec<_> = logs.iter().filter(|l| l.level == log::Level::Warn).collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("BadToken"), "{}", warnings[0].body);
        });
    }

    #[test]
    fn well_formed_tokens_round_trip() {
        for token in ["M 08:00-09:15", "MWF 09:00-09:50", "TTh 14:00-15:15", "Th 20:30-21:00"] {
            let slot = parse_slot(token).unwrap();
            assert_eq!(slot.to_string(), token);
        }
    }

    #[test]
    fn mwf_expands_to_three_days_with_same_interval() {
        let pairs = parse("MWF 09:00-09:50");
        let interval = TimeInterval::new(9, 0, 9, 50);
        assert_eq!(
            pairs,
            vec![
                (Day::Monday, interval),
                (Day::Wednesday, interval),
                (Day::Friday, interval),
            ]
        );
    }

    #[test]
    fn multiple_tokens_keep_encounter_order() {
        let pairs = parse("MWF 09:00-09:50, TTh 14:00-15:15");
        let days: Vec<&str> = pairs.iter().map(|(d, _)| d.code()).collect();
        assert_eq!(days, vec!["M", "W", "F", "T", "Th"]);
        assert_eq!(pairs[3].1, TimeInterval::new(14, 0, 15, 15));
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        assert!(parse("BadToken").is_empty());
        let pairs = parse("BadToken, M 10:00-11:00, W 10:00, F 9-10, T 1x:00-12:00");
        assert_eq!(pairs, vec![(Day::Monday, TimeInterval::new(10, 0, 11, 0))]);
    }

    #[test]
    fn unknown_code_passes_through() {
        let pairs = parse("X 09:00-10:00");
        assert_eq!(pairs, vec![(Day::Other("X".to_string()), TimeInterval::new(9, 0, 10, 0))]);
        assert!(!WEEKDAYS.contains(&pairs[0].0));
    }

    #[test]
    fn out_of_range_values_are_not_rejected_by_the_parser() {
        let pairs = parse("M 25:00-26:30");
        assert_eq!(pairs[0].1.duration_minutes(), 90);
    }

    #[test]
    fn unpadded_form_input_is_padded_when_built() {
        let slots: Vec<MeetingSlot> = ["M 9:00-9:50", "Th 14:5-15:15"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert_eq!(build_meeting_time(&slots), "M 09:00-09:50, Th 14:05-15:15");
    }

    #[test]
    fn validation_mirrors_backend_rules() {
        assert_eq!(validate_meeting_time("MWF 09:00-09:50, TTh 14:00-15:15"), Ok(()));
        assert_eq!(validate_meeting_time("F 20:00-21:00"), Ok(()));
        assert_eq!(validate_meeting_time(""), Err(MeetingTimeError::Empty));
        assert_eq!(
            validate_meeting_time("M 07:30-09:00"),
            Err(MeetingTimeError::OutOfHours("M 07:30-09:00".to_string()))
        );
        assert_eq!(
            validate_meeting_time("F 20:00-21:10"),
            Err(MeetingTimeError::OutOfHours("F 20:00-21:10".to_string()))
        );
        assert_eq!(
            validate_meeting_time("W 10:00-10:00"),
            Err(MeetingTimeError::EndBeforeStart("W 10:00-10:00".to_string()))
        );
        assert_eq!(
            validate_meeting_time("Sa 10:00-11:00"),
            Err(MeetingTimeError::Malformed("Sa 10:00-11:00".to_string()))
        );
    }
}
