//! Turns a `CalendarLayout` into the calendar markup the student page shows,
//! plus plain-text views for the terminal.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use crate::models::{Course, User};
use crate::utils::calendar::{CalendarBlock, CalendarLayout, GRID_END_HOUR, GRID_START_HOUR};
use crate::utils::meeting_time::WEEKDAYS;

pub const EMPTY_SCHEDULE_MESSAGE: &str = "No courses yet.";

const STYLESHEET: &str = r#"
body { font-family: sans-serif; background: #1e1e2e; color: #f0f0f0; }
#calendar { display: grid; grid-template-columns: 60px repeat(5, 1fr); gap: 2px; }
.calendar-time-column { padding-top: 40px; }
.calendar-time { height: 50px; font-size: 12px; color: #aaa; }
.calendar-day { position: relative; min-height: 740px; background: #2a2a3c; }
.calendar-header { height: 40px; line-height: 40px; text-align: center; font-weight: bold; }
.calendar-event { box-sizing: border-box; padding: 2px 4px; font-size: 12px; background: #00b36b; border-radius: 4px; overflow: hidden; }
"#;

// At most three decimals, without trailing zeros: 339.88, 62.475, 40.
fn px(value: f64) -> String {
    let fixed = format!("{:.3}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" { "0".to_string() } else { trimmed.to_string() }
}

fn hour_labels() -> impl Iterator<Item = String> {
    (GRID_START_HOUR..=GRID_END_HOUR).map(|hour| format!("{:02}:00", hour))
}

fn event_style(block: &CalendarBlock) -> String {
    let lanes = block.lanes.max(1) as f64;
    format!(
        "position:absolute;top:{}px;height:{}px;left:{}%;width:{}%",
        px(block.top_px),
        px(block.height_px),
        px(block.lane as f64 * 100.0 / lanes),
        px(100.0 / lanes)
    )
}

/// The `#calendar` fragment: time column, one column per weekday, positioned events.
pub fn calendar_html(calendar: &CalendarLayout) -> Markup {
    html! {
        div.calendar-time-column {
            @for label in hour_labels() {
                div.calendar-time { (label) }
            }
        }
        @for (day, blocks) in calendar.columns() {
            div.calendar-day data-day=(day.code()) {
                div.calendar-header { (day.name()) }
                @for block in blocks {
                    div.calendar-event data-course-id=(block.course_id) style=(event_style(block)) {
                        (block.label)
                    }
                }
            }
        }
        @if calendar.is_empty() {
            p { (EMPTY_SCHEDULE_MESSAGE) }
        }
    }
}

pub fn calendar_page(calendar: &CalendarLayout) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "My Schedule" }
                style { (PreEscaped(STYLESHEET)) }
            }
            body {
                div #calendar {
                    (calendar_html(calendar))
                }
            }
        }
    }
}

pub fn calendar_text(calendar: &CalendarLayout) -> String {
    if calendar.is_empty() {
        return format!("{}\n", EMPTY_SCHEDULE_MESSAGE);
    }

    let mut text = String::new();
    for day in WEEKDAYS.iter() {
        let blocks = calendar.blocks(day);
        text.push_str(day.name());
        text.push('\n');
        if blocks.is_empty() {
            text.push_str("  -\n");
        }
        for block in blocks {
            text.push_str(&format!("  {} [#{}]\n", block.label, block.course_id));
        }
    }
    text
}

pub fn course_list_text(courses: &[&Course]) -> String {
    if courses.is_empty() {
        return "No matching courses.\n".to_string();
    }

    courses
        .iter()
        .map(|c| {
            format!(
                "#{} {} {} - {}\n    {} ({})\n    Time: {}\n",
                c.id,
                c.dept_code,
                c.course_number,
                c.instructor,
                c.description,
                c.location,
                c.meeting_time
            )
        })
        .collect()
}

pub fn user_list_text(users: &[User]) -> String {
    if users.is_empty() {
        return "No students registered.\n".to_string();
    }
    users.iter().map(|u| format!("{} (role: {})\n", u.username, u.role)).collect()
}
