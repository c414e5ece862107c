use std::collections::BTreeMap;
use log::{debug, info, warn};
use crate::models::{Course, ScheduleItem};
use crate::utils::meeting_time::{parse, Day, TimeInterval, WEEKDAYS};

// Observed layout of the weekly grid: 50px per hour below a 40px header row.
pub const GRID_START_HOUR: i32 = 8;
pub const GRID_END_HOUR: i32 = 21;
pub const HEADER_HEIGHT_PX: f64 = 40.0;
pub const PX_PER_MINUTE: f64 = 0.833;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub grid_start_hour: i32,
    pub header_height_px: f64,
    pub px_per_minute: f64,
    /// Give concurrent blocks side-by-side lanes instead of full-width stacking.
    pub split_overlaps: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            grid_start_hour: GRID_START_HOUR,
            header_height_px: HEADER_HEIGHT_PX,
            px_per_minute: PX_PER_MINUTE,
            split_overlaps: false,
        }
    }
}

/// A course identity with its meetings expanded to single days.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub course_id: u32,
    pub title: String,
    pub meetings: Vec<(Day, TimeInterval)>,
}

impl ScheduleEntry {
    pub fn from_course(course: &Course) -> Self {
        Self {
            course_id: course.id,
            title: format!("{} {}", course.dept_code, course.course_number),
            meetings: parse(&course.meeting_time),
        }
    }
}

pub fn entries_from_schedule(items: &[ScheduleItem]) -> Vec<ScheduleEntry> {
    items.iter().map(|(_, course)| ScheduleEntry::from_course(course)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarBlock {
    pub course_id: u32,
    pub label: String,
    pub interval: TimeInterval,
    pub top_px: f64,
    pub height_px: f64,
    pub lane: usize,
    pub lanes: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarLayout {
    columns: BTreeMap<Day, Vec<CalendarBlock>>,
}

impl CalendarLayout {
    fn with_weekdays() -> Self {
        Self { columns: WEEKDAYS.iter().map(|day| (day.clone(), Vec::new())).collect() }
    }

    pub fn blocks(&self, day: &Day) -> &[CalendarBlock] {
        self.columns.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn columns(&self) -> impl Iterator<Item = (&Day, &[CalendarBlock])> {
        self.columns.iter().map(|(day, blocks)| (day, blocks.as_slice()))
    }

    pub fn block_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// True when nothing was placed on the grid; renderers show the empty state.
    pub fn is_empty(&self) -> bool {
        self.block_count() == 0
    }
}

/// Places every meeting of every entry on the weekly grid.
pub fn layout(entries: &[ScheduleEntry], options: &LayoutOptions) -> CalendarLayout {
    let mut calendar = CalendarLayout::with_weekdays();
    if entries.is_empty() {
        info!("No scheduled courses");
        return calendar;
    }

    for entry in entries {
        for (day, interval) in &entry.meetings {
            let Some(column) = calendar.columns.get_mut(day) else {
                warn!("No column for {}, dropping {} {}", day, entry.title, interval);
                continue;
            };

            let start_minutes = interval.start_of_day() - i64::from(options.grid_start_hour) * 60;
            column.push(CalendarBlock {
                course_id: entry.course_id,
                label: format!("{} ({})", entry.title, interval),
                interval: *interval,
                top_px: start_minutes as f64 * options.px_per_minute + options.header_height_px,
                height_px: interval.duration_minutes() as f64 * options.px_per_minute,
                lane: 0,
                lanes: 1,
            });
            debug!("Added event for {} on {}", entry.title, day);
        }
    }

    if options.split_overlaps {
        for blocks in calendar.columns.values_mut() {
            assign_lanes(blocks);
        }
    }

    calendar
}

// Clusters transitively overlapping blocks and gives each the lowest free lane.
fn assign_lanes(blocks: &mut [CalendarBlock]) {
    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by_key(|&i| (blocks[i].interval.start_of_day(), blocks[i].interval.end_of_day()));

    let mut cluster: Vec<usize> = Vec::new();
    let mut lane_ends: Vec<i64> = Vec::new();
    let mut cluster_end = i64::MIN;

    for i in order {
        let start = blocks[i].interval.start_of_day();
        let end = blocks[i].interval.end_of_day();

        if !cluster.is_empty() && start >= cluster_end {
            close_cluster(blocks, &cluster, lane_ends.len());
            cluster.clear();
            lane_ends.clear();
        }

        let lane = match lane_ends.iter().position(|&lane_end| lane_end <= start) {
            Some(free) => {
                lane_ends[free] = end;
                free
            }
            None => {
                lane_ends.push(end);
                lane_ends.len() - 1
            }
        };
        blocks[i].lane = lane;
        cluster_end = if cluster.is_empty() { end } else { cluster_end.max(end) };
        cluster.push(i);
    }

    if !cluster.is_empty() {
        close_cluster(blocks, &cluster, lane_ends.len());
    }
}

fn close_cluster(blocks: &mut [CalendarBlock], cluster: &[usize], lanes: usize) {
    for &i in cluster {
        blocks[i].lanes = lanes;
    }
}
