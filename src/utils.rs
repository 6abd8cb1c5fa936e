use crate::models::{Event, Repeat};
use chrono::NaiveDate;

pub const WEEK_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// "July 2026" style heading for the month containing `date`.
pub fn month_title(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// One-line event rendering for the agenda and the day pane.
pub fn event_summary(event: &Event) -> String {
    let mut line = format!(
        "{}-{}  {}",
        event.start_time, event.end_time, event.title
    );
    if event.repeat_option != Repeat::None {
        line.push_str(&format!(" ({})", event.repeat_option.label()));
    }
    line
}
