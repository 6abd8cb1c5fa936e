use crate::models::Event;
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::BTreeMap;

/// Marker state for a calendar day. Days without events are simply absent
/// from the map, so `marked` is always true when an entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMarker {
    pub marked: bool,
}

/// One entry per distinct event date. The key's `Display` form is the
/// canonical `YYYY-MM-DD` day string.
pub fn marked_days(events: &[Event]) -> BTreeMap<NaiveDate, DayMarker> {
    let mut days = BTreeMap::new();
    for event in events {
        days.insert(event.date, DayMarker { marked: true });
    }
    days
}

/// Events occurring on `day`, in the same relative order as the input.
pub fn events_on_day<'a>(events: &'a [Event], day: NaiveDate) -> Vec<&'a Event> {
    events.iter().filter(|event| event.date == day).collect()
}

/// Day-slots for the month containing `month`: leading `None` padding so day
/// 1 falls under its weekday column (Sunday-first), then one `Some` per
/// calendar day. At most 42 slots (6 weeks).
pub fn days_in_month(month: NaiveDate) -> Vec<Option<NaiveDate>> {
    let first = month - Duration::days(month.day0() as i64);
    let next_month = first + Months::new(1);

    let padding = first.weekday().num_days_from_sunday() as usize;
    let mut slots: Vec<Option<NaiveDate>> = vec![None; padding];

    let mut day = first;
    while day < next_month {
        slots.push(Some(day));
        day += Duration::days(1);
    }

    slots
}
