use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A wall-clock time of day, stored as minutes since midnight.
///
/// Parsed from and rendered as `HH:MM`; ordering compares the minute counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    minutes: u16,
}

#[derive(Debug, Error)]
#[error("invalid time '{0}', expected HH:MM")]
pub struct ParseTimeError(String);

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            minutes: hour as u16 * 60 + minute as u16,
        })
    }

    pub fn hour(self) -> u8 {
        (self.minutes / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.minutes % 60) as u8
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| ParseTimeError(s.to_string()))?;
        let hour: u8 = hour
            .trim()
            .parse()
            .map_err(|_| ParseTimeError(s.to_string()))?;
        let minute: u8 = minute
            .trim()
            .parse()
            .map_err(|_| ParseTimeError(s.to_string()))?;
        TimeOfDay::new(hour, minute).ok_or_else(|| ParseTimeError(s.to_string()))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Repeat cadence attached to an event. Stored and displayed, never expanded
/// into additional occurrences.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Repeat {
    #[default]
    None,
    Weekly,
    BiWeekly,
    Monthly,
}

impl Repeat {
    pub fn label(self) -> &'static str {
        match self {
            Repeat::None => "None",
            Repeat::Weekly => "Weekly",
            Repeat::BiWeekly => "Bi-weekly",
            Repeat::Monthly => "Monthly",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Repeat::None => Repeat::Weekly,
            Repeat::Weekly => Repeat::BiWeekly,
            Repeat::BiWeekly => Repeat::Monthly,
            Repeat::Monthly => Repeat::None,
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Repeat::None => "none",
            Repeat::Weekly => "weekly",
            Repeat::BiWeekly => "bi-weekly",
            Repeat::Monthly => "monthly",
        };
        write!(f, "{}", name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub repeat_option: Repeat,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        repeat_option: Repeat,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            date,
            start_time,
            end_time,
            repeat_option,
            created_at: Utc::now(),
        }
    }

    /// Half-open interval intersection on the same calendar date.
    /// Back-to-back events (one ends exactly when the other starts) do not
    /// overlap.
    pub fn overlaps(&self, other: &Event) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && self.end_time > other.start_time
    }
}

/// The persisted event collection, serialized as a bare JSON array.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(transparent)]
pub struct EventBook {
    pub events: Vec<Event>,
}
