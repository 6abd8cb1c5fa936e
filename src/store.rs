use crate::days::{self, DayMarker};
use crate::models::{Event, EventBook, TimeOfDay};
use crate::storage::Storage;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("event title must not be empty")]
    EmptyTitle,

    #[error("start time {start} must be before end time {end}")]
    InvertedTimes { start: TimeOfDay, end: TimeOfDay },

    #[error("overlaps existing event \"{title}\" ({start}-{end})")]
    Overlap {
        title: String,
        start: TimeOfDay,
        end: TimeOfDay,
    },

    #[error("failed to persist events: {0}")]
    Persistence(#[source] anyhow::Error),
}

/// The authoritative event collection. All mutations validate first, then
/// write the whole collection through `Storage`, and only update the
/// in-memory state once the write has succeeded.
pub struct EventStore {
    storage: Storage,
    book: EventBook,
}

impl EventStore {
    /// Read the persisted collection. A missing file starts empty; an
    /// unreadable or malformed payload is logged at warn level and also
    /// starts empty.
    pub fn load(storage: Storage) -> Self {
        let book = match storage.load() {
            Ok(book) => book,
            Err(err) => {
                warn!("could not read stored events, starting empty: {err:#}");
                EventBook::default()
            }
        };
        Self { storage, book }
    }

    pub fn events(&self) -> &[Event] {
        &self.book.events
    }

    /// Insert or update an event. Validation runs before any I/O; on any
    /// failure the collection and the persisted blob are left untouched.
    pub fn save(&mut self, mut event: Event) -> Result<&[Event], StoreError> {
        let title = event.title.trim();
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if event.start_time >= event.end_time {
            return Err(StoreError::InvertedTimes {
                start: event.start_time,
                end: event.end_time,
            });
        }
        if let Some(existing) = self
            .book
            .events
            .iter()
            .find(|e| e.id != event.id && e.overlaps(&event))
        {
            return Err(StoreError::Overlap {
                title: existing.title.clone(),
                start: existing.start_time,
                end: existing.end_time,
            });
        }

        event.title = title.to_string();

        let mut events = self.book.events.clone();
        match events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                // Edits replace the event wholesale but keep the original
                // creation timestamp.
                event.created_at = slot.created_at;
                *slot = event;
            }
            None => events.push(event),
        }

        self.commit(EventBook { events })
    }

    /// Remove the event with `id`. Unknown ids are a no-op and skip the
    /// write entirely.
    pub fn delete(&mut self, id: &str) -> Result<&[Event], StoreError> {
        if !self.book.events.iter().any(|e| e.id == id) {
            return Ok(&self.book.events);
        }

        let events: Vec<Event> = self
            .book
            .events
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();

        self.commit(EventBook { events })
    }

    fn commit(&mut self, updated: EventBook) -> Result<&[Event], StoreError> {
        self.storage
            .save(&updated)
            .map_err(StoreError::Persistence)?;
        self.book = updated;
        Ok(&self.book.events)
    }

    pub fn marked_days(&self) -> BTreeMap<NaiveDate, DayMarker> {
        days::marked_days(&self.book.events)
    }

    pub fn events_on(&self, day: NaiveDate) -> Vec<&Event> {
        days::events_on_day(&self.book.events, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Repeat;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn time(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_store() -> (TempDir, EventStore) {
        let dir = tempdir().unwrap();
        let storage = Storage::from_path(dir.path().join("events.json"));
        (dir, EventStore::load(storage))
    }

    fn event(title: &str, day: NaiveDate, start: &str, end: &str) -> Event {
        Event::new(title, day, time(start), time(end), Repeat::None)
    }

    #[test]
    fn test_save_rejects_overlap_and_accepts_back_to_back() {
        let (_dir, mut store) = setup_store();
        let day = date(2024, 1, 10);

        store
            .save(event("Standup", day, "09:00", "10:00"))
            .unwrap();

        let err = store
            .save(event("Review", day, "09:30", "10:30"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Overlap { .. }));
        assert_eq!(store.events().len(), 1);

        store.save(event("Review", day, "10:00", "11:00")).unwrap();
        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn test_save_overlap_only_on_same_day() {
        let (_dir, mut store) = setup_store();

        store
            .save(event("A", date(2024, 1, 10), "09:00", "10:00"))
            .unwrap();
        store
            .save(event("B", date(2024, 1, 11), "09:00", "10:00"))
            .unwrap();

        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn test_save_rejects_empty_title() {
        let (_dir, mut store) = setup_store();

        let err = store
            .save(event("   ", date(2024, 1, 10), "09:00", "10:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyTitle));
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_save_trims_title() {
        let (_dir, mut store) = setup_store();

        store
            .save(event("  Dentist  ", date(2024, 1, 10), "09:00", "10:00"))
            .unwrap();
        assert_eq!(store.events()[0].title, "Dentist");
    }

    #[test]
    fn test_save_rejects_inverted_times() {
        let (_dir, mut store) = setup_store();

        let err = store
            .save(event("Backwards", date(2024, 1, 10), "10:00", "09:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvertedTimes { .. }));

        let err = store
            .save(event("Empty", date(2024, 1, 10), "09:00", "09:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvertedTimes { .. }));
    }

    #[test]
    fn test_edit_replaces_in_place_and_keeps_created_at() {
        let (_dir, mut store) = setup_store();
        let day = date(2024, 1, 10);

        let original = event("Standup", day, "09:00", "10:00");
        let id = original.id.clone();
        let created_at = original.created_at;
        store.save(original).unwrap();

        let mut edited = event("Standup (moved)", day, "11:00", "12:00");
        edited.id = id.clone();
        store.save(edited).unwrap();

        assert_eq!(store.events().len(), 1);
        let stored = &store.events()[0];
        assert_eq!(stored.id, id);
        assert_eq!(stored.title, "Standup (moved)");
        assert_eq!(stored.start_time, time("11:00"));
        assert_eq!(stored.created_at, created_at);
    }

    #[test]
    fn test_edit_may_keep_its_own_slot() {
        let (_dir, mut store) = setup_store();
        let day = date(2024, 1, 10);

        let original = event("Standup", day, "09:00", "10:00");
        let id = original.id.clone();
        store.save(original).unwrap();

        // Re-saving over its own interval must not self-conflict.
        let mut edited = event("Standup", day, "09:15", "09:45");
        edited.id = id;
        store.save(edited).unwrap();
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        let storage = Storage::from_path(path.clone());
        let mut store = EventStore::load(storage.clone());

        let ev = event("Standup", date(2024, 1, 10), "09:00", "10:00");
        let id = ev.id.clone();
        store.save(ev).unwrap();
        store.delete(&id).unwrap();

        assert!(store.events().is_empty());
        let reloaded = EventStore::load(storage);
        assert!(reloaded.events().is_empty());
    }

    #[test]
    fn test_delete_missing_id_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        let mut store = EventStore::load(Storage::from_path(path.clone()));

        store
            .save(event("Standup", date(2024, 1, 10), "09:00", "10:00"))
            .unwrap();
        let before = fs::read_to_string(&path).unwrap();

        store.delete("no-such-id").unwrap();

        assert_eq!(store.events().len(), 1);
        let after = fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_failed_persistence_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let storage = Storage::from_path(dir.path().join("events.json"));
        let mut store = EventStore::load(storage);

        store
            .save(event("Standup", date(2024, 1, 10), "09:00", "10:00"))
            .unwrap();

        // A directory squatting on the temp path makes the next write fail.
        fs::create_dir(dir.path().join("events.tmp")).unwrap();

        let err = store
            .save(event("Review", date(2024, 1, 11), "09:00", "10:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_load_malformed_payload_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "{ not json").unwrap();

        let store = EventStore::load(Storage::from_path(path));
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_reload_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        let storage = Storage::from_path(path);

        let mut store = EventStore::load(storage.clone());
        store
            .save(event("Standup", date(2024, 1, 10), "09:00", "10:00"))
            .unwrap();
        store
            .save(event("Review", date(2024, 1, 10), "10:00", "11:00"))
            .unwrap();

        let reloaded = EventStore::load(storage);
        assert_eq!(reloaded.events().len(), 2);
        assert_eq!(reloaded.events()[0].title, "Standup");
        assert_eq!(reloaded.events()[1].title, "Review");
    }

    #[test]
    fn test_projection_accessors() {
        let (_dir, mut store) = setup_store();
        let day = date(2024, 1, 10);

        store.save(event("Standup", day, "09:00", "10:00")).unwrap();
        store.save(event("Review", day, "10:00", "11:00")).unwrap();

        let marks = store.marked_days();
        assert_eq!(marks.len(), 1);
        assert!(marks.contains_key(&day));

        let on_day = store.events_on(day);
        assert_eq!(on_day.len(), 2);
        assert!(store.events_on(date(2024, 1, 11)).is_empty());
    }
}
