use crate::store::EventStore;
use crate::utils::event_summary;
use chrono::{Local, NaiveDate};

pub struct Agenda<'a> {
    store: &'a EventStore,
}

impl<'a> Agenda<'a> {
    pub fn new(store: &'a EventStore) -> Self {
        Self { store }
    }

    /// Print every event on or after `from`, grouped by day.
    pub fn print(&self, from: NaiveDate) {
        let today = Local::now().date_naive();
        let days: Vec<NaiveDate> = self
            .store
            .marked_days()
            .keys()
            .copied()
            .filter(|day| *day >= from)
            .collect();

        if days.is_empty() {
            println!("No upcoming events.");
            return;
        }

        println!("Agenda from {}", from);
        println!("======================");

        for day in days {
            let heading = if day == today {
                format!("{} (Today)", day.format("%a %Y-%m-%d"))
            } else {
                day.format("%a %Y-%m-%d").to_string()
            };
            println!("\n{}", heading);

            for event in self.store.events_on(day) {
                println!("  {}  [{}]", event_summary(event), event.id);
            }
        }
    }
}
