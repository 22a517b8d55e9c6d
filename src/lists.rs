//! Edits over a single list.
//!
//! Every edit takes the current list and returns the full replacement list;
//! callers hand that to the coordinator, which persists and mirrors it
//! wholesale.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime, Utc};

use crate::model::{Checkable, ItineraryEntry, ListEntry};

/// Generate a fresh identifier: type tag + Unix milliseconds.
pub fn next_id<T: ListEntry>(existing: &[T]) -> String {
    next_id_at(T::ID_TAG, Utc::now().timestamp_millis(), existing)
}

fn next_id_at<T: ListEntry>(tag: &str, millis: i64, existing: &[T]) -> String {
    // Two adds within the same millisecond bump the numeric part
    let mut n = millis;
    loop {
        let id = format!("{tag}{n}");
        if !existing.iter().any(|e| e.id() == id) {
            return id;
        }
        n += 1;
    }
}

/// Append `entry`, assigning an id when it has none.
pub fn add<T: ListEntry>(list: &[T], mut entry: T) -> Result<Vec<T>> {
    entry.normalize()?;
    if entry.id().is_empty() {
        entry.set_id(next_id(list));
    } else if list.iter().any(|e| e.id() == entry.id()) {
        bail!("{} already has an entry with id '{}'", T::KEY, entry.id());
    }
    let mut next = list.to_vec();
    next.push(entry);
    Ok(next)
}

/// Replace the entry with the same id.
pub fn update<T: ListEntry>(list: &[T], mut entry: T) -> Result<Vec<T>> {
    entry.normalize()?;
    let pos = list
        .iter()
        .position(|e| e.id() == entry.id())
        .with_context(|| format!("no {} entry with id '{}'", T::KEY, entry.id()))?;
    let mut next = list.to_vec();
    next[pos] = entry;
    Ok(next)
}

/// Remove by id. `None` when nothing matched.
pub fn remove<T: ListEntry>(list: &[T], id: &str) -> Option<Vec<T>> {
    if !list.iter().any(|e| e.id() == id) {
        return None;
    }
    Some(list.iter().filter(|e| e.id() != id).cloned().collect())
}

/// Flip the `checked` flag of one entry.
pub fn toggle<T: ListEntry + Checkable>(list: &[T], id: &str) -> Result<Vec<T>> {
    let mut next = list.to_vec();
    let entry = next
        .iter_mut()
        .find(|e| e.id() == id)
        .with_context(|| format!("no {} entry with id '{}'", T::KEY, id))?;
    entry.set_checked(!entry.is_checked());
    Ok(next)
}

/// Canonical `HH:MM` form of a 24h clock time (`9:05` → `09:05`).
pub fn normalize_time(raw: &str) -> Result<String> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .with_context(|| format!("invalid time '{raw}', expected HH:MM"))?;
    Ok(time.format("%H:%M").to_string())
}

/// Itinerary grouped by day, days ascending, each day ordered by time.
pub fn itinerary_days(list: &[ItineraryEntry]) -> Vec<(NaiveDate, Vec<&ItineraryEntry>)> {
    let mut days: BTreeMap<NaiveDate, Vec<&ItineraryEntry>> = BTreeMap::new();
    for entry in list {
        days.entry(entry.date).or_default().push(entry);
    }
    days.into_iter()
        .map(|(date, mut entries)| {
            // Stable, so same-time entries keep insertion order
            entries.sort_by(|a, b| a.time.cmp(&b.time));
            (date, entries)
        })
        .collect()
}

pub fn by_category<T: ListEntry>(list: &[T], category: T::Category) -> Vec<&T> {
    list.iter().filter(|e| e.category() == category).collect()
}

/// `(checked, total)`
pub fn progress<T: Checkable>(list: &[T]) -> (usize, usize) {
    (list.iter().filter(|e| e.is_checked()).count(), list.len())
}
