//! JSON-lines command protocol for `tripsync serve`.
//!
//! One request object per line, one response object per line:
//!
//! ```text
//! {"cmd":"add","list":"checklist","entry":{"text":"Umbrella","category":"other"}}
//! {"ok":true,"entry":{"id":"c1768900000000","text":"Umbrella","checked":false,"category":"other"}}
//! ```

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use serde_json::{json, Value};

use crate::config::TripConfig;
use crate::lists;
use crate::model::{Checkable, ChecklistEntry, ItineraryEntry, ListEntry, ListKey, WishlistEntry};
use crate::sync::SyncCoordinator;

/// Run `$body` with `$t` bound to the entry type for `$key`.
macro_rules! with_entry_type {
    ($key:expr, $t:ident => $body:expr) => {
        match $key {
            ListKey::Itinerary => {
                type $t = ItineraryEntry;
                $body
            }
            ListKey::Checklist => {
                type $t = ChecklistEntry;
                $body
            }
            ListKey::Wishlist => {
                type $t = WishlistEntry;
                $body
            }
        }
    };
}

pub fn handle(sync: &mut SyncCoordinator, trip: &TripConfig, cmd: &Value) -> Value {
    let result = match cmd.get("cmd").and_then(|v| v.as_str()) {
        Some("status") => Ok(cmd_status(sync, trip)),
        Some("list") => list_key(cmd).and_then(|key| with_entry_type!(key, T => cmd_list::<T>(sync, cmd))),
        Some("add") => list_key(cmd).and_then(|key| with_entry_type!(key, T => cmd_add::<T>(sync, cmd))),
        Some("update") => list_key(cmd).and_then(|key| with_entry_type!(key, T => cmd_update::<T>(sync, cmd))),
        Some("remove") => list_key(cmd).and_then(|key| with_entry_type!(key, T => cmd_remove::<T>(sync, cmd))),
        Some("toggle") => list_key(cmd).and_then(|key| cmd_toggle(sync, key, cmd)),
        Some("progress") => list_key(cmd).and_then(|key| cmd_progress(sync, key)),
        Some("days") => Ok(cmd_days(sync, trip)),
        _ => Err(anyhow!("unknown command")),
    };
    result.unwrap_or_else(|e| json!({"error": format!("{e:#}")}))
}

fn list_key(cmd: &Value) -> Result<ListKey> {
    cmd["list"]
        .as_str()
        .context("missing 'list'")?
        .parse()
}

fn entry_id(cmd: &Value) -> Result<&str> {
    cmd["id"].as_str().context("missing 'id'")
}

fn parse_entry<T: ListEntry>(cmd: &Value) -> Result<T> {
    let raw = cmd.get("entry").context("missing 'entry'")?;
    serde_json::from_value(raw.clone()).with_context(|| format!("invalid {} entry", T::KEY))
}

fn cmd_status(sync: &SyncCoordinator, trip: &TripConfig) -> Value {
    let lists = sync.lists();
    json!({
        "state": sync.state(),
        "remote": sync.has_remote(),
        "seed_policy": sync.seed_policy(),
        "trip": trip.name,
        "days_until": trip.days_until(Local::now().date_naive()),
        "counts": {
            "itinerary": lists.len_of(ListKey::Itinerary),
            "checklist": lists.len_of(ListKey::Checklist),
            "wishlist": lists.len_of(ListKey::Wishlist),
        },
    })
}

fn cmd_list<T: ListEntry>(sync: &SyncCoordinator, cmd: &Value) -> Result<Value> {
    let Some(raw) = cmd.get("category").filter(|v| !v.is_null()) else {
        return Ok(json!({"items": sync.list::<T>()}));
    };
    let category: T::Category = serde_json::from_value(raw.clone())
        .with_context(|| format!("invalid {} category {}", T::KEY, raw))?;
    Ok(json!({"items": lists::by_category(sync.list::<T>(), category)}))
}

fn cmd_add<T: ListEntry>(sync: &mut SyncCoordinator, cmd: &Value) -> Result<Value> {
    let added = sync.add(parse_entry::<T>(cmd)?)?;
    Ok(json!({"ok": true, "entry": added}))
}

fn cmd_update<T: ListEntry>(sync: &mut SyncCoordinator, cmd: &Value) -> Result<Value> {
    sync.update(parse_entry::<T>(cmd)?)?;
    Ok(json!({"ok": true}))
}

fn cmd_remove<T: ListEntry>(sync: &mut SyncCoordinator, cmd: &Value) -> Result<Value> {
    let removed = sync.remove::<T>(entry_id(cmd)?);
    Ok(json!({"ok": true, "removed": removed}))
}

fn cmd_toggle(sync: &mut SyncCoordinator, key: ListKey, cmd: &Value) -> Result<Value> {
    let id = entry_id(cmd)?;
    let checked = match key {
        ListKey::Checklist => sync.toggle::<ChecklistEntry>(id)?,
        ListKey::Wishlist => sync.toggle::<WishlistEntry>(id)?,
        ListKey::Itinerary => return Err(anyhow!("itinerary entries have no checked flag")),
    };
    Ok(json!({"ok": true, "checked": checked}))
}

fn progress_json<T: Checkable>(list: &[T]) -> Value {
    let (checked, total) = lists::progress(list);
    json!({"checked": checked, "total": total})
}

fn cmd_progress(sync: &SyncCoordinator, key: ListKey) -> Result<Value> {
    match key {
        ListKey::Checklist => Ok(progress_json(sync.list::<ChecklistEntry>())),
        ListKey::Wishlist => Ok(progress_json(sync.list::<WishlistEntry>())),
        ListKey::Itinerary => Err(anyhow!("itinerary entries have no checked flag")),
    }
}

fn cmd_days(sync: &SyncCoordinator, trip: &TripConfig) -> Value {
    let days: Vec<Value> = lists::itinerary_days(sync.list::<ItineraryEntry>())
        .into_iter()
        .map(|(date, entries)| {
            json!({
                "date": date,
                "in_trip": trip.contains(date),
                "entries": entries,
            })
        })
        .collect();
    json!({"days": days})
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::storage::MemoryStore;
    use crate::sync::SeedPolicy;

    fn create_session() -> SyncCoordinator {
        let local = Arc::new(MemoryStore::new());
        local.put_raw(ListKey::Itinerary, "[]");
        local.put_raw(ListKey::Checklist, "[]");
        local.put_raw(ListKey::Wishlist, "[]");
        SyncCoordinator::open(local, None, SeedPolicy::default())
    }

    fn call(sync: &mut SyncCoordinator, cmd: Value) -> Value {
        handle(sync, &TripConfig::default(), &cmd)
    }

    #[test]
    fn test_unknown_and_malformed_commands() {
        let mut sync = create_session();

        assert_eq!(call(&mut sync, json!({"cmd": "explode"}))["error"], "unknown command");
        assert!(call(&mut sync, json!({"cmd": "list"}))["error"].is_string());
        assert!(call(&mut sync, json!({"cmd": "list", "list": "packing"}))["error"].is_string());
        assert!(call(&mut sync, json!({"cmd": "add", "list": "checklist"}))["error"].is_string());
    }

    #[test]
    fn test_add_list_toggle_remove() {
        let mut sync = create_session();

        let resp = call(
            &mut sync,
            json!({"cmd": "add", "list": "checklist", "entry": {"text": "Umbrella", "category": "other"}}),
        );
        assert_eq!(resp["ok"], true);
        let id = resp["entry"]["id"].as_str().unwrap().to_string();
        assert!(id.starts_with('c'));

        let resp = call(&mut sync, json!({"cmd": "toggle", "list": "checklist", "id": id}));
        assert_eq!(resp["checked"], true);

        let resp = call(&mut sync, json!({"cmd": "progress", "list": "checklist"}));
        assert_eq!(resp, json!({"checked": 1, "total": 1}));

        let resp = call(&mut sync, json!({"cmd": "list", "list": "checklist"}));
        assert_eq!(resp["items"][0]["text"], "Umbrella");

        let resp = call(&mut sync, json!({"cmd": "remove", "list": "checklist", "id": id}));
        assert_eq!(resp["removed"], true);
        let resp = call(&mut sync, json!({"cmd": "remove", "list": "checklist", "id": id}));
        assert_eq!(resp["removed"], false);
    }

    #[test]
    fn test_update_and_validation_errors() {
        let mut sync = create_session();
        let resp = call(
            &mut sync,
            json!({"cmd": "add", "list": "wishlist", "entry": {"name": "Egg Drop", "category": "food"}}),
        );
        let id = resp["entry"]["id"].as_str().unwrap().to_string();

        let resp = call(
            &mut sync,
            json!({"cmd": "update", "list": "wishlist", "entry": {"id": id, "name": "Egg Drop", "note": "breakfast", "category": "food"}}),
        );
        assert_eq!(resp["ok"], true);
        assert_eq!(sync.list::<WishlistEntry>()[0].note, "breakfast");

        let resp = call(
            &mut sync,
            json!({"cmd": "add", "list": "wishlist", "entry": {"name": "x", "category": "museum"}}),
        );
        assert!(resp["error"].as_str().unwrap().contains("invalid wishlist entry"));

        let resp = call(&mut sync, json!({"cmd": "toggle", "list": "itinerary", "id": "1"}));
        assert!(resp["error"].is_string());
    }

    #[test]
    fn test_days_grouping_and_trip_range() {
        let mut sync = create_session();
        for (date, time) in [("2026-01-23", "15:00"), ("2026-01-23", "9:30"), ("2026-02-01", "10:00")] {
            let resp = call(
                &mut sync,
                json!({"cmd": "add", "list": "itinerary", "entry": {
                    "date": date, "time": time, "activity": "Walk", "category": "activity"
                }}),
            );
            assert_eq!(resp["ok"], true, "{resp}");
        }

        let resp = call(&mut sync, json!({"cmd": "days"}));
        let days = resp["days"].as_array().unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[0]["date"], "2026-01-23");
        assert_eq!(days[0]["in_trip"], true);
        assert_eq!(days[0]["entries"][0]["time"], "09:30");
        assert_eq!(days[1]["in_trip"], false);
    }

    #[test]
    fn test_list_filters_by_category() {
        let mut sync = create_session();
        for (name, category) in [("Egg Drop", "food"), ("Lotte Mart", "shopping"), ("Bagels", "food")] {
            let resp = call(
                &mut sync,
                json!({"cmd": "add", "list": "wishlist", "entry": {"name": name, "category": category}}),
            );
            assert_eq!(resp["ok"], true, "{resp}");
        }

        let resp = call(&mut sync, json!({"cmd": "list", "list": "wishlist", "category": "food"}));
        let names: Vec<&str> = resp["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Egg Drop", "Bagels"]);

        let resp = call(&mut sync, json!({"cmd": "list", "list": "wishlist", "category": "stay"}));
        assert_eq!(resp["items"], json!([]));

        let resp = call(&mut sync, json!({"cmd": "list", "list": "wishlist"}));
        assert_eq!(resp["items"].as_array().unwrap().len(), 3);

        // Checklist categories differ from wishlist ones
        let resp = call(&mut sync, json!({"cmd": "list", "list": "checklist", "category": "food"}));
        assert!(resp["error"].as_str().unwrap().contains("invalid checklist category"));
    }

    #[test]
    fn test_status_reports_local_only() {
        let mut sync = create_session();
        let resp = call(&mut sync, json!({"cmd": "status"}));

        assert_eq!(resp["state"], "unsynced");
        assert_eq!(resp["remote"], false);
        assert_eq!(resp["seed_policy"], "replace-if-non-empty");
        assert_eq!(resp["counts"]["checklist"], 0);
    }
}
