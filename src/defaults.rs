//! Built-in sample trip used when the local store has nothing saved yet.

use chrono::NaiveDate;

use crate::model::{
    ChecklistCategory, ChecklistEntry, ItineraryCategory, ItineraryEntry, WishlistCategory,
    WishlistEntry,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, d).unwrap_or_default()
}

fn stop(
    id: &str,
    d: u32,
    time: &str,
    activity: &str,
    location: &str,
    notes: &str,
    category: ItineraryCategory,
) -> ItineraryEntry {
    ItineraryEntry {
        id: id.to_string(),
        date: day(d),
        time: time.to_string(),
        activity: activity.to_string(),
        location: Some(location.to_string()),
        notes: (!notes.is_empty()).then(|| notes.to_string()),
        category,
    }
}

fn item(id: &str, text: &str, checked: bool, category: ChecklistCategory) -> ChecklistEntry {
    ChecklistEntry {
        id: id.to_string(),
        text: text.to_string(),
        checked,
        category,
    }
}

fn wish(id: &str, name: &str, note: &str, category: WishlistCategory) -> WishlistEntry {
    WishlistEntry {
        id: id.to_string(),
        name: name.to_string(),
        note: note.to_string(),
        url: None,
        category,
        checked: false,
    }
}

pub fn default_itinerary() -> Vec<ItineraryEntry> {
    use ItineraryCategory::*;
    vec![
        stop("1", 22, "16:50", "Flight IT606 departs (T1)", "Taoyuan Airport", "23E, 23F", Transport),
        stop("2", 22, "20:05", "Arrive Gimhae International", "Gimhae Airport", "Airport pickup", Transport),
        stop("3", 22, "21:30", "Dinner", "Haeundae", "Fried chicken / pork soup rice", Food),
        stop("4", 23, "09:30", "Momos Coffee", "Yeongdo", "Yeongdo bridge", Food),
        stop("5", 23, "13:00", "Gamcheon Culture Village", "Toseong", "", Activity),
        stop("6", 23, "15:00", "Songdo Marine Cable Car", "Songdo", "Crystal cabin", Activity),
        stop("7", 24, "10:30", "Skyline Luge", "Gijang", "", Activity),
        stop("8", 24, "13:00", "Lunch + Outlet + Market", "Lotte Outlet", "", Shopping),
        stop("9", 27, "09:30", "Sky Capsule", "Cheongsapo Station", "", Activity),
        stop("10", 28, "16:00", "Head to the airport", "Gimhae Airport", "Tax refund", Transport),
        stop("11", 28, "20:50", "Flight IT607 departs", "Gimhae Airport", "21A, 21B", Transport),
    ]
}

pub fn default_checklist() -> Vec<ChecklistEntry> {
    use ChecklistCategory::*;
    vec![
        item("c1", "Passport", false, Essential),
        item("c2", "WOWPASS", false, Essential),
        item("c3", "Travel credit card", false, Essential),
        item("c4", "Busan Pass (booked)", true, Booking),
        item("c5", "Sky Capsule (booked)", true, Booking),
        item("c6", "Ski tour (booked)", true, Booking),
        item("c7", "Warm jacket", false, Clothes),
        item("c8", "Itinerary PDF", false, Essential),
    ]
}

pub fn default_wishlist() -> Vec<WishlistEntry> {
    use WishlistCategory::*;
    vec![
        wish("w1", "Lotte Mart", "10:30-22:00", Shopping),
        wish("w2", "The Bay 101", "Night view", Fun),
        wish("w3", "Shell warehouse buffet", "Gijang, recommended", Food),
        wish("w4", "All Sunday Bagel", "08:00-21:50", Food),
        wish("w5", "Egg Drop", "Breakfast", Food),
        wish("w6", "Shake Shack", "Seomyeon / Centum City", Food),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lists::normalize_time;
    use std::collections::HashSet;

    #[test]
    fn test_default_ids_are_unique() {
        let ids: HashSet<_> = default_itinerary().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), default_itinerary().len());

        let ids: HashSet<_> = default_checklist().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), default_checklist().len());

        let ids: HashSet<_> = default_wishlist().into_iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), default_wishlist().len());
    }

    #[test]
    fn test_default_times_are_canonical() {
        for entry in default_itinerary() {
            assert_eq!(normalize_time(&entry.time).unwrap(), entry.time);
            assert_eq!(entry.date.format("%Y-%m").to_string(), "2026-01");
        }
    }
}
