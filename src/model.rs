//! Trip list entities and the documents they travel in.
//!
//! Three independent lists make up a trip:
//!
//! ```text
//! itinerary  → Vec<ItineraryEntry>   (dated, timed plan)
//! checklist  → Vec<ChecklistEntry>   (packing / booking checklist)
//! wishlist   → Vec<WishlistEntry>    (places to try)
//! ```
//!
//! The same JSON shape is used for the local snapshots and for the remote
//! spreadsheet endpoint, so field names here are part of the wire format.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifies one of the three lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKey {
    Itinerary,
    Checklist,
    Wishlist,
}

impl ListKey {
    pub const ALL: [ListKey; 3] = [ListKey::Itinerary, ListKey::Checklist, ListKey::Wishlist];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKey::Itinerary => "itinerary",
            ListKey::Checklist => "checklist",
            ListKey::Wishlist => "wishlist",
        }
    }
}

impl fmt::Display for ListKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "itinerary" => Ok(ListKey::Itinerary),
            "checklist" => Ok(ListKey::Checklist),
            "wishlist" => Ok(ListKey::Wishlist),
            other => Err(anyhow!("unknown list '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItineraryCategory {
    Food,
    Activity,
    Transport,
    Shopping,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistCategory {
    Essential,
    Booking,
    Clothes,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishlistCategory {
    Food,
    Shopping,
    Stay,
    Transport,
    Fun,
}

/// One planned activity on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryEntry {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    /// 24h `HH:MM`, zero-padded so string order is time order
    pub time: String,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub category: ItineraryCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    #[serde(default)]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
    /// Older entries were saved without one
    #[serde(default)]
    pub category: ChecklistCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub category: WishlistCategory,
    #[serde(default)]
    pub checked: bool,
}

/// The in-memory copy of all three lists for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripLists {
    pub itinerary: Vec<ItineraryEntry>,
    pub checklist: Vec<ChecklistEntry>,
    pub wishlist: Vec<WishlistEntry>,
}

impl TripLists {
    pub fn len_of(&self, key: ListKey) -> usize {
        match key {
            ListKey::Itinerary => self.itinerary.len(),
            ListKey::Checklist => self.checklist.len(),
            ListKey::Wishlist => self.wishlist.len(),
        }
    }
}

/// Document exchanged with the remote endpoint.
///
/// Any field may be missing: `GET` can return a partially filled sheet and
/// `POST` bodies carry only the lists being written (the server merges by key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Vec<ItineraryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<ChecklistEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<Vec<WishlistEntry>>,
}

impl RemoteDocument {
    /// A document carrying a single list, for per-mutation writes.
    pub fn single<T: ListEntry>(list: Vec<T>) -> Self {
        let mut doc = Self::default();
        *T::remote_slot_mut(&mut doc) = Some(list);
        doc
    }

    /// Whether the remote copy of `T`'s list is missing or has no entries.
    pub fn is_empty_for<T: ListEntry>(&self) -> bool {
        T::remote_slot(self).map_or(true, |list| list.is_empty())
    }
}

impl From<&TripLists> for RemoteDocument {
    fn from(lists: &TripLists) -> Self {
        Self {
            itinerary: Some(lists.itinerary.clone()),
            checklist: Some(lists.checklist.clone()),
            wishlist: Some(lists.wishlist.clone()),
        }
    }
}

/// Binds an entry type to its list key and to its slots in [`TripLists`]
/// and [`RemoteDocument`].
pub trait ListEntry:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KEY: ListKey;
    /// Prefix for generated identifiers.
    const ID_TAG: &'static str;

    type Category: Copy + PartialEq + fmt::Debug + DeserializeOwned;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn category(&self) -> Self::Category;

    /// Validate and canonicalize user input before it enters a list.
    fn normalize(&mut self) -> Result<()>;

    fn slot(lists: &TripLists) -> &Vec<Self>;
    fn slot_mut(lists: &mut TripLists) -> &mut Vec<Self>;
    fn remote_slot(doc: &RemoteDocument) -> Option<&Vec<Self>>;
    fn remote_slot_mut(doc: &mut RemoteDocument) -> &mut Option<Vec<Self>>;
}

/// Entries with a done/not-done flag.
pub trait Checkable {
    fn is_checked(&self) -> bool;
    fn set_checked(&mut self, checked: bool);
}

fn require_text(field: &str, value: &mut String) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{field} must not be empty");
    }
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
    Ok(())
}

impl ListEntry for ItineraryEntry {
    const KEY: ListKey = ListKey::Itinerary;
    const ID_TAG: &'static str = "i";

    type Category = ItineraryCategory;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn category(&self) -> ItineraryCategory {
        self.category
    }

    fn normalize(&mut self) -> Result<()> {
        require_text("activity", &mut self.activity)?;
        self.time = crate::lists::normalize_time(&self.time)?;
        // Blank optional fields are stored as absent
        for field in [&mut self.location, &mut self.notes] {
            if field.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *field = None;
            }
        }
        Ok(())
    }

    fn slot(lists: &TripLists) -> &Vec<Self> {
        &lists.itinerary
    }

    fn slot_mut(lists: &mut TripLists) -> &mut Vec<Self> {
        &mut lists.itinerary
    }

    fn remote_slot(doc: &RemoteDocument) -> Option<&Vec<Self>> {
        doc.itinerary.as_ref()
    }

    fn remote_slot_mut(doc: &mut RemoteDocument) -> &mut Option<Vec<Self>> {
        &mut doc.itinerary
    }
}

impl ListEntry for ChecklistEntry {
    const KEY: ListKey = ListKey::Checklist;
    const ID_TAG: &'static str = "c";

    type Category = ChecklistCategory;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn category(&self) -> ChecklistCategory {
        self.category
    }

    fn normalize(&mut self) -> Result<()> {
        require_text("text", &mut self.text)
    }

    fn slot(lists: &TripLists) -> &Vec<Self> {
        &lists.checklist
    }

    fn slot_mut(lists: &mut TripLists) -> &mut Vec<Self> {
        &mut lists.checklist
    }

    fn remote_slot(doc: &RemoteDocument) -> Option<&Vec<Self>> {
        doc.checklist.as_ref()
    }

    fn remote_slot_mut(doc: &mut RemoteDocument) -> &mut Option<Vec<Self>> {
        &mut doc.checklist
    }
}

impl ListEntry for WishlistEntry {
    const KEY: ListKey = ListKey::Wishlist;
    const ID_TAG: &'static str = "w";

    type Category = WishlistCategory;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn category(&self) -> WishlistCategory {
        self.category
    }

    fn normalize(&mut self) -> Result<()> {
        require_text("name", &mut self.name)?;
        if self.url.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.url = None;
        }
        Ok(())
    }

    fn slot(lists: &TripLists) -> &Vec<Self> {
        &lists.wishlist
    }

    fn slot_mut(lists: &mut TripLists) -> &mut Vec<Self> {
        &mut lists.wishlist
    }

    fn remote_slot(doc: &RemoteDocument) -> Option<&Vec<Self>> {
        doc.wishlist.as_ref()
    }

    fn remote_slot_mut(doc: &mut RemoteDocument) -> &mut Option<Vec<Self>> {
        &mut doc.wishlist
    }
}

impl Checkable for ChecklistEntry {
    fn is_checked(&self) -> bool {
        self.checked
    }

    fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}

impl Checkable for WishlistEntry {
    fn is_checked(&self) -> bool {
        self.checked
    }

    fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }
}
