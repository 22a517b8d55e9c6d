//! tripsync: trip planner lists (itinerary, checklist, wishlist) kept in a
//! local snapshot store and mirrored to a spreadsheet-backed endpoint.

pub mod config;
pub mod defaults;
pub mod lists;
pub mod model;
pub mod rpc;
pub mod storage;
pub mod sync;
