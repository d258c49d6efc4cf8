pub mod listing;
pub mod logic;
pub mod property;

pub use listing::{CleanedListing, RawListing, WorkingListing};
pub use property::{PropertyKind, ALL_PROPERTY};
