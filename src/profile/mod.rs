//! Turning a spreadsheet row into the desired state of a profile
//!
//! [`RowInput`] captures what the row asks for, [`RowChanges`] is the same
//! request with names resolved to identifiers, and [`merge`] applies the
//! changes on top of the fetched profile.

pub mod fields;
pub mod input;
pub mod merge;

pub use fields::{FieldInput, ProfileField, SENTINEL};
pub use input::{RowChanges, RowInput};
pub use merge::{MergedProfile, merge};
