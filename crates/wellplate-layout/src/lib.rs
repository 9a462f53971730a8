//! Eligibility rules and the placement engine for 96-well plates.

mod eligibility;
mod error;
mod group;
pub mod placement;
mod session;

pub use eligibility::Eligibility;
pub use error::LayoutError;
pub use group::{flatten_groups, group_by_case, CaseGroup};
pub use placement::{AutoFillReport, GroupPlacement};
pub use session::{IntentOutcome, PlacementIntent, PlateSession};
