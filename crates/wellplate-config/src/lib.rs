//! Session files: which plate to build, from which samples, and how.

mod error;
mod session;

pub use error::Error;
pub use session::{load_session, GroupSpec, ManualPlacement, SessionConfig};
