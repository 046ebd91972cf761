//! Value objects - immutable types that represent domain concepts

mod identity;
mod target_id;

pub use identity::Identity;
pub use target_id::TargetId;
