//! Member records, lift lifecycle and roster loading

mod data;
pub mod loader;
mod registry;

pub use data::{LiftState, Member};
pub use loader::{load_roster, load_roster_from_reader, RosterError};
pub use registry::MemberRegistry;
