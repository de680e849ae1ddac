//! Chitty Manager - domain engine for rotating chit funds
//!
//! This library provides:
//! - Installment calculation (regular and 25% lifted premium)
//! - Member lifecycle with one lift per member and per cycle
//! - Idempotent monthly settlement slips
//! - A thread-safe aggregate owning funds, members and slips
//! - A request layer producing success/data/message envelopes

pub mod api;
pub mod config;
pub mod error;
pub mod fund;
pub mod ids;
pub mod manager;
pub mod members;
pub mod slips;

// Re-export commonly used types
pub use error::{ChittyError, ErrorKind, Result};
pub use fund::{compute_payments, CreateFundRequest, Fund, PaymentSchedule};
pub use ids::{FundId, MemberId, SlipId};
pub use manager::ChittyManager;
pub use members::{LiftState, Member, MemberRegistry};
pub use slips::{MonthlySlip, PaymentRecord, SlipGenerator};
