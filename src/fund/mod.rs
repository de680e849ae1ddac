//! Fund records and installment calculation

mod data;
pub mod payments;

pub use data::{CreateFundRequest, Fund};
pub use payments::{compute_payments, round_currency, PaymentSchedule, LIFTED_PREMIUM_RATE};
