//! Monthly settlement slips

mod data;
mod generator;

pub use data::{MonthlySlip, PaymentRecord};
pub use generator::SlipGenerator;
