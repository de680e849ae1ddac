//! Fund records and creation requests

use super::payments::{compute_payments, PaymentSchedule};
use crate::error::{ChittyError, Result};
use crate::ids::{FundId, MemberId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A chitty fund: the pool, its installments and its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    /// Unique fund identifier
    pub id: FundId,

    /// Display label
    pub name: String,

    /// Total pool value
    pub principal: f64,

    /// Number of monthly cycles, which is also the member capacity
    pub duration: u32,

    /// Installments derived from principal and duration at creation
    #[serde(flatten)]
    pub payments: PaymentSchedule,

    /// Date of the first cycle
    pub start_date: NaiveDate,

    /// Members in the order they joined
    pub member_ids: Vec<MemberId>,

    /// False once the fund has been closed
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Fund {
    /// Create a fund, deriving its installments from principal and duration
    pub fn new(
        name: &str,
        principal: f64,
        duration: u32,
        start_date: Option<NaiveDate>,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChittyError::invalid("fund name must not be blank"));
        }
        let payments = compute_payments(principal, duration)?;
        let now = Utc::now();

        Ok(Self {
            id: FundId::new(),
            name: name.to_string(),
            principal,
            duration,
            payments,
            start_date: start_date.unwrap_or_else(|| now.date_naive()),
            member_ids: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn regular_payment(&self) -> f64 {
        self.payments.regular_payment
    }

    pub fn lifted_payment(&self) -> f64 {
        self.payments.lifted_payment
    }

    /// Maximum number of members (one lift per member per cycle)
    pub fn capacity(&self) -> u32 {
        self.duration
    }

    pub fn member_count(&self) -> usize {
        self.member_ids.len()
    }

    pub fn is_full(&self) -> bool {
        self.member_ids.len() >= self.duration as usize
    }

    /// Installment owed by a member in a cycle, depending on lift state
    pub fn installment_for(&self, has_lifted: bool) -> f64 {
        if has_lifted {
            self.payments.lifted_payment
        } else {
            self.payments.regular_payment
        }
    }

    /// Validate that `month` is a cycle of this fund (1..=duration)
    pub fn check_month(&self, month: u32) -> Result<()> {
        if month == 0 || month > self.duration {
            return Err(ChittyError::invalid(format!(
                "month must be between 1 and {} for fund {} (got {})",
                self.duration, self.id, month
            )));
        }
        Ok(())
    }

    /// Reject mutations against a closed fund
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active {
            Ok(())
        } else {
            Err(ChittyError::invalid(format!("fund {} is closed", self.id)))
        }
    }

    /// Date of the given cycle, counting whole months from the start date
    pub fn cycle_date(&self, month: u32) -> Option<NaiveDate> {
        let offset = month.checked_sub(1)?;
        self.start_date.checked_add_months(chrono::Months::new(offset))
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Parameters for creating a fund, optionally with its opening roster
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFundRequest {
    pub name: String,
    pub principal: f64,
    pub duration: u32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub member_names: Vec<String>,
}
