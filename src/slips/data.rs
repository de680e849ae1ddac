//! Monthly settlement slip records

use crate::fund::Fund;
use crate::ids::{FundId, MemberId, SlipId};
use crate::members::Member;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// What one member owes in the cycle a slip settles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub member_id: MemberId,
    pub member_name: String,
    /// Regular or lifted installment, by the member's state in the settled month
    pub amount: f64,
    pub is_lifted: bool,
}

/// Settlement record for one fund and cycle; never edited once created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySlip {
    /// Unique slip identifier
    pub id: SlipId,

    /// Fund being settled
    pub fund_id: FundId,

    /// Cycle index, 1..=duration
    pub month: u32,

    /// Settlement date of the cycle
    pub date: NaiveDate,

    /// Member whose lift was recorded against this month, if any
    pub lifted_member_id: Option<MemberId>,

    /// One record per fund member, in joining order
    pub payment_records: Vec<PaymentRecord>,

    pub created_at: DateTime<Utc>,
}

impl MonthlySlip {
    /// Snapshot the fund's members into a slip for `month`
    pub(crate) fn snapshot(fund: &Fund, members: &[Member], month: u32, date: NaiveDate) -> Self {
        let payment_records = members
            .iter()
            .map(|m| {
                let is_lifted = m.has_lifted_by(month);
                PaymentRecord {
                    member_id: m.id,
                    member_name: m.name.clone(),
                    amount: fund.installment_for(is_lifted),
                    is_lifted,
                }
            })
            .collect();
        let lifted_member_id = members
            .iter()
            .find(|m| m.lifted_month == Some(month))
            .map(|m| m.id);

        Self {
            id: SlipId::new(),
            fund_id: fund.id,
            month,
            date,
            lifted_member_id,
            payment_records,
            created_at: Utc::now(),
        }
    }

    /// Sum of all installments due on this slip
    pub fn total_due(&self) -> f64 {
        self.payment_records.iter().map(|r| r.amount).sum()
    }

    pub fn lifted_count(&self) -> usize {
        self.payment_records.iter().filter(|r| r.is_lifted).count()
    }
}
