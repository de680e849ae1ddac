//! Idempotent generation of monthly settlement slips

use super::data::MonthlySlip;
use crate::error::{ChittyError, Result};
use crate::fund::Fund;
use crate::ids::{FundId, SlipId};
use crate::members::Member;
use chrono::{NaiveDate, Utc};
use log::{debug, info};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// Store of issued slips, keyed by id and by (fund, month)
#[derive(Debug, Default)]
pub struct SlipGenerator {
    slips: HashMap<SlipId, MonthlySlip>,
    by_cycle: BTreeMap<(FundId, u32), SlipId>,
}

impl SlipGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settle `month` of `fund`, or return the slip already issued for it
    ///
    /// `members` is the fund's current roster; it is only read when a new
    /// slip is created. `date` defaults to today.
    pub fn generate_slip(
        &mut self,
        fund: &Fund,
        members: &[Member],
        month: u32,
        date: Option<NaiveDate>,
    ) -> Result<MonthlySlip> {
        fund.check_month(month)?;

        match self.by_cycle.entry((fund.id, month)) {
            Entry::Occupied(entry) => {
                let id = *entry.get();
                debug!("Slip for fund {} month {} already issued as {}", fund.id, month, id);
                self.slips.get(&id).cloned().ok_or(ChittyError::SlipNotFound(id))
            }
            Entry::Vacant(entry) => {
                let date = date.unwrap_or_else(|| Utc::now().date_naive());
                let slip = MonthlySlip::snapshot(fund, members, month, date);
                entry.insert(slip.id);
                self.slips.insert(slip.id, slip.clone());
                info!(
                    "Issued slip {} for fund {} month {}/{} ({} records, {:.2} due)",
                    slip.id,
                    fund.id,
                    month,
                    fund.duration,
                    slip.payment_records.len(),
                    slip.total_due()
                );
                Ok(slip)
            }
        }
    }

    /// Slips of a fund ordered by month
    pub fn list_slips(&self, fund_id: FundId) -> Vec<MonthlySlip> {
        self.by_cycle
            .range((fund_id, 0)..=(fund_id, u32::MAX))
            .filter_map(|(_, id)| self.slips.get(id))
            .cloned()
            .collect()
    }

    pub fn slip_for_month(&self, fund_id: FundId, month: u32) -> Option<MonthlySlip> {
        self.by_cycle
            .get(&(fund_id, month))
            .and_then(|id| self.slips.get(id))
            .cloned()
    }

    pub fn get_slip(&self, id: SlipId) -> Result<MonthlySlip> {
        self.slips.get(&id).cloned().ok_or(ChittyError::SlipNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.slips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slips.is_empty()
    }
}
