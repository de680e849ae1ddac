//! Fund aggregate: one consistent owner for funds, members and slips
//!
//! `ChittyManager` holds every record behind a single lock. Each mutation
//! validates first and writes second while holding the write lock, so racing
//! callers observe one another's effects in some serial order:
//!
//! - only the first of several concurrent lifts of a member succeeds
//! - concurrent slip requests for one (fund, month) share a single slip
//! - concurrent joins never push a fund past its capacity
//!
//! # Example
//! ```ignore
//! let manager = ChittyManager::new();
//! let fund = manager.create_fund("5 Lakh Chitty", 500_000.0, 20, None)?;
//! let member = manager.add_member(fund.id, "Rajesh Kumar")?;
//! manager.lift_member(member.id, Some(1))?;
//! let slip = manager.generate_slip(fund.id, 1, None)?;
//! ```

use crate::error::{ChittyError, Result};
use crate::fund::{CreateFundRequest, Fund};
use crate::ids::{FundId, MemberId, SlipId};
use crate::members::{Member, MemberRegistry};
use crate::slips::{MonthlySlip, SlipGenerator};
use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct Ledger {
    /// Funds in creation order
    funds: Vec<Fund>,
    index: HashMap<FundId, usize>,
    members: MemberRegistry,
    slips: SlipGenerator,
}

impl Ledger {
    fn fund(&self, id: FundId) -> Result<&Fund> {
        self.index
            .get(&id)
            .map(|&i| &self.funds[i])
            .ok_or(ChittyError::FundNotFound(id))
    }

    fn insert_fund(&mut self, fund: Fund) {
        self.index.insert(fund.id, self.funds.len());
        self.funds.push(fund);
    }
}

/// Owner of all chitty state; share between threads with `Arc`
#[derive(Debug, Default)]
pub struct ChittyManager {
    ledger: RwLock<Ledger>,
}

impl ChittyManager {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never leave the ledger half-updated, so a poisoned lock still
    // guards consistent state.
    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.ledger.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.ledger.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- Funds ----

    pub fn create_fund(
        &self,
        name: &str,
        principal: f64,
        duration: u32,
        start_date: Option<NaiveDate>,
    ) -> Result<Fund> {
        let fund = Fund::new(name, principal, duration, start_date)?;
        info!(
            "Created fund {} '{}': principal {:.2} over {} months, regular {:.2}, lifted {:.2}",
            fund.id,
            fund.name,
            fund.principal,
            fund.duration,
            fund.regular_payment(),
            fund.lifted_payment()
        );
        self.write().insert_fund(fund.clone());
        Ok(fund)
    }

    /// Create a fund together with its opening roster, all or nothing
    pub fn create_fund_with_members(
        &self,
        request: &CreateFundRequest,
    ) -> Result<(Fund, Vec<Member>)> {
        let mut fund = Fund::new(
            &request.name,
            request.principal,
            request.duration,
            request.start_date,
        )?;
        if request.member_names.len() > fund.capacity() as usize {
            return Err(ChittyError::CapacityExceeded {
                fund_id: fund.id,
                capacity: fund.capacity(),
            });
        }
        if request.member_names.iter().any(|n| n.trim().is_empty()) {
            return Err(ChittyError::invalid("member name must not be blank"));
        }

        let mut ledger = self.write();
        let mut members = Vec::with_capacity(request.member_names.len());
        for name in &request.member_names {
            members.push(ledger.members.add_member(&mut fund, name)?);
        }
        info!(
            "Created fund {} '{}' with {}/{} members",
            fund.id,
            fund.name,
            members.len(),
            fund.capacity()
        );
        ledger.insert_fund(fund.clone());
        Ok((fund, members))
    }

    pub fn list_funds(&self) -> Vec<Fund> {
        self.read().funds.clone()
    }

    pub fn get_fund(&self, id: FundId) -> Result<Fund> {
        self.read().fund(id).cloned()
    }

    /// Funds whose name contains `query`, ignoring case
    pub fn search_funds(&self, query: &str) -> Vec<Fund> {
        let needle = query.trim().to_lowercase();
        self.read()
            .funds
            .iter()
            .filter(|f| f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Soft-close a fund: records stay readable, new activity is refused
    pub fn close_fund(&self, id: FundId) -> Result<Fund> {
        let mut ledger = self.write();
        let idx = *ledger.index.get(&id).ok_or(ChittyError::FundNotFound(id))?;
        let fund = &mut ledger.funds[idx];
        if fund.is_active {
            fund.is_active = false;
            fund.touch();
            info!("Closed fund {} '{}'", fund.id, fund.name);
        }
        Ok(fund.clone())
    }

    // ---- Members ----

    pub fn add_member(&self, fund_id: FundId, name: &str) -> Result<Member> {
        let mut guard = self.write();
        let Ledger { funds, index, members, .. } = &mut *guard;
        let idx = *index.get(&fund_id).ok_or(ChittyError::FundNotFound(fund_id))?;
        let fund = &mut funds[idx];
        fund.ensure_active()?;
        members.add_member(fund, name)
    }

    pub fn list_members(&self, fund_id: FundId) -> Result<Vec<Member>> {
        let ledger = self.read();
        let fund = ledger.fund(fund_id)?;
        Ok(ledger.members.list_members(fund))
    }

    pub fn get_member(&self, id: MemberId) -> Result<Member> {
        self.read().members.get_member(id)
    }

    /// Record a member's lift, optionally pinned to a cycle of their fund
    ///
    /// Only a lift given a `month` claims that cycle, so the one-lift-per-cycle
    /// rule is enforced for month-pinned lifts alone. A lift without a month
    /// still counts once per member but leaves every cycle open, and slips
    /// price that member at the lifted rate in every month.
    pub fn lift_member(&self, id: MemberId, month: Option<u32>) -> Result<Member> {
        let mut guard = self.write();
        let Ledger { funds, index, members, .. } = &mut *guard;
        let fund_id = members.get_member(id)?.fund_id;
        let idx = *index.get(&fund_id).ok_or(ChittyError::FundNotFound(fund_id))?;
        let fund = &funds[idx];
        fund.ensure_active()?;

        let member = match month {
            Some(month) => members.lift_in_month(fund, id, month)?,
            None => members.lift(id)?,
        };
        info!(
            "Member {} ({}) lifted fund {}{}",
            member.id,
            member.name,
            fund.id,
            month.map(|m| format!(" in month {}", m)).unwrap_or_default()
        );
        Ok(member)
    }

    pub fn lifted_members(&self, fund_id: FundId) -> Result<Vec<Member>> {
        let ledger = self.read();
        let fund = ledger.fund(fund_id)?;
        Ok(ledger.members.lifted_members(fund))
    }

    pub fn eligible_members(&self, fund_id: FundId) -> Result<Vec<Member>> {
        let ledger = self.read();
        let fund = ledger.fund(fund_id)?;
        Ok(ledger.members.eligible_members(fund))
    }

    pub fn rename_member(&self, id: MemberId, name: &str) -> Result<Member> {
        self.write().members.rename_member(id, name)
    }

    // ---- Slips ----

    /// Settle a cycle of a fund; repeated calls return the same slip
    pub fn generate_slip(
        &self,
        fund_id: FundId,
        month: u32,
        date: Option<NaiveDate>,
    ) -> Result<MonthlySlip> {
        let mut guard = self.write();
        let Ledger { funds, index, members, slips } = &mut *guard;
        let idx = *index.get(&fund_id).ok_or(ChittyError::FundNotFound(fund_id))?;
        let fund = &funds[idx];
        if !fund.is_active && slips.slip_for_month(fund_id, month).is_none() {
            fund.ensure_active()?;
        }
        let roster = members.list_members(fund);
        slips.generate_slip(fund, &roster, month, date)
    }

    pub fn list_slips(&self, fund_id: FundId) -> Result<Vec<MonthlySlip>> {
        let ledger = self.read();
        ledger.fund(fund_id)?;
        Ok(ledger.slips.list_slips(fund_id))
    }

    pub fn slip_for_month(&self, fund_id: FundId, month: u32) -> Result<Option<MonthlySlip>> {
        let ledger = self.read();
        ledger.fund(fund_id)?.check_month(month)?;
        Ok(ledger.slips.slip_for_month(fund_id, month))
    }

    pub fn get_slip(&self, id: SlipId) -> Result<MonthlySlip> {
        self.read().slips.get_slip(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;
    use std::thread;

    const NAMES: [&str; 20] = [
        "Rajesh Kumar", "Priya Sharma", "Amit Singh", "Sunita Devi", "Vikash Gupta",
        "Meera Joshi", "Suresh Reddy", "Kavita Patel", "Ravi Kumar", "Anjali Singh",
        "Manoj Yadav", "Sita Ram", "Deepak Verma", "Radha Krishna", "Santosh Kumar",
        "Gita Devi", "Rakesh Jain", "Shanti Bai", "Mukesh Agarwal", "Kamala Devi",
    ];

    fn five_lakh(manager: &ChittyManager) -> Fund {
        let fund = manager.create_fund("5 Lakh Chitty", 500_000.0, 20, None).unwrap();
        for name in NAMES {
            manager.add_member(fund.id, name).unwrap();
        }
        fund
    }

    #[test]
    fn test_five_lakh_scenario() {
        let manager = ChittyManager::new();
        let fund = five_lakh(&manager);

        assert_abs_diff_eq!(fund.regular_payment(), 25_000.0);
        assert_abs_diff_eq!(fund.lifted_payment(), 31_250.0);

        let members = manager.list_members(fund.id).unwrap();
        assert_eq!(members.len(), 20);
        assert!(members.iter().all(|m| !m.has_lifted));
        assert_eq!(manager.get_fund(fund.id).unwrap().member_ids.len(), 20);

        let err = manager.add_member(fund.id, "One Too Many").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn test_lift_scenario() {
        let manager = ChittyManager::new();
        let fund = five_lakh(&manager);
        let first = manager.list_members(fund.id).unwrap()[0].id;

        manager.lift_member(first, None).unwrap();
        assert!(manager.get_member(first).unwrap().has_lifted);

        let err = manager.lift_member(first, None).unwrap_err();
        assert_eq!(err, ChittyError::AlreadyLifted(first));
    }

    #[test]
    fn test_slip_scenario() {
        let manager = ChittyManager::new();
        let fund = five_lakh(&manager);
        let date = NaiveDate::from_ymd_opt(2025, 2, 1);

        let a = manager.generate_slip(fund.id, 1, date).unwrap();
        let b = manager.generate_slip(fund.id, 1, date).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(b.month, 1);
        assert_eq!(manager.list_slips(fund.id).unwrap().len(), 1);
        assert_eq!(manager.get_slip(a.id).unwrap(), a);
    }

    #[test]
    fn test_one_lakh_payments() {
        let manager = ChittyManager::new();
        let fund = manager.create_fund("1 Lakh Chitty", 100_000.0, 10, None).unwrap();
        assert_abs_diff_eq!(fund.regular_payment(), 10_000.0);
        assert_abs_diff_eq!(fund.lifted_payment(), 12_500.0);
    }

    #[test]
    fn test_unknown_fund_is_distinct_from_unknown_member() {
        let manager = ChittyManager::new();
        let fund_id = FundId::new();
        let member_id = MemberId::new();

        assert_eq!(manager.list_members(fund_id).unwrap_err(), ChittyError::FundNotFound(fund_id));
        assert_eq!(manager.list_slips(fund_id).unwrap_err(), ChittyError::FundNotFound(fund_id));
        assert_eq!(
            manager.generate_slip(fund_id, 1, None).unwrap_err(),
            ChittyError::FundNotFound(fund_id)
        );
        assert_eq!(
            manager.lift_member(member_id, None).unwrap_err(),
            ChittyError::MemberNotFound(member_id)
        );
    }

    #[test]
    fn test_huge_duration_fund_is_created() {
        let manager = ChittyManager::new();
        let fund = manager.create_fund("Huge", 1_000_000.0, u32::MAX, None).unwrap();
        assert_eq!(fund.capacity(), u32::MAX);
        let member = manager.add_member(fund.id, "Gita Devi").unwrap();
        assert_eq!(manager.get_fund(fund.id).unwrap().member_ids, vec![member.id]);
    }

    #[test]
    fn test_funds_listed_in_creation_order_and_searchable() {
        let manager = ChittyManager::new();
        manager.create_fund("Gold Chitty", 200_000.0, 10, None).unwrap();
        manager.create_fund("Silver Chitty", 100_000.0, 10, None).unwrap();
        manager.create_fund("Festival Savings", 50_000.0, 5, None).unwrap();

        let names: Vec<_> = manager.list_funds().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Gold Chitty", "Silver Chitty", "Festival Savings"]);
        assert_eq!(manager.search_funds("chitty").len(), 2);
        assert_eq!(manager.search_funds("FESTIVAL").len(), 1);
    }

    #[test]
    fn test_create_with_members_is_all_or_nothing() {
        let manager = ChittyManager::new();
        let too_many = CreateFundRequest {
            name: "Tiny".to_string(),
            principal: 30_000.0,
            duration: 2,
            start_date: None,
            member_names: vec!["A".into(), "B".into(), "C".into()],
        };
        assert_eq!(
            manager.create_fund_with_members(&too_many).unwrap_err().kind(),
            ErrorKind::CapacityExceeded
        );

        let blank = CreateFundRequest {
            member_names: vec!["A".into(), " ".into()],
            ..too_many.clone()
        };
        assert!(manager.create_fund_with_members(&blank).is_err());
        assert!(manager.list_funds().is_empty());

        let ok = CreateFundRequest {
            member_names: vec!["A".into(), "B".into()],
            ..too_many
        };
        let (fund, members) = manager.create_fund_with_members(&ok).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(manager.list_members(fund.id).unwrap(), members);
    }

    #[test]
    fn test_closed_fund_refuses_new_activity() {
        let manager = ChittyManager::new();
        let fund = manager.create_fund("Closing Chitty", 20_000.0, 2, None).unwrap();
        let member = manager.add_member(fund.id, "Kamala Devi").unwrap();
        let slip = manager.generate_slip(fund.id, 1, None).unwrap();

        let closed = manager.close_fund(fund.id).unwrap();
        assert!(!closed.is_active);

        assert!(manager.add_member(fund.id, "Late Joiner").is_err());
        assert!(manager.lift_member(member.id, None).is_err());
        assert!(manager.generate_slip(fund.id, 2, None).is_err());
        assert_eq!(manager.generate_slip(fund.id, 1, None).unwrap().id, slip.id);
        assert_eq!(manager.list_members(fund.id).unwrap().len(), 1);
    }

    #[test]
    fn test_month_pinned_lifts_feed_slips() {
        let manager = ChittyManager::new();
        let fund = five_lakh(&manager);
        let members = manager.list_members(fund.id).unwrap();

        manager.lift_member(members[0].id, Some(1)).unwrap();
        let err = manager.lift_member(members[1].id, Some(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyLifted);

        let slip = manager.generate_slip(fund.id, 1, None).unwrap();
        assert_eq!(slip.lifted_member_id, Some(members[0].id));
        assert_eq!(manager.lifted_members(fund.id).unwrap().len(), 1);
        assert_eq!(manager.eligible_members(fund.id).unwrap().len(), 19);
        assert_eq!(manager.slip_for_month(fund.id, 1).unwrap(), Some(slip));
        assert!(manager.slip_for_month(fund.id, 21).is_err());
    }

    #[test]
    fn test_unpinned_lift_leaves_cycles_open() {
        let manager = ChittyManager::new();
        let fund = manager.create_fund("Open Chitty", 40_000.0, 4, None).unwrap();
        let a = manager.add_member(fund.id, "Rakesh Jain").unwrap();
        let b = manager.add_member(fund.id, "Shanti Bai").unwrap();

        manager.lift_member(a.id, None).unwrap();
        let pinned = manager.lift_member(b.id, Some(1)).unwrap();
        assert_eq!(pinned.lifted_month, Some(1));

        let slip = manager.generate_slip(fund.id, 1, None).unwrap();
        assert_eq!(slip.lifted_member_id, Some(b.id));
        assert_eq!(slip.lifted_count(), 2);
    }

    #[test]
    fn test_concurrent_lifts_only_first_wins() {
        let manager = Arc::new(ChittyManager::new());
        let fund = manager.create_fund("Race Chitty", 50_000.0, 5, None).unwrap();
        let member = manager.add_member(fund.id, "Santosh Kumar").unwrap();

        let results: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let manager = Arc::clone(&manager);
                    s.spawn(move || manager.lift_member(member.id, None))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == ChittyError::AlreadyLifted(member.id)));
    }

    #[test]
    fn test_concurrent_slip_generation_shares_one_slip() {
        let manager = Arc::new(ChittyManager::new());
        let fund = manager.create_fund("Race Chitty", 50_000.0, 5, None).unwrap();

        let ids: Vec<SlipId> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let manager = Arc::clone(&manager);
                    s.spawn(move || manager.generate_slip(fund.id, 3, None).unwrap().id)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(manager.list_slips(fund.id).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_adds_respect_capacity() {
        let manager = Arc::new(ChittyManager::new());
        let fund = manager.create_fund("Race Chitty", 50_000.0, 5, None).unwrap();

        let added = thread::scope(|s| {
            let handles: Vec<_> = (0..12)
                .map(|i| {
                    let manager = Arc::clone(&manager);
                    s.spawn(move || manager.add_member(fund.id, &format!("Member {}", i)))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|r| r.is_ok())
                .count()
        });

        assert_eq!(added, 5);
        assert_eq!(manager.list_members(fund.id).unwrap().len(), 5);
    }
}
