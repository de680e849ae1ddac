//! Member lifecycle within funds
//!
//! The registry owns every member record. A fund only keeps the ordered list
//! of its member ids, so fund-scoped queries walk that list and look each
//! member up here.

use super::data::Member;
use crate::error::{ChittyError, Result};
use crate::fund::Fund;
use crate::ids::MemberId;
use log::{debug, warn};
use std::collections::HashMap;

/// Store of members across all funds
#[derive(Debug, Default)]
pub struct MemberRegistry {
    members: HashMap<MemberId, Member>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member to a fund that still has an open seat
    pub fn add_member(&mut self, fund: &mut Fund, name: &str) -> Result<Member> {
        if fund.is_full() {
            warn!(
                "Rejected member '{}' for fund {}: all {} seats taken",
                name.trim(),
                fund.id,
                fund.capacity()
            );
            return Err(ChittyError::CapacityExceeded {
                fund_id: fund.id,
                capacity: fund.capacity(),
            });
        }

        let member = Member::new(name, fund.id)?;
        fund.member_ids.push(member.id);
        fund.touch();
        self.members.insert(member.id, member.clone());

        debug!(
            "Added member {} ({}) to fund {} [{}/{}]",
            member.id,
            member.name,
            fund.id,
            fund.member_count(),
            fund.capacity()
        );
        Ok(member)
    }

    pub fn get_member(&self, id: MemberId) -> Result<Member> {
        self.members
            .get(&id)
            .cloned()
            .ok_or(ChittyError::MemberNotFound(id))
    }

    /// Mark a member as having taken their one lift
    pub fn lift(&mut self, id: MemberId) -> Result<Member> {
        let member = self
            .members
            .get_mut(&id)
            .ok_or(ChittyError::MemberNotFound(id))?;
        if let Err(err) = member.mark_lifted(None) {
            warn!("Rejected lift for member {}: {}", id, err);
            return Err(err);
        }
        Ok(member.clone())
    }

    /// Lift a member in a specific cycle of their fund
    ///
    /// Only one member of a fund may lift per cycle.
    pub fn lift_in_month(&mut self, fund: &Fund, id: MemberId, month: u32) -> Result<Member> {
        let member = self.get_member(id)?;
        if member.fund_id != fund.id {
            return Err(ChittyError::invalid(format!(
                "member {} does not belong to fund {}",
                id, fund.id
            )));
        }
        fund.check_month(month)?;
        if member.has_lifted {
            warn!("Rejected lift for member {}: already lifted", id);
            return Err(ChittyError::AlreadyLifted(id));
        }
        if let Some(holder) = self.lifted_in_month(fund, month) {
            warn!(
                "Rejected lift for member {}: month {} already taken by {}",
                id, month, holder.id
            );
            return Err(ChittyError::MonthAlreadyLifted {
                month,
                member_id: holder.id,
            });
        }

        let member = self
            .members
            .get_mut(&id)
            .ok_or(ChittyError::MemberNotFound(id))?;
        member.mark_lifted(Some(month))?;
        Ok(member.clone())
    }

    /// Members of a fund in joining order
    pub fn list_members(&self, fund: &Fund) -> Vec<Member> {
        fund.member_ids
            .iter()
            .filter_map(|id| self.members.get(id))
            .cloned()
            .collect()
    }

    pub fn lifted_members(&self, fund: &Fund) -> Vec<Member> {
        self.list_members(fund)
            .into_iter()
            .filter(|m| m.has_lifted)
            .collect()
    }

    pub fn eligible_members(&self, fund: &Fund) -> Vec<Member> {
        self.list_members(fund)
            .into_iter()
            .filter(|m| !m.has_lifted)
            .collect()
    }

    /// Member of `fund` whose lift was recorded against `month`
    pub fn lifted_in_month(&self, fund: &Fund, month: u32) -> Option<&Member> {
        fund.member_ids
            .iter()
            .filter_map(|id| self.members.get(id))
            .find(|m| m.lifted_month == Some(month))
    }

    /// Change a member's display name; lift state is untouched
    pub fn rename_member(&mut self, id: MemberId, name: &str) -> Result<Member> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChittyError::invalid("member name must not be blank"));
        }
        let member = self
            .members
            .get_mut(&id)
            .ok_or(ChittyError::MemberNotFound(id))?;
        member.name = name.to_string();
        Ok(member.clone())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
