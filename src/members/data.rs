//! Member records and lift state

use crate::error::{ChittyError, Result};
use crate::ids::{FundId, MemberId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lift lifecycle of a member: Eligible -> Lifted, never back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiftState {
    /// Still waiting for their turn at the pool
    Eligible,
    /// Has taken the pool; pays the lifted installment from now on
    Lifted,
}

/// A participant in one fund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique member identifier
    pub id: MemberId,

    /// Display name
    pub name: String,

    /// Fund this member belongs to
    pub fund_id: FundId,

    /// Whether the member has taken the pool
    pub has_lifted: bool,

    /// Cycle in which the lift happened, when the caller supplied one
    #[serde(default)]
    pub lifted_month: Option<u32>,

    /// When the lift was recorded
    #[serde(default)]
    pub lifted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl Member {
    pub(crate) fn new(name: &str, fund_id: FundId) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChittyError::invalid("member name must not be blank"));
        }
        Ok(Self {
            id: MemberId::new(),
            name: name.to_string(),
            fund_id,
            has_lifted: false,
            lifted_month: None,
            lifted_at: None,
            created_at: Utc::now(),
        })
    }

    pub fn state(&self) -> LiftState {
        if self.has_lifted {
            LiftState::Lifted
        } else {
            LiftState::Eligible
        }
    }

    /// Whether the lifted installment applies in `month`
    ///
    /// A lift pinned to a cycle counts from that cycle on; an unpinned lift
    /// counts in every cycle.
    pub fn has_lifted_by(&self, month: u32) -> bool {
        self.lifted_month.map_or(self.has_lifted, |lifted| lifted <= month)
    }

    /// Compare-and-set on the lift flag; a second lift is an error
    pub(crate) fn mark_lifted(&mut self, month: Option<u32>) -> Result<()> {
        if self.has_lifted {
            return Err(ChittyError::AlreadyLifted(self.id));
        }
        self.has_lifted = true;
        self.lifted_month = month;
        self.lifted_at = Some(Utc::now());
        Ok(())
    }
}
