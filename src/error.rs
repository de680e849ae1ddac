//! Error types for the chitty engine

use crate::ids::{FundId, MemberId, SlipId};
use serde::Serialize;
use thiserror::Error;

/// Every failure the engine reports to a caller
///
/// All variants are local, recoverable conditions. A failed operation leaves
/// no partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChittyError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("fund {0} not found")]
    FundNotFound(FundId),

    #[error("member {0} not found")]
    MemberNotFound(MemberId),

    #[error("monthly slip {0} not found")]
    SlipNotFound(SlipId),

    #[error("fund {fund_id} already has its full complement of {capacity} members")]
    CapacityExceeded { fund_id: FundId, capacity: u32 },

    #[error("member {0} has already lifted")]
    AlreadyLifted(MemberId),

    #[error("month {month} was already lifted by member {member_id}")]
    MonthAlreadyLifted { month: u32, member_id: MemberId },
}

/// Coarse error classification exposed to request layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidParameter,
    NotFound,
    CapacityExceeded,
    AlreadyLifted,
}

impl ChittyError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ChittyError::InvalidParameter(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ChittyError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ChittyError::FundNotFound(_)
            | ChittyError::MemberNotFound(_)
            | ChittyError::SlipNotFound(_) => ErrorKind::NotFound,
            ChittyError::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            ChittyError::AlreadyLifted(_) | ChittyError::MonthAlreadyLifted { .. } => {
                ErrorKind::AlreadyLifted
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ChittyError>;
