//! Request layer: maps engine operations onto the success/data/message envelope
//!
//! Core types never carry the envelope. A request is decoded into
//! [`Request`], run against a [`ChittyManager`], and the outcome wrapped:
//! one engine result becomes one `data` payload, one engine error becomes one
//! failure `message`.

use crate::error::{ChittyError, Result};
use crate::fund::CreateFundRequest;
use crate::ids::{FundId, MemberId, SlipId};
use crate::manager::ChittyManager;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response envelope expected by API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                warn!("Request failed ({:?}): {}", err.kind(), err);
                Self::error(err.to_string())
            }
        }
    }
}

/// One engine operation, tagged by `op`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    ListFunds,
    CreateFund {
        name: String,
        principal: f64,
        duration: u32,
        #[serde(default)]
        start_date: Option<NaiveDate>,
        #[serde(default)]
        member_names: Vec<String>,
    },
    GetFund {
        fund_id: FundId,
    },
    SearchFunds {
        query: String,
    },
    CloseFund {
        fund_id: FundId,
    },
    AddMember {
        fund_id: FundId,
        name: String,
    },
    ListMembers {
        fund_id: FundId,
    },
    GetMember {
        member_id: MemberId,
    },
    LiftMember {
        member_id: MemberId,
        #[serde(default)]
        month: Option<u32>,
    },
    ListSlips {
        fund_id: FundId,
    },
    GenerateSlip {
        fund_id: FundId,
        month: u32,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    GetSlip {
        slip_id: SlipId,
    },
}

fn to_value<T: Serialize>(result: Result<T>) -> Result<Value> {
    result.and_then(|data| {
        serde_json::to_value(data)
            .map_err(|e| ChittyError::invalid(format!("unserializable result: {}", e)))
    })
}

/// Run one request against the manager
pub fn dispatch(manager: &ChittyManager, request: Request) -> ApiResponse<Value> {
    debug!("Dispatching {:?}", request);
    let result = match request {
        Request::ListFunds => to_value(Ok(manager.list_funds())),
        Request::CreateFund {
            name,
            principal,
            duration,
            start_date,
            member_names,
        } => {
            if member_names.is_empty() {
                to_value(manager.create_fund(&name, principal, duration, start_date))
            } else {
                let request = CreateFundRequest {
                    name,
                    principal,
                    duration,
                    start_date,
                    member_names,
                };
                to_value(manager.create_fund_with_members(&request).map(|(fund, _)| fund))
            }
        }
        Request::GetFund { fund_id } => to_value(manager.get_fund(fund_id)),
        Request::SearchFunds { query } => to_value(Ok(manager.search_funds(&query))),
        Request::CloseFund { fund_id } => to_value(manager.close_fund(fund_id)),
        Request::AddMember { fund_id, name } => to_value(manager.add_member(fund_id, &name)),
        Request::ListMembers { fund_id } => to_value(manager.list_members(fund_id)),
        Request::GetMember { member_id } => to_value(manager.get_member(member_id)),
        Request::LiftMember { member_id, month } => {
            to_value(manager.lift_member(member_id, month))
        }
        Request::ListSlips { fund_id } => to_value(manager.list_slips(fund_id)),
        Request::GenerateSlip {
            fund_id,
            month,
            date,
        } => to_value(manager.generate_slip(fund_id, month, date)),
        Request::GetSlip { slip_id } => to_value(manager.get_slip(slip_id)),
    };
    ApiResponse::from_result(result)
}

/// Decode one JSON request, run it, and encode the envelope
pub fn handle_json(manager: &ChittyManager, body: &str) -> String {
    let response = match serde_json::from_str::<Request>(body) {
        Ok(request) => dispatch(manager, request),
        Err(e) => ApiResponse::error(format!("Invalid request: {}", e)),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|e| format!(r#"{{"success":false,"message":"{}"}}"#, e))
}
