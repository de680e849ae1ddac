//! Seed configuration for bootstrapping a fund
//!
//! Read from JSON; every field falls back to the stock "5 Lakh Chitty"
//! setup, so an empty object `{}` is a valid config.

use crate::error::ChittyError;
use crate::fund::{compute_payments, CreateFundRequest};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedConfig {
    /// Display name of the seeded fund
    #[serde(default = "default_fund_name")]
    pub fund_name: String,

    /// Total pool value (default: 5 lakh)
    #[serde(default = "default_principal")]
    pub principal: f64,

    /// Months, which is also the number of seats (default: 20)
    #[serde(default = "default_duration")]
    pub duration: u32,

    /// First cycle date (default: today)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Opening roster
    #[serde(default = "default_member_names")]
    pub member_names: Vec<String>,

    /// CSV roster that replaces `member_names` when set
    #[serde(default)]
    pub roster_path: Option<PathBuf>,
}

fn default_fund_name() -> String { "5 Lakh Chitty".to_string() }
fn default_principal() -> f64 { 500_000.0 }
fn default_duration() -> u32 { 20 }

fn default_member_names() -> Vec<String> {
    [
        "Rajesh Kumar", "Priya Sharma", "Amit Singh", "Sunita Devi", "Vikash Gupta",
        "Meera Joshi", "Suresh Reddy", "Kavita Patel", "Ravi Kumar", "Anjali Singh",
        "Manoj Yadav", "Sita Ram", "Deepak Verma", "Radha Krishna", "Santosh Kumar",
        "Gita Devi", "Rakesh Jain", "Shanti Bai", "Mukesh Agarwal", "Kamala Devi",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            fund_name: default_fund_name(),
            principal: default_principal(),
            duration: default_duration(),
            start_date: None,
            member_names: default_member_names(),
            roster_path: None,
        }
    }
}

impl SeedConfig {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid seed config JSON")
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed config {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// Check the financial parameters and that the roster fits the fund
    pub fn validate(&self) -> Result<(), ChittyError> {
        compute_payments(self.principal, self.duration)?;
        if self.member_names.len() > self.duration as usize {
            return Err(ChittyError::invalid(format!(
                "roster has {} names but the fund only seats {}",
                self.member_names.len(),
                self.duration
            )));
        }
        Ok(())
    }

    pub fn to_request(&self) -> CreateFundRequest {
        CreateFundRequest {
            name: self.fund_name.clone(),
            principal: self.principal,
            duration: self.duration,
            start_date: self.start_date,
            member_names: self.member_names.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = SeedConfig::from_json("{}").unwrap();
        assert_eq!(config.fund_name, "5 Lakh Chitty");
        assert_eq!(config.duration, 20);
        assert_eq!(config.member_names.len(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = SeedConfig::from_json(
            r#"{"fundName": "Diwali Fund", "principal": 60000, "duration": 6,
                "startDate": "2025-04-01", "memberNames": ["A", "B"]}"#,
        )
        .unwrap();
        assert_eq!(config.fund_name, "Diwali Fund");
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2025, 4, 1));
        assert!(config.validate().is_ok());

        let request = config.to_request();
        assert_eq!(request.duration, 6);
        assert_eq!(request.member_names, vec!["A", "B"]);
    }

    #[test]
    fn test_roster_larger_than_fund_rejected() {
        let config = SeedConfig {
            duration: 10,
            ..SeedConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChittyError::InvalidParameter(_))));
    }

    #[test]
    fn test_bad_json() {
        assert!(SeedConfig::from_json("{\"duration\": \"ten\"}").is_err());
    }
}
