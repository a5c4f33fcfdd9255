use chrono::{NaiveDate, Utc};
use std::env;
use thiserror::Error;

use crate::domain::LendingPolicy;
use crate::domain::policy::{
    AVERAGE_LOAN_DAYS, INITIAL_LOAN_DAYS, MAX_EXTENSION_DAYS, OFFER_WINDOW_DAYS,
};

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a valid port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },

    #[error("{name} must be an ISO date (YYYY-MM-DD), got {value:?}")]
    InvalidDate { name: &'static str, value: String },

    #[error("{name} must be a positive number of days, got {value:?}")]
    InvalidDays { name: &'static str, value: String },
}

/// 実行時設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// 論理時計の開始日
    pub start_date: NaiveDate,
    pub policy: LendingPolicy,
}

impl AppConfig {
    /// 環境変数から設定を読み込む（未設定の項目は既定値）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidPort {
                name: "PORT",
                value,
            })?,
            None => 3000,
        };

        let start_date = match lookup("LIBRARY_START_DATE") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidDate {
                name: "LIBRARY_START_DATE",
                value,
            })?,
            None => Utc::now().date_naive(),
        };

        let policy = LendingPolicy {
            offer_window_days: days(&lookup, "OFFER_WINDOW_DAYS", OFFER_WINDOW_DAYS)?,
            initial_loan_days: days(&lookup, "INITIAL_LOAN_DAYS", INITIAL_LOAN_DAYS)?,
            max_extension_days: days(&lookup, "MAX_EXTENSION_DAYS", MAX_EXTENSION_DAYS)?,
            average_loan_days: days(&lookup, "AVERAGE_LOAN_DAYS", AVERAGE_LOAN_DAYS)?,
        };

        Ok(Self {
            port,
            start_date,
            policy,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn days(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(ConfigError::InvalidDays { name, value }),
    }
}
