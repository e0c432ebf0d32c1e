//! Failures that can end an analyze request.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::consts::DEFAULT_RATE_LIMIT_WAIT_MINUTES;

#[derive(Error, Debug, Clone)]
pub enum AnalyzeError {
    /// The provider credential is missing. Demo mode still works.
    #[error("{0}")]
    Configuration(String),

    #[error("Twitter API rate limit exceeded. Please try again in {wait_minutes} minutes.")]
    RateLimited {
        reset_time: Option<DateTime<Utc>>,
        wait_minutes: i64,
    },

    /// The provider answered with a non-success status, or could not be reached.
    #[error("{message}")]
    Provider {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AnalyzeError {
    pub fn missing_credential() -> Self {
        Self::Configuration(
            "Twitter Bearer Token not configured in environment variables".to_string(),
        )
    }

    pub fn missing_username() -> Self {
        Self::BadRequest("Username is required".to_string())
    }

    /// Rate-limit error with the wait rounded up to whole minutes.
    pub fn rate_limited(reset_time: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let wait_minutes = match reset_time {
            Some(reset) => {
                let millis = (reset - now).num_milliseconds() as f64;
                ((millis / 60_000.0).ceil() as i64).max(0)
            }
            None => DEFAULT_RATE_LIMIT_WAIT_MINUTES,
        };
        Self::RateLimited {
            reset_time,
            wait_minutes,
        }
    }

    /// Transport-level failure with no provider response.
    pub fn unreachable(err: impl std::fmt::Display) -> Self {
        Self::Provider {
            status: 500,
            message: err.to_string(),
            details: None,
        }
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Internal(_) => 500,
            Self::RateLimited { .. } => 429,
            Self::Provider { status, .. } => *status,
            Self::BadRequest(_) => 400,
        }
    }
}
