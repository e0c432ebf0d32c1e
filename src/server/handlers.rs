use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::AnalyzeError;
use crate::metrics::{self, Analytics};
use crate::source::Profile;

use super::AppState;

pub const RATE_LIMIT_SUGGESTION: &str = "Try demo mode to see how the tool works";

pub const FETCH_SUGGESTION: &str = "Click \"Try Demo\" button to see sample analytics. \
     The Twitter API might have rate limits or authentication issues.";

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    pub demo: Option<String>,
}

impl AnalyzeQuery {
    /// Only the literal `true` switches to demo data.
    pub fn is_demo(&self) -> bool {
        self.demo.as_deref() == Some("true")
    }
}

/// Profile summary with the analytics flattened alongside it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub is_demo: bool,
    pub username: String,
    pub display_name: String,
    pub profile_image: Option<String>,
    pub verified: bool,
    pub bio: String,
    pub member_since: DateTime<Utc>,
    #[serde(flatten)]
    pub analytics: Analytics,
}

impl AnalyzeResponse {
    pub fn new(profile: Profile, is_demo: bool, analytics: Analytics) -> Self {
        Self {
            success: true,
            is_demo,
            username: profile.handle,
            display_name: profile.display_name,
            profile_image: profile.avatar_url,
            verified: profile.verified,
            bio: profile.bio,
            member_since: profile.created_at,
            analytics,
        }
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Path(username): Path<String>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<Json<AnalyzeResponse>, AnalyzeError> {
    if username.trim().is_empty() {
        return Err(AnalyzeError::missing_username());
    }

    // An unreadable query string (e.g. a repeated `demo`) is not a literal `true`.
    let query = query.map(|Query(q)| q).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "ignoring unparsable query string");
        AnalyzeQuery::default()
    });

    let is_demo = query.is_demo();
    let source = if is_demo { &state.demo } else { &state.live };
    let data = source.fetch(&username).await.inspect_err(|e| {
        warn!(username = %username, status = e.status(), error = %e, "analyze failed");
    })?;

    let analytics = metrics::derive(&data.profile, &data.posts, Utc::now());
    info!(username = %username, is_demo, posts = data.posts.len(), "analyzed");
    Ok(Json(AnalyzeResponse::new(data.profile, is_demo, analytics)))
}

pub(super) async fn missing_username() -> AnalyzeError {
    AnalyzeError::missing_username()
}

impl IntoResponse for AnalyzeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = self.to_string();

        let body = match self {
            AnalyzeError::BadRequest(_) => json!({ "error": message }),
            AnalyzeError::RateLimited {
                reset_time,
                wait_minutes,
            } => json!({
                "success": false,
                "error": message,
                "resetTime": reset_time,
                "waitMinutes": wait_minutes,
                "suggestion": RATE_LIMIT_SUGGESTION,
            }),
            AnalyzeError::Internal(_) => json!({ "success": false, "error": message }),
            AnalyzeError::Configuration(_) => json!({
                "success": false,
                "error": message,
                "suggestion": FETCH_SUGGESTION,
            }),
            AnalyzeError::Provider { details, .. } => {
                let mut body = json!({
                    "success": false,
                    "error": message,
                    "suggestion": FETCH_SUGGESTION,
                });
                if let Some(details) = details {
                    body["details"] = details;
                }
                body
            }
        };

        (status, Json(body)).into_response()
    }
}
