//! Twitter API v2 client.

use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::consts::{MAX_POSTS, PROVIDER_TIMEOUT_SECS};
use crate::error::AnalyzeError;

use super::{AccountData, AccountSource, Post, PostMetrics, Profile, ProfileMetrics};

const USER_FIELDS: &str = "created_at,description,public_metrics,verified,profile_image_url";
const TWEET_FIELDS: &str = "created_at,public_metrics,entities";
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// Fetches profiles and timelines from the real API.
pub struct TwitterSource {
    client: Client,
    api_base: String,
    bearer_token: Option<String>,
}

impl TwitterSource {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn token(&self) -> Result<&str, AnalyzeError> {
        self.bearer_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(AnalyzeError::missing_credential)
    }

    /// `{api_base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AnalyzeError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| {
            AnalyzeError::Configuration(format!("invalid API base {:?}: {e}", self.api_base))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                AnalyzeError::Configuration(format!(
                    "API base {:?} cannot take a path",
                    self.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, AnalyzeError> {
        debug!(%url, "provider request");
        let resp = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "provider unreachable");
                AnalyzeError::unreachable(e)
            })?;

        let status = resp.status();
        if status.is_success() {
            return resp.json().await.map_err(|e| {
                error!(error = %e, "undecodable provider response");
                AnalyzeError::unreachable(e)
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = reset_time(resp.headers());
            warn!(?reset, "provider rate limit hit");
            return Err(AnalyzeError::rate_limited(reset, Utc::now()));
        }

        let body = resp.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %body, "provider request failed");
        Err(provider_error(status, &body))
    }
}

#[async_trait]
impl AccountSource for TwitterSource {
    async fn fetch(&self, handle: &str) -> Result<AccountData, AnalyzeError> {
        let token = self.token()?;
        info!(handle, "fetching account");

        let user_url = self.endpoint(&["users", "by", "username", handle])?;
        let envelope: Envelope<UserPayload> = self
            .get(token, user_url, &[("user.fields", USER_FIELDS)])
            .await?;
        let Some(user) = envelope.data else {
            let message = envelope
                .errors
                .as_ref()
                .and_then(problem_message)
                .unwrap_or_else(|| format!("User @{handle} not found"));
            warn!(handle, %message, "account not found");
            return Err(AnalyzeError::Provider {
                status: 404,
                message,
                details: envelope.errors,
            });
        };

        let tweets_url = self.endpoint(&["users", user.id.as_str(), "tweets"])?;
        let max_results = MAX_POSTS.to_string();
        let tweets: Envelope<Vec<TweetPayload>> = self
            .get(
                token,
                tweets_url,
                &[
                    ("max_results", max_results.as_str()),
                    ("tweet.fields", TWEET_FIELDS),
                    ("exclude", "retweets,replies"),
                ],
            )
            .await?;

        let posts: Vec<Post> = tweets
            .data
            .unwrap_or_default()
            .into_iter()
            .map(Post::from)
            .collect();
        info!(handle, posts = posts.len(), "account fetched");

        Ok(AccountData {
            profile: user.into_profile(Utc::now().trunc_subsecs(3)),
            posts,
        })
    }
}

/// Parse the epoch-seconds reset header, if present and sane.
fn reset_time(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let secs: i64 = headers
        .get(RATE_LIMIT_RESET_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    DateTime::from_timestamp(secs, 0)
}

fn provider_error(status: StatusCode, body: &str) -> AnalyzeError {
    let details: Option<Value> = serde_json::from_str(body).ok();
    let message = details
        .as_ref()
        .and_then(problem_message)
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
    AnalyzeError::Provider {
        status: status.as_u16(),
        message,
        details,
    }
}

/// Human-readable message from a provider problem body: `detail`, then
/// `title`, then the first entry of an `errors` array.
fn problem_message(body: &Value) -> Option<String> {
    let field = |v: &Value, key: &str| {
        v.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    if let Some(first) = body.as_array().and_then(|a| a.first()) {
        return problem_message(first);
    }
    field(body, "detail")
        .or_else(|| field(body, "title"))
        .or_else(|| body.get("errors").and_then(problem_message))
}

// --- API types ---

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    errors: Option<Value>,
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    username: String,
    name: String,
    created_at: Option<DateTime<Utc>>,
    description: Option<String>,
    #[serde(default)]
    verified: bool,
    profile_image_url: Option<String>,
    #[serde(default)]
    public_metrics: UserPublicMetrics,
}

impl UserPayload {
    /// `fallback_created` stands in when the provider omits the creation date.
    fn into_profile(self, fallback_created: DateTime<Utc>) -> Profile {
        let m = self.public_metrics;
        Profile {
            id: self.id,
            handle: self.username,
            display_name: self.name,
            created_at: self.created_at.unwrap_or(fallback_created),
            bio: self.description.unwrap_or_default(),
            verified: self.verified,
            avatar_url: self.profile_image_url,
            metrics: ProfileMetrics {
                followers: m.followers_count,
                following: m.following_count,
                posts: m.tweet_count,
                listed: m.listed_count,
            },
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct UserPublicMetrics {
    followers_count: u64,
    following_count: u64,
    tweet_count: u64,
    listed_count: u64,
}

#[derive(Deserialize)]
struct TweetPayload {
    id: String,
    #[serde(default)]
    text: String,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    public_metrics: TweetPublicMetrics,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TweetPublicMetrics {
    like_count: u64,
    retweet_count: u64,
    reply_count: u64,
    impression_count: Option<u64>,
}

impl From<TweetPayload> for Post {
    fn from(tweet: TweetPayload) -> Self {
        let m = tweet.public_metrics;
        Post {
            id: tweet.id,
            text: tweet.text,
            created_at: tweet.created_at,
            metrics: PostMetrics {
                likes: m.like_count,
                reshares: m.retweet_count,
                replies: m.reply_count,
                impressions: m.impression_count.unwrap_or(0),
            },
        }
    }
}
