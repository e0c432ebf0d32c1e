//! Engagement and income estimates derived from a profile and its posts.
//!
//! Everything here is a pure function of its inputs. `now` is passed in so
//! identical inputs always produce identical output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::consts::CPM_RATE;
use crate::source::{Post, Profile};

/// Months covered by the follower/income projection.
pub const PROJECTION_MONTHS: u32 = 6;

/// Posts included in the recent-activity digest.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Characters of post text kept in the digest.
pub const ACTIVITY_TEXT_LIMIT: usize = 100;

/// The sampled batch is assumed to be a third of a month's posting pace.
const MONTHLY_PACE_FACTOR: f64 = 3.0;

const MILLIS_PER_MONTH: f64 = 1000.0 * 60.0 * 60.0 * 24.0 * 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub current_metrics: CurrentMetrics,
    pub income: Income,
    pub projections: Vec<Projection>,
    pub motivational_metrics: MotivationalMetrics,
    pub recent_activity: Vec<ActivitySummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMetrics {
    pub followers: u64,
    pub following: u64,
    pub total_tweets: u64,
    pub listed: u64,
    /// Percent, 2 decimals.
    pub engagement_rate: f64,
    pub avg_engagement: u64,
    pub avg_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub current_monthly: f64,
    pub projected_annual: f64,
    pub cpm_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub month: u32,
    pub followers: u64,
    pub estimated_income: f64,
}

/// Scores in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivationalMetrics {
    pub influence_score: f64,
    pub content_quality_score: f64,
    pub growth_potential: u64,
    pub consistency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    pub text: String,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Derive analytics for `profile`, given its posts newest first.
pub fn derive(profile: &Profile, posts: &[Post], now: DateTime<Utc>) -> Analytics {
    let followers = profile.metrics.followers as f64;
    let post_count = posts.len() as f64;

    let avg_impressions = mean(posts, |p| p.metrics.impressions);
    let avg_engagement = mean(posts, |p| p.metrics.engagement());
    let rate = engagement_rate(avg_engagement, profile.metrics.followers);

    let monthly_views = avg_impressions * post_count * MONTHLY_PACE_FACTOR;
    let monthly_income = monthly_views / 1000.0 * CPM_RATE;

    let growth_rate = follower_growth_rate(profile, now);

    let influence = (followers / 10_000.0) * 30.0 + rate * 40.0 + (post_count / 100.0) * 30.0;
    let quality = (avg_engagement / 100.0) * 100.0;
    let consistency = (post_count / 30.0) * 100.0;

    Analytics {
        current_metrics: CurrentMetrics {
            followers: profile.metrics.followers,
            following: profile.metrics.following,
            total_tweets: profile.metrics.posts,
            listed: profile.metrics.listed,
            engagement_rate: round_to(rate, 2),
            avg_engagement: avg_engagement.round() as u64,
            avg_views: avg_impressions.round() as u64,
        },
        income: Income {
            current_monthly: round_to(monthly_income, 2),
            projected_annual: round_to(monthly_income * 12.0, 2),
            cpm_rate: CPM_RATE,
        },
        projections: project(profile.metrics.followers, growth_rate, monthly_income),
        motivational_metrics: MotivationalMetrics {
            influence_score: round_to(influence.min(100.0), 1),
            content_quality_score: round_to(quality.min(100.0), 1),
            growth_potential: (growth_rate * 10.0).round().min(100.0) as u64,
            consistency_score: round_to(consistency.min(100.0), 1),
        },
        recent_activity: recent_activity(posts),
    }
}

/// Average engagement as a percentage of followers; 0 without followers.
pub fn engagement_rate(avg_engagement: f64, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    avg_engagement / followers as f64 * 100.0
}

/// Followers gained per month over the account's lifetime (at least one month).
pub fn follower_growth_rate(profile: &Profile, now: DateTime<Utc>) -> f64 {
    let age_millis = (now - profile.created_at).num_milliseconds() as f64;
    let age_months = (age_millis / MILLIS_PER_MONTH).max(1.0);
    profile.metrics.followers as f64 / age_months
}

/// Project followers and income forward [`PROJECTION_MONTHS`] months.
///
/// Income compounds by half the relative growth rate each month. Without
/// followers there is no relative growth, so income stays flat.
pub fn project(followers: u64, growth_rate: f64, monthly_income: f64) -> Vec<Projection> {
    let multiplier = if followers == 0 {
        1.0
    } else {
        1.0 + (growth_rate / followers as f64) * 0.5
    };

    let mut projected_followers = followers as f64;
    let mut projected_income = monthly_income;
    (1..=PROJECTION_MONTHS)
        .map(|month| {
            projected_followers += growth_rate;
            projected_income *= multiplier;
            Projection {
                month,
                followers: projected_followers.round() as u64,
                estimated_income: round_to(projected_income, 2),
            }
        })
        .collect()
}

/// The newest posts with their text shortened for display.
pub fn recent_activity(posts: &[Post]) -> Vec<ActivitySummary> {
    posts
        .iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|post| ActivitySummary {
            text: truncate_text(&post.text, ACTIVITY_TEXT_LIMIT),
            likes: post.metrics.likes,
            retweets: post.metrics.reshares,
            replies: post.metrics.replies,
            created_at: post.created_at,
        })
        .collect()
}

/// Keep at most `limit` characters, appending `...` when anything was cut.
pub fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn mean(posts: &[Post], value: impl Fn(&Post) -> u64) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    posts.iter().map(|p| value(p) as f64).sum::<f64>() / posts.len() as f64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
