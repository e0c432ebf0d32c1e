//! Synthetic account data for demo mode.
//!
//! Counts scale linearly with the handle length so different handles look
//! different; engagement is randomized in bands proportional to the follower
//! count.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::debug;

use crate::consts::format_number;
use crate::error::AnalyzeError;

use super::{AccountData, AccountSource, Post, PostMetrics, Profile, ProfileMetrics};

/// Number of posts in every synthesized timeline.
pub const DEMO_POST_COUNT: usize = 30;

const DEFAULT_AVATAR: &str =
    "https://abs.twimg.com/sticky/default_profile_images/default_profile_400x400.png";

/// Demo accounts are always two years old.
const ACCOUNT_AGE_DAYS: i64 = 365 * 2;

/// Synthesizes account data with an injected generator.
pub struct DemoSource {
    rng: Mutex<StdRng>,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSource {
    /// Seeded from the thread-local generator; output differs between runs.
    pub fn new() -> Self {
        let seed: u64 = rand::rng().random();
        Self::seeded(seed)
    }

    /// Reproducible output for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self, handle: &str, now: DateTime<Utc>) -> AccountData {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        synthesize(handle, now, &mut *rng)
    }
}

#[async_trait]
impl AccountSource for DemoSource {
    async fn fetch(&self, handle: &str) -> Result<AccountData, AnalyzeError> {
        debug!(handle, "synthesizing demo data");
        Ok(self.generate(handle, Utc::now()))
    }
}

/// Build a demo profile and [`DEMO_POST_COUNT`] posts for `handle`.
///
/// Timestamps are truncated to whole milliseconds, the provider's precision.
pub fn synthesize<R: RngExt>(handle: &str, now: DateTime<Utc>, rng: &mut R) -> AccountData {
    let now = now.trunc_subsecs(3);
    let len = handle.chars().count() as u64;
    let followers = 3000 + len * 347;
    let metrics = ProfileMetrics {
        followers,
        following: 500 + len * 52,
        posts: 1500 + len * 124,
        listed: followers / 100,
    };

    let name = capitalize(handle);
    let profile = Profile {
        id: format!("12345{len}"),
        handle: handle.to_string(),
        bio: format!("🚀 Content Creator | {name} | Tech Enthusiast | Building in Public"),
        display_name: name,
        created_at: now - Duration::days(ACCOUNT_AGE_DAYS),
        verified: followers > 5000,
        avatar_url: Some(DEFAULT_AVATAR.to_string()),
        metrics,
    };

    let templates = templates(followers);
    let base = (followers as f64 * 0.02).floor();
    let posts = (0..DEMO_POST_COUNT)
        .map(|i| Post {
            id: format!("tweet{i}"),
            text: templates[i % templates.len()].clone(),
            created_at: Some(now - Duration::days(i as i64)),
            metrics: PostMetrics {
                likes: band(rng, base, base),
                reshares: band(rng, base * 0.3, base * 0.3),
                replies: band(rng, base * 0.2, base * 0.2),
                impressions: band(rng, followers as f64 * 2.0, followers as f64 * 3.0),
            },
        })
        .collect();

    AccountData { profile, posts }
}

/// Uniform integer in `[floor, floor + spread)`.
fn band<R: RngExt>(rng: &mut R, floor: f64, spread: f64) -> u64 {
    (floor + rng.random::<f64>() * spread).floor() as u64
}

fn capitalize(handle: &str) -> String {
    let mut chars = handle.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn templates(followers: u64) -> [String; 10] {
    [
        "Just shipped a new feature! 🚀 Building in public is the best way to grow. #buildinpublic".to_string(),
        "Hot take: The best time to start is now. Stop overthinking, start building! 💪".to_string(),
        format!(
            "Shared my journey on X. From 0 to {} followers in 2 years. Here's what I learned... 🧵",
            format_number(followers)
        ),
        "New blog post: How I grew my audience on X 📈 Link in bio!".to_string(),
        "Grateful for this amazing community! Thank you all for the support ❤️".to_string(),
        "Pro tip: Consistency > Perfection. Keep showing up every single day! 💯".to_string(),
        "Working on something exciting. Can't wait to share it with you all! ✨".to_string(),
        "The algorithm favors engagement. Reply to comments, interact with your audience! 💬".to_string(),
        "Just hit a major milestone! Couldn't have done it without you all 🙏".to_string(),
        "Monday motivation: Your network is your net worth. Keep building! 🌟".to_string(),
    ]
}
