pub mod demo;
pub mod mock;
pub mod twitter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

/// Public account counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileMetrics {
    pub followers: u64,
    pub following: u64,
    pub posts: u64,
    pub listed: u64,
}

/// An account as the provider describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub handle: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub bio: String,
    pub verified: bool,
    pub avatar_url: Option<String>,
    pub metrics: ProfileMetrics,
}

/// Engagement counters on a single post. Missing counters are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    pub likes: u64,
    pub reshares: u64,
    pub replies: u64,
    pub impressions: u64,
}

impl PostMetrics {
    /// Likes + reshares + replies.
    pub fn engagement(&self) -> u64 {
        self.likes + self.reshares + self.replies
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub metrics: PostMetrics,
}

/// A profile and its recent original posts, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountData {
    pub profile: Profile,
    pub posts: Vec<Post>,
}

/// Where account data comes from. Could be the real API, synthesized, or a test script.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn fetch(&self, handle: &str) -> Result<AccountData, AnalyzeError>;
}
