use serde::{Deserialize, Serialize};
use strum::Display;

/// Account info derived from the identity provider's token response.
///
/// Only the fields the app actually shows are kept; the provider returns
/// more, and we deliberately drop the rest at the boundary.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct UserProfile {
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Workout {
    pub id: String,
    pub title: String,
    pub category: String,
    pub minutes: u32,
    pub level: String,
    #[serde(default)]
    pub description: String,

    /// Playback is delegated to the browser's media widget; we only carry
    /// the URL through.
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Recipe {
    pub id: String,
    pub title: String,
    pub minutes: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ChatRole {
    User,
    Coach,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub at_ms: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RecentWorkout {
    pub id: String,
    pub title: String,
    pub last_opened_ms: i64,
}
