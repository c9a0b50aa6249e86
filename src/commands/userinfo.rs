//! User profile summaries.
//!
//! The gateway collects the platform-specific fields; this module only
//! formats them. Role lists are truncated to the platform field limit.

use chrono::{DateTime, Utc};

/// Longest role list the platform renders in one field.
const ROLES_FIELD_LIMIT: usize = 1024;

/// Platform-agnostic snapshot of a user, as collected by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct UserProfile {
    /// Account name.
    pub name: String,
    /// Platform user id.
    pub id: String,
    /// Server nickname, when set.
    pub nickname: Option<String>,
    /// Whether the account is automated.
    pub is_bot: bool,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// When the user joined the current server, when known.
    pub joined_at: Option<DateTime<Utc>>,
    /// Presence label ("Online", "Idle"), when known.
    pub status: Option<String>,
    /// Role names, without the implicit everyone role.
    pub roles: Vec<String>,
}

/// Formats a profile as a multi-line summary.
pub fn summarize(profile: &UserProfile) -> String {
    let mut out = format!(
        "User Information: {}\nUsername: {}\nUser ID: {}\nNickname: {}",
        profile.name,
        profile.name,
        profile.id,
        profile.nickname.as_deref().unwrap_or("None"),
    );
    out.push_str(&format!(
        "\nAccount Created: {}",
        profile.created_at.format("%b %d, %Y")
    ));
    if let Some(joined) = profile.joined_at {
        out.push_str(&format!("\nJoined Server: {}", joined.format("%b %d, %Y")));
    }
    if let Some(status) = &profile.status {
        out.push_str(&format!("\nStatus: {status}"));
    }
    out.push_str(&format!(
        "\nBot: {}",
        if profile.is_bot { "Yes" } else { "No" }
    ));
    out.push_str(&format!(
        "\nRoles [{}]: {}",
        profile.roles.len(),
        roles_field(&profile.roles)
    ));
    out
}

/// Joins role names, truncating to the platform field limit.
pub fn roles_field(roles: &[String]) -> String {
    if roles.is_empty() {
        return "No roles".to_string();
    }
    let joined = roles.join(", ");
    if joined.chars().count() <= ROLES_FIELD_LIMIT {
        return joined;
    }
    let mut truncated: String = joined.chars().take(ROLES_FIELD_LIMIT - 3).collect();
    truncated.push_str("...");
    truncated
}
