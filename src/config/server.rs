use poise::serenity_prelude::{ChannelId, GuildId, RoleId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::serde_compat::{duration_nanos, optional_id};

/// Rate limit applied by `enable_rate_limit` when no duration was set yet
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(5 * 60);

/// Longest window `set_rate_limit` accepts (one year)
pub const MAX_RATE_LIMIT_MINUTES: u32 = 525_600;

/// Per-guild verification settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Legacy channel for public verification announcements
    #[serde(with = "optional_id", skip_serializing_if = "Option::is_none")]
    pub verification_channel_id: Option<ChannelId>,

    /// Channel where moderators review pending requests
    #[serde(with = "optional_id")]
    pub member_audit_channel_id: Option<ChannelId>,

    /// Role applied on join and removed on approval
    #[serde(with = "optional_id")]
    pub unverified_role_id: Option<RoleId>,

    pub rate_limit_enabled: bool,

    #[serde(with = "duration_nanos")]
    pub rate_limit_duration: Duration,
}

impl ServerConfig {
    /// The duration to enforce, or `None` when rate limiting is off
    pub fn active_rate_limit(&self) -> Option<Duration> {
        if self.rate_limit_enabled && !self.rate_limit_duration.is_zero() {
            Some(self.rate_limit_duration)
        } else {
            None
        }
    }

    pub fn set_verification_channel(&mut self, channel_id: ChannelId) {
        self.verification_channel_id = Some(channel_id);
    }

    pub fn set_member_audit_channel(&mut self, channel_id: ChannelId) {
        self.member_audit_channel_id = Some(channel_id);
    }

    pub fn set_unverified_role(&mut self, role_id: RoleId) {
        self.unverified_role_id = Some(role_id);
    }

    /// Turn rate limiting on, falling back to the default duration
    pub fn enable_rate_limit(&mut self) {
        self.rate_limit_enabled = true;
        if self.rate_limit_duration.is_zero() {
            self.rate_limit_duration = DEFAULT_RATE_LIMIT;
        }
    }

    /// Turn rate limiting off, keeping the configured duration
    pub fn disable_rate_limit(&mut self) {
        self.rate_limit_enabled = false;
    }

    /// Set the window without touching the enabled flag.
    /// Values above [`MAX_RATE_LIMIT_MINUTES`] are clamped.
    pub fn set_rate_limit_minutes(&mut self, minutes: u32) {
        let minutes = minutes.min(MAX_RATE_LIMIT_MINUTES);
        self.rate_limit_duration = Duration::from_secs(u64::from(minutes) * 60);
    }

    pub fn rate_limit_minutes(&self) -> u64 {
        self.rate_limit_duration.as_secs() / 60
    }
}

/// Top level of `config.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Guild ID (snowflake as string) -> settings
    #[serde(default)]
    pub servers: HashMap<String, ServerConfig>,
}

impl BotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server(&self, guild_id: GuildId) -> Option<&ServerConfig> {
        self.servers.get(&guild_id.to_string())
    }

    /// Get or create the entry for a guild
    pub fn server_mut(&mut self, guild_id: GuildId) -> &mut ServerConfig {
        self.servers.entry(guild_id.to_string()).or_default()
    }
}
