use clap::Parser;
use std::path::PathBuf;

/// Invite shared with denied members so they can retry verification
pub const DEFAULT_INVITE_URL: &str = "https://discord.gg/CEgCy5ejag";

/// Discord bot that gates new members behind moderator-approved email verification
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Register slash commands in this guild only (global registration otherwise)
    #[arg(long, env = "GUILD_ID")]
    pub guild_id: Option<u64>,

    /// Per-guild settings file
    #[arg(long = "config", env = "CONFIG_PATH", default_value = "data/config.json")]
    pub config_path: PathBuf,

    /// Pending verification requests file
    #[arg(long = "pending", env = "PENDING_PATH", default_value = "data/pending.json")]
    pub pending_path: PathBuf,

    /// Re-invite link sent to denied members
    #[arg(long, env = "INVITE_URL", default_value = DEFAULT_INVITE_URL)]
    pub invite_url: String,
}

impl Settings {
    /// Application ID encoded in the first segment of the token, if readable
    pub fn application_id(&self) -> Option<String> {
        use base64::Engine;

        let segment = self.token.split('.').next()?;
        let decoded = base64::engine::general_purpose::STANDARD_NO_PAD
            .decode(segment)
            .or_else(|_| base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(segment))
            .ok()?;

        String::from_utf8(decoded)
            .ok()
            .filter(|id| id.chars().all(|c| c.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        let mut argv = vec!["gatekeeper", "--token", "MTIzNDU2.abc.def"];
        argv.extend_from_slice(args);
        Settings::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_overrides() {
        let settings = parse(&["--guild-id", "99", "--config", "/tmp/cfg.json"]);
        assert_eq!(settings.guild_id, Some(99));
        assert_eq!(settings.config_path, PathBuf::from("/tmp/cfg.json"));
    }

    #[test]
    fn test_application_id_from_token() {
        // "MTIzNDU2" is base64 for "123456"
        let settings = parse(&[]);
        assert_eq!(settings.application_id().as_deref(), Some("123456"));
    }
}
