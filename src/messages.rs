// src/messages.rs
use poise::serenity_prelude::{ChannelId, RoleId, UserId};
use std::time::Duration;

use crate::verification::email::EXAMPLE_ADDRESS;

pub const ACTION_COMPLETED: &str = "Action completed successfully";
pub const DENIAL_FAILED: &str = "Error processing denial";
pub const UNKNOWN_ACTION: &str = "Unknown action";
pub const INVALID_BUTTON: &str = "Invalid verification button";

pub fn instructions_message() -> String {
    format!(
        "Welcome! Please provide your university email for verification. For example:```{}```",
        EXAMPLE_ADDRESS
    )
}

pub fn welcome_announcement(user_id: UserId) -> String {
    format!(
        "Welcome <@{}>!\n\n\
        🔐 **Verification Required**\n\
        To access all server channels, you need to verify your university email.\n\n\
        📨 **Check Your Private Messages**\n\
        I've sent you a private message with verification instructions.\n\n\
        ❓ **Need Help?**\n\
        If you don't receive a DM, please contact a moderator.",
        user_id
    )
}

pub fn invalid_email_message() -> String {
    "Invalid email. Please provide a valid UCLan email.".to_string()
}

/// Wait is rounded up to whole minutes so it never reads as zero
pub fn rate_limited_message(retry_after: Duration) -> String {
    let minutes = retry_after.as_secs().div_ceil(60).max(1);
    format!(
        "Please wait {} minute{} before sending another verification request.",
        minutes,
        if minutes == 1 { "" } else { "s" }
    )
}

pub fn request_received_message() -> String {
    "Thanks! Your email has been sent to the moderators for review. \
    You'll get a message here once a decision has been made."
        .to_string()
}

pub fn review_request(display_name: &str, user_id: UserId, email: &str) -> String {
    format!(
        "User {} (<@{}>) has requested verification with email {}",
        display_name, user_id, email
    )
}

pub fn approved_line(user_id: UserId) -> String {
    format!("<@{}> has been approved! Welcome to the server! 🎉", user_id)
}

pub fn denied_line(user_id: UserId) -> String {
    format!("<@{}> has been denied and removed from the server.", user_id)
}

pub fn approval_dm() -> String {
    "You have been approved to join the UCLan Computing Society server. Welcome! 🎉".to_string()
}

pub fn denial_dm(invite_url: &str) -> String {
    format!(
        "Oops! You need to verify your identity with a UCLan email address to access the \
        UCLan Computing Society server. This is to ensure only society members have access \
        to the server and ensure we keep a safe and civil community.\n\n\
        As you did not verify your email, you were kicked from the server. You can rejoin \
        and retry verification using this link: {}. Thank you 🙂",
        invite_url
    )
}

// Admin command replies

pub fn save_error(error: &impl std::fmt::Display) -> String {
    format!("Error saving config: {}", error)
}

pub fn verification_channel_set(channel_id: ChannelId) -> String {
    format!(
        "Verification channel set successfully! :white_check_mark: <#{}>",
        channel_id
    )
}

pub fn audit_channel_set(channel_id: ChannelId) -> String {
    format!(
        "Member audit channel set successfully! :white_check_mark: <#{}>",
        channel_id
    )
}

pub fn unverified_role_set(role_id: RoleId) -> String {
    format!(
        "Unverified role set successfully! :white_check_mark: <@&{}>",
        role_id
    )
}

pub fn rate_limit_enabled(minutes: u64) -> String {
    format!(
        "Rate limiting enabled successfully! :white_check_mark: ({} minutes)",
        minutes
    )
}

pub fn rate_limit_disabled() -> String {
    "Rate limiting disabled successfully! :white_check_mark:".to_string()
}

pub fn rate_limit_set(minutes: u64) -> String {
    format!(
        "Rate limit set to {} minutes successfully! :white_check_mark:",
        minutes
    )
}

pub fn rate_limit_status(enabled: bool, minutes: u64) -> String {
    if enabled {
        format!(
            "Rate limit is enabled with a duration of {} minutes",
            minutes
        )
    } else {
        "Rate limit is disabled".to_string()
    }
}

pub const NO_RATE_LIMIT_CONFIGURED: &str = "No rate limit configured for this server";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_rounds_up() {
        assert_eq!(
            rate_limited_message(Duration::from_secs(1)),
            "Please wait 1 minute before sending another verification request."
        );
        assert_eq!(
            rate_limited_message(Duration::from_secs(61)),
            "Please wait 2 minutes before sending another verification request."
        );
        assert_eq!(
            rate_limited_message(Duration::from_secs(300)),
            "Please wait 5 minutes before sending another verification request."
        );
    }

    #[test]
    fn test_review_request_mentions_user_and_email() {
        let text = review_request("Jane", UserId::new(42), "jane@uclan.ac.uk");
        assert!(text.contains("Jane"));
        assert!(text.contains("<@42>"));
        assert!(text.ends_with("jane@uclan.ac.uk"));
    }
}
