use poise::serenity_prelude::UserId;
use std::fmt;
use std::str::FromStr;

/// Separator between the action and the user id in a button's custom id
pub const SEPARATOR: char = '_';

/// Moderator decision carried by an audit message button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Deny,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Deny => "deny",
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a custom id could not be turned into a [`ReviewRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseReviewError {
    /// Not exactly `<action>_<userId>`, or the user id is not a snowflake
    Malformed(String),
    /// Well-formed, but the action is neither approve nor deny
    UnknownAction(String),
}

/// Decoded button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewRequest {
    pub action: ReviewAction,
    pub user_id: UserId,
}

impl ReviewRequest {
    pub fn new(action: ReviewAction, user_id: UserId) -> Self {
        Self { action, user_id }
    }

    pub fn custom_id(&self) -> String {
        format!("{}{}{}", self.action, SEPARATOR, self.user_id)
    }
}

impl FromStr for ReviewRequest {
    type Err = ParseReviewError;

    fn from_str(custom_id: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = custom_id.split(SEPARATOR).collect();
        let [action, user] = parts.as_slice() else {
            return Err(ParseReviewError::Malformed(custom_id.to_string()));
        };

        let action = match *action {
            "approve" => ReviewAction::Approve,
            "deny" => ReviewAction::Deny,
            other => return Err(ParseReviewError::UnknownAction(other.to_string())),
        };

        let user_id = user
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .map(UserId::new)
            .ok_or_else(|| ParseReviewError::Malformed(custom_id.to_string()))?;

        Ok(Self { action, user_id })
    }
}
