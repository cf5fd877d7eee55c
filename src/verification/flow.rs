use chrono::Utc;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::action::{ParseReviewError, ReviewAction, ReviewRequest};
use super::email::is_institution_email;
use super::gateway::DiscordGateway;
use super::pending::{PendingReview, SharedPendingStore};
use crate::managers::{RateLimitDecision, SharedConfigStore, SharedRateLimiter};
use crate::messages;

/// Author of a direct message
#[derive(Debug, Clone, Copy)]
pub struct Submitter<'a> {
    pub user_id: UserId,
    pub display_name: &'a str,
}

/// Result of an email submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Posted to the audit channel; the user is now pending review
    Forwarded {
        guild_id: GuildId,
        audit_message_id: MessageId,
    },
    RateLimited { retry_after: Duration },
    InvalidEmail,
    /// The sender shares no guild with the bot
    NoGuild,
    /// The guild has no audit channel configured
    NoAuditChannel(GuildId),
    /// Posting to the audit channel failed
    AuditPostFailed(GuildId),
}

/// Result of a moderator pressing an audit button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Approved(UserId),
    Denied(UserId),
    /// The member could not be removed; the audit message is untouched
    DenialFailed(UserId),
    UnknownAction,
    Invalid,
}

impl ReviewOutcome {
    /// Text for the moderator's ephemeral acknowledgement
    pub fn acknowledgement(&self) -> &'static str {
        match self {
            ReviewOutcome::Approved(_) | ReviewOutcome::Denied(_) => messages::ACTION_COMPLETED,
            ReviewOutcome::DenialFailed(_) => messages::DENIAL_FAILED,
            ReviewOutcome::UnknownAction => messages::UNKNOWN_ACTION,
            ReviewOutcome::Invalid => messages::INVALID_BUTTON,
        }
    }
}

/// Drives a member from joining to an approved or denied verification
pub struct VerificationService {
    config: SharedConfigStore,
    rate_limiter: SharedRateLimiter,
    pending: SharedPendingStore,
    invite_url: String,
}

impl VerificationService {
    pub fn new(
        config: SharedConfigStore,
        rate_limiter: SharedRateLimiter,
        pending: SharedPendingStore,
        invite_url: impl Into<String>,
    ) -> Self {
        Self {
            config,
            rate_limiter,
            pending,
            invite_url: invite_url.into(),
        }
    }

    pub fn pending(&self) -> &SharedPendingStore {
        &self.pending
    }

    /// Joined -> AwaitingEmail
    pub async fn member_joined<G>(&self, gateway: &G, guild_id: GuildId, user_id: UserId)
    where
        G: DiscordGateway + ?Sized,
    {
        let Some(server) = self.config.get(guild_id).await else {
            info!("No config found for guild {}, not greeting {}", guild_id, user_id);
            return;
        };

        match server.unverified_role_id {
            Some(role_id) => {
                if let Err(e) = gateway.add_role(guild_id, user_id, role_id).await {
                    error!("Failed to add unverified role to {} in guild {}: {}", user_id, guild_id, e);
                }
            }
            None => warn!("No unverified role configured for guild {}", guild_id),
        }

        if let Some(channel_id) = server.verification_channel_id {
            if let Err(e) = gateway
                .send_message(channel_id, &messages::welcome_announcement(user_id))
                .await
            {
                error!("Failed to post welcome in channel {}: {}", channel_id, e);
            }
        }

        match gateway.send_dm(user_id, &messages::instructions_message()).await {
            Ok(()) => info!("Sent verification instructions to {}", user_id),
            Err(e) => error!("Failed to send verification instructions to {}: {}", user_id, e),
        }
    }

    /// AwaitingEmail -> PendingReview
    pub async fn email_submitted<G>(
        &self,
        gateway: &G,
        submitter: Submitter<'_>,
        content: &str,
    ) -> SubmissionOutcome
    where
        G: DiscordGateway + ?Sized,
    {
        let user_id = submitter.user_id;
        let email = content.trim();

        // The first shared guild wins; a user in several guilds may land in either
        let Some(guild_id) = gateway.find_member_guild(user_id).await else {
            // No guild means no rate limit policy, but a bad address still gets its reply
            if !is_institution_email(email) {
                self.reply(gateway, user_id, &messages::invalid_email_message())
                    .await;
                return SubmissionOutcome::InvalidEmail;
            }
            info!("{} is not a member of any guild the bot is in", user_id);
            return SubmissionOutcome::NoGuild;
        };
        let server = self.config.get(guild_id).await.unwrap_or_default();

        if let Some(window) = server.active_rate_limit() {
            if let RateLimitDecision::Limited { retry_after } =
                self.rate_limiter.check(user_id, window)
            {
                debug!("{} is rate limited for {:?}", user_id, retry_after);
                self.reply(gateway, user_id, &messages::rate_limited_message(retry_after))
                    .await;
                return SubmissionOutcome::RateLimited { retry_after };
            }
        }

        if !is_institution_email(email) {
            self.reply(gateway, user_id, &messages::invalid_email_message())
                .await;
            return SubmissionOutcome::InvalidEmail;
        }

        let Some(audit_channel_id) = server.member_audit_channel_id else {
            warn!(
                "No member audit channel configured for guild {}, dropping request from {}",
                guild_id, user_id
            );
            return SubmissionOutcome::NoAuditChannel(guild_id);
        };

        let content = messages::review_request(submitter.display_name, user_id, email);
        let audit_message_id = match gateway.post_review(audit_channel_id, &content, user_id).await
        {
            Ok(id) => id,
            Err(e) => {
                error!("Failed to post verification request to audit channel {}: {}", audit_channel_id, e);
                return SubmissionOutcome::AuditPostFailed(guild_id);
            }
        };

        if let Some(previous) = self.pending.insert(PendingReview {
            user_id,
            guild_id,
            email: email.to_string(),
            audit_channel_id,
            audit_message_id,
            submitted_at: Utc::now(),
        }) {
            debug!(
                "{} resubmitted, previous request was message {}",
                user_id, previous.audit_message_id
            );
        }
        self.persist_pending().await;

        info!("Forwarded verification request from {} to guild {}", user_id, guild_id);
        self.reply(gateway, user_id, &messages::request_received_message())
            .await;

        SubmissionOutcome::Forwarded {
            guild_id,
            audit_message_id,
        }
    }

    /// PendingReview -> Approved | Denied
    pub async fn review_decision<G>(
        &self,
        gateway: &G,
        guild_id: Option<GuildId>,
        custom_id: &str,
        audit_channel_id: ChannelId,
        audit_message_id: MessageId,
    ) -> ReviewOutcome
    where
        G: DiscordGateway + ?Sized,
    {
        let request = match custom_id.parse::<ReviewRequest>() {
            Ok(request) => request,
            Err(ParseReviewError::Malformed(id)) => {
                warn!("Invalid button customID format: {}", id);
                return ReviewOutcome::Invalid;
            }
            Err(ParseReviewError::UnknownAction(action)) => {
                warn!("Unknown action: {}", action);
                return ReviewOutcome::UnknownAction;
            }
        };

        let Some(guild_id) = guild_id else {
            warn!("Button {} pressed outside a guild", custom_id);
            return ReviewOutcome::Invalid;
        };

        let user_id = request.user_id;
        info!("Processing {} action for user {}", request.action, user_id);

        let outcome = match request.action {
            ReviewAction::Approve => {
                if let Err(e) = gateway.send_dm(user_id, &messages::approval_dm()).await {
                    error!("Failed to send approval DM to {}: {}", user_id, e);
                }

                let role = self
                    .config
                    .get(guild_id)
                    .await
                    .and_then(|server| server.unverified_role_id);
                if let Some(role_id) = role {
                    if let Err(e) = gateway.remove_role(guild_id, user_id, role_id).await {
                        error!("Failed to remove unverified role from {}: {}", user_id, e);
                    }
                }

                if let Err(e) = gateway
                    .close_review(audit_channel_id, audit_message_id, &messages::approved_line(user_id))
                    .await
                {
                    error!("Failed to update audit message {}: {}", audit_message_id, e);
                }

                ReviewOutcome::Approved(user_id)
            }
            ReviewAction::Deny => {
                if let Err(e) = gateway
                    .send_dm(user_id, &messages::denial_dm(&self.invite_url))
                    .await
                {
                    error!("Failed to send denial DM to {}: {}", user_id, e);
                }

                if let Err(e) = gateway.kick(guild_id, user_id).await {
                    error!("Failed to kick {} from guild {}: {}", user_id, guild_id, e);
                    return ReviewOutcome::DenialFailed(user_id);
                }

                if let Err(e) = gateway
                    .close_review(audit_channel_id, audit_message_id, &messages::denied_line(user_id))
                    .await
                {
                    error!("Failed to update audit message {}: {}", audit_message_id, e);
                }

                ReviewOutcome::Denied(user_id)
            }
        };

        if self.pending.remove(user_id).is_some() {
            self.persist_pending().await;
        }

        outcome
    }

    async fn reply<G>(&self, gateway: &G, user_id: UserId, content: &str)
    where
        G: DiscordGateway + ?Sized,
    {
        if let Err(e) = gateway.send_dm(user_id, content).await {
            error!("Failed to reply to {}: {}", user_id, e);
        }
    }

    async fn persist_pending(&self) {
        if let Err(e) = self.pending.save().await {
            error!("Failed to save pending verifications: {}", e);
        }
    }
}

/// Shared verification service type
pub type SharedVerificationService = Arc<VerificationService>;

pub fn create_shared_verification_service(service: VerificationService) -> SharedVerificationService {
    Arc::new(service)
}
